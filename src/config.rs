//! Display configuration for the minimap.
//!
//! A single [`DisplayConfig`] is created at load and shared by reference
//! between the projector and the settings panel through [`SharedConfig`].
//! The panel only ever flips `enabled`; extents, colors and radii are fixed
//! once the page is running.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::types::{Category, Extent};

/// Single-threaded shared handle. Both consumers run on the page's event
/// loop, so a `RefCell` borrow can never overlap another.
pub type SharedConfig = Rc<RefCell<DisplayConfig>>;

// ---------------------------------------------------------------------------
// Per-category style
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStyle {
    pub enabled: bool,
    /// CSS color used for both fill and stroke.
    pub color: String,
    /// Dot radius in pixels.
    pub radius: f64,
}

impl CategoryStyle {
    pub fn new(color: impl Into<String>, radius: f64) -> Self {
        Self {
            enabled: true,
            color: color.into(),
            radius,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceStyles {
    pub wood: CategoryStyle,
    pub food: CategoryStyle,
    pub stone: CategoryStyle,
    pub points: CategoryStyle,
}

impl ResourceStyles {
    pub fn get(&self, category: Category) -> &CategoryStyle {
        match category {
            Category::Wood => &self.wood,
            Category::Food => &self.food,
            Category::Stone => &self.stone,
            Category::Points => &self.points,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut CategoryStyle {
        match category {
            Category::Wood => &mut self.wood,
            Category::Food => &mut self.food,
            Category::Stone => &mut self.stone,
            Category::Points => &mut self.points,
        }
    }
}

impl Default for ResourceStyles {
    fn default() -> Self {
        Self {
            wood: CategoryStyle::new("#8ecc51", 3.0),
            food: CategoryStyle::new("#ff3333", 2.0),
            stone: CategoryStyle::new("#888888", 3.0),
            points: CategoryStyle::new("#ffee33", 4.0),
        }
    }
}

// ---------------------------------------------------------------------------
// DisplayConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// World extent in world units.
    pub world: Extent,
    /// Display surface extent in pixels.
    pub display: Extent,
    pub resource: ResourceStyles,
}

impl DisplayConfig {
    pub fn style(&self, category: Category) -> &CategoryStyle {
        self.resource.get(category)
    }

    pub fn is_enabled(&self, category: Category) -> bool {
        self.resource.get(category).enabled
    }

    pub fn set_enabled(&mut self, category: Category, enabled: bool) {
        self.resource.get_mut(category).enabled = enabled;
    }

    /// Flip a category's visibility and return the new state.
    pub fn toggle(&mut self, category: Category) -> bool {
        let style = self.resource.get_mut(category);
        style.enabled = !style.enabled;
        style.enabled
    }

    /// Wrap into the shared handle handed to the projector and the panel.
    pub fn into_shared(self) -> SharedConfig {
        Rc::new(RefCell::new(self))
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            world: Extent::new(14400.0, 14400.0),
            display: Extent::new(300.0, 300.0),
            resource: ResourceStyles::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
