//! World → display projection and minimap painting.

use crate::config::DisplayConfig;
use crate::store::EntityStore;
use crate::types::PixelPoint;

/// Linear scale from world coordinates onto the display surface.
///
/// No clipping: out-of-range positions land outside the surface and are left
/// for the surface itself to clip.
pub fn project(x: f64, y: f64, config: &DisplayConfig) -> PixelPoint {
    PixelPoint::new(
        x / config.world.width * config.display.width,
        y / config.world.height * config.display.height,
    )
}

// ---------------------------------------------------------------------------
// Drawing surface
// ---------------------------------------------------------------------------

/// One filled and stroked circle.
#[derive(Debug, Clone, PartialEq)]
pub struct Dot<'a> {
    pub center: PixelPoint,
    pub radius: f64,
    /// Used for both fill and stroke.
    pub color: &'a str,
}

/// Anything the minimap can be painted onto.
pub trait DrawSurface {
    fn draw_dot(&mut self, dot: &Dot<'_>);
}

/// Owned copy of a [`Dot`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDot {
    pub center: PixelPoint,
    pub radius: f64,
    pub color: String,
}

/// Surface that remembers every draw call, in order.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub dots: Vec<RecordedDot>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.dots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }
}

impl DrawSurface for RecordingSurface {
    fn draw_dot(&mut self, dot: &Dot<'_>) {
        self.dots.push(RecordedDot {
            center: dot.center,
            radius: dot.radius,
            color: dot.color.to_string(),
        });
    }
}

// ---------------------------------------------------------------------------
// Render
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub drawn: usize,
    /// Entities of a disabled category. These cost no draw call.
    pub hidden: usize,
}

/// Paint every enabled entity, in store order, so later entities end up on
/// top of earlier ones.
pub fn render<S>(store: &EntityStore, config: &DisplayConfig, surface: &mut S) -> RenderStats
where
    S: DrawSurface + ?Sized,
{
    let mut stats = RenderStats::default();
    for entity in store {
        let style = config.style(entity.category);
        if !style.enabled {
            stats.hidden += 1;
            continue;
        }
        surface.draw_dot(&Dot {
            center: project(entity.x, entity.y, config),
            radius: style.radius,
            color: &style.color,
        });
        stats.drawn += 1;
    }
    stats
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
