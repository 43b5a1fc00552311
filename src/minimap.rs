//! `Minimap`: the decode → store → paint pipeline behind one handle.
//!
//! The handle is cheap to clone. Clones share the same store, config and
//! counters, which is how the frame observer (decoder side) and the redraw
//! hook (projector side) reach the same state.

use std::cell::Cell;
use std::rc::Rc;

use serde::Serialize;

use crate::config::{DisplayConfig, SharedConfig};
use crate::interceptor::{FrameObserver, FrameSink};
use crate::projector::{self, DrawSurface, RenderStats};
use crate::protocol::{self, Packet};
use crate::store::{EntityStore, SharedStore};

/// Element id of the host canvas the minimap paints over.
pub const MAP_DISPLAY_ID: &str = "mapDisplay";

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Running totals of what the decoder has seen. Purely informational.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub frames_seen: u64,
    pub frames_malformed: u64,
    pub packets_ignored: u64,
    /// Complete records without a displayable category or with bad fields.
    pub records_dropped: u64,
    /// Values left over after the last complete record of a bundle.
    pub trailing_values: u64,
    pub entities_added: u64,
}

// ---------------------------------------------------------------------------
// Minimap
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Minimap {
    store: SharedStore,
    config: SharedConfig,
    stats: Rc<Cell<IngestStats>>,
}

impl Default for Minimap {
    fn default() -> Self {
        Self::new(DisplayConfig::default().into_shared())
    }
}

impl Minimap {
    /// Build around an injected config. The same handle should be given to
    /// the settings panel.
    pub fn new(config: SharedConfig) -> Self {
        Self {
            store: EntityStore::new().into_shared(),
            config,
            stats: Rc::new(Cell::new(IngestStats::default())),
        }
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn stats(&self) -> IngestStats {
        self.stats.get()
    }

    pub fn entity_count(&self) -> usize {
        self.store.borrow().len()
    }

    /// Decode one inbound frame and append whatever it yields.
    ///
    /// Never fails: malformed frames are logged, counted and dropped.
    /// Returns the number of entities appended.
    pub fn ingest_frame(&self, bytes: &[u8]) -> usize {
        let mut stats = self.stats.get();
        stats.frames_seen += 1;

        let added = match protocol::decode_frame(bytes) {
            Ok(Packet::Resources(bundle)) => {
                let descriptors = bundle.descriptors();
                let added = descriptors.len();
                stats.records_dropped += (bundle.record_count() - added) as u64;
                stats.trailing_values += bundle.remainder() as u64;
                self.store.borrow_mut().extend(descriptors);
                added
            }
            Ok(Packet::Ignored { tag }) => {
                log::trace!("[decoder] ignoring packet '{}'", tag);
                stats.packets_ignored += 1;
                0
            }
            Err(e) => {
                log::debug!("[decoder] dropping frame ({} bytes): {}", bytes.len(), e);
                stats.frames_malformed += 1;
                0
            }
        };

        stats.entities_added += added as u64;
        self.stats.set(stats);
        added
    }

    /// Repaint the whole accumulated store onto `surface`.
    pub fn repaint<S>(&self, surface: &mut S) -> RenderStats
    where
        S: DrawSurface + ?Sized,
    {
        let store = self.store.borrow();
        let config = self.config.borrow();
        projector::render(&store, &config, surface)
    }

    /// Redraw trigger: the host just cleared the surface `surface_id`.
    ///
    /// Only the map display is repainted; any other surface is left alone
    /// and `None` is returned.
    pub fn on_surface_cleared<S>(&self, surface_id: &str, surface: &mut S) -> Option<RenderStats>
    where
        S: DrawSurface + ?Sized,
    {
        is_map_display(surface_id).then(|| self.repaint(surface))
    }
}

pub fn is_map_display(surface_id: &str) -> bool {
    surface_id == MAP_DISPLAY_ID
}

impl FrameSink for Minimap {
    fn observer(&self) -> FrameObserver {
        let minimap = self.clone();
        Box::new(move |frame: &[u8]| {
            minimap.ingest_frame(frame);
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
