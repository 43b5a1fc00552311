//! MooMoo Minimap
//!
//! Watches the game's socket for resource snapshots and paints every
//! resource seen so far onto the in-game minimap.
//!
//! ## Architecture
//!
//! ```text
//! ChannelHook / InterceptedChannel  (interceptor.rs) ← attach on first send
//!   └── Minimap::ingest_frame       (minimap.rs)
//!         ├── decode_frame          (protocol.rs)   ← msgpack → Packet
//!         └── EntityStore           (store.rs)      ← append-only
//!
//! host clears "mapDisplay"
//!   └── Minimap::on_surface_cleared (minimap.rs)
//!         └── render                (projector.rs)  ← DisplayConfig (config.rs)
//! ```
//!
//! This crate has no browser dependency. The wasm client under
//! `clients/wasm` supplies the WebSocket channel and Canvas2D surface.

pub mod config;
pub mod error;
pub mod interceptor;
pub mod minimap;
pub mod projector;
pub mod protocol;
pub mod store;
pub mod types;

pub use config::{CategoryStyle, DisplayConfig, SharedConfig};
pub use error::{ConfigError, DecodeError, ObserveError};
pub use interceptor::{Channel, ChannelHook, FrameObserver, FrameSink, InterceptedChannel};
pub use minimap::{IngestStats, Minimap, MAP_DISPLAY_ID};
pub use projector::{project, render, Dot, DrawSurface, RecordingSurface, RenderStats};
pub use protocol::{decode_frame, Packet, ResourceBundle};
pub use store::{EntityStore, SharedStore};
pub use types::{Category, EntityDescriptor, Extent, PixelPoint};
