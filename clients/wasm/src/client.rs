//! `MinimapClient`: the primary wasm-bindgen export.
//!
//! ## JavaScript usage
//!
//! ```js
//! import init, { MinimapClient } from './pkg/moomoo_minimap_wasm.js';
//!
//! await init();
//!
//! const minimap = new MinimapClient();
//!
//! // Page we cannot modify: hook WebSocket.send and clearRect.
//! minimap.install();
//!
//! // Page we control: wrap the socket where it is created instead.
//! const socket = minimap.wrapSocket(new WebSocket(url));
//! socket.send(bytes);
//!
//! // Settings panel
//! minimap.toggleCategory('stone');
//! ```

use std::collections::BTreeMap;

use moomoo_minimap::{Category, ChannelHook, InterceptedChannel, Minimap};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::canvas::CanvasSurface;
use crate::hooks;
use crate::socket::WsChannel;

// ---------------------------------------------------------------------------
// MinimapClient
// ---------------------------------------------------------------------------

/// Owns the minimap state for one page.
///
/// The settings panel reads and writes visibility only through the
/// category methods below; the projector sees the same config handle.
#[wasm_bindgen]
pub struct MinimapClient {
    minimap: Minimap,
    hook: ChannelHook<Minimap>,
}

#[wasm_bindgen]
impl MinimapClient {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let minimap = Minimap::default();
        Self {
            hook: ChannelHook::new(minimap.clone()),
            minimap,
        }
    }

    // -----------------------------------------------------------------------
    // Hooks
    // -----------------------------------------------------------------------

    /// Hook `WebSocket.prototype.send` and
    /// `CanvasRenderingContext2D.prototype.clearRect`.
    ///
    /// Each hook installs at most once per page. A failure leaves the host
    /// method untouched and is reported to the caller.
    #[wasm_bindgen]
    pub fn install(&self) -> Result<(), JsValue> {
        let send = hooks::install_send_hook(self.hook.clone());
        let clear = hooks::install_clear_hook(self.minimap.clone());
        for (name, result) in [("send", &send), ("clearRect", &clear)] {
            if let Err(e) = result {
                log::warn!("[client] {} hook not installed: {:?}", name, e);
            }
        }
        send.and(clear).map(|_| ())
    }

    /// Wrap a socket at creation time. Its first `send` attaches the frame
    /// observer.
    #[wasm_bindgen(js_name = wrapSocket)]
    pub fn wrap_socket(&self, ws: web_sys::WebSocket) -> InterceptedSocket {
        InterceptedSocket {
            inner: self.hook.on_create(WsChannel::new(ws)),
        }
    }

    /// Feed one raw frame directly. Returns the number of entities added.
    #[wasm_bindgen]
    pub fn ingest(&self, frame: &[u8]) -> u32 {
        self.minimap.ingest_frame(frame) as u32
    }

    /// Repaint onto `ctx` unconditionally. Returns the number of dots drawn.
    #[wasm_bindgen]
    pub fn repaint(&self, ctx: &web_sys::CanvasRenderingContext2d) -> u32 {
        self.minimap.repaint(&mut CanvasSurface::new(ctx)).drawn as u32
    }

    // -----------------------------------------------------------------------
    // Configuration surface (settings panel)
    // -----------------------------------------------------------------------

    #[wasm_bindgen(js_name = setCategoryEnabled)]
    pub fn set_category_enabled(&self, name: &str, enabled: bool) -> Result<(), JsValue> {
        let category = parse_category(name)?;
        self.minimap
            .config()
            .borrow_mut()
            .set_enabled(category, enabled);
        Ok(())
    }

    /// Flip a category and return its new state.
    #[wasm_bindgen(js_name = toggleCategory)]
    pub fn toggle_category(&self, name: &str) -> Result<bool, JsValue> {
        let category = parse_category(name)?;
        Ok(self.minimap.config().borrow_mut().toggle(category))
    }

    #[wasm_bindgen(js_name = isCategoryEnabled)]
    pub fn is_category_enabled(&self, name: &str) -> Result<bool, JsValue> {
        let category = parse_category(name)?;
        Ok(self.minimap.config().borrow().is_enabled(category))
    }

    /// Current display config plus per-category entity counts, as JSON.
    #[wasm_bindgen(js_name = panelStateJson)]
    pub fn panel_state_json(&self) -> Result<String, JsValue> {
        let config = self.minimap.config().borrow();
        let store = self.minimap.store().borrow();
        let state = PanelState {
            config: &*config,
            counts: store.count_by_category(),
        };
        to_json(&state)
    }

    /// Decoder counters, as JSON.
    #[wasm_bindgen(js_name = statsJson)]
    pub fn stats_json(&self) -> Result<String, JsValue> {
        to_json(&self.minimap.stats())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[wasm_bindgen(js_name = entityCount)]
    pub fn entity_count(&self) -> u32 {
        self.minimap.entity_count() as u32
    }
}

impl Default for MinimapClient {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// InterceptedSocket
// ---------------------------------------------------------------------------

/// A socket wrapped through [`MinimapClient::wrap_socket`].
#[wasm_bindgen]
pub struct InterceptedSocket {
    inner: InterceptedChannel<WsChannel, Minimap>,
}

#[wasm_bindgen]
impl InterceptedSocket {
    /// Send binary data. The first call attaches the frame observer.
    #[wasm_bindgen]
    pub fn send(&self, data: &[u8]) -> Result<(), JsValue> {
        self.inner.send(data)
    }

    #[wasm_bindgen(getter)]
    pub fn socket(&self) -> web_sys::WebSocket {
        self.inner.inner().socket().clone()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct PanelState<'a> {
    config: &'a moomoo_minimap::DisplayConfig,
    counts: BTreeMap<Category, usize>,
}

fn parse_category(name: &str) -> Result<Category, JsValue> {
    name.parse::<Category>()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}
