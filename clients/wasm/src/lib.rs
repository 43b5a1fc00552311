//! Browser side of the minimap: socket observer, canvas surface and the
//! prototype hooks, exported to the page as [`MinimapClient`].
//!
//! Build with `wasm-pack build --target web` (add `--dev` for debug info).
//! Tests drive real sockets and canvases, so they run in a browser:
//! `wasm-pack test --headless --firefox`.

pub use console_error_panic_hook::set_once as set_panic_hook;

pub mod canvas;
pub mod client;
pub mod hooks;
pub mod socket;

pub use client::{InterceptedSocket, MinimapClient};

use wasm_bindgen::prelude::*;

#[cfg(test)]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

/// Runs on module load: panics and `log` records go to the page console.
#[wasm_bindgen(start)]
pub fn wasm_main() {
    set_panic_hook();
    // A host page may already own the global logger.
    if console_log::init_with_level(log::Level::Debug).is_err() {
        return;
    }
    log::info!("[client] minimap module loaded");
}
