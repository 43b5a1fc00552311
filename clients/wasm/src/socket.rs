//! `WsChannel`: the game's `WebSocket` seen through the [`Channel`] trait.
//!
//! Each socket gets exactly one attach attempt. `ATTEMPTED` records the socket
//! before the listener is added, whatever the outcome, and `OBSERVED` records
//! the ones that carry our `message` listener. The prototype hook and an
//! explicitly wrapped socket share both sets, so they can never attach twice
//! and a failed attach is never retried.

use moomoo_minimap::{Channel, FrameObserver, ObserveError};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

thread_local! {
    static ATTEMPTED: js_sys::WeakSet = js_sys::WeakSet::new();
    static OBSERVED: js_sys::WeakSet = js_sys::WeakSet::new();
}

fn as_key(ws: &web_sys::WebSocket) -> &js_sys::Object {
    ws.unchecked_ref::<js_sys::Object>()
}

/// True if `ws` already has the frame observer attached.
pub fn is_observed(ws: &web_sys::WebSocket) -> bool {
    OBSERVED.with(|set| set.has(as_key(ws)))
}

/// True once `ws` has used its single attach attempt, successful or not.
pub fn attach_attempted(ws: &web_sys::WebSocket) -> bool {
    ATTEMPTED.with(|set| set.has(as_key(ws)))
}

/// Take the attach attempt of `ws`. Returns `false` if it was already taken.
fn claim_attach(ws: &web_sys::WebSocket) -> bool {
    ATTEMPTED.with(|set| {
        if set.has(as_key(ws)) {
            return false;
        }
        set.add(as_key(ws));
        true
    })
}

#[derive(Debug, Clone)]
pub struct WsChannel {
    ws: web_sys::WebSocket,
}

impl WsChannel {
    pub fn new(ws: web_sys::WebSocket) -> Self {
        Self { ws }
    }

    pub fn socket(&self) -> &web_sys::WebSocket {
        &self.ws
    }
}

impl Channel for WsChannel {
    type SendError = JsValue;

    fn send(&self, frame: &[u8]) -> Result<(), JsValue> {
        self.ws.send_with_u8_array(frame)
    }

    fn observe(&self, mut observer: FrameObserver) -> Result<(), ObserveError> {
        if is_observed(&self.ws) {
            return Ok(());
        }
        if !claim_attach(&self.ws) {
            return Err(ObserveError::new("attach already failed for this socket"));
        }

        let onmessage =
            Closure::<dyn FnMut(web_sys::MessageEvent)>::new(move |ev: web_sys::MessageEvent| {
                match frame_bytes(&ev.data()) {
                    Some(bytes) => observer(&bytes),
                    None => log::trace!("[socket] skipping non-binary message"),
                }
            });

        self.ws
            .add_event_listener_with_callback("message", onmessage.as_ref().unchecked_ref())
            .map_err(|e| ObserveError::new(format!("addEventListener failed: {:?}", e)))?;

        // The listener stays for the lifetime of the socket.
        onmessage.forget();
        OBSERVED.with(|set| {
            set.add(as_key(&self.ws));
        });
        Ok(())
    }
}

/// Copy a binary message payload out of JS memory.
fn frame_bytes(data: &JsValue) -> Option<Vec<u8>> {
    if let Some(buf) = data.dyn_ref::<js_sys::ArrayBuffer>() {
        return Some(js_sys::Uint8Array::new(buf).to_vec());
    }
    data.dyn_ref::<js_sys::Uint8Array>().map(|view| view.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    fn socket() -> web_sys::WebSocket {
        // Never connects; the constructor alone is enough for listener tests.
        web_sys::WebSocket::new("ws://127.0.0.1:9").unwrap()
    }

    #[wasm_bindgen_test]
    fn observe_marks_attempted_and_observed() {
        let ws = socket();
        assert!(!attach_attempted(&ws));

        WsChannel::new(ws.clone()).observe(Box::new(|_| {})).unwrap();
        assert!(attach_attempted(&ws));
        assert!(is_observed(&ws));

        // second observe is a no-op
        WsChannel::new(ws.clone()).observe(Box::new(|_| {})).unwrap();
        assert!(is_observed(&ws));
    }

    #[wasm_bindgen_test]
    fn used_attempt_is_not_retried() {
        let ws = socket();
        assert!(claim_attach(&ws));
        assert!(!claim_attach(&ws));

        let err = WsChannel::new(ws.clone())
            .observe(Box::new(|_| {}))
            .unwrap_err();
        assert!(err.reason.contains("already failed"));
        assert!(!is_observed(&ws));
    }

    #[wasm_bindgen_test]
    fn gates_are_per_socket() {
        let first = socket();
        let second = socket();
        assert!(claim_attach(&first));
        assert!(!attach_attempted(&second));
        assert!(claim_attach(&second));
    }

    #[wasm_bindgen_test]
    fn frame_bytes_accepts_buffers_and_views() {
        let view = js_sys::Uint8Array::from(&[1u8, 2, 3][..]);
        assert_eq!(frame_bytes(&view.buffer().into()), Some(vec![1, 2, 3]));
        assert_eq!(frame_bytes(&view.into()), Some(vec![1, 2, 3]));
        assert_eq!(frame_bytes(&JsValue::from_str("text")), None);
    }
}
