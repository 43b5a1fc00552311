//! Prototype hooks for pages we cannot modify.
//!
//! ```text
//! WebSocket.prototype.send(...args)
//!   try { hook(this) } catch {}          ← one attach attempt per socket
//!   return original.apply(this, args)    ← always, unchanged
//!
//! CanvasRenderingContext2D.prototype.clearRect(...args)
//!   result = original.apply(this, args) ← host clear first
//!   try { hook(this) } catch {}          ← repaint if this.canvas.id == "mapDisplay"
//!   return result
//! ```
//!
//! Wrappers are plain JS functions so the hook receives `this`. A throwing
//! hook can never stop the host's own call from running.

use moomoo_minimap::{ChannelHook, Minimap};
use once_cell::unsync::OnceCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::canvas::{self, CanvasSurface};
use crate::socket::{self, WsChannel};

type HookFn = Closure<dyn FnMut(JsValue)>;

thread_local! {
    // Holding the closure keeps it alive for the page and marks the hook as
    // installed.
    static SEND_HOOK: OnceCell<HookFn> = OnceCell::new();
    static CLEAR_HOOK: OnceCell<HookFn> = OnceCell::new();
}

const WRAP_SEND: &str = "return function(...args) {\
    try { hook(this); } catch (e) { console.warn('[hooks] send hook failed', e); }\
    return original.apply(this, args);\
};";

const WRAP_CLEAR: &str = "return function(...args) {\
    const result = original.apply(this, args);\
    try { hook(this); } catch (e) { console.warn('[hooks] clear hook failed', e); }\
    return result;\
};";

/// Wrap `WebSocket.prototype.send`. Returns `false` if already installed.
pub fn install_send_hook(hook: ChannelHook<Minimap>) -> Result<bool, JsValue> {
    SEND_HOOK.with(|slot| {
        if slot.get().is_some() {
            return Ok(false);
        }

        let on_send = HookFn::new(move |this: JsValue| {
            let Ok(ws) = this.dyn_into::<web_sys::WebSocket>() else {
                log::warn!("[hooks] send called on a non-WebSocket receiver");
                return;
            };
            if !socket::attach_attempted(&ws) {
                hook.attach(&WsChannel::new(ws));
            }
        });

        wrap_method(&prototype_of("WebSocket")?, "send", WRAP_SEND, on_send.as_ref())?;
        let _ = slot.set(on_send);
        log::info!("[hooks] WebSocket.send hook installed");
        Ok(true)
    })
}

/// Wrap `CanvasRenderingContext2D.prototype.clearRect`. Returns `false` if
/// already installed.
pub fn install_clear_hook(minimap: Minimap) -> Result<bool, JsValue> {
    CLEAR_HOOK.with(|slot| {
        if slot.get().is_some() {
            return Ok(false);
        }

        let on_clear = HookFn::new(move |this: JsValue| {
            let Ok(ctx) = this.dyn_into::<web_sys::CanvasRenderingContext2d>() else {
                return;
            };
            let Some(id) = canvas::canvas_id(&ctx) else {
                return;
            };
            minimap.on_surface_cleared(&id, &mut CanvasSurface::new(&ctx));
        });

        wrap_method(
            &prototype_of("CanvasRenderingContext2D")?,
            "clearRect",
            WRAP_CLEAR,
            on_clear.as_ref(),
        )?;
        let _ = slot.set(on_clear);
        log::info!("[hooks] clearRect hook installed");
        Ok(true)
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn prototype_of(constructor: &str) -> Result<JsValue, JsValue> {
    let ctor = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str(constructor))?;
    if ctor.is_undefined() {
        return Err(JsValue::from_str(&format!("{constructor} is not defined")));
    }
    js_sys::Reflect::get(&ctor, &JsValue::from_str("prototype"))
}

/// Replace `proto[method]` with a wrapper built from `wrapper_src`, which
/// sees the previous method as `original` and `hook` under that name.
fn wrap_method(
    proto: &JsValue,
    method: &str,
    wrapper_src: &str,
    hook: &JsValue,
) -> Result<(), JsValue> {
    let key = JsValue::from_str(method);
    let original: js_sys::Function = js_sys::Reflect::get(proto, &key)?.dyn_into()?;
    let factory = js_sys::Function::new_with_args("original, hook", wrapper_src);
    let wrapped = factory.call2(&JsValue::NULL, &original, hook)?;
    js_sys::Reflect::set(proto, &key, &wrapped)?;
    Ok(())
}
