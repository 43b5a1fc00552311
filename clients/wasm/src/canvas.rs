//! Canvas2D drawing surface.

use std::f64::consts::TAU;

use moomoo_minimap::{Dot, DrawSurface};
use web_sys::CanvasRenderingContext2d;

pub struct CanvasSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasSurface<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl DrawSurface for CanvasSurface<'_> {
    fn draw_dot(&mut self, dot: &Dot<'_>) {
        self.ctx.begin_path();
        if let Err(e) = self
            .ctx
            .arc(dot.center.x, dot.center.y, dot.radius, 0.0, TAU)
        {
            log::warn!("[canvas] arc rejected (radius {}): {:?}", dot.radius, e);
            return;
        }
        self.ctx.set_fill_style_str(dot.color);
        self.ctx.fill();
        self.ctx.set_stroke_style_str(dot.color);
        self.ctx.stroke();
    }
}

/// Element id of the canvas behind `ctx`, if it has one.
pub fn canvas_id(ctx: &CanvasRenderingContext2d) -> Option<String> {
    ctx.canvas().map(|canvas| canvas.id())
}
