use std::collections::HashMap;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};
use crate::constants::*;
use crate::vec2::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetId {
    BulletDespawn,
    PlayerDespawn,
    Thrust,
}

impl SheetId {
    pub const ALL: [SheetId; 3] = [SheetId::BulletDespawn, SheetId::PlayerDespawn, SheetId::Thrust];

    pub fn spec(self) -> &'static SheetSpec {
        match self {
            SheetId::BulletDespawn => &BULLET_DESPAWN_SHEET,
            SheetId::PlayerDespawn => &PLAYER_DESPAWN_SHEET,
            SheetId::Thrust => &THRUST_SHEET,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// The 2D raster operations the frame pipeline draws with. Transform calls
/// compose like the canvas API: `save`/`restore` bracket `translate`/`rotate`.
pub trait Surface {
    /// Resizes the backing store, which also resets the transform.
    fn resize(&mut self, width: f64, height: f64);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    fn rotate(&mut self, radians: f64);
    fn set_fill(&mut self, color: &str);
    fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2);
    fn fill_circle(&mut self, center: Vec2, radius: f64);
    /// Horizontally centred on `at`.
    fn fill_text(&mut self, text: &str, at: Vec2);
    fn draw_sprite(&mut self, sheet: SheetId, src: Rect, dst: Rect);
}

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    sheets: HashMap<SheetId, HtmlImageElement>,
}

impl CanvasSurface {
    pub fn from_element_id(id: &str) -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let canvas: HtmlCanvasElement = document.get_element_by_id(id)?.dyn_into().ok()?;
        let ctx: CanvasRenderingContext2d = canvas.get_context("2d").ok()??.dyn_into().ok()?;

        let mut sheets = HashMap::new();
        for sheet in SheetId::ALL {
            match HtmlImageElement::new() {
                Ok(img) => {
                    img.set_src(sheet.spec().url);
                    sheets.insert(sheet, img);
                }
                Err(e) => log::warn!("could not allocate image for {:?}: {:?}", sheet, e),
            }
        }

        Some(Self { canvas, ctx, sheets })
    }
}

impl Surface for CanvasSurface {
    fn resize(&mut self, width: f64, height: f64) {
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, x: f64, y: f64) {
        let _ = self.ctx.translate(x, y);
    }

    fn rotate(&mut self, radians: f64) {
        let _ = self.ctx.rotate(radians);
    }

    fn set_fill(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }

    fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2) {
        self.ctx.begin_path();
        self.ctx.move_to(a.x, a.y);
        self.ctx.line_to(b.x, b.y);
        self.ctx.line_to(c.x, c.y);
        self.ctx.close_path();
        self.ctx.fill();
    }

    fn fill_circle(&mut self, center: Vec2, radius: f64) {
        self.ctx.begin_path();
        let _ = self.ctx.arc(center.x, center.y, radius, 0.0, std::f64::consts::PI * 2.0);
        self.ctx.close_path();
        self.ctx.fill();
    }

    fn fill_text(&mut self, text: &str, at: Vec2) {
        self.ctx.set_font("12px monospace");
        self.ctx.set_text_align("center");
        let _ = self.ctx.fill_text(text, at.x, at.y);
    }

    fn draw_sprite(&mut self, sheet: SheetId, src: Rect, dst: Rect) {
        let Some(img) = self.sheets.get(&sheet) else { return };
        if img.natural_width() == 0 { return; } // Not loaded yet
        let _ = self.ctx.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
            img, src.x, src.y, src.w, src.h, dst.x, dst.y, dst.w, dst.h,
        );
    }
}
