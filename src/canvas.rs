use crate::vec2::Vec2;

/// Current window size in CSS pixels; zero if the window is unavailable.
pub fn viewport() -> Vec2 {
    let Some(window) = web_sys::window() else { return Vec2::ZERO };
    let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Vec2::new(w, h)
}
