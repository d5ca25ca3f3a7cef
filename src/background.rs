use crate::constants::*;
use crate::effects::Rng;
use crate::surface::Surface;
use crate::vec2::Vec2;

#[derive(Debug, Clone, Copy)]
struct Star {
    pos: Vec2,
    parallax: f64,
}

/// Camera-relative star field. Stars are generated on first draw for the
/// current viewport and regenerated after `invalidate`.
#[derive(Debug, Default)]
pub struct Background {
    stars: Option<Vec<Star>>,
}

impl Background {
    pub fn invalidate(&mut self) {
        self.stars = None;
    }

    pub fn is_cached(&self) -> bool {
        self.stars.is_some()
    }

    fn generate(viewport: Vec2, rng: &mut Rng) -> Vec<Star> {
        let count = (viewport.x * BACKGROUND_DENSITY).max(0.0) as usize;
        (0..count)
            .map(|_| Star {
                pos: Vec2::new(
                    rng.range(0.0, viewport.x * BACKGROUND_SPREAD),
                    rng.range(0.0, viewport.y * BACKGROUND_SPREAD),
                ),
                parallax: rng.range(BACKGROUND_MIN_PARALLAX, BACKGROUND_MAX_PARALLAX),
            })
            .collect()
    }

    /// Screen positions of every star for this camera, each wrapped into
    /// `[0, width) x [0, height)`.
    pub fn screen_points(&mut self, viewport: Vec2, camera: Vec2, shake: Vec2, rng: &mut Rng) -> Vec<Vec2> {
        let stars = self.stars.get_or_insert_with(|| Self::generate(viewport, rng));
        stars
            .iter()
            .map(|star| {
                let x = (star.pos.x - camera.x) / star.parallax + shake.x;
                let y = (star.pos.y - camera.y) / star.parallax + shake.y;
                Vec2::new(wrap(x, viewport.x), wrap(y, viewport.y))
            })
            .collect()
    }

    pub fn draw(&mut self, surface: &mut dyn Surface, viewport: Vec2, camera: Vec2, shake: Vec2, rng: &mut Rng) {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return;
        }
        surface.set_fill(STAR_COLOR);
        for p in self.screen_points(viewport, camera, shake, rng) {
            surface.fill_circle(p, STAR_RADIUS);
        }
    }
}

// rem_euclid can round up to `size` for tiny negative inputs
fn wrap(v: f64, size: f64) -> f64 {
    if size <= 0.0 {
        return 0.0;
    }
    let w = v.rem_euclid(size);
    if w >= size { 0.0 } else { w }
}
