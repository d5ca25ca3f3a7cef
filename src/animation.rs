use std::collections::BTreeMap;
use crate::constants::DEFAULT_ANIMATION_FPS;
use crate::surface::{Rect, SheetId, Surface};
use crate::vec2::Vec2;

pub type AnimationId = u64;

/// Frame-sheet animator. Frames advance from the accumulated frame delta at
/// `fps`, independent of the render cadence.
pub struct Animation {
    sheet: SheetId,
    pub pos: Vec2,
    pub rot: f64,
    pub offset: Vec2,
    pub visible: bool,
    cell_w: f64,
    cell_h: f64,
    dst_w: f64,
    dst_h: f64,
    steps_w: u32,
    steps_h: u32,
    nsteps: u32,
    looping: bool,
    fps: f64,
    step: u32,
    step_w: u32,
    step_h: u32,
    elapsed: f64,
    running: bool,
    on_end: Option<Box<dyn FnMut()>>,
}

impl Animation {
    /// Geometry comes from the sheet: cell size, grid steps, and a destination
    /// the size of one cell. Non-looping, visible, at the default rate.
    pub fn new(sheet: SheetId, pos: Vec2) -> Self {
        let spec = sheet.spec();
        Self {
            sheet,
            pos,
            rot: 0.0,
            offset: Vec2::ZERO,
            visible: true,
            cell_w: spec.cell_w,
            cell_h: spec.cell_h,
            dst_w: spec.cell_w,
            dst_h: spec.cell_h,
            steps_w: spec.steps_w.max(1),
            steps_h: spec.steps_h.max(1),
            nsteps: (spec.steps_w * spec.steps_h).max(1),
            looping: false,
            fps: DEFAULT_ANIMATION_FPS,
            step: 0,
            step_w: 0,
            step_h: 0,
            elapsed: 0.0,
            running: true,
            on_end: None,
        }
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    /// Plays only the first `nsteps` cells; capped at the size of the grid.
    pub fn steps(mut self, nsteps: u32) -> Self {
        self.nsteps = nsteps.clamp(1, self.steps_w * self.steps_h);
        self
    }

    pub fn dest_size(mut self, w: f64, h: f64) -> Self {
        self.dst_w = w;
        self.dst_h = h;
        self
    }

    pub fn scaled(self, factor: f64) -> Self {
        let (w, h) = (self.cell_w * factor, self.cell_h * factor);
        self.dest_size(w, h)
    }

    pub fn rotation(mut self, rot: f64) -> Self {
        self.rot = rot;
        self
    }

    pub fn offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Offsets the destination so the frame is centred on `pos`.
    pub fn centered(self) -> Self {
        let offset = Vec2::new(-self.dst_w / 2.0, -self.dst_h / 2.0);
        self.offset(offset)
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Hook for callers that want to chain work onto a one-shot. The arena
    /// prunes on the return of `advance` and does not need it.
    pub fn set_on_end(&mut self, f: impl FnMut() + 'static) {
        self.on_end = Some(Box::new(f));
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current_step(&self) -> u32 {
        self.step
    }

    pub fn source_rect(&self) -> Rect {
        Rect::new(
            self.step_w as f64 * self.cell_w,
            self.step_h as f64 * self.cell_h,
            self.cell_w,
            self.cell_h,
        )
    }

    /// One step of the sequence. Returns true when a non-looping sequence
    /// completes on this step.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }

        self.step += 1;
        self.step_w += 1;
        if self.step_w >= self.steps_w {
            self.step_w = 0;
            self.step_h += 1;
        }

        if self.step >= self.nsteps {
            self.step = 0;
            self.step_w = 0;
            self.step_h = 0;
            if !self.looping {
                self.running = false;
                if let Some(on_end) = self.on_end.as_mut() {
                    on_end();
                }
                return true;
            }
        }
        false
    }

    /// Feeds `dt_ms` into the accumulator and takes as many steps as it
    /// covers. Returns true if the sequence completed during this call.
    pub fn advance(&mut self, dt_ms: f64) -> bool {
        if !self.running || self.fps <= 0.0 {
            return false;
        }
        let interval = 1000.0 / self.fps;
        self.elapsed += dt_ms;
        while self.elapsed >= interval {
            self.elapsed -= interval;
            if self.tick() {
                self.elapsed = 0.0;
                return true;
            }
        }
        false
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        if !self.visible {
            return;
        }
        surface.translate(self.pos.x, self.pos.y);
        if self.rot != 0.0 {
            surface.rotate(self.rot);
        }
        surface.draw_sprite(
            self.sheet,
            self.source_rect(),
            Rect::new(self.offset.x, self.offset.y, self.dst_w, self.dst_h),
        );
        if self.rot != 0.0 {
            surface.rotate(-self.rot);
        }
    }
}

/// Active animations, drawn in creation order. Entities hold `AnimationId`s
/// rather than references.
#[derive(Default)]
pub struct Animations {
    next_id: AnimationId,
    active: BTreeMap<AnimationId, Animation>,
}

impl Animations {
    pub fn add(&mut self, animation: Animation) -> AnimationId {
        let id = self.next_id;
        self.next_id += 1;
        self.active.insert(id, animation);
        id
    }

    pub fn get(&self, id: AnimationId) -> Option<&Animation> {
        self.active.get(&id)
    }

    pub fn get_mut(&mut self, id: AnimationId) -> Option<&mut Animation> {
        self.active.get_mut(&id)
    }

    pub fn remove(&mut self, id: AnimationId) -> Option<Animation> {
        self.active.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AnimationId, &Animation)> {
        self.active.iter()
    }

    /// Advances every animation and drops the ones whose sequence ended.
    /// Returns how many were dropped.
    pub fn advance(&mut self, dt_ms: f64) -> usize {
        let before = self.active.len();
        self.active.retain(|_, anim| !anim.advance(dt_ms) && anim.is_running());
        before - self.active.len()
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        for anim in self.active.values() {
            surface.save();
            anim.draw(surface);
            surface.restore();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use crate::testing::{DrawOp, RecordingSurface};

    #[test]
    fn non_looping_fires_once_after_nsteps_ticks() {
        let fired = Rc::new(Cell::new(0));
        let mut anim = Animation::new(SheetId::BulletDespawn, Vec2::ZERO);
        let counter = fired.clone();
        anim.set_on_end(move || counter.set(counter.get() + 1));

        let nsteps = 16; // 4x4 sheet
        for _ in 0..nsteps - 1 {
            assert!(!anim.tick());
        }
        assert_eq!(fired.get(), 0);
        assert!(anim.tick());
        assert_eq!(fired.get(), 1);
        assert!(!anim.is_running());

        for _ in 0..40 {
            anim.tick();
            anim.advance(1000.0);
        }
        assert_eq!(fired.get(), 1);
        assert_eq!(anim.current_step(), 0);
    }

    #[test]
    fn looping_wraps_without_completing() {
        let mut anim = Animation::new(SheetId::Thrust, Vec2::ZERO).looping(true);
        for _ in 0..20 {
            assert!(!anim.tick());
        }
        assert!(anim.is_running());
        assert_eq!(anim.current_step(), 0); // 20 is a multiple of 4
    }

    #[test]
    fn explicit_step_count_overrides_grid() {
        let mut anim = Animation::new(SheetId::PlayerDespawn, Vec2::ZERO).steps(3);
        assert!(!anim.tick());
        assert!(!anim.tick());
        assert!(anim.tick());
    }

    #[test]
    fn step_count_past_the_grid_is_capped() {
        let mut anim = Animation::new(SheetId::BulletDespawn, Vec2::ZERO).steps(100);
        for _ in 0..15 {
            assert!(!anim.tick());
            let src = anim.source_rect();
            assert!(src.x < 4.0 * 64.0 && src.y < 4.0 * 64.0);
        }
        assert!(anim.tick());
    }

    #[test]
    fn source_rect_walks_the_grid() {
        let mut anim = Animation::new(SheetId::BulletDespawn, Vec2::ZERO);
        for _ in 0..5 {
            anim.tick();
        }
        // 4 columns: step 5 is column 1 of row 1
        assert_eq!(anim.source_rect(), Rect::new(64.0, 64.0, 64.0, 64.0));
    }

    #[test]
    fn advance_accumulates_sub_interval_deltas() {
        let mut anim = Animation::new(SheetId::BulletDespawn, Vec2::ZERO).fps(10.0);
        anim.advance(60.0);
        assert_eq!(anim.current_step(), 0);
        anim.advance(60.0);
        assert_eq!(anim.current_step(), 1);
        anim.advance(250.0);
        assert_eq!(anim.current_step(), 3);
    }

    #[test]
    fn hidden_animation_draws_nothing() {
        let mut surface = RecordingSurface::default();
        let mut anim = Animation::new(SheetId::Thrust, Vec2::new(5.0, 5.0)).hidden();
        anim.draw(&mut surface);
        assert!(surface.ops.is_empty());

        anim.visible = true;
        anim.draw(&mut surface);
        assert!(surface.ops.iter().any(|op| matches!(op, DrawOp::Sprite(SheetId::Thrust, _, _))));
    }

    #[test]
    fn rotation_is_undone_after_draw() {
        let mut surface = RecordingSurface::default();
        let anim = Animation::new(SheetId::Thrust, Vec2::new(1.0, 2.0)).rotation(0.5).centered();
        anim.draw(&mut surface);
        assert_eq!(
            surface.ops,
            vec![
                DrawOp::Translate(1.0, 2.0),
                DrawOp::Rotate(0.5),
                DrawOp::Sprite(SheetId::Thrust, Rect::new(0.0, 0.0, 32.0, 64.0), Rect::new(-16.0, -32.0, 32.0, 64.0)),
                DrawOp::Rotate(-0.5),
            ]
        );
    }

    #[test]
    fn arena_prunes_finished_sequences() {
        let mut anims = Animations::default();
        anims.add(Animation::new(SheetId::BulletDespawn, Vec2::ZERO).fps(1000.0));
        let thrust = anims.add(Animation::new(SheetId::Thrust, Vec2::ZERO).looping(true));

        assert_eq!(anims.advance(15.0), 0);
        assert_eq!(anims.advance(1.0), 1);
        assert_eq!(anims.len(), 1);
        assert!(anims.get(thrust).is_some());
    }
}
