use thiserror::Error;
use crate::animation::{Animation, AnimationId};
use crate::audio::SoundId;
use crate::constants::*;
use crate::effects::{Effects, SoundCue};
use crate::protocol::{KeyState, Snapshot};
use crate::surface::{SheetId, Surface};
use crate::vec2::Vec2;

pub type EntityId = u32;

#[derive(Debug, Error, PartialEq)]
pub enum EntityError {
    #[error("unknown entity type {kind:?} for id {id}")]
    UnknownKind { id: EntityId, kind: String },
    #[error("first snapshot for id {0} carries no type")]
    MissingKind(EntityId),
}

#[derive(Debug, Clone)]
pub struct Player {
    pub rot: f64,
    pub rot_vel: f64,
    pub keys: KeyState,
    pub health: i32,
    pub name: String,
    thrust: Option<AnimationId>,
    // Last volume pushed to the thrust loop; None until the loop exists
    thrust_volume: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Bullet {
    pub owner_id: Option<EntityId>,
}

#[derive(Debug, Clone)]
pub enum EntityKind {
    Player(Player),
    Bullet(Bullet),
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub width: f64,
    pub height: f64,
    pub kind: EntityKind,
}

/// What an entity needs to know about the rest of the frame to draw itself.
pub struct DrawContext<'a> {
    pub local_id: Option<EntityId>,
    pub viewport: Vec2,
    /// Positions of every player, including the one drawing.
    pub players: &'a [(EntityId, Vec2)],
}

/// Light for the local player, red for everyone else, both dimming with health.
pub fn health_tint(health: i32, local: bool) -> String {
    let k = health.clamp(0, MAX_HEALTH) as f64 / MAX_HEALTH as f64;
    let v = (105.0 + 150.0 * k).round() as u8;
    if local {
        format!("rgb({},{},{})", v, v, v)
    } else {
        format!("rgb({},0,0)", v)
    }
}

impl Entity {
    /// Builds the entity a first snapshot describes and registers its
    /// permanent effects.
    pub fn from_snapshot(snap: &Snapshot, local_id: Option<EntityId>, fx: &mut Effects) -> Result<Self, EntityError> {
        let kind = match snap.kind.as_deref() {
            Some("player") => {
                let spec = SheetId::Thrust.spec();
                let thrust = Animation::new(SheetId::Thrust, snap.pos)
                    .looping(true)
                    .fps(THRUST_FPS)
                    .offset(Vec2::new(-spec.cell_w / 2.0, PLAYER_HEIGHT / 2.0))
                    .hidden();
                EntityKind::Player(Player {
                    rot: 0.0,
                    rot_vel: 0.0,
                    keys: KeyState::default(),
                    health: MAX_HEALTH,
                    name: String::new(),
                    thrust: Some(fx.animations.add(thrust)),
                    thrust_volume: None,
                })
            }
            Some("bullet") => {
                if snap.owner_id.is_some() && snap.owner_id == local_id {
                    fx.shake.raise(FIRE_SHAKE);
                }
                EntityKind::Bullet(Bullet { owner_id: snap.owner_id })
            }
            Some(other) => {
                return Err(EntityError::UnknownKind { id: snap.id, kind: other.to_string() });
            }
            None => return Err(EntityError::MissingKind(snap.id)),
        };

        let (width, height) = match kind {
            EntityKind::Player(_) => (PLAYER_WIDTH, PLAYER_HEIGHT),
            EntityKind::Bullet(_) => (BULLET_SIZE, BULLET_SIZE),
        };

        let mut entity = Entity { id: snap.id, pos: snap.pos, vel: snap.vel, width, height, kind };
        entity.apply(snap);
        Ok(entity)
    }

    pub fn as_player(&self) -> Option<&Player> {
        match &self.kind {
            EntityKind::Player(p) => Some(p),
            EntityKind::Bullet(_) => None,
        }
    }

    pub fn is_player(&self) -> bool {
        self.as_player().is_some()
    }

    /// Merges an authoritative snapshot. A health drop on the local player
    /// shakes the screen.
    pub fn set(&mut self, snap: &Snapshot, local_id: Option<EntityId>, fx: &mut Effects) {
        if let (EntityKind::Player(p), Some(health)) = (&self.kind, snap.health) {
            if local_id == Some(self.id) && health < p.health {
                fx.shake.raise(DAMAGE_SHAKE);
            }
        }
        self.apply(snap);
    }

    // Position and velocity always; the rest only when the snapshot carries it.
    fn apply(&mut self, snap: &Snapshot) {
        self.pos = snap.pos;
        self.vel = snap.vel;
        if let EntityKind::Player(p) = &mut self.kind {
            if let Some(rot) = snap.rot { p.rot = rot; }
            if let Some(rot_vel) = snap.rot_vel { p.rot_vel = rot_vel; }
            if let Some(keys) = snap.keys { p.keys = keys; }
            if let Some(health) = snap.health { p.health = health; }
            if let Some(name) = &snap.name { p.name = name.clone(); }
        }
    }

    /// Local extrapolation until the next snapshot overwrites it.
    pub fn update(&mut self, dt_ms: f64, local_id: Option<EntityId>, fx: &mut Effects) {
        let is_local = local_id == Some(self.id);

        if let EntityKind::Player(p) = &mut self.kind {
            // The thrust follows the ship as it was drawn this frame
            if let Some(anim) = p.thrust.and_then(|id| fx.animations.get_mut(id)) {
                anim.pos = self.pos;
                anim.rot = p.rot;
                anim.visible = p.keys.up;
            }

            if is_local {
                let volume = if p.keys.sprint { THRUST_VOLUME } else { 0.0 };
                if p.thrust_volume != Some(volume) {
                    fx.cues.push(SoundCue::Loop { key: self.id, sound: SoundId::Thrust, volume });
                    p.thrust_volume = Some(volume);
                }
                if p.keys.up && p.keys.sprint {
                    fx.shake.raise(SPRINT_SHAKE);
                }
            }

            p.rot += p.rot_vel * dt_ms;
        }

        self.pos.x += self.vel.x * dt_ms;
        self.pos.y += self.vel.y * dt_ms;
    }

    /// Draws in entity-local coordinates; the caller has translated to `pos`.
    pub fn draw(&self, surface: &mut dyn Surface, ctx: &DrawContext) {
        let is_local = ctx.local_id == Some(self.id);

        match &self.kind {
            EntityKind::Bullet(b) => {
                let own = b.owner_id.is_some() && b.owner_id == ctx.local_id;
                surface.set_fill(if own { LOCAL_BULLET_COLOR } else { ENEMY_BULLET_COLOR });
                surface.fill_circle(Vec2::ZERO, self.width / 2.0);
            }
            EntityKind::Player(p) => {
                if is_local {
                    self.draw_radar(surface, ctx);
                }

                if !p.name.is_empty() {
                    surface.set_fill(LABEL_COLOR);
                    surface.fill_text(&p.name, Vec2::new(0.0, -self.height / 2.0 - NAME_LABEL_OFFSET));
                }

                surface.set_fill(&health_tint(p.health, is_local));
                surface.rotate(p.rot);
                surface.fill_triangle(
                    Vec2::new(0.0, -self.height / 2.0),
                    Vec2::new(-self.width, self.height / 2.0),
                    Vec2::new(self.width, self.height / 2.0),
                );
            }
        }
    }

    // Markers on a ring around the local player pointing at players off screen.
    fn draw_radar(&self, surface: &mut dyn Surface, ctx: &DrawContext) {
        let half = Vec2::new(ctx.viewport.x / 2.0, ctx.viewport.y / 2.0);
        surface.set_fill(RADAR_COLOR);
        for &(id, pos) in ctx.players {
            if id == self.id {
                continue;
            }
            let mut dir = pos;
            dir.sub(self.pos);
            if dir.x.abs() <= half.x && dir.y.abs() <= half.y {
                continue;
            }
            dir.normalize().scale(RADAR_RADIUS);
            surface.fill_circle(dir, RADAR_MARKER_SIZE);
        }
    }

    /// Teardown effect at the last known position.
    pub fn despawn(&mut self, fx: &mut Effects) {
        match &mut self.kind {
            EntityKind::Bullet(_) => {
                let anim = Animation::new(SheetId::BulletDespawn, self.pos)
                    .scaled(BULLET_DESPAWN_SCALE)
                    .centered();
                fx.animations.add(anim);
                fx.play_at(SoundId::BulletDespawn, self.pos);
            }
            EntityKind::Player(p) => {
                let anim = Animation::new(SheetId::PlayerDespawn, self.pos)
                    .scaled(PLAYER_DESPAWN_SCALE)
                    .centered();
                fx.animations.add(anim);
                if let Some(id) = p.thrust.take() {
                    fx.animations.remove(id);
                }
                if p.thrust_volume.take().is_some() {
                    fx.cues.push(SoundCue::StopLoop { key: self.id });
                }
                fx.play_at(SoundId::PlayerDespawn, self.pos);
            }
        }
    }
}
