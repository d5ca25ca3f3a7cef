use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use crate::animation::Animations;
use crate::audio::AudioOut;
use crate::background::Background;
use crate::constants::*;
use crate::effects::{attenuate, Effects, Rng, SoundCue};
use crate::entity::{DrawContext, Entity, EntityId};
use crate::input;
use crate::protocol::{Action, ClientMessage, ServerMessage, Snapshot};
use crate::surface::Surface;
use crate::vec2::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the server to assign our id.
    Connecting,
    Running,
    Stopped,
}

/// Outbound half of the socket.
pub trait Transport {
    fn send(&mut self, msg: ClientMessage);
}

/// Whether a key event was one of ours; handled keydowns should not reach the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
}

pub type SharedGame = Rc<RefCell<Game>>;

pub struct Game {
    phase: Phase,
    local_id: Option<EntityId>,
    name: Option<String>,
    camera: Vec2,
    viewport: Vec2,
    entities: BTreeMap<EntityId, Entity>,
    fx: Effects,
    background: Background,
    rng: Rng,
    keymap: HashMap<u32, Action>,
    transport: Box<dyn Transport>,
    audio: Box<dyn AudioOut>,
    loss_countdown: Option<f64>,
    on_loss: Option<Box<dyn FnMut()>>,
}

impl Game {
    pub fn new(transport: Box<dyn Transport>, audio: Box<dyn AudioOut>, name: Option<String>, rng: Rng) -> Self {
        Self {
            phase: Phase::Connecting,
            local_id: None,
            name: name.filter(|n| !n.trim().is_empty()),
            camera: Vec2::ZERO,
            viewport: Vec2::ZERO,
            entities: BTreeMap::new(),
            fx: Effects::new(SHAKE_DECAY),
            background: Background::default(),
            rng,
            keymap: input::default_keymap(),
            transport,
            audio,
            loss_countdown: None,
            on_loss: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_stopped(&self) -> bool {
        self.phase == Phase::Stopped
    }

    pub fn local_id(&self) -> Option<EntityId> {
        self.local_id
    }

    pub fn camera(&self) -> Vec2 {
        self.camera
    }

    pub fn shake(&self) -> f64 {
        self.fx.shake.magnitude()
    }

    /// Raises the camera shake to `amount` if that is larger than what is left.
    pub fn screen_shake(&mut self, amount: f64) {
        self.fx.shake.raise(amount);
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn animations(&self) -> &Animations {
        &self.fx.animations
    }

    /// Called once, at most, when the local player has been eliminated and the
    /// loss delay has run out. It runs inside `frame`, so it must not borrow
    /// the game.
    pub fn set_on_loss(&mut self, f: impl FnMut() + 'static) {
        self.on_loss = Some(Box::new(f));
    }

    pub fn stop(&mut self) {
        if self.phase != Phase::Stopped {
            log::info!("game stopped");
            self.audio.stop_all();
        }
        self.phase = Phase::Stopped;
        self.loss_countdown = None;
    }

    fn local_player_pos(&self) -> Option<Vec2> {
        self.local_id.and_then(|id| self.entities.get(&id)).map(|e| e.pos)
    }

    /// Routes one server message. A stopped game drops everything; nothing
    /// would advance or prune what it created.
    pub fn handle(&mut self, msg: ServerMessage) {
        if self.phase == Phase::Stopped {
            log::debug!("game stopped, dropping {:?}", msg);
            return;
        }
        match msg {
            ServerMessage::Ready => self.request_id(),
            ServerMessage::Set(snaps) => self.merge(&snaps),
            ServerMessage::Despawn(id) => self.despawn(id),
            ServerMessage::AssignedId { id, .. } => self.assign_id(id),
        }
    }

    fn request_id(&mut self) {
        let name = self.name.clone();
        self.transport.send(ClientMessage::GetId { name });
    }

    pub fn assign_id(&mut self, id: EntityId) {
        if self.phase == Phase::Stopped {
            return;
        }
        log::info!("assigned id {}", id);
        self.local_id = Some(id);
        self.phase = Phase::Running;
    }

    /// Merges each snapshot into its entity, creating entities for unseen ids.
    /// Snapshots that cannot create an entity are logged and skipped.
    pub fn merge(&mut self, snaps: &[Snapshot]) {
        for snap in snaps {
            match self.entities.get_mut(&snap.id) {
                Some(entity) => entity.set(snap, self.local_id, &mut self.fx),
                None => match Entity::from_snapshot(snap, self.local_id, &mut self.fx) {
                    Ok(entity) => {
                        self.entities.insert(snap.id, entity);
                    }
                    Err(e) => log::warn!("skipping snapshot: {}", e),
                },
            }
        }
        let listener = self.local_player_pos();
        self.flush_cues(listener);
    }

    pub fn despawn(&mut self, id: EntityId) {
        // hear our own death from where we were
        let listener = self.local_player_pos();
        let Some(mut entity) = self.entities.remove(&id) else {
            log::debug!("despawn for unknown id {}", id);
            return;
        };
        entity.despawn(&mut self.fx);

        if self.local_id == Some(id) {
            log::info!("local player {} destroyed", id);
            self.fx.shake.raise(DEATH_SHAKE);
            if self.phase != Phase::Stopped {
                self.loss_countdown = Some(LOSS_DELAY_MS);
            }
        }
        self.flush_cues(listener);
    }

    fn flush_cues(&mut self, listener: Option<Vec2>) {
        for cue in self.fx.cues.drain(..) {
            match cue {
                SoundCue::At { sound, origin } => {
                    if let Some(volume) = attenuate(listener, origin, EFFECT_VOLUME) {
                        self.audio.play(sound, volume);
                    }
                }
                SoundCue::Loop { key, sound, volume } => self.audio.set_loop(key, sound, volume),
                SoundCue::StopLoop { key } => self.audio.stop_loop(key),
            }
        }
    }

    pub fn key_down(&mut self, key_code: u32) -> KeyOutcome {
        self.forward_key(key_code, ClientMessage::KeyDown)
    }

    pub fn key_up(&mut self, key_code: u32) -> KeyOutcome {
        self.forward_key(key_code, ClientMessage::KeyUp)
    }

    fn forward_key(&mut self, key_code: u32, msg: fn(Action) -> ClientMessage) -> KeyOutcome {
        if self.phase == Phase::Stopped {
            return KeyOutcome::Ignored;
        }
        match self.keymap.get(&key_code) {
            Some(&action) => {
                self.transport.send(msg(action));
                KeyOutcome::Handled
            }
            None => KeyOutcome::Ignored,
        }
    }

    /// One display frame: camera, shake, background, entities (draw, then
    /// extrapolate), animations.
    pub fn frame(&mut self, dt_ms: f64, viewport: Vec2, surface: &mut dyn Surface) {
        if self.phase == Phase::Stopped {
            return;
        }

        if viewport != self.viewport {
            self.viewport = viewport;
            self.background.invalidate();
        }
        surface.resize(viewport.x, viewport.y);

        if let Some(pos) = self.local_player_pos() {
            self.camera = Vec2::new(pos.x - viewport.x / 2.0, pos.y - viewport.y / 2.0);
        }

        let shake = self.fx.shake.sample(dt_ms, &mut self.rng);
        let mut eye = self.camera;
        eye.add(shake);

        self.background.draw(surface, viewport, self.camera, shake, &mut self.rng);

        surface.translate(-eye.x, -eye.y);

        let players: Vec<(EntityId, Vec2)> = self
            .entities
            .values()
            .filter(|e| e.is_player())
            .map(|e| (e.id, e.pos))
            .collect();
        let ctx = DrawContext { local_id: self.local_id, viewport, players: &players };

        for entity in self.entities.values_mut() {
            surface.save();
            surface.translate(entity.pos.x, entity.pos.y);
            entity.draw(surface, &ctx);
            surface.restore();

            entity.update(dt_ms, self.local_id, &mut self.fx);
        }

        self.fx.animations.advance(dt_ms);
        self.fx.animations.draw(surface);

        surface.translate(eye.x, eye.y);

        let listener = self.local_player_pos();
        self.flush_cues(listener);

        self.tick_loss(dt_ms);
    }

    fn tick_loss(&mut self, dt_ms: f64) {
        let Some(left) = self.loss_countdown.as_mut() else { return };
        *left -= dt_ms;
        if *left > 0.0 {
            return;
        }
        self.stop();
        if let Some(mut on_loss) = self.on_loss.take() {
            on_loss();
        }
    }
}
