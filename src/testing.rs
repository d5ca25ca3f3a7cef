//! Recording stand-ins for the browser collaborators.

use std::cell::RefCell;
use std::rc::Rc;
use crate::audio::{AudioOut, SoundId};
use crate::game::Transport;
use crate::protocol::{ClientMessage, KeyState, Snapshot};
use crate::surface::{Rect, SheetId, Surface};
use crate::vec2::Vec2;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Resize(f64, f64),
    Save,
    Restore,
    Translate(f64, f64),
    Rotate(f64),
    Fill(String),
    Triangle(Vec2, Vec2, Vec2),
    Circle(Vec2, f64),
    Text(String, Vec2),
    Sprite(SheetId, Rect, Rect),
}

#[derive(Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn fills(&self) -> Vec<String> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Fill(c) => Some(c.clone()),
            _ => None,
        }).collect()
    }

    pub fn circles(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Circle(..))).count()
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, width: f64, height: f64) {
        self.ops.push(DrawOp::Resize(width, height));
    }
    fn save(&mut self) {
        self.ops.push(DrawOp::Save);
    }
    fn restore(&mut self) {
        self.ops.push(DrawOp::Restore);
    }
    fn translate(&mut self, x: f64, y: f64) {
        self.ops.push(DrawOp::Translate(x, y));
    }
    fn rotate(&mut self, radians: f64) {
        self.ops.push(DrawOp::Rotate(radians));
    }
    fn set_fill(&mut self, color: &str) {
        self.ops.push(DrawOp::Fill(color.to_string()));
    }
    fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2) {
        self.ops.push(DrawOp::Triangle(a, b, c));
    }
    fn fill_circle(&mut self, center: Vec2, radius: f64) {
        self.ops.push(DrawOp::Circle(center, radius));
    }
    fn fill_text(&mut self, text: &str, at: Vec2) {
        self.ops.push(DrawOp::Text(text.to_string(), at));
    }
    fn draw_sprite(&mut self, sheet: SheetId, src: Rect, dst: Rect) {
        self.ops.push(DrawOp::Sprite(sheet, src, dst));
    }
}

#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Rc<RefCell<Vec<ClientMessage>>>,
}

impl Transport for RecordingTransport {
    fn send(&mut self, msg: ClientMessage) {
        self.sent.borrow_mut().push(msg);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    Play(SoundId, f64),
    Loop(u32, SoundId, f64),
    StopLoop(u32),
    StopAll,
}

#[derive(Default)]
pub struct RecordingAudio {
    pub events: Rc<RefCell<Vec<AudioEvent>>>,
}

impl AudioOut for RecordingAudio {
    fn play(&mut self, sound: SoundId, volume: f64) {
        self.events.borrow_mut().push(AudioEvent::Play(sound, volume));
    }
    fn set_loop(&mut self, key: u32, sound: SoundId, volume: f64) {
        self.events.borrow_mut().push(AudioEvent::Loop(key, sound, volume));
    }
    fn stop_loop(&mut self, key: u32) {
        self.events.borrow_mut().push(AudioEvent::StopLoop(key));
    }
    fn stop_all(&mut self) {
        self.events.borrow_mut().push(AudioEvent::StopAll);
    }
}

pub fn player_snapshot(id: u32, x: f64, y: f64) -> Snapshot {
    Snapshot {
        id,
        kind: Some("player".into()),
        pos: Vec2::new(x, y),
        vel: Vec2::ZERO,
        rot: Some(0.0),
        rot_vel: Some(0.0),
        keys: Some(KeyState::default()),
        health: Some(100),
        name: None,
        owner_id: None,
    }
}

pub fn bullet_snapshot(id: u32, owner_id: u32) -> Snapshot {
    Snapshot {
        id,
        kind: Some("bullet".into()),
        pos: Vec2::new(3.0, 4.0),
        vel: Vec2::new(1.0, 0.0),
        rot: None,
        rot_vel: None,
        keys: None,
        health: None,
        name: None,
        owner_id: Some(owner_id),
    }
}
