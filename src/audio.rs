use std::collections::HashMap;
use web_sys::HtmlAudioElement;
use crate::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundId {
    Thrust,
    BulletDespawn,
    PlayerDespawn,
}

impl SoundId {
    pub fn url(self) -> &'static str {
        match self {
            SoundId::Thrust => THRUST_SOUND_URL,
            SoundId::BulletDespawn => BULLET_DESPAWN_SOUND_URL,
            SoundId::PlayerDespawn => PLAYER_DESPAWN_SOUND_URL,
        }
    }
}

/// Where sound cues end up. Volume doubles as the on/off switch for loops.
pub trait AudioOut {
    fn play(&mut self, sound: SoundId, volume: f64);
    fn set_loop(&mut self, key: u32, sound: SoundId, volume: f64);
    fn stop_loop(&mut self, key: u32);
    /// Silences every loop; one-shots are left to finish.
    fn stop_all(&mut self);
}

/// `<audio>` elements: a fresh element per one-shot, one kept element per loop.
#[derive(Default)]
pub struct WebAudio {
    loops: HashMap<u32, HtmlAudioElement>,
}

impl WebAudio {
    fn element(sound: SoundId) -> Option<HtmlAudioElement> {
        match HtmlAudioElement::new_with_src(sound.url()) {
            Ok(el) => Some(el),
            Err(e) => {
                log::warn!("could not create audio element for {:?}: {:?}", sound, e);
                None
            }
        }
    }
}

impl AudioOut for WebAudio {
    fn play(&mut self, sound: SoundId, volume: f64) {
        if let Some(el) = Self::element(sound) {
            el.set_volume(volume.clamp(0.0, 1.0));
            let _ = el.play();
        }
    }

    fn set_loop(&mut self, key: u32, sound: SoundId, volume: f64) {
        if !self.loops.contains_key(&key) {
            let Some(el) = Self::element(sound) else { return };
            el.set_loop(true);
            let _ = el.play();
            self.loops.insert(key, el);
        }
        if let Some(el) = self.loops.get(&key) {
            el.set_volume(volume.clamp(0.0, 1.0));
        }
    }

    fn stop_loop(&mut self, key: u32) {
        if let Some(el) = self.loops.remove(&key) {
            let _ = el.pause();
        }
    }

    fn stop_all(&mut self) {
        for (_, el) in self.loops.drain() {
            let _ = el.pause();
        }
    }
}
