use crate::animation::Animations;
use crate::audio::SoundId;
use crate::constants::SOUND_FALLOFF;
use crate::vec2::Vec2;

/// xorshift64; cheap enough to call per star per frame.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self { state: if seed == 0 { 1 } else { seed } }
    }

    /// Seeds from `Math.random`, browser only.
    pub fn from_entropy() -> Self {
        Self::new((js_sys::Math::random() * u64::MAX as f64) as u64)
    }

    fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in [min, max).
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }
}

/// Camera jitter. The magnitude only goes up through `raise` and decays
/// linearly with frame time.
#[derive(Debug, Clone)]
pub struct ScreenShake {
    magnitude: f64,
    decay: f64,
}

impl ScreenShake {
    pub fn new(decay: f64) -> Self {
        Self { magnitude: 0.0, decay }
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// `shake = max(shake, amount)`
    pub fn raise(&mut self, amount: f64) {
        if amount > self.magnitude {
            self.magnitude = amount;
        }
    }

    /// Picks this frame's offset, each axis in [-shake/2, shake/2], then decays.
    pub fn sample(&mut self, dt_ms: f64, rng: &mut Rng) -> Vec2 {
        if self.magnitude <= 0.0 {
            return Vec2::ZERO;
        }
        let half = self.magnitude / 2.0;
        let offset = Vec2::new(rng.range(-half, half), rng.range(-half, half));
        self.magnitude = (self.magnitude - dt_ms * self.decay).max(0.0);
        offset
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SoundCue {
    /// One-shot effect, attenuated by distance from the local player.
    At { sound: SoundId, origin: Vec2 },
    /// Keyed loop; created on first use, volume 0 silences it.
    Loop { key: u32, sound: SoundId, volume: f64 },
    StopLoop { key: u32 },
}

/// Session services handed to entities: the animation arena, the camera shake,
/// and queued sound cues for the game to play after the call returns.
pub struct Effects {
    pub animations: Animations,
    pub shake: ScreenShake,
    pub cues: Vec<SoundCue>,
}

impl Effects {
    pub fn new(shake_decay: f64) -> Self {
        Self {
            animations: Animations::default(),
            shake: ScreenShake::new(shake_decay),
            cues: Vec::new(),
        }
    }

    pub fn play_at(&mut self, sound: SoundId, origin: Vec2) {
        self.cues.push(SoundCue::At { sound, origin });
    }
}

/// Linear falloff from the listener. `None` when there is no listener or the
/// origin is out of earshot.
pub fn attenuate(listener: Option<Vec2>, origin: Vec2, volume: f64) -> Option<f64> {
    let listener = listener?;
    let dist = listener.distance(origin);
    if dist >= SOUND_FALLOFF {
        return None;
    }
    Some(volume * (1.0 - dist / SOUND_FALLOFF))
}
