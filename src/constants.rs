// Entity geometry (must match server)
pub const PLAYER_WIDTH: f64 = 25.0;
pub const PLAYER_HEIGHT: f64 = 60.0;
pub const BULLET_SIZE: f64 = 5.0;
pub const MAX_HEALTH: i32 = 100;

// Rendering
pub const NAME_LABEL_OFFSET: f64 = 14.0; // px above the silhouette
pub const RADAR_RADIUS: f64 = 120.0;
pub const RADAR_MARKER_SIZE: f64 = 4.0;
pub const LOCAL_BULLET_COLOR: &str = "#ffffff";
pub const ENEMY_BULLET_COLOR: &str = "#ff0000";
pub const LABEL_COLOR: &str = "#ffffffaa";
pub const RADAR_COLOR: &str = "#ff4444";
pub const STAR_COLOR: &str = "#ffffff";
pub const STAR_RADIUS: f64 = 1.0;

// Frame clock
pub const MAX_FRAME_DT_MS: f64 = 250.0;

// Screen shake (magnitudes in px, decay in px per ms)
pub const SHAKE_DECAY: f64 = 0.03;
pub const DAMAGE_SHAKE: f64 = 12.0;
pub const FIRE_SHAKE: f64 = 3.0;
pub const SPRINT_SHAKE: f64 = 2.0;
pub const DEATH_SHAKE: f64 = 60.0;
pub const LOSS_DELAY_MS: f64 = 1200.0;

// Parallax background
pub const BACKGROUND_DENSITY: f64 = 0.5; // stars per px of viewport width
pub const BACKGROUND_SPREAD: f64 = 5.0; // viewports the stars are scattered over
pub const BACKGROUND_MIN_PARALLAX: f64 = 2.0;
pub const BACKGROUND_MAX_PARALLAX: f64 = 8.0;

// Audio
pub const SOUND_FALLOFF: f64 = 1500.0; // px
pub const EFFECT_VOLUME: f64 = 0.6;
pub const THRUST_VOLUME: f64 = 0.4;

// Sprite sheets
pub const DEFAULT_ANIMATION_FPS: f64 = 30.0;
pub const THRUST_FPS: f64 = 20.0;

pub struct SheetSpec {
    pub url: &'static str,
    pub cell_w: f64,
    pub cell_h: f64,
    pub steps_w: u32,
    pub steps_h: u32,
}

pub const BULLET_DESPAWN_SHEET: SheetSpec = SheetSpec {
    url: "assets/imgs/bullet_despawn.png",
    cell_w: 64.0,
    cell_h: 64.0,
    steps_w: 4,
    steps_h: 4,
};

pub const PLAYER_DESPAWN_SHEET: SheetSpec = SheetSpec {
    url: "assets/imgs/player_despawn.png",
    cell_w: 128.0,
    cell_h: 128.0,
    steps_w: 8,
    steps_h: 6,
};

pub const THRUST_SHEET: SheetSpec = SheetSpec {
    url: "assets/imgs/thrust.png",
    cell_w: 32.0,
    cell_h: 64.0,
    steps_w: 4,
    steps_h: 1,
};

pub const BULLET_DESPAWN_SCALE: f64 = 0.5;
pub const PLAYER_DESPAWN_SCALE: f64 = 1.5;

// Sounds
pub const THRUST_SOUND_URL: &str = "assets/sounds/thrust.wav";
pub const BULLET_DESPAWN_SOUND_URL: &str = "assets/sounds/bullet_despawn.wav";
pub const PLAYER_DESPAWN_SOUND_URL: &str = "assets/sounds/player_despawn.wav";

// Network
pub const SOCKET_PATH: &str = "/ws";

// Keyboard codes (KeyboardEvent.keyCode)
pub const KEY_SHIFT: u32 = 16;
pub const KEY_SPACE: u32 = 32;
pub const KEY_LEFT: u32 = 37;
pub const KEY_UP: u32 = 38;
pub const KEY_RIGHT: u32 = 39;
pub const KEY_DOWN: u32 = 40;
