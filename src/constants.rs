
pub const G: f64 = 0.0000000000667408;

pub const SOL_MASS: f64 = 1989000000000000000000000000000.0; // kg
pub const SOL_RADIUS: f32 = 696340000.0; // m

pub const SATURN_MASS: f64 = 568300000000000000000000000.0; // kg
pub const SATURN_RADIUS: f32 = 58232000.0; // m
pub const SATURN_DIST_TO_SOL: f64 = 1433530000000.0; // m
pub const SATURN_ROTATION_SPEED: f64 = 0.000163785; // rad/s, one turn every 10.7h
pub const SATURN_AXIAL_TILT: f64 = 0.466526; // rad, 26.73 degrees

// belt distances from their attractor
pub const SATURN_RING_DISTANCE: f64 = 120000000.0; // m
pub const MAIN_BELT_DISTANCE: f64 = 408170000000.0; // m
pub const KUIPER_BELT_DISTANCE: f64 = 4000000000000.0; // m

pub const ASTEROID_MASS: f64 = 1000000000000.0; // kg

// the thickness of a belt relative to its distance. too big and bodies stop following a centered orbit
pub const BELT_JITTER_FACTOR: f64 = 1.0 / 30.0;

pub const DISPLAY_SCALE: f64 = 0.000000001; // display units per m
pub const ASTEROID_DISPLAY_RADIUS: f64 = 0.1; // display units, for a scale 1 body

pub const COLLISION_TIMEOUT: f64 = 1.0; // s
pub const LASER_DESTRUCTION_RADIUS: f64 = 50000000.0; // m
pub const MAX_DESTRUCTION_DISTANCE: f64 = 50000000000.0; // m

pub const LOD_NEAR_RATIO: f64 = 100.0;
pub const LOD_MID_RATIO: f64 = 200.0;

pub const TIME_MULTIPLIER: f64 = 86400.0; // 1s real time = 1 day simulated
pub const MAX_FRAME_DT: f64 = 1.0 / 30.0; // s, anything longer breaks orbits
pub const DEFAULT_FRAME_DT: f64 = 1.0 / 60.0; // s

pub const BODIES_PER_WORKER: usize = 2500;

pub const MAX_PENDING_COLLISION_EVENTS: usize = 4096; // undrained shield hits beyond this are dropped
