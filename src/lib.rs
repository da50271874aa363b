pub mod constants;
pub mod math;
pub mod config;
pub mod error;
pub mod attractor;
pub mod body;
pub mod collision;
pub mod barrier;
pub mod channel;
pub mod physics;
pub mod worker;
pub mod pool;
pub mod field;
pub mod output;
pub mod cli;

pub use attractor::{Attractor, AttractorHandle};
pub use body::{Asteroid, Body, BodyConfig, DrawableHandle, GroupId, LodCatalog, LodGroup, LodLevel, LodSelector, RenderRecord};
pub use collision::{CollisionEvent, CollisionSnapshot, Laser, Shield};
pub use config::{BeltConfig, BeltPreset, LodThresholds, SimParams};
pub use error::FieldError;
pub use field::{AsteroidField, FrameBatches, Instance, InstanceBatch};

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Notes
//
// Units:
//  Physics runs in SI units and double precision (m, kg, s). Everything handed to a renderer is in display units,
//  physics metres times SimParams::display_scale, and single precision. The camera position is in display units.
//
// Coordinate system:
//  A belt lies in the XY plane of its own frame, orbiting about +Z, then gets tilted onto its plane normal.
//  Bodies keep absolute positions. When the attractor moves the whole belt is shifted by the same delta
//  each frame, so nothing is re-derived from the attractor's absolute position.
//
// Threading:
//  One controller (the caller of AsteroidField) and one worker thread per partition of bodies_per_worker bodies.
//  Controller per frame: wait for all workers -> swap the frame channel -> build batches -> publish inputs -> release.
//  Workers per cycle: read inputs and camera -> step own partition -> write own records -> mark done -> wait.
//  The partition locks are only ever taken by their worker while cycling, and by the controller in between.
//
// Time:
//  A frame's real dt is clamped to max_frame_dt, physics steps dt * time_multiplier. Collision cooldowns
//  count real time.
//
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
