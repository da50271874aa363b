use glam::DVec3;
use crate::{constants::*, error::FieldError};

/// Ratio thresholds for level of detail selection
///
/// The ratio is the camera distance divided by the display radius of a body. Below `near` the
/// near variant is drawn, below `mid` the mid variant, anything further uses the far billboard
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodThresholds {
    pub near: f64,
    pub mid: f64,
}

impl Default for LodThresholds {
    fn default() -> Self {
        LodThresholds { near: LOD_NEAR_RATIO, mid: LOD_MID_RATIO }
    }
}

/// Simulation tunables shared by every worker of a field
#[derive(Debug, Clone, PartialEq)]
pub struct SimParams {
    pub gravitational_constant: f64,
    pub body_mass: f64, // kg
    pub display_scale: f64, // display units per m
    pub base_display_radius: f64, // display units
    pub collision_timeout: f64, // s
    pub laser_destruction_radius: f64, // m
    pub max_destruction_distance: f64, // m
    pub lod: LodThresholds,
    pub time_multiplier: f64,
    pub max_frame_dt: f64, // s
    pub bodies_per_worker: usize,
}

impl Default for SimParams {
    fn default() -> Self {
        SimParams {
            gravitational_constant: G,
            body_mass: ASTEROID_MASS,
            display_scale: DISPLAY_SCALE,
            base_display_radius: ASTEROID_DISPLAY_RADIUS,
            collision_timeout: COLLISION_TIMEOUT,
            laser_destruction_radius: LASER_DESTRUCTION_RADIUS,
            max_destruction_distance: MAX_DESTRUCTION_DISTANCE,
            lod: LodThresholds::default(),
            time_multiplier: TIME_MULTIPLIER,
            max_frame_dt: MAX_FRAME_DT,
            bodies_per_worker: BODIES_PER_WORKER,
        }
    }
}

impl SimParams {
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.bodies_per_worker == 0 {
            return Err(FieldError::InvalidParams(String::from("bodies_per_worker must be at least 1")))
        }
        if !(self.display_scale > 0.0) {
            return Err(FieldError::InvalidParams(format!("display_scale must be positive, got {}", self.display_scale)))
        }
        if !(self.base_display_radius > 0.0) {
            return Err(FieldError::InvalidParams(format!("base_display_radius must be positive, got {}", self.base_display_radius)))
        }
        if !(self.body_mass > 0.0) {
            return Err(FieldError::InvalidParams(format!("body_mass must be positive, got {}", self.body_mass)))
        }
        if !(self.lod.near > 0.0 && self.lod.near <= self.lod.mid) {
            return Err(FieldError::InvalidParams(format!("lod thresholds must satisfy 0 < near <= mid, got {:?}", self.lod)))
        }
        Ok(())
    }

    /// Radius of a body of the given scale, in physics units
    pub fn physics_radius(&self, scale: f32) -> f64 {
        scale as f64 * self.base_display_radius / self.display_scale
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BeltPreset {
    Saturn, // rings around saturn, slowed down
    Sun, // the main asteroid belt
    Kuiper, // far away, sped up
}

impl BeltPreset {
    pub fn from_name(name: &str) -> Option<BeltPreset> {
        match name.to_ascii_uppercase().as_str() {
            "SATURN" => Some(BeltPreset::Saturn),
            "SUN" => Some(BeltPreset::Sun),
            "KUIPER" => Some(BeltPreset::Kuiper),
            _ => None,
        }
    }

    pub fn config(&self) -> BeltConfig {
        let spin_range = (SATURN_ROTATION_SPEED, 2.0 * SATURN_ROTATION_SPEED);

        match self {
            BeltPreset::Saturn => BeltConfig {
                population: 5000,
                distance: SATURN_RING_DISTANCE,
                spread_divisor: 10.0,
                plane_normal: DVec3::new(SATURN_AXIAL_TILT.sin(), 0.0, SATURN_AXIAL_TILT.cos()),
                scale_range: (0.1, 1.0),
                spin_range,
                orbit_factor: 0.05,
            },
            BeltPreset::Sun => BeltConfig {
                population: 10000,
                distance: MAIN_BELT_DISTANCE,
                spread_divisor: 10.0,
                plane_normal: DVec3::Z,
                scale_range: (0.2, 1.8),
                spin_range,
                orbit_factor: 1.0,
            },
            BeltPreset::Kuiper => BeltConfig {
                population: 100000,
                distance: KUIPER_BELT_DISTANCE,
                spread_divisor: 8.0,
                plane_normal: DVec3::Z,
                scale_range: (1.0, 5.0),
                spin_range,
                orbit_factor: 5.0,
            },
        }
    }
}

/// Shape of a generated belt
#[derive(Debug, Clone, PartialEq)]
pub struct BeltConfig {
    pub population: usize,
    pub distance: f64, // m, mean orbital radius
    pub spread_divisor: f64, // radius standard deviation is distance / spread_divisor
    pub plane_normal: DVec3, // the belt orbits about this axis
    pub scale_range: (f32, f32),
    pub spin_range: (f64, f64), // rad/s
    pub orbit_factor: f64,
}

impl BeltConfig {
    pub fn validate(&self) -> Result<(), FieldError> {
        if !(self.distance > 0.0 && self.distance.is_finite()) {
            return Err(FieldError::InvalidParams(format!("belt distance must be positive, got {}", self.distance)))
        }
        if !(self.spread_divisor > 0.0) {
            return Err(FieldError::InvalidParams(format!("spread_divisor must be positive, got {}", self.spread_divisor)))
        }
        if !(self.plane_normal.length_squared() > 0.0 && self.plane_normal.is_finite()) {
            return Err(FieldError::InvalidParams(format!("plane_normal must be a finite non-zero vector, got {}", self.plane_normal)))
        }
        let (low, high) = self.scale_range;
        if !(low > 0.0 && low <= high && high.is_finite()) {
            return Err(FieldError::InvalidParams(format!("scale_range must satisfy 0 < low <= high, got {:?}", self.scale_range)))
        }
        let (low, high) = self.spin_range;
        if !(low <= high && low.is_finite() && high.is_finite()) {
            return Err(FieldError::InvalidParams(format!("spin_range must satisfy low <= high, got {:?}", self.spin_range)))
        }
        validate_orbit_factor(self.orbit_factor)
    }
}

/// Orbit factors divide the shield push, so they must be positive and finite
pub fn validate_orbit_factor(orbit_factor: f64) -> Result<(), FieldError> {
    if orbit_factor > 0.0 && orbit_factor.is_finite() {
        Ok(())
    } else {
        Err(FieldError::InvalidParams(format!("orbit_factor must be positive, got {}", orbit_factor)))
    }
}
