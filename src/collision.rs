use glam::DVec3;

/// The player's shield sphere, in physics units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shield {
    pub center: DVec3,
    pub radius: f64,
    pub velocity: DVec3,
}

/// The player's laser ray, in physics units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Laser {
    origin: DVec3,
    direction: DVec3,
}

impl Laser {
    /// The direction is normalized here so ray parameters are distances
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Laser { origin: origin, direction: direction.normalize_or_zero() }
    }

    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    pub fn direction(&self) -> DVec3 {
        self.direction
    }
}

/// Collision volumes active for one frame
///
/// Replaced as a whole by the controller before workers are released, never edited in place
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CollisionSnapshot {
    pub shield: Option<Shield>,
    pub laser: Option<Laser>,
}

impl CollisionSnapshot {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_shield(mut self, shield: Shield) -> Self {
        self.shield = Some(shield);
        self
    }

    pub fn with_laser(mut self, laser: Laser) -> Self {
        self.laser = Some(laser);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.shield.is_none() && self.laser.is_none()
    }
}

/// A shield hit, for the animation feedback of the shield
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub body: usize,
    pub normal: DVec3, // contact normal, from the shield center toward the body
}
