use glam::{DVec3, Mat3, Vec3};
use std::fmt::{Display, Formatter};

/// Mutable simulation state of one asteroid
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub mass: f64, // kg
    pub position: DVec3, // m
    pub velocity: DVec3, // m/s
    pub spin_axis: DVec3,
    pub spin_angle: f64, // rad
    pub spin_speed: f64, // rad/s
    pub translates: bool,
    pub rotates: bool,
    pub cooldown: f64, // s, time left before the shield can hit this body again
    pub orbit_offset: DVec3, // m, biases the gravity target until a shield hit detaches the body
    deactivated: bool,
}

impl Body {
    pub fn new(mass: f64, position: DVec3, spin_axis: DVec3) -> Body {
        Body {
            mass: mass,
            position: position,
            velocity: DVec3::ZERO,
            spin_axis: spin_axis,
            spin_angle: 0.0,
            spin_speed: 0.0,
            translates: true,
            rotates: true,
            cooldown: 0.0,
            orbit_offset: DVec3::ZERO,
            deactivated: false,
        }
    }

    pub fn with_velocity(mut self, velocity: DVec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_spin_speed(mut self, spin_speed: f64) -> Self {
        self.spin_speed = spin_speed;
        self
    }

    pub fn is_deactivated(&self) -> bool {
        self.deactivated
    }

    pub fn is_active(&self) -> bool {
        !self.deactivated
    }

    /// Removes the body from the simulation for good. There is no way back
    pub fn deactivate(&mut self) {
        self.deactivated = true;
    }
}

/// Logical shape id, an index into the field's `LodCatalog`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub usize);

impl Display for GroupId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable per-body data, indexed like the body array
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyConfig {
    pub scale: f32,
    pub group: GroupId,
    pub base_offset: DVec3, // m
}

/// A body paired with its configuration, the unit a field is configured from
#[derive(Debug, Clone, PartialEq)]
pub struct Asteroid {
    pub body: Body,
    pub config: BodyConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LodLevel {
    Near,
    Mid,
    Far, // camera facing billboard
}

impl LodLevel {
    pub const ALL: [LodLevel; 3] = [LodLevel::Near, LodLevel::Mid, LodLevel::Far];

    pub fn index(&self) -> usize {
        match self {
            LodLevel::Near => 0,
            LodLevel::Mid => 1,
            LodLevel::Far => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LodSelector {
    pub group: GroupId,
    pub level: LodLevel,
}

/// Opaque handle to something the renderer can draw, never interpreted here
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawableHandle(pub u32);

/// The three drawable variants of one asteroid shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LodGroup {
    pub near: DrawableHandle,
    pub mid: DrawableHandle,
    pub far: DrawableHandle,
}

impl LodGroup {
    pub fn variant(&self, level: LodLevel) -> DrawableHandle {
        match level {
            LodLevel::Near => self.near,
            LodLevel::Mid => self.mid,
            LodLevel::Far => self.far,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LodCatalog {
    groups: Vec<LodGroup>,
}

impl LodCatalog {
    pub fn new(groups: Vec<LodGroup>) -> Self {
        LodCatalog { groups: groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn contains(&self, group: GroupId) -> bool {
        group.0 < self.groups.len()
    }

    pub fn group(&self, group: GroupId) -> Option<&LodGroup> {
        self.groups.get(group.0)
    }

    pub fn drawable(&self, selector: LodSelector) -> Option<DrawableHandle> {
        self.group(selector.group).map(|group| group.variant(selector.level))
    }

    pub fn iter(&self) -> impl Iterator<Item = (GroupId, &LodGroup)> {
        self.groups.iter().enumerate().map(|(i, group)| (GroupId(i), group))
    }
}

/// Per-body output of one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRecord {
    pub position: Vec3, // display units
    pub rotation: Mat3,
    pub selector: Option<LodSelector>, // None for deactivated bodies
    pub scale: f32,
}

impl RenderRecord {
    pub fn hidden(scale: f32) -> Self {
        RenderRecord {
            position: Vec3::ZERO,
            rotation: Mat3::IDENTITY,
            selector: None,
            scale: scale,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.selector.is_none()
    }
}
