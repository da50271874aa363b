// Helpers organized in order:
// -reflection and ray queries
// -rotations
// -random sampling
// -orbits
//
// Physics quantities are double precision (glam::DVec3), anything handed to the
// renderer is single precision (glam::Vec3, glam::Mat3).

use glam::{DMat3, DQuat, DVec3, Mat3, Quat, Vec3};
use rand::Rng;
use std::f64::consts::TAU;

/// Reflects `v` about the plane with unit normal `normal`
pub fn reflect(v: DVec3, normal: DVec3) -> DVec3 {
    v - 2.0 * v.dot(normal) * normal
}

/// Distance from `point` to the line through `origin` along `direction`, and the line parameter
/// of the closest approach. `direction` is expected to be unit length, so the parameter is a
/// distance along the ray. A zero direction yields a parameter of zero.
pub fn distance_to_ray(point: DVec3, origin: DVec3, direction: DVec3) -> (f64, f64) {
    let t = (point - origin).dot(direction);
    let closest = origin + direction * t;
    (point.length_to(closest), t)
}

/// Rotation taking `from` onto `to`. Degenerate inputs give the identity
pub fn rotation_between(from: DVec3, to: DVec3) -> Mat3 {
    let from = from.normalize_or_zero().as_vec3();
    let to = to.normalize_or_zero().as_vec3();

    if from == Vec3::ZERO || to == Vec3::ZERO {
        return Mat3::IDENTITY
    }
    Mat3::from_quat(Quat::from_rotation_arc(from, to))
}

/// Rotation of a spinning body: +Z is carried onto the spin axis, then the body turns about it
pub fn spin_rotation(axis: DVec3, angle: f64) -> Mat3 {
    rotation_between(DVec3::Z, axis) * Mat3::from_axis_angle(Vec3::Z, angle as f32)
}

/// Rotation of a flat billboard whose +Z normal points along `direction`
pub fn facing_rotation(direction: DVec3) -> Mat3 {
    rotation_between(DVec3::Z, direction)
}

/// Double precision rotation carrying +Z onto `normal`, used to tilt a belt's plane
pub fn inclination(normal: DVec3) -> DMat3 {
    let normal = normal.normalize_or_zero();
    if normal == DVec3::ZERO {
        return DMat3::IDENTITY
    }
    DMat3::from_quat(DQuat::from_rotation_arc(DVec3::Z, normal))
}

/// Uniformly distributed direction on the unit sphere
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> DVec3 {
    let z: f64 = rng.gen_range(-1.0..=1.0);
    let theta: f64 = rng.gen_range(0.0..TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    DVec3::new(r * theta.cos(), r * theta.sin(), z)
}

/// Uniformly distributed direction on the unit circle of the XY plane
pub fn random_planar_direction<R: Rng + ?Sized>(rng: &mut R) -> DVec3 {
    let theta: f64 = rng.gen_range(0.0..TAU);
    DVec3::new(theta.cos(), theta.sin(), 0.0)
}

/// Normally distributed sample (Box-Muller)
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    // 1 - [0, 1) keeps the log argument away from zero
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    mean + std_dev * (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

/// v = sqrt(G * M / r)
pub fn circular_orbit_speed(g: f64, attractor_mass: f64, radius: f64) -> f64 {
    (g * attractor_mass / radius).sqrt()
}

/// Velocity of a circular orbit at `position` (relative to the attractor), turning about `axis`
pub fn circular_orbit_velocity(g: f64, attractor_mass: f64, position: DVec3, axis: DVec3) -> DVec3 {
    let speed = circular_orbit_speed(g, attractor_mass, position.length());
    axis.cross(position).normalize_or_zero() * speed
}

pub trait LengthTo {
    fn length_to(&self, rhs: Self) -> f64;
}

impl LengthTo for DVec3 {
    fn length_to(&self, rhs: Self) -> f64 {
        (*self - rhs).length()
    }
}
