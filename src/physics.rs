// One worker cycle over a contiguous run of bodies. The phases run in order, each over the whole
// run, before the next phase starts:
//   attractor collisions, co-motion, gravity and integration, cooldowns, shield, laser, lod
//
// Everything in here is a total function of its inputs. Positions and velocities are physics
// units (m, m/s), the camera and the emitted records are display units.

use glam::DVec3;
use crate::{
    body::{Body, BodyConfig, LodLevel, LodSelector, RenderRecord},
    collision::{CollisionEvent, CollisionSnapshot, Laser, Shield},
    config::{LodThresholds, SimParams},
    math::*,
};

/// Everything the controller hands the workers for one cycle
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CycleInputs {
    pub dt: f64, // s, real frame time
    pub attractor_position: DVec3, // m, sampled once for the whole cycle
    pub attractor_delta: DVec3, // display units, attractor motion since the previous sample
    pub collisions: CollisionSnapshot,
}

/// Read-only context shared by every body of one cycle
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub params: &'a SimParams,
    pub inputs: &'a CycleInputs,
    pub orbit_factor: f64,
    pub attractor_mass: f64,
    pub attractor_radius: f64,
    pub camera: DVec3,
}

impl<'a> StepContext<'a> {
    /// Physics time covered by this cycle
    pub fn step(&self) -> f64 {
        self.inputs.dt * self.params.time_multiplier
    }
}

/// Runs a full cycle over `bodies`, writing one record per body and pushing shield hits onto
/// `events`. `first_index` is the slot of `bodies[0]`, events carry absolute slots.
pub fn step_range(
    ctx: &StepContext,
    first_index: usize,
    bodies: &mut [Body],
    configs: &[BodyConfig],
    records: &mut [RenderRecord],
    events: &mut Vec<CollisionEvent>,
) {
    debug_assert_eq!(bodies.len(), configs.len());
    debug_assert_eq!(bodies.len(), records.len());

    for body in bodies.iter_mut() {
        deactivate_inside_attractor(body, ctx.inputs.attractor_position, ctx.attractor_radius);
    }

    let shift = ctx.inputs.attractor_delta / ctx.params.display_scale;
    for body in bodies.iter_mut().filter(|b| b.is_active()) {
        body.position += shift;
    }

    let step = ctx.step();
    for body in bodies.iter_mut().filter(|b| b.is_active()) {
        let force = gravity_force(
            body,
            ctx.inputs.attractor_position,
            ctx.attractor_mass,
            ctx.params.gravitational_constant,
            ctx.orbit_factor,
        );
        integrate(body, force, step, ctx.orbit_factor);
    }

    for body in bodies.iter_mut() {
        if body.cooldown > 0.0 {
            body.cooldown -= ctx.inputs.dt;
        }
    }

    if let Some(shield) = ctx.inputs.collisions.shield.as_ref() {
        for (i, (body, config)) in bodies.iter_mut().zip(configs.iter()).enumerate() {
            let radius = ctx.params.physics_radius(config.scale);
            if let Some(normal) = shield_collision(body, radius, shield, ctx.orbit_factor, ctx.params.collision_timeout) {
                events.push(CollisionEvent { body: first_index + i, normal: normal });
            }
        }
    }

    if let Some(laser) = ctx.inputs.collisions.laser.as_ref() {
        for (body, config) in bodies.iter_mut().zip(configs.iter()) {
            let radius = ctx.params.physics_radius(config.scale);
            if body.is_active() && laser_hits(body.position, radius, laser, ctx.params) {
                body.deactivate();
            }
        }
    }

    for ((body, config), record) in bodies.iter().zip(configs.iter()).zip(records.iter_mut()) {
        *record = assemble_record(body, config, ctx.params, ctx.camera);
    }
}

pub fn deactivate_inside_attractor(body: &mut Body, attractor_position: DVec3, collision_radius: f64) {
    if body.is_active() && body.position.length_to(attractor_position) < collision_radius {
        body.deactivate();
    }
}

/// F = G * m * M / d^2 toward the attractor, scaled by orbit_factor^2
///
/// The body's orbit offset shifts the point it is pulled toward. A body sitting exactly on that
/// point feels no force.
pub fn gravity_force(body: &Body, attractor_position: DVec3, attractor_mass: f64, g: f64, orbit_factor: f64) -> DVec3 {
    let d = attractor_position - body.position + body.orbit_offset;
    let distance_squared = d.length_squared();
    if distance_squared == 0.0 {
        return DVec3::ZERO
    }
    let magnitude = g * body.mass * attractor_mass / distance_squared;
    d.normalize() * magnitude * orbit_factor * orbit_factor
}

/// Semi-implicit euler, velocity first
pub fn integrate(body: &mut Body, force: DVec3, step: f64, orbit_factor: f64) {
    if body.is_deactivated() {
        return
    }
    if body.translates {
        body.velocity += force / body.mass * step * orbit_factor;
        body.position += body.velocity * step * orbit_factor;
    }
    if body.rotates {
        body.spin_angle += body.spin_speed * step;
    }
}

/// Bounces an active body off the shield. Returns the contact normal on a hit
pub fn shield_collision(body: &mut Body, body_radius: f64, shield: &Shield, orbit_factor: f64, timeout: f64) -> Option<DVec3> {
    if body.is_deactivated() || body.cooldown > 0.0 {
        return None
    }
    if body.position.length_to(shield.center) >= shield.radius + body_radius {
        return None
    }

    let normal = (body.position - shield.center).normalize_or_zero();
    let speed = body.velocity.length();
    let relative = (body.velocity - shield.velocity).normalize_or_zero();
    let push = shield.velocity * normal.dot(shield.velocity.normalize_or_zero()) / orbit_factor;

    body.velocity = reflect(relative, normal) * speed + push;
    body.cooldown = timeout;
    body.orbit_offset = DVec3::ZERO;
    Some(normal)
}

pub fn laser_hits(position: DVec3, body_radius: f64, laser: &Laser, params: &SimParams) -> bool {
    let (distance, t) = distance_to_ray(position, laser.origin(), laser.direction());
    t > 0.0 && t < params.max_destruction_distance && distance < params.laser_destruction_radius + body_radius
}

pub fn select_lod(ratio: f64, thresholds: &LodThresholds) -> LodLevel {
    if ratio < thresholds.near {
        LodLevel::Near
    } else if ratio < thresholds.mid {
        LodLevel::Mid
    } else {
        LodLevel::Far
    }
}

/// Camera distance in multiples of the body's display radius
pub fn lod_ratio(display_position: DVec3, camera: DVec3, scale: f32, base_display_radius: f64) -> f64 {
    display_position.length_to(camera) / (scale as f64 * base_display_radius)
}

pub fn assemble_record(body: &Body, config: &BodyConfig, params: &SimParams, camera: DVec3) -> RenderRecord {
    if body.is_deactivated() {
        return RenderRecord::hidden(config.scale)
    }

    let display = body.position * params.display_scale;
    let level = select_lod(lod_ratio(display, camera, config.scale, params.base_display_radius), &params.lod);
    let rotation = match level {
        LodLevel::Far => facing_rotation(camera - display),
        _ => spin_rotation(body.spin_axis, body.spin_angle),
    };

    RenderRecord {
        position: display.as_vec3(),
        rotation: rotation,
        selector: Some(LodSelector { group: config.group, level: level }),
        scale: config.scale,
    }
}

/// Record of a body before any cycle has run
pub fn initial_record(body: &Body, config: &BodyConfig, params: &SimParams) -> RenderRecord {
    assemble_record(body, config, params, DVec3::ZERO)
}
