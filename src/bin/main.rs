extern crate beltsim;
use beltsim::attractor::{Attractor, AttractorHandle};
use beltsim::body::{DrawableHandle, LodCatalog, LodGroup};
use beltsim::cli::{self, RunConfig};
use beltsim::collision::{CollisionSnapshot, Laser, Shield};
use beltsim::config::BeltPreset;
use beltsim::constants::*;
use beltsim::field::AsteroidField;
use beltsim::math::circular_orbit_speed;
use beltsim::output::{FrameStats, OutputDevice, OutputField};
use glam::DVec3;
use rand::{rngs::StdRng, SeedableRng};
use std::{process, sync::Arc};

const SHAPES: u32 = 4; // asteroid shapes in the stand-in catalog

fn main() {
    env_logger::init();

    let matches = cli::parse_command_line();
    let config = match RunConfig::from_matches(&matches) {
        Ok(config) => config,
        Err(e) => e.exit(),
    };

    if let Err(e) = run(config) {
        log::error!("{}", e);
        process::exit(1);
    }
}

fn run(config: RunConfig) -> Result<(), beltsim::error::FieldError> {
    // the renderer would hand over real meshes, any distinct handles do here
    let catalog = LodCatalog::new((0..SHAPES).map(|shape| LodGroup {
        near: DrawableHandle(shape * 3),
        mid: DrawableHandle(shape * 3 + 1),
        far: DrawableHandle(shape * 3 + 2),
    }).collect());

    let (mass, radius, orbit_radius) = match config.preset {
        BeltPreset::Saturn => (SATURN_MASS, SATURN_RADIUS, SATURN_DIST_TO_SOL),
        BeltPreset::Sun | BeltPreset::Kuiper => (SOL_MASS, SOL_RADIUS, 0.0),
    };
    let handle = Arc::new(AttractorHandle::new(mass, DVec3::new(orbit_radius, 0.0, 0.0), radius));
    let attractor: Arc<dyn Attractor> = handle.clone();

    let mut rng = StdRng::seed_from_u64(config.seed);
    let params = config.params.clone();
    let mut field = AsteroidField::generate(&config.belt, attractor, catalog, params.clone(), &mut rng)?;

    // saturn circles the sun, the other belts sit still at the origin
    let orbit_speed = if orbit_radius > 0.0 {
        circular_orbit_speed(params.gravitational_constant, SOL_MASS, orbit_radius) / orbit_radius
    } else {
        0.0
    };
    let dt = DEFAULT_FRAME_DT;
    let step = dt * params.time_multiplier;
    let belt_radius = config.belt.distance;

    let mut fields = vec![OutputField::Frames, OutputField::Population, OutputField::Lod];
    if config.shield {
        fields.push(OutputField::Collisions);
    }
    if orbit_speed > 0.0 {
        fields.push(OutputField::Attractor);
    }
    let mut output = OutputDevice::new(fields, config.frequency);

    field.publish_frame_time(dt);
    field.publish_camera_position(camera_for(handle.position(), belt_radius, params.display_scale));
    field.start()?;

    let mut angle = 0.0f64;
    for frame in 1..=config.frames {
        angle += orbit_speed * step;
        let center = DVec3::new(angle.cos(), angle.sin(), 0.0) * orbit_radius;
        handle.set_position(center);

        let sweep = frame as f64 / config.frames.max(1) as f64 * std::f64::consts::TAU;
        let mut snapshot = CollisionSnapshot::none();
        if config.shield {
            snapshot = snapshot.with_shield(Shield {
                center: center + DVec3::new(sweep.cos(), sweep.sin(), 0.0) * belt_radius,
                radius: belt_radius * 0.05,
                velocity: DVec3::new(-sweep.sin(), sweep.cos(), 0.0) * belt_radius * 0.1,
            });
        }
        if config.laser {
            snapshot = snapshot.with_laser(Laser::new(center + DVec3::new(0.0, 0.0, belt_radius), DVec3::new(sweep.cos(), sweep.sin(), -1.0)));
        }

        field.publish_collision_snapshot(snapshot);
        field.publish_camera_position(camera_for(center, belt_radius, params.display_scale));
        field.publish_frame_time(dt);

        field.advance_and_fetch_frame();
        let hits = field.drain_collision_events().len();
        let stats = FrameStats::from_batches(frame, field.batches(), hits);
        output.output(&stats, center);
    }

    field.stop();
    println!("Destroyed {} of {} bodies, {} shield hits", field.batches().hidden(), field.len(), output.collisions_total());
    Ok(())
}

/// Display space camera hovering above the belt, looking down on it
fn camera_for(center: DVec3, belt_radius: f64, display_scale: f64) -> DVec3 {
    (center + DVec3::new(belt_radius, 0.0, belt_radius * 0.5)) * display_scale
}
