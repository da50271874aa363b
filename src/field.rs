use glam::{DVec3, Mat3, Vec3};
use parking_lot::{Mutex, RwLock};
use rand::Rng;
use std::sync::{Arc, atomic::AtomicBool, mpsc::{sync_channel, Receiver}};
use crate::{
    attractor::Attractor,
    body::{Asteroid, Body, BodyConfig, DrawableHandle, GroupId, LodCatalog, LodLevel, LodSelector, RenderRecord},
    channel::FrameChannel,
    collision::{CollisionEvent, CollisionSnapshot},
    config::{self, BeltConfig, SimParams},
    constants::*,
    error::FieldError,
    math::*,
    physics::{self, CycleInputs},
    pool::WorkerPool,
    worker::{partition, BodyPartition, FieldState},
};

/// One instance of an instanced draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instance {
    pub position: Vec3,
    pub rotation: Mat3,
    pub scale: f32,
}

/// Every visible body drawn with one (group, level) drawable this frame
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceBatch {
    pub selector: LodSelector,
    pub drawable: DrawableHandle,
    pub instances: Vec<Instance>,
}

/// Per-frame instancing batches, one per (group, level) pair of the catalog
///
/// Allocated once at configuration and refilled every frame, empty batches included.
#[derive(Debug, Clone, Default)]
pub struct FrameBatches {
    batches: Vec<InstanceBatch>,
    hidden: usize,
}

impl FrameBatches {
    pub fn new(catalog: &LodCatalog, capacity: usize) -> Self {
        let mut batches = Vec::with_capacity(catalog.len() * LodLevel::ALL.len());
        for (group, variants) in catalog.iter() {
            for level in LodLevel::ALL.iter() {
                batches.push(InstanceBatch {
                    selector: LodSelector { group: group, level: *level },
                    drawable: variants.variant(*level),
                    instances: Vec::with_capacity(capacity),
                });
            }
        }
        FrameBatches { batches: batches, hidden: 0 }
    }

    fn slot(selector: LodSelector) -> usize {
        selector.group.0 * LodLevel::ALL.len() + selector.level.index()
    }

    pub fn rebuild(&mut self, records: &[RenderRecord]) {
        for batch in self.batches.iter_mut() {
            batch.instances.clear();
        }
        self.hidden = 0;

        for record in records {
            match record.selector {
                Some(selector) => {
                    // configure checked every group against the catalog
                    if let Some(batch) = self.batches.get_mut(Self::slot(selector)) {
                        batch.instances.push(Instance {
                            position: record.position,
                            rotation: record.rotation,
                            scale: record.scale,
                        });
                    }
                },
                None => self.hidden += 1,
            }
        }
    }

    pub fn batch(&self, selector: LodSelector) -> Option<&InstanceBatch> {
        self.batches.get(Self::slot(selector)).filter(|batch| batch.selector == selector)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstanceBatch> {
        self.batches.iter()
    }

    /// Batches with at least one instance, what a renderer actually submits
    pub fn non_empty(&self) -> impl Iterator<Item = &InstanceBatch> {
        self.batches.iter().filter(|batch| !batch.instances.is_empty())
    }

    pub fn visible(&self) -> usize {
        self.batches.iter().map(|batch| batch.instances.len()).sum()
    }

    pub fn hidden(&self) -> usize {
        self.hidden
    }

    pub fn count(&self, level: LodLevel) -> usize {
        self.batches.iter()
            .filter(|batch| batch.selector.level == level)
            .map(|batch| batch.instances.len())
            .sum()
    }
}

/// Draws the initial population of a belt around `attractor`
///
/// Each body is placed on the belt's plane at a normally distributed radius, pushed off the plane
/// by a random jitter and given the circular orbit velocity about its jittered center. The jitter
/// becomes the body's base orbit offset.
pub fn generate_asteroids<R: Rng + ?Sized>(
    belt: &BeltConfig,
    attractor: &dyn Attractor,
    groups: usize,
    params: &SimParams,
    rng: &mut R,
) -> Result<Vec<Asteroid>, FieldError> {
    belt.validate()?;
    if belt.population > 0 && groups == 0 {
        return Err(FieldError::EmptyCatalog)
    }

    let tilt = inclination(belt.plane_normal);
    let center = attractor.position();
    let mass = attractor.mass();
    let mut asteroids = Vec::with_capacity(belt.population);

    for _ in 0..belt.population {
        let radius = gaussian(rng, belt.distance, belt.distance / belt.spread_divisor).abs();
        let planar = random_planar_direction(rng) * radius;
        let jitter = random_unit_vector(rng) * radius * BELT_JITTER_FACTOR;

        let base_offset = tilt * jitter;
        let position = tilt * (planar + jitter) + center;
        let velocity = tilt * circular_orbit_velocity(params.gravitational_constant, mass, planar, DVec3::Z) * belt.orbit_factor;

        let spin_speed = rng.gen_range(belt.spin_range.0..=belt.spin_range.1);
        let scale = rng.gen_range(belt.scale_range.0..=belt.scale_range.1);
        let group = GroupId(rng.gen_range(0..groups));

        let body = Body::new(params.body_mass, position, random_unit_vector(rng))
            .with_velocity(velocity)
            .with_spin_speed(spin_speed);

        asteroids.push(Asteroid {
            body: body,
            config: BodyConfig { scale: scale, group: group, base_offset: base_offset },
        });
    }

    Ok(asteroids)
}

/// A belt of asteroids orbiting one attractor, stepped by a worker pool
///
/// The controller drives it once per rendered frame:
///
/// ```text
/// publish_camera_position / publish_collision_snapshot / publish_frame_time
/// advance_and_fetch_frame   -> wait for the cycle, swap, batch, launch the next cycle
/// drain_collision_events
/// ```
pub struct AsteroidField {
    state: Arc<FieldState>,
    pool: WorkerPool,
    attractor: Arc<dyn Attractor>,
    catalog: LodCatalog,
    events: Receiver<CollisionEvent>,
    batches: FrameBatches,
    frame_dt: f64,
    collisions: CollisionSnapshot,
    last_attractor_position: DVec3,
}

impl AsteroidField {
    /// Builds a field from existing bodies. Every body's orbit offset starts at its base offset
    pub fn configure(
        asteroids: Vec<Asteroid>,
        attractor: Arc<dyn Attractor>,
        catalog: LodCatalog,
        orbit_factor: f64,
        params: SimParams,
    ) -> Result<AsteroidField, FieldError> {
        params.validate()?;
        config::validate_orbit_factor(orbit_factor)?;

        let count = asteroids.len();
        let mut bodies = Vec::with_capacity(count);
        let mut configs = Vec::with_capacity(count);
        for (index, asteroid) in asteroids.into_iter().enumerate() {
            if !catalog.contains(asteroid.config.group) {
                return Err(FieldError::UnknownLodGroup {
                    index: index,
                    group: asteroid.config.group,
                    available: catalog.len(),
                })
            }
            let mut body = asteroid.body;
            body.orbit_offset = asteroid.config.base_offset;
            bodies.push(body);
            configs.push(asteroid.config);
        }

        let initial: Vec<RenderRecord> = bodies.iter().zip(configs.iter())
            .map(|(body, config)| physics::initial_record(body, config, &params))
            .collect();

        let ranges = partition(count, params.bodies_per_worker);
        let mut remaining = bodies.into_iter();
        let partitions = ranges.iter().map(|range| BodyPartition {
            range: range.clone(),
            bodies: Mutex::new(remaining.by_ref().take(range.len()).collect()),
        }).collect();

        let frame_dt = DEFAULT_FRAME_DT.min(params.max_frame_dt);
        let attractor_position = attractor.position();

        let mut batches = FrameBatches::new(&catalog, count);
        batches.rebuild(&initial);

        let state = Arc::new(FieldState {
            orbit_factor: orbit_factor,
            attractor_mass: attractor.mass(),
            attractor_radius: attractor.collision_radius() as f64,
            channel: FrameChannel::new(&ranges, initial),
            configs: configs,
            partitions: partitions,
            camera: Mutex::new(DVec3::ZERO),
            cycle: RwLock::new(Arc::new(CycleInputs::default())),
            running: AtomicBool::new(false),
            params: params,
        });

        let (tx, rx) = sync_channel(MAX_PENDING_COLLISION_EVENTS);
        Ok(AsteroidField {
            pool: WorkerPool::new(Arc::clone(&state), tx),
            state: state,
            attractor: attractor,
            catalog: catalog,
            events: rx,
            batches: batches,
            frame_dt: frame_dt,
            collisions: CollisionSnapshot::none(),
            last_attractor_position: attractor_position,
        })
    }

    /// Procedurally generates a belt and configures a field from it
    pub fn generate<R: Rng + ?Sized>(
        belt: &BeltConfig,
        attractor: Arc<dyn Attractor>,
        catalog: LodCatalog,
        params: SimParams,
        rng: &mut R,
    ) -> Result<AsteroidField, FieldError> {
        params.validate()?;
        let asteroids = generate_asteroids(belt, attractor.as_ref(), catalog.len(), &params, rng)?;
        let field = Self::configure(asteroids, attractor, catalog, belt.orbit_factor, params)?;

        log::info!(
            "generated belt of {} bodies at {:.3e} m, orbit factor {}",
            field.len(),
            belt.distance,
            belt.orbit_factor,
        );
        Ok(field)
    }

    pub fn len(&self) -> usize {
        self.state.body_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn worker_count(&self) -> usize {
        self.pool.worker_count()
    }

    pub fn is_running(&self) -> bool {
        self.pool.is_running()
    }

    pub fn params(&self) -> &SimParams {
        &self.state.params
    }

    pub fn orbit_factor(&self) -> f64 {
        self.state.orbit_factor
    }

    pub fn catalog(&self) -> &LodCatalog {
        &self.catalog
    }

    pub fn configs(&self) -> &[BodyConfig] {
        &self.state.configs
    }

    pub fn attractor(&self) -> &Arc<dyn Attractor> {
        &self.attractor
    }

    /// Starts the workers on a first cycle built from the inputs published so far
    pub fn start(&mut self) -> Result<(), FieldError> {
        if self.pool.is_running() {
            return Ok(())
        }
        let inputs = self.next_inputs();
        self.pool.start(inputs)
    }

    /// Waits for the cycle in flight and joins the workers. The bodies keep their state
    pub fn stop(&mut self) {
        self.pool.stop();
    }

    /// Camera position in display units, read by every worker at the start of its next cycle
    pub fn publish_camera_position(&self, position: DVec3) {
        *self.state.camera.lock() = position;
    }

    /// Collision volumes for the next launched cycle onward
    pub fn publish_collision_snapshot(&mut self, snapshot: CollisionSnapshot) {
        self.collisions = snapshot;
    }

    /// Real time of the frame, clamped to `[0, max_frame_dt]`
    pub fn publish_frame_time(&mut self, dt: f64) {
        let max = self.state.params.max_frame_dt;
        self.frame_dt = if dt > max {
            log::warn!("frame time {:.4}s clamped to {:.4}s", dt, max);
            max
        } else if dt >= 0.0 {
            dt
        } else {
            0.0
        };
    }

    pub fn frame_time(&self) -> f64 {
        self.frame_dt
    }

    /// Completes the cycle in flight, hands back its batches and launches the next cycle
    ///
    /// The batches always come from one complete cycle. When the pool is not running they are
    /// rebuilt from the last completed cycle.
    pub fn advance_and_fetch_frame(&mut self) -> &FrameBatches {
        let running = self.pool.finish_cycle();
        self.state.channel.swap();
        {
            let snapshot = self.state.channel.read();
            self.batches.rebuild(&snapshot);
        }
        if running {
            let inputs = self.next_inputs();
            self.pool.launch_cycle(inputs);
        }
        &self.batches
    }

    /// The batches of the last fetched frame
    pub fn batches(&self) -> &FrameBatches {
        &self.batches
    }

    /// Shield hits reported since the last drain, oldest first
    ///
    /// At most `MAX_PENDING_COLLISION_EVENTS` are held between drains, later hits are dropped.
    pub fn drain_collision_events(&self) -> Vec<CollisionEvent> {
        self.events.try_iter().collect()
    }

    /// Copies every body's state, one partition at a time
    ///
    /// While the pool runs this waits for each partition's worker to finish its cycle, so different
    /// partitions may come from different cycles.
    pub fn bodies(&self) -> Vec<Body> {
        let mut bodies = Vec::with_capacity(self.len());
        for partition in self.state.partitions.iter() {
            bodies.extend(partition.bodies.lock().iter().cloned());
        }
        bodies
    }

    /// The per-body records of the last swapped frame
    pub fn render_snapshot(&self) -> Vec<RenderRecord> {
        self.state.channel.read().to_vec()
    }

    fn next_inputs(&mut self) -> CycleInputs {
        let position = self.attractor.position();
        let delta = (position - self.last_attractor_position) * self.state.params.display_scale;
        self.last_attractor_position = position;

        CycleInputs {
            dt: self.frame_dt,
            attractor_position: position,
            attractor_delta: delta,
            collisions: self.collisions,
        }
    }
}
