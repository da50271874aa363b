use glam::DVec3;
use std::sync::atomic::{AtomicU64, Ordering};

/// Read-only view of the massive body a belt orbits
///
/// Owned outside the field. Workers never call into it, the controller samples `position` once
/// per frame and hands the sample (and the delta since the previous sample) to the workers.
pub trait Attractor: Send + Sync {
    /// Must be strictly positive, circular orbit speeds divide by it
    fn mass(&self) -> f64;
    fn position(&self) -> DVec3;
    fn collision_radius(&self) -> f32;
}

/// An attractor whose position can be moved by another thread while the pool runs
///
/// The three coordinates are stored as separate relaxed atomics. A reader racing a writer may see
/// a position mixing two updates; at worst that is one frame stale, which the belt tolerates.
#[derive(Debug)]
pub struct AttractorHandle {
    mass: f64,
    collision_radius: f32,
    position: [AtomicU64; 3],
}

impl AttractorHandle {
    pub fn new(mass: f64, position: DVec3, collision_radius: f32) -> Self {
        AttractorHandle {
            mass: mass,
            collision_radius: collision_radius,
            position: [
                AtomicU64::new(position.x.to_bits()),
                AtomicU64::new(position.y.to_bits()),
                AtomicU64::new(position.z.to_bits()),
            ],
        }
    }

    pub fn set_position(&self, position: DVec3) {
        self.position[0].store(position.x.to_bits(), Ordering::Relaxed);
        self.position[1].store(position.y.to_bits(), Ordering::Relaxed);
        self.position[2].store(position.z.to_bits(), Ordering::Relaxed);
    }
}

impl Attractor for AttractorHandle {
    fn mass(&self) -> f64 {
        self.mass
    }

    fn position(&self) -> DVec3 {
        DVec3::new(
            f64::from_bits(self.position[0].load(Ordering::Relaxed)),
            f64::from_bits(self.position[1].load(Ordering::Relaxed)),
            f64::from_bits(self.position[2].load(Ordering::Relaxed)),
        )
    }

    fn collision_radius(&self) -> f32 {
        self.collision_radius
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::{sync::Arc, thread};

    #[test]
    fn test_attractor_handle_moves() {
        let handle = AttractorHandle::new(5.0, DVec3::new(1.0, 2.0, 3.0), 0.5);
        assert_eq!(handle.position(), DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(handle.mass(), 5.0);
        assert_eq!(handle.collision_radius(), 0.5);

        handle.set_position(DVec3::new(-4.0, 0.0, 1e12));
        assert_eq!(handle.position(), DVec3::new(-4.0, 0.0, 1e12));
    }

    #[test]
    fn test_attractor_handle_shared_across_threads() {
        let handle = Arc::new(AttractorHandle::new(1.0, DVec3::ZERO, 1.0));
        let writer = {
            let handle = Arc::clone(&handle);
            thread::spawn(move || {
                for i in 0..1000 {
                    handle.set_position(DVec3::splat(i as f64));
                }
            })
        };
        writer.join().unwrap();
        assert_eq!(handle.position(), DVec3::splat(999.0));
    }
}
