use glam::DVec3;
use crate::{body::LodLevel, field::FrameBatches};

/// Counts of one fetched frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub frame: usize,
    pub visible: usize,
    pub hidden: usize,
    pub near: usize,
    pub mid: usize,
    pub far: usize,
    pub collisions: usize, // shield hits drained this frame
}

impl FrameStats {
    pub fn from_batches(frame: usize, batches: &FrameBatches, collisions: usize) -> Self {
        FrameStats {
            frame: frame,
            visible: batches.visible(),
            hidden: batches.hidden(),
            near: batches.count(LodLevel::Near),
            mid: batches.count(LodLevel::Mid),
            far: batches.count(LodLevel::Far),
            collisions: collisions,
        }
    }

    pub fn population(&self) -> usize {
        self.visible + self.hidden
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFrequency {
    EveryFrame,
    Frames(usize),
}

impl Default for OutputFrequency {
    fn default() -> Self {
        OutputFrequency::EveryFrame
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Represents a specific field to include in the output
pub enum OutputField {
    Frames,
    Population,
    Lod,
    Collisions,
    Attractor,
}

#[derive(Debug, Clone)]
pub struct OutputDevice {
    fields: Vec<OutputField>,
    frequency: OutputFrequency,
    collisions_total: usize,
}

impl Default for OutputDevice {
    fn default() -> Self {
        OutputDevice {
            fields: vec![OutputField::Frames, OutputField::Population, OutputField::Lod, OutputField::Collisions],
            frequency: OutputFrequency::default(),
            collisions_total: 0,
        }
    }
}

impl OutputDevice {
    pub fn new(fields: Vec<OutputField>, frequency: OutputFrequency) -> Self {
        OutputDevice { fields: fields, frequency: frequency, collisions_total: 0 }
    }

    pub fn collisions_total(&self) -> usize {
        self.collisions_total
    }

    /// Whether a frame is due for printing, frame numbers start at 1
    pub fn is_due(&self, frame: usize) -> bool {
        match self.frequency {
            OutputFrequency::EveryFrame => true,
            OutputFrequency::Frames(0) => true,
            OutputFrequency::Frames(n) => frame % n == 0,
        }
    }

    pub fn output(&mut self, stats: &FrameStats, attractor: DVec3) {
        self.collisions_total += stats.collisions;
        if !self.is_due(stats.frame) {
            return
        }

        println!("------------------------------------------");
        let indent = "  ";
        for field in self.fields.iter() {
            match field {
                OutputField::Frames => {
                    println!("Frame: {}", stats.frame);
                },
                OutputField::Population => {
                    println!("{}Bodies: {} active, {} destroyed", indent, stats.visible, stats.hidden);
                },
                OutputField::Lod => {
                    println!("{}LOD: {} near, {} mid, {} far", indent, stats.near, stats.mid, stats.far);
                },
                OutputField::Collisions => {
                    println!("{}Shield Hits: {} ({} total)", indent, stats.collisions, self.collisions_total);
                },
                OutputField::Attractor => {
                    let (x, xp) = format_si_value(attractor.x);
                    let (y, yp) = format_si_value(attractor.y);
                    let (z, zp) = format_si_value(attractor.z);
                    println!("{}Attractor: {:+09.04}{}m, {:+09.04}{}m, {:+09.04}{}m", indent, x, xp, y, yp, z, zp);
                },
            }
        }
    }
}

pub fn format_si_value(n: f64) -> (f64, &'static str) {
    if n == 0.0 {
        return (0.0, "")
    } else if n.is_nan() {
        return (f64::NAN, "")
    } else if n.is_infinite() {
        return (n, "")
    }

    match n.abs() {
        x if x < 0.000001 => (n * 1000000000.0, "n"),
        x if x < 0.001 => (n * 1000000.0, "u"),
        x if x < 1.0 => (n * 1000.0, "m"),
        x if x < 1000.0 => (n, ""),
        x if x < 1000000.0 => (n / 1000.0, "K"),
        x if x < 1000000000.0 => (n / 1000000.0, "M"),
        x if x < 1000000000000.0 => (n / 1000000000.0, "G"),
        x if x < 1000000000000000.0 => (n / 1000000000000.0, "T"),
        x if x < 1000000000000000000.0 => (n / 1000000000000000.0, "P"),
        _ => (n / 1000000000000000000.0, "E"),
    }
}
