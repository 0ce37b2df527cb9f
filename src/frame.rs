//! The per-tick output of a simulation, and a loop to drive a simulation
//! into a consumer of that output.

use crate::math::{polar, Point2d};
use crate::{RingAttributes, WorldState};
use std::ops::ControlFlow;

/// The angle and speed of one vehicle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleSample {
    /// The angle in radians, within `[0, 2π)`.
    pub angle: f64,
    /// The speed.
    pub speed: f64,
}

impl VehicleSample {
    /// The world space position of the vehicle on a ring of the given `radius`.
    pub fn position(&self, radius: f64) -> Point2d {
        polar(radius, self.angle)
    }
}

/// A view of every vehicle at the end of a tick.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    index: usize,
    attribs: &'a RingAttributes,
    angles: &'a [f64],
    speeds: &'a [f64],
}

impl<'a> Frame<'a> {
    pub(crate) fn new(
        index: usize,
        attribs: &'a RingAttributes,
        angles: &'a [f64],
        speeds: &'a [f64],
    ) -> Self {
        Self {
            index,
            attribs,
            angles,
            speeds,
        }
    }

    /// The number of ticks simulated before this frame.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The radius of the ring.
    pub fn radius(&self) -> f64 {
        self.attribs.radius
    }

    /// The number of vehicles.
    pub fn len(&self) -> usize {
        self.angles.len()
    }

    /// Returns true if the frame holds no vehicles.
    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    /// Gets the sample for vehicle `idx`.
    pub fn get(&self, idx: usize) -> Option<VehicleSample> {
        Some(VehicleSample {
            angle: *self.angles.get(idx)?,
            speed: *self.speeds.get(idx)?,
        })
    }

    /// Iterates over the vehicles in index order.
    pub fn iter(&self) -> impl Iterator<Item = VehicleSample> + 'a {
        self.angles
            .iter()
            .zip(self.speeds)
            .map(|(&angle, &speed)| VehicleSample { angle, speed })
    }

    /// A vehicle's speed as a fraction of the maximum speed, in `[0, 1]`.
    /// Suitable for indexing a colour map.
    pub fn speed_fraction(&self, sample: &VehicleSample) -> f64 {
        let range = self.attribs.speed_range();
        range.inv_lerp(range.clamp(sample.speed))
    }
}

/// A consumer of simulation frames, such as a renderer.
pub trait FrameSink {
    /// Receives the state of the vehicles after a tick.
    /// Returning [ControlFlow::Break] stops the driving loop.
    fn frame(&mut self, frame: &Frame<'_>) -> ControlFlow<()>;
}

/// Ticks `world` and hands each resulting frame to `sink`, until the sink breaks.
///
/// Returns the number of ticks performed.
pub fn drive(world: &mut WorldState, sink: &mut impl FrameSink) -> usize {
    let mut ticks = 0;
    loop {
        world.tick();
        ticks += 1;
        if sink.frame(&world.frame_view()).is_break() {
            return ticks;
        }
    }
}

/// Like [drive], but stops after at most `max_ticks` ticks.
pub fn drive_for(world: &mut WorldState, sink: &mut impl FrameSink, max_ticks: usize) -> usize {
    for ticks in 1..=max_ticks {
        world.tick();
        if sink.frame(&world.frame_view()).is_break() {
            return ticks;
        }
    }
    max_ticks
}
