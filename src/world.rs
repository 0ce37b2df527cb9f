#[cfg(feature = "debug")]
use crate::debug::take_debug_frame;
use crate::error::{Error, Result};
use crate::frame::{Frame, VehicleSample};
use crate::history::ReactionDelayBuffer;
use crate::math::{normalize_angle, wrapped_gap};
use crate::stepper::{Stepper, TickReport};
use crate::util::rotated_range;
use crate::velocity::VelocityModel;
use crate::RingAttributes;
use itertools::Itertools;
use rand::Rng;
use rand_distr::Normal;
use std::f64::consts::TAU;

/// Vehicles whose speed is below this are counted as stopped.
const STOPPED_SPEED: f64 = 0.1;

/// The state of a ring road simulation.
///
/// Vehicle `i` follows vehicle `(i + 1) % n`, its leader. Vehicles never pass
/// their leader, and are never added or removed.
#[derive(Clone, Debug)]
pub struct WorldState {
    /// The ring's attributes.
    attribs: RingAttributes,
    /// The angle of each vehicle in radians, within `[0, 2π)`.
    angles: Vec<f64>,
    /// The speed of each vehicle, within `[0, max_speed]`.
    speeds: Vec<f64>,
    /// The speeds as they were in previous frames.
    history: ReactionDelayBuffer,
    /// The tick update.
    stepper: Stepper,
    /// The current frame of simulation.
    frame: usize,
    /// Debugging information from the previously simulated frame.
    #[cfg(feature = "debug")]
    debug: serde_json::Value,
}

/// Creates a world with randomly jittered vehicles. See [WorldState::new].
pub fn init(attribs: RingAttributes) -> Result<WorldState> {
    WorldState::new(attribs)
}

impl WorldState {
    /// Creates a world with vehicles spread evenly around the ring, each nudged
    /// by a random jitter, all travelling at the initial speed.
    ///
    /// Returns an error if the attributes are invalid.
    pub fn new(attribs: RingAttributes) -> Result<Self> {
        Self::with_rng(attribs, &mut rand::thread_rng())
    }

    /// Creates a world as in [WorldState::new], drawing the jitter from `rng`.
    pub fn with_rng(attribs: RingAttributes, rng: &mut impl Rng) -> Result<Self> {
        attribs.validate()?;
        let jitter = Normal::new(0.0, attribs.jitter_stddev)
            .map_err(|_| Error::InvalidConfig("jitter_stddev must be non-negative"))?;

        // Jitter is truncated so that no two vehicles start closer than the hard stop distance
        let n = attribs.num_vehicles;
        let spacing = TAU / n as f64;
        let max_jitter = 0.5 * (spacing - attribs.min_angle_gap());
        let angles = (0..n)
            .map(|i| {
                let nudge = rng.sample::<f64, _>(jitter).clamp(-max_jitter, max_jitter);
                spacing * i as f64 + nudge
            })
            .map(normalize_angle)
            .sorted_by(f64::total_cmp)
            .collect::<Vec<_>>();
        if !is_strictly_increasing(&angles) {
            return Err(Error::InvalidState("jittered vehicles coincide"));
        }
        let speeds = vec![attribs.initial_speed_ratio * attribs.max_speed; n];

        log::debug!(
            "initialised {} vehicles on a ring of length {:.2}",
            n,
            attribs.circumference()
        );
        Ok(Self::build(attribs, angles, speeds))
    }

    /// Creates a world from explicit vehicle angles and speeds.
    ///
    /// The angles must lie in `[0, 2π)` and be in strictly increasing order around the ring
    /// starting from some vehicle; the speeds must lie in `[0, max_speed]`.
    pub fn from_parts(attribs: RingAttributes, angles: Vec<f64>, speeds: Vec<f64>) -> Result<Self> {
        attribs.validate()?;
        if angles.len() != attribs.num_vehicles || speeds.len() != attribs.num_vehicles {
            return Err(Error::InvalidState(
                "expected one angle and one speed per vehicle",
            ));
        }
        if !angles.iter().all(|a| (0.0..TAU).contains(a)) {
            return Err(Error::InvalidState("angles must lie within [0, 2π)"));
        }
        if !speeds.iter().all(|v| attribs.speed_range().contains(*v)) {
            return Err(Error::InvalidState("speeds must lie within [0, max_speed]"));
        }
        // Strictly increasing around the ring means exactly one descent, closing the lap
        let descents = angles
            .iter()
            .circular_tuple_windows::<(_, _)>()
            .filter(|(a, b)| b <= a)
            .count();
        if descents != 1 {
            return Err(Error::InvalidState(
                "vehicles must be in order around the ring",
            ));
        }
        Ok(Self::build(attribs, angles, speeds))
    }

    fn build(attribs: RingAttributes, angles: Vec<f64>, speeds: Vec<f64>) -> Self {
        Self {
            history: ReactionDelayBuffer::new(
                &speeds,
                attribs.history_depth,
                attribs.reaction_delay,
            ),
            stepper: Stepper::new(&attribs),
            attribs,
            angles,
            speeds,
            frame: 0,
            #[cfg(feature = "debug")]
            debug: serde_json::Value::Null,
        }
    }

    /// Advances the simulation by one tick of `dt`.
    pub fn tick(&mut self) -> TickReport {
        let mut report = self.stepper.step(
            &self.attribs,
            &mut self.angles,
            &mut self.speeds,
            &mut self.history,
        );
        report.frame = self.frame;
        self.frame += 1;

        #[cfg(feature = "debug")]
        {
            self.debug = take_debug_frame();
        }

        report
    }

    /// The ring's attributes.
    pub fn attributes(&self) -> &RingAttributes {
        &self.attribs
    }

    /// The velocity model drivers follow.
    pub fn velocity_model(&self) -> &VelocityModel {
        self.stepper.model()
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// The number of vehicles.
    pub fn len(&self) -> usize {
        self.angles.len()
    }

    /// Returns true if the ring holds no vehicles.
    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    /// The angle of each vehicle in radians.
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    /// The speed of each vehicle.
    pub fn speeds(&self) -> &[f64] {
        &self.speeds
    }

    /// The index of the vehicle ahead of vehicle `idx`.
    pub fn leader(&self, idx: usize) -> usize {
        (idx + 1) % self.len()
    }

    /// The distance from each vehicle to its leader, measured along the ring.
    pub fn gaps(&self) -> impl Iterator<Item = f64> + '_ {
        self.angles
            .iter()
            .circular_tuple_windows::<(&f64, &f64)>()
            .map(move |(a, b)| self.attribs.radius * wrapped_gap(*a, *b))
    }

    /// The smallest distance between any vehicle and its leader.
    pub fn min_gap(&self) -> f64 {
        self.gaps().fold(f64::INFINITY, f64::min)
    }

    /// The mean speed of all vehicles.
    pub fn mean_speed(&self) -> f64 {
        self.speeds.iter().sum::<f64>() / self.len() as f64
    }

    /// The number of vehicles that are stopped or nearly so.
    pub fn stopped_count(&self) -> usize {
        self.speeds.iter().filter(|v| **v < STOPPED_SPEED).count()
    }

    /// Checks that following leaders from any vehicle visits strictly increasing
    /// angles, going once around the ring.
    pub fn is_cyclically_ordered(&self) -> bool {
        let n = self.len();
        (0..n).all(|start| {
            let mut travelled = 0.0;
            for (a, b) in rotated_range(n, start).tuple_windows::<(usize, usize)>() {
                let gap = self.angles[b] - self.angles[a];
                let gap = if gap < 0.0 { gap + TAU } else { gap };
                if gap <= 0.0 {
                    return false;
                }
                travelled += gap;
            }
            travelled < TAU
        })
    }

    /// The current frame, as handed to a [FrameSink](crate::FrameSink).
    pub fn frame_view(&self) -> Frame<'_> {
        Frame::new(self.frame, &self.attribs, &self.angles, &self.speeds)
    }

    /// Iterates over the angle and speed of each vehicle, in index order.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = VehicleSample> + '_ {
        self.angles
            .iter()
            .zip(&self.speeds)
            .map(|(&angle, &speed)| VehicleSample { angle, speed })
    }

    /// Gets the debugging information for the previously simulated frame as JSON array.
    #[cfg(feature = "debug")]
    pub fn debug(&self) -> serde_json::Value {
        self.debug.clone()
    }
}

fn is_strictly_increasing(values: &[f64]) -> bool {
    values.iter().tuple_windows::<(_, _)>().all(|(a, b)| a < b)
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;

    fn seeded() -> rand::rngs::StdRng {
        rand::rngs::StdRng::from_seed(*b"Round and round the ring we go..")
    }

    #[test]
    fn initial_placement() {
        let attribs = RingAttributes::default();
        let world = WorldState::with_rng(attribs, &mut seeded()).unwrap();
        assert_eq!(world.len(), attribs.num_vehicles);
        assert!(world.angles().iter().all(|a| (0.0..TAU).contains(a)));
        assert!(is_strictly_increasing(world.angles()));
        assert!(world.is_cyclically_ordered());
        assert!(world.min_gap() >= attribs.hard_stop_dist - 1e-9);
        assert!(world.speeds().iter().all(|v| *v == 4.5));
        assert_eq!(world.frame(), 0);
    }

    #[test]
    fn no_jitter_is_even() {
        let attribs = RingAttributes {
            jitter_stddev: 0.0,
            num_vehicles: 4,
            ..Default::default()
        };
        let world = WorldState::with_rng(attribs, &mut seeded()).unwrap();
        for gap in world.gaps() {
            assert_approx_eq::assert_approx_eq!(gap, attribs.circumference() / 4.0);
        }
    }

    #[test]
    fn rejects_invalid_parts() {
        let attribs = RingAttributes {
            num_vehicles: 3,
            ..Default::default()
        };
        let speeds = vec![1.0; 3];
        assert!(WorldState::from_parts(attribs, vec![0.0, 2.0], vec![1.0; 2]).is_err());
        assert!(WorldState::from_parts(attribs, vec![0.0, 2.0, 7.0], speeds.clone()).is_err());
        assert!(WorldState::from_parts(attribs, vec![0.0, 4.0, 2.0], speeds.clone()).is_err());
        assert!(WorldState::from_parts(attribs, vec![0.0, 2.0, 2.0], speeds.clone()).is_err());
        assert!(WorldState::from_parts(attribs, vec![0.0, 2.0, 4.0], vec![1.0, 9.0, 1.0]).is_err());
        assert!(WorldState::from_parts(attribs, vec![0.0, 2.0, 4.0], speeds.clone()).is_ok());
        // Order may start anywhere around the ring
        assert!(WorldState::from_parts(attribs, vec![4.0, 0.0, 2.0], speeds).is_ok());
    }

    #[test]
    fn rotated_order_is_cyclic() {
        let attribs = RingAttributes {
            num_vehicles: 3,
            ..Default::default()
        };
        let world = WorldState::from_parts(attribs, vec![4.0, 0.5, 2.0], vec![1.0; 3]).unwrap();
        assert!(world.is_cyclically_ordered());
        assert_eq!(world.leader(2), 0);
        assert_eq!(world.gaps().count(), 3);
        let total = world.gaps().sum::<f64>();
        assert_approx_eq::assert_approx_eq!(total, attribs.circumference());
    }

    #[cfg(feature = "debug")]
    #[test]
    fn debug_frame_records_hard_stops() {
        let attribs = RingAttributes {
            num_vehicles: 2,
            radius: 1.0,
            ..Default::default()
        };
        let mut world = WorldState::from_parts(attribs, vec![0.0, 0.5], vec![1.0; 2]).unwrap();
        world.tick();
        let events = world.debug();
        let events = events.as_array().unwrap();
        assert!(events
            .iter()
            .any(|e| e["type"] == "hard_stop" && e["vehicle"] == 0));
    }

    #[test]
    fn tick_advances_frame() {
        let mut world = WorldState::with_rng(RingAttributes::default(), &mut seeded()).unwrap();
        let report = world.tick();
        assert_eq!(report.frame, 0);
        assert_eq!(world.frame(), 1);
        assert_eq!(world.iter_vehicles().count(), world.len());
        assert!(!world.is_empty());
    }
}
