use crate::error::{Error, Result};
use crate::util::Interval;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// The number of vehicles on the reference ring.
pub const REFERENCE_VEHICLES: usize = 20;

/// The number of past speed snapshots retained for the reaction delay.
pub const REFERENCE_HISTORY_DEPTH: usize = 10;

/// The attributes of a ring road simulation.
///
/// These are fixed for the lifetime of a [WorldState](crate::WorldState).
/// Distances are in the same linear unit as `radius`, and times are in ticks of `dt`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RingAttributes {
    /// The number of vehicles on the ring, at least 2.
    pub num_vehicles: usize,
    /// The radius of the ring.
    pub radius: f64,
    /// The logical time step of one tick.
    pub dt: f64,
    /// The speed ceiling of every vehicle.
    pub max_speed: f64,
    /// The distance at which a vehicle's desired speed is half of `max_speed`.
    pub safe_dist: f64,
    /// The minimum separation between a vehicle and its leader.
    pub hard_stop_dist: f64,
    /// The perceptual lag of the car following law, in ticks.
    pub reaction_delay: usize,
    /// The maximum acceleration.
    pub max_acc: f64,
    /// The maximum braking deceleration, as a positive magnitude.
    pub max_brake: f64,
    /// The number of speed snapshots kept for the reaction delay.
    pub history_depth: usize,
    /// The steepness of the optimal velocity curve.
    pub steepness: f64,
    /// The initial speed of every vehicle as a fraction of `max_speed`.
    pub initial_speed_ratio: f64,
    /// The standard deviation of the initial angular jitter in radians.
    pub jitter_stddev: f64,
}

impl Default for RingAttributes {
    fn default() -> Self {
        Self {
            num_vehicles: REFERENCE_VEHICLES,
            radius: 5.5,
            dt: 0.05,
            max_speed: 5.0,
            safe_dist: 1.6,
            hard_stop_dist: 1.0,
            reaction_delay: 2,
            max_acc: 3.0,
            max_brake: 12.0,
            history_depth: REFERENCE_HISTORY_DEPTH,
            steepness: 6.0,
            initial_speed_ratio: 0.9,
            jitter_stddev: 0.1,
        }
    }
}

impl RingAttributes {
    /// Parses attributes from a JSON document.
    /// Missing fields take their reference values.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let attribs: Self = serde_json::from_str(json)?;
        attribs.validate()?;
        Ok(attribs)
    }

    /// The minimum angular separation between a vehicle and its leader.
    pub fn min_angle_gap(&self) -> f64 {
        self.hard_stop_dist / self.radius
    }

    /// The length of the ring.
    pub fn circumference(&self) -> f64 {
        TAU * self.radius
    }

    /// The range speeds are clamped to at the end of every tick.
    pub fn speed_range(&self) -> Interval<f64> {
        Interval::new(0.0, self.max_speed)
    }

    /// The range accelerations are clamped to before integration.
    pub fn acc_range(&self) -> Interval<f64> {
        Interval::new(-self.max_brake, self.max_acc)
    }

    /// Checks that the attributes describe a usable ring.
    pub fn validate(&self) -> Result<()> {
        let positive = |x: f64| x.is_finite() && x > 0.0;

        if self.num_vehicles < 2 {
            return Err(Error::InvalidConfig("at least two vehicles are required"));
        }
        if !positive(self.radius) {
            return Err(Error::InvalidConfig("radius must be positive"));
        }
        if !positive(self.dt) {
            return Err(Error::InvalidConfig("dt must be positive"));
        }
        if !positive(self.max_speed) {
            return Err(Error::InvalidConfig("max_speed must be positive"));
        }
        if !self.safe_dist.is_finite() {
            return Err(Error::InvalidConfig("safe_dist must be finite"));
        }
        if !positive(self.hard_stop_dist) {
            return Err(Error::InvalidConfig("hard_stop_dist must be positive"));
        }
        if !positive(self.max_acc) || !positive(self.max_brake) {
            return Err(Error::InvalidConfig("max_acc and max_brake must be positive"));
        }
        if !positive(self.steepness) {
            return Err(Error::InvalidConfig("steepness must be positive"));
        }
        if self.history_depth == 0 {
            return Err(Error::InvalidConfig("history_depth must be at least 1"));
        }
        if self.reaction_delay > self.history_depth {
            return Err(Error::InvalidConfig(
                "reaction_delay cannot exceed history_depth",
            ));
        }
        if !Interval::new(0.0, 1.0).contains(self.initial_speed_ratio) {
            return Err(Error::InvalidConfig(
                "initial_speed_ratio must be between 0 and 1",
            ));
        }
        if !self.jitter_stddev.is_finite() || self.jitter_stddev < 0.0 {
            return Err(Error::InvalidConfig("jitter_stddev must be non-negative"));
        }
        if self.num_vehicles as f64 * self.hard_stop_dist >= self.circumference() {
            return Err(Error::InvalidConfig(
                "the ring is too short to separate every vehicle",
            ));
        }
        Ok(())
    }
}
