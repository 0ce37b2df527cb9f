#[cfg(feature = "debug")]
use crate::debug::debug_event;
use crate::guard::{Clamped, CollisionGuard};
use crate::history::ReactionDelayBuffer;
use crate::math::{normalize_angle, wrapped_gap};
use crate::velocity::VelocityModel;
use crate::RingAttributes;
use smallvec::SmallVec;
use std::f64::consts::TAU;

/// How a vehicle responds to the gap ahead of it during one tick.
///
/// This is re-evaluated from scratch every tick; nothing about the previous
/// decision is remembered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Decision {
    /// The vehicle is closer to its leader than the hard stop distance and stops outright.
    HardStop,
    /// The vehicle follows the car following law.
    Follow {
        /// The optimal velocity for the current gap.
        target: f64,
        /// The clamped acceleration towards the target.
        acc: f64,
    },
}

impl Decision {
    /// Decides how a vehicle responds to its leader.
    ///
    /// # Parameters
    /// * `dist` - The distance from the vehicle to its leader.
    /// * `delayed_speed` - The vehicle's own speed as perceived after the reaction delay.
    pub fn evaluate(
        dist: f64,
        delayed_speed: f64,
        attribs: &RingAttributes,
        model: &VelocityModel,
    ) -> Self {
        if dist < attribs.hard_stop_dist {
            return Decision::HardStop;
        }
        let target = model.optimal_velocity(dist);
        let acc = attribs
            .acc_range()
            .clamp(attribs.max_acc * (target - delayed_speed));
        Decision::Follow { target, acc }
    }

    /// The vehicle's speed after one tick of `dt`, before the global speed clamp.
    pub fn apply(&self, speed: f64, dt: f64) -> f64 {
        match self {
            Decision::HardStop => 0.0,
            Decision::Follow { acc, .. } => speed + acc * dt,
        }
    }
}

/// A summary of what happened during one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// The index of the frame that was simulated.
    pub frame: usize,
    /// The vehicles that made an emergency stop.
    pub hard_stops: SmallVec<[usize; 4]>,
    /// The vehicles pulled back to keep the minimum gap to their leader.
    pub clamped: Clamped,
}

/// Advances the vehicles on a ring by one tick.
/// Owns the scratch buffers reused from tick to tick.
#[derive(Clone, Debug)]
pub(crate) struct Stepper {
    model: VelocityModel,
    guard: CollisionGuard,
    new_speeds: Vec<f64>,
    proposed: Vec<f64>,
}

impl Stepper {
    pub fn new(attribs: &RingAttributes) -> Self {
        Self {
            model: VelocityModel::from_attributes(attribs),
            guard: CollisionGuard::new(attribs.min_angle_gap()),
            new_speeds: Vec::with_capacity(attribs.num_vehicles),
            proposed: Vec::with_capacity(attribs.num_vehicles),
        }
    }

    pub fn model(&self) -> &VelocityModel {
        &self.model
    }

    /// Performs one tick, updating `angles` and `speeds` in place and recording
    /// the committed speeds in `history`.
    pub fn step(
        &mut self,
        attribs: &RingAttributes,
        angles: &mut [f64],
        speeds: &mut [f64],
        history: &mut ReactionDelayBuffer,
    ) -> TickReport {
        let n = angles.len();
        let mut report = TickReport::default();
        let delayed = history.delayed_speeds(speeds);
        let speed_range = attribs.speed_range();

        self.new_speeds.clear();
        for i in 0..n {
            let gap = wrapped_gap(angles[i], angles[(i + 1) % n]);
            let dist = attribs.radius * gap;
            let decision = Decision::evaluate(dist, delayed[i], attribs, &self.model);
            if decision == Decision::HardStop {
                log::trace!("vehicle {} stopped {:.3} behind its leader", i, dist);
                #[cfg(feature = "debug")]
                debug_event("hard_stop", i, dist);
                report.hard_stops.push(i);
            }
            let speed = decision.apply(speeds[i], attribs.dt);
            self.new_speeds.push(speed_range.clamp(speed));
        }

        // Integrate in unwrapped coordinates, so that every vehicle is ahead of its
        // follower even across the zero angle.
        self.proposed.clear();
        let mut laps = 0.0;
        for i in 0..n {
            if i > 0 && angles[i] <= angles[i - 1] {
                laps += TAU;
            }
            let travel = self.new_speeds[i] * attribs.dt / attribs.radius;
            self.proposed.push(angles[i] + laps + travel);
        }

        report.clamped = self.guard.enforce(&mut self.proposed, &mut self.new_speeds);
        for &i in &report.clamped {
            log::trace!("vehicle {} held back behind its leader", i);
            #[cfg(feature = "debug")]
            debug_event("gap_clamp", i, self.proposed[i]);
        }

        for i in 0..n {
            angles[i] = normalize_angle(self.proposed[i]);
            speeds[i] = self.new_speeds[i];
        }
        history.push(speeds);

        report
    }
}
