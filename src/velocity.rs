use crate::RingAttributes;

/// The optimal velocity model: maps the distance to the vehicle ahead
/// to the speed a driver would like to travel at.
#[derive(Clone, Copy, Debug)]
pub struct VelocityModel {
    max_speed: f64,
    safe_dist: f64,
    steepness: f64,
}

impl VelocityModel {
    /// Creates a new velocity model.
    ///
    /// # Parameters
    /// * `max_speed` - The speed approached as the gap grows without bound.
    /// * `safe_dist` - The gap at which the desired speed is half of `max_speed`.
    /// * `steepness` - How sharply the desired speed rises around `safe_dist`.
    pub fn new(max_speed: f64, safe_dist: f64, steepness: f64) -> Self {
        Self {
            max_speed,
            safe_dist,
            steepness,
        }
    }

    /// Creates the velocity model described by the ring's attributes.
    pub fn from_attributes(attribs: &RingAttributes) -> Self {
        Self::new(attribs.max_speed, attribs.safe_dist, attribs.steepness)
    }

    /// The desired speed for a vehicle `dist` behind its leader.
    ///
    /// `tanh` saturates to ±1 for large arguments, so this never leaves `[0, max_speed]`.
    pub fn optimal_velocity(&self, dist: f64) -> f64 {
        let s = (self.steepness * (dist - self.safe_dist)).tanh();
        0.5 * self.max_speed * (s + 1.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn reference() -> VelocityModel {
        VelocityModel::new(5.0, 1.6, 6.0)
    }

    #[test]
    fn half_speed_at_safe_distance() {
        assert_eq!(reference().optimal_velocity(1.6), 2.5);
    }

    #[test]
    fn saturates() {
        let model = reference();
        assert_approx_eq!(model.optimal_velocity(1e9), 5.0);
        assert_approx_eq!(model.optimal_velocity(-1e9), 0.0);
        assert_approx_eq!(model.optimal_velocity(f64::MAX), 5.0);
        assert!(model.optimal_velocity(0.0) >= 0.0);
    }

    #[test]
    fn non_decreasing() {
        let model = reference();
        let mut last = model.optimal_velocity(-5.0);
        for i in 0..2000 {
            let v = model.optimal_velocity(-5.0 + 0.01 * i as f64);
            assert!(v >= last);
            assert!(v <= 5.0);
            last = v;
        }
    }
}
