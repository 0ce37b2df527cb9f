use smallvec::SmallVec;
use std::f64::consts::TAU;

/// The indices of the vehicles stopped by the guard in one tick.
pub type Clamped = SmallVec<[usize; 4]>;

/// Enforces a minimum angular separation between each vehicle and its leader.
#[derive(Clone, Copy, Debug)]
pub struct CollisionGuard {
    /// The minimum angular gap in radians.
    min_gap: f64,
}

impl CollisionGuard {
    /// Creates a guard enforcing the given minimum angular gap.
    pub fn new(min_gap: f64) -> Self {
        Self { min_gap }
    }

    /// The minimum angular gap in radians.
    pub fn min_gap(&self) -> f64 {
        self.min_gap
    }

    /// Pulls back any vehicle whose proposed angle is too close to its leader's,
    /// stopping it in the process.
    ///
    /// The `proposed` angles must be unwrapped: increasing with index, with the whole
    /// ring spanning less than one lap from vehicle 0. Each vehicle is tested against
    /// its leader's proposed angle as it stands when the vehicle is visited, in a single
    /// forward pass, followed by the pair closing the ring. A vehicle pulled back does
    /// not cause its follower to be re-tested.
    ///
    /// Returns the indices of the vehicles that were pulled back.
    pub fn enforce(&self, proposed: &mut [f64], speeds: &mut [f64]) -> Clamped {
        debug_assert_eq!(proposed.len(), speeds.len());
        let mut clamped = Clamped::new();
        let n = proposed.len();
        if n < 2 {
            return clamped;
        }

        for i in 0..n - 1 {
            let max_allowed = proposed[i + 1] - self.min_gap;
            if proposed[i] > max_allowed {
                proposed[i] = max_allowed;
                speeds[i] = 0.0;
                clamped.push(i);
            }
        }

        let last = n - 1;
        let max_allowed = proposed[0] + TAU - self.min_gap;
        if proposed[last] > max_allowed {
            proposed[last] = max_allowed;
            speeds[last] = 0.0;
            clamped.push(last);
        }

        clamped
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn leaves_spaced_vehicles_alone() {
        let guard = CollisionGuard::new(0.5);
        let mut proposed = vec![0.0, 1.0, 2.0, 3.0];
        let mut speeds = vec![1.0; 4];
        let clamped = guard.enforce(&mut proposed, &mut speeds);
        assert!(clamped.is_empty());
        assert_eq!(proposed, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(speeds, vec![1.0; 4]);
    }

    #[test]
    fn pulls_back_follower() {
        let guard = CollisionGuard::new(0.5);
        let mut proposed = vec![0.0, 1.8, 2.0, 4.0];
        let mut speeds = vec![1.0; 4];
        let clamped = guard.enforce(&mut proposed, &mut speeds);
        assert_eq!(clamped.as_slice(), &[1]);
        assert_approx_eq!(proposed[1], 1.5);
        assert_eq!(speeds, vec![1.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn single_pass_uses_tentative_leader() {
        // Vehicle 1 is tested against vehicle 2's tentative angle, then vehicle 2 is
        // pulled back; vehicle 1 is not revisited.
        let guard = CollisionGuard::new(0.5);
        let mut proposed = vec![0.0, 1.8, 2.0, 2.1];
        let mut speeds = vec![1.0; 4];
        let clamped = guard.enforce(&mut proposed, &mut speeds);
        assert_eq!(clamped.as_slice(), &[1, 2]);
        assert_approx_eq!(proposed[1], 1.5);
        assert_approx_eq!(proposed[2], 1.6);
        assert!(proposed[2] - proposed[1] < 0.5);
    }

    #[test]
    fn closes_the_ring() {
        let guard = CollisionGuard::new(0.5);
        let mut proposed = vec![0.1, 2.0, TAU - 0.2];
        let mut speeds = vec![1.0; 3];
        let clamped = guard.enforce(&mut proposed, &mut speeds);
        assert_eq!(clamped.as_slice(), &[2]);
        assert_approx_eq!(proposed[2], 0.1 + TAU - 0.5);
        assert_eq!(speeds, vec![1.0, 1.0, 0.0]);
    }
}
