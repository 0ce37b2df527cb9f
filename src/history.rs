use std::collections::VecDeque;

/// A bounded history of speed snapshots, used to emulate the
/// time it takes drivers to perceive and react to the traffic around them.
#[derive(Clone, Debug)]
pub struct ReactionDelayBuffer {
    /// The snapshots, oldest first.
    snapshots: VecDeque<Vec<f64>>,
    /// The maximum number of snapshots retained.
    depth: usize,
    /// The number of snapshots back that delayed readings are taken from.
    delay: usize,
}

impl ReactionDelayBuffer {
    /// Creates a buffer seeded with the initial speeds.
    pub fn new(initial: &[f64], depth: usize, delay: usize) -> Self {
        let depth = usize::max(depth, 1);
        let mut snapshots = VecDeque::with_capacity(depth + 1);
        snapshots.push_back(initial.to_vec());
        Self {
            snapshots,
            depth,
            delay,
        }
    }

    /// The number of snapshots currently retained.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns true if no snapshots are retained.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// The speeds as they were perceived `delay` snapshots ago.
    ///
    /// The most recent snapshot counts as one snapshot ago. Falls back to `current`
    /// if the delay is zero or not enough history has accumulated yet.
    pub fn delayed_speeds<'a>(&'a self, current: &'a [f64]) -> &'a [f64] {
        if self.delay == 0 || self.snapshots.len() < self.delay {
            return current;
        }
        &self.snapshots[self.snapshots.len() - self.delay]
    }

    /// Records a snapshot, discarding the oldest if the buffer is full.
    pub fn push(&mut self, snapshot: &[f64]) {
        if self.snapshots.len() >= self.depth {
            // Reuse the evicted allocation
            if let Some(mut oldest) = self.snapshots.pop_front() {
                oldest.clear();
                oldest.extend_from_slice(snapshot);
                self.snapshots.push_back(oldest);
                return;
            }
        }
        self.snapshots.push_back(snapshot.to_vec());
    }
}
