//! Frame timing supplied by the host loop

/// Timing information for a single tick
///
/// The host supplies `delta` each frame; `elapsed` is the monotonically
/// increasing sum of all deltas seen by the owning scene.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous tick
    pub delta: f32,
    /// Seconds since the scene was entered
    pub elapsed: f64,
    /// Number of ticks stepped so far (the current tick included)
    pub frame: u64,
}

impl FrameTime {
    /// Advance by one tick of `delta` seconds
    pub fn advance(&mut self, delta: f32) {
        self.delta = delta;
        self.elapsed += f64::from(delta);
        self.frame += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates() {
        let mut time = FrameTime::default();
        time.advance(0.5);
        time.advance(0.25);

        assert_eq!(time.delta, 0.25);
        assert_eq!(time.elapsed, 0.75);
        assert_eq!(time.frame, 2);
    }
}
