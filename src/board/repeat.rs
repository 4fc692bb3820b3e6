// How a pad restarts itself. The loop toggle and the repeat interval are kept as separate
// user settings, but they collapse into exactly one policy so the engine loop and the
// interval timer can never both restart the same clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepeatPolicy {
    None,
    LoopImmediate,
    FixedDelay(u32), // ms between restarts, counted from each play
}

impl RepeatPolicy {
    pub fn resolve(looping: bool, repeat_interval_ms: u32) -> Self {
        if repeat_interval_ms > 0 {
            RepeatPolicy::FixedDelay(repeat_interval_ms)
        } else if looping {
            RepeatPolicy::LoopImmediate
        } else {
            RepeatPolicy::None
        }
    }

    pub fn engine_loops(self) -> bool {
        self == RepeatPolicy::LoopImmediate
    }
}

// A single pending restart. Cancelling is just dropping it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RepeatTimer {
    remaining_ms: f64,
}

impl RepeatTimer {
    pub fn new(delay_ms: u32) -> Self {
        Self { remaining_ms: delay_ms as f64 }
    }

    // true once the deadline has passed
    pub fn advance(&mut self, elapsed_ms: f64) -> bool {
        self.remaining_ms -= elapsed_ms;
        self.remaining_ms <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_wins_over_loop_flag() {
        assert_eq!(RepeatPolicy::resolve(true, 500), RepeatPolicy::FixedDelay(500));
        assert_eq!(RepeatPolicy::resolve(true, 0), RepeatPolicy::LoopImmediate);
        assert_eq!(RepeatPolicy::resolve(false, 0), RepeatPolicy::None);
        assert!(!RepeatPolicy::FixedDelay(500).engine_loops());
    }

    #[test]
    fn timer_fires_after_deadline() {
        let mut t = RepeatTimer::new(100);
        assert!(!t.advance(60.0));
        assert!(t.advance(40.0));
    }
}
