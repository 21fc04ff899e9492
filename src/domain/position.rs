//! Position state machine.
//!
//! Turns the raw decision stream into the held position sequence. The held
//! position decided at bar `i` takes effect from bar `i + 1`.

use super::signal::{sanitize_signal, Decision, PositionPolicy, SignalSource};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionStateMachine {
    policy: PositionPolicy,
    warmup: usize,
}

impl PositionStateMachine {
    pub fn new(policy: PositionPolicy, warmup: usize) -> Self {
        Self { policy, warmup }
    }

    pub fn for_source<S: SignalSource + ?Sized>(source: &S) -> Self {
        Self::new(source.policy(), source.warmup_bars())
    }

    pub fn policy(&self) -> PositionPolicy {
        self.policy
    }

    pub fn warmup(&self) -> usize {
        self.warmup
    }

    pub fn in_warmup(&self, i: usize) -> bool {
        i < self.warmup
    }

    /// Held position for bar `i` given that bar's decision and the position
    /// held entering it.
    pub fn next(&self, i: usize, decision: Decision, prior_held: f64) -> f64 {
        if self.in_warmup(i) {
            return 0.0;
        }

        let signal = sanitize_signal(decision.signal);
        match self.policy {
            PositionPolicy::FlipFlop => {
                if signal != 0.0 {
                    signal
                } else {
                    prior_held
                }
            }
            PositionPolicy::ForcedExit => {
                let held = if decision.exit { 0.0 } else { prior_held };
                if signal != 0.0 { signal } else { held }
            }
            PositionPolicy::Direct => signal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warmup_forces_flat() {
        let m = PositionStateMachine::new(PositionPolicy::FlipFlop, 3);
        for i in 0..3 {
            assert_eq!(m.next(i, Decision::target(1.0), 0.0), 0.0);
            assert_eq!(m.next(i, Decision::target(-1.0), 1.0), 0.0);
        }
        assert_eq!(m.next(3, Decision::target(1.0), 0.0), 1.0);
    }

    #[test]
    fn flip_flop_neutral_is_no_instruction() {
        let m = PositionStateMachine::new(PositionPolicy::FlipFlop, 0);
        assert_eq!(m.next(5, Decision::neutral(), 1.0), 1.0);
        assert_eq!(m.next(5, Decision::neutral(), -1.0), -1.0);
        assert_eq!(m.next(5, Decision::neutral(), 0.0), 0.0);
    }

    #[test]
    fn flip_flop_ignores_exit_flag() {
        let m = PositionStateMachine::new(PositionPolicy::FlipFlop, 0);
        assert_eq!(m.next(5, Decision::exit(), 1.0), 1.0);
    }

    #[test]
    fn flip_flop_reverses_on_opposite_signal() {
        let m = PositionStateMachine::new(PositionPolicy::FlipFlop, 0);
        assert_eq!(m.next(5, Decision::target(-1.0), 1.0), -1.0);
    }

    #[test]
    fn forced_exit_goes_flat_without_entry() {
        let m = PositionStateMachine::new(PositionPolicy::ForcedExit, 0);
        assert_eq!(m.next(5, Decision::exit(), 1.0), 0.0);
        assert_eq!(m.next(5, Decision::neutral(), 1.0), 1.0);
    }

    #[test]
    fn forced_exit_entry_overrides_exit() {
        let m = PositionStateMachine::new(PositionPolicy::ForcedExit, 0);
        assert_eq!(m.next(5, Decision::target(-1.0).with_exit(true), 1.0), -1.0);
    }

    #[test]
    fn direct_follows_signal() {
        let m = PositionStateMachine::new(PositionPolicy::Direct, 0);
        assert_eq!(m.next(5, Decision::neutral(), 1.0), 0.0);
        assert_eq!(m.next(5, Decision::target(0.7), 0.0), 0.7);
    }

    #[test]
    fn non_finite_signal_is_neutral() {
        let m = PositionStateMachine::new(PositionPolicy::FlipFlop, 0);
        assert_eq!(m.next(5, Decision::target(f64::NAN), -1.0), -1.0);
        let m = PositionStateMachine::new(PositionPolicy::Direct, 0);
        assert_eq!(m.next(5, Decision::target(f64::NAN), -1.0), 0.0);
    }
}
