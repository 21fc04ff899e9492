//! Signal source capability.
//!
//! A strategy precomputes its indicator arrays once per session in
//! [`SignalSource::prepare`], then is queried bar by bar through
//! [`SignalSource::decide`]. The raw decision is turned into a held position
//! by [`PositionStateMachine`](super::position::PositionStateMachine)
//! according to the source's [`PositionPolicy`].

use super::session::Session;

/// How raw signals map onto the held position after warmup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionPolicy {
    /// Hold the latest non-neutral signal until one of the opposite sign
    /// arrives. A neutral signal is "no instruction", never an exit.
    FlipFlop,
    /// Evaluate the source's exit condition against the prior position first,
    /// then let any non-neutral entry signal replace the result.
    ForcedExit,
    /// The held position is the raw signal itself; neutral means flat.
    Direct,
}

/// What the state machine exposes to a source when asking for bar `index`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalContext {
    pub index: usize,
    /// Position held entering this bar (decided at the previous bar).
    pub prior_held: f64,
    /// Raw signal produced at the previous bar, 0 during warmup.
    pub prior_signal: f64,
}

/// Raw output of a source for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Decision {
    /// Target position in [-1, 1]; 0 is neutral.
    pub signal: f64,
    /// Exit condition for the position held entering the bar.
    pub exit: bool,
}

impl Decision {
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn target(signal: f64) -> Self {
        Self {
            signal,
            exit: false,
        }
    }

    pub fn exit() -> Self {
        Self {
            signal: 0.0,
            exit: true,
        }
    }

    pub fn with_exit(mut self, exit: bool) -> Self {
        self.exit = exit;
        self
    }
}

pub trait SignalSource {
    /// Display name used for output files and logs.
    fn name(&self) -> String;

    /// Bars before this index are held flat without consulting the source.
    fn warmup_bars(&self) -> usize;

    fn policy(&self) -> PositionPolicy;

    /// Compute indicator arrays for a session. Called once before any
    /// [`decide`](Self::decide) for that session.
    fn prepare(&mut self, session: &Session);

    fn decide(&self, ctx: &SignalContext) -> Decision;
}

impl<T: SignalSource + ?Sized> SignalSource for Box<T> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn warmup_bars(&self) -> usize {
        (**self).warmup_bars()
    }

    fn policy(&self) -> PositionPolicy {
        (**self).policy()
    }

    fn prepare(&mut self, session: &Session) {
        (**self).prepare(session)
    }

    fn decide(&self, ctx: &SignalContext) -> Decision {
        (**self).decide(ctx)
    }
}

/// Clamp a raw signal into [-1, 1]; non-finite values are neutral.
pub fn sanitize_signal(signal: f64) -> f64 {
    if signal.is_finite() {
        signal.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
