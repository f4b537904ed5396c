// gesture/mod.rs
//
// Bounded progress driven by pointer gestures: stirring and press-and-hold
// pouring. Both own their timers, so dropping an accumulator cancels its
// pending completion.

pub mod pour;
pub mod stir;

pub use pour::{PourAccumulator, PourConfig};
pub use stir::{StirAccumulator, StirConfig, StirOutcome};

/// Upper bound of every accumulator.
pub const MAX_PROGRESS: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Progress reached the maximum. Fired once.
    Completed,
    /// The completion display hold elapsed. Fired once.
    Finished,
    /// Stirring too fast; shown until the next counted stir.
    TooFast,
    WarningCleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GestureTimer {
    Tick,
    Finish,
}
