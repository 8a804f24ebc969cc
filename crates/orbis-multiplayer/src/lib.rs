//! Interest management, client-side prediction, and reconciliation: the
//! per-player synchronization layer between the authoritative registry and
//! each connected client's local view.

mod client;
mod diff;
mod interest;
mod prediction;
mod reconciliation;
mod session;
mod tick;

pub use client::{ClientWorld, apply_intent, deliver_events};
pub use diff::{SetDiff, set_diff};
pub use interest::{InterestError, InterestManager, VIEW_RADIUS};
pub use prediction::{
    INPUT_BUFFER_SIZE, InputBuffer, PredictedState, PredictionManager, PredictionTick,
    simulate_move,
};
pub use reconciliation::{AckOutcome, reconcile};
pub use session::{join_player, leave_player};
pub use tick::{TICK_RATE, TickSchedule};
