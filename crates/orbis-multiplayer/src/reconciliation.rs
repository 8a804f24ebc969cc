//! Reconciliation: folds an authoritative movement ack into the predicted
//! state by snapping to the server's trajectory and replaying every input
//! the server has not seen yet.

use orbis_events::MoveAck;
use tracing::trace;

use crate::prediction::{PredictedState, PredictionManager, simulate_move};

/// What [`reconcile`] did with an ack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// The ack was applied; carries the number of inputs replayed on top
    /// of the authoritative state.
    Applied {
        /// Unacknowledged inputs re-simulated after the snap.
        replayed: usize,
    },
    /// The ack was older than one already applied and was ignored.
    Stale,
}

/// Applies one server ack to the controlled actor's prediction.
///
/// Out-of-order acks are ignored: an ack is only applied if its
/// `last_sequence` is newer than the last one folded in. On apply, inputs
/// up to the acked sequence are discarded, the predicted state snaps to
/// the authoritative values, and the remaining buffered inputs replay in
/// sequence order through the same step function the server runs. With no
/// mispredictions the replayed state lands exactly where prediction
/// already was, so the player sees no corrective jump.
pub fn reconcile(prediction: &mut PredictionManager, ack: &MoveAck) -> AckOutcome {
    if ack.last_sequence <= prediction.last_applied_ack() {
        return AckOutcome::Stale;
    }

    prediction.buffer.discard_up_to(ack.last_sequence);
    prediction.set_last_applied_ack(ack.last_sequence);

    prediction.state = PredictedState {
        x: ack.x,
        y: ack.y,
        motion_x: ack.motion_x,
        motion_y: ack.motion_y,
    };

    let mut replayed = 0;
    let pending: Vec<_> = prediction.buffer.iter().copied().collect();
    for input in pending {
        simulate_move(&mut prediction.state, input.move_x, input.move_y);
        replayed += 1;
    }

    trace!(
        actor_id = ack.actor_id.value(),
        last_sequence = ack.last_sequence,
        replayed,
        "reconciled movement ack"
    );
    AckOutcome::Applied { replayed }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
