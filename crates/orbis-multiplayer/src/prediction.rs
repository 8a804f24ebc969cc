//! Client-side prediction: applies movement intents locally the instant
//! they happen, buffers them for replay, and emits the intents the server
//! needs to reach the same state.

use std::collections::VecDeque;

use orbis_actor::{Direction, RunningState};
use orbis_entity::EntityId;
use orbis_events::{ControlMove, ControlWalk, MoveInput};

/// Maximum number of unacknowledged inputs kept for replay. Once full,
/// the oldest input is evicted; a later ack covering it is then stale.
pub const INPUT_BUFFER_SIZE: usize = 128;

// ---------------------------------------------------------------------------
// PredictedState
// ---------------------------------------------------------------------------

/// The locally-predicted kinematic state of the controlled actor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PredictedState {
    /// Predicted world X position.
    pub x: f64,
    /// Predicted world Y position.
    pub y: f64,
    /// Predicted X motion.
    pub motion_x: f64,
    /// Predicted Y motion.
    pub motion_y: f64,
}

/// The shared movement step. Client prediction and server authority run
/// exactly this function, so replaying the same inputs from the same
/// state converges bit-for-bit.
pub fn simulate_move(state: &mut PredictedState, move_x: f64, move_y: f64) {
    state.x += move_x;
    state.y += move_y;
    state.motion_x = move_x;
    state.motion_y = move_y;
}

// ---------------------------------------------------------------------------
// InputBuffer
// ---------------------------------------------------------------------------

/// Sequence-ordered ring of unacknowledged inputs.
#[derive(Debug, Default)]
pub struct InputBuffer {
    inputs: VecDeque<MoveInput>,
}

impl InputBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self {
            inputs: VecDeque::with_capacity(INPUT_BUFFER_SIZE),
        }
    }

    /// Appends an input, evicting the oldest if the buffer is full.
    pub fn push(&mut self, input: MoveInput) {
        if self.inputs.len() == INPUT_BUFFER_SIZE {
            self.inputs.pop_front();
        }
        self.inputs.push_back(input);
    }

    /// Drops every input with `sequence <= acked`.
    pub fn discard_up_to(&mut self, acked: u64) {
        while let Some(front) = self.inputs.front() {
            if front.sequence > acked {
                break;
            }
            self.inputs.pop_front();
        }
    }

    /// Iterates the remaining inputs in sequence order.
    pub fn iter(&self) -> impl Iterator<Item = &MoveInput> {
        self.inputs.iter()
    }

    /// Number of buffered inputs.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Returns `true` if no inputs are buffered.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

// ---------------------------------------------------------------------------
// PredictionManager
// ---------------------------------------------------------------------------

/// The intents produced by one prediction tick, ready to be sent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PredictionTick {
    /// Movement intent, present when the tick had a non-zero intent.
    pub control_move: Option<ControlMove>,
    /// Walk-state intent, present only on an actual state flip.
    pub control_walk: Option<ControlWalk>,
}

/// Drives prediction for the one actor this client controls.
#[derive(Debug)]
pub struct PredictionManager {
    actor_id: EntityId,
    /// Current predicted kinematic state.
    pub state: PredictedState,
    /// Unacknowledged inputs awaiting server confirmation.
    pub buffer: InputBuffer,
    next_sequence: u64,
    last_applied_ack: u64,
    direction: Direction,
    running: RunningState,
}

impl PredictionManager {
    /// Creates a manager for the controlled actor starting at the given
    /// authoritative position.
    pub fn new(actor_id: EntityId, x: f64, y: f64) -> Self {
        Self {
            actor_id,
            state: PredictedState {
                x,
                y,
                motion_x: 0.0,
                motion_y: 0.0,
            },
            buffer: InputBuffer::new(),
            next_sequence: 1,
            last_applied_ack: 0,
            direction: Direction::Forward,
            running: RunningState::Silent,
        }
    }

    /// The actor this manager controls.
    pub fn actor_id(&self) -> EntityId {
        self.actor_id
    }

    /// Highest server sequence already folded into the predicted state.
    pub fn last_applied_ack(&self) -> u64 {
        self.last_applied_ack
    }

    pub(crate) fn set_last_applied_ack(&mut self, acked: u64) {
        self.last_applied_ack = acked;
    }

    /// Runs one prediction tick.
    ///
    /// A non-zero intent is applied to the predicted state immediately,
    /// buffered under a fresh sequence number, and returned as a
    /// `ControlMove`. Walk state is derived from the intent and emitted
    /// only when it flips, so a player holding a direction produces one
    /// `ControlWalk`, not one per tick.
    pub fn tick(&mut self, intent: Option<(f64, f64)>) -> PredictionTick {
        let mut out = PredictionTick::default();

        let (direction, running) = match intent {
            Some((dx, dy)) if dx != 0.0 || dy != 0.0 => {
                simulate_move(&mut self.state, dx, dy);
                let input = MoveInput {
                    sequence: self.next_sequence,
                    move_x: dx,
                    move_y: dy,
                };
                self.next_sequence += 1;
                self.buffer.push(input);
                out.control_move = Some(ControlMove {
                    actor_id: self.actor_id,
                    input,
                });

                let direction = Direction::from_motion(dx, dy).unwrap_or(self.direction);
                (direction, RunningState::Walking)
            }
            _ => {
                self.state.motion_x = 0.0;
                self.state.motion_y = 0.0;
                (self.direction, RunningState::Silent)
            }
        };

        if direction != self.direction || running != self.running {
            self.direction = direction;
            self.running = running;
            out.control_walk = Some(ControlWalk {
                actor_id: self.actor_id,
                direction,
                running,
            });
        }

        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_applies_immediately_and_buffers() {
        let mut prediction = PredictionManager::new(EntityId(1), 10.0, 10.0);

        let first = prediction.tick(Some((0.5, 0.0)));
        let second = prediction.tick(Some((0.5, -0.25)));

        assert_eq!(prediction.state.x, 11.0);
        assert_eq!(prediction.state.y, 9.75);
        assert_eq!(prediction.buffer.len(), 2);

        let m1 = first.control_move.unwrap();
        let m2 = second.control_move.unwrap();
        assert_eq!(m1.input.sequence, 1);
        assert_eq!(m2.input.sequence, 2);
        assert_eq!(m2.input.move_y, -0.25);
    }

    #[test]
    fn test_walk_state_is_edge_triggered() {
        let mut prediction = PredictionManager::new(EntityId(1), 0.0, 0.0);

        // Starting to move right: one walk event.
        let t1 = prediction.tick(Some((1.0, 0.0)));
        let walk = t1.control_walk.unwrap();
        assert_eq!(walk.direction, Direction::Right);
        assert_eq!(walk.running, RunningState::Walking);

        // Holding the same direction: movement continues, no walk event.
        let t2 = prediction.tick(Some((1.0, 0.0)));
        assert!(t2.control_move.is_some());
        assert!(t2.control_walk.is_none());

        // Turning: direction flip emits.
        let t3 = prediction.tick(Some((-1.0, 0.0)));
        assert_eq!(t3.control_walk.unwrap().direction, Direction::Left);

        // Stopping: one Silent event, then silence.
        let t4 = prediction.tick(None);
        assert!(t4.control_move.is_none());
        assert_eq!(t4.control_walk.unwrap().running, RunningState::Silent);
        let t5 = prediction.tick(None);
        assert!(t5.control_walk.is_none());
    }

    #[test]
    fn test_zero_intent_emits_nothing_kinematic() {
        let mut prediction = PredictionManager::new(EntityId(1), 5.0, 5.0);
        let tick = prediction.tick(Some((0.0, 0.0)));
        assert!(tick.control_move.is_none());
        assert_eq!(prediction.state.x, 5.0);
        assert!(prediction.buffer.is_empty());
    }

    #[test]
    fn test_buffer_evicts_oldest_when_full() {
        let mut buffer = InputBuffer::new();
        for sequence in 1..=(INPUT_BUFFER_SIZE as u64 + 10) {
            buffer.push(MoveInput {
                sequence,
                move_x: 0.1,
                move_y: 0.0,
            });
        }
        assert_eq!(buffer.len(), INPUT_BUFFER_SIZE);
        assert_eq!(buffer.iter().next().unwrap().sequence, 11);
    }

    #[test]
    fn test_discard_up_to_keeps_later_inputs() {
        let mut buffer = InputBuffer::new();
        for sequence in 1..=5 {
            buffer.push(MoveInput {
                sequence,
                move_x: 0.0,
                move_y: 0.1,
            });
        }
        buffer.discard_up_to(3);
        let remaining: Vec<u64> = buffer.iter().map(|i| i.sequence).collect();
        assert_eq!(remaining, vec![4, 5]);

        buffer.discard_up_to(100);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_simulate_move_matches_on_client_and_server() {
        let inputs = [(0.5, 0.0), (0.5, 0.5), (-0.25, 0.1)];

        let mut client = PredictedState {
            x: 3.0,
            y: 4.0,
            ..Default::default()
        };
        let mut server = client;
        for &(dx, dy) in &inputs {
            simulate_move(&mut client, dx, dy);
            simulate_move(&mut server, dx, dy);
        }
        assert_eq!(client, server);
        assert_eq!(client.motion_x, -0.25);
    }
}
