//! The closed set of event kinds carried by the bus.
//!
//! Each kind is an enum variant with a named payload struct, replacing
//! method-name string dispatch with a type the compiler checks.

use orbis_actor::{ActorSnapshot, ActorType, Direction, RunningState};
use orbis_entity::EntityId;
use orbis_land::BrickUpdate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level enum
// ---------------------------------------------------------------------------

/// Every message kind the synchronization core consumes or produces, both
/// in-process notifications and wire events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum WorldEvent {
    // --- Actor Registry notifications ---
    /// An entity was added to a registry.
    AddEntity(AddEntity),
    /// An entity was removed from a registry.
    RemoveEntity(RemoveEntity),
    /// An actor's authoritative position changed.
    NewPos(NewPos),

    // --- Server → client interest events ---
    /// Build a local proxy for a newly-relevant actor.
    SpawnActor(SpawnActor),
    /// Destroy the local proxy for a no-longer-relevant actor.
    DespawnActor(DespawnActor),
    /// A player now subscribes to a land cell.
    LandUsed(LandUsed),
    /// A player no longer subscribes to a land cell.
    LandNeverUsed(LandNeverUsed),
    /// A land cell's brick layer stack changed.
    UpdateBrick(BrickUpdate),

    // --- Client → server intents ---
    /// A buffered movement input from the controlled player.
    ControlMove(ControlMove),
    /// The controlled player's walk state flipped.
    ControlWalk(ControlWalk),

    // --- Server → client acknowledgment ---
    /// Authoritative state up to a processed input sequence.
    MoveAck(MoveAck),
}

// ---------------------------------------------------------------------------
// Payload structs
// ---------------------------------------------------------------------------

/// An entity was added; carries only the new id.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AddEntity {
    /// The new entity's id.
    pub entity_id: EntityId,
}

/// An entity was removed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RemoveEntity {
    /// The removed entity's id.
    pub entity_id: EntityId,
}

/// Authoritative position change for one actor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NewPos {
    /// The moved actor.
    pub actor_id: EntityId,
    /// New world X position.
    pub x: f64,
    /// New world Y position.
    pub y: f64,
}

/// Full constructor payload for a newly-relevant actor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpawnActor {
    /// The actor to spawn.
    pub actor_id: EntityId,
    /// Its type tag.
    pub actor_type: ActorType,
    /// The player whose view gains the actor.
    pub from_player_id: EntityId,
    /// Wire-visible constructor fields.
    pub ctor_option: ActorSnapshot,
}

/// Removal of an actor from one player's view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DespawnActor {
    /// The actor to despawn.
    pub actor_id: EntityId,
    /// The player whose view loses the actor.
    pub from_player_id: EntityId,
}

/// A player now subscribes to a land cell. `land_id` is absent when the
/// cell is used before it is materialized.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LandUsed {
    /// The subscribing player.
    pub player_id: EntityId,
    /// Cell X coordinate.
    pub land_pos_x: i32,
    /// Cell Y coordinate.
    pub land_pos_y: i32,
    /// Id of the materialized cell, if any.
    pub land_id: Option<EntityId>,
}

/// A player's subscription to a land cell ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LandNeverUsed {
    /// The unsubscribing player.
    pub player_id: EntityId,
    /// Cell X coordinate.
    pub land_pos_x: i32,
    /// Cell Y coordinate.
    pub land_pos_y: i32,
    /// Id of the cell, which must have been materialized while used.
    pub land_id: EntityId,
}

/// A single predicted movement delta, ordered by its sequence number
/// rather than by arrival.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MoveInput {
    /// Client-assigned, monotonically increasing sequence number.
    pub sequence: u64,
    /// X movement delta for this tick.
    pub move_x: f64,
    /// Y movement delta for this tick.
    pub move_y: f64,
}

/// Movement intent from the controlled player.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ControlMove {
    /// The controlled actor.
    pub actor_id: EntityId,
    /// The buffered input.
    pub input: MoveInput,
}

/// Edge-triggered walk state change from the controlled player.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ControlWalk {
    /// The controlled actor.
    pub actor_id: EntityId,
    /// New facing direction.
    pub direction: Direction,
    /// New gait.
    pub running: RunningState,
}

/// Acknowledgment of processed inputs plus the resulting authoritative
/// trajectory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MoveAck {
    /// The acknowledged actor.
    pub actor_id: EntityId,
    /// Highest input sequence the server has applied.
    pub last_sequence: u64,
    /// Authoritative world X position.
    pub x: f64,
    /// Authoritative world Y position.
    pub y: f64,
    /// Authoritative X motion.
    pub motion_x: f64,
    /// Authoritative Y motion.
    pub motion_y: f64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
