//! The actor record: any simulated world object with a position.

use orbis_entity::{Entity, EntityId};
use orbis_land::{LandHash, LandPos, land_pos_of};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::attributes::AttributeMap;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Discriminates the kinds of simulated world objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorType {
    /// A connected player's avatar.
    Player,
    /// A held bow.
    Bow,
    /// An arrow projectile.
    Arrow,
    /// A building rendered as a viewable actor.
    Building,
}

/// Facing direction of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Facing -X.
    Left,
    /// Facing +X.
    Right,
    /// Facing +Y (toward the viewer).
    Forward,
    /// Facing -Y.
    Back,
}

impl Direction {
    /// Derives a facing from a movement intent vector. The dominant axis
    /// wins; horizontal wins ties. Returns `None` for a zero vector.
    pub fn from_motion(dx: f64, dy: f64) -> Option<Direction> {
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        Some(if dx.abs() >= dy.abs() {
            if dx < 0.0 { Direction::Left } else { Direction::Right }
        } else if dy < 0.0 {
            Direction::Back
        } else {
            Direction::Forward
        })
    }
}

/// Gait of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunningState {
    /// Standing still.
    Silent,
    /// Walking.
    Walking,
    /// Running.
    Running,
}

/// Attachment slots on an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachType {
    /// Held-item slot.
    RightHand,
}

// ---------------------------------------------------------------------------
// Attachment
// ---------------------------------------------------------------------------

/// One side of an attachment link, stored by identity. `actor_id` names
/// the actor on the *other* side: in `attachments` it is the attached
/// actor, in `attaching` it is the holder. Both sides are maintained by
/// the registry so either can be torn down without dangling access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// The slot this link occupies.
    pub attach_type: AttachType,
    /// The actor on the other side of the link.
    pub actor_id: EntityId,
}

// ---------------------------------------------------------------------------
// PlayerData
// ---------------------------------------------------------------------------

/// Per-player interest state. Present only on player actors.
#[derive(Debug, Clone, Default)]
pub struct PlayerData {
    /// Connection identifier assigned at login.
    pub conn_id: String,
    /// Ids of actors currently spawned into this player's view; mirrors
    /// the spawn events already sent.
    pub spawned_actors: FxHashSet<EntityId>,
    /// Hashes of land cells this player currently subscribes to.
    pub used_lands: FxHashSet<LandHash>,
}

impl PlayerData {
    /// Creates empty interest state for a new connection.
    pub fn new(conn_id: impl Into<String>) -> Self {
        Self {
            conn_id: conn_id.into(),
            spawned_actors: FxHashSet::default(),
            used_lands: FxHashSet::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// A simulated world object. Position writes go through the registry so
/// movement notifications stay edge-triggered.
#[derive(Debug, Clone)]
pub struct Actor {
    id: EntityId,
    /// Kind of object.
    pub actor_type: ActorType,
    /// World X position.
    pub pos_x: f64,
    /// World Y position.
    pub pos_y: f64,
    /// The land cell this actor currently occupies.
    pub at_land: LandPos,
    /// X motion per tick.
    pub motion_x: f64,
    /// Y motion per tick.
    pub motion_y: f64,
    /// Whether the actor's use interaction is active.
    pub is_using: bool,
    /// Ticks elapsed since the use interaction started.
    pub use_tick: u32,
    /// Slot → attached actor links.
    pub attachments: Vec<Attachment>,
    /// Back-reference when this actor is itself attached to another.
    pub attaching: Option<Attachment>,
    /// Facing direction.
    pub direction: Direction,
    /// Gait.
    pub running: RunningState,
    /// Named attributes with dirty tracking.
    pub attrs: AttributeMap,
    /// Present when this actor is a connected player.
    pub player: Option<PlayerData>,
}

impl Actor {
    /// Creates an actor of the given type at a world position.
    pub fn new(actor_type: ActorType, pos_x: f64, pos_y: f64) -> Self {
        Self {
            id: EntityId(0),
            actor_type,
            pos_x,
            pos_y,
            at_land: land_pos_of(pos_x, pos_y),
            motion_x: 0.0,
            motion_y: 0.0,
            is_using: false,
            use_tick: 0,
            attachments: Vec::new(),
            attaching: None,
            direction: Direction::Forward,
            running: RunningState::Silent,
            attrs: AttributeMap::new(),
            player: None,
        }
    }

    /// Creates a player actor with fresh interest state.
    pub fn new_player(conn_id: impl Into<String>, pos_x: f64, pos_y: f64) -> Self {
        let mut actor = Self::new(ActorType::Player, pos_x, pos_y);
        actor.player = Some(PlayerData::new(conn_id));
        actor
    }

    /// Returns `true` if this actor is a connected player.
    pub fn is_player(&self) -> bool {
        self.player.is_some()
    }

    /// Returns the link in the given slot, if occupied.
    pub fn attachment(&self, attach_type: AttachType) -> Option<Attachment> {
        self.attachments
            .iter()
            .copied()
            .find(|a| a.attach_type == attach_type)
    }

    /// Captures the wire-visible constructor payload for this actor.
    pub fn construct_snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            pos_x: self.pos_x,
            pos_y: self.pos_y,
            at_land: self.at_land,
            motion_x: self.motion_x,
            motion_y: self.motion_y,
            is_using: self.is_using,
            use_tick: self.use_tick,
            attachments: self.attachments.clone(),
            attaching: self.attaching,
            direction: self.direction,
            running: self.running,
            attrs: self.attrs.clone(),
        }
    }

    /// Reconstructs a local proxy from a constructor payload, as the
    /// client does when handling a spawn event.
    pub fn from_snapshot(actor_type: ActorType, snapshot: ActorSnapshot) -> Self {
        Self {
            id: EntityId(0),
            actor_type,
            pos_x: snapshot.pos_x,
            pos_y: snapshot.pos_y,
            at_land: snapshot.at_land,
            motion_x: snapshot.motion_x,
            motion_y: snapshot.motion_y,
            is_using: snapshot.is_using,
            use_tick: snapshot.use_tick,
            attachments: snapshot.attachments,
            attaching: snapshot.attaching,
            direction: snapshot.direction,
            running: snapshot.running,
            attrs: snapshot.attrs,
            player: None,
        }
    }
}

impl Entity for Actor {
    fn id(&self) -> EntityId {
        self.id
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

// ---------------------------------------------------------------------------
// ActorSnapshot
// ---------------------------------------------------------------------------

/// The statically-declared constructor payload: the fields a client needs
/// to build a local proxy from scratch. [`CONSTRUCT_FIELDS`](ActorSnapshot::CONSTRUCT_FIELDS)
/// fixes the field order for cross-version compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    /// World X position.
    pub pos_x: f64,
    /// World Y position.
    pub pos_y: f64,
    /// Occupied land cell.
    pub at_land: LandPos,
    /// X motion per tick.
    pub motion_x: f64,
    /// Y motion per tick.
    pub motion_y: f64,
    /// Use-interaction flag.
    pub is_using: bool,
    /// Use-interaction tick counter.
    pub use_tick: u32,
    /// Slot → attached actor links.
    pub attachments: Vec<Attachment>,
    /// Back-reference link, if attached.
    pub attaching: Option<Attachment>,
    /// Facing direction.
    pub direction: Direction,
    /// Gait.
    pub running: RunningState,
    /// Full attribute snapshot.
    pub attrs: AttributeMap,
}

impl ActorSnapshot {
    /// Ordered schema of wire-visible constructor fields.
    pub const CONSTRUCT_FIELDS: &'static [&'static str] = &[
        "pos_x",
        "pos_y",
        "at_land",
        "motion_x",
        "motion_y",
        "is_using",
        "use_tick",
        "attachments",
        "attaching",
        "direction",
        "running",
        "attrs",
    ];
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
