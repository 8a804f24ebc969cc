//! Simulated world objects: the actor data model, attribute maps with
//! dirty tracking, and the registry that owns all server-side actors.

mod actor;
mod attributes;
mod registry;

pub use actor::{
    Actor, ActorSnapshot, ActorType, AttachType, Attachment, Direction, PlayerData, RunningState,
};
pub use attributes::{AttributeMap, AttributeValue};
pub use registry::{ActorChange, ActorRegistry};
