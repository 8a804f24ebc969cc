//! Event kinds, the in-process publish/subscribe relay, and the versioned
//! wire codec shared by client and server.

mod bus;
mod event;
mod wire;

pub use bus::EventBus;
pub use event::{
    AddEntity, ControlMove, ControlWalk, DespawnActor, LandNeverUsed, LandUsed, MoveAck,
    MoveInput, NewPos, RemoveEntity, SpawnActor, WorldEvent,
};
pub use wire::{PROTOCOL_VERSION, WireError, decode_event, encode_event};
