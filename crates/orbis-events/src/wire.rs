//! Wire codec: postcard payload prefixed with a protocol version byte.

use crate::event::WorldEvent;

/// Current wire-protocol version. Prepended to every encoded event.
pub const PROTOCOL_VERSION: u8 = 1;

/// Errors from decoding a wire event.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The buffer was empty.
    #[error("empty wire buffer")]
    Empty,

    /// The leading version byte did not match [`PROTOCOL_VERSION`].
    #[error("protocol version mismatch: got {found}, expected {PROTOCOL_VERSION}")]
    VersionMismatch {
        /// The version byte found on the wire.
        found: u8,
    },

    /// The payload failed to deserialize.
    #[error("failed to decode event: {0}")]
    Decode(#[from] postcard::Error),

    /// Bytes remained after the payload.
    #[error("{0} trailing bytes after event payload")]
    TrailingBytes(usize),
}

/// Encodes an event for the wire.
pub fn encode_event(event: &WorldEvent) -> Result<Vec<u8>, postcard::Error> {
    let mut bytes = vec![PROTOCOL_VERSION];
    bytes.extend(postcard::to_allocvec(event)?);
    Ok(bytes)
}

/// Decodes a wire buffer produced by [`encode_event`].
pub fn decode_event(bytes: &[u8]) -> Result<WorldEvent, WireError> {
    let (&version, payload) = bytes.split_first().ok_or(WireError::Empty)?;
    if version != PROTOCOL_VERSION {
        return Err(WireError::VersionMismatch { found: version });
    }
    let (event, rest) = postcard::take_from_bytes(payload)?;
    if !rest.is_empty() {
        return Err(WireError::TrailingBytes(rest.len()));
    }
    Ok(event)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ControlWalk, DespawnActor, LandUsed};
    use orbis_actor::{Direction, RunningState};
    use orbis_entity::EntityId;

    #[test]
    fn test_wire_round_trip() {
        let events = vec![
            WorldEvent::DespawnActor(DespawnActor {
                actor_id: EntityId(7),
                from_player_id: EntityId(1),
            }),
            WorldEvent::LandUsed(LandUsed {
                player_id: EntityId(1),
                land_pos_x: -3,
                land_pos_y: 12,
                land_id: None,
            }),
            WorldEvent::ControlWalk(ControlWalk {
                actor_id: EntityId(1),
                direction: Direction::Left,
                running: RunningState::Walking,
            }),
        ];

        for event in &events {
            let bytes = encode_event(event).expect("encode");
            assert_eq!(bytes[0], PROTOCOL_VERSION);
            let decoded = decode_event(&bytes).expect("decode");
            assert_eq!(*event, decoded);
        }
    }

    #[test]
    fn test_decode_rejects_bad_buffers() {
        assert!(matches!(decode_event(&[]), Err(WireError::Empty)));
        assert!(matches!(
            decode_event(&[99, 0, 0]),
            Err(WireError::VersionMismatch { found: 99 })
        ));
        assert!(matches!(
            decode_event(&[PROTOCOL_VERSION]),
            Err(WireError::Decode(_))
        ));

        let mut padded = encode_event(&WorldEvent::DespawnActor(DespawnActor {
            actor_id: EntityId(1),
            from_player_id: EntityId(2),
        }))
        .expect("encode");
        padded.extend([0, 0, 0]);
        assert!(matches!(
            decode_event(&padded),
            Err(WireError::TrailingBytes(3))
        ));
    }
}
