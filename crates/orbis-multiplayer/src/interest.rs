//! Server-side interest management: keeps every connected player's
//! `used_lands` and `spawned_actors` synchronized with reality using
//! minimal diffs, and emits exactly the events each client needs to
//! reconstruct visibility without a full-world resend.

use orbis_actor::{ActorChange, ActorRegistry};
use orbis_entity::EntityId;
use orbis_events::{DespawnActor, LandNeverUsed, LandUsed, NewPos, SpawnActor, WorldEvent};
use orbis_land::{LandHash, LandIndex, LandPos, land_pos_of, radius_land_positions};
use rustc_hash::FxHashSet;
use tracing::{debug, error};

use crate::diff::set_diff;

/// Land visibility radius in cells: each player subscribes to the
/// (2·r+1)² Chebyshev block around its current cell.
pub const VIEW_RADIUS: i32 = 1;

// ---------------------------------------------------------------------------
// InterestError
// ---------------------------------------------------------------------------

/// Invariant violations surfaced by interest bookkeeping. These paths are
/// unreachable given correct diffing; an error here is a logic bug in the
/// caller, not a recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterestError {
    /// The id does not name a connected player.
    #[error("actor {0} is not a connected player")]
    NotAPlayer(EntityId),

    /// A land cell was marked used but never materialized by the time it
    /// was unused.
    #[error("player {player_id} unused land ({x}, {y}) that was never materialized")]
    LandNotMaterialized {
        /// The player whose subscription is being dropped.
        player_id: EntityId,
        /// Cell X coordinate.
        x: i32,
        /// Cell Y coordinate.
        y: i32,
    },

    /// A stored land hash failed to decode.
    #[error("corrupt land hash in used set: {0}")]
    CorruptLandHash(#[from] orbis_land::LandHashError),
}

// ---------------------------------------------------------------------------
// InterestManager
// ---------------------------------------------------------------------------

/// Recomputes per-player interest sets on registry notifications and
/// queues the resulting diff events. Interest state itself lives on each
/// player record and is mutated only here.
pub struct InterestManager {
    outbox: Vec<WorldEvent>,
}

impl Default for InterestManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InterestManager {
    /// Creates an interest manager with an empty outbox.
    pub fn new() -> Self {
        Self { outbox: Vec::new() }
    }

    /// Reacts to one registry notification. The three [`ActorChange`]
    /// kinds are the only signals interest management consumes — actor
    /// positions are never polled.
    ///
    /// Land visibility is deliberately coarse: only the *moving player's
    /// own* movement re-runs its land diff. A bystander actor moving
    /// through an unchanged cell never triggers another player's land
    /// recomputation.
    pub fn handle_actor_change(
        &mut self,
        change: &ActorChange,
        registry: &mut ActorRegistry,
        lands: &LandIndex,
    ) -> Result<(), InterestError> {
        match *change {
            ActorChange::Added { actor_id } => {
                for player_id in registry.player_ids() {
                    self.spawn_actor(registry, player_id, actor_id);
                }
                Ok(())
            }
            ActorChange::Removed { actor_id } => {
                for player_id in registry.player_ids() {
                    self.despawn_actor(registry, player_id, actor_id);
                }
                Ok(())
            }
            ActorChange::Moved { actor_id, x, y } => {
                self.outbox.push(WorldEvent::NewPos(NewPos { actor_id, x, y }));
                let is_player = registry.get(actor_id).is_some_and(|a| a.is_player());
                if is_player {
                    self.update_used_lands(registry, lands, actor_id)?;
                }
                Ok(())
            }
        }
    }

    /// Adds `actor_id` to `player_id`'s view. Idempotent: an
    /// already-spawned actor yields no event and no membership change, so
    /// at-least-once delivery upstream is safe. Unknown ids produce no
    /// event for this tick rather than failing.
    pub fn spawn_actor(
        &mut self,
        registry: &mut ActorRegistry,
        player_id: EntityId,
        actor_id: EntityId,
    ) {
        let Some(actor) = registry.get(actor_id) else {
            return;
        };
        let actor_type = actor.actor_type;
        let ctor_option = actor.construct_snapshot();

        let Some(player) = registry.get_mut(player_id).and_then(|a| a.player.as_mut()) else {
            return;
        };
        if !player.spawned_actors.insert(actor_id) {
            return;
        }

        self.outbox.push(WorldEvent::SpawnActor(SpawnActor {
            actor_id,
            actor_type,
            from_player_id: player_id,
            ctor_option,
        }));
    }

    /// Removes `actor_id` from `player_id`'s view. Idempotent no-op if
    /// the actor was not spawned there.
    pub fn despawn_actor(
        &mut self,
        registry: &mut ActorRegistry,
        player_id: EntityId,
        actor_id: EntityId,
    ) {
        let Some(player) = registry.get_mut(player_id).and_then(|a| a.player.as_mut()) else {
            return;
        };
        if !player.spawned_actors.remove(&actor_id) {
            return;
        }

        self.outbox.push(WorldEvent::DespawnActor(DespawnActor {
            actor_id,
            from_player_id: player_id,
        }));
    }

    /// Recomputes `player_id`'s land subscriptions from its current cell
    /// and applies the exact diff: `LandUsed` for the new cells, then
    /// `LandNeverUsed` for the dropped ones.
    pub fn update_used_lands(
        &mut self,
        registry: &mut ActorRegistry,
        lands: &LandIndex,
        player_id: EntityId,
    ) -> Result<(), InterestError> {
        let (pos_x, pos_y, old) = match registry.get(player_id) {
            Some(actor) => match &actor.player {
                Some(data) => (actor.pos_x, actor.pos_y, data.used_lands.clone()),
                None => return Err(InterestError::NotAPlayer(player_id)),
            },
            None => return Err(InterestError::NotAPlayer(player_id)),
        };

        let new: FxHashSet<LandHash> = radius_land_positions(land_pos_of(pos_x, pos_y), VIEW_RADIUS)
            .into_iter()
            .map(|p| p.hash())
            .collect();

        let diff = set_diff(&old, &new);
        debug!(
            player_id = player_id.value(),
            used = diff.to_add.len(),
            unused = diff.to_remove.len(),
            "land interest diff"
        );

        for hash in diff.to_add {
            self.use_land(registry, lands, player_id, hash)?;
        }
        for hash in diff.to_remove {
            self.unuse_land(registry, lands, player_id, hash)?;
        }
        Ok(())
    }

    /// Marks one cell used. The cell may not be materialized yet — land
    /// can be used before it exists — so the emitted id is optional.
    fn use_land(
        &mut self,
        registry: &mut ActorRegistry,
        lands: &LandIndex,
        player_id: EntityId,
        hash: LandHash,
    ) -> Result<(), InterestError> {
        let pos: LandPos = hash.parse()?;
        let Some(player) = registry.get_mut(player_id).and_then(|a| a.player.as_mut()) else {
            return Err(InterestError::NotAPlayer(player_id));
        };
        if !player.used_lands.insert(hash) {
            return Ok(());
        }

        self.outbox.push(WorldEvent::LandUsed(LandUsed {
            player_id,
            land_pos_x: pos.x,
            land_pos_y: pos.y,
            land_id: lands.land_id(pos),
        }));
        Ok(())
    }

    /// Drops one cell subscription. A cell that was used must have been
    /// materialized by the time it is unused; anything else is a broken
    /// invariant.
    fn unuse_land(
        &mut self,
        registry: &mut ActorRegistry,
        lands: &LandIndex,
        player_id: EntityId,
        hash: LandHash,
    ) -> Result<(), InterestError> {
        let pos: LandPos = hash.parse()?;
        let Some(land) = lands.get_land(pos) else {
            error!(
                player_id = player_id.value(),
                x = pos.x,
                y = pos.y,
                "unusing a land cell that was never materialized"
            );
            return Err(InterestError::LandNotMaterialized {
                player_id,
                x: pos.x,
                y: pos.y,
            });
        };
        let land_id = orbis_entity::Entity::id(land);

        let Some(player) = registry.get_mut(player_id).and_then(|a| a.player.as_mut()) else {
            return Err(InterestError::NotAPlayer(player_id));
        };
        if !player.used_lands.remove(&hash) {
            return Ok(());
        }

        self.outbox.push(WorldEvent::LandNeverUsed(LandNeverUsed {
            player_id,
            land_pos_x: pos.x,
            land_pos_y: pos.y,
            land_id,
        }));
        Ok(())
    }

    /// Drains the queued diff events in emission order.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.outbox)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_actor::{Actor, ActorType};

    fn materialize_block(lands: &mut LandIndex, r: i32) {
        for pos in radius_land_positions(LandPos::new(0, 0), r) {
            lands.create_land(pos);
        }
    }

    fn setup() -> (ActorRegistry, LandIndex, InterestManager) {
        let mut lands = LandIndex::new();
        materialize_block(&mut lands, 3);
        (ActorRegistry::new(), lands, InterestManager::new())
    }

    #[test]
    fn test_spawn_is_idempotent() {
        let (mut registry, _lands, mut interest) = setup();
        let player = registry.add_actor(Actor::new_player("c1", 0.0, 0.0));
        let bow = registry.add_actor(Actor::new(ActorType::Bow, 4.0, 4.0));

        interest.spawn_actor(&mut registry, player, bow);
        interest.spawn_actor(&mut registry, player, bow);

        let events = interest.drain_events();
        assert_eq!(events.len(), 1, "duplicate spawn must stay silent");
        let spawned = &registry.get(player).unwrap().player.as_ref().unwrap().spawned_actors;
        assert!(spawned.contains(&bow));
        assert_eq!(spawned.len(), 1);

        // Despawn twice: one event, then silence.
        interest.despawn_actor(&mut registry, player, bow);
        interest.despawn_actor(&mut registry, player, bow);
        assert_eq!(interest.drain_events().len(), 1);
    }

    #[test]
    fn test_initial_lands_cover_the_block() {
        let (mut registry, lands, mut interest) = setup();
        let player = registry.add_actor(Actor::new_player("c1", 0.0, 0.0));

        interest.update_used_lands(&mut registry, &lands, player).unwrap();

        let used = &registry.get(player).unwrap().player.as_ref().unwrap().used_lands;
        assert_eq!(used.len(), 9);
        for pos in radius_land_positions(LandPos::new(0, 0), 1) {
            assert!(used.contains(&pos.hash()));
        }
        assert_eq!(interest.drain_events().len(), 9);
    }

    #[test]
    fn test_use_before_materialization_emits_placeholder() {
        let lands = LandIndex::new(); // nothing materialized
        let mut registry = ActorRegistry::new();
        let mut interest = InterestManager::new();
        let player = registry.add_actor(Actor::new_player("c1", 0.0, 0.0));

        interest.update_used_lands(&mut registry, &lands, player).unwrap();
        for event in interest.drain_events() {
            match event {
                WorldEvent::LandUsed(used) => assert!(used.land_id.is_none()),
                other => panic!("unexpected event {other:?}"),
            }
        }

        // But unusing those never-materialized cells is a broken invariant.
        registry.set_position(player, 1000.0, 1000.0);
        let err = interest
            .update_used_lands(&mut registry, &lands, player)
            .unwrap_err();
        assert!(matches!(err, InterestError::LandNotMaterialized { .. }));
    }

    #[test]
    fn test_bystander_movement_does_not_touch_viewer_lands() {
        let (mut registry, lands, mut interest) = setup();
        let viewer = registry.add_actor(Actor::new_player("c1", 0.0, 0.0));
        let bystander = registry.add_actor(Actor::new(ActorType::Arrow, 0.0, 0.0));
        interest.update_used_lands(&mut registry, &lands, viewer).unwrap();
        interest.drain_events();
        registry.drain_changes();

        registry.set_position(bystander, 500.0, 500.0);
        for change in registry.drain_changes() {
            interest
                .handle_actor_change(&change, &mut registry, &lands)
                .unwrap();
        }

        let events = interest.drain_events();
        assert!(
            events
                .iter()
                .all(|e| matches!(e, WorldEvent::NewPos(_))),
            "bystander movement must not re-run the viewer's land diff"
        );
    }

    #[test]
    fn test_registry_add_fans_out_to_every_player() {
        let (mut registry, lands, mut interest) = setup();
        let p1 = registry.add_actor(Actor::new_player("c1", 0.0, 0.0));
        let p2 = registry.add_actor(Actor::new_player("c2", 40.0, 0.0));
        registry.drain_changes();

        let arrow = registry.add_actor(Actor::new(ActorType::Arrow, 8.0, 8.0));
        for change in registry.drain_changes() {
            interest
                .handle_actor_change(&change, &mut registry, &lands)
                .unwrap();
        }

        let spawns: Vec<EntityId> = interest
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                WorldEvent::SpawnActor(s) if s.actor_id == arrow => Some(s.from_player_id),
                _ => None,
            })
            .collect();
        assert!(spawns.contains(&p1));
        assert!(spawns.contains(&p2));
        assert_eq!(spawns.len(), 2);
    }
}
