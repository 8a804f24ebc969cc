//! Session lifecycle helpers: bring a connecting player fully into the
//! world and tear one down on disconnect.

use orbis_actor::{Actor, ActorRegistry};
use orbis_entity::EntityId;
use orbis_land::LandIndex;
use tracing::info;

use crate::interest::{InterestError, InterestManager};

/// Admits a new connection as a player actor.
///
/// The player is added to the registry (which fans its spawn out to every
/// connected view, its own included), every pre-existing actor is spawned
/// into its fresh view, and its initial land subscriptions are computed.
/// After this returns, the drained interest events fully describe the
/// world from the new player's perspective.
pub fn join_player(
    registry: &mut ActorRegistry,
    lands: &LandIndex,
    interest: &mut InterestManager,
    conn_id: impl Into<String>,
    x: f64,
    y: f64,
) -> Result<EntityId, InterestError> {
    let conn_id = conn_id.into();
    let player_id = registry.add_actor(Actor::new_player(conn_id.clone(), x, y));
    for change in registry.drain_changes() {
        interest.handle_actor_change(&change, registry, lands)?;
    }

    for actor_id in registry.actor_ids() {
        interest.spawn_actor(registry, player_id, actor_id);
    }
    interest.update_used_lands(registry, lands, player_id)?;

    info!(player_id = player_id.value(), conn_id, "player joined");
    Ok(player_id)
}

/// Removes a disconnecting player, fanning its despawn out to every
/// remaining view. Unknown ids are a no-op.
pub fn leave_player(
    registry: &mut ActorRegistry,
    lands: &LandIndex,
    interest: &mut InterestManager,
    player_id: EntityId,
) -> Result<(), InterestError> {
    if registry.remove_actor(player_id).is_none() {
        return Ok(());
    }
    for change in registry.drain_changes() {
        interest.handle_actor_change(&change, registry, lands)?;
    }
    info!(player_id = player_id.value(), "player left");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interest::VIEW_RADIUS;
    use orbis_actor::ActorType;
    use orbis_events::WorldEvent;
    use orbis_land::{LandPos, radius_land_positions};

    fn world() -> (ActorRegistry, LandIndex, InterestManager) {
        let mut lands = LandIndex::new();
        for pos in radius_land_positions(LandPos::new(0, 0), 2) {
            lands.create_land(pos);
        }
        (ActorRegistry::new(), lands, InterestManager::new())
    }

    #[test]
    fn test_join_spawns_world_and_self_into_view() {
        let (mut registry, lands, mut interest) = world();
        let arrow = registry.add_actor(Actor::new(ActorType::Arrow, 8.0, 8.0));
        registry.drain_changes();

        let player = join_player(&mut registry, &lands, &mut interest, "c1", 0.0, 0.0).unwrap();

        let events = interest.drain_events();
        let spawned: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                WorldEvent::SpawnActor(s) if s.from_player_id == player => Some(s.actor_id),
                _ => None,
            })
            .collect();
        assert!(spawned.contains(&arrow));
        assert!(spawned.contains(&player), "player sees its own avatar");

        let used = events
            .iter()
            .filter(|e| matches!(e, WorldEvent::LandUsed(u) if u.player_id == player))
            .count();
        assert_eq!(used as i32, (2 * VIEW_RADIUS + 1).pow(2));
    }

    #[test]
    fn test_second_join_is_seen_by_the_first() {
        let (mut registry, lands, mut interest) = world();
        let p1 = join_player(&mut registry, &lands, &mut interest, "c1", 0.0, 0.0).unwrap();
        interest.drain_events();

        let p2 = join_player(&mut registry, &lands, &mut interest, "c2", 16.0, 0.0).unwrap();

        let events = interest.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            WorldEvent::SpawnActor(s) if s.actor_id == p2 && s.from_player_id == p1
        )));
        // And no duplicate spawn of p1 into p1's own view.
        let p1_self_spawns = events
            .iter()
            .filter(|e| matches!(
                e,
                WorldEvent::SpawnActor(s) if s.actor_id == p1 && s.from_player_id == p1
            ))
            .count();
        assert_eq!(p1_self_spawns, 0);
    }

    #[test]
    fn test_leave_despawns_from_remaining_views() {
        let (mut registry, lands, mut interest) = world();
        let p1 = join_player(&mut registry, &lands, &mut interest, "c1", 0.0, 0.0).unwrap();
        let p2 = join_player(&mut registry, &lands, &mut interest, "c2", 0.0, 0.0).unwrap();
        interest.drain_events();

        leave_player(&mut registry, &lands, &mut interest, p2).unwrap();

        let events = interest.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            WorldEvent::DespawnActor(d) if d.actor_id == p2 && d.from_player_id == p1
        )));
        assert!(registry.get(p2).is_none());

        // Leaving twice is silent.
        leave_player(&mut registry, &lands, &mut interest, p2).unwrap();
        assert!(interest.drain_events().is_empty());
    }
}
