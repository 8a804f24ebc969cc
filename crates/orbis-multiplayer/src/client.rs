//! The client-side world replica: local proxies for spawned actors, a
//! local land view, and prediction for the one controlled actor.

use orbis_actor::{Actor, ActorRegistry};
use orbis_entity::{EntityCollection, EntityId};
use orbis_events::{MoveAck, WorldEvent};
use orbis_land::{LandHash, LandIndex, LandPos, land_pos_of};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::prediction::PredictionManager;
use crate::reconciliation::reconcile;

// ---------------------------------------------------------------------------
// ClientWorld
// ---------------------------------------------------------------------------

/// One connected client's view of the world, reconstructed purely from the
/// event stream addressed to it.
///
/// Proxies carry locally-assigned ids; `server_to_local` maps the
/// authoritative ids events speak in. The controlled actor's position is
/// owned by prediction — authoritative `NewPos` events drive every proxy
/// except it, and `MoveAck` reconciliation drives it.
pub struct ClientWorld {
    player_id: EntityId,
    proxies: EntityCollection<Actor>,
    server_to_local: FxHashMap<EntityId, EntityId>,
    prediction: Option<PredictionManager>,
    lands: LandIndex,
    used_lands: FxHashSet<LandHash>,
}

impl ClientWorld {
    /// Creates an empty replica for the player with the given
    /// server-assigned id. The replica stays inert until the player's own
    /// spawn event arrives.
    pub fn new(player_id: EntityId) -> Self {
        Self {
            player_id,
            proxies: EntityCollection::new(),
            server_to_local: FxHashMap::default(),
            prediction: None,
            lands: LandIndex::new(),
            used_lands: FxHashSet::default(),
        }
    }

    /// The server-assigned id of the controlled player.
    pub fn player_id(&self) -> EntityId {
        self.player_id
    }

    /// Looks up the local proxy for a server-side actor id.
    pub fn proxy(&self, server_id: EntityId) -> Option<&Actor> {
        let local = *self.server_to_local.get(&server_id)?;
        self.proxies.get(local)
    }

    /// Number of live proxies.
    pub fn proxy_count(&self) -> usize {
        self.proxies.len()
    }

    /// The predicted kinematic state of the controlled actor, once its
    /// spawn has arrived.
    pub fn predicted_state(&self) -> Option<crate::prediction::PredictedState> {
        self.prediction.as_ref().map(|p| p.state)
    }

    /// Land cells this client currently subscribes to.
    pub fn used_lands(&self) -> &FxHashSet<LandHash> {
        &self.used_lands
    }

    /// The client's local land view.
    pub fn lands(&self) -> &LandIndex {
        &self.lands
    }

    /// Applies one server event to the replica. Events addressed to other
    /// players, and client-to-server intents echoed back, are ignored.
    pub fn apply_event(&mut self, event: &WorldEvent) {
        match event {
            WorldEvent::SpawnActor(spawn) => {
                if spawn.from_player_id != self.player_id
                    || self.server_to_local.contains_key(&spawn.actor_id)
                {
                    return;
                }
                let proxy = Actor::from_snapshot(spawn.actor_type, spawn.ctor_option.clone());
                if spawn.actor_id == self.player_id {
                    self.prediction = Some(PredictionManager::new(
                        self.player_id,
                        proxy.pos_x,
                        proxy.pos_y,
                    ));
                }
                let local = self.proxies.insert(proxy);
                self.server_to_local.insert(spawn.actor_id, local);
                trace!(
                    server_id = spawn.actor_id.value(),
                    local_id = local.value(),
                    "proxy spawned"
                );
            }
            WorldEvent::DespawnActor(despawn) => {
                if despawn.from_player_id != self.player_id {
                    return;
                }
                if let Some(local) = self.server_to_local.remove(&despawn.actor_id) {
                    self.proxies.remove(local);
                }
                if despawn.actor_id == self.player_id {
                    self.prediction = None;
                }
            }
            WorldEvent::NewPos(new_pos) => {
                // Prediction owns the controlled actor's position.
                if new_pos.actor_id == self.player_id {
                    return;
                }
                if let Some(&local) = self.server_to_local.get(&new_pos.actor_id)
                    && let Some(proxy) = self.proxies.get_mut(local)
                {
                    proxy.pos_x = new_pos.x;
                    proxy.pos_y = new_pos.y;
                    proxy.at_land = land_pos_of(new_pos.x, new_pos.y);
                }
            }
            WorldEvent::MoveAck(ack) => {
                self.apply_move_ack(ack);
            }
            WorldEvent::LandUsed(used) => {
                if used.player_id != self.player_id {
                    return;
                }
                let pos = LandPos::new(used.land_pos_x, used.land_pos_y);
                self.used_lands.insert(pos.hash());
                self.lands.create_land(pos);
            }
            WorldEvent::LandNeverUsed(unused) => {
                if unused.player_id == self.player_id {
                    let pos = LandPos::new(unused.land_pos_x, unused.land_pos_y);
                    self.used_lands.remove(&pos.hash());
                }
            }
            WorldEvent::UpdateBrick(update) => {
                let pos = LandPos::new(update.pos_x, update.pos_y);
                self.lands.create_land(pos);
                if let Some(land) = self.lands.get_land_mut(pos) {
                    land.layers = update.layers.clone();
                }
            }
            // Registry-internal notifications and our own echoed intents.
            WorldEvent::AddEntity(_)
            | WorldEvent::RemoveEntity(_)
            | WorldEvent::ControlMove(_)
            | WorldEvent::ControlWalk(_) => {}
        }
    }

    fn apply_move_ack(&mut self, ack: &MoveAck) {
        let Some(prediction) = self.prediction.as_mut() else {
            return;
        };
        if ack.actor_id != self.player_id {
            return;
        }
        reconcile(prediction, ack);
        self.sync_controlled_proxy();
    }

    /// Runs one prediction tick for the controlled actor and returns the
    /// intents to send to the server. Empty until the player's own spawn
    /// has arrived.
    pub fn tick(&mut self, intent: Option<(f64, f64)>) -> Vec<WorldEvent> {
        let Some(prediction) = self.prediction.as_mut() else {
            return Vec::new();
        };
        let result = prediction.tick(intent);

        let mut out = Vec::new();
        if let Some(control_move) = result.control_move {
            out.push(WorldEvent::ControlMove(control_move));
        }
        if let Some(control_walk) = result.control_walk {
            out.push(WorldEvent::ControlWalk(control_walk));
        }

        self.sync_controlled_proxy();
        if let Some(walk) = result.control_walk
            && let Some(&local) = self.server_to_local.get(&self.player_id)
            && let Some(proxy) = self.proxies.get_mut(local)
        {
            proxy.direction = walk.direction;
            proxy.running = walk.running;
        }
        out
    }

    fn sync_controlled_proxy(&mut self) {
        let Some(prediction) = self.prediction.as_ref() else {
            return;
        };
        let state = prediction.state;
        if let Some(&local) = self.server_to_local.get(&self.player_id)
            && let Some(proxy) = self.proxies.get_mut(local)
        {
            proxy.pos_x = state.x;
            proxy.pos_y = state.y;
            proxy.motion_x = state.motion_x;
            proxy.motion_y = state.motion_y;
            proxy.at_land = land_pos_of(state.x, state.y);
        }
    }
}

/// Replays a drained interest/registry event stream into a replica, the
/// way a transport delivery loop would.
pub fn deliver_events(client: &mut ClientWorld, events: &[WorldEvent]) {
    for event in events {
        client.apply_event(event);
    }
}

/// Convenience for tests and tools: applies one client intent to the
/// authoritative registry the way the server's intent handler does.
pub fn apply_intent(registry: &mut ActorRegistry, event: &WorldEvent) {
    match event {
        WorldEvent::ControlMove(control) => {
            let Some(actor) = registry.get(control.actor_id) else {
                return;
            };
            let x = actor.pos_x + control.input.move_x;
            let y = actor.pos_y + control.input.move_y;
            registry.set_position(control.actor_id, x, y);
            registry.set_motion(control.actor_id, control.input.move_x, control.input.move_y);
        }
        WorldEvent::ControlWalk(control) => {
            if let Some(actor) = registry.get_mut(control.actor_id) {
                actor.direction = control.direction;
                actor.running = control.running;
            }
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
