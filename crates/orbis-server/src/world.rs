//! The authoritative world: registry, land index, interest management, and
//! the event bus, driven by a fixed-rate tick.

use crossbeam_channel::{Receiver, Sender, unbounded};
use orbis_actor::ActorRegistry;
use orbis_config::WorldConfig;
use orbis_entity::EntityId;
use orbis_events::{EventBus, MoveAck, WorldEvent};
use orbis_land::{BrickType, LandIndex, LandPos, radius_land_positions};
use orbis_multiplayer::{
    InterestError, InterestManager, TickSchedule, apply_intent, join_player, leave_player,
};
use tracing::{debug, info, warn};

/// The server-side simulation core. One instance owns all authoritative
/// state; transports interact with it only through intents and the bus.
pub struct WorldServer {
    registry: ActorRegistry,
    lands: LandIndex,
    interest: InterestManager,
    bus: EventBus,
    schedule: TickSchedule,
    intent_tx: Sender<WorldEvent>,
    intent_rx: Receiver<WorldEvent>,
    spawn_x: f64,
    spawn_y: f64,
    log_events: bool,
}

impl WorldServer {
    /// Builds a world from config, materializing the configured land block
    /// around the spawn point.
    pub fn new(world: &WorldConfig) -> Self {
        let (intent_tx, intent_rx) = unbounded();
        let mut lands = LandIndex::new();
        let spawn_cell = orbis_land::land_pos_of(world.spawn_x, world.spawn_y);
        for pos in radius_land_positions(spawn_cell, world.pregenerate_radius) {
            lands.create_land(pos);
        }
        info!(
            cells = lands.len(),
            tick_rate = world.tick_rate,
            "world initialized"
        );

        Self {
            registry: ActorRegistry::new(),
            lands,
            interest: InterestManager::new(),
            bus: EventBus::new(),
            schedule: TickSchedule::with_tick_rate(world.tick_rate),
            intent_tx,
            intent_rx,
            spawn_x: world.spawn_x,
            spawn_y: world.spawn_y,
            log_events: false,
        }
    }

    /// Enables debug logging of every published event.
    pub fn set_log_events(&mut self, enabled: bool) {
        self.log_events = enabled;
    }

    /// Sender half a transport uses to submit client intents. Intents are
    /// applied on the next tick, in arrival order.
    pub fn intent_sender(&self) -> Sender<WorldEvent> {
        self.intent_tx.clone()
    }

    /// Registers a bus subscriber; a transport drains it per client.
    pub fn subscribe(&mut self) -> Receiver<WorldEvent> {
        self.bus.subscribe()
    }

    /// Admits a connection as a player at the spawn point and flushes the
    /// resulting events.
    pub fn connect(&mut self, conn_id: &str) -> Result<EntityId, InterestError> {
        let player_id = join_player(
            &mut self.registry,
            &self.lands,
            &mut self.interest,
            conn_id,
            self.spawn_x,
            self.spawn_y,
        )?;
        self.flush_events();
        Ok(player_id)
    }

    /// Removes a disconnected player and flushes the resulting events.
    pub fn disconnect(&mut self, player_id: EntityId) -> Result<(), InterestError> {
        leave_player(&mut self.registry, &self.lands, &mut self.interest, player_id)?;
        self.flush_events();
        Ok(())
    }

    /// Direct registry access for world content systems.
    pub fn registry_mut(&mut self) -> &mut ActorRegistry {
        &mut self.registry
    }

    /// Read-only registry access.
    pub fn registry(&self) -> &ActorRegistry {
        &self.registry
    }

    /// Read-only land access.
    pub fn lands(&self) -> &LandIndex {
        &self.lands
    }

    /// Places a brick layer on a cell and broadcasts the update. No event
    /// for no-ops (missing cell, layer cap).
    pub fn place_brick(&mut self, pos: LandPos, brick: BrickType) {
        if let Some(update) = self.lands.place_layer(pos, brick) {
            self.bus.publish(WorldEvent::UpdateBrick(update));
        }
    }

    /// Removes the top brick layer of a cell and broadcasts the update.
    pub fn remove_brick(&mut self, pos: LandPos) {
        if let Some(update) = self.lands.remove_layer(pos) {
            self.bus.publish(WorldEvent::UpdateBrick(update));
        }
    }

    /// Accumulates elapsed time and runs the due simulation ticks.
    pub fn advance(&mut self, dt_secs: f64) {
        for _ in 0..self.schedule.accumulate(dt_secs) {
            self.tick();
        }
    }

    /// Runs exactly one simulation tick: apply queued intents, run
    /// interest management over the resulting changes, publish.
    pub fn tick(&mut self) {
        let intents: Vec<WorldEvent> = self.intent_rx.try_iter().collect();
        for intent in &intents {
            match intent {
                WorldEvent::ControlMove(control) => {
                    apply_intent(&mut self.registry, intent);
                    if let Some(actor) = self.registry.get(control.actor_id) {
                        self.bus.publish(WorldEvent::MoveAck(MoveAck {
                            actor_id: control.actor_id,
                            last_sequence: control.input.sequence,
                            x: actor.pos_x,
                            y: actor.pos_y,
                            motion_x: actor.motion_x,
                            motion_y: actor.motion_y,
                        }));
                    } else {
                        debug!(
                            actor_id = control.actor_id.value(),
                            "move intent for unknown actor dropped"
                        );
                    }
                }
                WorldEvent::ControlWalk(_) => {
                    apply_intent(&mut self.registry, intent);
                }
                other => {
                    warn!(?other, "unexpected intent kind dropped");
                }
            }
        }
        self.registry.tick_uses();
        self.flush_events();
    }

    fn flush_events(&mut self) {
        let changes = self.registry.drain_changes();
        for change in changes {
            if let Err(err) =
                self.interest
                    .handle_actor_change(&change, &mut self.registry, &self.lands)
            {
                warn!(%err, "interest update failed");
            }
        }
        for event in self.interest.drain_events() {
            if self.log_events {
                debug!(?event, "publishing");
            }
            self.bus.publish(event);
        }
    }

    /// Total ticks simulated.
    pub fn total_ticks(&self) -> u64 {
        self.schedule.total_ticks()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
