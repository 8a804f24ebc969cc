//! Headless world server binary.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI
//! flags. Run with `cargo run -p orbis-server -- --tick-rate 30` to
//! override settings.

mod world;

use std::time::{Duration, Instant};

use clap::Parser;
use orbis_config::{CliArgs, Config, default_config_dir};
use tracing::info;

use crate::world::WorldServer;

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    orbis_log::init_logging(Some(&log_dir), Some(&config));

    info!(
        bind = %config.network.bind_address,
        port = config.network.bind_port,
        max_players = config.network.max_players,
        "starting world server"
    );

    let mut server = WorldServer::new(&config.world);
    server.set_log_events(config.debug.log_events);

    // Fixed-rate loop: a transport layer would submit intents through
    // `server.intent_sender()` and drain per-client bus subscriptions.
    let frame = Duration::from_millis(5);
    let mut last = Instant::now();
    loop {
        let now = Instant::now();
        server.advance(now.duration_since(last).as_secs_f64());
        last = now;
        std::thread::sleep(frame);
    }
}
