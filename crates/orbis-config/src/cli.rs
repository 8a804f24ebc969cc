//! Command-line argument parsing for the world server.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// World server command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "orbis", about = "Orbis world server")]
pub struct CliArgs {
    /// Bind address.
    #[arg(long)]
    pub bind: Option<String>,

    /// Bind port.
    #[arg(long)]
    pub port: Option<u16>,

    /// Maximum connected players.
    #[arg(long)]
    pub max_players: Option<u32>,

    /// Simulation tick rate in Hz.
    #[arg(long)]
    pub tick_rate: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref bind) = args.bind {
            self.network.bind_address = bind.clone();
        }
        if let Some(port) = args.port {
            self.network.bind_port = port;
        }
        if let Some(max) = args.max_players {
            self.network.max_players = max;
        }
        if let Some(rate) = args.tick_rate {
            self.world.tick_rate = rate;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
