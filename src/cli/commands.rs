//! CLI command definitions

use clap::{Parser, Subcommand};
use refractor::config::{ENV_API_ROOT, ENV_KRATOS_ROOT, ENV_SESSION_COOKIE, ENV_WS_ROOT};

#[derive(Parser)]
#[command(name = "refractor")]
#[command(about = "Console for a Refractor moderation backend", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend API root
    #[arg(long, env = ENV_API_ROOT, global = true)]
    pub api_root: Option<String>,

    /// Identity provider root
    #[arg(long, env = ENV_KRATOS_ROOT, global = true)]
    pub kratos_root: Option<String>,

    /// WebSocket endpoint for live updates
    #[arg(long, env = ENV_WS_ROOT, global = true)]
    pub ws_root: Option<String>,

    /// Session cookie sent with every request, e.g. `ory_kratos_session=...`
    #[arg(long, env = ENV_SESSION_COOKIE, global = true, hide_env_values = true)]
    pub session_cookie: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List servers and their status
    Servers,

    /// Show a player record
    Player {
        /// Platform name, e.g. playfab or mojang
        platform: String,

        /// Platform-specific player id
        id: String,
    },

    /// List a player's infractions
    Infractions {
        platform: String,
        id: String,
    },

    /// Search records
    Search {
        #[command(subcommand)]
        command: SearchCommands,
    },

    /// Show installation statistics
    Stats,

    /// Encode and decode permission masks
    ///
    /// Uses the built-in flag list; no backend needed.
    Perms {
        #[command(subcommand)]
        command: PermsCommands,
    },

    /// Stream live events until interrupted
    Watch,
}

#[derive(Subcommand)]
pub enum SearchCommands {
    /// Search players by name or id
    ///
    /// Examples:
    ///   refractor search players steve
    ///   refractor search players 2535416 --by id --platform playfab
    Players {
        term: String,

        /// Match on "name" or "id"
        #[arg(long, default_value = "name", value_parser = parse_search_kind)]
        by: String,

        #[arg(long)]
        platform: Option<String>,

        #[arg(long, default_value_t = 10)]
        limit: u32,

        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
}

#[derive(Subcommand)]
pub enum PermsCommands {
    /// List the flags set in a mask
    Decode {
        /// Decimal mask as stored by the backend
        mask: String,
    },

    /// Combine flag names into a mask
    ///
    /// Examples:
    ///   refractor perms encode FLAG_VIEW_SERVERS FLAG_CREATE_WARNING
    Encode {
        #[arg(required = true)]
        flags: Vec<String>,
    },

    /// List every known flag with its bit
    List,
}

fn parse_search_kind(s: &str) -> Result<String, String> {
    match s.to_lowercase().as_str() {
        "name" | "id" => Ok(s.to_lowercase()),
        _ => Err(format!("Invalid search type: {}. Must be name or id", s)),
    }
}
