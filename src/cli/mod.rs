mod commands;

pub use commands::{Cli, Commands, PermsCommands, SearchCommands};
