//! Refractor console entry point

mod cli;

use crate::cli::{Cli, Commands, PermsCommands, SearchCommands};
use anyhow::{Context, Result};
use clap::Parser;
use refractor::config::{ConfigError, EnvConfig, ENV_API_ROOT, ENV_KRATOS_ROOT, ENV_WS_ROOT};
use refractor::models::PlayerSearchBody;
use refractor::notify::NotificationEvent;
use refractor::permissions::{PermissionMask, PermissionRegistry};
use refractor::socket::LiveEvent;
use refractor::AppContext;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Permission commands work offline
    if let Commands::Perms { command } = &cli.command {
        return perms(command);
    }

    let ctx = AppContext::new(env_config(&cli)?).context("Failed to build client")?;

    let result = match cli.command {
        Commands::Servers => servers(&ctx).await,
        Commands::Player { platform, id } => player(&ctx, &platform, &id).await,
        Commands::Infractions { platform, id } => infractions(&ctx, &platform, &id).await,
        Commands::Search { command } => search(&ctx, command).await,
        Commands::Stats => stats(&ctx).await,
        Commands::Watch => watch(&ctx).await,
        Commands::Perms { .. } => Ok(()),
    };

    ctx.shutdown().await;
    result
}

fn env_config(cli: &Cli) -> Result<EnvConfig> {
    fn required(value: &Option<String>, name: &'static str) -> Result<String> {
        value.clone().ok_or(ConfigError::Missing(name)).map_err(Into::into)
    }

    let config = EnvConfig::new(
        required(&cli.api_root, ENV_API_ROOT)?,
        required(&cli.kratos_root, ENV_KRATOS_ROOT)?,
        required(&cli.ws_root, ENV_WS_ROOT)?,
    )
    .context("Invalid endpoint configuration")?;

    Ok(match &cli.session_cookie {
        Some(cookie) if !cookie.trim().is_empty() => config.session_cookie(cookie.clone()),
        _ => config,
    })
}

/// The store already toasted the failure; surface it as the command error
fn failed(ctx: &AppContext, what: &str) -> anyhow::Error {
    match ctx.notifier().history().pop() {
        Some(toast) => anyhow::anyhow!("{}: {}", what, toast.message),
        None => anyhow::anyhow!("{}", what),
    }
}

async fn servers(ctx: &AppContext) -> Result<()> {
    if !ctx.servers().get_all_servers().await {
        return Err(failed(ctx, "Failed to list servers"));
    }

    for server in ctx.servers().primary_servers() {
        println!(
            "{:>5}  {:<12} {:<32} {:<24} {}",
            server.id,
            server.game,
            server.name,
            server.address,
            server.status.as_deref().unwrap_or("unknown"),
        );
    }

    Ok(())
}

async fn player(ctx: &AppContext, platform: &str, id: &str) -> Result<()> {
    let player = ctx
        .players()
        .get_player(platform, id)
        .await
        .ok_or_else(|| failed(ctx, "Failed to get player"))?;

    println!("Player: {} ({})", player.name.as_deref().unwrap_or("?"), player.id);
    println!("Platform: {}", player.platform);
    println!("Watched: {}", player.watched);
    if let Some(last_seen) = player.last_seen {
        println!("Last seen: {}", last_seen.to_rfc3339());
    }
    if !player.previous_names.is_empty() {
        println!("Previous names: {}", player.previous_names.join(", "));
    }

    Ok(())
}

async fn infractions(ctx: &AppContext, platform: &str, id: &str) -> Result<()> {
    let infractions = ctx
        .infractions()
        .get_player_infractions(platform, id)
        .await
        .ok_or_else(|| failed(ctx, "Failed to get infractions"))?;

    if infractions.is_empty() {
        println!("No infractions");
        return Ok(());
    }

    for infraction in infractions {
        println!(
            "{:>6}  {:<8} {}{}",
            infraction.id,
            infraction.kind,
            infraction.reason.as_deref().unwrap_or("(no reason)"),
            if infraction.repealed { "  [repealed]" } else { "" },
        );
    }

    Ok(())
}

async fn search(ctx: &AppContext, command: SearchCommands) -> Result<()> {
    match command {
        SearchCommands::Players {
            term,
            by,
            platform,
            limit,
            offset,
        } => {
            let body = PlayerSearchBody {
                term,
                kind: by,
                platform,
                limit,
                offset,
            };
            let results = ctx
                .search()
                .search_players(&body)
                .await
                .ok_or_else(|| failed(ctx, "Search failed"))?;

            println!("{} result(s)", results.total);
            for result in results.results {
                println!("  {:<10} {:<24} {}", result.platform, result.id, result.name);
            }
        }
    }

    Ok(())
}

async fn stats(ctx: &AppContext) -> Result<()> {
    let stats = ctx
        .stats()
        .get_stats()
        .await
        .ok_or_else(|| failed(ctx, "Failed to get stats"))?;

    println!("Refractor Stats");
    println!("===============");
    println!(
        "Players:       {} (+{} today, {} unique)",
        stats.total_players, stats.new_players_last_day, stats.unique_players_last_day
    );
    println!(
        "Infractions:   {} (+{} today)",
        stats.total_infractions, stats.new_infractions_last_day
    );
    println!(
        "Chat messages: {} (+{} today)",
        stats.total_chat_messages, stats.new_chat_messages_last_day
    );

    Ok(())
}

fn perms(command: &PermsCommands) -> Result<()> {
    let registry = PermissionRegistry::builtin();

    match command {
        PermsCommands::Decode { mask } => {
            let mask: PermissionMask = mask.parse().context("Invalid permission mask")?;
            let names = registry.set_flags(mask);

            if names.is_empty() {
                println!("(no flags)");
            }
            for name in names {
                println!("{}", name);
            }

            let known: PermissionMask = registry.flags().iter().map(|f| f.bit).collect();
            let unknown = PermissionMask::new(mask.bits() & !known.bits());
            if !unknown.is_empty() {
                warn!(bits = %unknown, "mask carries unregistered bits");
            }
        }
        PermsCommands::Encode { flags } => {
            let mask = registry
                .encode(flags.iter().map(String::as_str))
                .context("Cannot encode mask")?;
            println!("{}", mask);
        }
        PermsCommands::List => {
            for flag in registry.flags() {
                println!("{:>3}  {:<32} {}", flag.position, flag.name, flag.bit);
            }
        }
    }

    Ok(())
}

async fn watch(ctx: &AppContext) -> Result<()> {
    // Seed server names so status updates have something to land on
    ctx.servers().get_all_servers().await;

    let mut events = ctx.socket().events();
    let mut toasts = ctx.notifier().subscribe();
    ctx.socket().connect();
    info!(url = %ctx.socket().url(), "watching live events, Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,

            event = events.recv() => match event {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(n)) => warn!(skipped = n, "event stream lagged"),
                Err(RecvError::Closed) => break,
            },

            toast = toasts.recv() => match toast {
                Ok(NotificationEvent::Shown(toast)) => {
                    println!("[{:?}] {}", toast.level, toast.message);
                }
                Ok(NotificationEvent::Dismissed(_)) => {}
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
        }
    }

    Ok(())
}

fn print_event(event: &LiveEvent) {
    match event {
        LiveEvent::PlayerJoin { server_id, player } => {
            println!("[{}] + {} ({})", server_id, player.name, player.id);
        }
        LiveEvent::PlayerQuit { server_id, player_id } => {
            println!("[{}] - {}", server_id, player_id);
        }
        LiveEvent::ServerStatus { server_id, status } => {
            println!("[{}] status: {}", server_id, status);
        }
        LiveEvent::Chat { server_id, message } => {
            println!("[{}] <{}> {}", server_id, message.name, message.message);
        }
        LiveEvent::PlayerListRefresh { server_id, players } => {
            println!("[{}] {} player(s) online", server_id, players.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_env_config_from_args() {
        let cli = parse(&[
            "refractor",
            "--api-root",
            "https://refractor.test/api/v1/",
            "--kratos-root",
            "https://refractor.test/kp",
            "--ws-root",
            "wss://refractor.test/ws",
            "--session-cookie",
            "ory_kratos_session=abc",
            "stats",
        ]);

        let config = env_config(&cli).unwrap();
        assert_eq!(config.api_root, "https://refractor.test/api/v1");
        assert_eq!(config.ws_root, "wss://refractor.test/ws");
        assert_eq!(config.session_cookie.as_deref(), Some("ory_kratos_session=abc"));
    }

    #[test]
    fn test_env_config_ignores_blank_cookie() {
        let cli = parse(&[
            "refractor",
            "--api-root",
            "http://a",
            "--kratos-root",
            "http://b",
            "--ws-root",
            "ws://c",
            "--session-cookie",
            "  ",
            "stats",
        ]);

        assert!(env_config(&cli).unwrap().session_cookie.is_none());
    }
}
