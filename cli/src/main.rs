use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use runecall_cli::players::OutputKind;
use runecall_cli::{CliContext, commands, logging, readline};
use runecall_core::{AppConfig, AppConfigExt, TelemetrySnapshot, TrackEndReason};

/// Startup options
#[derive(Parser)]
#[command(version, about = "runecall - rune spawn voice cues")]
struct Args {
    /// Play through the default audio device instead of printing
    #[arg(long)]
    speaker: bool,
    /// Don't write link changes back to the config file
    #[arg(long)]
    no_save: bool,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();
    let args = Args::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Falling back to default configuration");
            AppConfig::load_with_defaults()
        }
    };
    let ctx = CliContext::new(config, output_kind(args.speaker), !args.no_save)
        .map_err(|e| e.to_string())?;

    while let Some(line) = readline()? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                write!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    ctx.tasks.lock().await.abort_all().await;
    Ok(())
}

#[cfg(feature = "speaker")]
fn output_kind(speaker: bool) -> OutputKind {
    if speaker {
        OutputKind::Speaker
    } else {
        OutputKind::Console
    }
}

#[cfg(not(feature = "speaker"))]
fn output_kind(speaker: bool) -> OutputKind {
    if speaker {
        tracing::warn!("Built without the speaker feature, printing cues instead");
    }
    OutputKind::Console
}

#[derive(Parser)]
#[command(version, about = "runecall console")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed one telemetry update
    Snapshot {
        #[arg(short, long)]
        token: String,
        #[arg(short, long = "match")]
        match_id: String,
        #[arg(short, long, allow_negative_numbers = true)]
        clock: i64,
        #[arg(long)]
        paused: bool,
    },
    /// Feed a raw game-state JSON payload
    Payload { json: String },
    /// Fire the token's cue on its next update
    TestMode {
        #[arg(short, long)]
        token: String,
    },
    Link {
        #[arg(short, long)]
        token: String,
        #[arg(short, long)]
        guild: u64,
    },
    Unlink {
        #[arg(short, long)]
        token: String,
    },
    Play {
        #[arg(short, long)]
        guild: u64,
        #[arg(short, long)]
        sound: String,
        #[arg(short, long)]
        volume: Option<u16>,
        #[arg(short, long)]
        rate: Option<u16>,
    },
    /// End the current track as the player would
    Finish {
        #[arg(short, long)]
        guild: u64,
        #[arg(short, long, default_value = "finished")]
        reason: TrackEndReason,
    },
    Stop {
        #[arg(short, long)]
        guild: u64,
    },
    /// Send a chat message to the bot
    Chat {
        #[arg(short, long)]
        guild: u64,
        /// Telemetry token of the message author
        #[arg(short, long)]
        token: Option<String>,
        message: String,
    },
    Status,
    /// Replay a JSON-lines telemetry capture
    Replay {
        #[arg(short, long)]
        path: PathBuf,
        /// 1.0 = realtime, 0 = as fast as possible
        #[arg(long, default_value_t = 0.0)]
        speed: f32,
    },
    Sounds,
    Config,
    Exit,
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "runecall".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match cli.command {
        Some(Commands::Snapshot {
            token,
            match_id,
            clock,
            paused,
        }) => {
            let snapshot = TelemetrySnapshot::new(token, match_id, clock).paused(paused);
            commands::ingest(ctx, snapshot);
        }
        Some(Commands::Payload { json }) => commands::ingest_payload(ctx, &json),
        Some(Commands::TestMode { token }) => commands::test_mode(ctx, &token),
        Some(Commands::Link { token, guild }) => commands::link(ctx, &token, guild).await,
        Some(Commands::Unlink { token }) => commands::unlink(ctx, &token).await,
        Some(Commands::Play {
            guild,
            sound,
            volume,
            rate,
        }) => commands::play(ctx, guild, &sound, volume, rate),
        Some(Commands::Finish { guild, reason }) => commands::finish(ctx, guild, reason),
        Some(Commands::Stop { guild }) => commands::stop(ctx, guild),
        Some(Commands::Chat {
            guild,
            token,
            message,
        }) => {
            let prefix = ctx.config.read().await.command_prefix.clone();
            commands::chat(ctx, guild, token, &message, &prefix);
        }
        Some(Commands::Status) => commands::status(ctx),
        Some(Commands::Replay { path, speed }) => commands::replay(ctx, path, speed).await,
        Some(Commands::Sounds) => commands::list_sounds(ctx),
        Some(Commands::Config) => commands::show_config(ctx).await,
        Some(Commands::Exit) => {
            commands::exit();
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
