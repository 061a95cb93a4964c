//! Chat bot commands
//!
//! Messages starting with the configured prefix are split shell-style and
//! parsed into a [`BotCommand`]. Each variant carries only the arguments it
//! needs; [`BotCommand::execute`] dispatches on the variant.

mod error;

use clap::{Parser, Subcommand};

pub use error::CommandError;

use crate::playback::{AudioPlayer, DestinationId, EnqueueOutcome, PlayerFactory};
use crate::service::{CueService, TrackLoader};

#[derive(Parser, Debug)]
#[command(name = "runecall", about = "Voice cue bot", disable_version_flag = true)]
struct ChatCli {
    #[command(subcommand)]
    command: BotCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// Play a sound in this server's voice channel
    Play {
        sound: String,
        #[arg(short, long)]
        volume: Option<u16>,
        #[arg(short, long)]
        rate: Option<u16>,
    },
    /// Stop the current sound (queued sounds stay)
    Stop,
    /// Drop all queued sounds
    Clear,
    /// Show what is playing and how many sounds wait
    Queue,
    /// Fire your cue on the next game update
    Test,
    /// Leave the voice channel
    Leave,
}

/// Who sent the command and where
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub destination: DestinationId,
    /// Telemetry token of the author, if the account storage knows one
    pub token: Option<String>,
}

/// Parse a chat message. Messages without `prefix` are not commands.
pub fn parse_command(message: &str, prefix: &str) -> Result<Option<BotCommand>, CommandError> {
    let Some(body) = message.trim().strip_prefix(prefix) else {
        return Ok(None);
    };
    if body.trim().is_empty() {
        return Ok(None);
    }

    let mut args = shlex::split(body).ok_or(CommandError::InvalidQuoting)?;
    args.insert(0, "runecall".to_string());
    let cli = ChatCli::try_parse_from(args).map_err(|e| CommandError::Parse(e.to_string()))?;
    Ok(Some(cli.command))
}

impl BotCommand {
    /// Run the command against the service and return the reply text
    pub fn execute<F, L>(
        &self,
        service: &CueService<F, L>,
        ctx: &CommandContext,
    ) -> Result<String, CommandError>
    where
        F: PlayerFactory,
        L: TrackLoader<Track = <F::Player as AudioPlayer>::Track>,
    {
        let destination = ctx.destination;
        tracing::debug!(%destination, command = ?self, "Executing chat command");

        match self {
            BotCommand::Play { sound, volume, rate } => {
                let defaults = service.playback_defaults();
                let volume = volume.unwrap_or(u16::from(defaults.default_volume));
                let rate = rate.unwrap_or(defaults.default_rate);
                match service.request_play(destination, sound, volume, rate)? {
                    EnqueueOutcome::Started => Ok(format!("Playing {sound}")),
                    EnqueueOutcome::Queued { position } => {
                        Ok(format!("Queued {sound} (position {position})"))
                    }
                }
            }
            BotCommand::Stop => {
                if service.stop(destination) {
                    Ok("Stopped".to_string())
                } else {
                    Ok("Nothing is playing".to_string())
                }
            }
            BotCommand::Clear => {
                let removed = service.clear(destination);
                Ok(format!("Removed {removed} queued sound(s)"))
            }
            BotCommand::Queue => match service.status(destination) {
                Some(status) if status.playing => {
                    Ok(format!("Playing, {} queued", status.pending))
                }
                Some(status) => Ok(format!("Idle, {} queued", status.pending)),
                None => Ok("Idle".to_string()),
            },
            BotCommand::Test => {
                let token = ctx.token.as_deref().ok_or(CommandError::NoLinkedToken)?;
                if service.enable_test_mode(token) {
                    Ok("Test cue armed, it plays on your next game update".to_string())
                } else {
                    Ok("Test cue already armed".to_string())
                }
            }
            BotCommand::Leave => {
                if service.disconnect(destination) {
                    Ok("Left the voice channel".to_string())
                } else {
                    Ok("Not connected".to_string())
                }
            }
        }
    }
}
