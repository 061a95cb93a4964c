use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use runecall_core::{
    AppConfigExt, CommandContext, DestinationId, EnqueueOutcome, TelemetrySnapshot,
    TrackEndReason, parse_command,
};

use crate::context::CliContext;
use crate::replay;

pub fn ingest(ctx: &CliContext, snapshot: TelemetrySnapshot) {
    match ctx.service.ingest_snapshot(&snapshot) {
        Ok(Some(outcome)) => println!("{}: cue {}", snapshot.token, describe(outcome)),
        Ok(None) => match ctx.service.scheduler().next_fire_time(&snapshot.token) {
            Some(next) => println!("{}: no cue, next at {}", snapshot.token, format_clock(next)),
            None => println!("{}: no cue", snapshot.token),
        },
        Err(e) => println!("{}: cue failed: {e}", snapshot.token),
    }
}

pub fn ingest_payload(ctx: &CliContext, raw: &str) {
    match TelemetrySnapshot::from_json(raw) {
        Ok(Some(snapshot)) => ingest(ctx, snapshot),
        Ok(None) => println!("Payload ignored (incomplete or paused)"),
        Err(e) => println!("Invalid payload: {e}"),
    }
}

pub fn test_mode(ctx: &CliContext, token: &str) {
    if ctx.service.enable_test_mode(token) {
        println!("Test cue armed for {token}");
    } else {
        println!("Test cue already armed for {token}");
    }
}

pub async fn link(ctx: &CliContext, token: &str, guild: u64) {
    let destination = DestinationId(guild);
    let mut config = ctx.config.write().await;
    let previous = config.link_token(token.to_string(), destination);
    ctx.links.link(token.to_string(), destination);

    match previous {
        Some(old) if old != destination => println!("Relinked {token}: {old} -> {destination}"),
        _ => println!("Linked {token} -> {destination}"),
    }
    save(ctx, &config);
}

pub async fn unlink(ctx: &CliContext, token: &str) {
    let mut config = ctx.config.write().await;
    match config.unlink_token(token) {
        Ok(destination) => {
            ctx.links.unlink(token);
            println!("Unlinked {token} from {destination}");
            save(ctx, &config);
        }
        Err(e) => println!("{e}"),
    }
}

fn save(ctx: &CliContext, config: &runecall_core::AppConfig) {
    if !ctx.persist {
        return;
    }
    if let Err(e) = config.save() {
        tracing::warn!(error = %e, "Failed to save config");
        println!("Warning: {e}");
    }
}

pub fn play(ctx: &CliContext, guild: u64, sound: &str, volume: Option<u16>, rate: Option<u16>) {
    let defaults = ctx.service.playback_defaults();
    let volume = volume.unwrap_or(u16::from(defaults.default_volume));
    let rate = rate.unwrap_or(defaults.default_rate);
    match ctx
        .service
        .request_play(DestinationId(guild), sound, volume, rate)
    {
        Ok(outcome) => println!("{sound}: {}", describe(outcome)),
        Err(e) => println!("{e}"),
    }
}

/// Simulate the player reporting the end of the current track
pub fn finish(ctx: &CliContext, guild: u64, reason: TrackEndReason) {
    let destination = DestinationId(guild);
    let Some(queue) = ctx.service.registry().find(destination) else {
        println!("No player for {destination}");
        return;
    };
    if !queue.player().finish_current(reason) {
        println!("Nothing is playing in {destination}");
    }
}

pub fn stop(ctx: &CliContext, guild: u64) {
    let destination = DestinationId(guild);
    if !ctx.service.stop(destination) {
        println!("Nothing is playing in {destination}");
    }
}

pub fn chat(ctx: &CliContext, guild: u64, token: Option<String>, message: &str, prefix: &str) {
    let command = match parse_command(message, prefix) {
        Ok(Some(command)) => command,
        Ok(None) => {
            println!("(not a command)");
            return;
        }
        Err(e) => {
            println!("{e}");
            return;
        }
    };

    let command_ctx = CommandContext {
        destination: DestinationId(guild),
        token,
    };
    match command.execute(ctx.service.as_ref(), &command_ctx) {
        Ok(reply) => println!("bot: {reply}"),
        Err(e) => println!("bot: {e}"),
    }
}

pub fn status(ctx: &CliContext) {
    let scheduler = ctx.service.scheduler();
    let predictor = scheduler.predictor();
    println!(
        "Cue every {}s, {}s early",
        predictor.period(),
        predictor.warning()
    );

    let tokens = scheduler.tokens();
    if tokens.is_empty() {
        println!("No tracked tokens");
    }
    for token in tokens {
        let next = scheduler
            .next_fire_time(&token)
            .map(format_clock)
            .unwrap_or_else(|| "-".to_string());
        let armed = if scheduler.is_test_mode_armed(&token) {
            " (test armed)"
        } else {
            ""
        };
        println!("  {token:<24} next cue at {next}{armed}");
    }

    let registry = ctx.service.registry();
    if registry.is_empty() {
        println!("No active players");
    }
    for destination in registry.destinations() {
        if let Some(status) = ctx.service.status(destination) {
            let state = if status.playing { "playing" } else { "idle" };
            println!("  {destination:<24} {state}, {} queued", status.pending);
        }
    }
}

pub fn list_sounds(ctx: &CliContext) {
    let sounds = ctx.sounds.list();
    if sounds.is_empty() {
        println!("No sounds found");
        return;
    }
    for sound in sounds {
        println!("  {sound}");
    }
}

pub async fn replay(ctx: &CliContext, path: PathBuf, speed: f32) {
    let service = Arc::clone(&ctx.service);
    let handle = tokio::spawn(async move {
        match replay::replay_capture(&path, service.as_ref(), speed).await {
            Ok(summary) => println!(
                "Replayed {} lines: {} snapshots, {} dropped, {} malformed, {} cues, {} failed",
                summary.lines,
                summary.snapshots,
                summary.dropped,
                summary.malformed,
                summary.cues,
                summary.failed
            ),
            Err(e) => println!("{e}"),
        }
    });

    let mut tasks = ctx.tasks.lock().await;
    if let Some(previous) = tasks.replay.replace(handle) {
        previous.abort();
    }
}

pub async fn show_config(ctx: &CliContext) {
    let config = ctx.config.read().await;
    if let Some(path) = runecall_core::AppConfig::config_path() {
        println!("Config file: {}", path.display());
    }
    println!(
        "Scheduler: period {}s, warning {}s, guard {}s",
        config.scheduler.period_secs,
        config.scheduler.warning_secs,
        config.scheduler.advance_guard_secs
    );
    println!(
        "Cue: {} (volume {}, rate {}%)",
        config.cue.sound_id, config.cue.volume, config.cue.rate
    );
    println!(
        "Playback defaults: volume {}, rate {}%",
        config.playback.default_volume, config.playback.default_rate
    );
    println!("Sounds directory: {}", config.sounds_directory);
    println!("Command prefix: {}", config.command_prefix);
    println!("Linked tokens: {}", ctx.links.len());
}

pub fn exit() {
    let _ = writeln!(std::io::stdout(), "quitting...");
    let _ = std::io::stdout().flush();
}

fn describe(outcome: EnqueueOutcome) -> String {
    match outcome {
        EnqueueOutcome::Started => "started".to_string(),
        EnqueueOutcome::Queued { position } => format!("queued at position {position}"),
    }
}

/// `mm:ss`, with a leading minus during the pre-game countdown
fn format_clock(secs: i64) -> String {
    let sign = if secs < 0 { "-" } else { "" };
    let secs = secs.unsigned_abs();
    format!("{sign}{}:{:02}", secs / 60, secs % 60)
}
