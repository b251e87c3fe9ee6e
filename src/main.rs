use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{info, warn};
use std::time::Duration;

use pinplayer::player::{
    AspectRatio, MediaPlayerBuilder, PlayerCallbacks, PlayerOptions, PresentationSignal,
    SimulatedResource, StartPolicy,
};
use pinplayer::utils;

/// pinplayer - drive a playback session against a simulated media resource
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Media source locator
    #[arg(value_name = "SOURCE")]
    source: String,

    /// Poster image shown before playback
    #[arg(long)]
    poster: Option<String>,

    /// Display title
    #[arg(long)]
    title: Option<String>,

    /// Aspect ratio as width:height
    #[arg(long, value_name = "W:H")]
    aspect: Option<AspectRatio>,

    /// Request playback on mount
    #[arg(long)]
    autoplay: bool,

    /// Loop at natural end
    #[arg(long = "loop")]
    loop_playback: bool,

    /// Start muted
    #[arg(short, long)]
    muted: bool,

    /// Use the host's native controls instead of the overlay
    #[arg(long)]
    native_controls: bool,

    /// Simulated media duration in seconds
    #[arg(long, default_value = "12")]
    duration: f64,

    /// Simulate a host that blocks autoplay
    #[arg(long)]
    block_autoplay: bool,

    /// Print control-surface snapshots as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = utils::load_config().context("Failed to load configuration")?;

    let log_level = if args.debug { "debug" } else { config.general.log_level.as_str() };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("Starting pinplayer v{}", env!("CARGO_PKG_VERSION"));

    if !(args.duration.is_finite() && args.duration > 0.0) {
        anyhow::bail!("Duration must be a positive number of seconds");
    }

    let aspect_ratio = match args.aspect {
        Some(ratio) => ratio,
        None => config.player.aspect_ratio.parse()?,
    };

    let options = PlayerOptions {
        source: args.source.clone(),
        poster_image: args.poster.clone(),
        display_title: args.title.clone(),
        aspect_ratio,
        autoplay: args.autoplay,
        loop_playback: args.loop_playback,
        initially_muted: args.muted,
        show_custom_controls: !args.native_controls,
    };

    let policy = if args.block_autoplay { StartPolicy::Block } else { StartPolicy::Allow };
    let (resource, media) = SimulatedResource::new(policy);
    let presentation = PresentationSignal::new();

    let callbacks = PlayerCallbacks::default()
        .on_play(|| info!("onPlay"))
        .on_pause(|| info!("onPause"))
        .on_ended(|| info!("onEnded"));

    let player = MediaPlayerBuilder::new(options)
        .with_defaults(config.player.clone())
        .with_callbacks(callbacks)
        .with_resource(resource)
        .with_presentation_host(presentation.clone())
        .spawn()?;

    media.load_metadata(args.duration);
    player.pointer_activity()?;

    if !args.autoplay || args.block_autoplay {
        if args.block_autoplay {
            // Blocked autoplay needs a user gesture; allow it from here on
            media.set_policy(StartPolicy::Allow);
        }
        player.toggle_play()?;
    }

    // Ten simulated seconds per real second
    let step = 0.5;
    let mut elapsed = 0.0;
    let mut entered_fullscreen = false;
    let mut escaped_fullscreen = false;
    let stop_at = if args.loop_playback { args.duration * 2.0 } else { args.duration };

    while elapsed < stop_at {
        tokio::time::sleep(Duration::from_millis(50)).await;
        media.advance(step);
        elapsed += step;

        if !entered_fullscreen && elapsed >= args.duration / 2.0 {
            entered_fullscreen = true;
            player.toggle_fullscreen()?;
        }
        if !escaped_fullscreen && elapsed >= args.duration * 0.75 {
            // Host-level escape, not a player action
            escaped_fullscreen = true;
            presentation.exit_externally();
        }

        let surface = player.snapshot().await?;
        if args.json {
            println!("{}", serde_json::to_string(&surface)?);
        } else {
            println!(
                "{:>11}  {:?}  overlay={} fullscreen={:?}",
                surface.readout(),
                surface.play_button,
                surface.overlay_visible,
                surface.fullscreen_button,
            );
        }
    }

    if !player.is_running() {
        warn!("Player session ended early");
    }
    player.unmount().await?;
    info!("Done");

    Ok(())
}
