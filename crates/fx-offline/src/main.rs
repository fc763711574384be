//! fx-render: apply the effects engine to a WAV file
//!
//! Usage:
//!   fx-render in.wav out.wav --eq 300,0,-200,0,0,0,0,0,0,600
//!   fx-render in.wav out.wav --bass-boost 800 --no-agc
//!   fx-render in.wav out.wav --config effects.json --json

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use fx_core::{BAND_COUNT, EffectsConfig};
use fx_offline::{DEFAULT_BLOCK_FRAMES, RenderOptions, render_wav};

#[derive(Parser)]
#[command(name = "fx-render", about = "Render a 16-bit stereo WAV through the effects engine")]
struct Cli {
    /// Input WAV (16-bit integer, stereo)
    input: PathBuf,

    /// Output WAV
    output: PathBuf,

    /// Engine configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable the equalizer with comma-separated band levels in millibels
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    eq: Option<Vec<i32>>,

    /// Enable bass boost at this strength (0-1000)
    #[arg(long)]
    bass_boost: Option<i32>,

    /// Enable the virtualizer at this strength (0-1000)
    #[arg(long)]
    virtualizer: Option<i32>,

    /// Disable the automatic gain limiter
    #[arg(long)]
    no_agc: bool,

    /// Frames per processing block
    #[arg(long, default_value_t = DEFAULT_BLOCK_FRAMES)]
    block_frames: usize,

    /// Print the render report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EffectsConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EffectsConfig::default(),
    };

    let mut options = RenderOptions {
        config,
        ..Default::default()
    }
    .with_block_frames(cli.block_frames);

    if let Some(levels) = &cli.eq {
        if levels.len() > BAND_COUNT {
            bail!("--eq takes at most {BAND_COUNT} levels, got {}", levels.len());
        }
        let mut band_levels = [0; BAND_COUNT];
        band_levels[..levels.len()].copy_from_slice(levels);
        options = options.with_equalizer(band_levels);
    }
    if let Some(strength) = cli.bass_boost {
        options = options.with_bass_boost(strength);
    }
    if let Some(strength) = cli.virtualizer {
        options = options.with_virtualizer(strength);
    }
    if cli.no_agc {
        options = options.with_automatic_gain(false);
    }

    let report = render_wav(&cli.input, &cli.output, &options)
        .with_context(|| format!("rendering {}", cli.input.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} frames at {} Hz via {}, final limiter gain {} mB",
            report.frames, report.sample_rate, report.routine, report.final_agc_millibels
        );
    }
    Ok(())
}
