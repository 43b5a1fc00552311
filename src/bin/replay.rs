//! minimap-replay binary
//!
//! Replays a capture of raw server frames through the minimap decoder and
//! writes the resulting minimap as an SVG.
//!
//! ## Capture format
//!
//! Repeated records of a little-endian `u32` byte length followed by that
//! many bytes of one server frame.
//!
//! ## Configuration (env / file via `config` crate)
//!
//! | Key                                 | Default       | Description             |
//! |-------------------------------------|---------------|-------------------------|
//! | `MINIMAP_OUTPUT`                    | `minimap.svg` | Output SVG path         |
//! | `MINIMAP_CONFIG`                    | –             | Display config file     |
//! | `MINIMAP__DISPLAY__WIDTH`           | `300`         | Display width in pixels |
//! | `MINIMAP__RESOURCE__<CAT>__ENABLED` | `true`        | Category visibility     |

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use moomoo_minimap::{Category, Dot, DisplayConfig, DrawSurface, Minimap};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "minimap-replay",
    about = "Replay captured MooMoo frames onto an SVG minimap",
    version
)]
struct Args {
    /// Capture file of length-prefixed frames
    capture: PathBuf,

    /// Output SVG path
    #[arg(long, short, env = "MINIMAP_OUTPUT", default_value = "minimap.svg")]
    output: PathBuf,

    /// Display config file (any format the `config` crate understands)
    #[arg(long, env = "MINIMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Hide a resource category (wood, food, stone, points); repeatable
    #[arg(long = "hide", value_name = "CATEGORY")]
    hide: Vec<Category>,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("moomoo_minimap=debug".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut display_config = load_config(args.config.as_deref())?;
    for category in &args.hide {
        display_config.set_enabled(*category, false);
    }
    let world = display_config.world;
    let surface = display_config.display;

    let bytes = std::fs::read(&args.capture)
        .with_context(|| format!("reading capture {}", args.capture.display()))?;
    let frames = split_frames(&bytes);

    tracing::info!(
        "Replaying {} frame(s) from {} (world {}x{}, display {}x{})",
        frames.len(),
        args.capture.display(),
        world.width,
        world.height,
        surface.width,
        surface.height,
    );

    let minimap = Minimap::new(display_config.clone().into_shared());
    for frame in &frames {
        minimap.ingest_frame(frame);
    }

    let mut svg = SvgSurface::new(&display_config);
    let render = minimap.repaint(&mut svg);

    std::fs::write(&args.output, svg.finish())
        .with_context(|| format!("writing {}", args.output.display()))?;

    let stats = minimap.stats();
    tracing::info!(
        frames_seen = stats.frames_seen,
        frames_malformed = stats.frames_malformed,
        packets_ignored = stats.packets_ignored,
        records_dropped = stats.records_dropped,
        entities = minimap.entity_count(),
        drawn = render.drawn,
        hidden = render.hidden,
        "Wrote {}",
        args.output.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Config layering: defaults → file → MINIMAP__* env
// ---------------------------------------------------------------------------

fn load_config(path: Option<&Path>) -> Result<DisplayConfig> {
    let defaults = config::Config::try_from(&DisplayConfig::default())?;
    let mut builder = config::Config::builder().add_source(defaults);
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }
    let loaded: DisplayConfig = builder
        .add_source(
            config::Environment::with_prefix("MINIMAP")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
        .context("invalid display config")?;

    if loaded.world.width <= 0.0 || loaded.world.height <= 0.0 {
        bail!("world extent must be positive");
    }
    Ok(loaded)
}

// ---------------------------------------------------------------------------
// Capture parsing
// ---------------------------------------------------------------------------

/// Split a capture into frames. A truncated final record ends the replay.
fn split_frames(bytes: &[u8]) -> Vec<&[u8]> {
    let mut frames = Vec::new();
    let mut rest = bytes;
    while !rest.is_empty() {
        let Some((len, body)) = rest.split_first_chunk::<4>() else {
            tracing::warn!("Capture ends with a partial length prefix");
            break;
        };
        let len = u32::from_le_bytes(*len) as usize;
        if body.len() < len {
            tracing::warn!(
                "Capture ends mid-frame ({} of {} bytes); stopping",
                body.len(),
                len
            );
            break;
        }
        let (frame, tail) = body.split_at(len);
        frames.push(frame);
        rest = tail;
    }
    frames
}

// ---------------------------------------------------------------------------
// SVG surface
// ---------------------------------------------------------------------------

struct SvgSurface {
    width: f64,
    height: f64,
    body: String,
}

impl SvgSurface {
    fn new(config: &DisplayConfig) -> Self {
        Self {
            width: config.display.width,
            height: config.display.height,
            body: String::new(),
        }
    }

    fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" \
             viewBox=\"0 0 {w} {h}\" overflow=\"hidden\">\n\
             <rect width=\"{w}\" height=\"{h}\" fill=\"rgba(0,0,0,0.25)\"/>\n{body}</svg>\n",
            w = self.width,
            h = self.height,
            body = self.body
        )
    }
}

impl DrawSurface for SvgSurface {
    fn draw_dot(&mut self, dot: &Dot<'_>) {
        self.body.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{}\" fill=\"{c}\" stroke=\"{c}\"/>\n",
            dot.center.x,
            dot.center.y,
            dot.radius,
            c = dot.color
        ));
    }
}
