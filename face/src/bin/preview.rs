//! Renders watchface frames to PNG files for visual inspection.
//!
//! Drives a real engine through a few host events, composes one frame per
//! requested mode and writes it next to the current directory. Useful for
//! eyeballing skins and layout without a device.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use clap::Parser;
use mascot_core::{DisplayInsets, FaceEngine, FaceSettings, HostEvent};
use mascot_face::{PngImageProvider, Renderer, render_face};
use tracing::info;

#[derive(Parser)]
#[command(version, about = "Render mascot watchface frames to PNG files")]
struct Args {
    #[arg(long, default_value_t = 400)]
    width: u32,

    #[arg(long, default_value_t = 400)]
    height: u32,

    /// Render the low-power ambient variant
    #[arg(long)]
    ambient: bool,

    /// Pin a specific skin index instead of auto-rotation
    #[arg(long)]
    skin: Option<u32>,

    /// Treat the display as round (chin spacing)
    #[arg(long)]
    round: bool,

    /// Directory containing the skin PNG assets
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    #[arg(long, default_value = "frame.png")]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut settings = FaceSettings::load_or_default();
    if let Some(skin) = args.skin {
        settings.pinned_skin_index = skin as i32;
    }

    let provider = Arc::new(PngImageProvider::new(&args.assets));
    let now = Local::now();
    let (mut engine, _redraws) = FaceEngine::new(provider, settings, now.timestamp_millis());

    engine.handle_event(HostEvent::InsetsChanged(DisplayInsets {
        is_round: args.round,
        system_bottom_inset: 0,
    }));
    engine.handle_event(HostEvent::VisibilityChanged(true));
    engine.handle_event(HostEvent::AmbientChanged(args.ambient));

    let mut renderer = Renderer::new();
    let mut pixels = vec![0u8; (args.width * args.height * 4) as usize];

    engine.prepare_frame(now.timestamp_millis(), args.width, args.height);
    let skin = *engine.catalog().get(engine.state().current_skin_index);
    render_face(
        &mut renderer,
        &mut pixels,
        args.width,
        args.height,
        engine.state(),
        &skin,
        now,
        engine.settings(),
        engine.insets(),
        engine.provider().as_ref(),
    );

    write_png(&args.out, args.width, args.height, &pixels)?;
    info!(path = %args.out.display(), "frame written");

    engine.shutdown();
    Ok(())
}

fn write_png(
    path: &Path,
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(pixels)?;
    Ok(())
}
