mod args;

use std::{fs::File, io::BufWriter, path::Path};

use anyhow::{Context, Result};
use clap::Parser;
use famicore::{FRAME_HEIGHT, FRAME_WIDTH, FrameCapture, IdleInput, Nes, NesConfig};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use crate::args::Args;

fn init_tracing(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("installing log subscriber")
}

fn write_png(path: &Path, capture: &FrameCapture) -> Result<()> {
    let rgb = capture
        .to_rgb8()
        .context("no frame was presented, nothing to save")?;
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut encoder = png::Encoder::new(
        BufWriter::new(file),
        FRAME_WIDTH as u32,
        FRAME_HEIGHT as u32,
    );
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&rgb)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.trace { Level::TRACE } else { args.log_level };
    init_tracing(level)?;

    let config = NesConfig {
        timing: args.timing.into(),
        trace_cpu: args.trace,
        ..NesConfig::default()
    };
    let mut nes = Nes::with_config(config);
    nes.load_cartridge_from_file(&args.rom)
        .with_context(|| format!("loading {}", args.rom.display()))?;

    let mut capture = FrameCapture::new();
    for frame in 0..args.frames {
        nes.run_frame(&mut capture, &IdleInput)
            .with_context(|| format!("frame {frame}"))?;
    }
    info!(frames = capture.frames(), "run finished");
    let snapshot = nes.snapshot();
    println!("PC:{:04X} {snapshot}", snapshot.pc);

    if let Some(path) = &args.screenshot {
        write_png(path, &capture)?;
        info!(path = %path.display(), "screenshot saved");
    }
    Ok(())
}
