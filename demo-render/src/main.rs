use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use texture_core::describe::{self, TextureSpec};
use texture_core::vector::ColorToGray;
use texture_core::{render_gray, render_rgba, RenderConfig};

/// Render a texture description to a PNG
#[derive(Parser, Debug)]
#[command(name = "texture-render")]
#[command(about = "Procedural texture renderer", long_about = None)]
struct Args {
    /// JSON texture description (built-in sample when omitted)
    #[arg(short, long)]
    spec: Option<PathBuf>,

    /// Output image path
    #[arg(short, long, default_value = "texture.png")]
    output: PathBuf,

    /// Override the image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Override the image height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Override the field distance between pixels on both axes
    #[arg(long)]
    step: Option<f64>,

    /// Render the luma of the tree as a 16-bit gray image
    #[arg(short, long)]
    gray: bool,

    /// Print the description as JSON and exit
    #[arg(long)]
    dump_spec: bool,
}

fn load(args: &Args) -> Result<TextureSpec> {
    let mut spec = match &args.spec {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => describe::sample(),
    };
    apply_overrides(&mut spec.render, args);
    Ok(spec)
}

fn apply_overrides(cfg: &mut RenderConfig, args: &Args) {
    if let Some(w) = args.width {
        cfg.width = w;
    }
    if let Some(h) = args.height {
        cfg.height = h;
    }
    if let Some(s) = args.step {
        cfg.step_x = s;
        cfg.step_y = s;
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let spec = load(&args)?;

    if args.dump_spec {
        println!("{}", serde_json::to_string_pretty(&spec)?);
        return Ok(());
    }

    let cfg = spec.render;
    let root = spec.build().context("building texture tree")?;
    info!(width = cfg.width, height = cfg.height, output = %args.output.display(), "Rendering");
    let started = Instant::now();

    if args.gray {
        let buf = render_gray(&cfg, &ColorToGray::new(root))?;
        let img = image::ImageBuffer::<image::Luma<u16>, _>::from_raw(
            buf.width, buf.height, buf.data,
        )
        .context("gray buffer size mismatch")?;
        img.save(&args.output)
            .with_context(|| format!("writing {}", args.output.display()))?;
    } else {
        let buf = render_rgba(&cfg, &root)?;
        let img = image::RgbaImage::from_raw(buf.width, buf.height, buf.data)
            .context("RGBA buffer size mismatch")?;
        img.save(&args.output)
            .with_context(|| format!("writing {}", args.output.display()))?;
    }

    info!(elapsed_ms = started.elapsed().as_millis(), "Done");
    Ok(())
}
