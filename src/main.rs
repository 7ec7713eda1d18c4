use std::fs;

use fbraster::Scene;
use log::{info, warn};

/// Command line options
struct Options {
    scene: Option<String>,
    out: Option<String>,
    write_default: Option<String>,
    preview: bool,
}

/// Parse command line arguments
fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options {
        scene: None,
        out: None,
        write_default: None,
        preview: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--scene" | "-s" => {
                if i + 1 < args.len() {
                    options.scene = Some(args[i + 1].clone());
                    i += 1;
                }
            },
            "--out" | "-o" => {
                if i + 1 < args.len() {
                    options.out = Some(args[i + 1].clone());
                    i += 1;
                }
            },
            "--write-default" => {
                if i + 1 < args.len() {
                    options.write_default = Some(args[i + 1].clone());
                    i += 1;
                }
            },
            "--preview" | "-p" => options.preview = true,
            "--help" | "-h" => {
                println!("Usage: fbraster [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --scene FILE, -s FILE   Render a JSON scene (default: built-in demo)");
                println!("  --out FILE, -o FILE     Write the raw framebuffer bytes to FILE");
                println!("  --write-default FILE    Save the built-in demo scene as JSON and exit");
                println!("  --preview, -p           Show the frame in a window (needs the `preview` feature)");
                println!("  --help, -h              Show this help message");
                println!();
                println!("Set RUST_LOG=debug or RUST_LOG=trace for per-draw detail.");
                std::process::exit(0);
            },
            other => warn!("ignoring unknown argument '{}'", other),
        }
        i += 1;
    }

    options
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let options = parse_args();

    if let Some(path) = &options.write_default {
        Scene::default().save(path)?;
        info!("wrote default scene to {}", path);
        return Ok(());
    }

    let scene = match &options.scene {
        Some(path) => Scene::load(path).map_err(|e| format!("{}: {}", path, e))?,
        None => Scene::default(),
    };
    let frame = scene.render()?;

    let view = frame.view();
    info!(
        "frame {}x{} {} ({} bytes, {} bits per row)",
        view.width(),
        view.height(),
        view.format(),
        view.bytes().len(),
        view.row_bits()
    );

    if let Some(path) = &options.out {
        fs::write(path, view.bytes()).map_err(|e| format!("{}: {}", path, e))?;
        info!("wrote {}", path);
    }

    if options.preview {
        preview(&frame)?;
    }
    Ok(())
}

#[cfg(feature = "preview")]
fn preview(frame: &fbraster::PixelBuffer) -> Result<(), String> {
    let mut display =
        fbraster::Display::with_options("fbraster", frame.width(), frame.height(), true)?;
    display.present(frame)?;
    display.wait_for_quit();
    Ok(())
}

#[cfg(not(feature = "preview"))]
fn preview(_frame: &fbraster::PixelBuffer) -> Result<(), String> {
    warn!("built without the `preview` feature, skipping window");
    Ok(())
}
