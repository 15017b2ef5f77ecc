use anyhow::Context;
use clap::Parser;
use eframe::egui;
use log::{debug, info};
use std::path::Path;

use framestep::cli::Args;
use framestep::config::PathConfig;
use framestep::media::{SourceFile, StreamInfo, VideoMetadata};
use framestep::ui::ComparisonApp;

fn init_logging(args: &Args, path_config: &PathConfig) -> anyhow::Result<()> {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .clone()
            .unwrap_or_else(|| path_config.log_file());

        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!(
            "Logging to file: {} (level: {:?})",
            log_path.display(),
            log_level
        );
    } else {
        // Respects RUST_LOG if set
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .filter_module("egui", log::LevelFilter::Info)
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}

/// `--info`: probe and print metadata without opening a window
fn print_info(path: &Path) -> anyhow::Result<()> {
    let file = SourceFile::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let stream = StreamInfo::read(file.path())
        .with_context(|| format!("Cannot read video stream of {}", path.display()))?;
    let meta = VideoMetadata::from_stream(&stream, &file);

    println!("{} ({:.2} MB)", file.name(), file.size_mb());
    for (label, value) in meta.rows() {
        println!("  {:<13} {}", label, value);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    playa_ffmpeg::init()?;

    let args = Args::parse();

    let path_config = PathConfig::from_env_and_cli(args.config_dir.clone());
    if args.log_file.is_some()
        && let Err(e) = path_config.ensure_dirs()
    {
        eprintln!("Warning: {:#}", e);
    }

    init_logging(&args, &path_config)?;

    info!("framestep {} starting...", env!("CARGO_PKG_VERSION"));
    debug!("Command-line args: {:?}", args);

    if args.info {
        if let Some(path) = &args.file_path {
            print_info(path)?;
        }
        return Ok(());
    }

    match &args.file_path {
        Some(path) => info!("Input file: {}", path.display()),
        None => info!("No input file provided, starting empty (drag-and-drop supported)"),
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("framestep v{}", env!("CARGO_PKG_VERSION")))
            .with_inner_size([1280.0, 820.0])
            .with_resizable(true)
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "framestep",
        native_options,
        Box::new(move |cc| Ok(Box::new(ComparisonApp::new(cc, &args)))),
    )?;

    Ok(())
}
