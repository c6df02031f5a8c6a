use clap::Parser;
use log::{error, info};
use shadowcast::app::{run_gui, run_headless};
use shadowcast::io::config::Config;
use std::path::PathBuf;

/// Interactive shadow-mapping demo.
#[derive(Parser, Debug)]
#[command(name = "shadowcast")]
#[command(about = "Two-pass shadow mapping demo with a free-fly camera")]
struct Cli {
    /// Scene configuration (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Mesh to place in the scene, overriding the config
    #[arg(short, long, value_name = "FILE")]
    mesh: Option<String>,

    /// Render the shadow map on the CPU and exit
    #[arg(long)]
    headless: bool,

    /// Output PNG for headless mode
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() -> Result<(), String> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .filter_module("eframe", log::LevelFilter::Warn)
        .filter_module("egui_glow", log::LevelFilter::Warn)
        .filter_module("egui_winit", log::LevelFilter::Warn)
        .filter_module("winit", log::LevelFilter::Warn)
        .filter_module("glutin", log::LevelFilter::Warn)
        .filter_module("sctk", log::LevelFilter::Warn)
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading config: {}", path);
            Config::load(path).inspect_err(|e| error!("{}", e))?
        }
        None => {
            info!("Using default scene");
            Config::default()
        }
    };
    if let Some(mesh) = cli.mesh {
        config.scene.mesh = mesh;
    }

    let result = if cli.headless {
        run_headless(&config, cli.output)
    } else {
        run_gui(config)
    };
    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}
