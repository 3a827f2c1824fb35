//! Cosmos render CLI - cloud and atmosphere compositing for planet images.

use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use cosmos_render::clouds::{CloudConfig, Clouds};
use cosmos_render::config::RenderConfig;
use cosmos_render::export::{export_rgba_png, DebugDump, PngOptions};
use cosmos_render::palette::{ColorPalette, StaticPalette};
use cosmos_render::raster::shaded_planet;

/// Procedural cloud and atmosphere layers for planet renders.
#[derive(Parser)]
#[command(name = "cosmos-render")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a standalone cloud sprite.
    Clouds {
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Cloud coverage (0.0-1.0).
        #[arg(short, long, default_value = "0.5")]
        coverage: f32,

        /// Canvas side in pixels.
        #[arg(long, default_value = "512")]
        size: u32,

        /// Fractal detail multiplier (0.0-2.0).
        #[arg(long, default_value = "1.0")]
        detail: f32,

        /// Wind drift strength (0.0-1.0). Drawn from the seed when omitted.
        #[arg(long)]
        wind: Option<f32>,

        /// Light direction in degrees.
        #[arg(long, default_value = "45")]
        light_angle: f32,

        #[arg(short, long, default_value = "Desert")]
        planet_type: String,

        /// Also write the mask, texture and noise field here.
        #[arg(long)]
        debug_dir: Option<PathBuf>,

        #[arg(short, long, default_value = "./output")]
        output: PathBuf,
    },

    /// Composite atmosphere and clouds onto a planet.
    Apply {
        /// Planet raster. A shaded placeholder disc is used when omitted.
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[arg(short, long, default_value = "42")]
        seed: u64,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Render several seeds in parallel.
    Batch {
        /// Comma-separated seed list.
        #[arg(long, value_delimiter = ',', required = true)]
        seeds: Vec<u64>,

        #[command(flatten)]
        render: RenderArgs,
    },
}

#[derive(Args, Clone)]
struct RenderArgs {
    #[arg(short, long)]
    planet_type: Option<String>,

    /// Planet has rings (wider, softer glow).
    #[arg(long)]
    rings: bool,

    #[arg(long)]
    no_clouds: bool,

    #[arg(long)]
    no_atmosphere: bool,

    /// Placeholder planet size when no input is given.
    #[arg(long)]
    size: Option<u32>,

    /// JSON render config. Flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    debug_dir: Option<PathBuf>,

    #[arg(short, long, default_value = "./output")]
    output: PathBuf,
}

impl RenderArgs {
    fn resolve(&self, seed: u64) -> RenderConfig {
        let mut config = match &self.config {
            Some(path) => RenderConfig::from_json_file(path).unwrap_or_else(|e| {
                eprintln!("Error loading config {}: {}", path.display(), e);
                std::process::exit(1);
            }),
            None => RenderConfig::default(),
        };

        if let Some(t) = &self.planet_type {
            config.planet_type = t.clone();
        }
        if let Some(size) = self.size {
            config.size = size;
        }
        if self.debug_dir.is_some() {
            config.debug_dir = self.debug_dir.clone();
        }
        config.has_rings |= self.rings;
        if self.no_clouds {
            config.clouds.enabled = false;
        }
        if self.no_atmosphere {
            config.atmosphere.enabled = false;
        }
        config.with_seed(seed)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Clouds {
            seed,
            coverage,
            size,
            detail,
            wind,
            light_angle,
            planet_type,
            debug_dir,
            output,
        } => {
            let config = CloudConfig {
                seed,
                coverage,
                size,
                detail_level: detail,
                wind_effect: wind,
                light_angle,
                ..Default::default()
            };
            run_clouds(config, planet_type, debug_dir, output);
        }
        Commands::Apply { input, seed, render } => {
            run_apply(input, seed, render);
        }
        Commands::Batch { seeds, render } => {
            run_batch(seeds, render);
        }
    }
}

fn create_output_dir(output: &Path) {
    if let Err(e) = std::fs::create_dir_all(output) {
        eprintln!("Error creating output directory: {}", e);
        std::process::exit(1);
    }
}

fn run_clouds(config: CloudConfig, planet_type: String, debug_dir: Option<PathBuf>, output: PathBuf) {
    println!("Cosmos Render - Clouds");
    println!("======================");
    println!("Seed: {}", config.seed);
    println!("Size: {}x{}", config.size, config.size);
    println!("Coverage: {:.2}", config.coverage);

    create_output_dir(&output);
    let start = Instant::now();

    let seed = config.seed;
    let mut clouds = Clouds::from_config(config).with_planet_type(planet_type.clone());
    if let Some(dir) = debug_dir {
        clouds = clouds.with_debug_dump(DebugDump::new(dir, planet_type));
    }

    let texture = clouds.generate_cloud_texture().unwrap_or_else(|e| {
        eprintln!("Error generating clouds: {}", e);
        std::process::exit(1);
    });

    let path = output.join(format!("clouds_{}.png", seed));
    if let Err(e) = export_rgba_png(texture, &path, &PngOptions::default()) {
        eprintln!("Error exporting PNG: {}", e);
        std::process::exit(1);
    }

    println!("Wind effect: {:.2}", clouds.wind_effect());
    println!("Generated in {:.2?}", start.elapsed());
    println!("  Exported {}", path.display());
}

fn load_planet(input: Option<&Path>, config: &RenderConfig) -> Result<image::DynamicImage, String> {
    match input {
        Some(path) => image::open(path).map_err(|e| format!("Error reading {}: {}", path.display(), e)),
        None => {
            let base = StaticPalette::new(config.seed)
                .get_base_color(&config.planet_type)
                .map_err(|e| e.to_string())?;
            let disc = shaded_planet(config.size, [base[0], base[1], base[2]], config.clouds.light_angle);
            Ok(image::DynamicImage::ImageRgba8(disc))
        }
    }
}

/// Renders one placeholder planet and writes `planet_<seed>.png`.
fn render_one(config: &RenderConfig, output: &Path) -> Result<PathBuf, String> {
    let planet = load_planet(None, config)?;

    // The cloud sprite must match the planet raster.
    let mut config = config.clone();
    config.size = planet.width();
    let config = config.normalized();

    let mut pipeline = config.build_pipeline().map_err(|e| e.to_string())?;
    let rendered = pipeline
        .run(planet.to_rgba8(), &config.context())
        .map_err(|e| e.to_string())?;

    let path = output.join(format!("planet_{}.png", config.seed));
    export_rgba_png(&rendered, &path, &PngOptions::default()).map_err(|e| e.to_string())?;
    Ok(path)
}

fn run_apply(input: Option<PathBuf>, seed: u64, render: RenderArgs) {
    let config = render.resolve(seed);

    println!("Cosmos Render - Apply");
    println!("=====================");
    println!("Planet type: {}", config.planet_type);
    println!("Seed: {}", config.seed);
    println!("Rings: {}", config.has_rings);
    println!("Output: {}", render.output.display());

    create_output_dir(&render.output);
    let start = Instant::now();

    let planet = load_planet(input.as_deref(), &config).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });
    let mut config = config;
    config.size = planet.width();
    let config = config.normalized();

    let mut pipeline = config.build_pipeline().unwrap_or_else(|e| {
        eprintln!("Error building pipeline: {}", e);
        std::process::exit(1);
    });
    let rendered = pipeline
        .run_with_callbacks(
            planet.to_rgba8(),
            &config.context(),
            |name, i, total| {
                println!("  [{}/{}] Starting: {}", i + 1, total, name);
            },
            |name, i, total| {
                println!("  [{}/{}] Completed: {}", i + 1, total, name);
            },
        )
        .unwrap_or_else(|e| {
            eprintln!("Error during generation: {}", e);
            std::process::exit(1);
        });

    let path = render.output.join(format!("planet_{}.png", config.seed));
    if let Err(e) = export_rgba_png(&rendered, &path, &PngOptions::default()) {
        eprintln!("Error exporting PNG: {}", e);
        std::process::exit(1);
    }

    println!("Generation completed in {:.2?}", start.elapsed());
    println!("  Exported {}", path.display());
}

fn run_batch(seeds: Vec<u64>, render: RenderArgs) {
    println!("Cosmos Render - Batch");
    println!("=====================");
    println!("Seeds: {}", seeds.len());
    println!("Output: {}", render.output.display());

    create_output_dir(&render.output);
    let start = Instant::now();

    let base = render.resolve(seeds.first().copied().unwrap_or_default());
    let results: Vec<(u64, Result<PathBuf, String>)> = seeds
        .par_iter()
        .map(|&seed| (seed, render_one(&base.with_seed(seed), &render.output)))
        .collect();

    let mut failures = 0;
    for (seed, result) in &results {
        match result {
            Ok(path) => println!("  [{}] {}", seed, path.display()),
            Err(e) => {
                failures += 1;
                eprintln!("  [{}] Error: {}", seed, e);
            }
        }
    }

    println!(
        "Batch completed in {:.2?}: {} ok, {} failed",
        start.elapsed(),
        results.len() - failures,
        failures
    );
    if failures > 0 {
        std::process::exit(1);
    }
}
