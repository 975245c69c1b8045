use std::path::PathBuf;

use clap::Parser;
use log::*;

use city_coverage::{CityConfig, GlyphSet, ScanStrategy};

/// Place coverage towers on a randomly obstructed city grid
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Grid height in blocks
    #[arg(long)]
    height: Option<usize>,

    /// Grid width in blocks
    #[arg(long)]
    width: Option<usize>,

    /// Percentage of blocks that are obstructed (0-100)
    #[arg(short, long)]
    blocked: Option<f64>,

    /// Tower coverage radius
    #[arg(short, long)]
    radius: Option<usize>,

    /// Seed for the obstruction layout
    #[arg(short, long)]
    seed: Option<u64>,

    /// Render with ASCII glyphs instead of emoji
    #[arg(long)]
    ascii: bool,

    /// Use the incremental candidate index
    #[arg(long)]
    incremental: bool,
}

fn run(args: Args) -> city_coverage::Result<()> {
    let mut config = match &args.config {
        Some(path) => CityConfig::load(path)?,
        None => CityConfig::default(),
    };

    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(blocked) = args.blocked {
        config.blocked_percentage = blocked;
    }
    if let Some(radius) = args.radius {
        config.radius = radius;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.ascii {
        config.glyphs = GlyphSet::Ascii;
    }
    if args.incremental {
        config.strategy = ScanStrategy::Incremental;
    }

    info!(
        "City {}x{}, {}% blocked, tower radius {}",
        config.height, config.width, config.blocked_percentage, config.radius
    );

    let mut grid = config.build_grid()?;
    println!("{}\n", grid.render_text(config.glyphs));

    let plan = config.planner().plan(&mut grid)?;
    println!("{}\n", grid.render_text(config.glyphs));

    for (i, (location, gain)) in plan.placements().enumerate() {
        println!("tower {:>3}: {} covers {} new blocks", i + 1, location, gain);
    }
    println!(
        "{} towers, {} blocks covered, {} blocked ({:.1}% coverage)",
        plan.stats.towers,
        plan.stats.covered,
        plan.stats.blocked,
        plan.stats.coverage_ratio() * 100.0
    );

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()) {
        error!("{}", e);
        std::process::exit(1);
    }
}
