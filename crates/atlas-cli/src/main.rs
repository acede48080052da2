//! Diagnostics for the map-driven world fields.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `atlas probe --x 12 --z -40` to print every field at one grid point,
//! `atlas koppen` for the parameter cache, or `atlas distances` for the
//! distance transform histograms.

use std::path::PathBuf;
use std::process::ExitCode;

use atlas_config::{CliArgs, Config};
use atlas_maps::climate::{Hemisphere, KoppenClimate, KoppenParameterCache};
use atlas_maps::distance::DistanceMap;
use atlas_maps::{Field2D, GRID_WIDTH_IN_BLOCKS, TransformedField, WorldFields, WorldSession};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "atlas", about = "Inspect map-driven terrain and climate fields")]
struct Args {
    #[command(flatten)]
    common: CliArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every built field at one grid point.
    Probe {
        /// Grid X coordinate.
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        /// Grid Z coordinate.
        #[arg(long, allow_hyphen_values = true)]
        z: f64,
        /// Offset applied to the noise slots, in blocks.
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset_x: i32,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset_z: i32,
        /// Rotation applied to the noise slots, snapped to a quarter turn.
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        rotation: i32,
    },
    /// Print Köppen parameter bucket sizes, shares and means.
    Koppen,
    /// Print ocean and west coast distance histograms.
    Distances,
}

fn config_dir(args: &CliArgs) -> Option<PathBuf> {
    args.config
        .clone()
        .or_else(|| dirs::config_dir().map(|dir| dir.join("atlas")))
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match config_dir(&args.common) {
        Some(dir) => Config::load_or_create(&dir).unwrap_or_else(|e| {
            eprintln!("Failed to load config: {e}, using defaults");
            Config::default()
        }),
        None => {
            eprintln!("No config directory available, using defaults");
            Config::default()
        }
    };
    config.apply_cli_overrides(&args.common);
    if let Err(e) = config.generation.validate() {
        eprintln!("Invalid generation settings: {e}");
        return ExitCode::FAILURE;
    }

    let log_dir = config_dir(&args.common).map(|dir| dir.join("logs"));
    atlas_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    let session = WorldSession::from_config(&config);
    match args.command {
        Command::Koppen => {
            print_koppen(&session.parameter_cache());
            ExitCode::SUCCESS
        }
        command => {
            let fields = match session.build_fields(&config.generation) {
                Ok(fields) => fields,
                Err(e) => {
                    eprintln!("Failed to build world fields: {e}");
                    return ExitCode::FAILURE;
                }
            };
            info!(
                "Built world fields for {}x{} blocks",
                fields.scale.radius_blocks_x() * 2,
                fields.scale.radius_blocks_z() * 2
            );
            match command {
                Command::Probe {
                    x,
                    z,
                    offset_x,
                    offset_z,
                    rotation,
                } => print_probe(&fields, x, z, (offset_x, offset_z), rotation),
                Command::Distances => print_distances(&fields),
                Command::Koppen => {}
            }
            ExitCode::SUCCESS
        }
    }
}

fn print_probe(fields: &WorldFields, x: f64, z: f64, offset: (i32, i32), rotation: i32) {
    println!("Grid point ({x}, {z})");
    let z_blocks = (z * GRID_WIDTH_IN_BLOCKS as f64).round() as i32;
    println!(
        "  latitude          {:.4} rad ({})",
        fields.latitude(z_blocks),
        match fields.hemisphere(z_blocks) {
            Hemisphere::Northern => "northern",
            Hemisphere::Southern => "southern",
        }
    );

    if let Some(continent) = &fields.continent {
        println!(
            "  continent         {:.3} ({})",
            continent.continent(x, z),
            if continent.is_ocean(x, z) { "ocean" } else { "land" }
        );
    }
    if let Some(altitude) = &fields.altitude {
        let a = altitude.altitude(x, z);
        println!(
            "  altitude          land height {} / ocean depth {}",
            a.land_height, a.ocean_depth
        );
    }
    if let Some(hotspots) = &fields.hotspots {
        println!(
            "  hotspot           {:.3} ({})",
            hotspots.intensity(x, z),
            hotspots.age(x, z)
        );
    }
    if let Some(koppen) = &fields.koppen {
        println!("  koppen            {}", koppen.climate(x, z));
    }
    let (gx, gz) = (x.round() as i32, z.round() as i32);
    let land = fields.continent.as_ref().is_some_and(|c| !c.is_ocean(x, z));
    if let Some(ocean) = &fields.ocean_distance {
        println!("  ocean distance    {}", ocean.distance(gx, gz, land));
    }
    if let Some(west_coast) = &fields.west_coast_distance {
        println!("  west coast        {}", west_coast.distance(gx, gz));
    }

    println!("Noise slots (offset {offset:?} blocks, rotation {rotation}°)");
    for (name, slot) in fields.noise_slots() {
        let slot = TransformedField::new(slot)
            .with_offset(offset.0, offset.1)
            .with_rotation(rotation);
        println!("  {name:<18}{:.3}", slot.value(x, z));
    }
}

fn print_koppen(cache: &KoppenParameterCache) {
    let total = cache.total_combinations().max(1);
    println!(
        "{:<5}{:>9}{:>8}{:>10}{:>10}{:>10}",
        "code", "count", "share", "temp", "rain", "var"
    );
    for climate in KoppenClimate::ALL {
        let count = cache.bucket_len(climate);
        println!(
            "{:<5}{:>9}{:>7.2}%{:>10.2}{:>10.1}{:>10.3}",
            climate.code(),
            count,
            count as f64 * 100.0 / total as f64,
            cache.base_temperature(climate),
            cache.base_rainfall(climate),
            cache.base_rainfall_variance(climate)
        );
    }
    println!("total {}", cache.total_combinations());
}

fn print_distances(fields: &WorldFields) {
    match (&fields.ocean_distance, &fields.west_coast_distance) {
        (Some(ocean), Some(west_coast)) => {
            print_histogram("Ocean distance", ocean.map());
            print_histogram("West coast distance", west_coast.map());
        }
        _ => println!("Distance caches are only built from the continent map"),
    }
}

fn print_histogram(title: &str, map: &DistanceMap) {
    println!("{title} ({}x{})", map.width(), map.height());
    for (value, count) in histogram_rows(map) {
        println!("  {value:>4} {count}");
    }
}

/// Non-empty histogram buckets as `(value, count)`.
fn histogram_rows(map: &DistanceMap) -> Vec<(i8, usize)> {
    map.histogram()
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > 0)
        .map(|(i, &count)| ((i as i16 - 128) as i8, count))
        .collect()
}
