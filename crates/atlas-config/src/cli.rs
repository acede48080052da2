//! Command-line arguments shared by every tool that builds a world session.

use std::path::PathBuf;

use clap::Args;

use crate::Config;

/// Generation overrides accepted on the command line.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Args, Debug, Clone, Default)]
pub struct CliArgs {
    /// Horizontal world scale (diameter) in blocks.
    #[arg(long)]
    pub horizontal_scale: Option<i32>,

    /// Vertical world scale (diameter) in blocks.
    #[arg(long)]
    pub vertical_scale: Option<i32>,

    /// Directory holding the control maps.
    #[arg(long)]
    pub maps_dir: Option<PathBuf>,

    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Generate continents procedurally instead of from `continent.png`.
    #[arg(long)]
    pub no_continent_map: bool,

    /// Ignore `altitude.png`.
    #[arg(long)]
    pub no_altitude_map: bool,

    /// Ignore `hotspots.png`.
    #[arg(long)]
    pub no_hotspots_map: bool,

    /// Ignore `koppen.png`.
    #[arg(long)]
    pub no_koppen_map: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(h) = args.horizontal_scale {
            self.generation.horizontal_world_scale = h;
        }
        if let Some(v) = args.vertical_scale {
            self.generation.vertical_world_scale = v;
        }
        if let Some(ref dir) = args.maps_dir {
            self.maps.directory = dir.clone();
        }
        if let Some(seed) = args.seed {
            self.generation.seed = seed;
        }
        if args.no_continent_map {
            self.generation.continent_from_map = false;
        }
        if args.no_altitude_map {
            self.generation.altitude_from_map = false;
        }
        if args.no_hotspots_map {
            self.generation.hotspots_from_map = false;
        }
        if args.no_koppen_map {
            self.generation.koppen_from_map = false;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            horizontal_scale: Some(80_000),
            maps_dir: Some(PathBuf::from("/tmp/maps")),
            no_koppen_map: true,
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.generation.horizontal_world_scale, 80_000);
        assert_eq!(config.maps.directory, PathBuf::from("/tmp/maps"));
        assert!(!config.generation.koppen_from_map);
        // Non-overridden fields retain defaults
        assert_eq!(config.generation.vertical_world_scale, 40_000);
        assert!(config.generation.continent_from_map);
    }

    #[test]
    fn test_cli_override_out_of_range_fails_validation() {
        let mut config = Config::default();
        let args = CliArgs {
            horizontal_scale: Some(0),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        let err = config.generation.validate().unwrap_err();
        assert!(
            err.to_string().contains("horizontal_world_scale"),
            "error should name the field: {err}"
        );

        let args = CliArgs {
            horizontal_scale: Some(80_000),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert!(config.generation.validate().is_ok());
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }
}
