//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Smallest accepted world scale (diameter) in blocks.
pub const MIN_WORLD_SCALE: i32 = 1_000;

/// Largest accepted world scale (diameter) in blocks.
pub const MAX_WORLD_SCALE: i32 = 200_000;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// World generation settings.
    pub generation: GenerationConfig,
    /// Control map location.
    pub maps: MapsConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// World generation settings consumed by the map-driven fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// World seed. Drives the climate index noise.
    pub seed: u64,
    /// Horizontal world scale (diameter) in blocks. Stretches the maps along X.
    pub horizontal_world_scale: i32,
    /// Vertical world scale (diameter) in blocks. Distance between the poles.
    pub vertical_world_scale: i32,
    /// Generate continents from `continent.png`.
    pub continent_from_map: bool,
    /// Generate base land height and ocean depth from `altitude.png`.
    pub altitude_from_map: bool,
    /// Generate hotspots from `hotspots.png`.
    pub hotspots_from_map: bool,
    /// Generate temperature, rainfall and rainfall variance from `koppen.png`.
    pub koppen_from_map: bool,
    /// Pole offset in blocks.
    pub pole_offset: i32,
    /// Whether latitude wraps around past the poles.
    pub pole_looping: bool,
}

/// Where the control maps live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapsConfig {
    /// Directory holding `<name>.png` for every control map.
    pub directory: PathBuf,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            horizontal_world_scale: 40_000,
            vertical_world_scale: 40_000,
            continent_from_map: true,
            altitude_from_map: true,
            hotspots_from_map: true,
            koppen_from_map: true,
            pole_offset: 10_000,
            pole_looping: false,
        }
    }
}

impl GenerationConfig {
    /// Check that both world scales are within [`MIN_WORLD_SCALE`, `MAX_WORLD_SCALE`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, scale) in [
            ("horizontal_world_scale", self.horizontal_world_scale),
            ("vertical_world_scale", self.vertical_world_scale),
        ] {
            if !(MIN_WORLD_SCALE..=MAX_WORLD_SCALE).contains(&scale) {
                return Err(ConfigError::Invalid(format!(
                    "{axis} {scale} is outside {MIN_WORLD_SCALE}..={MAX_WORLD_SCALE}"
                )));
            }
        }
        Ok(())
    }

    /// Returns `true` if any control map is enabled.
    pub fn any_map_enabled(&self) -> bool {
        self.continent_from_map
            || self.altitude_from_map
            || self.hotspots_from_map
            || self.koppen_from_map
    }
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("maps"),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.generation.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    ///
    /// A changed map directory or world scale invalidates every cache built from
    /// the old values; the caller is expected to clear its world session.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.generation.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(!ron_str.is_empty());
        assert!(ron_str.contains("horizontal_world_scale: 40000"));
        assert!(ron_str.contains("koppen_from_map: true"));
    }

    #[test]
    fn test_roundtrip_preserves_values() {
        let mut config = Config::default();
        config.generation.seed = 1234;
        config.generation.pole_looping = true;
        config.maps.directory = PathBuf::from("/srv/world/maps");

        let ron_str = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new()).unwrap();
        let parsed: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let ron_str = "(generation: (seed: 99))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.generation.seed, 99);
        assert_eq!(config.generation.vertical_world_scale, 40_000);
        assert!(config.generation.continent_from_map);
        assert_eq!(config.maps, MapsConfig::default());
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());

        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.generation.horizontal_world_scale = 80_000;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_some());
        assert_eq!(result.unwrap().generation.horizontal_world_scale, 80_000);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_validate_rejects_out_of_range_scale() {
        let mut generation = GenerationConfig::default();
        assert!(generation.validate().is_ok());

        generation.vertical_world_scale = 10;
        let err = generation.validate().unwrap_err();
        assert!(
            err.to_string().contains("vertical_world_scale"),
            "error should name the field: {err}"
        );

        generation.vertical_world_scale = 40_000;
        generation.horizontal_world_scale = MAX_WORLD_SCALE + 1;
        assert!(matches!(generation.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_rejects_invalid_scale() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.generation.horizontal_world_scale = 0;
        config.save(dir.path()).unwrap();

        assert!(matches!(
            Config::load_or_create(dir.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_any_map_enabled() {
        let mut generation = GenerationConfig::default();
        assert!(generation.any_map_enabled());
        generation.continent_from_map = false;
        generation.altitude_from_map = false;
        generation.hotspots_from_map = false;
        generation.koppen_from_map = false;
        assert!(!generation.any_map_enabled());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_ron_comments_preserved() {
        let ron_str = "// This is a comment\n(\n  // Another comment\n)";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config, Config::default());
    }
}
