use std::fs;
use std::io;
use std::path::Path;

use cubekin_shared::daynight::DEFAULT_DAY_LENGTH_MS;
use cubekin_shared::mob::{MOB_MAX_COUNT, MOB_SPAWN_INTERVAL_MS};
use cubekin_shared::player::{DEFAULT_MOUSE_SENSITIVITY, DEFAULT_REACH};
use cubekin_shared::worldgen::DEFAULT_HALF_EXTENT;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const SETTINGS_FILE: &str = "settings.toml";

const MIN_HALF_EXTENT: i32 = 1;
const MAX_HALF_EXTENT: i32 = 256;
const MIN_DAY_LENGTH_MS: f32 = 1_000.0;
const MAX_DAY_LENGTH_MS: f32 = 3_600_000.0;
const MIN_SPAWN_INTERVAL_MS: f32 = 100.0;
const MAX_SPAWN_INTERVAL_MS: f32 = 600_000.0;
const MIN_MOUSE_SENSITIVITY: f32 = 0.0001;
const MAX_MOUSE_SENSITIVITY: f32 = 0.05;
const MIN_REACH: f32 = 1.0;
const MAX_REACH: f32 = 512.0;
const MIN_FRAME_RATE: u32 = 1;
const MAX_FRAME_RATE: u32 = 240;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    #[serde(default = "default_world_half_extent")]
    pub world_half_extent: i32,
    #[serde(default = "default_day_length_ms")]
    pub day_length_ms: f32,
    #[serde(default = "default_mob_spawn_interval_ms")]
    pub mob_spawn_interval_ms: f32,
    #[serde(default = "default_max_mobs")]
    pub max_mobs: usize,
    #[serde(default = "default_mouse_sensitivity")]
    pub mouse_sensitivity: f32,
    #[serde(default = "default_reach")]
    pub reach: f32,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Sent as the `user-id` header. Persistence is skipped while unset.
    #[serde(default)]
    pub user_id: Option<u64>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            world_half_extent: default_world_half_extent(),
            day_length_ms: default_day_length_ms(),
            mob_spawn_interval_ms: default_mob_spawn_interval_ms(),
            max_mobs: default_max_mobs(),
            mouse_sensitivity: default_mouse_sensitivity(),
            reach: default_reach(),
            frame_rate: default_frame_rate(),
            api_base_url: default_api_base_url(),
            user_id: None,
        }
    }
}

impl GameSettings {
    pub fn sanitize(mut self) -> Self {
        self.day_length_ms = finite_or(self.day_length_ms, default_day_length_ms);
        self.mob_spawn_interval_ms =
            finite_or(self.mob_spawn_interval_ms, default_mob_spawn_interval_ms);
        self.mouse_sensitivity = finite_or(self.mouse_sensitivity, default_mouse_sensitivity);
        self.reach = finite_or(self.reach, default_reach);

        self.world_half_extent = self.world_half_extent.clamp(MIN_HALF_EXTENT, MAX_HALF_EXTENT);
        self.day_length_ms = self.day_length_ms.clamp(MIN_DAY_LENGTH_MS, MAX_DAY_LENGTH_MS);
        self.mob_spawn_interval_ms = self
            .mob_spawn_interval_ms
            .clamp(MIN_SPAWN_INTERVAL_MS, MAX_SPAWN_INTERVAL_MS);
        self.max_mobs = self.max_mobs.min(MOB_MAX_COUNT);
        self.mouse_sensitivity = self
            .mouse_sensitivity
            .clamp(MIN_MOUSE_SENSITIVITY, MAX_MOUSE_SENSITIVITY);
        self.reach = self.reach.clamp(MIN_REACH, MAX_REACH);
        self.frame_rate = self.frame_rate.clamp(MIN_FRAME_RATE, MAX_FRAME_RATE);
        let trimmed = self.api_base_url.trim().trim_end_matches('/');
        self.api_base_url = if trimmed.is_empty() {
            default_api_base_url()
        } else {
            trimmed.to_string()
        };
        self
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let parsed = toml::from_str::<Self>(&contents).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to deserialize settings: {e}"),
            )
        })?;
        Ok(parsed.sanitize())
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let settings = self.clone().sanitize();
        let serialized = toml::to_string_pretty(&settings).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to serialize settings: {e}"),
            )
        })?;
        fs::write(path, serialized)
    }
}

pub fn load_or_create_settings(path: &Path) -> GameSettings {
    match GameSettings::load(path) {
        Ok(settings) => settings,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let settings = GameSettings::default();
            if let Err(save_err) = settings.save(path) {
                warn!(
                    "Failed to create default settings at {}: {save_err}",
                    path.display()
                );
            }
            settings
        }
        Err(err) => {
            warn!("Failed to load settings from {}: {err}", path.display());
            let settings = GameSettings::default();
            if let Err(save_err) = settings.save(path) {
                warn!(
                    "Failed to overwrite settings at {}: {save_err}",
                    path.display()
                );
            }
            settings
        }
    }
}

// clamp() passes NaN through, so non-finite values go back to their default.
fn finite_or(value: f32, default: fn() -> f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        default()
    }
}

fn default_world_half_extent() -> i32 {
    DEFAULT_HALF_EXTENT
}

fn default_day_length_ms() -> f32 {
    DEFAULT_DAY_LENGTH_MS
}

fn default_mob_spawn_interval_ms() -> f32 {
    MOB_SPAWN_INTERVAL_MS
}

fn default_max_mobs() -> usize {
    MOB_MAX_COUNT
}

fn default_mouse_sensitivity() -> f32 {
    DEFAULT_MOUSE_SENSITIVITY
}

fn default_reach() -> f32 {
    DEFAULT_REACH
}

fn default_frame_rate() -> u32 {
    60
}

fn default_api_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::{load_or_create_settings, GameSettings};

    fn scratch_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("cubekin-settings-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).expect("create scratch dir");
        dir.join("settings.toml")
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let path = scratch_path("missing");
        let _ = fs::remove_file(&path);

        let settings = load_or_create_settings(&path);
        assert_eq!(settings, GameSettings::default());
        assert!(path.exists());
        assert_eq!(GameSettings::load(&path).expect("reload"), settings);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let path = scratch_path("partial");
        fs::write(&path, "world_half_extent = 20\nuser_id = 7\n").expect("write settings");

        let settings = load_or_create_settings(&path);
        assert_eq!(settings.world_half_extent, 20);
        assert_eq!(settings.user_id, Some(7));
        assert_eq!(settings.max_mobs, 20);
        assert_eq!(settings.day_length_ms, 120_000.0);
    }

    #[test]
    fn invalid_file_falls_back_and_is_rewritten() {
        let path = scratch_path("invalid");
        fs::write(&path, "world_half_extent = \"wide\"").expect("write settings");

        let settings = load_or_create_settings(&path);
        assert_eq!(settings, GameSettings::default());
        assert!(GameSettings::load(&path).is_ok());
    }

    #[test]
    fn sanitize_clamps_out_of_range_values() {
        let settings = GameSettings {
            world_half_extent: -4,
            max_mobs: 99,
            frame_rate: 0,
            api_base_url: "http://example.test/api/".to_string(),
            ..GameSettings::default()
        }
        .sanitize();

        assert_eq!(settings.world_half_extent, 1);
        assert_eq!(settings.max_mobs, 20);
        assert_eq!(settings.frame_rate, 1);
        assert_eq!(settings.api_base_url, "http://example.test/api");
    }

    #[test]
    fn sanitize_replaces_non_finite_floats_with_defaults() {
        let settings = GameSettings {
            day_length_ms: f32::NAN,
            mob_spawn_interval_ms: f32::INFINITY,
            mouse_sensitivity: f32::NAN,
            reach: f32::NEG_INFINITY,
            ..GameSettings::default()
        }
        .sanitize();

        let defaults = GameSettings::default();
        assert_eq!(settings.day_length_ms, defaults.day_length_ms);
        assert_eq!(settings.mob_spawn_interval_ms, defaults.mob_spawn_interval_ms);
        assert_eq!(settings.mouse_sensitivity, defaults.mouse_sensitivity);
        assert_eq!(settings.reach, defaults.reach);
    }

    #[test]
    fn nan_in_file_loads_as_default() {
        let path = scratch_path("nan");
        fs::write(&path, "mouse_sensitivity = nan\nreach = inf\n").expect("write settings");

        let settings = load_or_create_settings(&path);
        assert_eq!(settings.mouse_sensitivity, GameSettings::default().mouse_sensitivity);
        assert_eq!(settings.reach, GameSettings::default().reach);
    }
}
