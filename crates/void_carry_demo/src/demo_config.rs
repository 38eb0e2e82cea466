//! Demo Configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables: `VOID_CARRY_FIX=change_layer`, `VOID_CARRY_FRAMES=600`
//! 2. Config file: the path in `VOID_CARRY_CONFIG`, else `./carry.toml`
//! 3. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! frames = 600
//! ignore_layers = [[2, 5]]   # props pass through the environment
//!
//! [carry]
//! collision_fix = "make_kinematic"
//! pickup_range = 3.5
//! release_distance = 7.0
//!
//! [physics]
//! gravity = [0.0, -9.81, 0.0]
//! timestep = 0.016666668
//! ```

use serde::{Deserialize, Serialize};
use void_carry::{CarryConfig, CollisionFix};
use void_carry_physics::{CollisionLayer, CollisionMatrix, PhysicsConfig};

/// Environment variable naming the config file
pub const CONFIG_PATH_VAR: &str = "VOID_CARRY_CONFIG";
/// Environment variable overriding the collision fix
pub const FIX_VAR: &str = "VOID_CARRY_FIX";
/// Environment variable overriding the number of simulated frames
pub const FRAMES_VAR: &str = "VOID_CARRY_FRAMES";

const DEFAULT_CONFIG_FILE: &str = "carry.toml";

/// Complete demo configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of frames to simulate
    pub frames: u32,
    /// Carry controller tuning
    pub carry: CarryConfig,
    /// Rapier world settings
    pub physics: PhysicsConfig,
    /// Extra layer pairs that never collide, on top of the default rules
    pub ignore_layers: Vec<(u32, u32)>,
    /// Where the configuration was loaded from
    #[serde(skip)]
    pub config_path: Option<String>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frames: 420,
            carry: CarryConfig::default(),
            physics: PhysicsConfig::default(),
            ignore_layers: Vec::new(),
            config_path: None,
        }
    }
}

impl DemoConfig {
    /// Load configuration from all sources
    pub fn load() -> Self {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let mut config = match Self::load_from_file(&path) {
            Ok(mut loaded) => {
                log::info!("Loaded carry config from {}", path);
                loaded.config_path = Some(path);
                loaded
            }
            Err(err) => {
                if std::path::Path::new(&path).exists() {
                    log::warn!("Ignoring {}: {}", path, err);
                } else {
                    log::debug!("No config file at {}; using defaults", path);
                }
                Self::default()
            }
        };

        config.apply_overrides(
            std::env::var(FIX_VAR).ok().as_deref(),
            std::env::var(FRAMES_VAR).ok().as_deref(),
        );
        config
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(toml::from_str(content)?)
    }

    /// Apply the environment overrides. Unparsable values are reported and skipped.
    pub fn apply_overrides(&mut self, fix: Option<&str>, frames: Option<&str>) {
        if let Some(fix) = fix {
            match fix.parse::<CollisionFix>() {
                Ok(fix) => {
                    self.carry.collision_fix = fix;
                    log::info!("Collision fix from env: {}", fix);
                }
                Err(err) => log::warn!("{}: {}", FIX_VAR, err),
            }
        }

        if let Some(frames) = frames {
            match frames.trim().parse() {
                Ok(frames) => self.frames = frames,
                Err(_) => log::warn!("{}: not a frame count: {:?}", FRAMES_VAR, frames),
            }
        }
    }

    /// Check both halves of the configuration
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.carry.validate()?;
        self.physics.validate()?;
        Ok(())
    }

    /// Layer rules for the demo world
    pub fn collision_matrix(&self) -> CollisionMatrix {
        let mut matrix = CollisionMatrix::default();
        for &(a, b) in &self.ignore_layers {
            matrix.ignore_pair(CollisionLayer(a), CollisionLayer(b));
        }
        matrix
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        log::info!("Carry demo configuration:");
        log::info!(
            "  Source:          {}",
            self.config_path.as_deref().unwrap_or("defaults")
        );
        log::info!("  Frames:          {}", self.frames);
        log::info!("  Collision fix:   {}", self.carry.collision_fix);
        log::info!(
            "  Pickup range:    {:.2} (release at {:.2})",
            self.carry.pickup_range,
            self.carry.release_distance
        );
        log::info!("  Max carry mass:  {:.1}", self.carry.max_carry_mass);
        log::info!("  Timestep:        {:.4}s", self.physics.timestep);
    }
}
