//! # Application Configuration
//!
//! All settings the demo and the renderer read at startup, grouped by
//! subsystem. Every section has defaults so a missing or partial file still
//! produces a runnable configuration.

use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError};

/// Window creation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial width in screen coordinates
    pub width: u32,
    /// Initial height in screen coordinates
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Vulkan Point Lights".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// # Vulkan Renderer Configuration
///
/// Settings consumed when creating the Vulkan context and the swapchain pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Application name for Vulkan instance creation
    pub application_name: String,
    /// Whether to enable Vulkan validation layers (debug builds only).
    /// `None` enables them whenever debug assertions are on.
    pub enable_validation: Option<bool>,
    /// Background color the swapchain pass clears to
    pub clear_color: [f32; 4],
    /// Directory holding the compiled `<name>.vert.spv` / `<name>.frag.spv` files
    pub shader_dir: String,
}

impl RendererConfig {
    /// Resolve the validation toggle against the build profile
    pub fn validation_enabled(&self) -> bool {
        self.enable_validation.unwrap_or(cfg!(debug_assertions)) && cfg!(debug_assertions)
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            application_name: "Vase Demo".to_string(),
            enable_validation: None,
            clear_color: [0.01, 0.01, 0.01, 1.0],
            shader_dir: "shaders".to_string(),
        }
    }
}

/// Frame loop timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Upper bound for the elapsed time of one frame, in seconds
    pub max_frame_time: f32,
    /// Angular speed of the point lights around the vertical axis, in radians per second
    pub light_rotation_speed: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_time: 1.0 / 60.0,
            light_rotation_speed: 0.5,
        }
    }
}

/// Camera projection and start position
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane distance
    pub near: f32,
    /// Far clipping plane distance
    pub far: f32,
    /// Initial viewer position
    pub start_position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 50.0,
            near: 0.1,
            far: 100.0,
            start_position: [0.0, 0.0, -2.5],
        }
    }
}

/// Logging setup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `env_logger` filter string, e.g. `info` or `frame_engine=debug`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration that encompasses all subsystems.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Window settings
    pub window: WindowConfig,
    /// Renderer settings
    pub renderer: RendererConfig,
    /// Frame loop settings
    pub frame: FrameConfig,
    /// Camera settings
    pub camera: CameraConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl ApplicationConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if self.frame.max_frame_time <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "max_frame_time must be positive, got {}",
                self.frame.max_frame_time
            )));
        }
        if self.camera.near <= 0.0 || self.camera.far <= self.camera.near {
            return Err(ConfigError::Invalid(format!(
                "clip planes must satisfy 0 < near < far, got near={} far={}",
                self.camera.near, self.camera.far
            )));
        }
        if !(0.0..180.0).contains(&self.camera.fov_degrees) || self.camera.fov_degrees == 0.0 {
            return Err(ConfigError::Invalid(format!(
                "fov_degrees must be in (0, 180), got {}",
                self.camera.fov_degrees
            )));
        }
        Ok(())
    }
}

impl Config for ApplicationConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ApplicationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.renderer.shader_dir, "shaders");
        assert!((config.frame.light_rotation_speed - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ApplicationConfig = toml::from_str(
            r#"
            [window]
            width = 1280

            [frame]
            light_rotation_speed = 1.0
            "#,
        )
        .unwrap();

        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 600);
        assert!((config.frame.light_rotation_speed - 1.0).abs() < f32::EPSILON);
        assert!((config.frame.max_frame_time - 1.0 / 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut config = ApplicationConfig::default();
        config.window.height = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_inverted_clip_planes_rejected() {
        let mut config = ApplicationConfig::default();
        config.camera.near = 10.0;
        config.camera.far = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ron_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("frame_engine_config_{}.ron", std::process::id()));
        let mut config = ApplicationConfig::default();
        config.logging.level = "debug".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = ApplicationConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.logging.level, "debug");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let result = ApplicationConfig::load_from_file("settings.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
