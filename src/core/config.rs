//! Configuration and settings module.
//!
//! Persistent settings: the journal directory override, the view
//! preferences restored on startup, and the orrery color scheme. Saved
//! as JSON in the user's config directory; any load failure silently
//! falls back to defaults.

use eframe::egui::Color32;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use tracing::warn;

/// Settings filename for persistence.
const SETTINGS_FILENAME: &str = "config.json";

/// Minimum allowed zoom factor.
pub const MIN_ZOOM: f32 = 0.05;

/// Maximum allowed zoom factor.
pub const MAX_ZOOM: f32 = 200.0;

/// Color scheme for the orrery canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSettings {
    /// Canvas background color
    pub background: [u8; 3],
    /// Orbit circle color
    pub orbit: [u8; 3],
    /// Star body color
    pub star: [u8; 3],
    /// Planet body color
    pub planet: [u8; 3],
    /// Moon body color
    pub moon: [u8; 3],
    /// Body name label color
    pub label: [u8; 3],
    /// Selected body highlight color
    pub selection: [u8; 3],
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            background: [0, 0, 0],      // Black, like the void
            orbit: [60, 60, 70],        // Dim gray
            star: [255, 200, 100],      // Warm yellow
            planet: [100, 160, 220],    // Blue
            moon: [170, 170, 170],      // Gray
            label: [200, 200, 200],     // Light gray
            selection: [255, 255, 255], // White ring
        }
    }
}

impl ColorSettings {
    /// Convert a color array to egui Color32.
    #[inline]
    pub fn to_color32(color: [u8; 3]) -> Color32 {
        Color32::from_rgb(color[0], color[1], color[2])
    }

    pub fn background_color(&self) -> Color32 {
        Self::to_color32(self.background)
    }

    pub fn orbit_color(&self) -> Color32 {
        Self::to_color32(self.orbit)
    }

    pub fn star_color(&self) -> Color32 {
        Self::to_color32(self.star)
    }

    pub fn planet_color(&self) -> Color32 {
        Self::to_color32(self.planet)
    }

    pub fn moon_color(&self) -> Color32 {
        Self::to_color32(self.moon)
    }

    pub fn label_color(&self) -> Color32 {
        Self::to_color32(self.label)
    }

    pub fn selection_color(&self) -> Color32 {
        Self::to_color32(self.selection)
    }
}

/// Application settings persisted between sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Orrery color scheme.
    #[serde(default)]
    pub colors: ColorSettings,

    /// Journal directory override. None means the platform default.
    #[serde(default)]
    pub journal_dir: Option<PathBuf>,

    /// Whether orbit animation runs on startup.
    #[serde(default = "default_animate")]
    pub animate: bool,

    /// Zoom factor restored on startup.
    #[serde(default = "default_zoom")]
    pub zoom: f32,
}

fn default_animate() -> bool {
    true
}

fn default_zoom() -> f32 {
    1.0
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            colors: ColorSettings::default(),
            journal_dir: None,
            animate: default_animate(),
            zoom: default_zoom(),
        }
    }
}

impl AppSettings {
    /// Get the settings file path in the user's config directory.
    fn get_settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("orrery-viewer");
            path.push(SETTINGS_FILENAME);
            path
        })
    }

    /// Load settings from disk, returning defaults if loading fails.
    pub fn load() -> Self {
        Self::get_settings_path()
            .and_then(|path| std::fs::read_to_string(&path).ok())
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Save settings to disk. Failures are logged, never fatal.
    pub fn save(&self) {
        let Some(path) = Self::get_settings_path() else {
            warn!("could not determine config directory, settings not saved");
            return;
        };
        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(error = %e, "failed to create config directory");
            return;
        }
        match serde_json::to_string_pretty(self) {
            Ok(content) => {
                if let Err(e) = std::fs::write(&path, content) {
                    warn!(error = %e, path = %path.display(), "failed to write settings");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize settings"),
        }
    }

    /// The journal directory to watch: the override if set, otherwise
    /// the platform default.
    pub fn effective_journal_dir(&self) -> PathBuf {
        self.journal_dir.clone().unwrap_or_else(default_journal_dir)
    }

    /// Get the zoom factor, clamped to the valid range.
    pub fn get_zoom(&self) -> f32 {
        self.zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    }

    /// Set the zoom factor, clamped to the valid range.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }
}

/// The game's default journal location: the "Saved Games" tree under the
/// user's home directory, falling back to the home directory itself.
pub fn default_journal_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| {
            home.join("Saved Games")
                .join("Frontier Developments")
                .join("Elite Dangerous")
        })
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_colors() {
        let colors = ColorSettings::default();
        assert_eq!(colors.background, [0, 0, 0]);
        assert_eq!(colors.star, [255, 200, 100]);
    }

    #[test]
    fn test_color32_conversion() {
        let color32 = ColorSettings::to_color32([255, 128, 64]);
        assert_eq!(color32, Color32::from_rgb(255, 128, 64));
    }

    #[test]
    fn test_app_settings_default() {
        let settings = AppSettings::default();
        assert!(settings.journal_dir.is_none());
        assert!(settings.animate);
        assert_eq!(settings.zoom, 1.0);
    }

    #[test]
    fn test_settings_serialization_round_trip() {
        let mut settings = AppSettings::default();
        settings.journal_dir = Some(PathBuf::from("/games/journals"));
        settings.animate = false;
        settings.set_zoom(3.5);

        let json = serde_json::to_string(&settings).unwrap();
        let restored: AppSettings = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.colors, settings.colors);
        assert_eq!(restored.journal_dir, Some(PathBuf::from("/games/journals")));
        assert!(!restored.animate);
        assert_eq!(restored.zoom, 3.5);
    }

    #[test]
    fn test_backward_compatible_deserialization() {
        // Old config files without the newer fields still load.
        let old_json = r#"{"colors":{"background":[0,0,0],"orbit":[60,60,70],"star":[255,200,100],"planet":[100,160,220],"moon":[170,170,170],"label":[200,200,200],"selection":[255,255,255]}}"#;
        let settings: AppSettings = serde_json::from_str(old_json).unwrap();
        assert!(settings.animate);
        assert_eq!(settings.zoom, 1.0);
        assert!(settings.journal_dir.is_none());
    }

    #[test]
    fn test_zoom_clamping() {
        let mut settings = AppSettings::default();
        settings.set_zoom(0.001);
        assert_eq!(settings.get_zoom(), MIN_ZOOM);
        settings.set_zoom(1.0e6);
        assert_eq!(settings.get_zoom(), MAX_ZOOM);
    }

    #[test]
    fn test_effective_journal_dir_prefers_override() {
        let mut settings = AppSettings::default();
        settings.journal_dir = Some(PathBuf::from("/custom"));
        assert_eq!(settings.effective_journal_dir(), PathBuf::from("/custom"));
    }

    #[test]
    fn test_default_journal_dir_is_not_empty() {
        let dir = default_journal_dir();
        assert!(!dir.as_os_str().is_empty());
    }
}
