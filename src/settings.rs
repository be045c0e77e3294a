//! Game settings and preferences
//!
//! Persisted separately from leaderboard data in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::sim::MAX_PARTICLES;

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // === Gameplay ===
    /// Snap the landing to the hit cell's center while aiming
    pub aim_assist: bool,

    // === Visual Effects ===
    /// Screen shake on explosions
    pub screen_shake: bool,
    /// Particle effects (dust, debris, confetti)
    pub particles: bool,
    /// Projectile trail
    pub trails: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Accessibility ===
    /// Reduced motion (minimize shake, flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            aim_assist: true,

            screen_shake: true,
            particles: true,
            trails: true,

            show_fps: false,

            master_volume: 0.8,
            sfx_volume: 1.0,
            mute_on_blur: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles { 0 } else { MAX_PARTICLES }
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "sling_sweeper_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.aim_assist);
        assert!(settings.effective_screen_shake());
        assert_eq!(settings.max_particles(), MAX_PARTICLES);
    }

    #[test]
    fn test_reduced_motion_suppresses_shake() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert!(settings.screen_shake);
        assert!(!settings.effective_screen_shake());
    }

    #[test]
    fn test_particles_off_zeroes_cap() {
        let settings = Settings {
            particles: false,
            ..Default::default()
        };
        assert_eq!(settings.max_particles(), 0);
    }

    #[test]
    fn test_serde_round_trip() {
        let settings = Settings {
            aim_assist: false,
            master_volume: 0.3,
            ..Default::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert!(!back.aim_assist);
        assert_eq!(back.master_volume, 0.3);
    }
}
