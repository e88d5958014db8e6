use crate::gfx::anim::EasingKind;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_sprite_path")]
    pub sprite_path: PathBuf,

    #[serde(default = "default_shaders_dir")]
    pub shaders_dir: PathBuf,

    /// Upper bound on frames per second while shown; 0 renders as fast as
    /// the event loop allows.
    #[serde(default)]
    pub fps_cap: u32,

    #[serde(default)]
    pub start_visible: bool,

    #[serde(default = "default_sounds")]
    pub sounds: Sounds,

    #[serde(default = "default_animation")]
    pub animation: Animation,

    #[serde(default = "default_zoom")]
    pub zoom: Zoom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sounds {
    pub player: String,
    pub press: Option<PathBuf>,
    pub drag: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animation {
    pub duration: f32,
    /// Angle while pressed, in degrees.
    pub start: f32,
    /// Resting angle, in degrees.
    pub target: f32,
    pub easing: EasingKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zoom {
    pub initial: f32,
    pub step: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sprite_path: default_sprite_path(),
            shaders_dir: default_shaders_dir(),
            fps_cap: 0,
            start_visible: false,
            sounds: default_sounds(),
            animation: default_animation(),
            zoom: default_zoom(),
        }
    }
}

fn default_sprite_path() -> PathBuf {
    PathBuf::from("assets/pointer.png")
}

fn default_shaders_dir() -> PathBuf {
    PathBuf::from("assets/shaders")
}

fn default_sounds() -> Sounds {
    Sounds {
        player: "paplay".to_string(),
        press: Some(PathBuf::from("assets/press.wav")),
        drag: Some(PathBuf::from("assets/drag.wav")),
    }
}

fn default_animation() -> Animation {
    Animation {
        duration: 0.25,
        start: -45.0,
        target: 0.0,
        easing: EasingKind::EaseOutCirc,
    }
}

fn default_zoom() -> Zoom {
    Zoom {
        initial: 1.0,
        step: 0.05,
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join("fingerpoint").join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            Self::parse(&contents)
        } else {
            let config = Config::default();
            if let Err(e) = config.save() {
                log::warn!("Could not write default config: {}", e);
            }
            Ok(config)
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::path()?;
        if let Some(dir) = config_path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.animation.duration, 0.25);
        assert_eq!(config.animation.start, -45.0);
        assert_eq!(config.animation.target, 0.0);
        assert_eq!(config.animation.easing, EasingKind::EaseOutCirc);
        assert_eq!(config.zoom.initial, 1.0);
        assert_eq!(config.zoom.step, 0.05);
        assert_eq!(config.fps_cap, 0);
        assert!(!config.start_visible);
        assert_eq!(config.sounds.player, "paplay");
    }

    #[test]
    fn partial_sections_override() {
        let config = Config::parse(
            r#"
            fps_cap = 120
            sprite_path = "/usr/share/fingerpoint/hand.png"

            [animation]
            duration = 0.5
            start = -30.0
            target = 5.0
            easing = "linear"

            [sounds]
            player = "pw-play"
            "#,
        )
        .unwrap();

        assert_eq!(config.fps_cap, 120);
        assert_eq!(config.sprite_path, PathBuf::from("/usr/share/fingerpoint/hand.png"));
        assert_eq!(config.animation.easing, EasingKind::Linear);
        assert_eq!(config.animation.start, -30.0);
        assert_eq!(config.sounds.player, "pw-play");
        assert!(config.sounds.press.is_none());
        assert_eq!(config.zoom.step, 0.05);
    }

    #[test]
    fn malformed_file_is_rejected() {
        assert!(Config::parse("fps_cap = \"fast\"").is_err());
        assert!(Config::parse("[animation]\nduration = 1.0").is_err());
    }

    #[test]
    fn serialized_defaults_parse_back() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let config = Config::parse(&text).unwrap();
        assert_eq!(config.animation.easing, EasingKind::EaseOutCirc);
        assert_eq!(config.sounds.drag, Some(PathBuf::from("assets/drag.wav")));
    }
}
