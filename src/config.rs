use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    clock::hour_cycle::HourCyclePreference,
    foundation::{
        core::Size,
        error::{NixieError, NixieResult},
    },
    layout::{container::Container, engine::PowerState},
    render::{backend::RenderSettings, text::FontSource},
};

/// Bundle directory used when none is configured.
pub const DEFAULT_ASSET_DIR: &str = "assets";

/// Largest width or height a frame may have.
pub const MAX_DIMENSION: u32 = u16::MAX as u32;

/// User settings for rendering the face.
///
/// Layered as: defaults, then a JSON file, then `NIXIE_*` environment variables, then
/// command-line flags.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NixieConfig {
    pub container: Container,
    pub hour_cycle: HourCyclePreference,
    /// Container width override, in pixels.
    pub width: Option<u32>,
    /// Container height override, in pixels.
    pub height: Option<u32>,
    /// Directory holding the `*.png` bundle.
    pub assets: Option<PathBuf>,
    /// Font for the AM/PM overlay and placeholder text; the system sans-serif when unset.
    pub font: Option<PathBuf>,
    /// Straight RGBA8 background.
    pub background: [u8; 4],
    /// Straight RGBA8 text color.
    pub text_color: [u8; 4],
    pub power: PowerState,
}

impl Default for NixieConfig {
    fn default() -> Self {
        Self {
            container: Container::default(),
            hour_cycle: HourCyclePreference::default(),
            width: None,
            height: None,
            assets: None,
            font: None,
            background: [0, 0, 0, 255],
            text_color: [255, 214, 170, 255],
            power: PowerState::default(),
        }
    }
}

impl NixieConfig {
    pub fn from_json_str(json: &str) -> NixieResult<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| NixieError::config(format!("invalid config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and validate a JSON settings file.
    pub fn load(path: &Path) -> NixieResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&json)
            .map_err(|e| NixieError::config(format!("{}: {e}", path.display())))
    }

    /// Apply `NIXIE_ASSETS`, `NIXIE_HOUR_CYCLE`, `NIXIE_CONTAINER` and `NIXIE_FONT` from the
    /// process environment.
    pub fn apply_env(&mut self) -> NixieResult<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides read through `lookup`. Empty values are ignored.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> NixieResult<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("NIXIE_ASSETS") {
            self.assets = Some(PathBuf::from(v));
        }
        if let Some(v) = get("NIXIE_HOUR_CYCLE") {
            self.hour_cycle = v.parse()?;
        }
        if let Some(v) = get("NIXIE_CONTAINER") {
            self.container = v.parse()?;
        }
        if let Some(v) = get("NIXIE_FONT") {
            self.font = Some(PathBuf::from(v));
        }
        self.validate()
    }

    pub fn validate(&self) -> NixieResult<()> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            match value {
                Some(0) => {
                    return Err(NixieError::config(format!("{name} must be > 0")));
                }
                Some(v) if v > MAX_DIMENSION => {
                    return Err(NixieError::config(format!(
                        "{name} must be <= {MAX_DIMENSION}, got {v}"
                    )));
                }
                _ => {}
            }
        }
        if self.height.is_some() && self.width.is_none() {
            return Err(NixieError::config("height override requires a width"));
        }
        Ok(())
    }

    /// Container size from the overrides, falling back to the container's natural size.
    pub fn container_size(&self) -> Size {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Size::new(f64::from(w), f64::from(h)),
            (Some(w), None) => self.container.natural_size(f64::from(w)),
            _ => self.container.default_size(),
        }
    }

    pub fn asset_dir(&self) -> PathBuf {
        self.assets
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSET_DIR))
    }

    pub fn font_source(&self) -> FontSource {
        match &self.font {
            Some(path) => FontSource::File(path.clone()),
            None => FontSource::System,
        }
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            clear_rgba: Some(self.background),
            text_rgba: Some(self.text_color),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
