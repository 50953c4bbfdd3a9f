//! Color theme and the persisted theme preference.
//!
//! The preference is the only state slidesync writes to disk: a single
//! `theme = "light" | "dark"` entry in `$XDG_STATE_HOME/slidesync/prefs.toml`.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use crossterm::style::Color;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette {
                fg: Color::Rgb { r: 0xcd, g: 0xd6, b: 0xf4 },
                bg: Color::Rgb { r: 0x1e, g: 0x1e, b: 0x2e },
                heading: Color::Rgb { r: 0x89, g: 0xb4, b: 0xfa },
                muted: Color::Rgb { r: 0x6c, g: 0x70, b: 0x86 },
                accent: Color::Rgb { r: 0xa6, g: 0xe3, b: 0xa1 },
                bar_bg: Color::Rgb { r: 0x31, g: 0x32, b: 0x44 },
            },
            Theme::Light => Palette {
                fg: Color::Rgb { r: 0x4c, g: 0x4f, b: 0x69 },
                bg: Color::Rgb { r: 0xef, g: 0xf1, b: 0xf5 },
                heading: Color::Rgb { r: 0x1e, g: 0x66, b: 0xf5 },
                muted: Color::Rgb { r: 0x9c, g: 0xa0, b: 0xb0 },
                accent: Color::Rgb { r: 0x40, g: 0xa0, b: 0x2b },
                bar_bg: Color::Rgb { r: 0xcc, g: 0xd0, b: 0xda },
            },
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub heading: Color,
    pub muted: Color,
    pub accent: Color,
    pub bar_bg: Color,
}

#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
struct PrefsFile {
    theme: Option<Theme>,
}

/// Location of the preference file.
pub fn prefs_path() -> Option<PathBuf> {
    let state_dir = std::env::var_os("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local").join("state")))?;
    Some(state_dir.join("slidesync").join("prefs.toml"))
}

/// Read the stored theme. Missing or unreadable files yield `None`.
pub fn load_preference(path: &Path) -> Option<Theme> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("prefs: {} not found", path.display());
            return None;
        }
        Err(e) => {
            warn!("prefs: failed to read {}: {e}", path.display());
            return None;
        }
    };
    match toml::from_str::<PrefsFile>(&text) {
        Ok(prefs) => {
            info!("prefs: loaded theme={:?} from {}", prefs.theme, path.display());
            prefs.theme
        }
        Err(e) => {
            warn!("prefs: ignoring unparsable {}: {e}", path.display());
            None
        }
    }
}

pub fn store_preference(path: &Path, theme: Theme) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let text = toml::to_string(&PrefsFile { theme: Some(theme) })?;
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    debug!("prefs: stored theme={theme} to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_prefs(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("slidesync-test-{}-{name}", std::process::id()))
            .join("prefs.toml")
    }

    #[test]
    fn toggle_flips() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled().toggled(), Theme::Light);
    }

    #[test]
    fn default_is_dark() {
        assert_eq!(Theme::default(), Theme::Dark);
        assert_eq!(Theme::default().to_string(), "dark");
    }

    #[test]
    fn store_then_load() {
        let path = temp_prefs("roundtrip");
        store_preference(&path, Theme::Light).unwrap();
        assert_eq!(load_preference(&path), Some(Theme::Light));
        store_preference(&path, Theme::Dark).unwrap();
        assert_eq!(load_preference(&path), Some(Theme::Dark));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_is_none() {
        assert_eq!(load_preference(&temp_prefs("missing")), None);
    }

    #[test]
    fn garbage_file_is_none() {
        let path = temp_prefs("garbage");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "theme = \"sepia\"").unwrap();
        assert_eq!(load_preference(&path), None);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
