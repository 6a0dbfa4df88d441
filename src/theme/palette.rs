//! Named background colors a user can pick for code blocks.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crossterm::style::{Color, SetBackgroundColor};
use serde::Deserialize;

use crate::highlight::HighlightBackground;

#[derive(Debug, thiserror::Error)]
pub enum PaletteError {
    #[error("failed to read palette {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid palette json")]
    Json(#[from] serde_json::Error),
    #[error("palette color `{key}` has invalid value `{value}` (expected #rrggbb or 0-255)")]
    InvalidColor { key: String, value: String },
}

/// A named set of background colors, addressed by key (e.g. `codeBg`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    name: String,
    backgrounds: BTreeMap<String, Color>,
}

#[derive(Deserialize)]
struct PaletteFile {
    name: String,
    #[serde(default)]
    backgrounds: BTreeMap<String, ColorValue>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorValue {
    Index(u8),
    Hex(String),
}

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

impl Palette {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backgrounds: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_background(mut self, key: impl Into<String>, color: Color) -> Self {
        self.backgrounds.insert(key.into(), color);
        self
    }

    pub fn dark() -> Self {
        Self::new("dark")
            .with_background("codeBg", rgb(0x1e, 0x22, 0x2a))
            .with_background("selectedBg", rgb(0x3a, 0x3d, 0x4a))
            .with_background("panelBg", rgb(0x28, 0x2c, 0x34))
            .with_background("mutedBg", Color::AnsiValue(236))
            .with_background("successBg", rgb(0x1f, 0x33, 0x24))
            .with_background("errorBg", rgb(0x3c, 0x1f, 0x22))
    }

    pub fn light() -> Self {
        Self::new("light")
            .with_background("codeBg", rgb(0xf3, 0xf4, 0xf6))
            .with_background("selectedBg", rgb(0xdd, 0xe3, 0xee))
            .with_background("panelBg", rgb(0xee, 0xf0, 0xf3))
            .with_background("mutedBg", Color::AnsiValue(254))
            .with_background("successBg", rgb(0xe3, 0xf4, 0xe6))
            .with_background("errorBg", rgb(0xfb, 0xe4, 0xe6))
    }

    pub fn for_background(mode: HighlightBackground) -> Self {
        match mode {
            HighlightBackground::Light => Self::light(),
            HighlightBackground::Dark => Self::dark(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.backgrounds.keys().map(String::as_str)
    }

    pub fn background(&self, key: &str) -> Option<Color> {
        self.backgrounds.get(key).copied()
    }

    /// Raw SGR background introducer for `key`, e.g. `ESC[48;2;30;34;42m`.
    ///
    /// Empty when crossterm suppresses color (`NO_COLOR`), which reads as no
    /// background.
    pub fn background_ansi(&self, key: &str) -> Option<String> {
        let ansi = SetBackgroundColor(self.background(key)?).to_string();
        Some(ansi).filter(|ansi| !ansi.is_empty())
    }

    pub fn from_json(json: &str) -> Result<Self, PaletteError> {
        let file: PaletteFile = serde_json::from_str(json)?;
        let mut palette = Self::new(file.name);
        for (key, value) in file.backgrounds {
            let color = match value {
                ColorValue::Index(index) => Color::AnsiValue(index),
                ColorValue::Hex(hex) => {
                    parse_hex(&hex).ok_or_else(|| PaletteError::InvalidColor {
                        key: key.clone(),
                        value: hex.clone(),
                    })?
                }
            };
            palette.backgrounds.insert(key, color);
        }
        Ok(palette)
    }

    pub fn load(path: &Path) -> Result<Self, PaletteError> {
        let json = std::fs::read_to_string(path).map_err(|source| PaletteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

fn parse_hex(value: &str) -> Option<Color> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
