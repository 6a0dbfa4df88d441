//! The active option bundle and partial overrides of it.

use crate::theme::Palette;

pub const MAX_CODE_INDENT: usize = 8;
pub const DEFAULT_CODE_INDENT: usize = 2;

/// A background key that the active palette does not define.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown code background `{key}` in palette `{palette}`")]
pub struct UnknownBackground {
    pub key: String,
    pub palette: String,
}

/// Rendering options in effect for one revision.
///
/// The background ANSI sequence is derived from the key and the palette;
/// both are set together through [`Options::set_code_background`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub unwrap_outer_fence: bool,
    pub hide_code_fences: bool,
    pub show_language_label: bool,
    pub strip_heading_prefixes: bool,
    pub block_list_items: bool,
    code_background_key: Option<String>,
    code_background_ansi: Option<String>,
    code_indent: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            unwrap_outer_fence: true,
            hide_code_fences: true,
            show_language_label: true,
            strip_heading_prefixes: true,
            block_list_items: true,
            code_background_key: None,
            code_background_ansi: None,
            code_indent: DEFAULT_CODE_INDENT,
        }
    }
}

impl Options {
    pub fn code_background_key(&self) -> Option<&str> {
        self.code_background_key.as_deref()
    }

    /// Raw SGR background introducer, when a background is active.
    pub fn code_background_ansi(&self) -> Option<&str> {
        self.code_background_ansi.as_deref()
    }

    pub const fn code_indent_width(&self) -> usize {
        self.code_indent
    }

    /// The code indent as a string of spaces.
    pub fn code_indent(&self) -> String {
        " ".repeat(self.code_indent)
    }

    /// Set the indent width. Out-of-range widths keep the current value
    /// and return `false`.
    pub const fn set_code_indent(&mut self, width: usize) -> bool {
        if width > MAX_CODE_INDENT {
            return false;
        }
        self.code_indent = width;
        true
    }

    /// Set (or clear) the background key and derive its ANSI sequence.
    ///
    /// When the palette has no such key, both key and sequence are cleared.
    pub fn set_code_background(
        &mut self,
        key: Option<&str>,
        palette: &Palette,
    ) -> Result<(), UnknownBackground> {
        self.code_background_key = key.map(ToString::to_string);
        self.refresh_code_background(palette)
    }

    /// Re-derive the background sequence after a palette change.
    pub fn refresh_code_background(&mut self, palette: &Palette) -> Result<(), UnknownBackground> {
        let Some(key) = self.code_background_key.as_deref() else {
            self.code_background_ansi = None;
            return Ok(());
        };
        if let Some(ansi) = palette.background_ansi(key) {
            self.code_background_ansi = Some(ansi);
            return Ok(());
        }
        let err = UnknownBackground {
            key: key.to_string(),
            palette: palette.name().to_string(),
        };
        self.code_background_key = None;
        self.code_background_ansi = None;
        Err(err)
    }

    #[must_use]
    pub fn with_code_indent(mut self, width: usize) -> Self {
        self.set_code_indent(width);
        self
    }

    /// Builder form of [`Options::set_code_background`]; an unknown key is
    /// logged and left unset.
    #[must_use]
    pub fn with_code_background(mut self, key: &str, palette: &Palette) -> Self {
        if let Err(err) = self.set_code_background(Some(key), palette) {
            tracing::warn!(%err, "code background ignored");
        }
        self
    }
}

/// Background choice as written by a user: a palette key, or off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundSetting {
    Off,
    Key(String),
}

impl BackgroundSetting {
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Off => None,
            Self::Key(key) => Some(key),
        }
    }
}

/// A partial set of options. Only fields that are `Some` override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    pub unwrap_outer_fence: Option<bool>,
    pub hide_code_fences: Option<bool>,
    pub show_language_label: Option<bool>,
    pub strip_heading_prefixes: Option<bool>,
    pub block_list_items: Option<bool>,
    pub code_background: Option<BackgroundSetting>,
    pub code_indent: Option<usize>,
}

/// Settings stored in the session log.
pub type PersistedSettings = OptionOverrides;

impl OptionOverrides {
    /// Merge two layers; fields set in `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            unwrap_outer_fence: other.unwrap_outer_fence.or(self.unwrap_outer_fence),
            hide_code_fences: other.hide_code_fences.or(self.hide_code_fences),
            show_language_label: other.show_language_label.or(self.show_language_label),
            strip_heading_prefixes: other.strip_heading_prefixes.or(self.strip_heading_prefixes),
            block_list_items: other.block_list_items.or(self.block_list_items),
            code_background: other
                .code_background
                .clone()
                .or_else(|| self.code_background.clone()),
            code_indent: other.code_indent.or(self.code_indent),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Full snapshot of `options`, every field present.
    pub fn snapshot(options: &Options) -> Self {
        Self {
            unwrap_outer_fence: Some(options.unwrap_outer_fence),
            hide_code_fences: Some(options.hide_code_fences),
            show_language_label: Some(options.show_language_label),
            strip_heading_prefixes: Some(options.strip_heading_prefixes),
            block_list_items: Some(options.block_list_items),
            code_background: Some(
                options
                    .code_background_key()
                    .map_or(BackgroundSetting::Off, |key| {
                        BackgroundSetting::Key(key.to_string())
                    }),
            ),
            code_indent: Some(options.code_indent_width()),
        }
    }

    /// Write the present fields into `options`.
    pub fn apply(&self, options: &mut Options, palette: &Palette) -> Result<(), UnknownBackground> {
        if let Some(value) = self.unwrap_outer_fence {
            options.unwrap_outer_fence = value;
        }
        if let Some(value) = self.hide_code_fences {
            options.hide_code_fences = value;
        }
        if let Some(value) = self.show_language_label {
            options.show_language_label = value;
        }
        if let Some(value) = self.strip_heading_prefixes {
            options.strip_heading_prefixes = value;
        }
        if let Some(value) = self.block_list_items {
            options.block_list_items = value;
        }
        if let Some(width) = self.code_indent {
            options.set_code_indent(width);
        }
        match &self.code_background {
            Some(setting) => options.set_code_background(setting.key(), palette),
            None => options.refresh_code_background(palette),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert!(options.unwrap_outer_fence);
        assert!(options.hide_code_fences);
        assert!(options.show_language_label);
        assert!(options.strip_heading_prefixes);
        assert!(options.block_list_items);
        assert_eq!(options.code_background_key(), None);
        assert_eq!(options.code_background_ansi(), None);
        assert_eq!(options.code_indent(), "  ");
    }

    #[test]
    fn test_set_code_indent_rejects_out_of_range() {
        let mut options = Options::default().with_code_indent(4);
        assert!(!options.set_code_indent(9));
        assert_eq!(options.code_indent_width(), 4);
        assert!(options.set_code_indent(0));
        assert_eq!(options.code_indent(), "");
    }

    #[test]
    fn test_background_derives_ansi_from_palette() {
        let palette = Palette::dark();
        let options = Options::default().with_code_background("codeBg", &palette);
        assert_eq!(options.code_background_key(), Some("codeBg"));
        assert_eq!(
            options.code_background_ansi().map(str::to_owned),
            palette.background_ansi("codeBg")
        );
    }

    #[test]
    fn test_unknown_background_clears_key_and_ansi() {
        let palette = Palette::dark();
        let mut options = Options::default().with_code_background("codeBg", &palette);
        let err = options
            .set_code_background(Some("nope"), &palette)
            .unwrap_err();
        assert_eq!(err.key, "nope");
        assert_eq!(err.palette, "dark");
        assert_eq!(options.code_background_key(), None);
        assert_eq!(options.code_background_ansi(), None);
    }

    #[test]
    fn test_refresh_follows_palette() {
        let mut options = Options::default().with_code_background("codeBg", &Palette::dark());
        options.refresh_code_background(&Palette::light()).unwrap();
        assert_eq!(
            options.code_background_ansi().map(str::to_owned),
            Palette::light().background_ansi("codeBg")
        );
    }

    #[test]
    fn test_union_prefers_other() {
        let base = OptionOverrides {
            unwrap_outer_fence: Some(true),
            code_indent: Some(4),
            ..OptionOverrides::default()
        };
        let other = OptionOverrides {
            unwrap_outer_fence: Some(false),
            hide_code_fences: Some(false),
            ..OptionOverrides::default()
        };
        let merged = base.union(&other);
        assert_eq!(merged.unwrap_outer_fence, Some(false));
        assert_eq!(merged.hide_code_fences, Some(false));
        assert_eq!(merged.code_indent, Some(4));
    }

    #[test]
    fn test_snapshot_round_trips_through_apply() {
        let palette = Palette::dark();
        let mut source = Options::default().with_code_background("mutedBg", &palette);
        source.show_language_label = false;
        source.set_code_indent(6);

        let mut target = Options::default();
        OptionOverrides::snapshot(&source)
            .apply(&mut target, &palette)
            .unwrap();
        assert_eq!(target, source);
    }

    #[test]
    fn test_apply_off_clears_background() {
        let palette = Palette::dark();
        let mut options = Options::default().with_code_background("codeBg", &palette);
        let overrides = OptionOverrides {
            code_background: Some(BackgroundSetting::Off),
            ..OptionOverrides::default()
        };
        overrides.apply(&mut options, &palette).unwrap();
        assert_eq!(options.code_background_ansi(), None);
    }
}
