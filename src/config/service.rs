//! Layered option resolution and the runtime configuration owner.

use crate::theme::Palette;

use super::options::{
    BackgroundSetting, MAX_CODE_INDENT, OptionOverrides, Options, PersistedSettings,
    UnknownBackground,
};
use super::revision::{Revision, RevisionTracker};

/// One runtime change to a single option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveEdit {
    UnwrapOuterFence(bool),
    HideCodeFences(bool),
    ShowLanguageLabel(bool),
    StripHeadingPrefixes(bool),
    BlockListItems(bool),
    /// `None` turns the background off.
    CodeBackground(Option<String>),
    /// Widths above 8 are ignored.
    CodeIndent(usize),
}

impl LiveEdit {
    /// The edit as a one-field override layer.
    pub fn to_overrides(&self) -> OptionOverrides {
        let mut overrides = OptionOverrides::default();
        match self {
            Self::UnwrapOuterFence(value) => overrides.unwrap_outer_fence = Some(*value),
            Self::HideCodeFences(value) => overrides.hide_code_fences = Some(*value),
            Self::ShowLanguageLabel(value) => overrides.show_language_label = Some(*value),
            Self::StripHeadingPrefixes(value) => overrides.strip_heading_prefixes = Some(*value),
            Self::BlockListItems(value) => overrides.block_list_items = Some(*value),
            Self::CodeBackground(key) => {
                overrides.code_background = Some(
                    key.clone()
                        .map_or(BackgroundSetting::Off, BackgroundSetting::Key),
                );
            }
            Self::CodeIndent(width) => {
                overrides.code_indent = Some(*width).filter(|w| *w <= MAX_CODE_INDENT);
            }
        }
        overrides
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// A message for the user. Hosts decide how to show it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// Side effects queued by the config service for the host to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append this snapshot to the session log.
    Persist(PersistedSettings),
    Redraw,
    Notify(Notice),
}

/// Result of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub options: Options,
    /// Background keys that were dropped because the palette lacks them.
    pub warnings: Vec<UnknownBackground>,
}

/// Merge configuration layers into options.
///
/// Precedence, lowest first: `defaults`, `flags`, `persisted`, then each
/// live edit in order. Missing layers are skipped; within a layer only the
/// fields that are present override.
pub fn resolve(
    defaults: &Options,
    flags: Option<&OptionOverrides>,
    persisted: Option<&PersistedSettings>,
    live: &[LiveEdit],
    palette: &Palette,
) -> Resolved {
    let mut layered = OptionOverrides::default();
    if let Some(flags) = flags {
        layered = layered.union(flags);
    }
    if let Some(persisted) = persisted {
        layered = layered.union(persisted);
    }
    for edit in live {
        layered = layered.union(&edit.to_overrides());
    }

    let mut options = defaults.clone();
    let mut warnings = Vec::new();
    if let Err(err) = layered.apply(&mut options, palette) {
        tracing::warn!(%err, "code background cleared");
        warnings.push(err);
    }
    Resolved { options, warnings }
}

/// Owner of the active options, their revision and the palette.
///
/// All changes go through `&mut self`, so there is exactly one writer.
#[derive(Debug)]
pub struct ConfigService {
    options: Options,
    tracker: RevisionTracker,
    palette: Palette,
    effects: Vec<Effect>,
}

impl ConfigService {
    pub fn new(options: Options, palette: Palette) -> Self {
        Self {
            options,
            tracker: RevisionTracker::default(),
            palette,
            effects: Vec::new(),
        }
    }

    /// Build the startup state from defaults, flags and the persisted
    /// snapshot. Resolution warnings are queued as notices.
    pub fn from_layers(
        flags: Option<&OptionOverrides>,
        persisted: Option<&PersistedSettings>,
        palette: Palette,
    ) -> Self {
        let resolved = resolve(&Options::default(), flags, persisted, &[], &palette);
        let mut service = Self::new(resolved.options, palette);
        for warning in resolved.warnings {
            service
                .effects
                .push(Effect::Notify(Notice::warning(warning.to_string())));
        }
        service
    }

    pub const fn options(&self) -> &Options {
        &self.options
    }

    pub const fn revision(&self) -> Revision {
        self.tracker.current()
    }

    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Full snapshot of the current options, as persisted.
    pub fn snapshot(&self) -> PersistedSettings {
        OptionOverrides::snapshot(&self.options)
    }

    /// Apply one live edit.
    ///
    /// Always bumps the revision and queues a persist and a redraw, even if
    /// the value did not change.
    pub fn commit(&mut self, edit: LiveEdit) -> Revision {
        match &edit {
            LiveEdit::UnwrapOuterFence(value) => self.options.unwrap_outer_fence = *value,
            LiveEdit::HideCodeFences(value) => self.options.hide_code_fences = *value,
            LiveEdit::ShowLanguageLabel(value) => self.options.show_language_label = *value,
            LiveEdit::StripHeadingPrefixes(value) => {
                self.options.strip_heading_prefixes = *value;
            }
            LiveEdit::BlockListItems(value) => self.options.block_list_items = *value,
            LiveEdit::CodeBackground(key) => {
                if let Err(err) = self
                    .options
                    .set_code_background(key.as_deref(), &self.palette)
                {
                    self.warn(&err);
                }
            }
            LiveEdit::CodeIndent(width) => {
                if !self.options.set_code_indent(*width) {
                    tracing::debug!(width, "code indent out of range, kept previous");
                }
            }
        }

        let revision = self.tracker.bump();
        tracing::debug!(%revision, ?edit, "options committed");
        self.effects.push(Effect::Persist(self.snapshot()));
        self.effects.push(Effect::Redraw);
        revision
    }

    /// Switch palettes and re-derive the code background from it.
    pub fn set_palette(&mut self, palette: Palette) -> Revision {
        self.palette = palette;
        let before = self.options.code_background_key().map(ToString::to_string);
        if let Err(err) = self.options.refresh_code_background(&self.palette) {
            self.warn(&err);
        }
        let revision = self.tracker.bump();
        tracing::debug!(%revision, palette = self.palette.name(), "palette changed");
        if before.as_deref() != self.options.code_background_key() {
            self.effects.push(Effect::Persist(self.snapshot()));
        }
        self.effects.push(Effect::Redraw);
        revision
    }

    /// Drain queued effects, oldest first.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    fn warn(&mut self, err: &UnknownBackground) {
        tracing::warn!(%err, "code background cleared");
        self.effects
            .push(Effect::Notify(Notice::warning(err.to_string())));
    }
}
