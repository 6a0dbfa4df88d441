//! Configuration: options, their layered sources and the revision counter.
//!
//! Options come from built-in defaults, startup flags (command line and
//! flag files), the latest snapshot in the session log, and live edits, in
//! that order of precedence. [`ConfigService`] owns the result and bumps a
//! [`Revision`] on every committed change so renderers can tell when their
//! cached output is stale.

mod command;
mod flags;
mod options;
mod parse;
mod revision;
mod service;
mod session;

pub use command::{CommandError, parse_edit};
pub use flags::{
    ConfigFlags, ThemeMode, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
pub use options::{
    BackgroundSetting, DEFAULT_CODE_INDENT, MAX_CODE_INDENT, OptionOverrides, Options,
    PersistedSettings, UnknownBackground,
};
pub use parse::{parse_background, parse_bool, parse_bool_like, parse_indent_width};
pub use revision::{Revision, RevisionTracker};
pub use service::{ConfigService, Effect, LiveEdit, Notice, NoticeLevel, Resolved, resolve};
pub use session::{LEGACY_SETTINGS_TAG, SETTINGS_TAG, SessionLog, SessionLogError};
