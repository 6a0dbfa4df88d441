// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. render::render_print)
    clippy::module_name_repetitions
)]

//! # tidymark
//!
//! Terminal rendering transforms for assistant-generated markdown.
//!
//! Replies from language models often arrive wrapped in a ```` ```markdown ````
//! fence, use raw `###` heading markers and nest tables or code inside list
//! items. tidymark renders them to styled terminal lines with:
//! - Outer-fence unwrapping
//! - Code blocks without fence lines, an optional `‹lang›` label and a
//!   background that survives embedded ANSI resets
//! - Headings without `#` markers
//! - Block-aware list items
//!
//! ## Architecture
//!
//! Configuration flows one way:
//! - **Config**: [`config::ConfigService`] owns the active options and bumps a
//!   revision on every committed change
//! - **View**: [`render::MarkdownView`] re-derives its code patch once per
//!   revision and caches lines per width
//! - **Print**: [`render::render_print`] renders once, trimmed for output
//!
//! ## Modules
//!
//! - [`config`]: Options, layered sources, revisions and persistence
//! - [`document`]: Markdown tokenizing
//! - [`render`]: The block renderer and its transforms
//! - [`theme`]: Base style functions and background palettes
//! - [`highlight`]: Syntax highlighting
//! - [`text`]: ANSI-aware width, wrapping and trimming
//! - [`perf`]: Timing scopes and the render debug log

pub mod config;
pub mod document;
pub mod highlight;
pub mod perf;
pub mod render;
pub mod text;
pub mod theme;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ConfigService, LiveEdit, Options, Revision};
    pub use crate::render::{MarkdownView, render_print};
    pub use crate::theme::{MarkdownTheme, Palette};
}
