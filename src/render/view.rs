//! Cached, revision-aware rendering of one message.

use std::rc::Rc;

use crate::config::{ConfigService, Revision};
use crate::perf;
use crate::theme::MarkdownTheme;

use super::adapter::{CodePatch, ThemeAdapter};
use super::block::BlockRenderer;
use super::fence::unwrap_outer_fence;

/// Per-view bookkeeping for the staleness protocol.
///
/// When the configuration revision moves past `last_applied_revision`, both
/// flags drop and the next render redoes the fence unwrap and rebuilds the
/// code patch.
#[derive(Debug, Clone, Default)]
pub struct RendererInstanceState {
    last_applied_revision: Option<Revision>,
    unwrapped: bool,
    theme_patched: bool,
    code_patch: Option<CodePatch>,
    unwrap_passes: u64,
    theme_installs: u64,
}

impl RendererInstanceState {
    pub const fn last_applied_revision(&self) -> Option<Revision> {
        self.last_applied_revision
    }

    pub const fn unwrapped(&self) -> bool {
        self.unwrapped
    }

    pub const fn theme_patched(&self) -> bool {
        self.theme_patched
    }

    pub const fn code_patch(&self) -> Option<&CodePatch> {
        self.code_patch.as_ref()
    }

    /// Fence-unwrap passes run so far.
    pub const fn unwrap_passes(&self) -> u64 {
        self.unwrap_passes
    }

    /// Code patches built so far.
    pub const fn theme_installs(&self) -> u64 {
        self.theme_installs
    }
}

#[derive(Debug, Clone)]
struct CachedRender {
    width: usize,
    lines: Vec<String>,
}

/// A markdown message as shown in an interactive view.
///
/// Renders are cached per width; a new revision or new text invalidates the
/// cache.
#[derive(Debug)]
pub struct MarkdownView {
    text: String,
    display_text: String,
    padding_x: usize,
    padding_y: usize,
    theme: Rc<MarkdownTheme>,
    state: RendererInstanceState,
    cache: Option<CachedRender>,
}

impl MarkdownView {
    pub fn new(
        text: impl Into<String>,
        padding_x: usize,
        padding_y: usize,
        theme: Rc<MarkdownTheme>,
    ) -> Self {
        Self {
            text: text.into(),
            display_text: String::new(),
            padding_x,
            padding_y,
            theme,
            state: RendererInstanceState::default(),
            cache: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn state(&self) -> &RendererInstanceState {
        &self.state
    }

    /// Replace the content, e.g. as a streamed reply grows.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.state.unwrapped = false;
        self.cache = None;
    }

    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Lines for `width` columns under the current configuration.
    pub fn render(&mut self, width: usize, config: &ConfigService) -> Vec<String> {
        let current = config.revision();
        if self.state.last_applied_revision != Some(current) {
            self.state.last_applied_revision = Some(current);
            self.state.unwrapped = false;
            self.state.theme_patched = false;
        }

        let options = config.options();
        if !self.state.unwrapped {
            self.display_text = if options.unwrap_outer_fence {
                unwrap_outer_fence(&self.text).into_owned()
            } else {
                self.text.clone()
            };
            self.state.unwrapped = true;
            self.state.unwrap_passes += 1;
            self.cache = None;
        }

        let patch = match self.state.code_patch.take() {
            Some(patch) if self.state.theme_patched => patch,
            _ => {
                let patch = CodePatch::from_options(options);
                self.state.theme_patched = true;
                self.state.theme_installs += 1;
                self.cache = None;
                tracing::debug!(revision = %current, "installed code patch");
                perf::log_event("view.patch", format!("revision={current} patch={patch:?}"));
                patch
            }
        };

        let lines = match &self.cache {
            Some(cached) if cached.width == width => cached.lines.clone(),
            _ => {
                let renderer =
                    BlockRenderer::new(ThemeAdapter::new(&self.theme, &patch), options);
                let lines = renderer.render_document(
                    &self.display_text,
                    width,
                    self.padding_x,
                    self.padding_y,
                );
                self.cache = Some(CachedRender {
                    width,
                    lines: lines.clone(),
                });
                lines
            }
        };
        self.state.code_patch = Some(patch);
        lines
    }
}
