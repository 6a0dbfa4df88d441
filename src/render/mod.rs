//! The rendering pipeline.
//!
//! Text passes through the outer-fence unwrapper, is tokenized, and each
//! block is rendered through a [`ThemeAdapter`] that layers the code-block
//! presentation over the base theme. [`MarkdownView`] caches the result per
//! configuration revision; [`render_print`] is the uncached one-shot path.

pub mod adapter;
mod block;
mod fence;
mod heading;
mod list;
mod print;
mod table;
mod view;

pub use adapter::{CodePatch, ThemeAdapter, apply_background};
pub use block::BlockRenderer;
pub use fence::unwrap_outer_fence;
pub use heading::render_heading;
pub use list::{ItemLine, render_list, render_list_item};
pub use print::render_print;
pub use table::render_table;
pub use view::{MarkdownView, RendererInstanceState};
