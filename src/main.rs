//! tidymark - Render assistant-generated markdown for the terminal.
//!
//! # Usage
//!
//! ```bash
//! tidymark reply.md
//! cat reply.md | tidymark --code-bg codeBg --width 100
//! tidymark --no-hide-fences --set "indent 4" reply.md
//! ```

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use tidymark::config::{
    ConfigFlags, ConfigService, Effect, NoticeLevel, PersistedSettings, SessionLog, ThemeMode,
    clear_config_flags, global_config_path, load_config_flags, local_override_path, parse_edit,
    parse_flag_tokens, save_config_flags,
};
use tidymark::highlight::{HighlightBackground, detected_background, set_background_mode};
use tidymark::perf;
use tidymark::render::render_print;
use tidymark::theme::{MarkdownTheme, Palette};

const FALLBACK_WIDTH: usize = 80;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

/// Render assistant-generated markdown for the terminal
#[derive(Parser, Debug)]
#[command(name = "tidymark", version, about, long_about = None)]
struct Cli {
    /// Markdown file to render (stdin when omitted or `-`)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Strip a single ```markdown fence wrapping the whole input
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "on")]
    unwrap_fence: Option<String>,

    #[arg(long, hide = true)]
    no_unwrap_fence: bool,

    /// Hide code fence lines
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "on")]
    hide_fences: Option<String>,

    #[arg(long, hide = true)]
    no_hide_fences: bool,

    /// Show a ‹lang› label in place of the opening fence
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "on")]
    language_label: Option<String>,

    #[arg(long, hide = true)]
    no_language_label: bool,

    /// Render headings without `#` markers
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "on")]
    strip_headings: Option<String>,

    #[arg(long, hide = true)]
    no_strip_headings: bool,

    /// Render list-item children as full blocks
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "on")]
    list_blocks: Option<String>,

    #[arg(long, hide = true)]
    no_list_blocks: bool,

    /// Palette background key for code blocks (`off` to disable)
    #[arg(long, value_name = "KEY")]
    code_bg: Option<String>,

    /// Spaces before code lines (0-8)
    #[arg(long, value_name = "N")]
    code_indent: Option<String>,

    /// Force light or dark styling
    #[arg(long, value_enum)]
    theme: Option<ThemeMode>,

    /// Load background colors from a JSON palette file
    #[arg(long, value_name = "PATH")]
    palette: Option<PathBuf>,

    /// Output width in columns (terminal width when omitted)
    #[arg(long, value_name = "COLUMNS")]
    width: Option<usize>,

    /// When to emit ANSI styling
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorChoice,

    /// Session log holding persisted settings
    #[arg(long, value_name = "PATH")]
    session: Option<PathBuf>,

    /// Apply a live edit, e.g. `--set "bg codeBg"` (repeatable)
    #[arg(long = "set", value_name = "COMMAND")]
    set: Vec<String>,

    /// Enable performance logging
    #[arg(long)]
    perf: bool,

    /// Write detailed render debug events to a file
    #[arg(long, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => std::io::read_to_string(std::io::stdin()).context("Failed to read stdin"),
    }
}

fn load_palette(flags: &ConfigFlags) -> Result<Palette> {
    match &flags.palette_file {
        Some(path) => Palette::load(path)
            .with_context(|| format!("Failed to load palette {}", path.display())),
        None => Ok(Palette::for_background(detected_background())),
    }
}

fn load_persisted(session: &SessionLog) -> Option<PersistedSettings> {
    if let Err(err) = session.import_legacy() {
        eprintln!("[warn] Failed to import legacy settings: {err}");
    }
    match session.latest_settings() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("[warn] Failed to read session log: {err}");
            None
        }
    }
}

fn run_effects(config: &mut ConfigService, session: Option<&SessionLog>) {
    for effect in config.take_effects() {
        match effect {
            Effect::Persist(settings) => {
                let Some(session) = session else {
                    continue;
                };
                if let Err(err) = session.append_settings(&settings) {
                    eprintln!("[warn] Failed to persist settings: {err}");
                }
            }
            // Print mode renders once, after every edit is applied.
            Effect::Redraw => {}
            Effect::Notify(notice) => match notice.level {
                NoticeLevel::Warning => eprintln!("[warn] {}", notice.message),
                NoticeLevel::Info => eprintln!("[info] {}", notice.message),
            },
        }
    }
}

fn output_width(flags: &ConfigFlags) -> usize {
    flags.width.unwrap_or_else(|| {
        crossterm::terminal::size()
            .ok()
            .map(|(columns, _)| usize::from(columns))
            .filter(|columns| *columns > 0)
            .unwrap_or(FALLBACK_WIDTH)
    })
}

fn use_color(choice: ColorChoice) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => {
            std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os("TIDYMARK_RENDER_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        eprintln!(
            "[warn] Failed to initialize render debug log {}: {}",
            render_debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            err
        );
    }

    match effective.theme.unwrap_or(ThemeMode::Auto) {
        ThemeMode::Auto => set_background_mode(None),
        ThemeMode::Light => set_background_mode(Some(HighlightBackground::Light)),
        ThemeMode::Dark => set_background_mode(Some(HighlightBackground::Dark)),
    }

    let palette = load_palette(&effective)?;
    let session = cli.session.as_deref().map(SessionLog::new);
    let persisted = session.as_ref().and_then(load_persisted);
    let mut config =
        ConfigService::from_layers(Some(&effective.overrides), persisted.as_ref(), palette);

    for command in &cli.set {
        match parse_edit(command, config.options()) {
            Ok(edit) => {
                config.commit(edit);
            }
            Err(err) => eprintln!("[warn] Ignoring --set {command:?}: {err}"),
        }
    }
    run_effects(&mut config, session.as_ref());

    let markdown = read_input(cli.file.as_deref())?;
    let theme = if use_color(cli.color) {
        MarkdownTheme::ansi()
    } else {
        MarkdownTheme::plain()
    };
    let width = output_width(&effective);

    let output = {
        let _scope = perf::scope("main.render_print");
        render_print(&markdown, width, &theme, config.options())
    };
    if !output.is_empty() {
        println!("{output}");
    }
    if perf::is_enabled() {
        for line in perf::report() {
            eprintln!("{line}");
        }
    }
    Ok(())
}
