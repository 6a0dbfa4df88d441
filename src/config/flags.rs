//! Startup flags from the command line and saved flag files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::options::{BackgroundSetting, OptionOverrides};
use super::parse::{parse_background, parse_bool_like, parse_indent_width};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Auto,
    Light,
    Dark,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub overrides: OptionOverrides,
    pub theme: Option<ThemeMode>,
    pub palette_file: Option<PathBuf>,
    pub width: Option<usize>,
    pub perf: bool,
    pub render_debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            overrides: self.overrides.union(&other.overrides),
            theme: other.theme.or(self.theme),
            palette_file: other
                .palette_file
                .clone()
                .or_else(|| self.palette_file.clone()),
            width: other.width.or(self.width),
            perf: self.perf || other.perf,
            render_debug_log: other
                .render_debug_log
                .clone()
                .or_else(|| self.render_debug_log.clone()),
        }
    }
}

/// Boolean option flags: `--name`, `--name=BOOL` and `--no-name`.
const BOOL_FLAGS: [&str; 5] = [
    "unwrap-fence",
    "hide-fences",
    "language-label",
    "strip-headings",
    "list-blocks",
];

fn bool_slot<'a>(overrides: &'a mut OptionOverrides, name: &str) -> Option<&'a mut Option<bool>> {
    match name {
        "unwrap-fence" => Some(&mut overrides.unwrap_outer_fence),
        "hide-fences" => Some(&mut overrides.hide_code_fences),
        "language-label" => Some(&mut overrides.show_language_label),
        "strip-headings" => Some(&mut overrides.strip_heading_prefixes),
        "list-blocks" => Some(&mut overrides.block_list_items),
        _ => None,
    }
}

fn bool_value(overrides: &OptionOverrides, name: &str) -> Option<bool> {
    match name {
        "unwrap-fence" => overrides.unwrap_outer_fence,
        "hide-fences" => overrides.hide_code_fences,
        "language-label" => overrides.show_language_label,
        "strip-headings" => overrides.strip_heading_prefixes,
        "list-blocks" => overrides.block_list_items,
        _ => None,
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("tidymark").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("tidymark")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("tidymark").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("tidymark")
                .join("config");
        }
    }

    PathBuf::from(".tidymarkrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".tidymarkrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# tidymark defaults (saved with --save)".to_string());
    for name in BOOL_FLAGS {
        match bool_value(&flags.overrides, name) {
            Some(true) => lines.push(format!("--{name}")),
            Some(false) => lines.push(format!("--no-{name}")),
            None => {}
        }
    }
    match &flags.overrides.code_background {
        Some(BackgroundSetting::Key(key)) => lines.push(format!("--code-bg {key}")),
        Some(BackgroundSetting::Off) => lines.push("--code-bg off".to_string()),
        None => {}
    }
    if let Some(width) = flags.overrides.code_indent {
        lines.push(format!("--code-indent {width}"));
    }
    if let Some(theme) = flags.theme {
        let theme_str = match theme {
            ThemeMode::Auto => "auto",
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        };
        lines.push(format!("--theme {theme_str}"));
    }
    if let Some(palette) = &flags.palette_file {
        lines.push(format!("--palette {}", palette.display()));
    }
    if let Some(width) = flags.width {
        lines.push(format!("--width {width}"));
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(path) = &flags.render_debug_log {
        lines.push(format!("--render-debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick known flags out of a token list, ignoring everything else.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        // Value of `--flag VALUE` or `--flag=VALUE`.
        let mut take_value = |name: &str| -> Option<String> {
            if token == name {
                let next = tokens.get(i + 1).cloned();
                if next.is_some() {
                    i += 1;
                }
                return next;
            }
            token
                .strip_prefix(name)
                .and_then(|rest| rest.strip_prefix('='))
                .map(ToOwned::to_owned)
        };

        if token == "--perf" {
            flags.perf = true;
        } else if let Some(value) = take_value("--theme") {
            flags.theme = parse_theme(&value);
        } else if let Some(value) = take_value("--render-debug-log") {
            flags.render_debug_log = Some(PathBuf::from(value));
        } else if let Some(value) = take_value("--palette") {
            flags.palette_file = Some(PathBuf::from(value));
        } else if let Some(value) = take_value("--width") {
            flags.width = value.trim().parse().ok().filter(|width| *width > 0);
        } else if let Some(value) = take_value("--code-bg") {
            flags.overrides.code_background = Some(parse_background(&value));
        } else if let Some(value) = take_value("--code-indent") {
            if let Some(width) = parse_indent_width(&value) {
                flags.overrides.code_indent = Some(width);
            }
        } else {
            parse_bool_flag(token, &mut flags.overrides);
        }
        i += 1;
    }
    flags
}

fn parse_bool_flag(token: &str, overrides: &mut OptionOverrides) {
    let Some(flag) = token.strip_prefix("--") else {
        return;
    };
    if let Some(name) = flag.strip_prefix("no-")
        && let Some(slot) = bool_slot(overrides, name)
    {
        *slot = Some(false);
        return;
    }
    let (name, value) = match flag.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (flag, None),
    };
    if let Some(slot) = bool_slot(overrides, name) {
        *slot = Some(value.is_none_or(|value| parse_bool_like(value, true)));
    }
}

fn parse_theme(s: &str) -> Option<ThemeMode> {
    match s {
        "auto" => Some(ThemeMode::Auto),
        "light" => Some(ThemeMode::Light),
        "dark" => Some(ThemeMode::Dark),
        _ => None,
    }
}
