use std::path::PathBuf;

use tidymark::config::{
    BackgroundSetting, ConfigFlags, ConfigService, Effect, LEGACY_SETTINGS_TAG, LiveEdit,
    OptionOverrides, SETTINGS_TAG, SessionLog, ThemeMode, clear_config_flags, load_config_flags,
    parse_edit, parse_flag_tokens, save_config_flags,
};
use tidymark::theme::Palette;

fn args(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(ToString::to_string).collect()
}

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".tidymarkrc");
    let content = r"
# comment
--no-hide-fences

--theme light

--code-indent=4
--render-debug-log=render.log
";
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert_eq!(flags.overrides.hide_code_fences, Some(false));
    assert_eq!(flags.overrides.code_indent, Some(4));
    assert_eq!(flags.theme, Some(ThemeMode::Light));
    assert_eq!(flags.render_debug_log, Some(PathBuf::from("render.log")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".tidymarkrc");
    std::fs::write(&path, "--no-language-label\n--theme light\n--code-bg codeBg\n").unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_flags = parse_flag_tokens(&args(&[
        "tidymark",
        "--theme",
        "dark",
        "--code-bg=off",
        "reply.md",
    ]));

    let effective = file_flags.union(&cli_flags);
    assert_eq!(
        effective.overrides.show_language_label,
        Some(false),
        "file flags should survive when the CLI is silent"
    );
    assert_eq!(effective.theme, Some(ThemeMode::Dark), "cli should override theme");
    assert_eq!(
        effective.overrides.code_background,
        Some(BackgroundSetting::Off),
        "cli should override the background"
    );
}

#[test]
fn test_bool_flag_forms() {
    let flags = parse_flag_tokens(&args(&[
        "tidymark",
        "--unwrap-fence=off",
        "--strip-headings",
        "--no-list-blocks",
        "--language-label=yes",
    ]));
    assert_eq!(flags.overrides.unwrap_outer_fence, Some(false));
    assert_eq!(flags.overrides.strip_heading_prefixes, Some(true));
    assert_eq!(flags.overrides.block_list_items, Some(false));
    assert_eq!(flags.overrides.show_language_label, Some(true));
    assert_eq!(flags.overrides.hide_code_fences, None);
}

#[test]
fn test_out_of_range_indent_flag_is_ignored() {
    let flags = parse_flag_tokens(&args(&["tidymark", "--code-indent", "12"]));
    assert_eq!(flags.overrides.code_indent, None);
}

#[test]
fn test_save_then_load_round_trip_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config");
    let flags = ConfigFlags {
        overrides: OptionOverrides {
            hide_code_fences: Some(false),
            code_background: Some(BackgroundSetting::Key("codeBg".to_string())),
            code_indent: Some(3),
            ..OptionOverrides::default()
        },
        theme: Some(ThemeMode::Dark),
        width: Some(100),
        perf: true,
        ..ConfigFlags::default()
    };

    save_config_flags(&path, &flags).unwrap();
    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.starts_with("# tidymark defaults"));
    assert_eq!(load_config_flags(&path).unwrap(), flags);

    clear_config_flags(&path).unwrap();
    assert!(!path.exists());
    assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
}

#[test]
fn test_missing_config_file_is_default() {
    let dir = tempfile::tempdir().unwrap();
    let flags = load_config_flags(&dir.path().join("absent")).unwrap();
    assert_eq!(flags, ConfigFlags::default());
}

#[test]
fn test_session_log_latest_entry_wins() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.jsonl");
    let content = format!(
        concat!(
            "{{\"type\":\"message\",\"text\":\"hello\"}}\n",
            "{{\"tag\":\"{current}\",\"data\":{{\"hideCodeFences\":false,\"codeIndent\":6}}}}\n",
            "not json\n",
            "{{\"tag\":\"{current}\",\"data\":{{\"showLanguageLabel\":\"off\"}}}}\n",
            "{{\"tag\":\"other.settings\",\"data\":{{\"hideCodeFences\":true}}}}\n",
        ),
        current = SETTINGS_TAG
    );
    std::fs::write(&path, content).unwrap();

    let settings = SessionLog::new(&path).latest_settings().unwrap().unwrap();
    assert_eq!(settings.show_language_label, Some(false));
    assert_eq!(settings.hide_code_fences, None, "entries are not merged");
    assert_eq!(settings.code_indent, None);
}

#[test]
fn test_legacy_entry_is_imported_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.jsonl");
    std::fs::write(
        &path,
        format!("{{\"tag\":\"{LEGACY_SETTINGS_TAG}\",\"data\":{{\"stripHeadingPrefixes\":false}}}}\n"),
    )
    .unwrap();

    let log = SessionLog::new(&path);
    assert!(log.import_legacy().unwrap());
    assert!(!log.import_legacy().unwrap());

    let content = std::fs::read_to_string(&path).unwrap();
    let last = content.lines().last().unwrap();
    assert!(last.contains(SETTINGS_TAG));
    assert!(!last.contains(LEGACY_SETTINGS_TAG));
    let settings = log.latest_settings().unwrap().unwrap();
    assert_eq!(settings.strip_heading_prefixes, Some(false));
}

#[test]
fn test_persist_effect_round_trips_through_session_log() {
    let dir = tempfile::tempdir().unwrap();
    let log = SessionLog::new(dir.path().join("session.jsonl"));
    let mut config = ConfigService::new(Default::default(), Palette::dark());
    config.commit(parse_edit("bg codeBg", config.options()).unwrap());
    config.commit(LiveEdit::CodeIndent(5));

    for effect in config.take_effects() {
        if let Effect::Persist(settings) = effect {
            log.append_settings(&settings).unwrap();
        }
    }

    let settings = log.latest_settings().unwrap().unwrap();
    assert_eq!(
        settings.code_background,
        Some(BackgroundSetting::Key("codeBg".to_string()))
    );
    assert_eq!(settings.code_indent, Some(5));

    let restored = ConfigService::from_layers(None, Some(&settings), Palette::dark());
    assert_eq!(restored.options(), config.options());
}

#[test]
fn test_persisted_layer_beats_flags() {
    let flags = OptionOverrides {
        code_indent: Some(1),
        hide_code_fences: Some(false),
        ..OptionOverrides::default()
    };
    let persisted = OptionOverrides {
        code_indent: Some(7),
        ..OptionOverrides::default()
    };
    let config = ConfigService::from_layers(Some(&flags), Some(&persisted), Palette::dark());
    assert_eq!(config.options().code_indent_width(), 7);
    assert!(!config.options().hide_code_fences);
}

#[test]
fn test_unknown_background_from_flags_warns_and_clears() {
    let flags = OptionOverrides {
        code_background: Some(BackgroundSetting::Key("nope".to_string())),
        ..OptionOverrides::default()
    };
    let mut config = ConfigService::from_layers(Some(&flags), None, Palette::dark());
    assert_eq!(config.options().code_background_key(), None);
    assert_eq!(config.options().code_background_ansi(), None);
    let effects = config.take_effects();
    assert!(effects.iter().any(|effect| matches!(effect, Effect::Notify(_))));
}
