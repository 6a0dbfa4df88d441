//! Lenient parsing of configuration values.
//!
//! None of these fail: unrecognized input falls back to a default or to
//! "no value", and the caller keeps whatever it had before.

use super::options::{BackgroundSetting, MAX_CODE_INDENT};

/// Parse `on/off/true/false/1/0/yes/no/y/n`, trimmed and case-insensitive.
pub fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" | "y" => Some(true),
        "off" | "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Like [`parse_bool`], with `default` for anything unrecognized.
pub fn parse_bool_like(input: &str, default: bool) -> bool {
    parse_bool(input).unwrap_or(default)
}

/// Indent width in `0..=8`. `None` means keep the previous value.
pub fn parse_indent_width(input: &str) -> Option<usize> {
    input
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|width| *width <= MAX_CODE_INDENT)
}

/// `off`, `none` or an empty string clear the background; anything else is
/// a palette key.
pub fn parse_background(input: &str) -> BackgroundSetting {
    let trimmed = input.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("off")
        || trimmed.eq_ignore_ascii_case("none")
    {
        BackgroundSetting::Off
    } else {
        BackgroundSetting::Key(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_accepts_all_spellings() {
        for on in ["on", "true", "1", "yes", "y", " ON ", "True", "Y"] {
            assert_eq!(parse_bool(on), Some(true), "{on:?}");
        }
        for off in ["off", "false", "0", "no", "n", "\tOff", "NO"] {
            assert_eq!(parse_bool(off), Some(false), "{off:?}");
        }
    }

    #[test]
    fn test_parse_bool_like_falls_back_to_default() {
        assert!(parse_bool_like("maybe", true));
        assert!(!parse_bool_like("maybe", false));
        assert!(!parse_bool_like("", false));
    }

    #[test]
    fn test_parse_indent_width_range() {
        assert_eq!(parse_indent_width("0"), Some(0));
        assert_eq!(parse_indent_width(" 8 "), Some(8));
        assert_eq!(parse_indent_width("9"), None);
        assert_eq!(parse_indent_width("-1"), None);
        assert_eq!(parse_indent_width("abc"), None);
        assert_eq!(parse_indent_width(""), None);
    }

    #[test]
    fn test_parse_background() {
        assert_eq!(parse_background("off"), BackgroundSetting::Off);
        assert_eq!(parse_background("NONE"), BackgroundSetting::Off);
        assert_eq!(parse_background("  "), BackgroundSetting::Off);
        assert_eq!(
            parse_background(" codeBg "),
            BackgroundSetting::Key("codeBg".to_string())
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn indent_is_always_in_range(input in ".{0,6}") {
                if let Some(width) = parse_indent_width(&input) {
                    prop_assert!(width <= MAX_CODE_INDENT);
                }
            }

            #[test]
            fn unrecognized_bool_keeps_default(input in "[a-x]{3,8}", default: bool) {
                prop_assume!(parse_bool(&input).is_none());
                prop_assert_eq!(parse_bool_like(&input, default), default);
            }
        }
    }
}
