//! Target matching
//!
//! Translates the user's wildcard pattern into an anchored, case-insensitive
//! regex and selects the first enumerated window that satisfies the target
//! spec.
//!
//! # Matching rules
//!
//! A window matches a [`TargetSpec`] if either:
//!
//! 1. its title matches the wildcard pattern as a whole string
//!    (case-insensitive; `*` = zero or more characters, `?` = exactly one),
//!    or
//! 2. the spec parses as a nonzero number (decimal or `0x` hex) equal to the
//!    window's raw handle or its owning process id.
//!
//! Both checks run against every spec: `0x6bf0` is simultaneously a literal
//! title pattern and a numeric id, and either route can select the window.
//! Non-numeric patterns parse to id 0, which never matches a real window.

use regex::{Regex, RegexBuilder};

use crate::model::WindowDescriptor;

/// Upper bound on the compiled pattern size, to keep pathological
/// command-line input from exhausting memory.
const MAX_PATTERN_SIZE: usize = 1 << 20;

/// Translates a wildcard pattern to an anchored regex source string
///
/// `*` becomes `.*`, `?` becomes `.`, and every other character is escaped
/// and matched literally. The result is wrapped in `^...$` so the pattern
/// must match the entire window title, not a substring: `calc*` matches
/// `Calculator` but not `My Calc`.
pub fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');
    for c in pattern.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            c => out.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4]))),
        }
    }
    out.push('$');
    out
}

/// Parses the leading numeric portion of a target string
///
/// Accepts decimal or `0x`-prefixed hex and stops at the first non-digit,
/// returning 0 for non-numeric input. Window handles and process ids are
/// never 0, so a zero id matches nothing.
fn parse_numeric_id(raw: &str) -> u64 {
    let (digits, radix): (&str, u32) = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(rest) => (rest, 16),
        None => (raw, 10),
    };

    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());

    u64::from_str_radix(&digits[..end], radix).unwrap_or(0)
}

/// The immutable description of what to track, parsed once at startup
#[derive(Debug, Clone)]
pub struct TargetSpec {
    raw: String,
    pattern: Regex,
    numeric_id: u64,
}

impl TargetSpec {
    /// Parses a command-line target into a spec
    ///
    /// The argument is interpreted both as a wildcard title pattern and,
    /// when it looks numeric, as a window handle or process id.
    pub fn parse(raw: &str) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(&wildcard_to_regex(raw))
            .case_insensitive(true)
            .size_limit(MAX_PATTERN_SIZE)
            .build()?;

        Ok(Self {
            raw: raw.to_string(),
            pattern,
            numeric_id: parse_numeric_id(raw),
        })
    }

    /// The pattern text as the user typed it
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The numeric handle/pid target, if the spec parsed as nonzero
    pub fn numeric_id(&self) -> Option<u64> {
        (self.numeric_id != 0).then_some(self.numeric_id)
    }

    /// Whether a window satisfies this spec
    pub fn matches(&self, window: &WindowDescriptor) -> bool {
        if self.pattern.is_match(&window.title) {
            return true;
        }

        self.numeric_id != 0
            && (window.handle == self.numeric_id || u64::from(window.pid) == self.numeric_id)
    }
}

/// Finds the first capturable window matching the spec
///
/// Windows are scanned in enumeration order, which the OS does not guarantee
/// to be stable or meaningful; first match wins. Windows that are not in a
/// normal or maximized show-state are never candidates. `None` is a valid
/// "nothing to capture yet" outcome, not an error.
pub fn resolve<'a>(
    spec: &TargetSpec,
    windows: &'a [WindowDescriptor],
) -> Option<&'a WindowDescriptor> {
    windows
        .iter()
        .filter(|w| w.capturable())
        .find(|w| spec.matches(w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Rect, ShowState};

    fn window(handle: u64, pid: u32, title: &str) -> WindowDescriptor {
        WindowDescriptor {
            handle,
            pid,
            title: title.to_string(),
            bounds: Rect::new(0, 0, 800, 600),
            show_state: ShowState::Normal,
        }
    }

    #[test]
    fn test_wildcard_translation() {
        assert_eq!(wildcard_to_regex("calc*"), "^calc.*$");
        assert_eq!(wildcard_to_regex("a?c"), "^a.c$");
        assert_eq!(wildcard_to_regex("a.b"), "^a\\.b$");
    }

    #[test]
    fn test_wildcard_escapes_regex_metacharacters() {
        let spec = TargetSpec::parse("C++ (1)").unwrap();
        assert!(spec.matches(&window(1, 1, "C++ (1)")));
        assert!(!spec.matches(&window(1, 1, "Cxx (1)")));
    }

    #[test]
    fn test_star_suffix_anchored() {
        let spec = TargetSpec::parse("calc*").unwrap();
        assert!(spec.matches(&window(1, 1, "Calculator")));
        assert!(!spec.matches(&window(2, 2, "My Calc")));
    }

    #[test]
    fn test_star_prefix_anchored() {
        let spec = TargetSpec::parse("*excel").unwrap();
        assert!(spec.matches(&window(1, 1, "Microsoft Excel")));
        assert!(!spec.matches(&window(2, 2, "Excellent App")));
        // Anchoring requires the title to end with the literal part.
        assert!(!spec.matches(&window(3, 3, "Excel - Book1")));
    }

    #[test]
    fn test_inner_wildcard() {
        let spec = TargetSpec::parse("inbox*outlook").unwrap();
        assert!(spec.matches(&window(1, 1, "Inbox - me@example.com - Outlook")));
        assert!(!spec.matches(&window(2, 2, "Outlook - Inbox")));
    }

    #[test]
    fn test_question_mark_is_single_character() {
        let spec = TargetSpec::parse("no?epad").unwrap();
        assert!(spec.matches(&window(1, 1, "Notepad")));
        assert!(!spec.matches(&window(2, 2, "Noepad")));
        assert!(!spec.matches(&window(3, 3, "Nottepad")));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let spec = TargetSpec::parse("*EXCEL").unwrap();
        assert!(spec.matches(&window(1, 1, "microsoft excel")));

        let spec = TargetSpec::parse("calculator").unwrap();
        assert!(spec.matches(&window(1, 1, "CALCULATOR")));
    }

    #[test]
    fn test_numeric_id_parses_decimal_and_hex() {
        assert_eq!(TargetSpec::parse("27632").unwrap().numeric_id(), Some(27632));
        assert_eq!(TargetSpec::parse("0x6bf0").unwrap().numeric_id(), Some(0x6bf0));
        assert_eq!(TargetSpec::parse("0X6BF0").unwrap().numeric_id(), Some(0x6bf0));
        assert_eq!(TargetSpec::parse("calc*").unwrap().numeric_id(), None);
    }

    #[test]
    fn test_numeric_id_matches_handle_or_pid() {
        let spec = TargetSpec::parse("4242").unwrap();
        // Matches by handle even though the pid differs.
        assert!(spec.matches(&window(4242, 7, "Untitled")));
        // Matches by pid even though the handle differs.
        assert!(spec.matches(&window(9, 4242, "Untitled")));
        assert!(!spec.matches(&window(9, 7, "Untitled")));
    }

    #[test]
    fn test_numeric_spec_still_matches_as_title() {
        // A numeric argument is also a literal title pattern.
        let spec = TargetSpec::parse("1234").unwrap();
        assert!(spec.matches(&window(9, 7, "1234")));
    }

    #[test]
    fn test_non_numeric_never_matches_by_id() {
        let spec = TargetSpec::parse("notepad").unwrap();
        assert_eq!(spec.numeric_id(), None);
        assert!(!spec.matches(&window(0, 0, "Something Else")));
    }

    #[test]
    fn test_resolve_first_match_wins() {
        let spec = TargetSpec::parse("term*").unwrap();
        let windows = vec![
            window(1, 10, "Editor"),
            window(2, 20, "Terminal 1"),
            window(3, 30, "Terminal 2"),
        ];

        let found = resolve(&spec, &windows).unwrap();
        assert_eq!(found.handle, 2);
    }

    #[test]
    fn test_resolve_skips_non_capturable_windows() {
        let spec = TargetSpec::parse("terminal*").unwrap();
        let mut minimized = window(1, 10, "Terminal 1");
        minimized.show_state = ShowState::Other;
        let windows = vec![minimized, window(2, 20, "Terminal 2")];

        let found = resolve(&spec, &windows).unwrap();
        assert_eq!(found.handle, 2);
    }

    #[test]
    fn test_resolve_no_match_is_none() {
        let spec = TargetSpec::parse("nonexistent*").unwrap();
        let windows = vec![window(1, 10, "Editor")];
        assert!(resolve(&spec, &windows).is_none());
    }

    #[test]
    fn test_resolve_empty_window_list() {
        let spec = TargetSpec::parse("*").unwrap();
        assert!(resolve(&spec, &[]).is_none());
    }
}
