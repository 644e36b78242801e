//! Line classifiers for the character history grammar.
//!
//! One pattern per recognized construct; `classify` tries them in a fixed
//! priority order and hands back the first hit as a tagged variant. A line
//! no pattern claims stays opaque literal text, so unsupported constructs
//! survive a rewrite untouched.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::date::DateVal;
use crate::value::{DynastyVal, FieldValue};

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("pattern compiles")
}

static RECORD_OPEN: LazyLock<Regex> = LazyLock::new(|| pattern(r"^\s*(\d+)\s*=\s*\{\s*(#.*)?$"));
static RECORD_CLOSE: LazyLock<Regex> = LazyLock::new(|| pattern(r"^\}\s*$"));
static BLANK_OR_COMMENT: LazyLock<Regex> = LazyLock::new(|| pattern(r"^\s*(#.*)?$"));
static BLANK: LazyLock<Regex> = LazyLock::new(|| pattern(r"^\s+$"));

static NAME: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"^\s*name\s*=\s*(?:"([^"]+)"|([^"\s]+))\s*(#.*)?$"#));
static FEMALE: LazyLock<Regex> = LazyLock::new(|| pattern(r"^\s*female\s*=\s*(yes|no)\s*$"));
static DYNASTY: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"^\s*dynasty\s*=\s*(?:"(\d+)"|(\d+))\s*(#.*)?$"#));
static RELIGION: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"^\s*religion\s*=\s*(?:"([^"]+)"|([^"\s]+))\s*(#.*)?$"#));
static CULTURE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"^\s*culture\s*=\s*(?:"([^"]+)"|([^"\s]+))\s*(#.*)?$"#));

// History entry openers. The single-line form deliberately captures no
// comment; the multi-line form expects a lone `{` on the following line.
static ENTRY_OPEN: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^\s*(\d{1,4})\.(\d{1,2})\.(\d{1,2})\s*=\s*\{"));
static ENTRY_OPEN_DEFERRED: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^\s*(\d{1,4})\.(\d{1,2})\.(\d{1,2})\s*=\s*$"));
static ENTRY_OPEN_FINISH: LazyLock<Regex> = LazyLock::new(|| pattern(r"^\s*\{\s*$"));

static BIRTH: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"^\s*birth\s*=\s*(?:"[^"]+"|([^"\s]+))"#));
static OPEN_BRACE: LazyLock<Regex> = LazyLock::new(|| pattern(r"^[^}]*\{"));
static CLOSE_BRACE: LazyLock<Regex> = LazyLock::new(|| pattern(r"^[^{]*\}"));

// A whole block opened and closed on one physical line is a rare syntax
// style the record-level parser does not support; it is detected up front
// and rejected rather than silently mangled.
static ONE_LINE_BLOCK: LazyLock<Regex> = LazyLock::new(|| pattern(r"^\s*[^#]*\{.*\}"));

/// Classification of one line inside an open character record, in match
/// priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CharLine {
    Name(FieldValue),
    Female,
    Dynasty(DynastyVal),
    Religion(FieldValue),
    Culture(FieldValue),
    EntryOpen(DateVal),
    EntryOpenDeferred(DateVal),
    Close,
    Opaque,
}

pub(crate) fn classify(line: &str) -> CharLine {
    if let Some(caps) = NAME.captures(line) {
        return CharLine::Name(field_value(&caps));
    }
    if let Some(caps) = FEMALE.captures(line) {
        // Only an uncommented `female = yes` is recognized; `female = no`
        // falls through and is retained as opaque literal text.
        if &caps[1] == "yes" {
            return CharLine::Female;
        }
    }
    if let Some(caps) = DYNASTY.captures(line) {
        let digits = caps.get(2).or_else(|| caps.get(1)).map_or("", |m| m.as_str());
        if let Ok(id) = digits.parse::<u64>() {
            return CharLine::Dynasty(DynastyVal {
                id,
                comment: caps.get(3).map(|m| m.as_str().to_string()),
            });
        }
    }
    if let Some(caps) = RELIGION.captures(line) {
        return CharLine::Religion(field_value(&caps));
    }
    if let Some(caps) = CULTURE.captures(line) {
        return CharLine::Culture(field_value(&caps));
    }
    if let Some(caps) = ENTRY_OPEN.captures(line) {
        return CharLine::EntryOpen(entry_date(&caps));
    }
    if let Some(caps) = ENTRY_OPEN_DEFERRED.captures(line) {
        return CharLine::EntryOpenDeferred(entry_date(&caps));
    }
    if RECORD_CLOSE.is_match(line) {
        return CharLine::Close;
    }
    CharLine::Opaque
}

/// Matches a top-level record opener, returning its numeric identifier.
pub(crate) fn record_opener(line: &str) -> Option<u64> {
    let caps = RECORD_OPEN.captures(line)?;
    caps[1].parse::<u64>().ok()
}

pub(crate) fn is_blank_or_comment(line: &str) -> bool {
    BLANK_OR_COMMENT.is_match(line)
}

/// Non-empty, whitespace-only fragment.
pub(crate) fn is_blank(fragment: &str) -> bool {
    BLANK.is_match(fragment)
}

pub(crate) fn entry_open_finish(line: &str) -> bool {
    ENTRY_OPEN_FINISH.is_match(line)
}

pub(crate) fn one_line_block(line: &str) -> bool {
    ONE_LINE_BLOCK.is_match(line)
}

/// Matches a birth statement at the start of `fragment`. Returns whether the
/// token was the bare word `yes` (as opposed to a quoted value or any other
/// token), which decides the canonical re-emission form.
pub(crate) fn birth_marker(fragment: &str) -> Option<bool> {
    let caps = BIRTH.captures(fragment)?;
    Some(caps.get(1).is_some_and(|m| m.as_str() == "yes"))
}

/// Leading run up to and including the next `{` (no `}` may intervene).
pub(crate) fn open_brace(fragment: &str) -> Option<&str> {
    OPEN_BRACE.find(fragment).map(|m| m.as_str())
}

/// Leading run up to and including the next `}` (no `{` may intervene).
pub(crate) fn close_brace(fragment: &str) -> Option<&str> {
    CLOSE_BRACE.find(fragment).map(|m| m.as_str())
}

fn field_value(caps: &Captures<'_>) -> FieldValue {
    // Group 1 is the quoted form, group 2 the bare token, group 3 the
    // trailing comment.
    let value = caps.get(2).or_else(|| caps.get(1)).map_or("", |m| m.as_str());
    FieldValue {
        value: value.to_string(),
        comment: caps.get(3).map(|m| m.as_str().to_string()),
    }
}

fn entry_date(caps: &Captures<'_>) -> DateVal {
    let part = |i: usize| {
        caps[i]
            .parse::<u32>()
            .expect("capture group is 1-4 digits")
    };
    DateVal::new(part(1), part(2), part(3))
}

#[cfg(test)]
mod tests {
    use super::{CharLine, birth_marker, classify, is_blank_or_comment, record_opener};
    use crate::date::DateVal;
    use crate::value::FieldValue;

    #[test]
    fn record_opener_accepts_trailing_comment() {
        assert_eq!(record_opener("140 = { # Karling"), Some(140));
        assert_eq!(record_opener("  140={"), Some(140));
        assert_eq!(record_opener("140 = { x"), None);
        assert_eq!(record_opener("abc = {"), None);
    }

    #[test]
    fn classify_scalar_fields() {
        assert_eq!(
            classify("\tname=\"Karl\" # emperor"),
            CharLine::Name(FieldValue::with_comment("Karl", "# emperor"))
        );
        assert_eq!(
            classify("\treligion=catholic"),
            CharLine::Religion(FieldValue::new("catholic"))
        );
        assert_eq!(
            classify("\tculture = \"old_frankish\""),
            CharLine::Culture(FieldValue::new("old_frankish"))
        );
        assert!(matches!(classify("\tdynasty=\"25061\""), CharLine::Dynasty(d) if d.id == 25061));
    }

    #[test]
    fn female_no_and_commented_female_stay_opaque() {
        assert_eq!(classify("\tfemale=yes"), CharLine::Female);
        assert_eq!(classify("\tfemale=no"), CharLine::Opaque);
        assert_eq!(classify("\tfemale=yes # really"), CharLine::Opaque);
    }

    #[test]
    fn classify_entry_openers_and_close() {
        assert_eq!(
            classify("\t768.1.1 = {"),
            CharLine::EntryOpen(DateVal::new(768, 1, 1))
        );
        assert_eq!(
            classify("\t768.1.1 ="),
            CharLine::EntryOpenDeferred(DateVal::new(768, 1, 1))
        );
        assert_eq!(classify("}"), CharLine::Close);
        assert_eq!(classify("} trailing"), CharLine::Opaque);
        assert_eq!(classify("\tadd_spouse = 123"), CharLine::Opaque);
    }

    #[test]
    fn birth_marker_distinguishes_bare_yes() {
        assert_eq!(birth_marker("\t\tbirth=yes"), Some(true));
        assert_eq!(birth_marker("\t\tbirth=\"767.4.2\""), Some(false));
        assert_eq!(birth_marker("\t\tbirth = yes # at dawn"), Some(true));
        assert_eq!(birth_marker("\t\tdeath=yes"), None);
    }

    #[test]
    fn blank_or_comment_lines() {
        assert!(is_blank_or_comment(""));
        assert!(is_blank_or_comment("   "));
        assert!(is_blank_or_comment("# note"));
        assert!(is_blank_or_comment("  # note"));
        assert!(!is_blank_or_comment("x # note"));
    }
}
