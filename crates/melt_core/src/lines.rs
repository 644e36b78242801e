/// One captured line of source text.
///
/// `Full` lines re-emit with a trailing `\n`; a `Partial` line re-emits
/// verbatim and is only produced for a file's terminator-less final line,
/// so exactly one element of a literal sequence may be `Partial` and only
/// in last position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawLine {
    Full(String),
    Partial(String),
}

impl RawLine {
    pub(crate) fn captured(text: &str, had_eol: bool) -> Self {
        if had_eol {
            Self::Full(text.to_string())
        } else {
            Self::Partial(text.to_string())
        }
    }

    pub fn emit(&self, out: &mut String) {
        match self {
            Self::Full(s) => {
                out.push_str(s);
                out.push('\n');
            }
            Self::Partial(s) => out.push_str(s),
        }
    }
}

/// Sequential reader over decoded source text.
///
/// Terminators are stripped (`\r\n` and bare `\n` both count as one line
/// ending, and stray trailing `\r`s go with them) and their presence is
/// reported alongside each line so the rewrite side can reproduce a missing
/// final newline. Tracks the 1-based number of the last line handed out for
/// diagnostics.
pub(crate) struct LineCursor<'a> {
    lines: Vec<(&'a str, bool)>,
    pos: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut lines = Vec::new();
        for chunk in text.split_inclusive('\n') {
            let had_eol = chunk.ends_with('\n');
            let stripped = chunk.strip_suffix('\n').unwrap_or(chunk);
            lines.push((stripped.trim_end_matches('\r'), had_eol));
        }
        Self { lines, pos: 0 }
    }

    pub fn next_line(&mut self) -> Option<(&'a str, bool)> {
        let line = self.lines.get(self.pos).copied();
        if line.is_some() {
            self.pos += 1;
        }
        line
    }

    /// 1-based number of the most recently returned line (0 before the
    /// first call).
    pub fn line(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::{LineCursor, RawLine};

    #[test]
    fn splits_and_reports_terminators() {
        let mut cursor = LineCursor::new("a\r\nb\nc");
        assert_eq!(cursor.next_line(), Some(("a", true)));
        assert_eq!(cursor.line(), 1);
        assert_eq!(cursor.next_line(), Some(("b", true)));
        assert_eq!(cursor.next_line(), Some(("c", false)));
        assert_eq!(cursor.line(), 3);
        assert_eq!(cursor.next_line(), None);
    }

    #[test]
    fn trailing_newline_does_not_yield_a_phantom_line() {
        let mut cursor = LineCursor::new("only\n");
        assert_eq!(cursor.next_line(), Some(("only", true)));
        assert_eq!(cursor.next_line(), None);
    }

    #[test]
    fn raw_line_emission() {
        let mut out = String::new();
        RawLine::Full("x".to_string()).emit(&mut out);
        RawLine::Full(String::new()).emit(&mut out);
        RawLine::Partial("tail".to_string()).emit(&mut out);
        assert_eq!(out, "x\n\ntail");
    }
}
