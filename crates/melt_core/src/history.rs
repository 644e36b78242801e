use crate::date::DateVal;
use crate::error::{ParseCtx, Result};
use crate::lines::{LineCursor, RawLine};
use crate::patterns;

/// One date-keyed history block inside a character record.
///
/// The body is kept as opaque literal elements; only brace nesting and the
/// birth marker are interpreted. Rewrite emits the canonical single-line
/// opener, so a multi-line opener collapses to the single-line form.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    date: DateVal,
    elems: Vec<RawLine>,
}

impl HistoryEntry {
    pub fn date(&self) -> &DateVal {
        &self.date
    }

    /// Parses the body of an entry whose opening brace has already been
    /// consumed, tracking brace depth across physical lines until it
    /// returns to zero.
    ///
    /// `literals` receives an exact copy of every physical line consumed
    /// here, extending the owning record's literal-copy rewrite path.
    /// Returns the entry and whether its body carried a birth marker.
    pub(crate) fn parse(
        ctx: ParseCtx<'_>,
        cursor: &mut LineCursor<'_>,
        owner_id: u64,
        date: DateVal,
        literals: &mut Vec<RawLine>,
    ) -> Result<(Self, bool)> {
        let mut entry = Self {
            date,
            elems: Vec::new(),
        };
        let mut buf = String::new();
        let mut idx = 0usize;
        let mut depth = 1u32;
        let mut birth = false;

        while depth > 0 {
            if idx == buf.len() {
                let Some((line, _had_eol)) = cursor.next_line() else {
                    return Err(ctx.error(
                        cursor.line(),
                        format!("unexpected end of input while parsing character {owner_id}"),
                    ));
                };
                literals.push(RawLine::Full(line.to_string()));
                buf = line.to_string();
                idx = 0;
                continue;
            }

            let frag = &buf[idx..];

            // A birth statement only counts at the entry's own top level.
            if depth == 1
                && let Some(bare_yes) = patterns::birth_marker(frag)
            {
                if birth {
                    return Err(ctx.error(
                        cursor.line(),
                        format!(
                            "multiple birth history effects in one entry for character {owner_id}"
                        ),
                    ));
                }
                birth = true;
                // Anything after the marker can only be a comment; the
                // canonical element replaces the whole line, keyed on the
                // entry's own date.
                idx = buf.len();
                let canonical = if bare_yes {
                    "\t\tbirth=yes".to_string()
                } else {
                    format!("\t\tbirth=\"{}\"", entry.date)
                };
                entry.elems.push(RawLine::Full(canonical));
                continue;
            }

            if let Some(m) = patterns::open_brace(frag) {
                depth += 1;
                let text = m.to_string();
                idx += text.len();
                entry.push_capture(text, &buf[idx..]);
                continue;
            }

            if let Some(m) = patterns::close_brace(frag) {
                depth -= 1;
                let text = m.to_string();
                idx += text.len();
                entry.push_capture(text, &buf[idx..]);
                continue;
            }

            // Opaque literal body; consumed whole unless it is only blanks.
            if !patterns::is_blank(frag) {
                entry.elems.push(RawLine::Full(frag.to_string()));
            }
            idx = buf.len();
        }

        let rest = &buf[idx..];
        if !rest.is_empty() && !patterns::is_blank_or_comment(rest) {
            return Err(ctx.error(
                cursor.line(),
                "out-of-place trailing tokens after history entry closing brace",
            ));
        }

        Ok((entry, birth))
    }

    fn push_capture(&mut self, text: String, rest: &str) {
        if !rest.is_empty() && !patterns::is_blank(rest) {
            self.elems.push(RawLine::Partial(text));
        } else {
            self.elems.push(RawLine::Full(text));
        }
    }

    pub(crate) fn emit(&self, out: &mut String) {
        out.push('\t');
        out.push_str(&self.date.to_string());
        out.push_str(" = {\n");
        for elem in &self.elems {
            elem.emit(out);
        }
    }
}
