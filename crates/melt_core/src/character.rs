use crate::date::DateVal;
use crate::error::{ParseCtx, Result};
use crate::history::HistoryEntry;
use crate::lines::{LineCursor, RawLine};
use crate::patterns::{self, CharLine};
use crate::value::{DynastyVal, FieldValue};

/// A parsed character record.
///
/// Two parallel representations are kept: the structured fields below and a
/// literal line-by-line copy of the whole body. While the record is clean,
/// rewrite replays the literal copy so untouched records come back with a
/// zero text diff; once a transform rule marks it `dirty`, rewrite instead
/// reconstructs the body in canonical field order, carrying each field's
/// inline comment along.
#[derive(Debug, Clone)]
pub struct Character {
    pub id: u64,
    pub name: FieldValue,
    pub female: bool,
    pub dynasty: DynastyVal,
    pub religion: Option<FieldValue>,
    pub culture: FieldValue,
    pub birth: DateVal,
    pub dirty: bool,
    open_line: String,
    elems: Vec<RawLine>,
    hist_entries: Vec<HistoryEntry>,
    literal_lines: Vec<RawLine>,
    last_in_file: bool,
}

/// Field accumulator while the record is still open. The presence checks
/// run against it exactly once, when the closing brace arrives.
#[derive(Debug, Default)]
struct Draft {
    name: Option<FieldValue>,
    female: bool,
    dynasty: Option<DynastyVal>,
    religion: Option<FieldValue>,
    culture: Option<FieldValue>,
    birth: Option<DateVal>,
}

impl Draft {
    /// The single finalization check: culture, name, and birth date must
    /// have been seen by the time the record closes. Religion and dynasty
    /// are deliberately unchecked.
    fn require_complete(
        &mut self,
        ctx: ParseCtx<'_>,
        id: u64,
        start_line: usize,
    ) -> Result<(FieldValue, FieldValue, DateVal)> {
        let Some(culture) = self.culture.take() else {
            return Err(ctx.error(start_line, format!("character {id} has no culture defined")));
        };
        let Some(name) = self.name.take() else {
            return Err(ctx.error(
                start_line,
                format!("character {id} has no given name defined"),
            ));
        };
        let Some(birth) = self.birth.take() else {
            return Err(ctx.error(
                start_line,
                format!("character {id} has no birth date defined"),
            ));
        };
        Ok((name, culture, birth))
    }
}

impl Character {
    pub fn history_entries(&self) -> &[HistoryEntry] {
        &self.hist_entries
    }

    /// Parses the body of a record whose opening line has already been
    /// consumed, through its closing brace.
    pub(crate) fn parse(
        ctx: ParseCtx<'_>,
        cursor: &mut LineCursor<'_>,
        id: u64,
        open_line: &str,
    ) -> Result<Self> {
        let start_line = cursor.line();
        let mut draft = Draft::default();
        let mut elems = Vec::new();
        let mut hist_entries: Vec<HistoryEntry> = Vec::new();
        let mut literal_lines = Vec::new();
        // Set between a date-only opener line and the `{` expected next.
        let mut deferred_entry: Option<DateVal> = None;

        loop {
            let Some((line, had_eol)) = cursor.next_line() else {
                return Err(ctx.error(
                    cursor.line(),
                    format!("unexpected end of input while parsing character {id}"),
                ));
            };
            let n = cursor.line();
            literal_lines.push(RawLine::captured(line, had_eol));

            if patterns::one_line_block(line) {
                return Err(ctx.error(
                    n,
                    "one-line block syntax is not supported in character history",
                ));
            }

            if let Some(date) = deferred_entry.take() {
                if !patterns::entry_open_finish(line) {
                    return Err(ctx.error(
                        n,
                        format!(
                            "unexpected token after multi-line history entry opener \
                             while parsing character {id}"
                        ),
                    ));
                }
                let (entry, is_birth) =
                    HistoryEntry::parse(ctx, cursor, id, date, &mut literal_lines)?;
                if is_birth {
                    draft.birth = Some(entry.date().clone());
                }
                hist_entries.push(entry);
                continue;
            }

            match patterns::classify(line) {
                CharLine::Name(value) => draft.name = Some(value),
                CharLine::Female => draft.female = true,
                CharLine::Dynasty(value) => draft.dynasty = Some(value),
                CharLine::Religion(value) => draft.religion = Some(value),
                CharLine::Culture(value) => draft.culture = Some(value),
                CharLine::EntryOpen(date) => {
                    let (entry, is_birth) =
                        HistoryEntry::parse(ctx, cursor, id, date, &mut literal_lines)?;
                    if is_birth {
                        draft.birth = Some(entry.date().clone());
                    }
                    hist_entries.push(entry);
                }
                CharLine::EntryOpenDeferred(date) => deferred_entry = Some(date),
                CharLine::Close => {
                    let (name, culture, birth) = draft.require_complete(ctx, id, start_line)?;
                    return Ok(Self {
                        id,
                        name,
                        female: draft.female,
                        dynasty: draft.dynasty.unwrap_or_else(DynastyVal::lowborn),
                        religion: draft.religion,
                        culture,
                        birth,
                        dirty: false,
                        open_line: open_line.to_string(),
                        elems,
                        hist_entries,
                        literal_lines,
                        last_in_file: !had_eol,
                    });
                }
                // Unsupported constructs are retained in place so the
                // canonical rewrite can put them back.
                CharLine::Opaque => elems.push(RawLine::Full(line.to_string())),
            }
        }
    }

    pub(crate) fn emit(&self, out: &mut String) {
        // The opening line is reproduced literally either way; its
        // incidental formatting and comment never feed a diff.
        out.push_str(&self.open_line);
        out.push('\n');

        if !self.dirty {
            for line in &self.literal_lines {
                line.emit(out);
            }
            return;
        }

        emit_quoted(out, "name", &self.name);
        if self.female {
            out.push_str("\tfemale=yes\n");
        }
        if !self.dynasty.is_lowborn() {
            match &self.dynasty.comment {
                Some(comment) => {
                    out.push_str(&format!("\tdynasty={}  {}\n", self.dynasty.id, comment));
                }
                None => out.push_str(&format!("\tdynasty={}\n", self.dynasty.id)),
            }
        }
        if let Some(religion) = &self.religion {
            emit_quoted(out, "religion", religion);
        }
        emit_quoted(out, "culture", &self.culture);
        for elem in &self.elems {
            elem.emit(out);
        }
        for entry in &self.hist_entries {
            entry.emit(out);
        }
        out.push('}');
        if !self.last_in_file {
            out.push('\n');
        }
    }
}

fn emit_quoted(out: &mut String, key: &str, value: &FieldValue) {
    match &value.comment {
        Some(comment) => out.push_str(&format!("\t{key}=\"{}\"  {}\n", value.value, comment)),
        None => out.push_str(&format!("\t{key}=\"{}\"\n", value.value)),
    }
}
