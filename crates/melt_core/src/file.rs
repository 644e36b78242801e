use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use crate::character::Character;
use crate::codec;
use crate::database::{CharId, Database};
use crate::error::{CoreError, ParseCtx, Result};
use crate::lines::{LineCursor, RawLine};
use crate::patterns;

/// One source file: its top-level elements in input order.
///
/// Characters live in the owning database's arena and are referenced here
/// by handle, so the file can replay them in place on rewrite.
#[derive(Debug)]
pub struct HistoryFile {
    filename: String,
    elems: Vec<FileElem>,
}

#[derive(Debug)]
enum FileElem {
    Literal(RawLine),
    Character(CharId),
}

impl HistoryFile {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Scans decoded source text into top-level elements, registering every
    /// character record with `db` as it completes. Any top-level line that
    /// is neither a record opener nor blank-or-comment is fatal.
    pub(crate) fn parse(filename: &str, text: &str, db: &mut Database) -> Result<Self> {
        let ctx = ParseCtx { file: filename };
        let mut cursor = LineCursor::new(text);
        let mut elems = Vec::new();

        while let Some((line, had_eol)) = cursor.next_line() {
            let n = cursor.line();

            if let Some(id) = patterns::record_opener(line) {
                if db.contains_id(id) {
                    return Err(ctx.error(n, format!("duplicate character id {id}")));
                }
                let character = Character::parse(ctx, &mut cursor, id, line)?;
                elems.push(FileElem::Character(db.register(character)));
                continue;
            }

            if patterns::is_blank_or_comment(line) {
                elems.push(FileElem::Literal(RawLine::captured(line, had_eol)));
                continue;
            }

            return Err(ctx.error(n, "unexpected token at top level of history file"));
        }

        Ok(Self {
            filename: filename.to_string(),
            elems,
        })
    }

    /// Produces the complete output text, replaying every element in input
    /// order.
    pub fn render(&self, characters: &[Character]) -> String {
        let mut out = String::new();
        for elem in &self.elems {
            match elem {
                FileElem::Literal(line) => line.emit(&mut out),
                FileElem::Character(id) => characters[id.index()].emit(&mut out),
            }
        }
        out
    }

    /// Encodes the rendered text and writes it to `out_dir` under this
    /// file's own name. The destination must not already exist.
    pub(crate) fn rewrite(&self, out_dir: &Path, characters: &[Character]) -> Result<()> {
        let path = out_dir.join(&self.filename);
        let text = self.render(characters);
        let bytes = codec::encode(&text).map_err(|source| CoreError::Encode {
            file: self.filename.clone(),
            source,
        })?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(CoreError::OutputExists { path });
            }
            Err(e) => return Err(CoreError::Io { path, source: e }),
        };
        file.write_all(&bytes)
            .map_err(|e| CoreError::Io { path, source: e })
    }
}
