use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use tracing::{debug, info, trace};

use crate::character::Character;
use crate::codec;
use crate::error::{CoreError, Result};
use crate::file::HistoryFile;

/// Handle to a character in the database arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharId(usize);

impl CharId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// The parsed character history: every source file plus indexes over the
/// records they contain.
///
/// Files are keyed by filename (duplicates rejected) in a sorted map, and
/// directory entries are visited in sorted name order, so indexing and
/// rewrite order are reproducible across runs. Dynasty groups keep their
/// characters in top-level appearance order.
#[derive(Debug, Default)]
pub struct Database {
    files: BTreeMap<String, HistoryFile>,
    characters: Vec<Character>,
    by_id: HashMap<u64, CharId>,
    by_dynasty: HashMap<u64, Vec<CharId>>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every regular `.txt` entry directly inside `dir`. Other
    /// entries are skipped with a notice, not an error.
    pub fn parse_dir(&mut self, dir: &Path) -> Result<()> {
        let entries = fs::read_dir(dir).map_err(|e| CoreError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CoreError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let file_type = entry.file_type().map_err(|e| CoreError::Io {
                path: entry.path(),
                source: e,
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !file_type.is_file() || !name.ends_with(".txt") {
                debug!("skipping possible history file '{name}': not a regular .txt file");
                continue;
            }
            names.push(name);
        }
        names.sort();

        for name in names {
            self.parse_file(&name, &dir.join(&name))?;
        }
        Ok(())
    }

    pub fn parse_file(&mut self, filename: &str, path: &Path) -> Result<()> {
        info!("parsing '{filename}'");
        let bytes = fs::read(path).map_err(|e| CoreError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let text = codec::decode(&bytes);
        self.parse_source(filename, &text)
    }

    /// Parses one source from already-decoded text; entry point for callers
    /// that do not go through the filesystem.
    pub fn parse_source(&mut self, filename: &str, text: &str) -> Result<()> {
        if self.files.contains_key(filename) {
            return Err(CoreError::ConflictingFilename(filename.to_string()));
        }
        let file = HistoryFile::parse(filename, text, self)?;
        self.files.insert(filename.to_string(), file);
        Ok(())
    }

    pub(crate) fn contains_id(&self, record_id: u64) -> bool {
        self.by_id.contains_key(&record_id)
    }

    pub(crate) fn register(&mut self, character: Character) -> CharId {
        let id = CharId(self.characters.len());
        trace!(
            record = character.id,
            dynasty = character.dynasty.id,
            culture = %character.culture.value,
            birth = %character.birth,
            "indexed character"
        );
        self.by_id.insert(character.id, id);
        self.by_dynasty
            .entry(character.dynasty.id)
            .or_default()
            .push(id);
        self.characters.push(character);
        id
    }

    pub fn character(&self, id: CharId) -> &Character {
        &self.characters[id.index()]
    }

    pub fn character_mut(&mut self, id: CharId) -> &mut Character {
        &mut self.characters[id.index()]
    }

    pub fn lookup(&self, record_id: u64) -> Option<CharId> {
        self.by_id.get(&record_id).copied()
    }

    /// Characters of a dynasty in their original appearance order; empty
    /// for a dynasty no parsed record uses.
    pub fn characters_by_dynasty(&self, dynasty: u64) -> &[CharId] {
        self.by_dynasty
            .get(&dynasty)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Renders one parsed file back to text without touching the
    /// filesystem.
    pub fn render_file(&self, filename: &str) -> Option<String> {
        self.files
            .get(filename)
            .map(|file| file.render(&self.characters))
    }

    /// Rewrites every parsed file into `out_dir`, in sorted filename order.
    /// Each destination must not already exist.
    pub fn rewrite(&self, out_dir: &Path) -> Result<()> {
        for (filename, file) in &self.files {
            info!("rewriting '{filename}'");
            file.rewrite(out_dir, &self.characters)?;
        }
        Ok(())
    }
}
