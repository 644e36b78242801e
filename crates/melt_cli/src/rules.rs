use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

/// One melt rule: characters of `dynasty` born before the cutoff take the
/// `early` culture, everyone else the `later` one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeltRule {
    pub dynasty: u64,
    pub early: String,
    pub later: String,
}

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("{file}: line {line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },
    #[error("{file}: {source}")]
    Io {
        file: String,
        #[source]
        source: io::Error,
    },
}

/// Loads melt rules from a legacy-encoded spreadsheet export.
///
/// Fields are separated by `;` when a line contains one, else `,`, with
/// surrounding double quotes stripped per field. Blank lines and `#`
/// comments are skipped, and a leading header row (non-numeric dynasty
/// column) is tolerated. Rows are kept in file order.
pub fn load(path: &Path) -> Result<Vec<MeltRule>, RulesError> {
    let file = path.display().to_string();
    let bytes = fs::read(path).map_err(|source| RulesError::Io {
        file: file.clone(),
        source,
    })?;
    parse(&file, &melt_core::codec::decode(&bytes))
}

fn parse(file: &str, text: &str) -> Result<Vec<MeltRule>, RulesError> {
    let mut rules = Vec::new();
    let mut seen_row = false;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let sep = if line.contains(';') { ';' } else { ',' };
        let fields: Vec<&str> = line
            .split(sep)
            .map(|field| field.trim().trim_matches('"'))
            .collect();
        if fields.len() < 3 {
            return Err(parse_error(
                file,
                line_no,
                "expected dynasty, early culture, and later culture columns",
            ));
        }

        let dynasty = match fields[0].parse::<u64>() {
            Ok(dynasty) => dynasty,
            Err(_) if !seen_row => {
                // Header row.
                seen_row = true;
                continue;
            }
            Err(_) => {
                return Err(parse_error(
                    file,
                    line_no,
                    format!("'{}' is not a dynasty id", fields[0]),
                ));
            }
        };
        seen_row = true;

        if fields[1].is_empty() || fields[2].is_empty() {
            return Err(parse_error(file, line_no, "empty culture name"));
        }

        rules.push(MeltRule {
            dynasty,
            early: fields[1].to_string(),
            later: fields[2].to_string(),
        });
    }

    Ok(rules)
}

fn parse_error(file: &str, line: usize, message: impl Into<String>) -> RulesError {
    RulesError::Parse {
        file: file.to_string(),
        line,
        message: message.into(),
    }
}
