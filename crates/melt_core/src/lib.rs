//! Parser and rewriter for CKII character history files.
//!
//! Files are scanned line by line into character records plus opaque
//! literal text, indexed by id and by dynasty, and written back out with a
//! minimal diff: a record nothing mutated is reproduced byte-for-byte
//! (modulo newline normalization), while a record marked dirty is
//! reconstructed in canonical field order with its inline comments intact.

pub mod character;
pub mod codec;
pub mod database;
pub mod date;
pub mod error;
pub mod file;
pub mod history;
mod lines;
mod patterns;
pub mod value;

pub use character::Character;
pub use database::{CharId, Database};
pub use date::DateVal;
pub use error::{CoreError, Result};
pub use file::HistoryFile;
pub use value::{DynastyVal, FieldValue};
