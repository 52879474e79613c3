//! Dump container codec
//!
//! A dump is an ordered sequence of `key=value` text lines, where keys are
//! slash paths (`/0/data/xres`). Grid data is embedded as a binary entry: a
//! `key=[` line, a single `[` byte, `xres·yres` little-endian doubles, and a
//! closing `]]` plus newline. The `key/xres` and `key/yres` text entries must
//! precede the array so the reader knows how many samples to consume.
//!
//! Entries this plug-in does not understand (units, real-world extents,
//! metadata) are preserved byte-for-byte and in order when the dump is
//! rewritten, so a round trip through the codec only changes the entries we
//! deliberately touched.

use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

use crate::domain::{DataField, FieldError};

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line} has no '=' separator")]
    Malformed { line: usize },

    #[error("line {line} is not valid UTF-8")]
    NotText { line: usize },

    #[error("field '{key}' has no preceding '{key}/{dim}' entry")]
    MissingDimension { key: String, dim: &'static str },

    #[error("field '{key}' has invalid {dim} '{value}'")]
    InvalidDimension {
        key: String,
        dim: &'static str,
        value: String,
    },

    #[error("field '{key}' dimensions overflow the addressable size")]
    FieldTooLarge { key: String },

    #[error("field '{key}' data is truncated: expected {expected} bytes, got {got}")]
    Truncated {
        key: String,
        expected: usize,
        got: usize,
    },

    #[error("field '{key}' array framing is corrupt")]
    BadFraming { key: String },

    #[error("field '{key}' is invalid: {source}")]
    Field {
        key: String,
        #[source]
        source: FieldError,
    },

    #[error("dump has no entry '{key}'")]
    MissingKey { key: String },

    #[error("entry '{key}' is not a data field")]
    NotAField { key: String },

    #[error("dump has no target path to save to")]
    NoTarget,
}

/// A single dump entry: either a plain text value or an embedded data field
#[derive(Debug, Clone, PartialEq)]
pub enum DumpValue {
    Text(String),
    Field(DataField),
}

/// An in-memory dump container
///
/// Remembers the path it was loaded from and a separate *target* path that
/// [`Dump::save`] writes to. The target defaults to the source, but the host
/// environment may redirect it before saving.
#[derive(Debug, Clone)]
pub struct Dump {
    entries: Vec<(String, DumpValue)>,
    source: Option<PathBuf>,
    target: Option<PathBuf>,
}

impl Dump {
    /// Creates an empty dump with no source or target
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            source: None,
            target: None,
        }
    }

    /// Loads a dump from a file.
    ///
    /// The target path is initialized to the source path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DumpError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let entries = parse(&bytes)?;

        Ok(Self {
            entries,
            source: Some(path.to_path_buf()),
            target: Some(path.to_path_buf()),
        })
    }

    /// The path this dump was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// The path [`Dump::save`] will write to, if any
    pub fn target(&self) -> Option<&Path> {
        self.target.as_deref()
    }

    /// Redirects where the dump will be persisted
    pub fn set_target(&mut self, path: impl Into<PathBuf>) {
        self.target = Some(path.into());
    }

    /// All entries in file order
    pub fn entries(&self) -> &[(String, DumpValue)] {
        &self.entries
    }

    /// Looks up an entry by key
    pub fn get(&self, key: &str) -> Option<&DumpValue> {
        self.entries
            .iter()
            .find_map(|(k, v)| if k == key { Some(v) } else { None })
    }

    /// Returns the data field stored under `key`
    pub fn data_field(&self, key: &str) -> Result<&DataField, DumpError> {
        match self.get(key) {
            Some(DumpValue::Field(field)) => Ok(field),
            Some(_) => Err(DumpError::NotAField {
                key: key.to_string(),
            }),
            None => Err(DumpError::MissingKey {
                key: key.to_string(),
            }),
        }
    }

    /// Sets a text entry, updating it in place if the key already exists
    pub fn set_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(k, v)| *k == key && matches!(v, DumpValue::Text(_)))
        {
            Some(entry) => entry.1 = DumpValue::Text(value),
            None => self.entries.push((key, DumpValue::Text(value))),
        }
    }

    /// Stores a data field under `key`, keeping its `xres`/`yres` text
    /// entries in sync.
    ///
    /// An existing field is replaced in place; a new field gets its
    /// dimension entries inserted ahead of the array, as the format
    /// requires.
    pub fn set_field(&mut self, key: &str, field: DataField) {
        let xkey = format!("{key}/xres");
        let ykey = format!("{key}/yres");
        let xres = field.xres().to_string();
        let yres = field.yres().to_string();

        let existing = self
            .entries
            .iter()
            .position(|(k, v)| k == key && matches!(v, DumpValue::Field(_)));

        match existing {
            Some(idx) => {
                self.entries[idx].1 = DumpValue::Field(field);
                let idx = self.upsert_text_before(idx, &xkey, xres);
                self.upsert_text_before(idx, &ykey, yres);
            }
            None => {
                self.entries.push((xkey, DumpValue::Text(xres)));
                self.entries.push((ykey, DumpValue::Text(yres)));
                self.entries.push((key.to_string(), DumpValue::Field(field)));
            }
        }
    }

    /// Updates a text entry if present, otherwise inserts it before the
    /// entry at `before`. Returns the (possibly shifted) index of `before`.
    fn upsert_text_before(&mut self, before: usize, key: &str, value: String) -> usize {
        match self
            .entries
            .iter()
            .position(|(k, v)| k == key && matches!(v, DumpValue::Text(_)))
        {
            Some(i) => {
                self.entries[i].1 = DumpValue::Text(value);
                before
            }
            None => {
                self.entries.insert(before, (key.to_string(), DumpValue::Text(value)));
                before + 1
            }
        }
    }

    /// Persists the dump to its target path
    pub fn save(&self) -> Result<(), DumpError> {
        match &self.target {
            Some(target) => self.save_to(target.clone()),
            None => Err(DumpError::NoTarget),
        }
    }

    /// Persists the dump to an explicit path.
    ///
    /// Writes go through a temp file under an exclusive lock and are renamed
    /// into place, so a failed save never leaves a half-written dump behind.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), DumpError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = path.with_extension("dump.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;

            file.lock_exclusive()?;

            let mut writer = BufWriter::new(&file);
            writer.write_all(&self.to_bytes())?;
            writer.flush()?;
        }

        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Serializes all entries in order to the on-disk format
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();

        for (key, value) in &self.entries {
            match value {
                DumpValue::Text(text) => {
                    out.extend_from_slice(key.as_bytes());
                    out.push(b'=');
                    out.extend_from_slice(text.as_bytes());
                    out.push(b'\n');
                }
                DumpValue::Field(field) => {
                    out.extend_from_slice(key.as_bytes());
                    out.extend_from_slice(b"=[\n[");
                    for v in field.data() {
                        out.extend_from_slice(&v.to_le_bytes());
                    }
                    out.extend_from_slice(b"]]\n");
                }
            }
        }

        out
    }
}

impl Default for Dump {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses raw dump bytes into ordered entries
fn parse(bytes: &[u8]) -> Result<Vec<(String, DumpValue)>, DumpError> {
    let mut entries: Vec<(String, DumpValue)> = Vec::new();
    let mut pos = 0;
    let mut line_no = 0;

    while pos < bytes.len() {
        line_no += 1;

        let (line, after_line) = match bytes[pos..].iter().position(|&b| b == b'\n') {
            Some(i) => (&bytes[pos..pos + i], pos + i + 1),
            None => (&bytes[pos..], bytes.len()),
        };

        if line.is_empty() {
            pos = after_line;
            continue;
        }

        let line_str =
            std::str::from_utf8(line).map_err(|_| DumpError::NotText { line: line_no })?;

        if let Some(key) = line_str.strip_suffix("=[") {
            pos = parse_field(bytes, after_line, key, &mut entries)?;
        } else if let Some(eq) = line_str.find('=') {
            entries.push((
                line_str[..eq].to_string(),
                DumpValue::Text(line_str[eq + 1..].to_string()),
            ));
            pos = after_line;
        } else {
            return Err(DumpError::Malformed { line: line_no });
        }
    }

    Ok(entries)
}

/// Parses the binary payload of a field entry starting right after the
/// `key=[` line. Returns the position past the closing frame.
fn parse_field(
    bytes: &[u8],
    start: usize,
    key: &str,
    entries: &mut Vec<(String, DumpValue)>,
) -> Result<usize, DumpError> {
    let xres = dimension(entries, key, "xres")?;
    let yres = dimension(entries, key, "yres")?;

    let byte_len = xres
        .checked_mul(yres)
        .and_then(|n| n.checked_mul(8))
        .ok_or_else(|| DumpError::FieldTooLarge {
            key: key.to_string(),
        })?;

    if bytes.len() <= start || bytes[start] != b'[' {
        return Err(DumpError::BadFraming {
            key: key.to_string(),
        });
    }

    let data_start = start + 1;
    let data_end = data_start + byte_len;

    if bytes.len() < data_end {
        return Err(DumpError::Truncated {
            key: key.to_string(),
            expected: byte_len,
            got: bytes.len() - data_start,
        });
    }

    let data: Vec<f64> = bytes[data_start..data_end]
        .chunks_exact(8)
        .map(|chunk| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            f64::from_le_bytes(raw)
        })
        .collect();

    if bytes.len() < data_end + 2 || &bytes[data_end..data_end + 2] != b"]]" {
        return Err(DumpError::BadFraming {
            key: key.to_string(),
        });
    }

    let mut next = data_end + 2;
    if bytes.get(next) == Some(&b'\n') {
        next += 1;
    }

    let field = DataField::new(xres, yres, data).map_err(|e| DumpError::Field {
        key: key.to_string(),
        source: e,
    })?;
    entries.push((key.to_string(), DumpValue::Field(field)));

    Ok(next)
}

/// Resolves a field's dimension from the text entries seen so far
fn dimension(
    entries: &[(String, DumpValue)],
    key: &str,
    dim: &'static str,
) -> Result<usize, DumpError> {
    let full_key = format!("{key}/{dim}");

    let value = entries
        .iter()
        .rev()
        .find_map(|(k, v)| match v {
            DumpValue::Text(s) if k == &full_key => Some(s.as_str()),
            _ => None,
        })
        .ok_or_else(|| DumpError::MissingDimension {
            key: key.to_string(),
            dim,
        })?;

    value
        .trim()
        .parse::<usize>()
        .map_err(|_| DumpError::InvalidDimension {
            key: key.to_string(),
            dim,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_dump() -> Dump {
        let mut dump = Dump::new();
        dump.set_text("/0/data/title", "Height");
        let field = DataField::new(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        dump.set_field("/0/data", field);
        dump.set_text("/0/data/unit-z", "m");
        dump
    }

    #[test]
    fn round_trip_preserves_entries() {
        let dump = sample_dump();
        let bytes = dump.to_bytes();

        let parsed = parse(&bytes).unwrap();
        assert_eq!(parsed.len(), dump.entries().len());
        assert_eq!(parsed, dump.entries());
    }

    #[test]
    fn set_field_inserts_dimensions_first() {
        let dump = sample_dump();
        let keys: Vec<&str> = dump.entries().iter().map(|(k, _)| k.as_str()).collect();

        let xres_idx = keys.iter().position(|&k| k == "/0/data/xres").unwrap();
        let yres_idx = keys.iter().position(|&k| k == "/0/data/yres").unwrap();
        let field_idx = keys.iter().position(|&k| k == "/0/data").unwrap();

        assert!(xres_idx < field_idx);
        assert!(yres_idx < field_idx);
    }

    #[test]
    fn set_field_replaces_in_place() {
        let mut dump = sample_dump();
        let order_before: Vec<String> =
            dump.entries().iter().map(|(k, _)| k.clone()).collect();

        let field = DataField::new(2, 2, vec![4.0, 3.0, 2.0, 1.0]).unwrap();
        dump.set_field("/0/data", field);

        let order_after: Vec<String> =
            dump.entries().iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(order_before, order_after);

        let stored = dump.data_field("/0/data").unwrap();
        assert_eq!(stored.data(), &[4.0, 3.0, 2.0, 1.0]);
    }

    #[test]
    fn unknown_entries_survive_rewrite() {
        let mut dump = sample_dump();
        dump.set_text("/0/data/xreal", "1.0e-6");

        let reparsed = parse(&dump.to_bytes()).unwrap();
        let xreal = reparsed
            .iter()
            .find(|(k, _)| k == "/0/data/xreal")
            .map(|(_, v)| v.clone());
        assert_eq!(xreal, Some(DumpValue::Text("1.0e-6".to_string())));
    }

    #[test]
    fn missing_dimension_is_an_error() {
        let bytes = b"/0/data/yres=2\n/0/data=[\n[";
        let err = parse(bytes).unwrap_err();
        assert!(matches!(err, DumpError::MissingDimension { dim: "xres", .. }));
    }

    #[test]
    fn invalid_dimension_is_an_error() {
        let bytes = b"/0/data/xres=two\n/0/data/yres=2\n/0/data=[\n[";
        let err = parse(bytes).unwrap_err();
        assert!(matches!(err, DumpError::InvalidDimension { dim: "xres", .. }));
    }

    #[test]
    fn truncated_array_is_an_error() {
        let mut bytes = b"/0/data/xres=2\n/0/data/yres=2\n/0/data=[\n[".to_vec();
        bytes.extend_from_slice(&1.0f64.to_le_bytes());

        let err = parse(&bytes).unwrap_err();
        assert!(matches!(err, DumpError::Truncated { expected: 32, .. }));
    }

    #[test]
    fn corrupt_framing_is_an_error() {
        let mut bytes = b"/0/data/xres=1\n/0/data/yres=1\n/0/data=[\n[".to_vec();
        bytes.extend_from_slice(&1.0f64.to_le_bytes());
        bytes.extend_from_slice(b"]x");

        let err = parse(&bytes).unwrap_err();
        assert!(matches!(err, DumpError::BadFraming { .. }));
    }

    #[test]
    fn line_without_separator_is_an_error() {
        let err = parse(b"no separator here\n").unwrap_err();
        assert!(matches!(err, DumpError::Malformed { line: 1 }));
    }

    #[test]
    fn load_missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = Dump::load(dir.path().join("absent.dump")).unwrap_err();
        assert!(matches!(err, DumpError::Io(_)));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.dump");

        let dump = sample_dump();
        dump.save_to(&path).unwrap();

        let loaded = Dump::load(&path).unwrap();
        assert_eq!(loaded.entries(), dump.entries());
        assert_eq!(loaded.source(), Some(path.as_path()));
        assert_eq!(loaded.target(), Some(path.as_path()));
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.dump");

        sample_dump().save_to(&path).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("dump.tmp").exists());
    }

    #[test]
    fn save_follows_redirected_target() {
        let dir = TempDir::new().unwrap();
        let original = dir.path().join("in.dump");
        sample_dump().save_to(&original).unwrap();

        let mut dump = Dump::load(&original).unwrap();
        let redirected = dir.path().join("out.dump");
        dump.set_target(&redirected);
        dump.save().unwrap();

        assert!(redirected.exists());
    }

    #[test]
    fn data_field_on_text_entry_is_an_error() {
        let dump = sample_dump();
        let err = dump.data_field("/0/data/title").unwrap_err();
        assert!(matches!(err, DumpError::NotAField { .. }));

        let err = dump.data_field("/1/data").unwrap_err();
        assert!(matches!(err, DumpError::MissingKey { .. }));
    }

    #[test]
    fn save_without_target_is_an_error() {
        let dump = Dump::new();
        assert!(matches!(dump.save(), Err(DumpError::NoTarget)));
    }
}
