//! The flat key space: dotted/indexed paths to textual values and file
//! attachments.
//!
//! Keys follow the form addressing convention: `parent.child` for nested
//! records, `parent.0.child` for collection elements (zero-based), and the
//! parent's own prefix for embedded records. Each key maps to one or more
//! values because form encodings repeat keys (`rating=4&rating=3`).

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tempfile::NamedTempFile;

/// A parsed form or multipart body: textual values plus file attachments,
/// both addressed by dotted/indexed path strings.
#[derive(Debug, Default, Clone)]
pub struct KeySpace {
    values: FxHashMap<String, Vec<String>>,
    files: FxHashMap<String, Vec<FileHandle>>,
}

impl KeySpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a textual value under a key. Repeated keys accumulate.
    pub fn add_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// Append a file attachment under a key. Repeated keys accumulate.
    pub fn add_file(&mut self, key: impl Into<String>, file: FileHandle) {
        self.files.entry(key.into()).or_default().push(file);
    }

    /// All textual values under a key, in submission order.
    pub fn values(&self, key: &str) -> Option<&[String]> {
        self.values.get(key).map(Vec::as_slice)
    }

    /// All file attachments under a key, in submission order.
    pub fn files(&self, key: &str) -> Option<&[FileHandle]> {
        self.files.get(key).map(Vec::as_slice)
    }

    /// Whether any value key starts with the given prefix. This is what
    /// decides whether an optional nested record gets materialized at all.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.values.keys().any(|k| k.starts_with(prefix))
    }

    /// The implied length of a record collection: one past the highest
    /// index `i` over keys of the form `field.<i>.<rest>`. Missing indices
    /// are not compacted; a gap stays a zero-valued element. Keys whose
    /// index segment is not a number are ignored.
    pub fn list_len(&self, field: &str) -> usize {
        let mut size = 0;
        for key in self.values.keys() {
            let rest = match key.strip_prefix(field).and_then(|r| r.strip_prefix('.')) {
                Some(rest) => rest,
                None => continue,
            };
            let index = match rest.split_once('.') {
                Some((segment, _)) => segment.parse::<usize>().ok(),
                None => None,
            };
            if let Some(i) = index {
                size = size.max(i + 1);
            }
        }
        size
    }

    /// Whether the space holds no values and no files.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.files.is_empty()
    }
}

/// A file attachment from a multipart submission.
///
/// Small payloads stay in memory; payloads past the configured ceiling are
/// spilled to temp-file storage by the multipart parser. Handles are cheap
/// to clone (storage is shared); the backing storage lives as long as any
/// handle does, and nothing here closes it early.
#[derive(Debug, Clone)]
pub struct FileHandle {
    name: String,
    size: u64,
    storage: Storage,
}

#[derive(Debug, Clone)]
enum Storage {
    Memory(Arc<[u8]>),
    Spilled(Arc<NamedTempFile>),
}

impl FileHandle {
    /// A handle over in-memory bytes.
    pub fn in_memory(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            storage: Storage::Memory(bytes.into()),
        }
    }

    /// A handle over a temp file already holding the payload.
    pub fn spilled(name: impl Into<String>, size: u64, file: NamedTempFile) -> Self {
        Self {
            name: name.into(),
            size,
            storage: Storage::Spilled(Arc::new(file)),
        }
    }

    /// The client-supplied file name.
    pub fn file_name(&self) -> &str {
        &self.name
    }

    /// Payload size in bytes.
    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Open a fresh reader over the payload.
    pub fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        match &self.storage {
            Storage::Memory(bytes) => Ok(Box::new(Cursor::new(&bytes[..]))),
            Storage::Spilled(file) => Ok(Box::new(File::open(file.path())?)),
        }
    }

    /// Read the whole payload into memory.
    pub fn bytes(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.size as usize);
        self.open()?.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Whether the payload lives in spilled temp-file storage.
    pub fn is_spilled(&self) -> bool {
        matches!(self.storage, Storage::Spilled(_))
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.name, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_keys_accumulate() {
        let mut space = KeySpace::new();
        space.add_value("rating", "4");
        space.add_value("rating", "3");
        space.add_value("rating", "5");
        assert_eq!(space.values("rating").unwrap(), ["4", "3", "5"]);
        assert!(space.values("missing").is_none());
    }

    #[test]
    fn prefix_scan() {
        let mut space = KeySpace::new();
        space.add_value("author.name", "Matt Holt");
        assert!(space.has_prefix("author."));
        assert!(!space.has_prefix("coauthor."));
    }

    #[test]
    fn list_len_is_max_index_plus_one() {
        let mut space = KeySpace::new();
        space.add_value("readers.0.name", "a");
        space.add_value("readers.2.name", "c");
        space.add_value("readers.x.name", "ignored");
        assert_eq!(space.list_len("readers"), 3);
        assert_eq!(space.list_len("writers"), 0);
    }

    #[test]
    fn list_len_ignores_unindexed_keys() {
        let mut space = KeySpace::new();
        space.add_value("readers", "flat");
        space.add_value("readers.name", "no index");
        assert_eq!(space.list_len("readers"), 0);
    }

    #[test]
    fn in_memory_file_roundtrip() {
        let handle = FileHandle::in_memory("message.txt", *b"All your binding are belong to us");
        assert_eq!(handle.file_name(), "message.txt");
        assert_eq!(handle.len(), 33);
        assert_eq!(handle.bytes().unwrap(), b"All your binding are belong to us");
        assert!(!handle.is_spilled());
    }

    #[test]
    fn spilled_file_roundtrip() {
        use std::io::Write;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"spilled payload").unwrap();
        let handle = FileHandle::spilled("big.bin", 15, file);
        assert!(handle.is_spilled());
        assert_eq!(handle.bytes().unwrap(), b"spilled payload");
        let clone = handle.clone();
        assert_eq!(clone.bytes().unwrap(), b"spilled payload");
    }
}
