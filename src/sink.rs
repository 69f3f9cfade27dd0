//! Destinations for part payloads.
//!
//! A [`PartSink`] receives each part's bytes as soon as the scanner releases
//! them. Implementations must not assume a handle stays open between calls:
//! every call is a complete acquire/write/release.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

/// Incremental storage for part payloads, keyed by the part identifier.
pub trait PartSink {
    /// Creates `id` fresh, replacing any previous content, and stores `data`.
    fn create(&mut self, id: &str, data: &[u8]) -> io::Result<()>;

    /// Appends `data` to an output previously created with [`create`](PartSink::create).
    fn append(&mut self, id: &str, data: &[u8]) -> io::Result<()>;

    /// Signals that `id` will receive no more data.
    fn finalize(&mut self, id: &str) -> io::Result<()> {
        let _ = id;
        Ok(())
    }
}

impl<S: PartSink + ?Sized> PartSink for &mut S {
    fn create(&mut self, id: &str, data: &[u8]) -> io::Result<()> {
        (**self).create(id, data)
    }

    fn append(&mut self, id: &str, data: &[u8]) -> io::Result<()> {
        (**self).append(id, data)
    }

    fn finalize(&mut self, id: &str) -> io::Result<()> {
        (**self).finalize(id)
    }
}

/// Keeps every part in memory, in creation order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemorySink {
    entries: Vec<MemoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MemoryEntry {
    id: String,
    data: Vec<u8>,
    finalized: bool,
}

impl MemorySink {
    pub fn new() -> MemorySink {
        MemorySink::default()
    }

    /// Returns the bytes stored under `id`.
    pub fn get(&self, id: &str) -> Option<&[u8]> {
        self.entry(id).map(|entry| entry.data.as_slice())
    }

    pub fn is_finalized(&self, id: &str) -> bool {
        self.entry(id).map_or(false, |entry| entry.finalized)
    }

    /// Identifiers in the order they were first created.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, id: &str) -> Option<&MemoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    fn entry_mut(&mut self, id: &str) -> io::Result<&mut MemoryEntry> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no output named '{}'", id)))
    }
}

impl PartSink for MemorySink {
    fn create(&mut self, id: &str, data: &[u8]) -> io::Result<()> {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.data = data.to_vec();
                entry.finalized = false;
            }
            None => self.entries.push(MemoryEntry {
                id: id.to_owned(),
                data: data.to_vec(),
                finalized: false,
            }),
        }
        Ok(())
    }

    fn append(&mut self, id: &str, data: &[u8]) -> io::Result<()> {
        self.entry_mut(id)?.data.extend_from_slice(data);
        Ok(())
    }

    fn finalize(&mut self, id: &str) -> io::Result<()> {
        self.entry_mut(id)?.finalized = true;
        Ok(())
    }
}

/// Writes each part to a file named after its identifier inside a root
/// directory.
///
/// Files are opened per call and closed before the call returns.
#[derive(Debug, Clone)]
pub struct FileSink {
    root: PathBuf,
}

impl FileSink {
    pub fn new<P: Into<PathBuf>>(root: P) -> FileSink {
        FileSink { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `id` inside the root. Identifiers must be a single plain file
    /// name so a client cannot write outside the root.
    pub fn path_for(&self, id: &str) -> io::Result<PathBuf> {
        let mut components = Path::new(id).components();

        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if !id.contains('\\') => Ok(self.root.join(name)),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsafe output name '{}'", id),
            )),
        }
    }
}

impl PartSink for FileSink {
    fn create(&mut self, id: &str, data: &[u8]) -> io::Result<()> {
        fs::write(self.path_for(id)?, data)
    }

    fn append(&mut self, id: &str, data: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(self.path_for(id)?)?;
        file.write_all(data)
    }
}
