//! Destinations for decoded entries
//!
//! The archive walker hands every decoded entry to an [`EntrySink`]. The
//! crate ships a filesystem sink rooted at an output directory and an
//! in-memory sink.

use log::debug;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::common::{PakError, Result};
use crate::entry::RawEntry;

/// Receives decoded entries in archive order
pub trait EntrySink {
    /// Called once an entry is framed, before its payload is decoded
    fn begin_entry(&mut self, _entry: &RawEntry<'_>) -> Result<()> {
        Ok(())
    }

    /// Persist one entry
    fn write_entry(&mut self, index: usize, name: &str, data: &[u8]) -> Result<()>;
}

impl<S: EntrySink + ?Sized> EntrySink for &mut S {
    fn begin_entry(&mut self, entry: &RawEntry<'_>) -> Result<()> {
        (**self).begin_entry(entry)
    }

    fn write_entry(&mut self, index: usize, name: &str, data: &[u8]) -> Result<()> {
        (**self).write_entry(index, name, data)
    }
}

/// How entry names are checked before joining them to the output root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathSafety {
    /// Reject absolute names and any `..` component
    #[default]
    Strict,
    /// Join names as stored, without any checks
    Disabled,
}

/// Resolve an entry name to a path under `root`
pub fn resolve_entry_path(
    root: &Path,
    index: usize,
    name: &str,
    policy: PathSafety,
) -> Result<PathBuf> {
    if policy == PathSafety::Disabled {
        return Ok(root.join(name));
    }

    let unsafe_path = || PakError::UnsafePath {
        index,
        name: name.to_string(),
    };

    let normalized = name.replace('\\', "/");
    let mut path = root.to_path_buf();
    let mut depth = 0usize;

    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => {
                path.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(unsafe_path());
            }
        }
    }

    if depth == 0 {
        return Err(unsafe_path());
    }

    Ok(path)
}

/// Writes entries as files below an output directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
    policy: PathSafety,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    /// Create a sink rooted at `root` with strict path checks
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            policy: PathSafety::default(),
            written: Vec::new(),
        }
    }

    /// Set the path safety policy
    pub fn with_path_safety(mut self, policy: PathSafety) -> Self {
        self.policy = policy;
        self
    }

    /// Output root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files written so far, in archive order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl EntrySink for DirectorySink {
    fn write_entry(&mut self, index: usize, name: &str, data: &[u8]) -> Result<()> {
        let path = resolve_entry_path(&self.root, index, name, self.policy)?;
        write_file(&path, data)?;
        self.written.push(path);
        Ok(())
    }
}

/// Create parent directories and write `data` to `path`
pub(crate) fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.is_dir() {
            fs::create_dir_all(parent).map_err(|source| PakError::OutputUnwritable {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    fs::write(path, data).map_err(|source| PakError::OutputUnwritable {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

/// Collects entries in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    /// Entries as `(name, data)` pairs in archive order
    pub entries: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry's data by name
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, data)| data.as_slice())
    }
}

impl EntrySink for MemorySink {
    fn write_entry(&mut self, _index: usize, name: &str, data: &[u8]) -> Result<()> {
        self.entries.push((name.to_string(), data.to_vec()));
        Ok(())
    }
}
