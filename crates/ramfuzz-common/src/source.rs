use miette::NamedSource;
use rustc_hash::FxHashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Index of a file in a [`SourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(u32);

impl SourceId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// A 1-based line and column, as compilers print them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The text of one file plus a table of where its lines begin.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: SourceId,
    pub path: PathBuf,
    pub content: String,
    /// Byte offset of the first character of every line.
    lines: Vec<usize>,
}

impl SourceFile {
    pub fn new(id: SourceId, path: PathBuf, content: String) -> Self {
        let mut lines = vec![0];
        lines.extend(
            content
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            id,
            path,
            content,
            lines,
        }
    }

    /// Location of a byte offset. Offsets past the end clamp to the last line.
    pub fn location(&self, offset: usize) -> Location {
        let index = match self.lines.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        Location {
            line: index as u32 + 1,
            column: (offset - self.lines[index]) as u32 + 1,
        }
    }

    /// The file contents wrapped for miette source snippets.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.path.display().to_string(), self.content.clone())
    }
}

#[derive(Debug, Default)]
struct Registry {
    files: Vec<SourceFile>,
    by_path: FxHashMap<PathBuf, SourceId>,
}

/// Every file read during a run, addressable by id or path.
///
/// Registering the same path again yields a new id; lookups by path return
/// the latest.
#[derive(Debug, Default)]
pub struct SourceMap {
    registry: RwLock<Registry>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: String) -> SourceId {
        let path = path.as_ref().to_path_buf();
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);

        let id = SourceId(registry.files.len() as u32);
        registry.by_path.insert(path.clone(), id);
        registry.files.push(SourceFile::new(id, path, content));
        id
    }

    pub fn get(&self, id: SourceId) -> Option<SourceFile> {
        self.read().files.get(id.0 as usize).cloned()
    }

    /// The id a path was registered under, if it has been added.
    pub fn id_of(&self, path: impl AsRef<Path>) -> Option<SourceId> {
        self.read().by_path.get(path.as_ref()).copied()
    }

    pub fn len(&self) -> usize {
        self.read().files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }
}
