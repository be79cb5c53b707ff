//! Orchestrates the front end and the harness generator over translation units.
//!
//! Two entry points:
//! - [`Driver::generate`] takes one unit's text and returns the generated code.
//! - [`Driver::run`] takes a list of files and streams a complete generated
//!   header (preamble plus every harness block) to a writer.

mod status;

pub use status::RunStatus;

use ramfuzz_build::RamfuzzConfig;
use ramfuzz_common::{SourceFile, SourceId, SourceMap};
use ramfuzz_decl::{Provenance, TranslationUnitDecls};
use ramfuzz_frontend_cpp::FrontendError;
use ramfuzz_harness::{HarnessGenerator, HarnessOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name under which in-memory code is registered.
const IN_MEMORY_NAME: &str = "input.cc";

/// A parsed source file together with the files it includes.
#[derive(Debug)]
pub struct LoadedUnit {
    pub main: TranslationUnitDecls,
    /// Units reached through quoted includes that were parsed for the first
    /// time while loading `main`.
    pub included: Vec<TranslationUnitDecls>,
}

impl LoadedUnit {
    /// Included units first, then the main unit.
    pub fn units(&self) -> impl Iterator<Item = &TranslationUnitDecls> {
        self.included.iter().chain(std::iter::once(&self.main))
    }
}

/// Harness generation driver.
pub struct Driver {
    source_map: SourceMap,
    generator: HarnessGenerator,
    preamble: Vec<String>,
    include_dirs: Vec<PathBuf>,
    follow_includes: bool,
}

impl Driver {
    pub fn new(options: HarnessOptions) -> Self {
        Self {
            source_map: SourceMap::new(),
            generator: HarnessGenerator::new(options),
            preamble: vec!["memory".to_string()],
            include_dirs: Vec::new(),
            follow_includes: true,
        }
    }

    pub fn from_config(config: &RamfuzzConfig) -> Self {
        Self::new(config.harness_options())
            .with_preamble(config.harness.preamble.clone())
            .with_include_dirs(config.include_dirs())
            .with_follow_includes(config.sources.follow_includes)
    }

    /// Standard headers written at the top of [`Driver::run`] output.
    pub fn with_preamble(mut self, headers: Vec<String>) -> Self {
        self.preamble = headers;
        self
    }

    /// Directories searched for quoted includes after the including file's
    /// own directory.
    pub fn with_include_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.include_dirs = dirs;
        self
    }

    pub fn with_follow_includes(mut self, follow: bool) -> Self {
        self.follow_includes = follow;
        self
    }

    pub fn generator(&self) -> &HarnessGenerator {
        &self.generator
    }

    /// Generate harness code for one unit given as text.
    ///
    /// Returns the blocks of every qualifying class (possibly none), or the
    /// reason the front end rejected the code. The code and its includes are
    /// registered in a map private to this call, so repeated calls do not
    /// accumulate sources in the driver.
    pub fn generate(&self, code: &str) -> Result<String, FrontendError> {
        let scratch = SourceMap::new();
        let id = scratch.add_file(IN_MEMORY_NAME, code.to_string());
        let source = registered(&scratch, id)?;
        let unit = self.load_source(&scratch, &source, None)?;
        Ok(unit.units().map(|u| self.generator.generate(u)).collect())
    }

    /// Parse a file from disk, following its quoted includes if enabled.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<LoadedUnit, FrontendError> {
        let path = path.as_ref();
        let content = read_source(path)?;
        let id = self.source_map.add_file(path, content);
        let source = registered(&self.source_map, id)?;
        self.load_source(&self.source_map, &source, path.parent())
    }

    /// Generate a complete harness header for `sources` into `out`.
    ///
    /// Writes `#include <header>` for each preamble header and
    /// `#include "source"` for each source, then the harness blocks of every
    /// source in order. A source the front end rejects is recorded in the
    /// returned status and skipped; the remaining sources are still
    /// processed. Only failures to write to `out` abort the run.
    pub fn run<W: Write>(&self, sources: &[PathBuf], out: &mut W) -> std::io::Result<RunStatus> {
        for header in &self.preamble {
            writeln!(out, "#include <{}>", header)?;
        }
        for source in sources {
            writeln!(out, "#include \"{}\"", source.display())?;
        }

        let mut status = RunStatus::default();
        for source in sources {
            let unit = match self.load_file(source) {
                Ok(unit) => unit,
                Err(err) => {
                    tracing::warn!(source = %source.display(), error = %err, "front end failed");
                    status.failures.push((source.clone(), err));
                    continue;
                }
            };

            let mut written = 0;
            for block in unit.units().flat_map(|u| self.generator.blocks(u)) {
                out.write_all(block.as_bytes())?;
                written += 1;
            }
            tracing::debug!(source = %source.display(), classes = written, "unit done");

            status.units += 1;
            status.classes += written;
        }

        Ok(status)
    }

    fn load_source(
        &self,
        map: &SourceMap,
        source: &SourceFile,
        dir: Option<&Path>,
    ) -> Result<LoadedUnit, FrontendError> {
        let main = ramfuzz_frontend_cpp::parse_file(source, Provenance::MainFile)?;
        let mut included = Vec::new();
        if self.follow_includes {
            self.load_includes(map, &main, dir, &mut included)?;
        }
        Ok(LoadedUnit { main, included })
    }

    /// Parse every quoted include of `unit` not yet in `map`, depth first.
    fn load_includes(
        &self,
        map: &SourceMap,
        unit: &TranslationUnitDecls,
        dir: Option<&Path>,
        loaded: &mut Vec<TranslationUnitDecls>,
    ) -> Result<(), FrontendError> {
        for include in &unit.includes {
            let Some(path) = self.resolve_include(&include.node, dir) else {
                tracing::warn!(include = %include.node, "include not found, skipping");
                continue;
            };
            if map.id_of(&path).is_some() {
                continue;
            }

            let content = read_source(&path)?;
            let id = map.add_file(&path, content);
            let source = registered(map, id)?;
            let decls = ramfuzz_frontend_cpp::parse_file(&source, Provenance::Included)?;
            tracing::trace!(path = %path.display(), "parsed include");

            self.load_includes(map, &decls, path.parent(), loaded)?;
            loaded.push(decls);
        }
        Ok(())
    }

    fn resolve_include(&self, target: &str, dir: Option<&Path>) -> Option<PathBuf> {
        dir.into_iter()
            .chain(self.include_dirs.iter().map(PathBuf::as_path))
            .map(|d| d.join(target))
            .find(|candidate| candidate.is_file())
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new(HarnessOptions::default())
    }
}

fn registered(map: &SourceMap, id: SourceId) -> Result<SourceFile, FrontendError> {
    map.get(id).ok_or_else(|| FrontendError::NoTree {
        path: format!("<unregistered source {}>", id.as_u32()),
    })
}

fn read_source(path: &Path) -> Result<String, FrontendError> {
    std::fs::read_to_string(path).map_err(|source| FrontendError::Read {
        path: path.display().to_string(),
        source,
    })
}
