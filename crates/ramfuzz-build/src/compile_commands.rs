//! Reading a clang compilation database.
//!
//! A `compile_commands.json` (as written by CMake or Bear) names every
//! translation unit of a project together with its compiler invocation.
//! RamFuzz takes its source list from it and collects the directories that
//! quoted includes may resolve against.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Flags whose argument is a directory searched for `#include "..."`.
const INCLUDE_FLAGS: [&str; 3] = ["-iquote", "-isystem", "-I"];

/// One entry of the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileCommand {
    /// Directory the compiler ran in; relative paths are resolved against it.
    pub directory: PathBuf,
    pub file: PathBuf,
    /// Shell-quoted command line. Entries carry either this or `arguments`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl CompileCommand {
    /// The compiler argv, taken from `arguments` or split from `command`.
    pub fn argv(&self) -> Vec<String> {
        match (&self.arguments, &self.command) {
            (Some(arguments), _) => arguments.clone(),
            (None, Some(command)) => split_command(command),
            (None, None) => Vec::new(),
        }
    }

    /// The translation unit this entry compiles.
    pub fn source_path(&self) -> PathBuf {
        self.directory.join(&self.file)
    }

    /// Directories given with `-I`, `-iquote` or `-isystem`, in argv order.
    pub fn include_dirs(&self) -> Vec<PathBuf> {
        let argv = self.argv();
        let mut dirs = Vec::new();
        let mut args = argv.iter();

        while let Some(arg) = args.next() {
            let Some(flag) = INCLUDE_FLAGS.iter().find(|f| arg.starts_with(**f)) else {
                continue;
            };
            let dir = if arg.len() == flag.len() {
                match args.next() {
                    Some(next) => next.as_str(),
                    None => break,
                }
            } else {
                &arg[flag.len()..]
            };
            dirs.push(self.directory.join(dir));
        }

        dirs
    }
}

/// A parsed `compile_commands.json`.
#[derive(Debug, Clone, Default)]
pub struct CompileCommands {
    entries: Vec<CompileCommand>,
}

impl CompileCommands {
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(Self {
            entries: serde_json::from_str(json)?,
        })
    }

    pub fn commands(&self) -> &[CompileCommand] {
        &self.entries
    }

    /// Translation units in database order, each listed once.
    pub fn sources(&self) -> Vec<PathBuf> {
        dedup(self.entries.iter().map(CompileCommand::source_path))
    }

    /// Include directories of every entry, each listed once.
    pub fn all_includes(&self) -> Vec<PathBuf> {
        dedup(self.entries.iter().flat_map(CompileCommand::include_dirs))
    }
}

fn dedup(paths: impl Iterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut seen = Vec::new();
    for path in paths {
        if !seen.contains(&path) {
            seen.push(path);
        }
    }
    seen
}

/// Split a command line the way a POSIX shell would for the subset that shows
/// up in compilation databases: whitespace, single and double quotes, and
/// backslash escapes.
fn split_command(command: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = command.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') | (None, '\\') => {
                if let Some(escaped) = chars.next() {
                    word.push(escaped);
                }
                in_word = true;
            }
            (Some(_), c) => word.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            (None, c) => {
                word.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(word);
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_dirs_from_both_forms() {
        let json = r#"[
            {
                "directory": "/work/build",
                "file": "/work/src/shape.cc",
                "command": "c++ -I/usr/include -I ../include -iquote../quoted -DNDEBUG -c shape.cc"
            },
            {
                "directory": "/work/build",
                "file": "../src/grid.cc",
                "arguments": ["c++", "-isystem", "/opt/vendor", "-I/usr/include", "-c", "grid.cc"]
            }
        ]"#;

        let db = CompileCommands::from_json(json).unwrap();
        assert_eq!(db.commands().len(), 2);
        assert_eq!(
            db.commands()[0].include_dirs(),
            vec![
                PathBuf::from("/usr/include"),
                PathBuf::from("/work/build/../include"),
                PathBuf::from("/work/build/../quoted"),
            ]
        );
        assert_eq!(
            db.all_includes(),
            vec![
                PathBuf::from("/usr/include"),
                PathBuf::from("/work/build/../include"),
                PathBuf::from("/work/build/../quoted"),
                PathBuf::from("/opt/vendor"),
            ]
        );
    }

    #[test]
    fn test_sources_are_resolved_and_unique() {
        let json = r#"[
            {"directory": "/build", "file": "src/a.cc", "command": "c++ -c src/a.cc"},
            {"directory": "/build", "file": "/abs/b.cc", "command": "c++ -c /abs/b.cc"},
            {"directory": "/build", "file": "src/a.cc", "command": "c++ -O2 -c src/a.cc"}
        ]"#;

        let db = CompileCommands::from_json(json).unwrap();
        assert_eq!(
            db.sources(),
            vec![PathBuf::from("/build/src/a.cc"), PathBuf::from("/abs/b.cc")]
        );
    }

    #[test]
    fn test_split_command_quoting() {
        assert_eq!(
            split_command(r#"c++  -I"/path with space" -D'MSG="hi"' a\ b.cc"#),
            vec!["c++", "-I/path with space", "-DMSG=\"hi\"", "a b.cc"]
        );
        assert_eq!(split_command("   "), Vec::<String>::new());
        assert_eq!(split_command(r#"x """#), vec!["x", ""]);
    }

    #[test]
    fn test_trailing_flag_without_directory() {
        let cmd = CompileCommand {
            directory: PathBuf::from("/b"),
            file: PathBuf::from("a.cc"),
            command: Some("c++ -c a.cc -I".to_string()),
            arguments: None,
            output: None,
        };
        assert!(cmd.include_dirs().is_empty());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            CompileCommands::from_json("{not json"),
            Err(crate::BuildError::ParseJson(_))
        ));
    }
}
