//! Aggregator (`mod.rs`) files for an emitted module tree.
//!
//! Every directory that transitively contains an emitted module gets a
//! `mod.rs` declaring its immediate children. Ancestors are added until a
//! fixed point is reached; the target root itself has no aggregator.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::generate::{EmittedFile, Language, RenderedFile};
use crate::naming;

/// File name of an aggregator.
pub const INDEX_FILE: &str = "mod.rs";

/// Collects emitted modules and closes them into a [`ModuleIndex`].
#[derive(Debug, Clone, Default)]
pub struct ModuleIndexBuilder {
    entries: BTreeMap<Vec<String>, BTreeSet<String>>,
}

/// Directory → immediate child modules, closed over ancestors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleIndex {
    entries: BTreeMap<Vec<String>, BTreeSet<String>>,
}

impl ModuleIndexBuilder {
    /// Empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one emitted module. Modules at the target root are ignored.
    pub fn add(&mut self, file: &EmittedFile) {
        if file.module_path.is_empty() {
            return;
        }
        self.entries
            .entry(file.module_path.clone())
            .or_default()
            .insert(file.module_name.clone());
    }

    /// Add every ancestor directory to its parent until nothing changes.
    #[must_use]
    pub fn build(mut self) -> ModuleIndex {
        loop {
            let links: Vec<(Vec<String>, String)> = self
                .entries
                .keys()
                .filter(|dir| dir.len() > 1)
                .filter_map(|dir| {
                    let (child, parent) = dir.split_last()?;
                    Some((parent.to_vec(), child.clone()))
                })
                .collect();

            let mut changed = false;
            for (parent, child) in links {
                changed |= self.entries.entry(parent).or_default().insert(child);
            }
            if !changed {
                break;
            }
        }
        ModuleIndex {
            entries: self.entries,
        }
    }
}

impl Extend<EmittedFile> for ModuleIndexBuilder {
    fn extend<I: IntoIterator<Item = EmittedFile>>(&mut self, iter: I) {
        for file in iter {
            self.add(&file);
        }
    }
}

impl<'a> Extend<&'a EmittedFile> for ModuleIndexBuilder {
    fn extend<I: IntoIterator<Item = &'a EmittedFile>>(&mut self, iter: I) {
        for file in iter {
            self.add(file);
        }
    }
}

impl ModuleIndex {
    /// Directories and their children, in path order.
    pub fn entries(&self) -> impl Iterator<Item = (&[String], &BTreeSet<String>)> {
        self.entries.iter().map(|(dir, children)| (dir.as_slice(), children))
    }

    /// Children of one directory.
    #[must_use]
    pub fn children(&self, dir: &[String]) -> Option<&BTreeSet<String>> {
        self.entries.get(dir)
    }

    /// Number of aggregators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no module was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One `mod.rs` per directory, children sorted.
    #[must_use]
    pub fn render(&self) -> Vec<RenderedFile> {
        self.entries
            .iter()
            .map(|(dir, children)| {
                let mut path: PathBuf = dir.iter().collect();
                path.push(INDEX_FILE);
                let mut contents = format!("//! `{}` modules\n\n", dir.join("::"));
                for child in children {
                    let _ = writeln!(contents, "pub mod {};", naming::module_ident(child));
                }
                RenderedFile::new(path, Language::Rust, contents)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn file(path: &str, name: &str) -> EmittedFile {
        EmittedFile::rust(path.split('/').map(ToString::to_string).collect(), name.to_string())
    }

    fn dir(path: &str) -> Vec<String> {
        path.split('/').map(ToString::to_string).collect()
    }

    #[test]
    fn ancestors_are_closed() {
        let mut builder = ModuleIndexBuilder::new();
        builder.extend([
            file("compute/v2/servers", "list"),
            file("compute/v2/servers", "show"),
            file("compute/v2/servers/os_interfaces", "list"),
            file("block_storage/v3/volumes", "show"),
        ]);
        let index = builder.build();

        let children = |path: &str| -> Vec<String> {
            index.children(&dir(path)).unwrap().iter().cloned().collect()
        };
        assert_eq!(children("compute"), vec!["v2"]);
        assert_eq!(children("compute/v2"), vec!["servers"]);
        assert_eq!(children("compute/v2/servers"), vec!["list", "os_interfaces", "show"]);
        assert_eq!(children("compute/v2/servers/os_interfaces"), vec!["list"]);
        assert_eq!(children("block_storage"), vec!["v3"]);
        assert_eq!(index.len(), 7);
        assert!(index.children(&[]).is_none());
    }

    #[test]
    fn every_child_is_a_module_or_directory() {
        let mut builder = ModuleIndexBuilder::new();
        builder.extend([file("a/b/c", "x"), file("a", "y")]);
        let index = builder.build();
        for (parent, children) in index.entries() {
            for child in children {
                let mut sub = parent.to_vec();
                sub.push(child.clone());
                let is_dir = index.children(&sub).is_some();
                let is_module = child == "x" || child == "y";
                assert!(is_dir || is_module, "{parent:?} -> {child}");
            }
        }
    }

    #[test]
    fn rendered_index_is_sorted_and_escaped() {
        let mut builder = ModuleIndexBuilder::new();
        builder.extend([file("compute/v2/servers", "show"), file("compute/v2/servers", "move")]);
        let files = builder.build().render();
        let servers = files
            .iter()
            .find(|f| f.path == PathBuf::from("compute/v2/servers/mod.rs"))
            .unwrap();
        assert_eq!(
            servers.contents,
            "//! `compute::v2::servers` modules\n\npub mod r#move;\npub mod show;\n"
        );
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn root_modules_are_ignored() {
        let mut builder = ModuleIndexBuilder::new();
        builder.add(&EmittedFile::rust(Vec::new(), "lib".to_string()));
        assert!(builder.build().is_empty());
    }
}
