//! Node renaming: collision suffixes plus a declarative rename table.
//!
//! The rename table is read from a line-oriented `old=new` file. Names are
//! made unique first, then mapped through the table.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::Path;

/// Mapping from original (or suffixed) node names to replacement names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenameTable {
    entries: HashMap<String, String>,
}

impl RenameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `key=value` lines.
    ///
    /// The first `=` splits key from value. Lines without `=` or with an
    /// empty value are skipped; a repeated key keeps its last value.
    pub fn parse(content: &str) -> Self {
        let mut table = Self::new();
        for line in content.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            table.insert(key, value);
        }
        table
    }

    /// Load a rename file. A missing file gives an empty table.
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let table = Self::parse(&content);
                log::info!("Loaded {} rename entries from {}", table.len(), path.display());
                Ok(table)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No rename file at {}", path.display());
                Ok(Self::new())
            }
            Err(e) => Err(e),
        }
    }

    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.entries.insert(from.into(), to.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RenameTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}

/// Assigns unique names during one traversal.
///
/// Two name sets are kept. `seen` holds the names nodes arrived with (after
/// suffixing) and resolves duplicates before the table is consulted.
/// `assigned` holds the final names handed out, so a table entry can take a
/// name another node arrived with, as in an `A=B`, `B=A` swap.
#[derive(Debug)]
pub struct NameDeduper<'a> {
    table: &'a RenameTable,
    seen: HashSet<String>,
    assigned: HashSet<String>,
}

impl<'a> NameDeduper<'a> {
    pub fn new(table: &'a RenameTable) -> Self {
        Self {
            table,
            seen: HashSet::new(),
            assigned: HashSet::new(),
        }
    }

    /// Pick a unique name for `name` and apply the rename table.
    ///
    /// Every node kind the traversal visits goes through here, meshes
    /// included, so the whole tree ends up with unique names. The cost is
    /// that a node visited earlier keeps its name and a later bone with the
    /// same name is the one that gets suffixed, even when the earlier node
    /// is a mesh.
    ///
    /// Returns `Some(new_name)` if the name changed.
    pub fn rename(&mut self, name: &str) -> Option<String> {
        let unique = claim(&mut self.seen, name);
        let mapped = self.table.get(&unique).unwrap_or(&unique);

        // Only a real clash between final names is suffixed
        let result = claim(&mut self.assigned, mapped);
        if result == name {
            None
        } else {
            Some(result)
        }
    }

    /// Rename `name` in place. Returns true if it changed.
    pub fn rename_in_place(&mut self, name: &mut String) -> bool {
        match self.rename(name) {
            Some(new_name) => {
                *name = new_name;
                true
            }
            None => false,
        }
    }

    /// Whether a final name has been handed out already.
    pub fn is_taken(&self, name: &str) -> bool {
        self.assigned.contains(name)
    }
}

/// Reserve `name` in `names`, suffixing it with the smallest free `02`,
/// `03`, ... Suffixes are always appended to `name` itself, never chained.
fn claim(names: &mut HashSet<String>, name: &str) -> String {
    if names.insert(name.to_string()) {
        return name.to_string();
    }

    let mut i = 2;
    loop {
        let candidate = format!("{}{:02}", name, i);
        if names.insert(candidate.clone()) {
            return candidate;
        }
        i += 1;
    }
}
