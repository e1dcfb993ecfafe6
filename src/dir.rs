//! This source code is licensed under the MIT license found in the
//! LICENSE file in the root directory of this source tree.

//! Directory canonicalisation.
//!
//! A naive approach uses a recursive mutex, since inserting a child
//! directory recursively inserts its parent while the lock is held.
//! Here the ancestor chain is built iteratively, bottom-up, under a single
//! non-reentrant lock, which keeps the locking discipline auditable
//! without `parking_lot`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::atom::{Atom, AtomTable};

#[derive(Debug)]
struct DirectoryInner {
    name: Atom,
    parent: Option<Directory>,
}

/// `{ name: atom, parent: directory|none }`, interned by name. The
/// empty-name directory is the unique root.
#[derive(Clone, Debug)]
pub struct Directory(Arc<DirectoryInner>);

impl Directory {
    pub fn name(&self) -> &Atom {
        &self.0.name
    }

    pub fn parent(&self) -> Option<&Directory> {
        self.0.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.0.parent.is_none()
    }
}

impl PartialEq for Directory {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Directory {}

/// Canonicalises directory records keyed by atom pointer.
pub struct DirInterner {
    // Keyed by the interned directory-name atom's pointer identity.
    by_name: RwLock<HashMap<usize, Directory>>,
}

impl Default for DirInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl DirInterner {
    pub fn new() -> Self {
        DirInterner {
            by_name: RwLock::new(HashMap::new()),
        }
    }

    fn key(name: &Atom) -> usize {
        name.as_str().as_ptr() as usize
    }

    /// `atom_dir(dirname_atom) -> directory`.
    pub fn atom_dir(&self, atoms: &AtomTable, dirname: &Atom) -> Directory {
        if let Some(existing) = self.by_name.read().unwrap().get(&Self::key(dirname)) {
            return existing.clone();
        }

        // Build the chain of missing ancestors bottom-up, holding the lock
        // for the whole insert so no other thread observes a half-built
        // chain.
        let mut chain = vec![dirname.clone()];
        while !chain.last().unwrap().as_str().is_empty() {
            let parent_name = parent_name_of(chain.last().unwrap().as_str());
            chain.push(atoms.atom(&parent_name));
        }

        let mut table = self.by_name.write().unwrap();
        // chain is root-most-last; walk it from the root end, inserting
        // (or reusing) each level and linking it to the previous one.
        let mut built: Option<Directory> = None;
        for name in chain.into_iter().rev() {
            let k = Self::key(&name);
            if let Some(existing) = table.get(&k) {
                built = Some(existing.clone());
                continue;
            }
            let dir = Directory(Arc::new(DirectoryInner {
                name,
                parent: built.clone(),
            }));
            table.insert(k, dir.clone());
            built = Some(dir);
        }
        built.expect("chain always has at least one element")
    }
}

/// Substring up to (not including) the last `/`; empty string for a
/// top-level path.
fn parent_name_of(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => path[..idx].to_string(),
        None => String::new(),
    }
}

/// `dirname(filename) -> atom`: everything before the last `/`.
pub fn dir_name_of(atoms: &AtomTable, filename: &str) -> Atom {
    atoms.atom(&parent_name_of(filename))
}

/// `fileop_name(path) -> atom`: rewrites a trailing `.cvsignore` component
/// to `.gitignore`; otherwise returns the input unchanged.
pub fn fileop_name(atoms: &AtomTable, path: &Atom) -> Atom {
    let s = path.as_str();
    if let Some(stripped) = s.strip_suffix(".cvsignore") {
        atoms.atom(&format!("{stripped}.gitignore"))
    } else {
        path.clone()
    }
}
