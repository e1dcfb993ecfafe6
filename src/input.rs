//! This source code is licensed under the MIT license found in the
//! LICENSE file in the root directory of this source tree.

//! Stand-ins for "the parser's" output. The
//! lexer/grammar that produces this structure from a raw RCS master file
//! is an external collaborator out of scope for this crate; the
//! types here define the shape it must supply.

use std::collections::HashMap;

/// One delta record read off a master file.
#[derive(Clone, Debug)]
pub struct ParsedVersion {
    pub number: Vec<u32>,
    pub date: i64,
    pub author: String,
    pub commitid: Option<String>,
    pub dead: bool,
    /// First revision number of each branch rooted at this delta (RCS's
    /// own `branches` clause).
    pub branches: Vec<Vec<u32>>,
}

/// The patch text associated with one revision, stored separately from
/// the delta record in RCS masters.
#[derive(Clone, Debug)]
pub struct ParsedPatch {
    pub number: Vec<u32>,
    pub log: String,
}

/// A symbolic name bound to a revision or branch number (`tag=1.2` /
/// `branch=1.2.0.3` style RCS symbols).
#[derive(Clone, Debug)]
pub struct ParsedSymbol {
    pub name: String,
    pub number: Vec<u32>,
}

/// The full parsed structure of one CVS/RCS master file.
#[derive(Clone, Debug, Default)]
pub struct ParsedMaster {
    pub export_path: String,
    pub mode: Option<u32>,
    pub symbols: Vec<ParsedSymbol>,
    pub versions: Vec<ParsedVersion>,
    pub patches: Vec<ParsedPatch>,
}

impl ParsedMaster {
    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    fn patch_log(&self, number: &[u32]) -> Option<&str> {
        self.patches
            .iter()
            .find(|p| p.number == number)
            .map(|p| p.log.as_str())
    }

    /// `build_branches`: the per-branch delta index.
    ///
    /// The real RCS parser threads this by walking each delta's `next`
    /// pointer under a synthetic `<prefix>.-1` sentinel key. That threading is an implementation detail of the
    /// lexer/grammar; the observable result is simply "all revisions
    /// sharing a branch-point prefix, oldest first", which is what this
    /// index groups directly.
    pub fn build_branch_index(&self) -> BranchIndex {
        let mut by_prefix: HashMap<Vec<u32>, Vec<usize>> = HashMap::new();
        for (idx, v) in self.versions.iter().enumerate() {
            if v.number.len() < 2 {
                continue;
            }
            let prefix = v.number[..v.number.len() - 1].to_vec();
            by_prefix.entry(prefix).or_default().push(idx);
        }
        for indices in by_prefix.values_mut() {
            indices.sort_by(|&a, &b| self.versions[a].number.cmp(&self.versions[b].number));
        }
        BranchIndex { by_prefix }
    }

    pub fn version_by_number(&self, number: &[u32]) -> Option<&ParsedVersion> {
        self.versions.iter().find(|v| v.number == number)
    }
}

/// Per-branch delta index built from a [`ParsedMaster`].
pub struct BranchIndex {
    by_prefix: HashMap<Vec<u32>, Vec<usize>>,
}

impl BranchIndex {
    /// Versions on the branch identified by `branch_number`, oldest first,
    /// each paired with its patch log if any.
    pub fn versions_on_branch<'a>(
        &self,
        master: &'a ParsedMaster,
        branch_number: &[u32],
    ) -> Vec<(&'a ParsedVersion, Option<&'a str>)> {
        if branch_number.is_empty() {
            return Vec::new();
        }
        let prefix = &branch_number[..branch_number.len() - 1];
        match self.by_prefix.get(prefix) {
            None => Vec::new(),
            Some(indices) => indices
                .iter()
                .map(|&i| {
                    let v = &master.versions[i];
                    (v, master.patch_log(&v.number))
                })
                .collect(),
        }
    }
}
