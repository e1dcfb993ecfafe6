//! This source code is licensed under the MIT license found in the
//! LICENSE file in the root directory of this source tree.

//! Branch heads and the finished master graph.

use std::collections::HashMap;

use crate::atom::{Atom, RevNum};
use crate::commit::{Commit, CommitId, MasterMeta};

/// Index into a [`MasterGraph`]'s head list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HeadId(pub usize);

/// `{ commit, ref_name, number, degree, parent, tail }`. A singly linked
/// `next` field is represented implicitly by position in
/// [`MasterGraph::heads`] rather than as an explicit pointer.
#[derive(Clone, Debug)]
pub struct Head {
    pub commit: CommitId,
    pub ref_name: Option<Atom>,
    pub number: Option<RevNum>,
    pub degree: usize,
    pub parent: Option<HeadId>,
    /// Marks heads whose chain has already been grafted and should not
    /// be walked again.
    pub tail: bool,
}

/// `{ heads, … }` plus the commit slab it owns.
#[derive(Debug)]
pub struct MasterGraph {
    pub master: MasterMeta,
    pub commits: Vec<Commit>,
    pub heads: Vec<Head>,
    tags: HashMap<usize, Vec<Atom>>,
}

impl MasterGraph {
    pub fn new(master: MasterMeta, capacity: usize) -> Self {
        MasterGraph {
            master,
            commits: Vec::with_capacity(capacity),
            heads: Vec::new(),
            tags: HashMap::new(),
        }
    }

    /// Allocates the next commit in the slab, returning its id.
    pub fn push_commit(&mut self, commit: Commit) -> CommitId {
        let id = CommitId(self.commits.len());
        self.commits.push(commit);
        id
    }

    pub fn commit(&self, id: CommitId) -> &Commit {
        &self.commits[id.0]
    }

    pub fn commit_mut(&mut self, id: CommitId) -> &mut Commit {
        &mut self.commits[id.0]
    }

    /// `cvs_master_find_revision`: scans every head's chain (skipping a
    /// head already marked `tail`, and stopping a chain walk at the first
    /// `tail` commit it hits) looking for the commit with this number.
    /// Dead commits are ordinary stops along the chain, so a branch root
    /// left dead on its parent branch (the usual "added on a branch"
    /// shape) is still found.
    pub fn commit_by_number(&self, number: &RevNum) -> Option<CommitId> {
        for head in &self.heads {
            if head.tail {
                continue;
            }
            let mut cursor = Some(head.commit);
            while let Some(c) = cursor {
                let commit = &self.commits[c.0];
                if &commit.number == number {
                    return Some(c);
                }
                if commit.tail {
                    break;
                }
                cursor = commit.parent;
            }
        }
        None
    }

    /// `rev_list_add_head`: appends a new head at `commit` with the given
    /// name and degree, returning its id.
    pub fn rev_list_add_head(
        &mut self,
        commit: CommitId,
        ref_name: Option<Atom>,
        degree: usize,
    ) -> HeadId {
        let id = HeadId(self.heads.len());
        self.heads.push(Head {
            commit,
            ref_name,
            number: None,
            degree,
            parent: None,
            tail: false,
        });
        id
    }

    pub fn head(&self, id: HeadId) -> &Head {
        &self.heads[id.0]
    }

    pub fn head_mut(&mut self, id: HeadId) -> &mut Head {
        &mut self.heads[id.0]
    }

    /// `rev_list_set_tail`: finalises tail edges across every head.
    /// Branch grafting already marks the crossing
    /// commit's own `tail` flag; this pass propagates that fact up to the
    /// `Head` so a consumer can tell, without walking the chain, whether it
    /// will cross into another branch before reaching a root commit.
    pub fn rev_list_set_tail(&mut self) {
        for head_idx in 0..self.heads.len() {
            let mut cursor = self.heads[head_idx].commit;
            let mut crosses = false;
            loop {
                let c = &self.commits[cursor.0];
                if c.tail {
                    crosses = true;
                    break;
                }
                match c.parent {
                    None => break,
                    Some(p) => cursor = p,
                }
            }
            self.heads[head_idx].tail = crosses;
        }
    }

    /// `tag_commit`: attaches a symbolic tag to a commit.
    pub fn tag_commit(&mut self, commit: CommitId, name: Atom) {
        self.tags.entry(commit.0).or_default().push(name);
    }

    pub fn tags_for(&self, commit: CommitId) -> &[Atom] {
        self.tags.get(&commit.0).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Walks a head's chain to its root commit (the first commit with no
    /// parent), stopping at an already-`tail`ed commit if one is hit
    /// first.
    pub fn root_of(&self, head: &Head) -> WalkResult {
        let mut cursor = head.commit;
        loop {
            let c = &self.commits[cursor.0];
            if c.tail && cursor != head.commit {
                return WalkResult::HitTail;
            }
            match c.parent {
                None => return WalkResult::Root(cursor),
                Some(p) => cursor = p,
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkResult {
    Root(CommitId),
    HitTail,
}
