//! This source code is licensed under the MIT license found in the
//! LICENSE file in the root directory of this source tree.

//! The commit slab: commits are allocated from a per-master `Vec` and referred
//! to by index rather than by owned pointer, so the resulting DAG (with
//! `tail` back-edges) stays cheap to compare structurally in tests.

use crate::atom::{Atom, RevNum};
use crate::dir::Directory;
use crate::time::RevTime;

/// Index into a [`MasterGraph`](crate::graph::MasterGraph)'s commit slab.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CommitId(pub usize);

/// Per-file metadata shared by every commit in one master.
#[derive(Clone, Debug)]
pub struct MasterMeta {
    pub name: Atom,
    pub fileop_name: Atom,
    pub dir: Directory,
    pub mode: Option<u32>,
}

/// One materialised revision.
#[derive(Clone, Debug)]
pub struct Commit {
    pub number: RevNum,
    pub date: RevTime,
    pub author: Atom,
    pub commitid: Option<Atom>,
    /// Log message; may be empty if no patch carried one.
    pub log: Atom,
    pub dead: bool,
    pub dir: Directory,
    pub parent: Option<CommitId>,
    /// When true, `parent` denotes the branch-point commit on a
    /// *different* branch (a graft edge) rather than an intra-branch
    /// step.
    pub tail: bool,
    /// Opaque scratch value seeded deterministically from the revision
    /// number; downstream consumers must not
    /// depend on any particular bit pattern here.
    pub hash: u64,
    /// Scratch fields reserved for the downstream commit-fusion stage;
    /// this crate never reads them after allocation.
    pub refcount: u32,
    pub serial: u32,
    pub tailed: bool,
}

/// Mixes a revision number into the opaque `hash` scratch field. Any
/// deterministic function of the number works, as long as downstream
/// consumers never depend on the exact value.
pub fn seed_hash(number: &RevNum) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325; // FNV-1a offset basis
    for &n in number.as_slice() {
        h ^= n as u64;
        h = h.wrapping_mul(0x100000001b3);
    }
    h
}
