//! This source code is licensed under the MIT license found in the
//! LICENSE file in the root directory of this source tree.

//! Branch grafting: turns the forest of disconnected branch chains built by
//! [`crate::branch::build_branch`] into a single tree rooted at trunk.

use crate::atom::AtomTable;
use crate::graph::{HeadId, MasterGraph, WalkResult};
use crate::input::ParsedMaster;

/// `graft_branches`: for every non-trunk, non-tailed head, finds the
/// branch's root commit and — if some version's `branches` clause records
/// that exact number — reparents the root onto the commit that declared the
/// branch, marking the new edge as a tail (graft) edge.
///
/// Re-parenting a vendor branch onto another vendor branch is intentionally
/// not attempted here; only the plain case above is implemented.
pub fn graft_branches(atoms: &AtomTable, graph: &mut MasterGraph, parsed: &ParsedMaster) {
    for idx in 1..graph.heads.len() {
        let head_id = HeadId(idx);
        if graph.head(head_id).tail {
            continue;
        }

        let root = match graph.root_of(graph.head(head_id)) {
            WalkResult::HitTail => continue,
            WalkResult::Root(commit) => commit,
        };

        let root_number = graph.commit(root).number.clone();

        for version in &parsed.versions {
            let declares_branch = version
                .branches
                .iter()
                .any(|b| b.as_slice() == root_number.as_slice());
            if !declares_branch {
                continue;
            }

            let parent_number = atoms.atom_revnum(&version.number);
            if let Some(parent_commit) = graph.commit_by_number(&parent_number) {
                graph.commit_mut(root).parent = Some(parent_commit);
                graph.commit_mut(root).tail = true;
            }
            break;
        }
    }
}
