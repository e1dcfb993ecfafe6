//! This source code is licensed under the MIT license found in the
//! LICENSE file in the root directory of this source tree.

//! Branch construction from deltas, and date-order repair.

use crate::atom::AtomTable;
use crate::commit::{seed_hash, Commit, CommitId};
use crate::diagnostics::{Diagnostics, Warning};
use crate::graph::MasterGraph;
use crate::input::{BranchIndex, ParsedMaster};
use crate::time::RevTime;

/// `build_branch`: materialises one branch as a linear chain of commits
/// from the delta list, repairs date order, and returns the tip commit.
/// Returns `None` if the branch has no deltas.
pub fn build_branch(
    atoms: &AtomTable,
    graph: &mut MasterGraph,
    index: &BranchIndex,
    parsed: &ParsedMaster,
    branch_number: &[u32],
    diagnostics: &mut Diagnostics,
) -> Option<CommitId> {
    let versions = index.versions_on_branch(parsed, branch_number);
    let mut head: Option<CommitId> = None;

    for (version, log) in versions {
        let number = atoms.atom_revnum(&version.number);
        let commit = Commit {
            hash: seed_hash(&number),
            number: number.clone(),
            date: RevTime::new(version.date),
            author: atoms.atom(&version.author),
            commitid: version.commitid.as_deref().map(|s| atoms.atom(s)),
            log: atoms.atom(log.unwrap_or("")),
            dead: version.dead,
            dir: graph.master.dir.clone(),
            parent: head,
            tail: false,
            refcount: 0,
            serial: 0,
            tailed: false,
        };
        let id = graph.push_commit(commit);
        head = Some(id);
    }

    let head = head?;
    repair_date_order(graph, head, diagnostics);
    Some(head)
}

/// Walks the chain from `head` toward the root, pushing the newer date
/// down onto whichever of the adjacent pair looks like the outlier.
fn repair_date_order(graph: &mut MasterGraph, head: CommitId, diagnostics: &mut Diagnostics) {
    let mut child = head;
    let mut grandchild: Option<CommitId> = None;

    while let Some(parent) = graph.commit(child).parent {
        if graph.commit(parent).date > graph.commit(child).date {
            let adjust_child = match grandchild {
                Some(gc) if graph.commit(parent).date <= graph.commit(gc).date => true,
                _ => false,
            };

            let parent_number = graph.commit(parent).number.clone();
            let child_number = graph.commit(child).number.clone();
            let (adjusted_number, adjusted_date);
            if adjust_child {
                adjusted_date = graph.commit(parent).date;
                graph.commit_mut(child).date = adjusted_date;
                adjusted_number = child_number.clone();
            } else {
                adjusted_date = graph.commit(child).date;
                graph.commit_mut(parent).date = adjusted_date;
                adjusted_number = parent_number.clone();
            }

            diagnostics.warn(Warning::ClockSkew {
                master_name: graph.master.name.clone(),
                parent: parent_number,
                child: child_number,
                adjusted: adjusted_number,
            });
        }

        grandchild = Some(child);
        child = parent;
    }
}
