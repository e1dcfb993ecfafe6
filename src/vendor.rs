//! This source code is licensed under the MIT license found in the
//! LICENSE file in the root directory of this source tree.

//! Vendor-branch normalisation.

use crate::atom::AtomTable;
use crate::commit::CommitId;
use crate::graph::{HeadId, MasterGraph};

/// Runs once per master after all branches are built. Gives unnamed
/// vendor heads a synthetic `import-<branch>` name, re-parents them onto
/// the trunk, and — if the trunk has no `1.2` — splices the newest vendor
/// branch in as the new trunk tip while preserving the old tip as an
/// ancestor.
pub fn patch_vendor_branch(atoms: &AtomTable, graph: &mut MasterGraph) {
    let trunk_id = HeadId(0);
    debug_assert_eq!(graph.head(trunk_id).ref_name.as_ref().map(|a| a.as_str()), Some("master"));

    let mut newest_vendor: Option<HeadId> = None;

    for idx in 0..graph.heads.len() {
        let head_id = HeadId(idx);
        let tip_number = graph.commit(graph.head(head_id).commit).number.clone();
        if !tip_number.is_vendor() {
            continue;
        }

        newest_vendor = Some(head_id);

        if graph.head(head_id).ref_name.is_none() {
            let initial = walk_to_root(graph, graph.head(head_id).commit);
            let initial_number = graph.commit(initial).number.clone();
            let branch_prefix = initial_number
                .strip_trailing(1)
                .expect("vendor numbers have degree >= 4")
                .to_vec();
            let rendered = render_number(&branch_prefix);
            let name = atoms.atom(&format!("import-{rendered}"));
            graph.head_mut(head_id).ref_name = Some(name);
        }

        let degree = tip_number.degree();
        graph.head_mut(head_id).parent = Some(trunk_id);
        graph.head_mut(head_id).degree = degree;
        graph.head_mut(head_id).number = Some(tip_number);
    }

    let Some(nvendor) = newest_vendor else {
        return;
    };

    let trunk_tip = graph.head(trunk_id).commit;
    if graph.commit(trunk_tip).parent.is_some() {
        return;
    }

    let old_tip = trunk_tip;
    let vendor_tip = graph.head(nvendor).commit;
    let vendor_number = graph.commit(vendor_tip).number.clone();

    graph.head_mut(trunk_id).commit = vendor_tip;
    graph.head_mut(trunk_id).degree = vendor_number.degree();
    graph.head_mut(trunk_id).number = Some(vendor_number);

    // Attach the old trunk tip to the first parent-less commit on the
    // new trunk chain (the vendor branch's initial commit).
    let mut cursor = vendor_tip;
    loop {
        if graph.commit(cursor).parent.is_none() {
            graph.commit_mut(cursor).parent = Some(old_tip);
            break;
        }
        cursor = graph.commit(cursor).parent.unwrap();
    }

    graph.heads.remove(nvendor.0);
    // Removing an element shifts every later index down by one; fix up
    // `parent` links that pointed past the removed head.
    for head in graph.heads.iter_mut() {
        if let Some(HeadId(p)) = head.parent {
            if p > nvendor.0 {
                head.parent = Some(HeadId(p - 1));
            }
        }
    }
}

fn walk_to_root(graph: &MasterGraph, mut cursor: CommitId) -> CommitId {
    while let Some(parent) = graph.commit(cursor).parent {
        cursor = parent;
    }
    cursor
}

fn render_number(components: &[u32]) -> String {
    components
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(".")
}
