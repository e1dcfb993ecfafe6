//! This source code is licensed under the MIT license found in the
//! LICENSE file in the root directory of this source tree.

//! Symbol resolution: attaches CVS symbols as either branch heads or commit
//! tags, then fixes up and links every head that came out of branch
//! construction with no name at all.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::atom::{AtomTable, RevNum};
use crate::commit::CommitId;
use crate::diagnostics::{Diagnostics, Warning};
use crate::graph::{HeadId, MasterGraph};
use crate::input::ParsedMaster;

/// `set_refs`: the full symbol-resolution pass.
pub fn resolve_symbols(
    atoms: &AtomTable,
    graph: &mut MasterGraph,
    parsed: &ParsedMaster,
    diagnostics: &mut Diagnostics,
) {
    attach_symbols(atoms, graph, parsed);
    let discard = fixup_unnamed_heads(atoms, graph, diagnostics);
    discard_heads(graph, &discard);
    link_and_name_heads(atoms, graph, diagnostics);
}

/// Step 1: for each symbol, either resolve it onto an existing/new head
/// (branch symbol) or tag the commit it names (plain tag).
fn attach_symbols(atoms: &AtomTable, graph: &mut MasterGraph, parsed: &ParsedMaster) {
    for symbol in &parsed.symbols {
        let number = atoms.atom_revnum(&symbol.number);

        if !number.is_head_symbol_shape() {
            if let Some(commit) = graph.commit_by_number(&number) {
                graph.tag_commit(commit, atoms.atom(&symbol.name));
            }
            continue;
        }

        let existing = (0..graph.heads.len()).find(|&idx| {
            let commit = graph.head(HeadId(idx)).commit;
            graph.commit(commit).number.same_branch(&number)
        });

        match existing {
            Some(idx) => {
                let hid = HeadId(idx);
                if graph.head(hid).ref_name.is_none() {
                    graph.head_mut(hid).ref_name = Some(atoms.atom(&symbol.name));
                    graph.head_mut(hid).degree = number.degree();
                    graph.head_mut(hid).number = Some(number.clone());
                } else {
                    let commit = graph.head(hid).commit;
                    let new_hid =
                        graph.rev_list_add_head(commit, Some(atoms.atom(&symbol.name)), number.degree());
                    graph.head_mut(new_hid).number = Some(number.clone());
                }
            }
            None => {
                if let Some(commit) = find_ancestor_branch_point(atoms, graph, &number) {
                    let hid = graph.rev_list_add_head(commit, Some(atoms.atom(&symbol.name)), number.degree());
                    graph.head_mut(hid).number = Some(number.clone());
                }
            }
        }
    }
}

/// Walks `number.c -= 2` until a matching commit is found, mirroring
/// `cvs_master_set_refs`'s fallback search for a branch symbol with no head
/// yet built for it.
fn find_ancestor_branch_point(atoms: &AtomTable, graph: &MasterGraph, number: &RevNum) -> Option<CommitId> {
    let mut n = number.as_slice().to_vec();
    while n.len() >= 4 {
        n.truncate(n.len() - 2);
        let candidate = atoms.atom_revnum(&n);
        if let Some(commit) = graph.commit_by_number(&candidate) {
            return Some(commit);
        }
    }
    None
}

/// Step 2: give every still-unnamed head a branch number derived from its
/// first live commit, or flag it for discard if every commit on it is dead.
/// Returns the set of head indices to discard.
fn fixup_unnamed_heads(
    atoms: &AtomTable,
    graph: &mut MasterGraph,
    diagnostics: &mut Diagnostics,
) -> Vec<usize> {
    let mut discard = Vec::new();

    for idx in 0..graph.heads.len() {
        let hid = HeadId(idx);
        if graph.head(hid).ref_name.is_some() {
            continue;
        }

        let mut cursor = Some(graph.head(hid).commit);
        let mut alive = None;
        while let Some(c) = cursor {
            if !graph.commit(c).dead {
                alive = Some(c);
                break;
            }
            cursor = graph.commit(c).parent;
        }

        match alive {
            None => {
                let branch_tip = graph.commit(graph.head(hid).commit).number.clone();
                diagnostics.warn(Warning::AllDeadUntaggedBranch {
                    master_name: graph.master.name.clone(),
                    branch_tip,
                });
                discard.push(idx);
            }
            Some(c) => {
                let live_number = graph.commit(c).number.clone();
                let mut v: SmallVec<[u32; 4]> = SmallVec::from_slice(live_number.as_slice());
                let last = v.len() - 1;
                v[last] = v[last - 1];
                v[last - 1] = 0;
                let branch_number = atoms.atom_revnum(&v);
                graph.head_mut(hid).degree = branch_number.degree();
                graph.head_mut(hid).number = Some(branch_number);
            }
        }
    }

    discard
}

/// Removes the given head indices, remapping every surviving `parent`
/// `HeadId` accordingly.
fn discard_heads(graph: &mut MasterGraph, discard: &[usize]) {
    if discard.is_empty() {
        return;
    }
    let drop: std::collections::HashSet<usize> = discard.iter().copied().collect();
    let mut remap: HashMap<usize, usize> = HashMap::new();
    let mut next = 0;
    for idx in 0..graph.heads.len() {
        if drop.contains(&idx) {
            continue;
        }
        remap.insert(idx, next);
        next += 1;
    }

    let mut kept = Vec::with_capacity(next);
    for idx in 0..graph.heads.len() {
        if drop.contains(&idx) {
            continue;
        }
        let mut head = graph.heads[idx].clone();
        head.parent = head
            .parent
            .and_then(|HeadId(p)| remap.get(&p).copied())
            .map(HeadId);
        kept.push(head);
    }
    graph.heads = kept;
}

/// Step 3-4: link each branch-degree head to its parent branch, warning on
/// orphans, and synthesise a name for anything still unnamed.
fn link_and_name_heads(atoms: &AtomTable, graph: &mut MasterGraph, diagnostics: &mut Diagnostics) {
    for idx in 0..graph.heads.len() {
        let hid = HeadId(idx);
        let number = match graph.head(hid).number.clone() {
            Some(n) => n,
            None => {
                diagnostics.warn(Warning::InternalUnnumberedHead {
                    master_name: graph.master.name.clone(),
                    ref_name: graph.head(hid).ref_name.clone(),
                });
                continue;
            }
        };

        if number.degree() >= 4 {
            let branch_point = number.strip_trailing(2).map(|s| s.to_vec());
            let parent = branch_point.and_then(|bp| find_branch_head(graph, &bp));
            graph.head_mut(hid).parent = parent;
            if parent.is_none() && !number.is_vendor() {
                diagnostics.warn(Warning::OrphanNonVendorBranch {
                    master_name: graph.master.name.clone(),
                    ref_name: graph.head(hid).ref_name.clone(),
                });
            }
        }

        if graph.head(hid).parent.is_some() && graph.head(hid).ref_name.is_none() {
            let parent_hid = graph.head(hid).parent.unwrap();
            let parent_name = graph
                .head(parent_hid)
                .ref_name
                .clone()
                .unwrap_or_else(|| atoms.atom("UNNAMED-BRANCH"));
            let commit = graph.head(hid).commit;
            let synthesised = match graph.commit(commit).commitid.as_ref() {
                Some(commitid) => format!("{parent_name}-UNNAMED-BRANCH-{commitid}"),
                None => format!("{parent_name}-UNNAMED-BRANCH"),
            };
            let synthesised_atom = atoms.atom(&synthesised);
            diagnostics.warn(Warning::SyntheticBranchName {
                master_name: graph.master.name.clone(),
                branch_number: number,
                synthesised_name: synthesised_atom.clone(),
                parent_name,
            });
            graph.head_mut(hid).ref_name = Some(synthesised_atom);
        }
    }
}

/// `cvs_master_find_branch`: walks `number.c -= 2` looking for a head whose
/// branch number shares the given prefix.
fn find_branch_head(graph: &MasterGraph, number: &[u32]) -> Option<HeadId> {
    let mut n = number.to_vec();
    loop {
        if n.len() < 2 {
            return None;
        }
        let found = (0..graph.heads.len()).find(|&idx| match &graph.head(HeadId(idx)).number {
            Some(hn) => hn.as_slice().len() == n.len() && hn.as_slice()[..n.len() - 1] == n[..n.len() - 1],
            None => false,
        });
        if let Some(idx) = found {
            return Some(HeadId(idx));
        }
        if n.len() < 4 {
            return None;
        }
        n.truncate(n.len() - 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::branch::build_branch;
    use crate::commit::MasterMeta;
    use crate::dir::DirInterner;
    use crate::input::{ParsedSymbol, ParsedVersion};

    fn version(number: &[u32], date: i64, dead: bool) -> ParsedVersion {
        ParsedVersion {
            number: number.to_vec(),
            date,
            author: "a".to_string(),
            commitid: None,
            dead,
            branches: Vec::new(),
        }
    }

    fn setup() -> (AtomTable, MasterGraph) {
        let atoms = AtomTable::new();
        let dirs = DirInterner::new();
        let root = dirs.atom_dir(&atoms, &atoms.atom(""));
        let meta = MasterMeta {
            name: atoms.atom("f.c"),
            fileop_name: atoms.atom("f.c"),
            dir: root,
            mode: None,
        };
        (atoms, MasterGraph::new(meta, 8))
    }

    #[test]
    fn plain_tag_symbol_attaches_to_commit() {
        let (atoms, mut graph) = setup();
        let parsed = ParsedMaster {
            versions: vec![version(&[1, 1], 1, false), version(&[1, 2], 2, false)],
            symbols: vec![ParsedSymbol { name: "REL1".to_string(), number: vec![1, 2] }],
            ..Default::default()
        };
        let index = parsed.build_branch_index();
        let mut diag = Diagnostics::new(true);
        let tip = build_branch(&atoms, &mut graph, &index, &parsed, &[1, 1], &mut diag).unwrap();
        graph.rev_list_add_head(tip, Some(atoms.atom("master")), 2);

        resolve_symbols(&atoms, &mut graph, &parsed, &mut diag);

        let tagged = graph.tags_for(tip);
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].as_str(), "REL1");
    }

    #[test]
    fn branch_symbol_in_magic_zero_form_names_its_branch_head() {
        let (atoms, mut graph) = setup();
        let parsed = ParsedMaster {
            versions: vec![
                version(&[1, 1], 1, false),
                version(&[1, 2], 2, false),
                version(&[1, 2, 2, 1], 3, false),
            ],
            symbols: vec![ParsedSymbol { name: "BR".to_string(), number: vec![1, 2, 0, 2] }],
            ..Default::default()
        };
        let index = parsed.build_branch_index();
        let mut diag = Diagnostics::new(true);
        let trunk_tip = build_branch(&atoms, &mut graph, &index, &parsed, &[1, 1], &mut diag).unwrap();
        graph.rev_list_add_head(trunk_tip, Some(atoms.atom("master")), 2);
        let branch_tip =
            build_branch(&atoms, &mut graph, &index, &parsed, &[1, 2, 2, 1], &mut diag).unwrap();
        graph.rev_list_add_head(branch_tip, None, 0);

        resolve_symbols(&atoms, &mut graph, &parsed, &mut diag);

        assert_eq!(graph.heads.len(), 2);
        let branch_head = graph.head(HeadId(1));
        assert_eq!(branch_head.ref_name.as_ref().unwrap().as_str(), "BR");
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn unnamed_branch_gets_synthetic_name_off_its_parent() {
        let (atoms, mut graph) = setup();
        let parsed = ParsedMaster {
            versions: vec![
                version(&[1, 1], 1, false),
                version(&[1, 2], 2, false),
                version(&[1, 2, 2, 1], 3, false),
            ],
            ..Default::default()
        };
        let index = parsed.build_branch_index();
        let mut diag = Diagnostics::new(true);
        let trunk_tip = build_branch(&atoms, &mut graph, &index, &parsed, &[1, 1], &mut diag).unwrap();
        graph.rev_list_add_head(trunk_tip, Some(atoms.atom("master")), 2);
        let branch_tip =
            build_branch(&atoms, &mut graph, &index, &parsed, &[1, 2, 2, 1], &mut diag).unwrap();
        graph.rev_list_add_head(branch_tip, None, 0);

        resolve_symbols(&atoms, &mut graph, &parsed, &mut diag);

        assert_eq!(graph.heads.len(), 2);
        let branch_head = graph.head(HeadId(1));
        assert_eq!(branch_head.ref_name.as_ref().unwrap().as_str(), "master-UNNAMED-BRANCH");
        assert_eq!(branch_head.parent, Some(HeadId(0)));
    }

    #[test]
    fn all_dead_untagged_branch_is_discarded() {
        let (atoms, mut graph) = setup();
        let parsed = ParsedMaster {
            versions: vec![
                version(&[1, 1], 1, false),
                version(&[1, 2], 2, false),
                version(&[1, 2, 2, 1], 3, true),
            ],
            ..Default::default()
        };
        let index = parsed.build_branch_index();
        let mut diag = Diagnostics::new(true);
        let trunk_tip = build_branch(&atoms, &mut graph, &index, &parsed, &[1, 1], &mut diag).unwrap();
        graph.rev_list_add_head(trunk_tip, Some(atoms.atom("master")), 2);
        let branch_tip =
            build_branch(&atoms, &mut graph, &index, &parsed, &[1, 2, 2, 1], &mut diag).unwrap();
        graph.rev_list_add_head(branch_tip, None, 0);

        resolve_symbols(&atoms, &mut graph, &parsed, &mut diag);

        assert_eq!(graph.heads.len(), 1);
        assert!(diag
            .warnings()
            .iter()
            .any(|w| matches!(w, Warning::AllDeadUntaggedBranch { .. })));
    }
}
