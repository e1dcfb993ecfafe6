//! This source code is licensed under the MIT license found in the
//! LICENSE file in the root directory of this source tree.

//! The driver: turns one parsed master file into a finished
//! [`MasterGraph`] by running every component in order.

use crate::atom::AtomTable;
use crate::branch::build_branch;
use crate::commit::{CommitId, MasterMeta};
use crate::config::DigestConfig;
use crate::diagnostics::Diagnostics;
use crate::dir::{dir_name_of, fileop_name, DirInterner};
use crate::error::DigestError;
use crate::graft::graft_branches;
use crate::graph::MasterGraph;
use crate::input::ParsedMaster;
use crate::sort::sort_heads;
use crate::symbol::resolve_symbols;
use crate::vendor::patch_vendor_branch;

/// The result of successfully digesting one master file: the finished
/// graph, its trunk tip commit, and whatever non-fatal warnings were
/// raised along the way.
#[derive(Debug)]
pub struct Digested {
    pub graph: MasterGraph,
    pub trunk_tip: CommitId,
    pub diagnostics: Diagnostics,
}

/// `cvs_master_digest`: builds every branch, normalises vendor branches,
/// grafts the forest into a tree, resolves symbols, and orders the heads.
pub fn digest(
    atoms: &AtomTable,
    dirs: &DirInterner,
    config: &DigestConfig,
    parsed: &ParsedMaster,
) -> Result<Digested, DigestError> {
    // Step 1: ensure the root directory exists.
    dirs.atom_dir(atoms, &atoms.atom(""));

    // Step 2: build master metadata.
    let master_name = atoms.atom(&parsed.export_path);
    let dir_atom = dir_name_of(atoms, &parsed.export_path);
    let meta = MasterMeta {
        name: master_name.clone(),
        fileop_name: fileop_name(atoms, &master_name),
        dir: dirs.atom_dir(atoms, &dir_atom),
        mode: parsed.mode,
    };

    // Step 3: per-branch delta index.
    let index = parsed.build_branch_index();

    // Step 4: lowest trunk revision, defaulting to 1.1.
    let trunk_number = lowest_trunk_revision(parsed).unwrap_or_else(|| vec![1, 1]);

    let mut graph = MasterGraph::new(meta, parsed.version_count());
    let mut diagnostics = Diagnostics::new(config.nowarn);

    // Step 5: build the trunk branch.
    let trunk_tip = match build_branch(atoms, &mut graph, &index, parsed, &trunk_number, &mut diagnostics) {
        Some(tip) => tip,
        None => return Err(DigestError::NoTrunk { master_name }),
    };
    let trunk_head = graph.rev_list_add_head(trunk_tip, Some(atoms.atom("master")), 2);
    graph.head_mut(trunk_head).number = Some(atoms.atom_revnum(&trunk_number));

    // Step 6: build every other recorded branch as an unnamed head.
    for version in &parsed.versions {
        for branch_number in &version.branches {
            if let Some(tip) = build_branch(atoms, &mut graph, &index, parsed, branch_number, &mut diagnostics)
            {
                graph.rev_list_add_head(tip, None, 0);
            }
        }
    }

    // Step 7: vendor normalisation, grafting, symbol resolution, sorting.
    patch_vendor_branch(atoms, &mut graph);
    graft_branches(atoms, &mut graph, parsed);
    resolve_symbols(atoms, &mut graph, parsed, &mut diagnostics);
    sort_heads(&mut graph.heads, parsed);

    // Step 8: finalise tail edges.
    graph.rev_list_set_tail();

    // Step 9: trunk tip commit, re-located by name since sorting may have
    // moved the trunk head's slot (though never past position zero).
    let trunk_tip = graph
        .heads
        .iter()
        .find(|h| h.ref_name.as_ref().map(|a| a.as_str()) == Some("master"))
        .map(|h| h.commit)
        .expect("trunk head always survives digesting once built");

    Ok(Digested { graph, trunk_tip, diagnostics })
}

fn lowest_trunk_revision(parsed: &ParsedMaster) -> Option<Vec<u32>> {
    parsed
        .versions
        .iter()
        .filter(|v| v.number.len() == 2)
        .map(|v| v.number.clone())
        .min()
}


#[cfg(test)]
mod quickcheck_tests {
    use super::*;
    use crate::atom::AtomTable;
    use crate::dir::DirInterner;
    use crate::input::ParsedVersion;
    use quickcheck::quickcheck;

    fn trunk_master(dates: &[u16]) -> ParsedMaster {
        let versions = dates
            .iter()
            .enumerate()
            .map(|(i, &date)| ParsedVersion {
                number: vec![1, (i + 1) as u32],
                date: date as i64,
                author: "a".to_string(),
                commitid: None,
                dead: false,
                branches: Vec::new(),
            })
            .collect();
        ParsedMaster { export_path: "f.c".to_string(), versions, ..Default::default() }
    }

    quickcheck! {
        /// A trunk whose dates are already non-decreasing digests without
        /// any clock-skew adjustment, and its dates come out unchanged.
        fn monotonic_trunk_digests_without_reordering(dates: Vec<u16>) -> bool {
            let mut dates = dates;
            if dates.is_empty() {
                return true;
            }
            dates.sort_unstable();
            dates.truncate(50);

            let atoms = AtomTable::new();
            let dirs = DirInterner::new();
            let config = DigestConfig::default();
            let parsed = trunk_master(&dates);

            let result = match digest(&atoms, &dirs, &config, &parsed) {
                Ok(r) => r,
                Err(_) => return false,
            };
            if !result.diagnostics.is_empty() {
                return false;
            }

            let mut cursor = Some(result.trunk_tip);
            let mut seen = Vec::new();
            while let Some(c) = cursor {
                seen.push(result.graph.commit(c).date.0 as u16);
                cursor = result.graph.commit(c).parent;
            }
            seen.reverse();
            seen == dates
        }
    }
}
