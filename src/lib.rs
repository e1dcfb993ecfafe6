//! This source code is licensed under the MIT license found in the
//! LICENSE file in the root directory of this source tree.

//! Digests a single legacy version-control master file (the parsed form of
//! one RCS/CVS `,v` file) into an in-memory, topologically coherent
//! revision graph: one linear chain of commits per branch, vendor branches
//! normalised into the trunk, branches grafted onto the tree they actually
//! branched from, symbols resolved into named heads and commit tags, and
//! heads ordered so every parent precedes its children with trunk first.
//!
//! The lexer/grammar that turns a raw master file into a [`ParsedMaster`]
//! is out of scope for this crate; see [`input`] for the contract it must
//! satisfy.

mod atom;
mod branch;
mod commit;
mod config;
mod diagnostics;
mod digest;
mod dir;
mod error;
mod graft;
mod graph;
mod input;
mod sort;
mod symbol;
mod time;
mod vendor;

pub use atom::{parse_revnum, Atom, AtomTable, RevNum};
pub use commit::{Commit, CommitId, MasterMeta};
pub use config::DigestConfig;
pub use diagnostics::{Diagnostics, Warning};
pub use digest::{digest, Digested};
pub use dir::{dir_name_of, fileop_name, DirInterner, Directory};
pub use error::DigestError;
pub use graph::{Head, HeadId, MasterGraph, WalkResult};
pub use input::{BranchIndex, ParsedMaster, ParsedPatch, ParsedSymbol, ParsedVersion};
pub use time::RevTime;

#[cfg(test)]
mod tests {
    use super::*;

    fn version(number: &[u32], date: i64) -> ParsedVersion {
        ParsedVersion {
            number: number.to_vec(),
            date,
            author: "tester".to_string(),
            commitid: None,
            dead: false,
            branches: Vec::new(),
        }
    }

    /// End-to-end smoke test exercising the public API the way a caller
    /// would: build an [`AtomTable`] and [`DirInterner`] once per process
    /// and reuse them across many masters.
    #[test]
    fn public_api_digests_a_linear_trunk() {
        let atoms = AtomTable::new();
        let dirs = DirInterner::new();
        let config = DigestConfig::default();
        let parsed = ParsedMaster {
            export_path: "lib/util.c".to_string(),
            versions: vec![version(&[1, 1], 100), version(&[1, 2], 200), version(&[1, 3], 300)],
            ..Default::default()
        };

        let digested = digest(&atoms, &dirs, &config, &parsed).expect("trunk-only master digests");
        assert_eq!(digested.graph.commit(digested.trunk_tip).number.to_string(), "1.3");
        assert!(digested.diagnostics.is_empty());
    }

    /// Two masters sharing one [`AtomTable`] concurrently should not
    /// deadlock or corrupt the intern tables.
    #[test]
    fn concurrent_digesting_shares_intern_tables_safely() {
        let atoms = AtomTable::new();
        let dirs = DirInterner::new();
        let config = DigestConfig::default();

        std::thread::scope(|scope| {
            for i in 0..8 {
                let atoms = &atoms;
                let dirs = &dirs;
                let config = &config;
                scope.spawn(move || {
                    let parsed = ParsedMaster {
                        export_path: format!("lib/file{i}.c"),
                        versions: vec![version(&[1, 1], 1), version(&[1, 2], 2)],
                        ..Default::default()
                    };
                    let digested = digest(atoms, dirs, config, &parsed).unwrap();
                    assert_eq!(digested.graph.commit(digested.trunk_tip).number.to_string(), "1.2");
                });
            }
        });
    }
}
