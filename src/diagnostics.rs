//! This source code is licensed under the MIT license found in the
//! LICENSE file in the root directory of this source tree.

//! The non-fatal half of the error model: every warning kind the digester
//! can raise is a [`Warning`] variant, recorded in a [`Diagnostics`] sink
//! and mirrored to `tracing` so the host process's regular log plumbing
//! picks it up without this crate knowing anything about where logs end
//! up.

use crate::atom::{Atom, RevNum};

/// One instance of a non-fatal condition encountered while digesting a
/// master.
#[derive(Debug, Clone)]
pub enum Warning {
    /// Date repair adjusted a revision's timestamp to restore
    /// monotonicity.
    ClockSkew {
        master_name: Atom,
        parent: RevNum,
        child: RevNum,
        adjusted: RevNum,
    },
    /// An untagged branch whose every revision is dead was discarded.
    AllDeadUntaggedBranch { master_name: Atom, branch_tip: RevNum },
    /// A non-vendor branch head has no parent on the tree.
    OrphanNonVendorBranch { master_name: Atom, ref_name: Option<Atom> },
    /// A head came out of symbol resolution with no branch number at
    /// all; it is discarded.
    InternalUnnumberedHead { master_name: Atom, ref_name: Option<Atom> },
    /// A branch was placed on a synthesised name because no symbol named
    /// it.
    SyntheticBranchName {
        master_name: Atom,
        branch_number: RevNum,
        synthesised_name: Atom,
        parent_name: Atom,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::ClockSkew {
                master_name,
                parent,
                child,
                adjusted,
            } => write!(
                f,
                "warning - {master_name}: {parent} is newer than {child}, adjusting {adjusted}"
            ),
            Warning::AllDeadUntaggedBranch {
                master_name,
                branch_tip,
            } => write!(
                f,
                "discarding dead untagged branch {branch_tip} in {master_name}"
            ),
            Warning::OrphanNonVendorBranch {
                master_name,
                ref_name,
            } => write!(
                f,
                "warning - non-vendor {master_name} branch {} has no parent",
                ref_name.as_ref().map(Atom::as_str).unwrap_or("<unnamed>")
            ),
            Warning::InternalUnnumberedHead {
                master_name,
                ref_name,
            } => match ref_name {
                Some(name) => write!(f, "internal error - unnumbered head {name} in {master_name}"),
                None => write!(f, "internal error - unnumbered head in {master_name}"),
            },
            Warning::SyntheticBranchName {
                master_name,
                branch_number,
                synthesised_name,
                parent_name,
            } => write!(
                f,
                "warning - putting {master_name} rev {branch_number} on unnamed branch \
                 {synthesised_name} off {parent_name}"
            ),
        }
    }
}

/// Collects warnings and mirrors them to `tracing`. `nowarn` suppresses the `tracing`
/// emission but never the recording, so tests can still assert on what
/// happened even when a caller wants quiet logs.
#[derive(Debug)]
pub struct Diagnostics {
    nowarn: bool,
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new(nowarn: bool) -> Self {
        Diagnostics {
            nowarn,
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, warning: Warning) {
        if !self.nowarn {
            tracing::warn!(target: "revmaster_digest", "{warning}");
        }
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Diagnostics::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::AtomTable;

    #[test]
    fn nowarn_still_records_but_does_not_emit() {
        let atoms = AtomTable::new();
        let mut diag = Diagnostics::new(true);
        diag.warn(Warning::OrphanNonVendorBranch {
            master_name: atoms.atom("f.c"),
            ref_name: Some(atoms.atom("odd-branch")),
        });
        assert_eq!(diag.warnings().len(), 1);
    }

    #[test]
    fn warnings_are_mirrored_to_tracing() {
        use tracing_subscriber::fmt::TestWriter;

        let subscriber = tracing_subscriber::fmt().with_writer(TestWriter::default()).finish();
        let atoms = AtomTable::new();
        let mut diag = Diagnostics::new(false);
        tracing::subscriber::with_default(subscriber, || {
            diag.warn(Warning::InternalUnnumberedHead {
                master_name: atoms.atom("f.c"),
                ref_name: None,
            });
        });
        assert_eq!(diag.warnings().len(), 1);
    }
}
