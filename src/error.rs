//! This source code is licensed under the MIT license found in the
//! LICENSE file in the root directory of this source tree.

use thiserror::Error;

use crate::atom::Atom;

/// The one error kind that aborts digesting a master.
/// Every other error kind is non-fatal and is recorded through
/// [`crate::diagnostics::Diagnostics`] instead of returned here.
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("no master branch generated for {master_name}: master has no 1.x revisions")]
    NoTrunk { master_name: Atom },
}
