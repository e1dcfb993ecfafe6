//! This source code is licensed under the MIT license found in the
//! LICENSE file in the root directory of this source tree.

//! Interning for strings and revision numbers.
//!
//! Two calls with equal content return the same pointer; equality on the
//! returned handles is therefore pointer equality and comparison never
//! touches the underlying bytes again once interned.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use smallvec::SmallVec;

/// An interned, immutable string. Pointer equality implies string equality.
#[derive(Clone, Debug)]
pub struct Atom(Arc<str>);

impl Atom {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Atom {}

impl std::hash::Hash for Atom {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as *const ()).hash(state);
    }
}

impl std::fmt::Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An interned revision number: a non-empty sequence of non-negative
/// integers. Equality is pointer equality; ordering is lexicographic over
/// the sequence.
#[derive(Clone, Debug)]
pub struct RevNum(Arc<[u32]>);

impl RevNum {
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Length of the sequence, called the "degree" of a revision number.
    pub fn degree(&self) -> usize {
        self.0.len()
    }

    /// `a.b` form: trunk revisions have degree 2.
    pub fn is_trunk(&self) -> bool {
        self.degree() == 2
    }

    /// Branch-point numbers have even degree >= 2.
    pub fn is_branch_point(&self) -> bool {
        self.degree() >= 2 && self.degree() % 2 == 0
    }

    /// Branch-tag form `a.b.0.n`: degree >= 3 with a zero in the
    /// next-to-last position, e.g. `1.2.0.2` naming branch `1.2.2`.
    pub fn is_branch_tag(&self) -> bool {
        self.degree() >= 3 && self.0[self.degree() - 2] == 0
    }

    /// The shape a symbol's number must have to name a branch (`cvs_is_head`)
    /// rather than tag a single commit: branch-tag shaped, per
    /// [`Self::is_branch_tag`].
    pub fn is_head_symbol_shape(&self) -> bool {
        self.is_branch_tag()
    }

    /// The branch this revision number lies on, or — if this number is
    /// itself branch-tag shaped — the branch it names. `1.2.2.1` and
    /// `1.2.0.2` both normalise to `1.2.2` (`cvs_same_branch`'s view of a
    /// branch number with its synthetic `0` removed).
    fn branch_of(&self) -> Vec<u32> {
        let n = self.degree();
        if self.is_branch_tag() {
            let mut v = Vec::with_capacity(n - 1);
            v.extend_from_slice(&self.0[..n - 2]);
            v.push(self.0[n - 1]);
            v
        } else {
            self.0[..n.saturating_sub(1)].to_vec()
        }
    }

    /// Vendor branches are branches off `1.1` whose third element is odd,
    /// e.g. `1.1.1.n`, `1.1.3.n`.
    pub fn is_vendor(&self) -> bool {
        self.degree() >= 4 && self.0[0] == 1 && self.0[1] == 1 && self.0[2] % 2 == 1
    }

    /// Two numbers are "on the same branch" once normalised to the branch
    /// they each lie on or name, so an ordinary commit (`1.2.2.1`) matches
    /// the branch-tag symbol that names its branch (`1.2.0.2`).
    pub fn same_branch(&self, other: &RevNum) -> bool {
        self.branch_of() == other.branch_of()
    }

    /// Strip the trailing `n` elements, returning `None` if that would
    /// leave fewer than one element.
    pub fn strip_trailing(&self, n: usize) -> Option<&[u32]> {
        if n >= self.degree() {
            None
        } else {
            Some(&self.0[..self.degree() - n])
        }
    }
}

impl PartialEq for RevNum {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for RevNum {}

impl std::hash::Hash for RevNum {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as *const () as usize).hash(state);
    }
}

impl PartialOrd for RevNum {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RevNum {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.as_ref().cmp(other.0.as_ref())
    }
}

impl std::fmt::Display for RevNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, n) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{n}")?;
        }
        Ok(())
    }
}

/// Intern table for strings and revision numbers. Thread-safe: a read-lock
/// lookup covers the common case, a miss takes a write lock, re-checks for
/// a racing insert, then inserts.
#[derive(Default)]
pub struct AtomTable {
    strings: RwLock<HashMap<Box<str>, Arc<str>>>,
    revnums: RwLock<HashMap<Box<[u32]>, Arc<[u32]>>>,
}

impl AtomTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom(&self, s: &str) -> Atom {
        if let Some(existing) = self.strings.read().unwrap().get(s) {
            return Atom(existing.clone());
        }
        let mut table = self.strings.write().unwrap();
        if let Some(existing) = table.get(s) {
            return Atom(existing.clone());
        }
        let interned: Arc<str> = Arc::from(s);
        table.insert(Box::from(s), interned.clone());
        Atom(interned)
    }

    pub fn atom_revnum(&self, seq: &[u32]) -> RevNum {
        if let Some(existing) = self.revnums.read().unwrap().get(seq) {
            return RevNum(existing.clone());
        }
        let mut table = self.revnums.write().unwrap();
        if let Some(existing) = table.get(seq) {
            return RevNum(existing.clone());
        }
        let interned: Arc<[u32]> = Arc::from(seq);
        table.insert(Box::from(seq), interned.clone());
        RevNum(interned)
    }

    pub fn len(&self) -> usize {
        self.strings.read().unwrap().len() + self.revnums.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse a dotted revision number string (`"1.2.3"`) into its integer
/// sequence, without interning it. Most CVS revision numbers have degree
/// <= 4, so components are accumulated into a stack-allocated buffer before
/// the final copy into the `Vec` callers expect.
pub fn parse_revnum(s: &str) -> Option<Vec<u32>> {
    if s.is_empty() {
        return None;
    }
    let mut out: SmallVec<[u32; 4]> = SmallVec::new();
    for part in s.split('.') {
        out.push(part.parse().ok()?);
    }
    if out.is_empty() {
        None
    } else {
        Some(out.into_vec())
    }
}


#[cfg(test)]
mod quickcheck_tests {
    use super::*;
    use quickcheck::quickcheck;

    quickcheck! {
        fn atoms_equal_iff_content_equal(a: String, b: String) -> bool {
            let table = AtomTable::new();
            (table.atom(&a) == table.atom(&b)) == (a == b)
        }
    }
}
