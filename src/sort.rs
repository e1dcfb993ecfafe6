//! This source code is licensed under the MIT license found in the
//! LICENSE file in the root directory of this source tree.

//! Head ordering: a stable merge sort so every branch's parent precedes its
//! children in the head list, with trunk always first.

use std::cmp::Ordering;

use crate::graph::Head;
use crate::input::ParsedMaster;

/// `sort_heads`: stable bottom-up merge sort over the head list.
///
/// The original implementation sorts a linked list in place using the
/// natural-merge algorithm described at
/// chiark.greenend.org.uk/~sgtatham/algorithms/listsort.html; any stable
/// O(n log n) sort produces the same order over the same comparator, so
/// this is a plain top-down merge sort over the `Vec` instead of a
/// reimplementation of that list-splicing dance.
pub fn sort_heads(heads: &mut Vec<Head>, parsed: &ParsedMaster) {
    let merged = merge_sort(std::mem::take(heads), parsed);
    *heads = merged;
}

fn merge_sort(heads: Vec<Head>, parsed: &ParsedMaster) -> Vec<Head> {
    if heads.len() <= 1 {
        return heads;
    }
    let mid = heads.len() / 2;
    let mut iter = heads.into_iter();
    let left: Vec<Head> = (&mut iter).take(mid).collect();
    let right: Vec<Head> = iter.collect();

    let left = merge_sort(left, parsed);
    let right = merge_sort(right, parsed);
    merge(left, right, parsed)
}

fn merge(left: Vec<Head>, right: Vec<Head>, parsed: &ParsedMaster) -> Vec<Head> {
    let mut out = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => {
                if compare_heads(parsed, l, r) == Ordering::Greater {
                    out.push(right.next().unwrap());
                } else {
                    out.push(left.next().unwrap());
                }
            }
            (Some(_), None) => out.push(left.next().unwrap()),
            (None, Some(_)) => out.push(right.next().unwrap()),
            (None, None) => break,
        }
    }
    out
}

/// `rev_ref_compare`: a head with no matching symbol sorts before any head
/// that has one; otherwise compare by the symbol's revision number.
fn compare_heads(parsed: &ParsedMaster, a: &Head, b: &Head) -> Ordering {
    let a_number = a.ref_name.as_ref().and_then(|n| symbol_number(parsed, n.as_str()));
    let b_number = b.ref_name.as_ref().and_then(|n| symbol_number(parsed, n.as_str()));
    match (a_number, b_number) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.cmp(y),
    }
}

fn symbol_number<'a>(parsed: &'a ParsedMaster, name: &str) -> Option<&'a [u32]> {
    parsed.symbols.iter().find(|s| s.name == name).map(|s| s.number.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::AtomTable;
    use crate::commit::CommitId;
    use crate::input::ParsedSymbol;

    fn head(atoms: &AtomTable, name: Option<&str>) -> Head {
        Head {
            commit: CommitId(0),
            ref_name: name.map(|n| atoms.atom(n)),
            number: None,
            degree: 0,
            parent: None,
            tail: false,
        }
    }

    #[test]
    fn unnamed_heads_and_master_sort_before_symbol_named_heads() {
        let atoms = AtomTable::new();
        let parsed = ParsedMaster {
            symbols: vec![
                ParsedSymbol { name: "REL1".to_string(), number: vec![1, 2, 2, 0] },
                ParsedSymbol { name: "REL2".to_string(), number: vec![1, 4, 2, 0] },
            ],
            ..Default::default()
        };
        let mut heads = vec![
            head(&atoms, Some("REL2")),
            head(&atoms, Some("master")),
            head(&atoms, Some("REL1")),
        ];

        sort_heads(&mut heads, &parsed);

        let names: Vec<_> = heads
            .iter()
            .map(|h| h.ref_name.as_ref().map(|a| a.as_str().to_string()).unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["master", "REL1", "REL2"]);
    }

    #[test]
    fn sort_is_stable_among_equal_keys() {
        let atoms = AtomTable::new();
        let parsed = ParsedMaster::default();
        let a = atoms.atom("a-UNNAMED-BRANCH");
        let b = atoms.atom("b-UNNAMED-BRANCH");
        let mut heads = vec![
            Head { commit: CommitId(1), ref_name: Some(a.clone()), number: None, degree: 0, parent: None, tail: false },
            Head { commit: CommitId(2), ref_name: Some(b.clone()), number: None, degree: 0, parent: None, tail: false },
        ];
        sort_heads(&mut heads, &parsed);
        assert_eq!(heads[0].commit, CommitId(1));
        assert_eq!(heads[1].commit, CommitId(2));
    }
}
