//! Segment-wise natural ordering and the sorted insertion scan.
//!
//! Entries in the providers and aliases arrays are kept in ascending order
//! under a natural (numeric-aware) comparison of their sort key: the
//! backslash-separated segments of a fully-qualified class name, or the
//! single quoted key of an alias. `Item2` sorts before `Item10`, matching
//! how hand-edited config files are ordered.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

use crate::block::Block;
use crate::document::Document;

/// Ordered segments an entry is compared by.
pub type SortKey = Vec<String>;

/// Sort key of a fully-qualified class name.
pub fn key_from_class(class: &str) -> SortKey {
    class
        .trim_start_matches('\\')
        .split('\\')
        .map(str::to_string)
        .collect()
}

/// Natural comparison of two single segments: digit runs compare by
/// numeric value, everything else by character.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ca = a.chars().peekable();
    let mut cb = b.chars().peekable();

    loop {
        match (ca.peek().copied(), cb.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let run_a = take_digits(&mut ca);
                let run_b = take_digits(&mut cb);
                match cmp_digit_runs(&run_a, &run_b) {
                    Ordering::Equal => {}
                    other => return other,
                }
            }
            (Some(x), Some(y)) => match x.cmp(&y) {
                Ordering::Equal => {
                    ca.next();
                    cb.next();
                }
                other => return other,
            },
        }
    }
}

/// Compare two sort keys segment by segment; the first differing segment
/// decides. When all compared segments are equal the shorter key orders
/// first, so a key never compares greater than one it is a prefix of.
pub fn compare_keys(a: &SortKey, b: &SortKey) -> Ordering {
    for (sa, sb) in a.iter().zip(b.iter()) {
        match natural_cmp(sa, sb) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

/// Insert `lines` into `block` so its entries stay in ascending order.
///
/// `extract` yields the sort key of an existing entry line, or `None` for
/// lines that are not entries (blanks, comments). The scan walks the block
/// interior and splices before the first entry ordered strictly after
/// `key`; if none exists the lines go immediately before the close marker,
/// which also covers the empty block. Equal keys keep scanning, so
/// duplicates and prefix-equal ties never insert early (the caller handles
/// duplicate detection before asking for an insert).
pub fn insert_sorted<F>(doc: &mut Document, block: &Block, key: &SortKey, lines: &[String], extract: F)
where
    F: Fn(&str) -> Option<SortKey>,
{
    let mut at = block.end;
    for idx in block.interior() {
        let Some(existing) = extract(doc.line(idx)) else {
            continue;
        };
        if compare_keys(&existing, key) == Ordering::Greater {
            at = idx;
            break;
        }
    }
    doc.insert(at, lines);
}

fn take_digits(chars: &mut Peekable<Chars>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(*c);
        chars.next();
    }
    run
}

/// Compare two digit runs numerically without parsing to an integer:
/// strip leading zeros, then longer run wins, then lexicographic. Runs of
/// equal value fall back to raw length so `01` and `1` stay distinct.
fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let va = a.trim_start_matches('0');
    let vb = b.trim_start_matches('0');
    va.len()
        .cmp(&vb.len())
        .then_with(|| va.cmp(vb))
        .then_with(|| a.len().cmp(&b.len()))
}
