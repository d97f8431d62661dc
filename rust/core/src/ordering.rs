// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sort orders for group titles and leaf elements.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

use rustc_hash::FxHashMap;

/// Natural string comparison.
///
/// Letters compare case-insensitively, runs of ASCII digits compare by
/// numeric value ("Level 2" < "Level 10"). Strings that are equal under
/// those rules fall back to plain byte order so the result is a total order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_cmp_folded(a, b).then_with(|| a.cmp(b))
}

fn natural_cmp_folded(a: &str, b: &str) -> Ordering {
    let mut ai = a.chars().peekable();
    let mut bi = b.chars().peekable();

    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let na = take_digits(&mut ai);
                let nb = take_digits(&mut bi);
                let ta = na.trim_start_matches('0');
                let tb = nb.trim_start_matches('0');
                let ord = ta.len().cmp(&tb.len()).then_with(|| ta.cmp(tb));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                ai.next();
                bi.next();
                let ord = x.to_lowercase().cmp(y.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn take_digits(it: &mut Peekable<Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(&c) = it.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        it.next();
    }
    digits
}

/// Ordering of group titles with an optional priority list.
///
/// Titles in the priority list come first, in list order. Everything else
/// follows in natural order.
#[derive(Debug, Clone, Default)]
pub struct KeyOrder {
    rank: FxHashMap<String, usize>,
}

impl KeyOrder {
    pub fn new<I, S>(priority: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rank = FxHashMap::default();
        for (i, key) in priority.into_iter().enumerate() {
            // First occurrence wins if the list repeats a key.
            rank.entry(key.into()).or_insert(i);
        }
        Self { rank }
    }

    pub fn is_empty(&self) -> bool {
        self.rank.is_empty()
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match (self.rank.get(a), self.rank.get(b)) {
            (Some(ra), Some(rb)) => ra.cmp(rb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => natural_cmp(a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_compare_numerically() {
        assert_eq!(natural_cmp("Level 2", "Level 10"), Ordering::Less);
        assert_eq!(natural_cmp("Level 010", "Level 9"), Ordering::Greater);
        assert_eq!(natural_cmp("a1b2", "a1b10"), Ordering::Less);
    }

    #[test]
    fn case_insensitive_with_total_tiebreak() {
        assert_eq!(natural_cmp("doors", "Walls"), Ordering::Less);
        assert_eq!(natural_cmp("Walls", "walls"), Ordering::Less);
        assert_eq!(natural_cmp("Walls", "Walls"), Ordering::Equal);
        assert_eq!(natural_cmp("", "A"), Ordering::Less);
    }

    #[test]
    fn priority_before_alphabetical() {
        let order = KeyOrder::new(["Identity Data", "Dimensions"]);
        let mut keys = vec!["Constraints", "Dimensions", "Analysis", "Identity Data"];
        keys.sort_by(|a, b| order.compare(a, b));
        assert_eq!(keys, vec!["Identity Data", "Dimensions", "Analysis", "Constraints"]);
    }

    #[test]
    fn empty_priority_is_natural() {
        let order = KeyOrder::default();
        assert!(order.is_empty());
        assert_eq!(order.compare("B", "a"), Ordering::Greater);
    }
}
