// Head-to-head indicator between the two selected players' season totals.

use std::cmp::Ordering;

use crate::derive::DisplayRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    FirstGreater,
    FirstLesser,
}

impl Comparison {
    pub fn from_totals(first: i32, second: i32) -> Self {
        match first.cmp(&second) {
            Ordering::Equal => Comparison::Equal,
            Ordering::Greater => Comparison::FirstGreater,
            Ordering::Less => Comparison::FirstLesser,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Equal => "=",
            Comparison::FirstGreater => "↑",
            Comparison::FirstLesser => "↓",
        }
    }
}

/// Compare season totals; `None` unless exactly two records are present.
pub fn compare(records: &[DisplayRecord]) -> Option<Comparison> {
    match records {
        [first, second] => Some(Comparison::from_totals(
            first.season_points,
            second.season_points,
        )),
        _ => None,
    }
}
