//! Selecting between API call variants of one data source or resource
//!
//! Many endpoints come in families, e.g. "list ports of a switch" and "get
//! one port of a switch". Each variant is described by a group of predicates
//! ("serial is set", "port_id is set") and the groups are ordered from least
//! to most specific.

/// Returned by [`pick_method`] when no group is fully satisfied
pub const NO_METHOD: usize = 0;

/// Returns the 1-based index of the last group whose predicates all hold
///
/// Every group is evaluated; a less specific group that matches does not
/// stop the search. An empty group always matches. Returns [`NO_METHOD`]
/// when nothing matches.
pub fn pick_method(groups: &[&[bool]]) -> usize {
    groups
        .iter()
        .enumerate()
        .filter(|(_, group)| group.iter().all(|&predicate| predicate))
        .map(|(index, _)| index + 1)
        .last()
        .unwrap_or(NO_METHOD)
}
