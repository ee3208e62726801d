//! The core of the calculator. It computes each participant's share of an
//! expense under every allocation strategy.
//!
//! Every function here is pure: the inputs are read-only and the result
//! depends on nothing else, so callers may invoke them concurrently without
//! coordination.

use std::collections::HashMap;

use crate::types::{Amount, Expense, Split};

/// Get the share of the expense owed by the given participant.
///
/// The share depends on the allocation strategy:
/// - `Equal`: the total divided evenly across the participant set
/// - `Unequal`: the amount recorded for the participant, zero if missing
/// - `ByParts`: the total multiplied by the participant's fraction of the
///   total parts; zero for everyone when the total parts are zero
/// - `ByItem`: the sum, over the items the participant is assigned to, of
///   the item amount divided evenly among its assignees
///
/// A participant outside the expense's participant set owes zero. This is a
/// defined no-op rather than an error, because the editing UI routinely
/// probes shares for people just removed from the expense.
///
/// The math is plain floating point: rounding errors stay far below a cent
/// for realistic amounts, and display rounding happens at the presentation
/// boundary anyway.
pub fn compute_share(expense: &Expense, participant: &str) -> Amount {
    if !expense.is_participant(participant) {
        return 0.0;
    }

    match &expense.split {
        Split::Equal => expense.total / expense.participant_count() as f64,
        Split::Unequal { amounts } => amounts.get(participant).copied().unwrap_or(0.0),
        Split::ByParts { parts } => {
            let all_parts = total_parts(expense);
            if all_parts == 0 {
                return 0.0;
            }
            let weight = parts.get(participant).copied().unwrap_or(0);
            expense.total * weight as f64 / all_parts as f64
        }
        Split::ByItem { items } => items
            .iter()
            .filter(|item| item.assigned_to.contains(participant))
            .map(|item| item.amount / item.assigned_to.len() as f64)
            .sum(),
    }
}

/// The share of every member of the participant set, keyed by participant
/// id. This is the breakdown handed to the sync layer for persistence.
pub fn share_breakdown(expense: &Expense) -> HashMap<String, Amount> {
    expense
        .participants
        .iter()
        .map(|id| (id.clone(), compute_share(expense, id)))
        .collect()
}

/// The part of the total actually allocated to someone, i.e. the sum of all
/// shares. Smaller than the total when an `Unequal` split leaves money
/// unassigned or a `ByItem` split has items without assignees.
pub fn allocated_total(expense: &Expense) -> Amount {
    expense
        .participants
        .iter()
        .map(|id| compute_share(expense, id))
        .sum()
}

/// Sum of the parts of everyone in the participant set under `ByParts`;
/// zero for every other strategy.
///
/// Entries of the parts map that are not in the participant set are
/// ignored: the editing UI keeps old weights around when someone is removed
/// from the expense, and a stale weight must not inflate the denominator
/// for everyone else. The weights are summed as `u64`, since two large
/// weights can already exceed the `u32` range. Exposed so callers can check
/// for zero-part participants before saving.
pub fn total_parts(expense: &Expense) -> u64 {
    match &expense.split {
        Split::ByParts { parts } => expense
            .participants
            .iter()
            .filter_map(|id| parts.get(id))
            .map(|&weight| weight as u64)
            .sum(),
        _ => 0,
    }
}

/// How much of the total is not covered by the explicit amounts of an
/// `Unequal` split. Never negative: over-assignment clamps to zero and is
/// reported by the validator at save time, not here. Zero for every other
/// strategy.
pub fn remaining_to_assign(expense: &Expense) -> Amount {
    match &expense.split {
        Split::Unequal { amounts } => {
            let assigned: Amount = amounts.values().sum();
            (expense.total - assigned).max(0.0)
        }
        _ => 0.0,
    }
}

/// Total of the `ByItem` items nobody is assigned to. Such items are owed
/// by no one and only surface here, so the UI can show the gap. Zero for
/// every other strategy.
pub fn unassigned_total(expense: &Expense) -> Amount {
    match &expense.split {
        Split::ByItem { items } => items
            .iter()
            .filter(|item| item.assigned_to.is_empty())
            .map(|item| item.amount)
            .sum(),
        _ => 0.0,
    }
}
