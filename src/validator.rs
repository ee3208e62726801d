//! Functions that check the validity of expenses and settlements.
//!
//! These checks implement the save-time contract. The calculator itself
//! stays permissive and answers questions about half-edited expenses too,
//! so everything that must hold before a record is persisted lives here.

use std::collections::HashMap;

use crate::currency::is_valid_currency_code;
use crate::error::SplitError;
use crate::types::{Amount, Expense, Item, Participant, Settlement, Split};

/// Amounts typed by users are cent-precise, so a tenth of a cent of float
/// drift is ignored when reconciling sums against the total.
const RECONCILE_TOLERANCE: f64 = 0.001;

/// How strictly caller-supplied allocations must reconcile with the total.
///
/// `Permissive` accepts partially assigned `Unequal` and `ByItem` expenses,
/// since the editing UI saves drafts in that state. `Strict` additionally
/// requires the allocations to add up to the total. Permissive is the
/// default until product intent says otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValidationPolicy {
    #[default]
    Permissive,
    Strict,
}

/// Some sanity checks on an expense before it is saved.
///
/// List of checks:
/// - the total is a positive, finite number
/// - the currency code has a valid shape
/// - there is at least one participant and the payer is named
/// - custom amounts and item amounts are non-negative finite numbers and
///   do not exceed the total
/// - every participant of a parts split has at least one part
/// - under [`ValidationPolicy::Strict`], custom amounts and items must add
///   up to the total, custom amounts and assignees must all belong to the
///   participant set, and every item must be assigned to someone
///
/// Permissive saves tolerate allocations left for people no longer in the
/// expense: those never reach anyone's share, so they are residue for the
/// editing UI to clean up rather than corrupted money.
pub fn validate_expense(expense: &Expense, policy: ValidationPolicy) -> Result<(), SplitError> {
    check_total(expense.total)?;
    check_currency(&expense.currency)?;
    check_participants(expense)?;

    match &expense.split {
        Split::Equal => Ok(()),
        Split::Unequal { amounts } => check_unequal(expense, amounts, policy),
        Split::ByParts { parts } => check_by_parts(expense, parts),
        Split::ByItem { items } => check_by_item(expense, items, policy),
    }
}

/// Some sanity checks on a settlement before it is saved.
///
/// List of checks:
/// - the amount is a positive, finite number
/// - the payer and the payee are two different people
/// - the currency code has a valid shape
pub fn validate_settlement(settlement: &Settlement) -> Result<(), SplitError> {
    if !settlement.amount.is_finite() || settlement.amount <= 0.0 {
        return Err(SplitError::invalid_settlement(
            "the amount must be a positive number",
        ));
    }
    if settlement.payer == settlement.payee {
        return Err(SplitError::invalid_settlement(
            "the payer and the payee must be two different people",
        ));
    }
    check_currency(&settlement.currency)
}

/// Some sanity checks on a participant record fetched from the sync layer.
/// Malformed people records are skipped on fetch instead of breaking every
/// screen that lists them.
///
/// List of checks:
/// - the id is not empty
/// - the display name is not blank
pub fn validate_participant(participant: &Participant) -> Result<(), SplitError> {
    if participant.id.is_empty() {
        return Err(SplitError::invalid_participant("the id is empty"));
    }
    if participant.name.trim().is_empty() {
        return Err(SplitError::invalid_participant(&format!(
            "`{}` has a blank display name",
            participant.id
        )));
    }
    Ok(())
}

fn check_total(total: Amount) -> Result<(), SplitError> {
    if !total.is_finite() || total <= 0.0 {
        return Err(SplitError::invalid_expense(
            "the total amount must be a positive number",
        ));
    }
    Ok(())
}

fn check_currency(code: &str) -> Result<(), SplitError> {
    if !is_valid_currency_code(code) {
        return Err(SplitError::invalid_currency(code));
    }
    Ok(())
}

fn check_participants(expense: &Expense) -> Result<(), SplitError> {
    if expense.participants.is_empty() {
        return Err(SplitError::invalid_expense(
            "there are no participants in this expense",
        ));
    }
    if expense.payer.is_empty() {
        return Err(SplitError::invalid_expense("the expense has no payer"));
    }
    Ok(())
}

fn check_unequal(
    expense: &Expense,
    amounts: &HashMap<String, Amount>,
    policy: ValidationPolicy,
) -> Result<(), SplitError> {
    for &amount in amounts.values() {
        if !amount.is_finite() || amount < 0.0 {
            return Err(SplitError::invalid_expense(
                "custom amounts must be non-negative numbers",
            ));
        }
    }

    let assigned: Amount = amounts.values().sum();
    if assigned > expense.total + RECONCILE_TOLERANCE {
        return Err(SplitError::invalid_expense(
            "the custom amounts are worth more than the total",
        ));
    }

    if policy == ValidationPolicy::Strict {
        for (id, &amount) in amounts {
            if amount > 0.0 && !expense.is_participant(id) {
                return Err(SplitError::invalid_expense(&format!(
                    "there is a custom amount for `{id}`, who is not a participant"
                )));
            }
        }
        if (expense.total - assigned).abs() > RECONCILE_TOLERANCE {
            return Err(SplitError::invalid_expense(
                "the custom amounts do not add up to the total",
            ));
        }
    }
    Ok(())
}

fn check_by_parts(expense: &Expense, parts: &HashMap<String, u32>) -> Result<(), SplitError> {
    for id in &expense.participants {
        if parts.get(id).copied().unwrap_or(0) == 0 {
            return Err(SplitError::invalid_expense(&format!(
                "participant `{id}` has zero parts"
            )));
        }
    }
    Ok(())
}

fn check_by_item(
    expense: &Expense,
    items: &[Item],
    policy: ValidationPolicy,
) -> Result<(), SplitError> {
    for item in items {
        if !item.amount.is_finite() || item.amount < 0.0 {
            return Err(SplitError::invalid_expense(
                "item amounts must be non-negative numbers",
            ));
        }
    }

    let item_total: Amount = items.iter().map(|i| i.amount).sum();
    if item_total > expense.total + RECONCILE_TOLERANCE {
        return Err(SplitError::invalid_expense(
            "the items are worth more than the total",
        ));
    }

    if policy == ValidationPolicy::Strict {
        for item in items {
            if item.assigned_to.is_empty() {
                return Err(SplitError::invalid_expense(&format!(
                    "item `{}` is not assigned to anyone",
                    item.name
                )));
            }
            for id in &item.assigned_to {
                if !expense.is_participant(id) {
                    return Err(SplitError::invalid_expense(&format!(
                        "item `{}` is assigned to `{id}`, who is not a participant",
                        item.name
                    )));
                }
            }
        }
        if (expense.total - item_total).abs() > RECONCILE_TOLERANCE {
            return Err(SplitError::invalid_expense(
                "the items do not add up to the total",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{DateTime, Utc};

    use super::*;

    fn ids(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn make_expense(total: Amount, split: Split) -> Expense {
        Expense::new(
            total,
            "USD",
            split,
            "anna",
            ids(&["anna", "bruno"]),
            DateTime::<Utc>::MIN_UTC,
        )
    }

    fn unequal(pairs: &[(&str, Amount)]) -> Split {
        Split::Unequal {
            amounts: pairs.iter().map(|(n, a)| (n.to_string(), *a)).collect(),
        }
    }

    #[test]
    fn test_valid_equal_expense() {
        let expense = make_expense(90.0, Split::Equal);
        assert!(validate_expense(&expense, ValidationPolicy::Permissive).is_ok());
        assert!(validate_expense(&expense, ValidationPolicy::Strict).is_ok());
    }

    #[test]
    fn test_total_must_be_positive() {
        assert!(validate_expense(&make_expense(0.0, Split::Equal), Default::default()).is_err());
        assert!(validate_expense(&make_expense(-5.0, Split::Equal), Default::default()).is_err());
        assert!(
            validate_expense(&make_expense(f64::NAN, Split::Equal), Default::default()).is_err()
        );
        assert!(validate_expense(
            &make_expense(f64::INFINITY, Split::Equal),
            Default::default()
        )
        .is_err());
    }

    #[test]
    fn test_currency_code_must_have_a_valid_shape() {
        let mut expense = make_expense(90.0, Split::Equal);
        expense.currency = "euros".to_string();

        let result = validate_expense(&expense, Default::default());
        assert!(matches!(result, Err(SplitError::InvalidCurrency(_))));
    }

    #[test]
    fn test_participants_must_not_be_empty() {
        let mut expense = make_expense(90.0, Split::Equal);
        expense.participants.clear();
        assert!(validate_expense(&expense, Default::default()).is_err());
    }

    #[test]
    fn test_payer_must_be_named() {
        let mut expense = make_expense(90.0, Split::Equal);
        expense.payer = String::new();
        assert!(validate_expense(&expense, Default::default()).is_err());
    }

    #[test]
    fn test_unequal_amounts_must_be_non_negative() {
        let expense = make_expense(90.0, unequal(&[("anna", -1.0), ("bruno", 91.0)]));
        assert!(validate_expense(&expense, Default::default()).is_err());
    }

    #[test]
    fn test_stale_unequal_amounts_depend_on_policy() {
        // carla is no longer a participant but her amount is still in the
        // map: a permissive save keeps the residue, a strict one rejects it.
        let expense = make_expense(90.0, unequal(&[("anna", 40.0), ("carla", 50.0)]));
        assert!(validate_expense(&expense, ValidationPolicy::Permissive).is_ok());
        assert!(validate_expense(&expense, ValidationPolicy::Strict).is_err());

        // A leftover entry worth nothing is fine even for a strict save.
        let expense = make_expense(
            90.0,
            unequal(&[("anna", 40.0), ("bruno", 50.0), ("carla", 0.0)]),
        );
        assert!(validate_expense(&expense, ValidationPolicy::Strict).is_ok());
    }

    #[test]
    fn test_unequal_amounts_must_not_exceed_the_total() {
        let expense = make_expense(90.0, unequal(&[("anna", 50.0), ("bruno", 50.0)]));
        assert!(validate_expense(&expense, Default::default()).is_err());
    }

    #[test]
    fn test_partial_unequal_assignment_depends_on_policy() {
        let expense = make_expense(90.0, unequal(&[("anna", 50.0)]));
        assert!(validate_expense(&expense, ValidationPolicy::Permissive).is_ok());
        assert!(validate_expense(&expense, ValidationPolicy::Strict).is_err());

        let complete = make_expense(90.0, unequal(&[("anna", 50.0), ("bruno", 40.0)]));
        assert!(validate_expense(&complete, ValidationPolicy::Strict).is_ok());
    }

    #[test]
    fn test_by_parts_requires_a_part_for_everyone() {
        let split = Split::ByParts {
            parts: HashMap::from([("anna".to_string(), 2)]),
        };
        assert!(validate_expense(&make_expense(90.0, split), Default::default()).is_err());

        let split = Split::ByParts {
            parts: HashMap::from([("anna".to_string(), 2), ("bruno".to_string(), 0)]),
        };
        assert!(validate_expense(&make_expense(90.0, split), Default::default()).is_err());

        let split = Split::ByParts {
            parts: HashMap::from([("anna".to_string(), 2), ("bruno".to_string(), 1)]),
        };
        assert!(validate_expense(&make_expense(90.0, split), Default::default()).is_ok());
    }

    #[test]
    fn test_stale_item_assignees_depend_on_policy() {
        let split = Split::ByItem {
            items: vec![Item::new("wine", 20.0, ids(&["anna", "carla"]))],
        };
        let expense = make_expense(20.0, split);
        assert!(validate_expense(&expense, ValidationPolicy::Permissive).is_ok());
        assert!(validate_expense(&expense, ValidationPolicy::Strict).is_err());
    }

    #[test]
    fn test_item_amounts_must_be_non_negative() {
        // A scanned discount line keeps its sign through parse_receipt, so
        // the save is where a negative item has to stop.
        let split = Split::ByItem {
            items: vec![
                Item::new("wine", 23.45, ids(&["anna"])),
                Item::new("discount", -3.45, ids(&["anna", "bruno"])),
            ],
        };
        let expense = make_expense(20.0, split);
        assert!(validate_expense(&expense, ValidationPolicy::Permissive).is_err());
        assert!(validate_expense(&expense, ValidationPolicy::Strict).is_err());

        let split = Split::ByItem {
            items: vec![Item::new("wine", f64::NAN, ids(&["anna"]))],
        };
        assert!(validate_expense(&make_expense(20.0, split), Default::default()).is_err());
    }

    #[test]
    fn test_items_must_not_exceed_the_total() {
        let split = Split::ByItem {
            items: vec![
                Item::new("wine", 60.0, ids(&["anna"])),
                Item::new("pasta", 40.0, ids(&["bruno"])),
            ],
        };
        assert!(validate_expense(&make_expense(90.0, split), Default::default()).is_err());
    }

    #[test]
    fn test_unassigned_items_depend_on_policy() {
        let split = Split::ByItem {
            items: vec![
                Item::new("wine", 60.0, ids(&["anna"])),
                Item::unassigned("tip", 30.0),
            ],
        };
        let expense = make_expense(90.0, split);
        assert!(validate_expense(&expense, ValidationPolicy::Permissive).is_ok());
        assert!(validate_expense(&expense, ValidationPolicy::Strict).is_err());
    }

    #[test]
    fn test_strict_items_must_add_up_to_the_total() {
        let split = Split::ByItem {
            items: vec![Item::new("wine", 60.0, ids(&["anna"]))],
        };
        let expense = make_expense(90.0, split);
        assert!(validate_expense(&expense, ValidationPolicy::Permissive).is_ok());
        assert!(validate_expense(&expense, ValidationPolicy::Strict).is_err());

        let split = Split::ByItem {
            items: vec![
                Item::new("wine", 60.0, ids(&["anna"])),
                Item::new("pasta", 30.0, ids(&["bruno"])),
            ],
        };
        assert!(validate_expense(&make_expense(90.0, split), ValidationPolicy::Strict).is_ok());
    }

    #[test]
    fn test_valid_settlement() {
        let settlement = Settlement::new("anna", "bruno", 10.0, "EUR", DateTime::<Utc>::MIN_UTC);
        assert!(validate_settlement(&settlement).is_ok());
    }

    #[test]
    fn test_settlement_amount_must_be_positive() {
        let settlement = Settlement::new("anna", "bruno", 0.0, "EUR", DateTime::<Utc>::MIN_UTC);
        assert!(validate_settlement(&settlement).is_err());
    }

    #[test]
    fn test_settlement_needs_two_different_people() {
        let settlement = Settlement::new("anna", "anna", 10.0, "EUR", DateTime::<Utc>::MIN_UTC);
        assert!(validate_settlement(&settlement).is_err());
    }

    #[test]
    fn test_settlement_currency_must_have_a_valid_shape() {
        let settlement = Settlement::new("anna", "bruno", 10.0, "e", DateTime::<Utc>::MIN_UTC);
        assert!(matches!(
            validate_settlement(&settlement),
            Err(SplitError::InvalidCurrency(_))
        ));
    }

    #[test]
    fn test_valid_participant() {
        let participant = Participant::new("u1", "Anna");
        assert!(validate_participant(&participant).is_ok());
    }

    #[test]
    fn test_participant_needs_an_id_and_a_name() {
        assert!(validate_participant(&Participant::new("", "Anna")).is_err());
        assert!(validate_participant(&Participant::new("u1", "")).is_err());
        assert!(validate_participant(&Participant::new("u1", "   ")).is_err());
    }
}
