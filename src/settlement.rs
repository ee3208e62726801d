//! Settlement bookkeeping. It contains the pair netting used when showing a
//! single expense and the algorithm that settles a whole group of expenses
//! with a short list of money exchanges.

use std::cmp::Ordering;
use std::collections::HashMap;

use log::Level::Debug;
use log::{debug, log_enabled, warn};

use crate::calculator::{allocated_total, compute_share};
use crate::types::{Amount, Expense, MoneyExchange, NetBalance, Settlement};

/// Balances within half a cent of zero are considered settled.
const SETTLED_TOLERANCE: f64 = 0.005;

/// How much `a` still owes `b` for this expense, positive when `a` owes `b`
/// and negative for the reverse.
///
/// The expense fixes the debt direction: the payer is owed every other
/// participant's share. Settlement records between the pair in the
/// expense's currency are then summed with sign (payments by the debtor
/// reduce the debt, payments by the creditor undo earlier reductions) and
/// subtracted from it. The remaining debt is clamped to stay between zero
/// and the original share: paying too much never flips who owes whom, the
/// excess is reported in [`NetBalance::overpaid`] instead, and payments in
/// the wrong direction never grow the debt past what the expense created.
pub fn net_balance(
    expense: &Expense,
    a: &str,
    b: &str,
    settlements: &[Settlement],
) -> NetBalance {
    if a == b {
        return NetBalance::settled();
    }

    let raw = expense_debt(expense, a, b);
    let (debtor, creditor, original) = if raw >= 0.0 {
        (a, b, raw)
    } else {
        (b, a, -raw)
    };

    let paid = signed_payments(debtor, creditor, &expense.currency, settlements);

    let mut remaining = original - paid;
    let mut overpaid = 0.0;
    if remaining < 0.0 {
        overpaid = -remaining;
        remaining = 0.0;
        warn!(
            "{debtor} paid {creditor} {overpaid:.2} more than the {original:.2} owed for this expense"
        );
    } else if remaining > original {
        remaining = original;
    }

    let amount = if debtor == a { remaining } else { -remaining };
    NetBalance { amount, overpaid }
}

/// The debt the expense alone creates from `a` to `b`, before settlements.
/// Zero when the payer is neither of the two: both may owe the payer, but
/// not each other.
fn expense_debt(expense: &Expense, a: &str, b: &str) -> Amount {
    let mut debt = 0.0;
    if expense.payer == b {
        debt += compute_share(expense, a);
    }
    if expense.payer == a {
        debt -= compute_share(expense, b);
    }
    debt
}

fn signed_payments(
    debtor: &str,
    creditor: &str,
    currency: &str,
    settlements: &[Settlement],
) -> Amount {
    settlements
        .iter()
        .filter(|s| s.currency == currency)
        .map(|s| {
            if s.payer == debtor && s.payee == creditor {
                s.amount
            } else if s.payer == creditor && s.payee == debtor {
                -s.amount
            } else {
                0.0
            }
        })
        .sum()
}

/// One net balance per person across the whole group: negative for people
/// who owe money, positive for people who must receive money.
///
/// Only expenses and settlements in the given currency are counted, since
/// balances in different units cannot be added. A group that mixes
/// currencies gets one balance map per currency, and the caller may use
/// [`crate::currency::convert`] to present them as one figure.
///
/// Each expense debits every participant by their share and credits the
/// payer with the allocated total, so the balances sum to zero even when
/// part of an expense is unassigned. Recorded settlements then move money
/// from payer to payee.
pub fn group_balances(
    expenses: &[Expense],
    settlements: &[Settlement],
    currency: &str,
) -> HashMap<String, Amount> {
    let mut balance = HashMap::new();

    for expense in expenses.iter().filter(|e| e.currency == currency) {
        for id in &expense.participants {
            let entry = balance.entry(id.clone()).or_insert(0.0);
            *entry -= compute_share(expense, id);
        }
        let entry = balance.entry(expense.payer.clone()).or_insert(0.0);
        *entry += allocated_total(expense);
    }

    for settlement in settlements.iter().filter(|s| s.currency == currency) {
        let entry = balance.entry(settlement.payer.clone()).or_insert(0.0);
        *entry += settlement.amount;
        let entry = balance.entry(settlement.payee.clone()).or_insert(0.0);
        *entry -= settlement.amount;
    }

    balance
}

/// Get a list of money exchanges in the given currency that settles the
/// whole group, every expense and recorded settlement in that currency
/// taken into account. The output is sorted by debtors first and creditors
/// second.
///
/// The algorithm:
/// - net all expenses and settlements into one balance per person with
///   [`group_balances`]
/// - pick a debtor and a creditor
/// - compare the debt *d* with the credit *c*:
///     * if *d* is bigger: the debtor gives *c* to the creditor, and the
///       next creditor is picked
///     * if *d* is smaller: the debtor gives *d* to the creditor, and the
///       next debtor is picked
///     * if they are equal: the debtor gives *d* and both are replaced
/// - stop when debtors or creditors run out
///
/// The result is correct but not always minimal: a shorter list may exist,
/// but finding the minimum is NP-complete and the greedy answer is close
/// enough in practice.
///
/// Amounts are compared with one cent of tolerance, since a share like a
/// third of ten euros cannot be paid to the exact cent anyway.
pub fn compute_exchanges(
    expenses: &[Expense],
    settlements: &[Settlement],
    currency: &str,
) -> Vec<MoneyExchange> {
    let balance = group_balances(expenses, settlements, currency);
    let mut debtors: Vec<_> = balance
        .iter()
        .filter_map(|(p, &a)| if a < -SETTLED_TOLERANCE { Some((p, a)) } else { None })
        .collect();
    let mut creditors: Vec<_> = balance
        .iter()
        .filter_map(|(p, &a)| if a > SETTLED_TOLERANCE { Some((p, a)) } else { None })
        .collect();

    // Sort debtors and creditors to ensure consistent results. The order is
    // reversed cause then we use `pop`, so we iterate the vectors in reverse
    // order.
    debtors.sort_by(|x, y| reverse_ordering(x.0.partial_cmp(y.0).expect("Cannot sort debtors")));
    creditors.sort_by(|x, y| reverse_ordering(x.0.partial_cmp(y.0).expect("Cannot sort creditors")));

    if log_enabled!(Debug) {
        let sum: f64 = balance.values().sum();
        if sum.abs() > 0.01 {
            debug!("Group balances should sum to 0. In reality they sum to {sum}");
            debug!("{:?}", &debtors);
            debug!("{:?}", &creditors);
        }
    }

    let mut result = vec![];

    while !debtors.is_empty() && !creditors.is_empty() {
        let debtor = debtors.pop().expect("just checked debtors are non-empty!");
        let creditor = creditors
            .pop()
            .expect("just checked creditors are non-empty!");
        if are_amount_equal(debtor.1, creditor.1) {
            result.push(MoneyExchange::new(debtor.0, creditor.0, creditor.1));
        } else if -debtor.1 < creditor.1 {
            let debt = -debtor.1;
            result.push(MoneyExchange::new(debtor.0, creditor.0, debt));
            creditors.push((creditor.0, creditor.1 - debt));
        } else {
            let debt = creditor.1;
            result.push(MoneyExchange::new(debtor.0, creditor.0, debt));
            debtors.push((debtor.0, debtor.1 + debt));
        }
    }

    if !creditors.is_empty() {
        warn!(
            "We run out of debtors but we still have creditors: {:?}",
            creditors
        );
    } else if !debtors.is_empty() {
        warn!(
            "We run out of creditors but we still have debtors: {:?}",
            debtors
        );
    }

    result
}

fn reverse_ordering(o: Ordering) -> Ordering {
    use Ordering::*;
    match o {
        Greater => Less,
        Equal => Equal,
        Less => Greater,
    }
}

/// Some debts cannot be split exactly (there are no fractions of a cent),
/// so we tolerate one cent of error when comparing equality.
fn are_amount_equal(d: f64, c: f64) -> bool {
    (d + c).abs() < 0.01
}
