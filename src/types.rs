//! Data model shared with the backend-sync layer.
//!
//! Everything here is a plain record: the engine reads these values and never
//! mutates them. Serde derives match the record payloads exchanged with the
//! sync client, which owns persistence.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Monetary amount in major units (e.g. `12.5` for 12.50 USD).
///
/// Display rounding happens at the presentation boundary, never in the
/// engine.
pub type Amount = f64;

/// A person who can owe or be owed money.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    /// Marks the app's own user among the fetched people.
    #[serde(default)]
    pub is_current_user: bool,
}

/// How an expense total is allocated among its participants.
///
/// `Unequal` amounts and `ByItem` item totals are caller-supplied and are not
/// required to sum to the expense total; reconciliation before save is the
/// validator's job, not the calculator's.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Split {
    /// Total divided evenly across the participant set.
    Equal,
    /// Explicit amount per participant id; a missing entry means zero.
    Unequal { amounts: HashMap<String, Amount> },
    /// Integer weight per participant id; shares are proportional to
    /// `weight / total_parts`.
    ByParts { parts: HashMap<String, u32> },
    /// Receipt items, each divided evenly among its assignees.
    ByItem { items: Vec<Item> },
}

/// One line of a `ByItem` split.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub amount: Amount,
    /// May be empty: the item then counts toward the unassigned total and is
    /// owed by nobody.
    pub assigned_to: HashSet<String>,
}

/// One shared cost event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub total: Amount,
    /// ISO-4217-like code, e.g. `"USD"`.
    pub currency: String,
    pub split: Split,
    /// Participant id of whoever paid. May be outside `participants`
    /// (paying for others without owing a share is allowed).
    pub payer: String,
    pub participants: HashSet<String>,
    pub created_at: DateTime<Utc>,
}

/// A recorded payment between two participants, reducing an outstanding
/// balance. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub payer: String,
    pub payee: String,
    pub amount: Amount,
    pub currency: String,
    pub date: DateTime<Utc>,
}

/// A suggested settling payment: `debtor` gives `amount` to `creditor`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MoneyExchange {
    pub debtor: String,
    pub creditor: String,
    pub amount: Amount,
}

/// What one participant still owes another for a single expense, after
/// recorded settlements are subtracted.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct NetBalance {
    /// Positive when the first participant owes the second, negative for
    /// the reverse, zero when the pair is even. Never crosses zero because
    /// of payments: over-settlement clamps instead of flipping the
    /// direction.
    pub amount: Amount,
    /// How much the settlements exceeded the debt they were paying off.
    /// Advisory: the caller decides whether to surface it.
    pub overpaid: Amount,
}

/// Exchange-rate snapshot: every rate is a multiplicative factor relative to
/// `base`. Refreshed by an external fetch; the engine only reads the latest
/// snapshot it is handed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRates {
    pub base: String,
    pub rates: HashMap<String, Amount>,
    pub fetched_at: DateTime<Utc>,
}

impl Participant {
    pub fn new(id: &str, name: &str) -> Participant {
        Participant {
            id: id.to_string(),
            name: name.to_string(),
            is_current_user: false,
        }
    }
}

impl Expense {
    pub fn new(
        total: Amount,
        currency: &str,
        split: Split,
        payer: &str,
        participants: HashSet<String>,
        created_at: DateTime<Utc>,
    ) -> Expense {
        Expense {
            total,
            currency: currency.to_string(),
            split,
            payer: payer.to_string(),
            participants,
            created_at,
        }
    }

    pub fn is_participant(&self, id: &str) -> bool {
        self.participants.contains(id)
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }
}

impl Item {
    pub fn new(name: &str, amount: Amount, assigned_to: HashSet<String>) -> Item {
        Item {
            name: name.to_string(),
            amount,
            assigned_to,
        }
    }

    /// An item nobody has been assigned to yet, e.g. a fresh receipt
    /// candidate.
    pub fn unassigned(name: &str, amount: Amount) -> Item {
        Item::new(name, amount, HashSet::new())
    }
}

impl Settlement {
    pub fn new(
        payer: &str,
        payee: &str,
        amount: Amount,
        currency: &str,
        date: DateTime<Utc>,
    ) -> Settlement {
        Settlement {
            payer: payer.to_string(),
            payee: payee.to_string(),
            amount,
            currency: currency.to_string(),
            date,
        }
    }
}

impl MoneyExchange {
    pub fn new(debtor: &str, creditor: &str, amount: Amount) -> MoneyExchange {
        MoneyExchange {
            debtor: debtor.to_string(),
            creditor: creditor.to_string(),
            amount,
        }
    }
}

impl fmt::Display for MoneyExchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} owes {} {:.2}",
            self.debtor, self.creditor, self.amount
        )
    }
}

impl NetBalance {
    /// A pair with nothing outstanding and nothing overpaid.
    pub fn settled() -> NetBalance {
        NetBalance {
            amount: 0.0,
            overpaid: 0.0,
        }
    }

    pub fn is_over_settled(&self) -> bool {
        self.overpaid > 0.0
    }
}

impl ExchangeRates {
    pub fn new(base: &str, rates: HashMap<String, Amount>, fetched_at: DateTime<Utc>) -> Self {
        ExchangeRates {
            base: base.to_string(),
            rates,
            fetched_at,
        }
    }

    /// The rate for *code*, if the snapshot has a usable one. Zero or
    /// negative entries cannot be divided by and count as missing.
    pub fn rate(&self, code: &str) -> Option<Amount> {
        self.rates.get(code).copied().filter(|r| *r > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_serializes_with_mode_tag() -> anyhow::Result<()> {
        let split = Split::ByParts {
            parts: HashMap::from([("anna".to_string(), 2)]),
        };
        let json = serde_json::to_value(&split)?;
        assert_eq!(json["mode"], "by_parts");
        assert_eq!(json["parts"]["anna"], 2);

        let equal = serde_json::to_value(Split::Equal)?;
        assert_eq!(equal["mode"], "equal");
        Ok(())
    }

    #[test]
    fn settlement_round_trips_through_json() -> anyhow::Result<()> {
        let settlement = Settlement::new("anna", "bruno", 12.5, "EUR", Utc::now());
        let json = serde_json::to_string(&settlement)?;
        let back: Settlement = serde_json::from_str(&json)?;
        assert_eq!(back, settlement);
        Ok(())
    }

    #[test]
    fn participant_flag_defaults_to_false() -> anyhow::Result<()> {
        let p: Participant = serde_json::from_str(r#"{"id": "u1", "name": "Anna"}"#)?;
        assert!(!p.is_current_user);
        assert_eq!(p, Participant::new("u1", "Anna"));
        Ok(())
    }

    #[test]
    fn display_for_money_exchange_rounds_to_cents() {
        let exchange = MoneyExchange::new("anna", "bruno", 25.0 / 3.0);
        assert_eq!(exchange.to_string(), "anna owes bruno 8.33");
    }
}
