use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("invalid expense: {0}")]
    InvalidExpense(String),

    #[error("invalid settlement: {0}")]
    InvalidSettlement(String),

    #[error("invalid participant: {0}")]
    InvalidParticipant(String),

    #[error(
        "invalid currency code `{0}`: currency codes must be three ASCII \
             uppercase letters, like `EUR` or `USD`"
    )]
    InvalidCurrency(String),

    #[error("no exchange rate available to convert {from} into {to}")]
    RateUnavailable { from: String, to: String },

    #[error("cannot read line {line} of the receipt: `{content}`")]
    InvalidReceiptLine { line: usize, content: String },

    #[error("the receipt text contains no items")]
    EmptyReceipt,
}

impl SplitError {
    pub fn invalid_expense(reason: &str) -> Self {
        SplitError::InvalidExpense(reason.to_string())
    }

    pub fn invalid_settlement(reason: &str) -> Self {
        SplitError::InvalidSettlement(reason.to_string())
    }

    pub fn invalid_participant(reason: &str) -> Self {
        SplitError::InvalidParticipant(reason.to_string())
    }

    pub fn invalid_currency(code: &str) -> Self {
        SplitError::InvalidCurrency(code.to_string())
    }

    pub fn rate_unavailable(from: &str, to: &str) -> Self {
        SplitError::RateUnavailable {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn invalid_receipt_line(line: usize, content: &str) -> Self {
        SplitError::InvalidReceiptLine {
            line,
            content: content.to_string(),
        }
    }

    pub fn empty_receipt() -> Self {
        SplitError::EmptyReceipt
    }
}
