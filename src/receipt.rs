//! Parse scanned receipt text into item candidates.
//!
//! The receipt scanning service returns plain text with one item per line.
//! Amounts come in messy shapes (comma or dot decimals, an optional sign),
//! so we use nom for them.

use std::num::ParseFloatError;

use nom::{
    character::complete::multispace0, combinator::map_res, sequence::preceded, AsChar, IResult,
    InputTakeAtPosition,
};

use crate::error::SplitError;
use crate::types::{Amount, Item};

/// Parse a whole receipt into a list of items.
///
/// Every non-blank line must have the shape `<name> <amount>`, where the
/// name may contain spaces and the amount is the last token of the line.
/// Nobody is assigned to the parsed items yet: assignment happens in the
/// editing UI, which maps the candidates into a by-item split.
///
/// Fails on the first line that does not parse, reporting its 1-based line
/// number, and fails when no line holds an item at all.
pub fn parse_receipt(text: &str) -> Result<Vec<Item>, SplitError> {
    let mut items = vec![];

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let item =
            parse_item(line).ok_or_else(|| SplitError::invalid_receipt_line(index + 1, line))?;
        items.push(item);
    }

    if items.is_empty() {
        return Err(SplitError::empty_receipt());
    }
    Ok(items)
}

/// A line holds a name and a final amount token. The split happens at the
/// last whitespace, since names like `pizza 4 stagioni` contain digits and
/// spaces of their own.
fn parse_item(line: &str) -> Option<Item> {
    let (name, amount_token) = line.rsplit_once(char::is_whitespace)?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    match parse_amount(amount_token) {
        Ok(("", amount)) => Some(Item::unassigned(name, amount)),
        _ => None,
    }
}

fn float1(s: &str) -> IResult<&str, &str> {
    s.split_at_position1_complete(
        |item| !item.is_dec_digit() && item != ',' && item != '.' && item != '-' && item != '+',
        nom::error::ErrorKind::Float,
    )
}

fn parse_amount(s: &str) -> IResult<&str, Amount> {
    fn do_parse(x: &str) -> Result<Amount, ParseFloatError> {
        x.replace(',', ".").parse::<f64>()
    }

    preceded(multispace0, map_res(float1, do_parse))(s)
}
