//! Answer synthesis from extracted facts.
//!
//! An exact quote is returned when the requested quantity was quoted
//! verbatim. Otherwise the nearest quoted quantity is scaled linearly to
//! the request and its delivery time padded by a fixed number of days.

use std::fmt;

use crate::config::AnswerConfig;
use crate::error::ChatError;
use crate::extract::FactTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// The requested quantity appears in the facts.
    Exact {
        units: u64,
        price: u64,
        delivery_days: Option<u64>,
    },
    /// Scaled from the nearest quoted quantity.
    Estimate {
        units: u64,
        price: u64,
        delivery_days: Option<u64>,
        based_on_units: u64,
    },
}

impl Answer {
    pub fn render(&self, product: &str) -> String {
        Rendered {
            answer: self,
            product,
        }
        .to_string()
    }
}

struct Rendered<'a> {
    answer: &'a Answer,
    product: &'a str,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (opening, approx, units, price, delivery) = match *self.answer {
            Answer::Exact {
                units,
                price,
                delivery_days,
            } => ("Thank you for your query.", "", units, price, delivery_days),
            Answer::Estimate {
                units,
                price,
                delivery_days,
                ..
            } => (
                "Thank you for your inquiry.",
                "approximately ",
                units,
                price,
                delivery_days,
            ),
        };

        write!(
            f,
            "{} The price for {} units of {} is {}${}",
            opening, units, self.product, approx, price
        )?;
        match delivery {
            Some(days) => write!(f, " and we can deliver within {} days.", days),
            None => write!(f, "."),
        }
    }
}

/// Produce an answer for `requested` units from `facts`.
///
/// # Errors
///
/// [`ChatError::NoFactsAvailable`] when there is neither an exact quote nor
/// any non-zero quoted quantity to scale from.
pub fn synthesize(
    requested: u64,
    facts: &FactTable,
    config: &AnswerConfig,
) -> Result<Answer, ChatError> {
    if let Some(&price) = facts.prices.get(&requested) {
        return Ok(Answer::Exact {
            units: requested,
            price,
            delivery_days: facts.delivery_days.get(&requested).copied(),
        });
    }

    // Ascending key order plus min_by_key's first-wins rule breaks distance
    // ties toward the smaller quantity. Zero can't be scaled from.
    let (&closest_units, &closest_price) = facts
        .prices
        .iter()
        .filter(|&(&units, _)| units > 0)
        .min_by_key(|&(&units, _)| units.abs_diff(requested))
        .ok_or(ChatError::NoFactsAvailable)?;

    let scaled = u128::from(closest_price) * u128::from(requested) / u128::from(closest_units);
    let price = u64::try_from(scaled).unwrap_or(u64::MAX);

    let delivery_days = facts
        .delivery_days
        .get(&closest_units)
        .map(|days| days.saturating_add(config.delivery_padding_days));

    Ok(Answer::Estimate {
        units: requested,
        price,
        delivery_days,
        based_on_units: closest_units,
    })
}
