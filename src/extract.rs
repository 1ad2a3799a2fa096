//! Price and delivery fact extraction from retrieved text.
//!
//! Two independent patterns are scanned:
//!
//! - `price for N units of <product> is $P` → `prices[N] = P`
//! - `deliver within D days` → `delivery_days[units] = D`
//!
//! The delivery pattern carries no unit count of its own. Matches are read
//! in the order they appear in the text, and a delivery phrase is filed
//! under the unit count of the most recent price seen in the same scan pass,
//! which may come from an earlier chunk. A delivery phrase that arrives
//! before any price has nothing to attach to and is dropped.

use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

/// Facts pulled from one chat turn's retrieved chunks.
///
/// Keys iterate in ascending unit order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactTable {
    pub prices: BTreeMap<u64, u64>,
    pub delivery_days: BTreeMap<u64, u64>,
}

impl FactTable {
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty() && self.delivery_days.is_empty()
    }
}

pub struct FactExtractor {
    price: Regex,
    delivery: Regex,
    request: Regex,
}

impl FactExtractor {
    pub fn new(product: &str) -> Result<Self, regex::Error> {
        let product = regex::escape(product);
        Ok(Self {
            price: Regex::new(&format!(r"price for (\d+) units of {} is \$(\d+)", product))?,
            delivery: Regex::new(r"deliver within (\d+) days")?,
            request: Regex::new(&format!(r"(\d+) units of {}", product))?,
        })
    }

    /// Scan `texts` in order and build a [`FactTable`].
    pub fn extract<'a, I>(&self, texts: I) -> FactTable
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut facts = FactTable::default();
        let mut last_units: Option<u64> = None;

        for text in texts {
            let prices = self.price.captures_iter(text).map(|caps| {
                let at = caps.get(0).map_or(0, |m| m.start());
                (at, Found::Price(parse_number(&caps[1]), parse_number(&caps[2])))
            });
            let deliveries = self.delivery.captures_iter(text).map(|caps| {
                let at = caps.get(0).map_or(0, |m| m.start());
                (at, Found::Delivery(parse_number(&caps[1])))
            });
            let mut found: Vec<(usize, Found)> = prices.chain(deliveries).collect();
            found.sort_by_key(|(at, _)| *at);

            for (_, item) in found {
                match item {
                    Found::Price(Some(units), Some(price)) => {
                        facts.prices.insert(units, price);
                        last_units = Some(units);
                    }
                    Found::Price(..) => debug!("price figure out of range, skipped"),
                    Found::Delivery(Some(days)) => match last_units {
                        Some(units) => {
                            facts.delivery_days.insert(units, days);
                        }
                        None => debug!(days, "delivery time seen before any price, dropped"),
                    },
                    Found::Delivery(None) => {}
                }
            }
        }

        facts
    }

    /// Unit count requested in a user message, if any.
    pub fn parse_request(&self, message: &str) -> Option<u64> {
        self.request
            .captures(message)
            .and_then(|caps| parse_number(&caps[1]))
    }
}

enum Found {
    Price(Option<u64>, Option<u64>),
    Delivery(Option<u64>),
}

fn parse_number(digits: &str) -> Option<u64> {
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> FactExtractor {
        FactExtractor::new("Product Y").unwrap()
    }

    #[test]
    fn test_price_and_delivery_in_one_chunk() {
        let facts = extractor().extract([
            "Hi, the price for 100 units of Product Y is $50 and we can deliver within 3 days.",
        ]);
        assert_eq!(facts.prices.get(&100), Some(&50));
        assert_eq!(facts.delivery_days.get(&100), Some(&3));
    }

    #[test]
    fn test_no_matches_is_empty_table() {
        let facts = extractor().extract(["Nothing to see here.", "Still nothing."]);
        assert!(facts.is_empty());
    }

    #[test]
    fn test_later_chunks_overwrite_earlier() {
        let facts = extractor().extract([
            "The price for 100 units of Product Y is $50.",
            "Update: the price for 100 units of Product Y is $45.",
        ]);
        assert_eq!(facts.prices.len(), 1);
        assert_eq!(facts.prices[&100], 45);
    }

    #[test]
    fn test_every_price_in_a_chunk_is_recorded() {
        let facts = extractor().extract([
            "The price for 100 units of Product Y is $50. The price for 200 units of Product Y is $90.",
        ]);
        assert_eq!(facts.prices.keys().copied().collect::<Vec<_>>(), vec![100, 200]);
    }

    #[test]
    fn test_delivery_attaches_to_last_price_of_previous_chunk() {
        let facts = extractor().extract([
            "The price for 100 units of Product Y is $50.",
            "We can deliver within 4 days.",
        ]);
        assert_eq!(facts.delivery_days.get(&100), Some(&4));
    }

    #[test]
    fn test_delivery_without_any_price_is_dropped() {
        let facts = extractor().extract([
            "We can deliver within 2 days.",
            "The price for 300 units of Product Y is $120.",
        ]);
        assert_eq!(facts.prices.get(&300), Some(&120));
        assert!(facts.delivery_days.is_empty());
    }

    /// Delivery is matched by position, not by an explicit unit reference.
    /// A quote for one quantity followed by an unrelated delivery promise
    /// ends up filed under the wrong quantity.
    #[test]
    fn test_positional_association_misattributes_delivery() {
        let facts = extractor().extract([
            "Quote A: the price for 500 units of Product Y is $200.",
            "Quote B (for 50 units): we can deliver within 1 days.",
        ]);
        assert_eq!(facts.delivery_days.get(&500), Some(&1));
        assert_eq!(facts.delivery_days.get(&50), None);
    }

    #[test]
    fn test_delivery_before_first_price_in_chunk_is_dropped() {
        let facts = extractor().extract([
            "We can deliver within 6 days. The price for 80 units of Product Y is $40.",
        ]);
        assert_eq!(facts.prices.get(&80), Some(&40));
        assert!(facts.delivery_days.is_empty());
    }

    #[test]
    fn test_delivery_before_price_in_chunk_uses_previous_chunk_price() {
        let facts = extractor().extract([
            "The price for 20 units of Product Y is $15.",
            "We can deliver within 6 days. The price for 80 units of Product Y is $40.",
        ]);
        assert_eq!(facts.delivery_days.get(&20), Some(&6));
        assert_eq!(facts.delivery_days.get(&80), None);
    }

    #[test]
    fn test_several_quotes_in_one_chunk_keep_their_delivery() {
        let facts = extractor().extract([
            "The price for 10 units of Product Y is $8 and we can deliver within 1 days.\n\n\
             The price for 1000 units of Product Y is $400 and we can deliver within 9 days.",
        ]);
        assert_eq!(facts.prices.get(&10), Some(&8));
        assert_eq!(facts.prices.get(&1000), Some(&400));
        assert_eq!(facts.delivery_days.get(&10), Some(&1));
        assert_eq!(facts.delivery_days.get(&1000), Some(&9));
    }

    #[test]
    fn test_other_products_ignored() {
        let facts = extractor().extract(["The price for 100 units of Product Z is $10."]);
        assert!(facts.prices.is_empty());
    }

    #[test]
    fn test_product_name_is_escaped() {
        let ex = FactExtractor::new("Widget (XL)").unwrap();
        let facts = ex.extract(["The price for 10 units of Widget (XL) is $99."]);
        assert_eq!(facts.prices.get(&10), Some(&99));
    }

    #[test]
    fn test_oversized_numbers_skipped() {
        let facts = extractor().extract([
            "The price for 99999999999999999999999 units of Product Y is $5.",
        ]);
        assert!(facts.prices.is_empty());
    }

    #[test]
    fn test_parse_request() {
        let ex = extractor();
        assert_eq!(ex.parse_request("How much for 150 units of Product Y?"), Some(150));
        assert_eq!(ex.parse_request("What about 20 units of Product Y or 30 units of Product Y"), Some(20));
        assert_eq!(ex.parse_request("How much is Product Y?"), None);
        assert_eq!(ex.parse_request("150 units please"), None);
    }
}
