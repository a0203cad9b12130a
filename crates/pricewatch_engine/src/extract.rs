use scraper::{Html, Selector};
use serde_json::{Map, Value};

use crate::{ExtractionOutcome, PriceOffer};

pub const SOFTWARE_APPLICATION_TYPE: &str = "SoftwareApplication";

const JSON_LD_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str) -> ExtractionOutcome;
}

/// Reads the price from the page's `SoftwareApplication` JSON-LD record:
/// - scans `<script type="application/ld+json">` blocks in document order
/// - skips blocks that are not valid JSON objects
/// - the first object with `"@type": "SoftwareApplication"` wins
/// - `offers.price` that is not a non-negative number counts as `0.0`
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLdOfferExtractor;

impl Extractor for JsonLdOfferExtractor {
    fn extract(&self, html: &str) -> ExtractionOutcome {
        let Some(app) = find_software_application(html) else {
            return ExtractionOutcome::NoStructuredData;
        };

        let empty = Map::new();
        let offers = match app.get("offers") {
            None | Some(Value::Null) => &empty,
            Some(Value::Object(offers)) => offers,
            Some(_) => return ExtractionOutcome::InvalidField,
        };

        let price = match offers.get("price") {
            None | Some(Value::Null) => return ExtractionOutcome::NoPriceField,
            Some(price) => price,
        };

        let currency = offers
            .get("priceCurrency")
            .and_then(Value::as_str)
            .unwrap_or_default();

        ExtractionOutcome::Priced(PriceOffer::new(parse_amount(price), currency))
    }
}

fn find_software_application(html: &str) -> Option<Map<String, Value>> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse(JSON_LD_SELECTOR).ok()?;

    doc.select(&selector)
        .filter_map(|script| {
            let text = script.text().collect::<String>();
            match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => Some(map),
                _ => None,
            }
        })
        .find(|map| map.get("@type").and_then(Value::as_str) == Some(SOFTWARE_APPLICATION_TYPE))
}

/// Numbers and numeric strings are taken as is; anything else, including
/// negative or non-finite values and locale formats like `"4,99"`, is `0.0`.
fn parse_amount(price: &Value) -> f64 {
    let amount = match price {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    amount
        .filter(|value| value.is_finite() && *value >= 0.0)
        .map(|value| value + 0.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::parse_amount;
    use serde_json::json;

    #[test]
    fn numeric_forms_parse() {
        assert_eq!(parse_amount(&json!(4.99)), 4.99);
        assert_eq!(parse_amount(&json!(3)), 3.0);
        assert_eq!(parse_amount(&json!(" 1.5 ")), 1.5);
        assert_eq!(parse_amount(&json!("0")), 0.0);
    }

    #[test]
    fn malformed_forms_are_zero() {
        assert_eq!(parse_amount(&json!("4,99")), 0.0);
        assert_eq!(parse_amount(&json!("Free")), 0.0);
        assert_eq!(parse_amount(&json!("-1")), 0.0);
        assert_eq!(parse_amount(&json!("NaN")), 0.0);
        assert_eq!(parse_amount(&json!("inf")), 0.0);
        assert_eq!(parse_amount(&json!(true)), 0.0);
        assert_eq!(parse_amount(&json!([1])), 0.0);
        assert_eq!(parse_amount(&json!({"value": 1})), 0.0);
    }

    #[test]
    fn negative_zero_is_normalized() {
        assert!(parse_amount(&json!("-0")).is_sign_positive());
    }
}
