//! `OpenFoodFacts` v2 product response types.
//!
//! Only the fields the lookup reads are modelled; everything else in the
//! (very large) product object is ignored.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Envelope returned by `GET product/{barcode}.json`.
#[derive(Debug, Deserialize)]
pub struct ProductResponse {
    /// `1` when the product exists. Newer API versions send `"success"`.
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub status_verbose: Option<String>,
    #[serde(default)]
    pub product: Option<Product>,
}

impl ProductResponse {
    /// Whether the status flag reports the product as found.
    #[must_use]
    pub fn is_success(&self) -> bool {
        match &self.status {
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            Some(Value::String(s)) => s == "1" || s.eq_ignore_ascii_case("success"),
            _ => false,
        }
    }

    /// Display name of the product, when the database has one.
    #[must_use]
    pub fn product_name(&self) -> Option<&str> {
        self.product.as_ref()?.product_name.as_deref()
    }

    /// The product's nutrient object. Anything other than a non-empty JSON
    /// object (`null`, `[]`, `""`, `{}`) counts as missing.
    #[must_use]
    pub fn into_nutriments(self) -> Option<Map<String, Value>> {
        match self.product?.nutriments? {
            Value::Object(map) if !map.is_empty() => Some(map),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub product_name: Option<String>,
    /// Usually an object, but older records carry `[]` or `""` here.
    #[serde(default)]
    pub nutriments: Option<Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: Value) -> ProductResponse {
        serde_json::from_value(value).expect("should deserialize")
    }

    #[test]
    fn numeric_and_word_status_flags_count_as_success() {
        assert!(parse(json!({ "status": 1 })).is_success());
        assert!(parse(json!({ "status": "success" })).is_success());
        assert!(!parse(json!({ "status": 0 })).is_success());
        assert!(!parse(json!({ "status": "failure" })).is_success());
        assert!(!parse(json!({})).is_success());
    }

    #[test]
    fn empty_nutriments_are_treated_as_missing() {
        let resp = parse(json!({ "status": 1, "product": { "nutriments": {} } }));
        assert!(resp.into_nutriments().is_none());

        let resp = parse(json!({ "status": 1, "product": { "product_name": "Water" } }));
        assert!(resp.into_nutriments().is_none());
    }

    #[test]
    fn non_object_nutriments_are_treated_as_missing() {
        for nutriments in [json!([]), json!(""), json!(null), json!(0)] {
            let resp = parse(json!({ "status": 1, "product": { "nutriments": nutriments } }));
            assert!(resp.into_nutriments().is_none());
        }
    }

    #[test]
    fn nutriments_are_returned_verbatim() {
        let resp = parse(json!({
            "status": 1,
            "code": "5000112637922",
            "product": {
                "product_name": "Cola",
                "nutriments": { "sugars_100g": 10.6, "energy-kcal_100g": 42 }
            }
        }));
        assert_eq!(resp.product_name(), Some("Cola"));
        let nutriments = resp.into_nutriments().unwrap();
        assert_eq!(nutriments.len(), 2);
        assert_eq!(nutriments["sugars_100g"], json!(10.6));
    }
}
