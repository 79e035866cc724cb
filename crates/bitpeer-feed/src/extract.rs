//! Offer-list discovery in exchange payloads of unknown shape.

use serde_json::{Map, Value};

pub(crate) const PRICE_KEYS: &[&str] = &["price", "unitPrice", "priceValue", "rate", "unit_price"];
pub(crate) const MIN_KEYS: &[&str] = &["minAmount", "minFiat", "minOrderAmount", "min", "min_amount"];
pub(crate) const MAX_KEYS: &[&str] = &["maxAmount", "maxFiat", "maxOrderAmount", "max", "max_amount"];
pub(crate) const PAYMENT_KEYS: &[&str] = &[
    "payment",
    "payments",
    "paymentMethods",
    "payment_methods",
    "payMethods",
];
pub(crate) const PAYMENT_NAME_KEYS: &[&str] =
    &["name", "paymentMethodName", "identifier", "id", "key"];
pub(crate) const MERCHANT_KEYS: &[&str] = &["isMerchant", "merchant", "is_merchant"];
pub(crate) const RATING_KEYS: &[&str] = &["rating", "userRating", "user_rating", "score"];
pub(crate) const ADVERTISER_KEYS: &[&str] = &[
    "userId",
    "uid",
    "advertiserId",
    "advertiser_id",
    "nickName",
    "nickname",
];
pub(crate) const OFFER_ID_KEYS: &[&str] = &["id", "itemId", "advId", "offer_id"];
pub(crate) const COMPLETION_KEYS: &[&str] = &[
    "recentExecuteRate",
    "completionRate",
    "completion_rate",
    "finishRate",
];

const RESULT_LIST_KEYS: &[&str] = &["items", "data", "list", "rows"];
const SEARCH_DEPTH: usize = 6;

/// Locate the list of listing objects inside a marketplace response.
///
/// Tries the documented `result.{items,data,list,rows}` locations first and
/// falls back to a bounded-depth search for the first array whose leading
/// elements look like offers. Returns an empty vec when nothing is found.
pub fn extract_listings(payload: &Value) -> Vec<&Map<String, Value>> {
    if let Some(result) = payload.get("result").and_then(Value::as_object) {
        for key in RESULT_LIST_KEYS {
            if let Some(Value::Array(items)) = result.get(*key) {
                if !items.is_empty() && leading_are_objects(items) {
                    return objects(items);
                }
            }
        }
    }

    find_listings(payload, SEARCH_DEPTH).unwrap_or_default()
}

fn find_listings(value: &Value, depth: usize) -> Option<Vec<&Map<String, Value>>> {
    if depth == 0 {
        return None;
    }

    match value {
        Value::Array(items) if !items.is_empty() => {
            if leading_are_objects(items) {
                let dicts = objects(items);
                let offer_like = dicts.iter().take(5).filter(|d| looks_like_offer(d)).count();
                if offer_like >= 2 {
                    return Some(dicts);
                }
            }
            items.iter().find_map(|item| find_listings(item, depth - 1))
        }
        Value::Object(map) => map.values().find_map(|v| find_listings(v, depth - 1)),
        _ => None,
    }
}

fn leading_are_objects(items: &[Value]) -> bool {
    items.iter().take(3).all(Value::is_object)
}

fn objects(items: &[Value]) -> Vec<&Map<String, Value>> {
    items.iter().filter_map(Value::as_object).collect()
}

fn looks_like_offer(item: &Map<String, Value>) -> bool {
    PRICE_KEYS.iter().any(|k| item.contains_key(*k))
        || item.contains_key("adv")
        || item.contains_key("advertiser")
}

/// First non-null value under any of `keys`.
pub(crate) fn first_present<'a>(item: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| item.get(*k))
        .find(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_items() {
        let payload = json!({
            "ret_code": 0,
            "result": {"count": 2, "items": [{"price": "95"}, {"price": "96"}]}
        });

        let listings = extract_listings(&payload);
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0]["price"], "95");
    }

    #[test]
    fn test_single_item_under_result_is_found() {
        let payload = json!({"result": {"list": [{"price": "95"}]}});
        assert_eq!(extract_listings(&payload).len(), 1);
    }

    #[test]
    fn test_nested_search() {
        let payload = json!({
            "meta": {"page": 1},
            "body": {"inner": {"offers": [
                {"adv": {"price": "95"}},
                {"adv": {"price": "96"}},
                {"adv": {"price": "97"}}
            ]}}
        });

        assert_eq!(extract_listings(&payload).len(), 3);
    }

    #[test]
    fn test_unrelated_lists_are_ignored() {
        let payload = json!({
            "tags": [{"label": "a"}, {"label": "b"}],
            "result": {"items": []}
        });

        assert!(extract_listings(&payload).is_empty());
    }

    #[test]
    fn test_depth_bound() {
        let payload = json!({"a": {"b": {"c": {"d": {"e": {"f": {"g": [
            {"price": "1"}, {"price": "2"}
        ]}}}}}}});

        assert!(extract_listings(&payload).is_empty());
    }

    #[test]
    fn test_first_present_skips_null() {
        let item = json!({"price": null, "unitPrice": "95"});
        let map = item.as_object().unwrap();
        assert_eq!(first_present(map, PRICE_KEYS), Some(&json!("95")));
    }
}
