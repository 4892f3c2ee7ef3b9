// Data structures shared across the search pipeline
// Request in, upstream query out, upstream records, display records, tool result

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 50;

// Search filters received from the tool caller
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    // Free text, e.g. "BMW diesel under 30000" (logged, not forwarded)
    pub query: Option<String>,
    pub make: Option<String>,
    pub fuel: Option<String>, // DIESEL, PETROL, ELECTRIC, HYBRID
    pub condition: Option<String>, // NEW, USED, KM0
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    // Any JSON number; fractional or out-of-range values are clamped, not rejected
    #[serde(default, deserialize_with = "any_number")]
    pub limit: Option<f64>,
}

impl SearchRequest {
    /// Requested sample size, defaulting to 10 and clamped to `1..=50`.
    pub fn effective_limit(&self) -> u32 {
        match self.limit {
            Some(limit) if limit.is_finite() => limit.trunc().clamp(1.0, MAX_LIMIT as f64) as u32,
            _ => DEFAULT_LIMIT,
        }
    }

    // Empty strings count as "no filter"
    pub fn make_filter(&self) -> Option<&str> {
        non_empty(&self.make)
    }

    pub fn fuel_filter(&self) -> Option<&str> {
        non_empty(&self.fuel)
    }

    pub fn condition_filter(&self) -> Option<&str> {
        non_empty(&self.condition)
    }

    /// Lower price bound. A bound of exactly 0 is treated as absent.
    pub fn min_price_bound(&self) -> Option<f64> {
        positive(self.min_price)
    }

    /// Upper price bound. A bound of exactly 0 is treated as absent.
    pub fn max_price_bound(&self) -> Option<f64> {
        positive(self.max_price)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

// Query string sent to the inventory API.
// maxPrice is deliberately absent: the upstream does not honor it.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    // Kept as text so 5000.0 goes out as "5000"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<String>,
    pub limit: u32,
}

// Identifier fields come back either as strings or as numbers.
// 1 and "1" are distinct identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VehicleId {
    Number(i64),
    // Non-integral or out-of-range numbers, kept in their JSON spelling
    Decimal(String),
    Text(String),
}

impl VehicleId {
    // Mirrors the upstream's truthiness: "" and 0 are not identifiers
    fn is_present(&self) -> bool {
        match self {
            VehicleId::Number(n) => *n != 0,
            VehicleId::Decimal(s) | VehicleId::Text(s) => !s.is_empty(),
        }
    }

    fn render(&self) -> String {
        match self {
            VehicleId::Number(n) => n.to_string(),
            VehicleId::Decimal(s) | VehicleId::Text(s) => s.clone(),
        }
    }
}

// A single vehicle record as returned in promoResults / searchResults
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawVehicle {
    #[serde(default, deserialize_with = "lenient_id")]
    pub vehicle_id: Option<VehicleId>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<VehicleId>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub make: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub year: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: Option<f64>, // None means "price on request"
    #[serde(default, deserialize_with = "lenient_text")]
    pub fuel: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub condition: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub mileage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub transmission: Option<String>,
}

impl RawVehicle {
    /// Key used for deduplication: `vehicleId`, falling back to `id`.
    pub fn dedup_key(&self) -> Option<&VehicleId> {
        pick_id(&self.vehicle_id, &self.id)
    }

    /// Identifier shown to the caller: `id`, falling back to `vehicleId`.
    pub fn display_id(&self) -> Option<String> {
        pick_id(&self.id, &self.vehicle_id).map(VehicleId::render)
    }
}

fn pick_id<'a>(first: &'a Option<VehicleId>, second: &'a Option<VehicleId>) -> Option<&'a VehicleId> {
    first.iter().chain(second.iter()).find(|id| id.is_present())
}

// --- Lenient field decoding ---
// A wrong-typed field becomes None instead of rejecting the whole record.

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<VehicleId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(VehicleId::Text(s)),
        Value::Number(n) => n
            .as_i64()
            .map(VehicleId::Number)
            .or_else(|| Some(VehicleId::Decimal(n.to_string()))),
        _ => None,
    })
}

fn any_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        other => Err(serde::de::Error::custom(format!("expected a number, got {}", other))),
    }
}

/// Reads a count that may arrive as an integer, a whole float (`742.0`) or a
/// numeric string. Negative or fractional values are rejected.
pub fn whole_count(value: &Value) -> Option<u64> {
    let number = match value {
        Value::Number(n) => match n.as_u64() {
            Some(count) => return Some(count),
            None => n.as_f64()?,
        },
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<u64>() {
                Ok(count) => return Some(count),
                Err(_) => s.parse::<f64>().ok()?,
            }
        }
        _ => return None,
    };
    (number.is_finite() && number >= 0.0 && number.fract() == 0.0 && number < u64::MAX as f64)
        .then_some(number as u64)
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    // Zero is "not provided" for year, price and mileage alike
    .filter(|n| *n != 0.0 && n.is_finite()))
}

// Presentation-ready vehicle. Fields without a value are skipped on output.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayVehicle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<f64>,
    pub price: String,
    pub price_number: f64, // 0 when the price is on request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    pub summary: String,
}

// The parts of the upstream search response the pipeline reads.
// Missing or malformed sections degrade to empty.
#[derive(Debug, Clone, Default)]
pub struct UpstreamEnvelope {
    pub promo_results: Vec<RawVehicle>,
    pub search_results: Vec<RawVehicle>,
    pub facet_results: Value,
    pub num_result_found: Option<u64>,
}

impl UpstreamEnvelope {
    pub fn from_value(payload: &Value) -> Self {
        let response = payload.get("response");
        let section = |name: &str| response.and_then(|r| r.get(name));

        let num_result_found = section("numResultFound").and_then(whole_count);

        UpstreamEnvelope {
            promo_results: vehicle_list(section("promoResults")),
            search_results: vehicle_list(section("searchResults")),
            facet_results: section("facetResults").cloned().unwrap_or(Value::Null),
            num_result_found,
        }
    }
}

fn vehicle_list(value: Option<&Value>) -> Vec<RawVehicle> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<RawVehicle>(item.clone()) {
            Ok(vehicle) => Some(vehicle),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping vehicle record that is not an object");
                None
            }
        })
        .collect()
}

// What the tool hands back to its caller
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub text: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn ok(text: impl Into<String>) -> Self {
        ToolResult { text: text.into(), is_error: false }
    }

    pub fn error(text: impl Into<String>) -> Self {
        ToolResult { text: text.into(), is_error: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(SearchRequest::default().effective_limit(), 10);
        let req = SearchRequest { limit: Some(0.0), ..Default::default() };
        assert_eq!(req.effective_limit(), 1);
        let req = SearchRequest { limit: Some(200.0), ..Default::default() };
        assert_eq!(req.effective_limit(), 50);
    }

    #[test]
    fn any_json_number_is_accepted_as_limit() {
        let limit_of = |raw: serde_json::Value| {
            serde_json::from_value::<SearchRequest>(json!({ "limit": raw }))
                .unwrap()
                .effective_limit()
        };
        assert_eq!(limit_of(json!(5.0)), 5);
        assert_eq!(limit_of(json!(7.5)), 7);
        assert_eq!(limit_of(json!(-1)), 1);
        assert_eq!(limit_of(json!(1e12)), 50);
        assert_eq!(limit_of(json!(null)), 10);
        assert!(serde_json::from_value::<SearchRequest>(json!({"limit": "ten"})).is_err());
    }

    #[test]
    fn zero_price_bounds_are_absent() {
        let req = SearchRequest { min_price: Some(0.0), max_price: Some(0.0), ..Default::default() };
        assert_eq!(req.min_price_bound(), None);
        assert_eq!(req.max_price_bound(), None);
    }

    #[test]
    fn request_uses_camel_case_keys() {
        let req: SearchRequest = serde_json::from_value(json!({
            "make": "bmw", "minPrice": 5000, "maxPrice": 20000, "limit": 5
        }))
        .unwrap();
        assert_eq!(req.make_filter(), Some("bmw"));
        assert_eq!(req.min_price_bound(), Some(5000.0));
        assert_eq!(req.max_price_bound(), Some(20000.0));
        assert_eq!(req.limit, Some(5.0));
    }

    #[test]
    fn identifier_priorities_differ_for_dedup_and_display() {
        let raw: RawVehicle = serde_json::from_value(json!({"vehicleId": "V1", "id": 42})).unwrap();
        assert_eq!(raw.dedup_key(), Some(&VehicleId::Text("V1".into())));
        assert_eq!(raw.display_id().as_deref(), Some("42"));

        let raw: RawVehicle = serde_json::from_value(json!({"vehicleId": "", "id": "A7"})).unwrap();
        assert_eq!(raw.dedup_key(), Some(&VehicleId::Text("A7".into())));
    }

    #[test]
    fn numeric_and_text_ids_are_distinct_keys() {
        let number: RawVehicle = serde_json::from_value(json!({"id": 1})).unwrap();
        let text: RawVehicle = serde_json::from_value(json!({"id": "1"})).unwrap();
        assert_ne!(number.dedup_key(), text.dedup_key());
        assert_eq!(number.display_id(), text.display_id());
    }

    #[test]
    fn counts_accept_whole_floats_only() {
        assert_eq!(whole_count(&json!(742)), Some(742));
        assert_eq!(whole_count(&json!(742.0)), Some(742));
        assert_eq!(whole_count(&json!("742")), Some(742));
        assert_eq!(whole_count(&json!("742.0")), Some(742));
        assert_eq!(whole_count(&json!(742.5)), None);
        assert_eq!(whole_count(&json!(-3)), None);
        assert_eq!(whole_count(&json!(true)), None);

        let env = UpstreamEnvelope::from_value(&json!({"response": {"numResultFound": 742.0}}));
        assert_eq!(env.num_result_found, Some(742));
    }

    #[test]
    fn wrong_typed_fields_do_not_reject_the_record() {
        let raw: RawVehicle = serde_json::from_value(json!({
            "id": "X", "price": "15000", "mileage": {"km": 1}, "year": null, "make": 500
        }))
        .unwrap();
        assert_eq!(raw.price, Some(15000.0));
        assert_eq!(raw.mileage, None);
        assert_eq!(raw.year, None);
        assert_eq!(raw.make.as_deref(), Some("500"));
    }

    #[test]
    fn envelope_tolerates_missing_and_malformed_sections() {
        let env = UpstreamEnvelope::from_value(&json!({
            "response": {"promoResults": "oops", "searchResults": [{"id": 1}, 7], "numResultFound": "120"}
        }));
        assert!(env.promo_results.is_empty());
        assert_eq!(env.search_results.len(), 1);
        assert_eq!(env.num_result_found, Some(120));
        assert!(env.facet_results.is_null());

        let env = UpstreamEnvelope::from_value(&json!({}));
        assert!(env.promo_results.is_empty() && env.search_results.is_empty());
        assert_eq!(env.num_result_found, None);
    }

    #[test]
    fn tool_result_serializes_error_flag() {
        let out = serde_json::to_value(ToolResult::error("boom")).unwrap();
        assert_eq!(out, json!({"text": "boom", "isError": true}));
    }
}
