// Facet breakdown (counts per condition / fuel / make / body type) and the
// refinement suggestions derived from it.

use serde::Serialize;
use serde_json::Value;

use crate::models::{SearchRequest, whole_count};

const MAX_SUGGESTIONS: usize = 4;

// value -> count, in upstream order; the first occurrence of a value wins
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FacetCounts(Vec<(String, u64)>);

impl FacetCounts {
    fn insert(&mut self, value: String, count: u64) {
        if !self.0.iter().any(|(existing, _)| *existing == value) {
            self.0.push((value, count));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(v, c)| (v.as_str(), *c))
    }

    // Highest counts first; equal counts keep upstream order (stable sort)
    fn ranked(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

// A category is `None` when the upstream sent nothing for it
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FacetBreakdown {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<FacetCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_types: Option<FacetCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub makes: Option<FacetCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_types: Option<FacetCounts>,
}

/// Reads the `type`, `fuelType`, `make` and `bodyType` facets out of the
/// upstream `facetResults` object. Other keys are ignored.
pub fn parse_facets(facet_results: &Value) -> FacetBreakdown {
    FacetBreakdown {
        conditions: facet_counts(facet_results.get("type")),
        fuel_types: facet_counts(facet_results.get("fuelType")),
        makes: facet_counts(facet_results.get("make")),
        body_types: facet_counts(facet_results.get("bodyType")),
    }
}

fn facet_counts(facet: Option<&Value>) -> Option<FacetCounts> {
    let entries = facet?.as_array()?;

    let mut counts = FacetCounts::default();
    for entry in entries {
        let value = match entry.get("value") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => continue,
        };
        if let Some(count) = entry.get("count").and_then(whole_count) {
            counts.insert(value, count);
        }
    }

    (!counts.is_empty()).then_some(counts)
}

/// Up to four next-query hints, most impactful first: popular makes, then
/// well-stocked fuel types, then body types, then price ranges.
pub fn refinement_suggestions(breakdown: &FacetBreakdown, filters: &SearchRequest) -> Vec<String> {
    let mut suggestions = Vec::new();

    if let Some(makes) = &breakdown.makes {
        if filters.make_filter().is_none() {
            for (make, count) in makes.ranked().into_iter().take(3) {
                if count > 5 {
                    suggestions.push(format!("Try \"{make}\" for {count}+ {make} vehicles"));
                }
            }
        }
    }

    if let Some(fuels) = &breakdown.fuel_types {
        if filters.fuel_filter().is_none() {
            for (fuel, count) in well_stocked(fuels) {
                suggestions.push(format!(
                    "Filter by \"{fuel}\" for {count} {} vehicles",
                    fuel.to_lowercase()
                ));
            }
        }
    }

    if let Some(bodies) = &breakdown.body_types {
        for (body, count) in well_stocked(bodies) {
            suggestions.push(format!(
                "Search \"{body}\" for {count} {} options",
                body.to_lowercase()
            ));
        }
    }

    if filters.min_price_bound().is_none() && filters.max_price_bound().is_none() {
        suggestions.push("Add \"under 25000\" for budget-friendly options".to_string());
        suggestions.push("Add \"over 30000\" for premium vehicles".to_string());
    }

    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

// Top two entries with more than 10 vehicles
fn well_stocked(counts: &FacetCounts) -> Vec<(&str, u64)> {
    counts
        .ranked()
        .into_iter()
        .filter(|(_, count)| *count > 10)
        .take(2)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn count_of(counts: &Option<FacetCounts>, value: &str) -> Option<u64> {
        counts.as_ref()?.iter().find(|(v, _)| *v == value).map(|(_, c)| c)
    }

    fn facet(entries: &[(&str, u64)]) -> Value {
        Value::Array(entries.iter().map(|(v, c)| json!({"value": v, "count": c})).collect())
    }

    #[test]
    fn recognized_facets_are_mapped() {
        let breakdown = parse_facets(&json!({
            "type": facet(&[("USED", 80), ("NEW", 20)]),
            "fuelType": facet(&[("DIESEL", 60)]),
            "make": facet(&[("FIAT", 30), ("BMW", 12)]),
            "bodyType": facet(&[("SUV", 40)]),
            "color": facet(&[("RED", 3)])
        }));

        assert_eq!(count_of(&breakdown.conditions, "NEW"), Some(20));
        assert_eq!(count_of(&breakdown.fuel_types, "DIESEL"), Some(60));
        assert_eq!(breakdown.makes.as_ref().unwrap().iter().count(), 2);
        assert_eq!(count_of(&breakdown.body_types, "SUV"), Some(40));
        let out = serde_json::to_value(&breakdown).unwrap();
        assert!(out.get("color").is_none());
    }

    #[test]
    fn absent_or_empty_facets_stay_unset() {
        let breakdown = parse_facets(&json!({"type": [], "make": "nope"}));
        assert_eq!(breakdown, FacetBreakdown::default());
        assert_eq!(parse_facets(&Value::Null), FacetBreakdown::default());
    }

    #[test]
    fn first_occurrence_of_a_value_wins() {
        let breakdown = parse_facets(&json!({"make": facet(&[("FIAT", 30), ("FIAT", 2)])}));
        assert_eq!(breakdown.makes.as_ref().unwrap().iter().count(), 1);
        assert_eq!(count_of(&breakdown.makes, "FIAT"), Some(30));
    }

    #[test]
    fn whole_float_counts_are_kept() {
        let breakdown = parse_facets(&json!({
            "fuelType": [{"value": "DIESEL", "count": 60.0}, {"value": "LPG", "count": 2.5}]
        }));
        assert_eq!(count_of(&breakdown.fuel_types, "DIESEL"), Some(60));
        assert_eq!(count_of(&breakdown.fuel_types, "LPG"), None);
    }

    fn breakdown() -> FacetBreakdown {
        parse_facets(&json!({
            "make": facet(&[("FIAT", 8), ("BMW", 40), ("AUDI", 8), ("KIA", 50)]),
            "fuelType": facet(&[("PETROL", 30), ("DIESEL", 45), ("LPG", 4)]),
            "bodyType": facet(&[("SUV", 25), ("SEDAN", 25), ("COUPE", 11)])
        }))
    }

    #[test]
    fn makes_come_first_ranked_by_count() {
        let suggestions = refinement_suggestions(&breakdown(), &SearchRequest::default());
        assert_eq!(
            suggestions,
            vec![
                "Try \"KIA\" for 50+ KIA vehicles",
                "Try \"BMW\" for 40+ BMW vehicles",
                "Try \"FIAT\" for 8+ FIAT vehicles",
                "Filter by \"DIESEL\" for 45 diesel vehicles",
            ]
        );
    }

    #[test]
    fn active_make_and_fuel_filters_suppress_their_hints() {
        let filters = SearchRequest {
            make: Some("bmw".into()),
            fuel: Some("diesel".into()),
            max_price: Some(20000.0),
            ..Default::default()
        };
        let suggestions = refinement_suggestions(&breakdown(), &filters);
        assert_eq!(
            suggestions,
            vec![
                "Search \"SUV\" for 25 suv options",
                "Search \"SEDAN\" for 25 sedan options",
            ]
        );
        assert!(suggestions.iter().all(|s| !s.starts_with("Try")));
    }

    #[test]
    fn price_hints_only_without_price_filter() {
        let empty = FacetBreakdown::default();
        let suggestions = refinement_suggestions(&empty, &SearchRequest::default());
        assert_eq!(
            suggestions,
            vec![
                "Add \"under 25000\" for budget-friendly options",
                "Add \"over 30000\" for premium vehicles",
            ]
        );

        let zero_min = SearchRequest { min_price: Some(0.0), ..Default::default() };
        assert_eq!(refinement_suggestions(&empty, &zero_min).len(), 2);

        let with_min = SearchRequest { min_price: Some(5000.0), ..Default::default() };
        assert!(refinement_suggestions(&empty, &with_min).is_empty());
    }

    #[test]
    fn small_makes_are_skipped_and_list_never_exceeds_four() {
        let breakdown = parse_facets(&json!({
            "make": facet(&[("FIAT", 5), ("BMW", 3)]),
            "fuelType": facet(&[("PETROL", 30), ("DIESEL", 45)]),
            "bodyType": facet(&[("SUV", 25), ("SEDAN", 20)])
        }));
        let suggestions = refinement_suggestions(&breakdown, &SearchRequest::default());
        assert_eq!(suggestions.len(), 4);
        assert_eq!(suggestions[0], "Filter by \"DIESEL\" for 45 diesel vehicles");
        assert_eq!(suggestions[3], "Search \"SEDAN\" for 20 sedan options");
    }
}
