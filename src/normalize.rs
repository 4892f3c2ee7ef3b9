// Turns the upstream envelope into a deduplicated, display-ready vehicle list,
// and re-applies the price bounds the upstream does not enforce.

use std::collections::HashSet;

use crate::models::{DisplayVehicle, RawVehicle, UpstreamEnvelope, VehicleId};

// Discovery sample bound, independent of the caller's limit
pub const SAMPLE_CAP: usize = 15;

const DEFAULT_CONDITION: &str = "USED";

/// Merges promo and search results (promo first), keeps the first record seen
/// for each identifier, caps the sample and formats each vehicle for display.
pub fn normalize_results(envelope: &UpstreamEnvelope) -> Vec<DisplayVehicle> {
    let promo = &envelope.promo_results;
    let search = &envelope.search_results;
    tracing::debug!("Combining results: {} promo + {} search", promo.len(), search.len());

    // Records without any identifier share the `None` key, so only the first survives
    let mut seen: HashSet<Option<&VehicleId>> = HashSet::new();
    let unique: Vec<&RawVehicle> = promo
        .iter()
        .chain(search.iter())
        .filter(|vehicle| seen.insert(vehicle.dedup_key()))
        .collect();

    let shown = unique.len().min(SAMPLE_CAP);
    tracing::debug!("Final sample: {} unique -> {} shown", unique.len(), shown);

    unique.into_iter().take(SAMPLE_CAP).map(to_display).collect()
}

fn to_display(vehicle: &RawVehicle) -> DisplayVehicle {
    let title = [&vehicle.make, &vehicle.model, &vehicle.version]
        .iter()
        .filter_map(|part| part.as_deref())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();

    DisplayVehicle {
        id: vehicle.display_id(),
        title,
        make: vehicle.make.clone(),
        model: vehicle.model.clone(),
        version: vehicle.version.clone(),
        year: vehicle.year,
        price: match vehicle.price {
            Some(price) => format!("€{}", group_digits(price)),
            None => "Price on request".to_string(),
        },
        price_number: vehicle.price.unwrap_or(0.0),
        fuel: vehicle.fuel.clone(),
        condition: vehicle.condition.clone(),
        mileage: vehicle.mileage.map(|km| format!("{} km", group_digits(km))),
        transmission: vehicle.transmission.clone(),
        summary: summarize(vehicle),
    }
}

// e.g. "2019 • BMW • X1 • DIESEL • 45,000km"
fn summarize(vehicle: &RawVehicle) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(year) = vehicle.year {
        parts.push(year.to_string());
    }
    parts.extend(vehicle.make.iter().cloned());
    parts.extend(vehicle.model.iter().cloned());
    parts.extend(vehicle.fuel.iter().cloned());
    if let Some(km) = vehicle.mileage {
        parts.push(format!("{}km", group_digits(km)));
    }
    if let Some(condition) = vehicle.condition.as_deref() {
        if condition != DEFAULT_CONDITION {
            parts.push(condition.to_string());
        }
    }

    parts.join(" • ")
}

/// en-US style digit grouping with at most three fractional digits:
/// `18500.0` -> `18,500`, `1234.5` -> `1,234.5`.
pub fn group_digits(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let abs = rounded.abs();
    let whole = abs.trunc() as u64;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let fraction = format!("{:.3}", abs - abs.trunc());
    let fraction = fraction.trim_start_matches('0').trim_end_matches('0');
    if fraction.len() > 1 {
        grouped.push_str(fraction); // keeps the leading '.'
    }

    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Keeps vehicles whose numeric price (0 when on request) lies within the
/// given bounds. With no bounds at all the list passes through untouched.
pub fn filter_by_price(
    vehicles: Vec<DisplayVehicle>,
    min_price: Option<f64>,
    max_price: Option<f64>,
) -> Vec<DisplayVehicle> {
    if min_price.is_none() && max_price.is_none() {
        return vehicles;
    }

    let before = vehicles.len();
    let kept: Vec<DisplayVehicle> = vehicles
        .into_iter()
        .filter(|vehicle| {
            let price = vehicle.price_number;
            min_price.is_none_or(|min| price >= min) && max_price.is_none_or(|max| price <= max)
        })
        .collect();

    tracing::debug!("Price filtering: {} -> {} vehicles", before, kept.len());
    kept
}
