// Renders the discovery report text

use std::fmt::Write;

use crate::facets::{FacetBreakdown, FacetCounts};
use crate::models::DisplayVehicle;

pub const NO_RESULTS: &str = "No vehicles found matching your criteria.";

const MAKES_SHOWN: usize = 8;

pub fn compose_report(
    total: u64,
    breakdown: &FacetBreakdown,
    sample: &[DisplayVehicle],
    suggestions: &[String],
) -> String {
    if sample.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut out = String::new();
    out.push_str("📊 INVENTORY OVERVIEW\n");
    let _ = writeln!(out, "Found {} vehicles total across all dealers\n", total);

    push_breakdown_line(&mut out, "🏷️ BY CONDITION", breakdown.conditions.as_ref(), usize::MAX);
    push_breakdown_line(&mut out, "⛽ BY FUEL TYPE", breakdown.fuel_types.as_ref(), usize::MAX);
    push_breakdown_line(&mut out, "🚗 BY MAKE", breakdown.makes.as_ref(), MAKES_SHOWN);
    push_breakdown_line(&mut out, "🚙 BY BODY TYPE", breakdown.body_types.as_ref(), usize::MAX);

    let _ = writeln!(out, "\n📋 SAMPLE VEHICLES (showing {} of {})", sample.len(), total);
    for (index, vehicle) in sample.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", index + 1, vehicle.summary);
        let _ = write!(out, "   Price: {}", vehicle.price);
        if let Some(id) = &vehicle.id {
            let _ = write!(out, " • ID: {}", id);
        }
        out.push('\n');
    }

    if !suggestions.is_empty() {
        out.push_str("\n💡 REFINE YOUR SEARCH\n");
        for suggestion in suggestions {
            let _ = writeln!(out, "• {}", suggestion);
        }
    }

    out
}

// "LABEL: A (1), B (2)", skipped when the category is unset
fn push_breakdown_line(out: &mut String, label: &str, counts: Option<&FacetCounts>, max: usize) {
    let Some(counts) = counts.filter(|c| !c.is_empty()) else {
        return;
    };
    let entries: Vec<String> = counts
        .iter()
        .take(max)
        .map(|(value, count)| format!("{} ({})", value, count))
        .collect();
    let _ = writeln!(out, "{}: {}", label, entries.join(", "));
}
