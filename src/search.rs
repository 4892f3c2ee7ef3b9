// The search_vehicles tool: request -> upstream query -> report

use crate::{
    facets::{parse_facets, refinement_suggestions},
    models::{MAX_LIMIT, SearchRequest, ToolResult, UpstreamEnvelope, UpstreamQuery},
    normalize::{filter_by_price, normalize_results},
    report::{NO_RESULTS, compose_report},
    stock_api::InventoryApi,
};

// Over-fetch factor, leaving room for dedup and local price filtering
const FETCH_MULTIPLIER: u32 = 3;

/// Maps the caller's filters onto upstream query parameters.
///
/// make/fuel/condition are upper-cased as-is; a `minPrice` of 0 is dropped;
/// `maxPrice` is never sent since the upstream does not apply it reliably.
pub fn build_search_params(request: &SearchRequest) -> UpstreamQuery {
    let requested = request.effective_limit();
    let params = UpstreamQuery {
        make: request.make_filter().map(str::to_uppercase),
        fuel: request.fuel_filter().map(str::to_uppercase),
        condition: request.condition_filter().map(str::to_uppercase),
        min_price: request.min_price_bound().map(|p| p.to_string()),
        limit: requested.saturating_mul(FETCH_MULTIPLIER).min(MAX_LIMIT),
    };
    tracing::debug!(?params, "Mapped search parameters");
    params
}

/// Runs one search end to end. Never fails: upstream errors come back as a
/// `ToolResult` with `is_error` set.
pub async fn search_vehicles<A: InventoryApi>(api: &A, request: &SearchRequest) -> ToolResult {
    tracing::info!(query = ?request.query, "Handling search_vehicles");

    let params = build_search_params(request);
    let payload = match api.search(&params).await {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(status = ?e.status(), error = %e, "Stock API call failed");
            return ToolResult::error(e.user_message());
        }
    };

    let envelope = UpstreamEnvelope::from_value(&payload);
    ToolResult::ok(build_report(&envelope, request))
}

// Everything after the upstream call; pure and deterministic
fn build_report(envelope: &UpstreamEnvelope, request: &SearchRequest) -> String {
    let mut sample = filter_by_price(
        normalize_results(envelope),
        request.min_price_bound(),
        request.max_price_bound(),
    );
    sample.truncate(request.effective_limit() as usize);

    if sample.is_empty() {
        return NO_RESULTS.to_string();
    }

    let breakdown = parse_facets(&envelope.facet_results);
    // Upstream's full match count; the sample size only when it reports none
    let total = envelope
        .num_result_found
        .filter(|n| *n > 0)
        .unwrap_or(sample.len() as u64);
    let suggestions = refinement_suggestions(&breakdown, request);

    compose_report(total, &breakdown, &sample, &suggestions)
}
