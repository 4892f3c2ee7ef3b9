// Handlers exposing the search tool over HTTP

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    models::{SearchRequest, ToolResult},
    search, AppState,
};

pub const SEARCH_VEHICLES: &str = "search_vehicles";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    name: &'static str,
    description: &'static str,
    input_schema: Value,
}

fn search_vehicles_descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: SEARCH_VEHICLES,
        description: "Discover vehicle inventory with comprehensive overview and sample listings. \
            Shows total counts by make, fuel, condition plus representative vehicle examples \
            with refinement suggestions.",
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Natural language search query (e.g., 'BMW diesel under 30000')"},
                "make": {"type": "string", "description": "Vehicle make/brand (e.g., BMW, Fiat, Audi)"},
                "fuel": {"type": "string", "description": "Fuel type: DIESEL, PETROL, ELECTRIC, HYBRID"},
                "maxPrice": {"type": "number", "description": "Maximum price in EUR"},
                "minPrice": {"type": "number", "description": "Minimum price in EUR"},
                "condition": {"type": "string", "description": "Vehicle condition: NEW, USED, KM0"},
                "limit": {"type": "number", "description": "Number of results to return (default 10, max 50)"}
            }
        }),
    }
}

// GET /api/tools
pub async fn list_tools() -> impl IntoResponse {
    Json(json!({ "tools": [search_vehicles_descriptor()] }))
}

// POST /api/tools/:name
// Always 200; failures travel in the isError flag
pub async fn call_tool(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
    body: Option<Json<Value>>,
) -> Json<ToolResult> {
    tracing::info!("[HANDLER] /api/tools/{} - Request received.", name);

    if name != SEARCH_VEHICLES {
        tracing::warn!("[HANDLER] Unknown tool requested: {}", name);
        return Json(ToolResult::error(format!("Error: Tool \"{}\" not implemented", name)));
    }

    let args = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let request: SearchRequest = if args.is_null() {
        SearchRequest::default()
    } else {
        match serde_json::from_value(args) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("[HANDLER] Invalid search_vehicles arguments: {}", e);
                return Json(ToolResult::error(format!("Error: invalid arguments: {}", e)));
            }
        }
    };

    Json(search::search_vehicles(&app_state.stock_api, &request).await)
}
