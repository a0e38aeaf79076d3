/*!
 * Request Handlers
 * Map decoded API requests onto engine operations
 */

use super::types::{ApiRequest, ApiResponse};
use crate::admission::{AllocationEngine, ResourceRequest};
use crate::config::{parse_text, ConfigDocument};
use crate::core::errors::ConfigError;
use crate::monitoring::RequestSpan;
use tracing::{debug, warn};

/// Decode one protocol line and handle it
///
/// Malformed input yields an `error` response rather than a failure, so
/// the connection can keep going.
pub fn handle_line(engine: &AllocationEngine, line: &str) -> ApiResponse {
    match serde_json::from_str::<ApiRequest>(line) {
        Ok(request) => handle(engine, request),
        Err(e) => {
            warn!(error = %e, "malformed request line");
            ApiResponse::error(format!("malformed request: {}", e))
        }
    }
}

pub fn handle(engine: &AllocationEngine, request: ApiRequest) -> ApiResponse {
    let span = RequestSpan::new(request.op());
    let _entered = span.enter();

    let response = match request {
        ApiRequest::GetConfig => handle_get_config(engine),
        ApiRequest::ReplaceConfig { config, text } => handle_replace_config(engine, config, text),
        ApiRequest::Request { pid, request } => engine
            .submit_request(&ResourceRequest::from_json(&pid, &request))
            .map_or_else(ApiResponse::from, ApiResponse::from),
        ApiRequest::Release { pid, release } => engine
            .submit_release(&ResourceRequest::from_json(&pid, &release))
            .map_or_else(ApiResponse::from, ApiResponse::from),
        ApiRequest::CheckSafety => engine
            .check_safety()
            .map_or_else(ApiResponse::from, ApiResponse::from),
        ApiRequest::Stats => ApiResponse::Stats {
            stats: engine.stats(),
        },
    };

    span.record_outcome(outcome_of(&response));
    response
}

fn handle_get_config(engine: &AllocationEngine) -> ApiResponse {
    let snapshot = engine.snapshot();
    ApiResponse::Config {
        config: ConfigDocument::from_state(&snapshot.state),
        generation: snapshot.generation,
        needs_reconfiguration: snapshot.needs_reconfiguration,
    }
}

fn handle_replace_config(
    engine: &AllocationEngine,
    config: Option<ConfigDocument>,
    text: Option<String>,
) -> ApiResponse {
    let parsed: Result<_, ConfigError> = match (config, text) {
        (Some(document), None) => document.to_state(),
        (None, Some(text)) => parse_text(&text),
        _ => return ApiResponse::error("replace_config takes exactly one of `config` or `text`"),
    };

    match parsed {
        Ok(state) => {
            let generation = engine.reconfigure(state);
            debug!(generation, "configuration replaced via api");
            ApiResponse::Reconfigured { generation }
        }
        Err(e) => {
            warn!(error = %e, "rejected replacement configuration");
            ApiResponse::from(e)
        }
    }
}

fn outcome_of(response: &ApiResponse) -> &'static str {
    match response {
        ApiResponse::Granted { .. } => "granted",
        ApiResponse::RejectedUnsafe { .. } => "rejected_unsafe",
        ApiResponse::RejectedInvalid { .. } => "rejected_invalid",
        ApiResponse::Error { .. } => "error",
        _ => "ok",
    }
}
