use serde::{Deserialize, Serialize};

use crate::contract::{BookmarksResponse, FetchOutcome, HostRequest, HostResponse, OutboundRequest};
use crate::core_service::{PaletteHost, PaletteService};
use crate::listeners::ListenerRegistrar;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    InvalidRequest,
    Listener,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TransportResponse {
    Ok(HostResponse),
    Err { error: ErrorResponse },
}

pub fn handle_request<H: PaletteHost, R: ListenerRegistrar>(
    service: &mut PaletteService<H, R>,
    request: HostRequest,
) -> TransportResponse {
    match service.handle_command(request) {
        Ok(response) => TransportResponse::Ok(response),
        Err(error) => TransportResponse::Err {
            error: ErrorResponse {
                code: ErrorCode::Listener,
                message: error.to_string(),
            },
        },
    }
}

pub fn handle_json<H: PaletteHost, R: ListenerRegistrar>(
    service: &mut PaletteService<H, R>,
    payload: &str,
) -> String {
    let response = match serde_json::from_str::<serde_json::Value>(payload) {
        Err(error) => TransportResponse::Err {
            error: ErrorResponse {
                code: ErrorCode::InvalidJson,
                message: error.to_string(),
            },
        },
        Ok(value) => match serde_json::from_value::<HostRequest>(value) {
            Ok(request) => handle_request(service, request),
            Err(error) => TransportResponse::Err {
                error: ErrorResponse {
                    code: ErrorCode::InvalidRequest,
                    message: error.to_string(),
                },
            },
        },
    };

    encode(&response)
}

pub fn encode_outbound(request: &OutboundRequest) -> String {
    encode(request)
}

pub fn decode_bookmarks_response(payload: Result<&str, String>) -> FetchOutcome {
    let raw = match payload {
        Ok(raw) => raw,
        Err(transport_error) => return FetchOutcome::Failed(transport_error),
    };

    match serde_json::from_str::<BookmarksResponse>(raw) {
        Ok(response) => FetchOutcome::from(response),
        Err(error) => FetchOutcome::Failed(format!("malformed bookmarks response: {error}")),
    }
}

fn encode<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|error| {
        format!(
            "{{\"error\":{{\"code\":\"invalid_request\",\"message\":\"encode failed: {}\"}}}}",
            error.to_string().replace('"', "'")
        )
    })
}
