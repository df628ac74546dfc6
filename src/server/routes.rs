use crate::server::api::{self, ApiError};
use crate::server::request::RequestError;
use crate::server::AppState;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }

    fn ok(body: String) -> Self {
        HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            body,
        }
    }
}

pub fn route_request(state: &AppState, method: &str, path: &str, body: &str) -> HttpResponse {
    let route = path.split('?').next().unwrap_or(path);
    let result = match (method, route) {
        ("GET", "/api/health") => api::health_payload().map_err(ApiError::from),
        ("GET", "/api/catalog") => api::catalog_payload(state),
        ("GET", "/api/resolve") => api::resolve_payload(state, path),
        ("POST", "/api/metrics") => api::body_metrics_payload(state, body),
        ("POST", "/api/refresh") => api::refresh_payload(state),
        ("GET", "/api/worldstate") => api::worldstate_payload(state),
        ("GET", route) if route.starts_with("/api/metrics/") => {
            let username = route.trim_start_matches("/api/metrics/").split('/').next().unwrap_or("");
            api::user_metrics_payload(state, username)
        }
        _ => return error_response(404, "Not Found", "Not found"),
    };
    match result {
        Ok(payload) => HttpResponse::ok(payload),
        Err(err) => api_error_response(&err),
    }
}

fn api_error_response(err: &ApiError) -> HttpResponse {
    match err {
        ApiError::Unresolved { identifier, display } => HttpResponse {
            status_code: 404,
            status_text: "Not Found",
            content_type: "application/json",
            body: api::unresolved_payload(identifier, display),
        },
        ApiError::ProfileNotFound(_) => error_response(404, "Not Found", &err.to_string()),
        ApiError::MissingParam(_) | ApiError::InvalidName(_) | ApiError::Profile(_) => {
            error_response(400, "Bad Request", &err.to_string())
        }
        ApiError::Upstream(_) | ApiError::WorldState(_) => error_response(502, "Bad Gateway", &err.to_string()),
        ApiError::Refresh(_) => error_response(503, "Service Unavailable", &err.to_string()),
        ApiError::Encode(_) => error_response(500, "Internal Server Error", &err.to_string()),
    }
}

/// Response for a request that could not be read off the wire.
pub fn rejected_request_response(err: &RequestError) -> HttpResponse {
    match err {
        RequestError::TooLarge { .. } => error_response(413, "Payload Too Large", &err.to_string()),
        _ => error_response(400, "Bad Request", &err.to_string()),
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}
