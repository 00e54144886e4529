//! Cross-origin policy: only the configured frontend and the local dev server may call the API.

use actix_cors::Cors;
use actix_web::http::{header, Method};

/// Origin of the local development client, always allowed.
pub const LOCAL_FRONTEND_ORIGIN: &str = "http://localhost:5173";

/// Origins allowed to call the API.
pub fn allowed_origins(frontend_url: Option<&str>) -> Vec<String> {
    let mut origins: Vec<String> = frontend_url
        .into_iter()
        .map(|url| url.trim_end_matches('/').to_string())
        .collect();
    if !origins.iter().any(|o| o == LOCAL_FRONTEND_ORIGIN) {
        origins.push(LOCAL_FRONTEND_ORIGIN.to_string());
    }
    origins
}

/// Builds the CORS middleware. Requests without an `Origin` header are not affected.
pub fn cors(frontend_url: Option<&str>) -> Cors {
    let origins = allowed_origins(frontend_url);
    Cors::default()
        .allowed_origin_fn(move |origin, _req_head| {
            let origin = origin.to_str().unwrap_or_default();
            let allowed = origins.iter().any(|o| o == origin);
            if !allowed {
                log::warn!("CORS blocked for origin: {}", origin);
            }
            allowed
        })
        .allowed_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .supports_credentials()
        .max_age(3600)
}
