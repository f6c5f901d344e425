//! Middleware de CORS
//!
//! Con `CORS_ORIGINS` sólo se aceptan los orígenes de la lista. Sin lista,
//! fuera de producción se acepta cualquiera y en producción ninguno.

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

/// CORS abierto, para desarrollo
pub fn cors_middleware() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// CORS restringido a orígenes concretos
pub fn cors_middleware_with_origins(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("⚠️ Origen CORS inválido ignorado: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("x-requested-with"),
        ])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Elige la capa según la configuración
pub fn cors_layer(origins: &[String], production: bool) -> CorsLayer {
    if !origins.is_empty() {
        cors_middleware_with_origins(origins)
    } else if production {
        warn!("⚠️ CORS_ORIGINS vacío en producción: peticiones cross-origin bloqueadas");
        cors_middleware_with_origins(&[])
    } else {
        cors_middleware()
    }
}
