use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

/// Cross-origin policy admitting every origin, method and header.
///
/// Browsers refuse `*` on credentialed requests and tower-http rejects the
/// combination at runtime, so with credentials enabled the request's origin,
/// method and headers are echoed back instead.
pub fn permissive_cors(allow_credentials: bool) -> CorsLayer {
    if allow_credentials {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
