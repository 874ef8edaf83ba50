pub mod cors;
pub mod timing;

pub use cors::permissive_cors;
pub use timing::{timing_middleware, AccessLogEntry, AccessLogSink, TracingAccessLog};
