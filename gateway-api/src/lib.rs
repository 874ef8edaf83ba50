pub mod config;
pub mod extract;
pub mod handlers;
pub mod lambda;
pub mod providers;
pub mod routers;
pub mod startup;

pub use startup::{build_router, AppState, Application};
