pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod proxy;
pub mod server;
pub mod translate;

pub use config::ProxyConfig;
pub use error::{make_error, ProxyError, Result};
pub use models::ModelMapping;
pub use server::{build_router, AppState};
