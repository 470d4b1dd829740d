pub mod app;
pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod stats;
pub mod storage;
pub mod store;
pub mod trend;
pub mod validation;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::load_data;
pub use trend::{compute_trend, TrendPoint, TrendResult};
