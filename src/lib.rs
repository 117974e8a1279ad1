pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod render;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::{AppError, LoadError};

use services::timing::SessionClock;

// Application state
pub struct AppState {
    pub config: Config,
    pub session: SessionClock,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session: SessionClock::default(),
        }
    }
}
