pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod recipes;
pub mod state;

pub use app::build_app;
pub use config::AppConfig;
pub use error::AppError;
pub use state::AppState;
