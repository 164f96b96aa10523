mod config;
mod error;
mod session;

pub use config::{AppConfig, AppConfigExt};
pub use error::{ConfigError, SessionError};
pub use session::Session;
