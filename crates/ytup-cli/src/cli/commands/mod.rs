//! CLI command handlers, one file per command.

mod auth;
mod caption;
mod credentials;
mod output;
mod upload;

pub use auth::run_auth;
pub use caption::run_caption;
pub use credentials::Credentials;
pub use upload::run_upload;
