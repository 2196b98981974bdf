pub mod config;
pub mod fixture;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;

pub use config::{AppConfig, ContentConfig, LoggingConfig, ServerConfig};
pub use fixture::{ContentPackage, FixtureError, IndexDefinition};
pub use observability::init_tracing;
pub use server::{ContentqlServer, ServerBuilder, build_app};
