//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! presets.rs / Configuration::builder() / config file (TOML)
//!     → loader.rs (parse & deserialize into schema.rs)
//!     → validation.rs (semantic checks, all errors at once)
//!     → Configuration (immutable)
//!     → validated again by each client at construction
//!     → shared by every call the client issues
//! ```
//!
//! # Design Decisions
//! - Configuration is immutable; `with_*` returns a new value
//! - All file fields have defaults to allow minimal configs
//! - Invalid values are reported before any call is attempted

pub mod configuration;
pub mod error;
pub mod loader;
pub mod presets;
pub mod schema;
pub mod validation;

pub use configuration::{Configuration, ConfigurationBuilder};
pub use error::ConfigError;
pub use schema::ClientConfigFile;
pub use validation::ValidationError;
