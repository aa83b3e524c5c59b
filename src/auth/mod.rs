//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! token source (literal / env var / resolved parts)
//!     → credentials.rs (decode v1 API key or legacy JWT)
//!     → CredentialProvider {token, control endpoint, cache endpoint}
//!     → shared via Arc with the request pipeline
//! ```
//!
//! # Design Decisions
//! - Resolution happens once, at client construction; failures never surface at call time
//! - Tokens are redacted from `Debug` output

pub mod credentials;

pub use credentials::{CredentialError, CredentialProvider, CredentialSource};
