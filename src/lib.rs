//! Client library for a remote cache, vector index, topic and leaderboard service.
//!
//! Every operation returns a closed outcome family ([`outcome`]) and runs
//! through a shared [`pipeline::Pipeline`] that applies retries, a per-call
//! deadline and the configured middleware chain.

pub mod auth;
pub mod clients;
pub mod config;
pub mod errors;
pub mod middleware;
pub mod observability;
pub mod outcome;
pub mod pipeline;
pub mod resilience;
pub mod transport;

pub use auth::{CredentialError, CredentialProvider, CredentialSource};
pub use clients::{CacheClient, ClientBuilder, LeaderboardClient, TopicClient, VectorIndexClient};
pub use config::{ConfigError, Configuration};
pub use errors::{ErrorKind, SdkError};
pub use outcome::{Conditional, Creation, Lookup, Outcome, OutcomeFamily, TtlUpdate};
pub use transport::{Transport, TransportError, TransportRequest, TransportResponse};
