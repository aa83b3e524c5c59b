//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every call produces:
//!     → logging.rs (structured tracing events via LoggingMiddleware and the pipeline)
//!     → metrics.rs (counters and histograms via MetricsMiddleware and the pipeline)
//!
//! Consumers:
//!     → whatever subscriber / recorder the application installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a global recorder; `logging::init` is opt-in
//! - Request ID flows through every event of a call

pub mod logging;
pub mod metrics;
