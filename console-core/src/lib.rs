//! console-core: logging, metrics, and HTTP middleware shared by the
//! back-office console.
pub mod metrics;
pub mod middleware;
pub mod observability;
