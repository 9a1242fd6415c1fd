//! Startup validation of the host.
//!
//! The only host requirement is a usable container runtime; isolation itself
//! is delegated to it.

mod runtime;

pub use runtime::{RuntimeInfo, VERSION_PROBE_TIMEOUT, check_runtime, parse_version, resolve_runtime};
