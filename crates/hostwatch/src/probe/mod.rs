/// Probe dispatch - turns a host key into a pass/fail reachability check
///
/// This module is responsible for:
/// - Resolving host keys into a closed set of check types
/// - Running HTTP/HTTPS, TCP and ICMP checks under a single timeout
pub mod checker;
pub mod dispatcher;
pub mod target;

pub use dispatcher::{ProbeDispatcher, Prober};
pub use target::{CheckType, Target};
