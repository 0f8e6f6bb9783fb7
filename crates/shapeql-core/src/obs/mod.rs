//! Compile observability.
//!
//! Tracing is optional, injected by the caller, and must not affect the
//! compiled expression.

mod trace;

// re-exports
pub(crate) use trace::TraceScope;
pub use trace::{CompilePhase, CompileTraceEvent, CompileTraceSink};
