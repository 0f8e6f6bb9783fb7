use crate::{
    error::{CompileError, ErrorClass},
    expr::ExprFingerprint,
};

///
/// CompileTraceSink
///

pub trait CompileTraceSink: Send + Sync {
    fn on_event(&self, event: CompileTraceEvent);
}

///
/// CompilePhase
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompilePhase {
    Merge,
    Compile,
    Assemble,
}

///
/// CompileTraceEvent
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CompileTraceEvent {
    Start {
        entity: String,
    },
    Phase {
        entity: String,
        phase: CompilePhase,
        nodes: u64,
    },
    Finish {
        entity: String,
        fingerprint: ExprFingerprint,
        nodes: u64,
    },
    Failed {
        entity: String,
        phase: CompilePhase,
        class: ErrorClass,
    },
}

///
/// TraceScope
///
/// Emits the events of one compilation to an optional sink.
///

pub(crate) struct TraceScope<'a> {
    sink: Option<&'a dyn CompileTraceSink>,
    entity: String,
}

impl<'a> TraceScope<'a> {
    pub(crate) fn start(sink: Option<&'a dyn CompileTraceSink>, entity: &str) -> Self {
        if let Some(sink) = sink {
            sink.on_event(CompileTraceEvent::Start {
                entity: entity.to_string(),
            });
        }

        Self {
            sink,
            entity: entity.to_string(),
        }
    }

    pub(crate) fn phase(&self, phase: CompilePhase, nodes: usize) {
        tracing::debug!(entity = %self.entity, ?phase, nodes, "compile phase complete");

        if let Some(sink) = self.sink {
            sink.on_event(CompileTraceEvent::Phase {
                entity: self.entity.clone(),
                phase,
                nodes: saturating_u64(nodes),
            });
        }
    }

    pub(crate) fn finish(self, fingerprint: ExprFingerprint, nodes: usize) {
        tracing::debug!(entity = %self.entity, %fingerprint, nodes, "compiled query");

        if let Some(sink) = self.sink {
            sink.on_event(CompileTraceEvent::Finish {
                entity: self.entity,
                fingerprint,
                nodes: saturating_u64(nodes),
            });
        }
    }

    pub(crate) fn failed(self, phase: CompilePhase, err: &CompileError) {
        let class = err.class();
        tracing::warn!(
            entity = %self.entity,
            ?phase,
            %class,
            error = %err,
            "query compilation failed"
        );

        if let Some(sink) = self.sink {
            sink.on_event(CompileTraceEvent::Failed {
                entity: self.entity,
                phase,
                class,
            });
        }
    }
}

fn saturating_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
