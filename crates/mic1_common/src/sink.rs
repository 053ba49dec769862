use crate::{Diagnostic, Severity};

/// Receiver for diagnostics emitted by the core.
///
/// Implementations must not block; the core calls `emit` in the middle of a
/// cycle. `enabled` lets the core skip formatting messages nobody will read.
pub trait DiagnosticSink {
    fn enabled(&self, _severity: Severity) -> bool {
        true
    }

    fn emit(&mut self, diagnostic: Diagnostic);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn enabled(&self, severity: Severity) -> bool {
        (**self).enabled(severity)
    }

    fn emit(&mut self, diagnostic: Diagnostic) {
        (**self).emit(diagnostic)
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Box<S> {
    fn enabled(&self, severity: Severity) -> bool {
        (**self).enabled(severity)
    }

    fn emit(&mut self, diagnostic: Diagnostic) {
        (**self).emit(diagnostic)
    }
}

/// Forwards diagnostics to the `log` facade.
///
/// The sink carries its own minimum severity, so two sequencers in one
/// process can log at different verbosities.
#[derive(Clone, Debug)]
pub struct LogSink {
    target: &'static str,
    min_severity: Severity,
}

impl LogSink {
    pub const DEFAULT_TARGET: &'static str = "mic1";

    pub fn new(min_severity: Severity) -> Self {
        Self {
            target: Self::DEFAULT_TARGET,
            min_severity,
        }
    }

    pub fn with_target(target: &'static str, min_severity: Severity) -> Self {
        Self {
            target,
            min_severity,
        }
    }

    pub fn min_severity(&self) -> Severity {
        self.min_severity
    }

    pub fn set_min_severity(&mut self, min_severity: Severity) {
        self.min_severity = min_severity;
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(Severity::Trace)
    }
}

impl DiagnosticSink for LogSink {
    fn enabled(&self, severity: Severity) -> bool {
        severity >= self.min_severity && log::log_enabled!(target: self.target, severity.level())
    }

    fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity < self.min_severity {
            return;
        }
        log::log!(
            target: self.target,
            diagnostic.severity.level(),
            "{}: {}",
            diagnostic.kind,
            diagnostic.message
        );
    }
}

/// Keeps every diagnostic in memory. Handy for tests and for frontends that
/// render an event log after each cycle.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    events: Vec<Diagnostic>,
    min_severity: Severity,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_severity(min_severity: Severity) -> Self {
        Self {
            events: Vec::new(),
            min_severity,
        }
    }

    pub fn events(&self) -> &[Diagnostic] {
        &self.events
    }

    /// Diagnostics that describe an error, in emission order.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.events.iter().filter(|d| d.is_error())
    }

    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl DiagnosticSink for RecordingSink {
    fn enabled(&self, severity: Severity) -> bool {
        severity >= self.min_severity
    }

    fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity >= self.min_severity {
            self.events.push(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, EventKind};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn recording_sink_filters_below_min_severity() {
        let mut sink = RecordingSink::with_min_severity(Severity::Debug);
        sink.emit(Diagnostic::new(EventKind::Subcycle, Severity::Trace, "fetch"));
        sink.emit(Diagnostic::new(EventKind::Branch, Severity::Debug, "jump"));
        assert_eq!(sink.events().len(), 1);
        assert!(!sink.enabled(Severity::Trace));
        assert!(sink.enabled(Severity::Fatal));
    }

    #[test]
    fn recording_sink_separates_errors() {
        let mut sink = RecordingSink::new();
        sink.emit(Diagnostic::new(EventKind::Subcycle, Severity::Trace, "fetch"));
        sink.emit(Diagnostic::new(
            EventKind::Error(ErrorKind::ImmutableWrite),
            Severity::Error,
            "register 5",
        ));
        let errors: Vec<_> = sink.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, EventKind::Error(ErrorKind::ImmutableWrite));

        let taken = sink.take();
        assert_eq!(taken.len(), 2);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn log_sink_respects_its_own_threshold() {
        init_logger();
        let mut sink = LogSink::new(Severity::Error);
        assert!(!sink.enabled(Severity::Debug));
        // Below threshold: silently dropped.
        sink.emit(Diagnostic::new(EventKind::Branch, Severity::Debug, "jump"));
        sink.set_min_severity(Severity::Trace);
        assert_eq!(sink.min_severity(), Severity::Trace);
    }

    #[test]
    fn boxed_sink_forwards() {
        let mut inner = RecordingSink::new();
        {
            let mut boxed: Box<dyn DiagnosticSink + '_> = Box::new(&mut inner);
            boxed.emit(Diagnostic::new(EventKind::State, Severity::Info, "dump"));
        }
        assert_eq!(inner.events().len(), 1);
    }
}
