//! Diagnostic sinks for replacement failures.

use std::cell::RefCell;
use std::rc::Rc;

/// Receives user-visible diagnostics, one call per reported problem.
pub trait DiagnosticSink {
    fn report_error(&mut self, message: &str);
}

/// Forwards diagnostics to the `log` facade at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report_error(&mut self, message: &str) {
        log::error!("{message}");
    }
}

/// Keeps every message, in order.
impl DiagnosticSink for Vec<String> {
    fn report_error(&mut self, message: &str) {
        self.push(message.to_string());
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report_error(&mut self, message: &str) {
        (**self).report_error(message);
    }
}

/// Shared sink, for several replacement methods reporting to one place.
impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Rc<RefCell<S>> {
    fn report_error(&mut self, message: &str) {
        self.borrow_mut().report_error(message);
    }
}
