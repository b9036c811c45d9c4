//! The diagnostic sink.
//!
//! Every phase reports line-tagged errors into a shared [`Handler`];
//! nothing is thrown across a walk. Later phases query `error_count()`
//! to decide whether to run at all.

use std::cell::RefCell;
use std::fmt;

/// Diagnostic severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// An error that prevents compilation
    Error,
    /// A condition worth flagging that doesn't prevent compilation
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

/// A line-tagged diagnostic message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity
    pub level: Level,
    /// Source line (1-based)
    pub line: u32,
    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(line: u32, message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            line,
            message: message.into(),
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(line: u32, message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.line, self.level, self.message)
    }
}

/// Collects diagnostics in detection order.
///
/// Interior mutability lets every phase share one sink by reference.
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
    panic_on_error: bool,
}

impl Handler {
    /// Create a new handler.
    pub fn new() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
            panic_on_error: false,
        }
    }

    /// Create a handler that panics on the first error (for tests that
    /// must not produce any).
    pub fn new_panicking() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
            panic_on_error: true,
        }
    }

    /// Report an error at the given source line.
    pub fn error(&self, line: u32, message: impl Into<String>) {
        self.emit(Diagnostic::error(line, message));
    }

    /// Report a warning at the given source line.
    pub fn warning(&self, line: u32, message: impl Into<String>) {
        self.emit(Diagnostic::warning(line, message));
    }

    /// Record a pre-built diagnostic.
    pub fn emit(&self, diagnostic: Diagnostic) {
        if self.panic_on_error && diagnostic.level == Level::Error {
            panic!("diagnostic error: {}", diagnostic.message);
        }
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Whether any errors have been reported.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level == Level::Error)
    }

    /// Number of reported errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Error)
            .count()
    }

    /// Number of reported warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Warning)
            .count()
    }

    /// Snapshot of all diagnostics, in detection order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Drop all recorded diagnostics.
    pub fn clear(&self) {
        self.diagnostics.borrow_mut().clear();
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_display() {
        assert_eq!(format!("{}", Level::Error), "error");
        assert_eq!(format!("{}", Level::Warning), "warning");
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error(3, "n undefined");
        assert_eq!(format!("{diag}"), "3: error: n undefined");
    }

    #[test]
    fn test_handler_starts_empty() {
        let handler = Handler::new();
        assert!(!handler.has_errors());
        assert_eq!(handler.error_count(), 0);
        assert_eq!(handler.warning_count(), 0);
    }

    #[test]
    fn test_handler_error() {
        let handler = Handler::new();
        handler.error(1, "illegal character '$'");
        assert!(handler.has_errors());
        assert_eq!(handler.error_count(), 1);
    }

    #[test]
    fn test_handler_warning_is_not_error() {
        let handler = Handler::new();
        handler.warning(2, "something dubious");
        assert!(!handler.has_errors());
        assert_eq!(handler.warning_count(), 1);
    }

    #[test]
    fn test_detection_order_preserved() {
        let handler = Handler::new();
        handler.error(5, "first");
        handler.error(1, "second");
        let diags = handler.diagnostics();
        assert_eq!(diags[0].message, "first");
        assert_eq!(diags[1].message, "second");
    }

    #[test]
    fn test_clear() {
        let handler = Handler::new();
        handler.error(1, "oops");
        handler.clear();
        assert_eq!(handler.error_count(), 0);
    }

    #[test]
    fn test_panicking_handler() {
        let handler = Handler::new_panicking();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            handler.error(1, "boom");
        }));
        assert!(result.is_err());
    }
}
