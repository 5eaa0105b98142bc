use std::{borrow::Cow, fmt, panic::Location};

/// Error context that records where it was constructed.
///
/// Every error variant in the workspace carries one of these so that a
/// failure surfaced to the agent (or to a log line) names the file and line
/// that raised it. Construct one with [`DiagnosticMessage::new`] or with the
/// [`diag!`] macro when `format!` style arguments are needed.
#[derive(Clone, Debug)]
pub struct DiagnosticMessage {
    message: Cow<'static, str>,
    location: &'static Location<'static>,
}

impl DiagnosticMessage {
    #[track_caller]
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            location: Location::caller(),
        }
    }

    pub fn message(&self) -> &str {
        self.message.as_ref()
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

impl fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (at {}:{})",
            self.message,
            self.location.file(),
            self.location.line()
        )
    }
}

/// Build a [`DiagnosticMessage`] with `format!` syntax while still capturing
/// the caller's file/line.
#[macro_export]
macro_rules! diag {
    ($msg:literal $(,)?) => {
        $crate::error::diagnostics::DiagnosticMessage::new($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::diagnostics::DiagnosticMessage::new(format!($fmt, $($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_call_site() {
        let msg = DiagnosticMessage::new("boom");
        let rendered = msg.to_string();
        assert!(rendered.starts_with("boom (at "));
        assert!(rendered.contains("diagnostics.rs"));
    }

    #[test]
    fn diag_macro_formats_arguments() {
        let msg = diag!("missing column '{}'", "amount");
        assert_eq!(msg.message(), "missing column 'amount'");
    }
}
