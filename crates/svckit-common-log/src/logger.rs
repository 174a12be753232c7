//! Injectable logging capability.

use std::fmt::Display;
use tracing::{info_span, Span};

/// An error [`Logger::log_if_error`] can classify.
///
/// Absences (a missing row, a cache miss) are expected outcomes and are
/// logged at warn; everything else is logged at error.
pub trait LoggableError: Display {
    /// Whether the error only reports that something was not there.
    fn is_absence(&self) -> bool {
        false
    }
}

impl LoggableError for &str {}

impl LoggableError for String {}

/// Logging handle owned by a component.
///
/// Events are emitted with the component span as their explicit parent:
///
/// ```ignore
/// tracing::info!(parent: self.log.span(), key = %key, "cache hit");
/// ```
///
/// Build loggers after [`crate::init`] has run; a span created before a
/// subscriber is installed stays disabled.
#[derive(Debug, Clone)]
pub struct Logger {
    component: &'static str,
    span: Span,
}

impl Logger {
    /// Create a logger for the named component.
    pub fn new(component: &'static str) -> Self {
        Self {
            component,
            span: info_span!("component", component = component),
        }
    }

    /// A logger that records nothing.
    pub fn disabled() -> Self {
        Self {
            component: "disabled",
            span: Span::none(),
        }
    }

    /// Component name.
    pub fn component(&self) -> &'static str {
        self.component
    }

    /// Parent span for this component's events.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Log the error of a failed result.
    ///
    /// Absences go out at warn, other errors at error. Returns `true` when
    /// something was logged.
    pub fn log_if_error<T, E: LoggableError>(
        &self,
        result: &Result<T, E>,
        message: Option<&str>,
    ) -> bool {
        match result {
            Ok(_) => false,
            Err(err) => {
                let message = message.filter(|m| !m.is_empty()).unwrap_or("error occurred");
                if err.is_absence() {
                    tracing::warn!(parent: &self.span, error = %err, "{}", message);
                } else {
                    tracing::error!(parent: &self.span, error = %err, "{}", message);
                }
                true
            }
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::disabled()
    }
}
