//! Issue collection for extraction passes that keep going past a failure.
//!
//! An aggregate pass configured to skip failing buses still has to say which
//! buses it skipped and why; those records land here instead of being logged
//! and forgotten.
//!
//! ```
//! use feeder_core::diagnostics::Diagnostics;
//!
//! let mut diag = Diagnostics::new();
//! diag.add_error_with_entity("collect", "bus 'bus7' not found", "bus7");
//! diag.add_warning_with_entity("voltage tree", "line bus does not report phase b", "bus9");
//!
//! assert_eq!(diag.error_count(), 1);
//! assert_eq!(diag.summary(), "1 warning, 1 error");
//! ```

use serde::Serialize;

use crate::error::FeederError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The pass completed but something looked off.
    Warning,
    /// One entity was dropped from the result.
    Error,
}

/// A single diagnostic issue encountered during a pass
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Grouping key, e.g. "collect" or "topology"
    pub category: String,
    pub message: String,
    /// Bus or element the issue is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            entity: None,
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };

        write!(f, "[{}:{}] {}", severity, self.category, self.message)?;

        if let Some(entity) = &self.entity {
            write!(f, " ({})", entity)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message).with_entity(entity));
    }

    pub fn add_error_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Error, category, message).with_entity(entity));
    }

    /// Record a skipped entity from the error that caused the skip.
    ///
    /// `fallback_entity` is used when the error itself does not name one.
    pub fn record_failure(&mut self, category: &str, err: &FeederError, fallback_entity: &str) {
        let entity = err.entity().unwrap_or(fallback_entity);
        self.add_error_with_entity(category, &err.to_string(), entity);
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    pub fn summary(&self) -> String {
        let warnings = self.warning_count();
        let errors = self.error_count();
        let plural = |n: usize| if n == 1 { "" } else { "s" };

        match (warnings, errors) {
            (0, 0) => "No issues".to_string(),
            (w, 0) => format!("{} warning{}", w, plural(w)),
            (0, e) => format!("{} error{}", e, plural(e)),
            (w, e) => format!("{} warning{}, {} error{}", w, plural(w), e, plural(e)),
        }
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Diagnostics: {}", self.summary())?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_counts() {
        let mut diag = Diagnostics::new();
        diag.add_warning_with_entity("voltage tree", "no phase", "bus2");
        diag.add_error_with_entity("collect", "bad base", "bus3");

        assert_eq!(diag.warning_count(), 1);
        assert_eq!(diag.error_count(), 1);
        assert!(diag.has_issues());
        assert!(diag.has_errors());
    }

    #[test]
    fn test_record_failure_uses_error_entity() {
        let mut diag = Diagnostics::new();
        let err = FeederError::InvalidBase {
            bus: "bus3".into(),
            kv_base: 0.0,
            operation: "bus phase voltage",
        };
        diag.record_failure("collect", &err, "fallback");
        let issue = diag.errors().next().unwrap();
        assert_eq!(issue.entity.as_deref(), Some("bus3"));

        diag.record_failure("collect", &FeederError::Other("boom".into()), "bus4");
        assert_eq!(diag.issues[1].entity.as_deref(), Some("bus4"));
    }

    #[test]
    fn test_diagnostics_serialization() {
        let mut diag = Diagnostics::new();
        diag.add_error_with_entity("collect", "not found", "bus9");

        let json = serde_json::to_string_pretty(&diag).unwrap();
        assert!(json.contains("\"error\""));
        assert!(json.contains("\"entity\": \"bus9\""));
    }

    #[test]
    fn test_diagnostics_summary_and_display() {
        let mut diag = Diagnostics::new();
        assert_eq!(diag.summary(), "No issues");

        diag.add_warning_with_entity("voltage tree", "w1", "bus1");
        diag.add_warning_with_entity("voltage tree", "w2", "bus2");
        assert_eq!(diag.summary(), "2 warnings");

        diag.add_error_with_entity("collect", "e1", "bus1");
        assert_eq!(diag.summary(), "2 warnings, 1 error");

        let text = diag.to_string();
        assert!(text.contains("[error:collect] e1 (bus1)"));
    }
}
