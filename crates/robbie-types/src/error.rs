use crate::Location;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Lex,
    Syntax,
    Protocol,
    Config,
}

/// Numeric error code (E100–E499).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Lex errors (E100–E199) ──
    pub const UNTERMINATED_STRING: Self = Self(100);
    pub const BAD_ESCAPE: Self = Self(101);
    pub const UNEXPECTED_EOF: Self = Self(102);
    pub const UNTERMINATED_COMMENT: Self = Self(103);

    // ── Syntax errors (E200–E299) ──
    pub const UNEXPECTED_TOKEN: Self = Self(200);
    pub const BAD_NAME: Self = Self(201);
    pub const BAD_INTEGER: Self = Self(202);
    pub const BAD_STRING: Self = Self(203);
    pub const UNKNOWN_INSTRUCTION: Self = Self(204);
    pub const UNKNOWN_TEST: Self = Self(205);
    pub const UNKNOWN_COMMAND: Self = Self(206);
    pub const UNKNOWN_INIT_TARGET: Self = Self(207);
    pub const UNDEFINED_PROCEDURE: Self = Self(208);
    pub const CALL_DEPTH_EXCEEDED: Self = Self(209);

    // ── Protocol errors (E300–E399) ──
    pub const TIMEOUT: Self = Self(300);
    pub const COMMAND_FAILED: Self = Self(301);
    pub const COMMAND_NOT_RECOGNIZED: Self = Self(302);
    pub const UNEXPECTED_RESPONSE: Self = Self(303);
    pub const MALFORMED_RESPONSE: Self = Self(304);
    pub const CONNECTION: Self = Self(305);
    pub const GEM_COUNT_OVERFLOW: Self = Self(306);

    // ── Config errors (E400–E499) ──
    pub const INVALID_CONFIG: Self = Self(400);
    pub const SOURCE_UNREADABLE: Self = Self(401);
    pub const OUTPUT_FAILED: Self = Self(402);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Lex,
            200..=299 => ErrorCategory::Syntax,
            300..=399 => ErrorCategory::Protocol,
            400..=499 => ErrorCategory::Config,
            _ => ErrorCategory::Syntax, // fallback
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured Robbie error.
///
/// Every failure of a run ends up here: lexing and syntax errors carry the
/// script location they were raised at, protocol errors pick one up when
/// the interpreter annotates them on the way out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobbieError {
    /// Error code (e.g., E200).
    pub code: ErrorCode,
    /// Error category (derived from code).
    pub category: ErrorCategory,
    /// Human-readable error message.
    pub message: String,
    /// Script location, when the error is tied to one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// The script line the location points into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_line: Option<String>,
}

impl RobbieError {
    /// Create a new error with no location.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            category: code.category(),
            message: message.into(),
            location: None,
            source_line: None,
        }
    }

    /// Attach a script location and the line it points into.
    pub fn at(mut self, location: Location, source_line: impl Into<String>) -> Self {
        self.location = Some(location);
        self.source_line = Some(source_line.into());
        self
    }

    /// `true` if no location has been attached yet.
    pub fn is_unlocated(&self) -> bool {
        self.location.is_none()
    }

    /// Shorthand for the usual "expected X but found Y" syntax error.
    pub fn unexpected(expected: impl fmt::Display, found: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::UNEXPECTED_TOKEN,
            format!("expected '{expected}' but found '{found}'"),
        )
    }
}

impl fmt::Display for RobbieError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{location}: ")?;
        }
        write!(f, "{} [{}] {}", self.code, self.category, self.message)
    }
}

impl std::error::Error for RobbieError {}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex => write!(f, "lex"),
            Self::Syntax => write!(f, "syntax"),
            Self::Protocol => write!(f, "protocol"),
            Self::Config => write!(f, "config"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::BAD_ESCAPE.category(), ErrorCategory::Lex);
        assert_eq!(ErrorCode::UNEXPECTED_EOF.category(), ErrorCategory::Lex);
        assert_eq!(
            ErrorCode::UNEXPECTED_TOKEN.category(),
            ErrorCategory::Syntax
        );
        assert_eq!(
            ErrorCode::CALL_DEPTH_EXCEEDED.category(),
            ErrorCategory::Syntax
        );
        assert_eq!(ErrorCode::TIMEOUT.category(), ErrorCategory::Protocol);
        assert_eq!(
            ErrorCode::COMMAND_NOT_RECOGNIZED.category(),
            ErrorCategory::Protocol
        );
        assert_eq!(ErrorCode::INVALID_CONFIG.category(), ErrorCategory::Config);
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(format!("{}", ErrorCode::UNEXPECTED_TOKEN), "E200");
        assert_eq!(format!("{}", ErrorCode::TIMEOUT), "E300");
    }

    #[test]
    fn test_unexpected_message_names_both_tokens() {
        let err = RobbieError::unexpected(";", "step");
        assert_eq!(err.code, ErrorCode::UNEXPECTED_TOKEN);
        assert_eq!(err.message, "expected ';' but found 'step'");
    }

    #[test]
    fn test_display_without_location() {
        let err = RobbieError::new(ErrorCode::TIMEOUT, "no response to 'GETLOC'");
        assert_eq!(err.to_string(), "E300 [protocol] no response to 'GETLOC'");
    }

    #[test]
    fn test_display_with_location() {
        let err = RobbieError::unexpected("}", "end of input")
            .at(Location::new(20, 2, 5), "  step;");
        assert_eq!(
            err.to_string(),
            "2:5: E200 [syntax] expected '}' but found 'end of input'"
        );
        assert!(!err.is_unlocated());
    }

    #[test]
    fn test_error_json_serialization() {
        let err = RobbieError::new(ErrorCode::BAD_INTEGER, "expected an integer but found 'x'")
            .at(Location::new(9, 1, 10), "main { do x step; }");
        let json = serde_json::to_string_pretty(&err).unwrap();
        assert!(json.contains("\"code\": 202"));
        assert!(json.contains("\"category\": \"syntax\""));
        assert!(json.contains("\"line\": 1"));
        assert!(json.contains("\"source_line\""));

        let back: RobbieError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.code, err.code);
        assert_eq!(back.location, err.location);
    }

    #[test]
    fn test_unlocated_error_omits_location_fields() {
        let err = RobbieError::new(ErrorCode::CONNECTION, "connection closed");
        let json = serde_json::to_string(&err).unwrap();
        assert!(!json.contains("location"));
        assert!(!json.contains("source_line"));
    }
}
