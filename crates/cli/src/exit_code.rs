//! Exit code definitions for gsw CLI
//!
//! Scripts branch on these values, so existing codes keep their meaning.

use gsw_core::Error;

/// Exit codes for the gsw CLI application.
///
/// These codes follow a consistent convention to allow scripts and automation
/// to handle different error scenarios appropriately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,

    /// General/unspecified error
    GeneralError = 1,

    /// User input error: invalid arguments, malformed destination, bad config
    UsageError = 2,

    /// Remote client could not be constructed: missing credentials, bad endpoint
    BackendUnavailable = 3,

    /// Local file could not be created
    CreateFailed = 4,

    /// The backend rejected a write, flush or upload
    WriteFailed = 5,

    /// A sink was used after it was closed
    ContractViolation = 6,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            3 => Some(Self::BackendUnavailable),
            4 => Some(Self::CreateFailed),
            5 => Some(Self::WriteFailed),
            6 => Some(Self::ContractViolation),
            _ => None,
        }
    }

    /// Map a core error onto its exit code
    pub const fn from_error(err: &Error) -> Self {
        match Self::from_i32(err.exit_code()) {
            Some(code) => code,
            None => Self::GeneralError,
        }
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::GeneralError => "General error",
            Self::UsageError => "Invalid arguments or destination",
            Self::BackendUnavailable => "Remote backend unavailable",
            Self::CreateFailed => "Could not create local file",
            Self::WriteFailed => "Write failed",
            Self::ContractViolation => "Sink used after close",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}
