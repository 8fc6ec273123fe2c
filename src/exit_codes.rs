//! Process exit codes for the nimbuscli binary.
//!
//! Codes follow the BSD sysexits.h conventions where possible:
//! - 0: Success
//! - 64-78: Standard exit codes from sysexits.h
//! - 100+: Custom application-specific codes

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NimbusExitCode {
    /// Success (0) - Command completed successfully
    Success = 0,

    /// Command line usage error (64) - User input error
    UsageError = 64,

    /// Data format error (65) - Input data was incorrect
    DataError = 65,

    /// Addressee unknown (67) - Resource not found
    NotFound = 67,

    /// Service unavailable (69) - Temporary service error
    TempFail = 69,

    /// Internal software error (70) - Unexpected application error
    SoftwareError = 70,

    /// Configuration error (78) - Application configuration issue
    ConfigError = 78,

    /// Authentication error (100) - Login or token issues
    AuthError = 100,

    /// Network error (101) - Connection or communication issues
    NetworkError = 101,

    /// API error (102) - Remote API returned an error
    ApiError = 102,

    /// Task error (103) - A provider task finished with an error
    TaskError = 103,
}

impl NimbusExitCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn message(&self) -> &'static str {
        match self {
            NimbusExitCode::Success => "Success",
            NimbusExitCode::UsageError => "Command line usage error",
            NimbusExitCode::DataError => "Data format error",
            NimbusExitCode::NotFound => "Resource not found",
            NimbusExitCode::TempFail => "Temporary failure",
            NimbusExitCode::SoftwareError => "Internal software error",
            NimbusExitCode::ConfigError => "Configuration error",
            NimbusExitCode::AuthError => "Authentication error",
            NimbusExitCode::NetworkError => "Network communication error",
            NimbusExitCode::ApiError => "Remote API error",
            NimbusExitCode::TaskError => "Provider task failed",
        }
    }
}

impl From<NimbusExitCode> for i32 {
    fn from(code: NimbusExitCode) -> Self {
        code.code()
    }
}
