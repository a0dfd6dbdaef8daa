//! CLI error handling with user-friendly messages.

use std::fmt;
use std::process;

use mapstitch::config::ConfigFileError;
use mapstitch::error::StitchError;
use mapstitch::provider::TransportError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be loaded
    Config(String),
    /// Bad command-line arguments
    InvalidArgument(String),
    /// HTTP client could not be built
    Client(TransportError),
    /// Stitching failed
    Stitch(StitchError),
    /// Failed to write the output image
    FileWrite { path: String, error: std::io::Error },
    /// HTTP server error
    Serve(std::io::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Stitch(StitchError::QuotaExceeded { .. }) => {
                eprintln!();
                eprintln!("Try a lower --zoom or a smaller extent.");
            }
            CliError::Serve(_) => {
                eprintln!();
                eprintln!("Is another process already listening on that address?");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Client(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Stitch(e) => write!(f, "Stitching failed: {}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
            CliError::Serve(e) => write!(f, "HTTP server error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Client(e) => Some(e),
            CliError::Stitch(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            CliError::Serve(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StitchError> for CliError {
    fn from(e: StitchError) -> Self {
        CliError::Stitch(e)
    }
}

impl From<TransportError> for CliError {
    fn from(e: TransportError) -> Self {
        CliError::Client(e)
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}
