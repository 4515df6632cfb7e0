//! Error types for sanwatch.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for sanwatch operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Remote command execution errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Fleet configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Report/backup output errors
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// symcli emitted XML that does not parse
    #[error("Malformed symcli XML: {0}")]
    Xml(#[from] roxmltree::Error),
}

/// Transport layer errors (SSH sessions, local vendor CLIs).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Session negotiation failed in a way known to be transient
    /// (the NX-OS host-key-algorithm race rejects the login).
    /// Recovered by the session retry policy.
    #[error("Session negotiation failed for {host}: {message}")]
    Session { host: String, message: String },

    /// SSH protocol error on an established session
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication rejected; not retried, the credentials are wrong
    #[error("Authentication failed for user '{user}' on {host}")]
    AuthenticationFailed { user: String, host: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Operation timed out
    #[error("No response within {0:?}")]
    Timeout(Duration),

    /// Failed to spawn a local vendor CLI
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Fleet configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not read the fleet configuration file
    #[error("Cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration file did not parse
    #[error("Cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },

    /// A device named on the command line is not in the fleet.
    /// Fatal to the invocation; no device is contacted.
    #[error("Unknown device '{name}' - not in the configured fleet")]
    UnknownDevice { name: String },

    /// A credential environment variable is unset
    #[error("Credential variable '{var}' for device '{device}' is not set")]
    MissingCredential { var: String, device: String },
}

/// Report and backup output errors. Fatal, never retried.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Could not write a backup or output file
    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type alias using sanwatch's Error.
pub type Result<T> = std::result::Result<T, Error>;
