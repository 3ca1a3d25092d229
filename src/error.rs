use thiserror::Error;

/// Errors that can occur while encoding measurements or setting up a sender.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// A custom error with a free-form message.
    #[error("Custom error: {0}")]
    Custom(String),

    /// An I/O error from the standard library.
    #[error("Std Io error: {0}")]
    StdIo(#[from] std::io::Error),

    /// The measurement has an empty name.
    #[error("Measurement name is empty")]
    EmptyName,

    /// The measurement has no field that can be written in line protocol.
    #[error("Measurement {0} has no encodable field")]
    NoFields(String),

    /// The measurement holds a name, key or tag value that line protocol
    /// cannot carry without changing it.
    #[error("Measurement cannot be written in line protocol: {0}")]
    Unrepresentable(String),

    /// The destination host did not resolve to any socket address.
    #[error("Cannot resolve UDP destination {host}:{port}")]
    UnresolvedDestination {
        /// Host as given in the protocol descriptor.
        host: String,
        /// Port as given in the protocol descriptor.
        port: u16,
    },

    /// A sender or reporter option is out of range.
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

impl From<String> for MetricsError {
    fn from(value: String) -> Self {
        Self::Custom(value)
    }
}

impl From<&str> for MetricsError {
    fn from(value: &str) -> Self {
        Self::Custom(value.to_string())
    }
}
