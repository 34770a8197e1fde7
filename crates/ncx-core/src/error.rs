#[derive(thiserror::Error, Debug)]
pub enum NcxError {
    #[error("Wordlist '{path}' contains no entries")]
    EmptyWordlist { path: String },

    #[error("Invalid service spec '{0}': expected <service>://<host>[:<port>]")]
    InvalidServiceSpec(String),

    #[error("Unknown service '{0}': no default port, specify one explicitly")]
    UnknownService(String),

    #[error("Invalid port '{0}'")]
    InvalidPort(String),

    #[error(
        "Invalid connection limits for '{service}': min {min} must be between 1 and max {max}"
    )]
    InvalidConnectionLimits { service: String, min: u32, max: u32 },
}
