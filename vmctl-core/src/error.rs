use thiserror::Error;

#[derive(Error, Debug)]
pub enum VmctlError {
    /// The control binary could not be located when the target was built.
    #[error("vmrun executable not found: {0}")]
    Resolution(String),

    #[error("Failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Only produced when strict exit-code checking is enabled.
    #[error("vmrun exited with status {code:?}:\n{}", output.join("\n"))]
    ExternalTool {
        code: Option<i32>,
        output: Vec<String>,
    },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl VmctlError {
    /// Short hint shown under the error by the CLI.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Resolution(_) => Some(
                "Install VMware Workstation/Fusion, add vmrun to PATH, or pass --vmrun-path",
            ),
            Self::Launch { source, .. }
                if source.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                Some("Check that the vmrun binary is executable")
            }
            Self::Timeout(_) => Some("Increase --timeout or check that the VM is responsive"),
            _ => None,
        }
    }
}

impl From<serde_yaml_ng::Error> for VmctlError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        VmctlError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VmctlError>;
