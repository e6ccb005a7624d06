use thiserror::Error;

#[derive(Debug, Error)]
pub enum SysError {
    /// The key, service, task or process does not exist.
    #[error("{what} not found: {name}")]
    NotFound { what: &'static str, name: String },

    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The target is mid-transition (starting, stopping) and may accept the
    /// request shortly.
    #[error("{name} is busy: {detail}")]
    Transient { name: String, detail: String },

    #[error("`{program}` timed out after {secs}s")]
    Timeout { program: String, secs: u64 },

    #[error("`{program}` exited with code {code}: {detail}")]
    CommandFailed {
        program: String,
        code: i32,
        detail: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not supported on this platform: {0}")]
    Unsupported(String),
}

impl SysError {
    pub(crate) fn not_found(what: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            name: name.into(),
        }
    }

    /// The target is absent; callers treat this as already satisfied.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Worth retrying after a short backoff.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}
