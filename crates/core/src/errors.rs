use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

/// Failures reported by the external catalog/history store.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Transport(String),
    #[error("store rejected credentials: {0}")]
    Unauthorized(String),
    #[error("store returned a malformed payload: {0}")]
    Malformed(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("no catalog item matches `{0}`")]
    NotFound(String),
    #[error("catalog query must not be empty")]
    EmptyQuery,
    #[error("upstream failure: {0}")]
    Upstream(String),
}

impl From<StoreError> for EngineError {
    fn from(value: StoreError) -> Self {
        Self::Upstream(value.to_string())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("upstream unavailable: {message}")]
    UpstreamUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => {
                "No matching record was found. Check the query and try again."
            }
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::UpstreamUnavailable { .. } => {
                "The ERP service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::NotFound { correlation_id, .. }
            | Self::BadRequest { correlation_id, .. }
            | Self::UpstreamUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::BadRequest { .. } => 400,
            Self::UpstreamUnavailable { .. } => 502,
            Self::Internal { .. } => 500,
        }
    }
}

impl EngineError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::UpstreamUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<EngineError> for InterfaceError {
    fn from(value: EngineError) -> Self {
        let message = value.to_string();
        let correlation_id = "unassigned".to_owned();
        match value {
            EngineError::NotFound(_) => Self::NotFound { message, correlation_id },
            EngineError::EmptyQuery => Self::BadRequest { message, correlation_id },
            EngineError::Upstream(_) => Self::UpstreamUnavailable { message, correlation_id },
        }
    }
}
