#[derive(Debug, thiserror::Error)]
pub enum PatientorError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("entry form has {0} validation error(s)")]
    InvalidForm(usize),
    #[error("diagnosis code is missing or wrong: {0}")]
    UnknownDiagnosisCode(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("failed to deserialise response: {0}")]
    Deserialization(String),
}

impl PatientorError {
    /// The message a user should see for a failed submission.
    ///
    /// For rejections this is the server-provided `error` string verbatim.
    pub fn user_message(&self) -> String {
        match self {
            PatientorError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type PatientorResult<T> = std::result::Result<T, PatientorError>;
