pub type RotResult<T> = Result<T, RotError>;

#[derive(thiserror::Error, Debug)]
pub enum RotError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("unreadable input: {0}")]
    UnreadableInput(String),

    #[error("tool execution failed: {0}")]
    ToolExecution(String),

    #[error("output write failed: {0}")]
    OutputWrite(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RotError {
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn unreadable_input(msg: impl Into<String>) -> Self {
        Self::UnreadableInput(msg.into())
    }

    pub fn tool_execution(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    pub fn output_write(msg: impl Into<String>) -> Self {
        Self::OutputWrite(msg.into())
    }
}
