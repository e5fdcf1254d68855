use thiserror::Error;

/// Errors surfaced on the control side. The audio path never produces them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthError {
    #[error("control queue is full")]
    QueueFull,
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),
    #[error("invalid value {value:?} for parameter {name}")]
    InvalidValue { name: String, value: String },
    #[error("invalid engine config: {0}")]
    InvalidConfig(&'static str),
}
