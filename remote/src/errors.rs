use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProtocolError {
    Timeout,
    Malformed,
    WrongShape,
    UnacceptableName,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Timeout => write!(f, "the peer did not respond in time"),
            ProtocolError::Malformed => write!(f, "the peer sent malformed JSON"),
            ProtocolError::WrongShape => write!(f, "the peer's reply had the wrong shape"),
            ProtocolError::UnacceptableName => write!(f, "the peer's name was empty or too long"),
        }
    }
}

impl std::error::Error for ProtocolError {}
