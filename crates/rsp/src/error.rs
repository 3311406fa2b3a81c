use std::error::Error as StdError;
use std::fmt;
use std::io;
use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync>;

/// The only error a format writer returns.
///
/// Both encoding failures (payload not representable as JSON/XML) and transmit
/// failures (sink closed, client gone) surface as this value. The cause stays
/// reachable through [`StdError::source`] for logging, but carries no kind a
/// caller could branch on.
#[derive(Error)]
#[error("failed to write message to http response")]
pub struct WriteFailed {
    #[source]
    source: BoxError,
}

impl WriteFailed {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self { source: Box::new(e.into()) }
    }

    pub fn encode<E: Into<BoxError>>(e: E) -> Self {
        Self { source: e.into() }
    }
}

impl fmt::Debug for WriteFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteFailed").field("source", &self.source.to_string()).finish()
    }
}

/// A JSONP callback name that is not a dotted javascript identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidCallback {
    #[error("jsonp callback is empty")]
    Empty,

    #[error("jsonp callback `{name}` is not a javascript identifier path")]
    IllegalName { name: String },

    #[error("invalid query string: {reason}")]
    InvalidQuery { reason: String },
}

impl InvalidCallback {
    pub fn illegal_name<S: ToString>(name: S) -> Self {
        Self::IllegalName { name: name.to_string() }
    }

    pub fn invalid_query<S: ToString>(reason: S) -> Self {
        Self::InvalidQuery { reason: reason.to_string() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("response config has already been installed")]
    AlreadyInstalled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_failed_hides_kind_but_keeps_source() {
        let transmit = WriteFailed::io(io::Error::from(io::ErrorKind::BrokenPipe));
        let encode = WriteFailed::encode("key must be a string");

        assert_eq!(transmit.to_string(), encode.to_string());
        assert_eq!(transmit.to_string(), "failed to write message to http response");

        assert!(transmit.source().is_some());
        assert_eq!(encode.source().map(ToString::to_string).as_deref(), Some("key must be a string"));
    }

    #[test]
    fn invalid_callback_message() {
        let err = InvalidCallback::illegal_name("alert(1)//");
        assert_eq!(err.to_string(), "jsonp callback `alert(1)//` is not a javascript identifier path");
    }
}
