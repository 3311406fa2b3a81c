//! Result codes carried by every enveloped response.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// An immutable `(code, msg)` pair identifying the outcome of a request.
///
/// Applications usually declare their failure codes as constants:
///
/// ```
/// use micro_rsp::RetCode;
///
/// const USER_NOT_FOUND: RetCode = RetCode::from_static("10404", "user not found");
/// assert_eq!(USER_NOT_FOUND.code(), "10404");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RetCode {
    code: Cow<'static, str>,
    msg: Cow<'static, str>,
}

impl RetCode {
    /// The built-in success code, `("0", "Success")`.
    pub const SUCCESS: RetCode = RetCode::from_static("0", "Success");

    /// Creates a code from static strings, usable in `const` items.
    pub const fn from_static(code: &'static str, msg: &'static str) -> Self {
        Self { code: Cow::Borrowed(code), msg: Cow::Borrowed(msg) }
    }

    /// Creates a code from owned or borrowed strings, e.g. a message built at runtime.
    pub fn new(code: impl Into<Cow<'static, str>>, msg: impl Into<Cow<'static, str>>) -> Self {
        Self { code: code.into(), msg: msg.into() }
    }

    /// The machine readable code, written as the envelope `code`.
    #[inline]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The human readable message, written as the envelope `msg`.
    #[inline]
    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// Returns a copy of this code with a different message, keeping the code.
    pub fn with_msg(&self, msg: impl Into<Cow<'static, str>>) -> Self {
        Self { code: self.code.clone(), msg: msg.into() }
    }
}

impl Default for RetCode {
    fn default() -> Self {
        Self::SUCCESS
    }
}

impl fmt::Display for RetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.msg)
    }
}
