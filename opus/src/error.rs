//! Error types for libopus calls.

use std::os::raw::c_int;

use thiserror::Error;

use crate::ffi;

/// Result type alias for opus operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by libopus or by the checks that mirror it.
///
/// Every variant corresponds to one native error code. The message is the
/// text libopus itself reports for that code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// One or more invalid or out of range arguments.
    #[error("opus: {0}")]
    BadArg(String),

    /// Not enough bytes allocated in a buffer.
    #[error("opus: {0}")]
    BufferTooSmall(String),

    /// An internal error was detected.
    #[error("opus: {0}")]
    InternalError(String),

    /// The compressed data passed is corrupted.
    #[error("opus: {0}")]
    InvalidPacket(String),

    /// Invalid or unsupported request number.
    #[error("opus: {0}")]
    Unimplemented(String),

    /// An encoder or decoder structure is invalid or already freed.
    #[error("opus: {0}")]
    InvalidState(String),

    /// Memory allocation failed.
    #[error("opus: {0}")]
    AllocFail(String),

    /// A code libopus returned that has no known meaning.
    #[error("opus: {message} (code={code})")]
    Unknown { code: i32, message: String },
}

impl Error {
    /// Translates a native error code.
    pub fn from_code(code: c_int) -> Self {
        let message = ffi::error_string(code);
        match code {
            ffi::OPUS_BAD_ARG => Error::BadArg(message),
            ffi::OPUS_BUFFER_TOO_SMALL => Error::BufferTooSmall(message),
            ffi::OPUS_INTERNAL_ERROR => Error::InternalError(message),
            ffi::OPUS_INVALID_PACKET => Error::InvalidPacket(message),
            ffi::OPUS_UNIMPLEMENTED => Error::Unimplemented(message),
            ffi::OPUS_INVALID_STATE => Error::InvalidState(message),
            ffi::OPUS_ALLOC_FAIL => Error::AllocFail(message),
            code => Error::Unknown { code, message },
        }
    }

    pub(crate) fn bad_arg() -> Self {
        Self::from_code(ffi::OPUS_BAD_ARG)
    }

    pub(crate) fn buffer_too_small() -> Self {
        Self::from_code(ffi::OPUS_BUFFER_TOO_SMALL)
    }

    pub(crate) fn invalid_packet() -> Self {
        Self::from_code(ffi::OPUS_INVALID_PACKET)
    }

    pub(crate) fn unimplemented() -> Self {
        Self::from_code(ffi::OPUS_UNIMPLEMENTED)
    }

    pub(crate) fn invalid_state() -> Self {
        Self::from_code(ffi::OPUS_INVALID_STATE)
    }

    /// Returns the native error code.
    pub fn code(&self) -> i32 {
        match self {
            Error::BadArg(_) => ffi::OPUS_BAD_ARG,
            Error::BufferTooSmall(_) => ffi::OPUS_BUFFER_TOO_SMALL,
            Error::InternalError(_) => ffi::OPUS_INTERNAL_ERROR,
            Error::InvalidPacket(_) => ffi::OPUS_INVALID_PACKET,
            Error::Unimplemented(_) => ffi::OPUS_UNIMPLEMENTED,
            Error::InvalidState(_) => ffi::OPUS_INVALID_STATE,
            Error::AllocFail(_) => ffi::OPUS_ALLOC_FAIL,
            Error::Unknown { code, .. } => *code,
        }
    }

    /// Returns the native message for this error.
    pub fn message(&self) -> &str {
        match self {
            Error::BadArg(m)
            | Error::BufferTooSmall(m)
            | Error::InternalError(m)
            | Error::InvalidPacket(m)
            | Error::Unimplemented(m)
            | Error::InvalidState(m)
            | Error::AllocFail(m) => m,
            Error::Unknown { message, .. } => message,
        }
    }
}

/// Converts a native return value: negative values become errors,
/// everything else is passed through.
pub fn check(ret: c_int) -> Result<i32> {
    if ret < 0 {
        return Err(Error::from_code(ret));
    }
    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_maps_every_native_code() {
        let cases = [
            (ffi::OPUS_BAD_ARG, "BadArg"),
            (ffi::OPUS_BUFFER_TOO_SMALL, "BufferTooSmall"),
            (ffi::OPUS_INTERNAL_ERROR, "InternalError"),
            (ffi::OPUS_INVALID_PACKET, "InvalidPacket"),
            (ffi::OPUS_UNIMPLEMENTED, "Unimplemented"),
            (ffi::OPUS_INVALID_STATE, "InvalidState"),
            (ffi::OPUS_ALLOC_FAIL, "AllocFail"),
        ];
        for (code, name) in cases {
            let err = Error::from_code(code);
            assert_eq!(err.code(), code);
            assert!(format!("{:?}", err).starts_with(name), "{:?}", err);
        }
    }

    #[test]
    fn test_unknown_code_keeps_number() {
        let err = Error::from_code(-42);
        assert_eq!(err.code(), -42);
        assert!(matches!(err, Error::Unknown { code: -42, .. }));
        assert!(err.to_string().contains("-42"));
    }

    #[test]
    fn test_messages_come_from_libopus() {
        assert_eq!(Error::bad_arg().message(), "invalid argument");
        assert_eq!(Error::buffer_too_small().message(), "buffer too small");
        assert_eq!(Error::invalid_packet().message(), "corrupted stream");
        assert_eq!(Error::unimplemented().message(), "request not implemented");
        assert_eq!(Error::invalid_state().message(), "invalid state");
    }

    #[test]
    fn test_check() {
        assert_eq!(check(0), Ok(0));
        assert_eq!(check(17), Ok(17));
        assert_eq!(check(ffi::OPUS_BAD_ARG), Err(Error::bad_arg()));
    }
}
