//! Errors reported by event dispatch.

use std::error::Error as StdError;

use thiserror::Error;

use crate::ConnectionId;

/// The error type a fallible callback may return.
///
/// Any error that is `Send + Sync + 'static` converts into this via `?` or `.into()`.
pub type CallbackError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors that can occur when dispatching an event.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A callback returned an error. The dispatch pass was aborted at this callback, so callbacks
    /// connected after it were not invoked in that pass.
    #[error("callback for connection {connection} failed")]
    CallbackFailed {
        /// The connection whose callback failed.
        connection: ConnectionId,

        /// The error returned by the callback.
        #[source]
        source: CallbackError,
    },
}

impl Error {
    /// The connection whose callback caused the dispatch to fail.
    #[must_use]
    pub fn connection(&self) -> ConnectionId {
        match self {
            Self::CallbackFailed { connection, .. } => *connection,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;
    use std::io;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug, StdError);

    #[test]
    fn callback_failed_exposes_connection_and_source() {
        let error = Error::CallbackFailed {
            connection: ConnectionId::new(7),
            source: io::Error::other("disk on fire").into(),
        };

        assert_eq!(error.connection(), ConnectionId::new(7));

        let source = error.source().expect("callback failures always carry a source");
        assert_eq!(source.to_string(), "disk on fire");
    }

    #[test]
    fn message_names_the_connection() {
        let error = Error::CallbackFailed {
            connection: ConnectionId::new(3),
            source: "nope".into(),
        };

        assert!(error.to_string().contains('3'));
    }
}
