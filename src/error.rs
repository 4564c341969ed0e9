use std::error::Error as StdError;
use thiserror::Error;

/// Failure raised by a [`RowSequence`](crate::RowSequence) when the
/// underlying cursor could not advance.
///
/// The cursor's own error type is erased at the sequence boundary, so the
/// full diagnostic text of the original failure (its type, message and every
/// `source()` in the chain) is rendered into [`message`](Self::message).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AdvanceError {
    index: usize,
    message: String,
}

impl AdvanceError {
    pub(crate) fn new<E>(index: usize, err: &E) -> Self
    where
        E: StdError + ?Sized,
    {
        Self {
            index,
            message: render_chain(err),
        }
    }

    /// Ordinal of the row the sequence was trying to produce.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

fn render_chain<E>(err: &E) -> String
where
    E: StdError + ?Sized,
{
    let mut message = format!("{}: {err}", std::any::type_name::<E>());
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!("\nCaused by: {cause}"));
        source = cause.source();
    }
    message
}

/// Errors raised by [`PgCursor`](crate::PgCursor) and
/// [`TransactionExt`](crate::TransactionExt).
#[derive(Debug, Error)]
pub enum PgCursorError {
    /// Any error reported by the `postgres` driver.
    #[error(transparent)]
    Postgres(#[from] postgres::Error),

    /// The cursor was closed before it was advanced or read.
    #[error("Cursor \"{0}\" is closed")]
    Closed(String),

    /// A column was read while the cursor was not positioned on a row.
    #[error("Cursor \"{0}\" is not positioned on a row")]
    NoCurrentRow(String),

    /// The supplied [`CursorOptions`](crate::CursorOptions) are unusable.
    #[error("Invalid cursor options: {0}")]
    InvalidOptions(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug, Error)]
    #[error("failed to fetch row 4")]
    struct FetchFailed {
        #[source]
        source: io::Error,
    }

    #[test]
    fn test_message_keeps_type_and_cause_chain() {
        let err = FetchFailed {
            source: io::Error::new(io::ErrorKind::ConnectionReset, "peer reset the connection"),
        };

        let advance = AdvanceError::new(4, &err);

        assert_eq!(advance.index(), 4);
        assert!(advance.message().contains("FetchFailed: failed to fetch row 4"));
        assert!(advance.message().contains("\nCaused by: peer reset the connection"));
        assert_eq!(advance.to_string(), advance.message());
    }

    #[derive(Debug, Error)]
    #[error("fetch aborted")]
    struct FetchAborted {
        #[source]
        source: FetchFailed,
    }

    #[test]
    fn test_message_lists_every_cause_in_order() {
        let err = FetchAborted {
            source: FetchFailed {
                source: io::Error::new(io::ErrorKind::TimedOut, "read timed out"),
            },
        };

        let advance = AdvanceError::new(2, &err);

        let lines: Vec<&str> = advance.message().lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("FetchAborted: fetch aborted"));
        assert_eq!(lines[1], "Caused by: failed to fetch row 4");
        assert_eq!(lines[2], "Caused by: read timed out");
    }

    #[test]
    fn test_message_without_source() {
        let err = PgCursorError::Closed("rows".to_string());

        let advance = AdvanceError::new(0, &err);

        assert!(advance.message().ends_with("PgCursorError: Cursor \"rows\" is closed"));
        assert!(!advance.message().contains("Caused by"));
    }
}
