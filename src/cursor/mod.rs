pub(crate) mod ext;
pub(crate) mod pg;
pub(crate) mod sequence;

use crate::cursor::sequence::{RowSequence, sequence_of};

/// A stateful, forward-only handle over the rows of a query result.
///
/// Advancing takes `&self` so that every [`RowHandle`](crate::RowHandle)
/// produced by a [`RowSequence`] can keep sharing the same borrow while the
/// sequence moves on. Implementations are expected to use interior
/// mutability and are not meant to be shared across threads.
pub trait Cursor {
    type Error: std::error::Error + 'static;

    /// Moves to the next row. Returns `false` once the result is exhausted.
    fn advance(&self) -> Result<bool, Self::Error>;

    /// Whether the most recent column read returned SQL `NULL`.
    ///
    /// Only meaningful right after a [`ReadColumn::read_column`] call and
    /// before any other cursor operation.
    fn was_null(&self) -> bool;
}

/// Typed, zero-based column access on the row a [`Cursor`] is positioned on.
///
/// Reading a non-optional `T` from a `NULL` column yields a default value and
/// sets the null flag; reading `Option<T>` yields `None` and sets it as well.
pub trait ReadColumn<T>: Cursor {
    fn read_column(&self, column: usize) -> Result<T, Self::Error>;
}

/// Extension trait adding [`rows`](CursorExt::rows) to every [`Cursor`].
pub trait CursorExt: Cursor {
    /// Returns a lazy sequence over the remaining rows of this cursor.
    ///
    /// See [`sequence_of`] for the lifetime obligations this places on the caller.
    fn rows(&self) -> RowSequence<'_, Self> {
        sequence_of(self)
    }
}

impl<C: Cursor + ?Sized> CursorExt for C {}
