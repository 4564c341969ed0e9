use std::{fmt, iter::FusedIterator};

use chrono::NaiveDateTime;
use tracing::{debug, trace};

use crate::{
    column::{Timestamp, read_optional_date_time},
    cursor::{Cursor, ReadColumn},
    error::AdvanceError,
};

/// Creates a lazy, single-pass sequence over the remaining rows of `cursor`.
///
/// Nothing is fetched until the sequence is pulled. Every pull advances the
/// cursor exactly once.
///
/// The cursor must stay open for the whole span between this call and the
/// moment the sequence is fully consumed. The borrow prevents the cursor from
/// being dropped early, but a cursor that is explicitly closed in the meantime
/// makes the next pull fail with an [`AdvanceError`]. Closing the cursor
/// afterwards remains the caller's job; the sequence never does it.
pub fn sequence_of<C: Cursor + ?Sized>(cursor: &C) -> RowSequence<'_, C> {
    RowSequence::new(cursor)
}

/// Position of one row produced by a [`RowSequence`].
///
/// A handle does not copy any column data. It is only valid to read through
/// it until the sequence is pulled again, since advancing the cursor replaces
/// the row it points at.
pub struct RowHandle<'c, C: ?Sized> {
    cursor: &'c C,
    index: usize,
}

impl<'c, C: ?Sized> RowHandle<'c, C> {
    /// The cursor this row was read from.
    pub fn cursor(&self) -> &'c C {
        self.cursor
    }

    /// Zero-based ordinal of this row within its sequence.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<C: Cursor + ?Sized> RowHandle<'_, C> {
    /// Reads column `column` of this row through the cursor.
    pub fn read<T>(&self, column: usize) -> Result<T, C::Error>
    where
        C: ReadColumn<T>,
    {
        self.cursor.read_column(column)
    }

    /// Shorthand for [`read_optional_date_time`] on this row.
    pub fn optional_date_time(&self, column: usize) -> Result<Option<NaiveDateTime>, C::Error>
    where
        C: ReadColumn<Option<Timestamp>>,
    {
        read_optional_date_time(self.cursor, column)
    }
}

impl<C: ?Sized> Clone for RowHandle<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ?Sized> Copy for RowHandle<'_, C> {}

impl<C: ?Sized> fmt::Debug for RowHandle<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowHandle")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// Lazy, forward-only sequence of [`RowHandle`]s over a borrowed [`Cursor`].
///
/// Implements [`Iterator`] with `Result` items: an advance failure is yielded
/// once as `Err` and the sequence ends. Use [`has_next`](Self::has_next) and
/// [`next_row`](Self::next_row) when the check and the fetch need to happen
/// as separate steps.
pub struct RowSequence<'c, C: ?Sized> {
    cursor: &'c C,
    next_index: usize,
    lookahead: Option<RowHandle<'c, C>>,
    finished: bool,
}

impl<'c, C: Cursor + ?Sized> RowSequence<'c, C> {
    pub fn new(cursor: &'c C) -> Self {
        Self {
            cursor,
            next_index: 0,
            lookahead: None,
            finished: false,
        }
    }

    /// Advances the cursor and caches the resulting row, if any.
    ///
    /// The cursor is advanced only when no row is cached yet, so calling this
    /// repeatedly before [`next_row`](Self::next_row) does not skip rows.
    pub fn has_next(&mut self) -> Result<bool, AdvanceError> {
        if self.lookahead.is_some() {
            return Ok(true);
        }
        if self.finished {
            return Ok(false);
        }

        match self.cursor.advance() {
            Ok(true) => {
                self.lookahead = Some(RowHandle {
                    cursor: self.cursor,
                    index: self.next_index,
                });
                self.next_index += 1;
                Ok(true)
            }
            Ok(false) => {
                self.finished = true;
                trace!(rows = self.next_index, "cursor exhausted");
                Ok(false)
            }
            Err(err) => {
                self.finished = true;
                debug!(index = self.next_index, error = %err, "cursor advance failed");
                Err(AdvanceError::new(self.next_index, &err))
            }
        }
    }

    /// Takes the row cached by the last [`has_next`](Self::has_next) call.
    pub fn next_row(&mut self) -> Option<RowHandle<'c, C>> {
        self.lookahead.take()
    }

    /// The cursor this sequence advances.
    pub fn cursor(&self) -> &'c C {
        self.cursor
    }

    /// Number of rows handed out or cached so far.
    pub fn produced(&self) -> usize {
        self.next_index
    }
}

impl<'c, C: Cursor + ?Sized> Iterator for RowSequence<'c, C> {
    type Item = Result<RowHandle<'c, C>, AdvanceError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.has_next() {
            Ok(true) => self.next_row().map(Ok),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let cached = usize::from(self.lookahead.is_some());
        if self.finished {
            (cached, Some(cached))
        } else {
            (cached, None)
        }
    }
}

impl<C: Cursor + ?Sized> FusedIterator for RowSequence<'_, C> {}

impl<C: ?Sized> fmt::Debug for RowSequence<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowSequence")
            .field("next_index", &self.next_index)
            .field("lookahead", &self.lookahead)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
