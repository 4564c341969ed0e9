use postgres::Transaction;

use crate::{
    config::CursorOptions,
    cursor::{
        pg::PgCursor,
        sequence::{RowSequence, sequence_of},
    },
    error::PgCursorError,
};

/// Extension trait for
/// [`Transaction`](https://docs.rs/postgres/latest/postgres/struct.Transaction.html)
/// to add cursor support.
pub trait TransactionExt<'c> {
    /// Declares a new [`PgCursor`] for the given query.
    ///
    /// Parameters:
    /// - `query`: The SQL query for which the cursor will be declared.
    /// - `options`: Batch size and, optionally, the cursor name.
    fn query_cursor(
        &mut self,
        query: &str,
        options: &CursorOptions,
    ) -> Result<PgCursor<'_, 'c>, PgCursorError>;

    /// Declares a cursor, hands its rows to `extract` and closes the cursor
    /// once `extract` returns.
    ///
    /// The sequence cannot escape `extract`, so every row is consumed while
    /// the cursor is still open.
    fn query_rows<R, F>(
        &mut self,
        query: &str,
        options: &CursorOptions,
        extract: F,
    ) -> Result<R, PgCursorError>
    where
        F: FnOnce(RowSequence<'_, PgCursor<'_, 'c>>) -> R;
}

/// Implementation of [`TransactionExt`] for
/// [`Transaction`](https://docs.rs/postgres/latest/postgres/struct.Transaction.html)
impl<'c> TransactionExt<'c> for Transaction<'c> {
    /// Errors:
    /// - [`PgCursorError::InvalidOptions`] if `options` cannot be used
    /// - Propagates
    ///   [`postgres::Error`](https://docs.rs/postgres/latest/postgres/struct.Error.html)
    ///   if the cursor declaration fails
    fn query_cursor(
        &mut self,
        query: &str,
        options: &CursorOptions,
    ) -> Result<PgCursor<'_, 'c>, PgCursorError> {
        PgCursor::declare(self, query, options)
    }

    fn query_rows<R, F>(
        &mut self,
        query: &str,
        options: &CursorOptions,
        extract: F,
    ) -> Result<R, PgCursorError>
    where
        F: FnOnce(RowSequence<'_, PgCursor<'_, 'c>>) -> R,
    {
        let cursor = self.query_cursor(query, options)?;
        let output = extract(sequence_of(&cursor));
        cursor.close()?;
        Ok(output)
    }
}
