//! Lazy, single-pass row sequences over forward-only database cursors, plus
//! helpers for nullable timestamp columns.
//!
//! # Example
//! ```no_run
//! use postgres::{Client, NoTls};
//! use cursor_sequence::{CursorExt, CursorOptions, TransactionExt};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = Client::connect("host=localhost user=postgres", NoTls)?;
//!
//!     // Cursors require to be declared inside a transaction
//!     let mut tx = client.transaction()?;
//!
//!     let options = CursorOptions::default().with_batch_size(10);
//!     let cursor = tx.query_cursor("SELECT id, updated_at FROM my_table", &options)?;
//!
//!     // Every pull advances the cursor by one row
//!     for row in cursor.rows() {
//!         let row = row?;
//!         let id: i64 = row.read(0)?;
//!         let updated_at = row.optional_date_time(1)?;
//!         println!("#{} id={id} updated_at={updated_at:?}", row.index());
//!     }
//!
//!     // Explicitly closing cursor is highly recommended
//!     cursor.close()?;
//!     drop(cursor);
//!     tx.commit()?;
//!     Ok(())
//! }
//! ```
//!
//! # Sequences
//! [`sequence_of`] (or [`CursorExt::rows`]) wraps any [`Cursor`] into a
//! [`RowSequence`]. Nothing is fetched until the sequence is pulled, and each
//! pull advances the cursor exactly once. A [`RowHandle`] only records the
//! cursor and the row's ordinal: its columns have to be read before the next
//! pull.
//!
//! A failing advance is yielded once as an [`AdvanceError`] carrying the full
//! text of the original error, after which the sequence is over.
//!
//! # Cursor lifetime
//! The sequence borrows its cursor and never closes it. The cursor has to
//! remain open until the sequence is fully consumed; closing it early makes
//! every later pull fail. [`TransactionExt::query_rows`] scopes the sequence
//! to a closure and closes the cursor once the closure returns.
//!
//! # Queries
//! [`query_cursor`](crate::TransactionExt::query_cursor) will create
//! a new instance of [`PgCursor`]
//! which will execute the following query to declare a cursor:
//! ```sql
//! DECLARE "<cursor>" NO SCROLL CURSOR FOR <query>
//! ```
//!
//! Rows are fetched in batches with:
//! ```sql
//! FETCH FORWARD <batch_size> FROM "<cursor>"
//! ```
//! A batch shorter than `batch_size` marks the cursor as drained and no
//! further round-trips are made.
//!
//! # Vulnerabilities
//! It's up to the user to ensure that the query passed to
//! [`query_cursor`](crate::TransactionExt::query_cursor) is safe
//! from SQL injection vulnerabilities.

mod column;
mod config;
mod cursor;
mod error;

pub use crate::column::{
    Timestamp, read_optional_column_value, read_optional_date_time, write_required_timestamp,
    write_timestamp,
};
pub use crate::config::{CursorOptions, DEFAULT_BATCH_SIZE};
pub use crate::cursor::ext::TransactionExt;
pub use crate::cursor::pg::PgCursor;
pub use crate::cursor::sequence::{RowHandle, RowSequence, sequence_of};
pub use crate::cursor::{Cursor, CursorExt, ReadColumn};
pub use crate::error::{AdvanceError, PgCursorError};
