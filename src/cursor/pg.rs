use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    sync::atomic::{AtomicUsize, Ordering},
};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use postgres::{
    Row, Transaction,
    types::{FromSql, Type},
};
use tracing::{debug, trace, warn};

use crate::{
    column::{Timestamp, write_required_timestamp},
    config::CursorOptions,
    cursor::{Cursor, ReadColumn},
    error::PgCursorError,
};

static NEXT_CURSOR_ID: AtomicUsize = AtomicUsize::new(0);

/// Server-side PostgreSQL cursor declared inside a [`Transaction`].
///
/// Rows are pulled with `FETCH FORWARD <batch_size>` whenever the previous
/// batch runs dry, and handed out one at a time through [`Cursor::advance`].
/// The cursor is closed by [`close`](Self::close), or on drop if it is still
/// open at that point.
pub struct PgCursor<'t, 'c> {
    tx: RefCell<&'t mut Transaction<'c>>,
    name: String,
    batch_size: usize,
    state: RefCell<FetchState>,
    was_null: Cell<bool>,
}

#[derive(Default)]
struct FetchState {
    batch: VecDeque<Row>,
    current: Option<Row>,
    drained: bool,
    closed: bool,
}

impl<'t, 'c> PgCursor<'t, 'c> {
    pub(crate) fn declare(
        tx: &'t mut Transaction<'c>,
        query: &str,
        options: &CursorOptions,
    ) -> Result<Self, PgCursorError> {
        options.validate()?;
        let name = options.name.clone().unwrap_or_else(|| {
            format!(
                "cursor_sequence_{}",
                NEXT_CURSOR_ID.fetch_add(1, Ordering::Relaxed)
            )
        });

        let declare = format!(
            "DECLARE {} NO SCROLL CURSOR FOR {}",
            quote_ident(&name),
            query
        );
        tx.execute(declare.as_str(), &[])?;
        debug!(cursor = %name, batch_size = options.batch_size, "declared cursor");

        Ok(Self {
            tx: RefCell::new(tx),
            name,
            batch_size: options.batch_size,
            state: RefCell::new(FetchState::default()),
            was_null: Cell::new(false),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }

    /// Closes the cursor on the server. Closing twice is a no-op.
    ///
    /// Any [`RowSequence`](crate::RowSequence) still borrowing this cursor
    /// fails on its next pull. A failed `CLOSE` leaves the cursor open, so dropping it tries again.
    pub fn close(&self) -> Result<(), PgCursorError> {
        if self.is_closed() {
            return Ok(());
        }

        let close = format!("CLOSE {}", quote_ident(&self.name));
        self.tx.borrow_mut().execute(close.as_str(), &[])?;

        let mut state = self.state.borrow_mut();
        state.closed = true;
        state.batch.clear();
        state.current = None;
        debug!(cursor = %self.name, "closed cursor");
        Ok(())
    }

    fn fetch(&self, state: &mut FetchState) -> Result<(), PgCursorError> {
        let fetch = format!(
            "FETCH FORWARD {} FROM {}",
            self.batch_size,
            quote_ident(&self.name)
        );
        let rows = self.tx.borrow_mut().query(fetch.as_str(), &[])?;
        trace!(cursor = %self.name, rows = rows.len(), "fetched batch");

        state.drained = rows.len() < self.batch_size;
        state.batch.extend(rows);
        Ok(())
    }

    fn with_current<T>(
        &self,
        read: impl FnOnce(&Row) -> Result<T, postgres::Error>,
    ) -> Result<T, PgCursorError> {
        let state = self.state.borrow();
        if state.closed {
            return Err(PgCursorError::Closed(self.name.clone()));
        }
        let row = state
            .current
            .as_ref()
            .ok_or_else(|| PgCursorError::NoCurrentRow(self.name.clone()))?;
        Ok(read(row)?)
    }

    fn read_nullable<T>(&self, column: usize) -> Result<Option<T>, PgCursorError>
    where
        T: for<'a> FromSql<'a>,
    {
        self.was_null.set(false);
        let value = self.with_current(|row| row.try_get::<_, Option<T>>(column))?;
        self.was_null.set(value.is_none());
        Ok(value)
    }
}

impl Cursor for PgCursor<'_, '_> {
    type Error = PgCursorError;

    fn advance(&self) -> Result<bool, PgCursorError> {
        let mut state = self.state.borrow_mut();
        if state.closed {
            return Err(PgCursorError::Closed(self.name.clone()));
        }
        if state.batch.is_empty() && !state.drained {
            self.fetch(&mut state)?;
        }

        state.current = state.batch.pop_front();
        self.was_null.set(false);
        Ok(state.current.is_some())
    }

    fn was_null(&self) -> bool {
        self.was_null.get()
    }
}

impl Drop for PgCursor<'_, '_> {
    fn drop(&mut self) {
        if self.is_closed() {
            return;
        }
        if let Err(err) = self.close() {
            warn!(cursor = %self.name, error = %err, "failed to close cursor on drop");
        }
    }
}

macro_rules! impl_read_column {
    (defaulted: $($ty:ty),* $(,)?) => {
        $(
            impl ReadColumn<$ty> for PgCursor<'_, '_> {
                fn read_column(&self, column: usize) -> Result<$ty, PgCursorError> {
                    Ok(self.read_nullable::<$ty>(column)?.unwrap_or_default())
                }
            }

            impl_read_column!(nullable: $ty);
        )*
    };
    (nullable: $($ty:ty),* $(,)?) => {
        $(
            impl ReadColumn<Option<$ty>> for PgCursor<'_, '_> {
                fn read_column(&self, column: usize) -> Result<Option<$ty>, PgCursorError> {
                    self.read_nullable::<$ty>(column)
                }
            }
        )*
    };
}

impl_read_column!(defaulted: bool, i16, i32, i64, f32, f64, String, Vec<u8>);
impl_read_column!(nullable: NaiveDate, NaiveTime, NaiveDateTime);

/// Accepts `timestamptz` as is and reads `timestamp` as a local date-time.
impl ReadColumn<Option<Timestamp>> for PgCursor<'_, '_> {
    fn read_column(&self, column: usize) -> Result<Option<Timestamp>, PgCursorError> {
        let without_zone = self.with_current(|row| {
            Ok(row
                .columns()
                .get(column)
                .is_some_and(|col| *col.type_() == Type::TIMESTAMP))
        })?;

        if without_zone {
            Ok(self
                .read_nullable::<NaiveDateTime>(column)?
                .map(write_required_timestamp))
        } else {
            self.read_nullable::<Timestamp>(column)
        }
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
