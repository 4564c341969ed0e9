#![allow(dead_code)]

use std::{cell::Cell, io};

use chrono::{TimeZone, Utc};
use cursor_sequence::{Cursor, ReadColumn, Timestamp};
use thiserror::Error;

/// A column value as a scripted driver would report it.
#[derive(Debug, Clone, Copy)]
pub enum Field {
    Null,
    Int(i64),
    Timestamp(Timestamp),
    /// Driver raises the null flag but still returns a value.
    FlaggedNull(Timestamp),
    /// Driver returns no value but leaves the null flag down.
    UnflaggedNull,
}

#[derive(Debug, Error)]
pub enum ScriptedError {
    #[error("cursor is closed")]
    Closed,

    #[error("lost connection while fetching row {row}")]
    Transport {
        row: usize,
        #[source]
        source: io::Error,
    },

    #[error("cursor is not positioned on a row")]
    NoCurrentRow,

    #[error("column {0} cannot be read as the requested type")]
    TypeMismatch(usize),
}

/// In-memory cursor over scripted rows that can be told to fail.
pub struct ScriptedCursor {
    rows: Vec<Vec<Field>>,
    fail_on_attempt: Option<usize>,
    attempts: Cell<usize>,
    position: Cell<usize>,
    closed: Cell<bool>,
    was_null: Cell<bool>,
}

impl ScriptedCursor {
    pub fn new(rows: Vec<Vec<Field>>) -> Self {
        Self {
            rows,
            fail_on_attempt: None,
            attempts: Cell::new(0),
            position: Cell::new(0),
            closed: Cell::new(false),
            was_null: Cell::new(false),
        }
    }

    /// `rows` single-column rows holding their own row number.
    pub fn numbered(rows: usize) -> Self {
        Self::new((0..rows as i64).map(|n| vec![Field::Int(n)]).collect())
    }

    /// Fails the `attempt`-th advance (1-based) with a transport error.
    pub fn failing_on(mut self, attempt: usize) -> Self {
        self.fail_on_attempt = Some(attempt);
        self
    }

    pub fn close(&self) {
        self.closed.set(true);
    }

    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }

    /// 1-based row the cursor sits on; `rows.len() + 1` once exhausted.
    pub fn position(&self) -> usize {
        self.position.get()
    }

    pub fn is_exhausted(&self) -> bool {
        self.position.get() > self.rows.len()
    }

    fn field(&self, column: usize) -> Result<Field, ScriptedError> {
        if self.closed.get() {
            return Err(ScriptedError::Closed);
        }
        let row = match self.position.get() {
            0 => return Err(ScriptedError::NoCurrentRow),
            n => self.rows.get(n - 1).ok_or(ScriptedError::NoCurrentRow)?,
        };
        row.get(column)
            .copied()
            .ok_or(ScriptedError::TypeMismatch(column))
    }
}

impl Cursor for ScriptedCursor {
    type Error = ScriptedError;

    fn advance(&self) -> Result<bool, ScriptedError> {
        let attempt = self.attempts.get() + 1;
        self.attempts.set(attempt);

        if self.closed.get() {
            return Err(ScriptedError::Closed);
        }
        if self.fail_on_attempt == Some(attempt) {
            return Err(ScriptedError::Transport {
                row: self.position.get() + 1,
                source: io::Error::new(io::ErrorKind::ConnectionReset, "connection reset by peer"),
            });
        }

        let next = (self.position.get() + 1).min(self.rows.len() + 1);
        self.position.set(next);
        self.was_null.set(false);
        Ok(next <= self.rows.len())
    }

    fn was_null(&self) -> bool {
        self.was_null.get()
    }
}

impl ReadColumn<Option<Timestamp>> for ScriptedCursor {
    fn read_column(&self, column: usize) -> Result<Option<Timestamp>, ScriptedError> {
        let (value, null) = match self.field(column)? {
            Field::Null => (None, true),
            Field::Timestamp(ts) => (Some(ts), false),
            Field::FlaggedNull(ts) => (Some(ts), true),
            Field::UnflaggedNull => (None, false),
            Field::Int(_) => return Err(ScriptedError::TypeMismatch(column)),
        };
        self.was_null.set(null);
        Ok(value)
    }
}

impl ReadColumn<i64> for ScriptedCursor {
    fn read_column(&self, column: usize) -> Result<i64, ScriptedError> {
        let (value, null) = match self.field(column)? {
            Field::Null | Field::UnflaggedNull => (0, true),
            Field::Int(n) => (n, false),
            _ => return Err(ScriptedError::TypeMismatch(column)),
        };
        self.was_null.set(null);
        Ok(value)
    }
}

pub fn utc(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Timestamp {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec).unwrap()
}
