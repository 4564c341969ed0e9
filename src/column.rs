//! Conversions for nullable columns read through a [`Cursor`].
//!
//! Local date-times are always interpreted in the system's local time zone as
//! it is configured when the conversion runs, not in a fixed zone.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, TimeZone, Utc};

use crate::cursor::{Cursor, ReadColumn};

/// Raw instant stored in a timestamp column.
pub type Timestamp = DateTime<Utc>;

/// Reads timestamp column `column` of the current row as a local date-time.
///
/// Returns `None` when the driver flags the column as `NULL` or hands back no
/// value; both conditions are checked because drivers do not always agree
/// with themselves.
pub fn read_optional_date_time<C>(cursor: &C, column: usize) -> Result<Option<NaiveDateTime>, C::Error>
where
    C: ReadColumn<Option<Timestamp>> + ?Sized,
{
    let raw = cursor.read_column(column)?;
    if cursor.was_null() {
        return Ok(None);
    }
    Ok(raw.map(|timestamp| timestamp.with_timezone(&Local).naive_local()))
}

/// Maps an optional local date-time to the timestamp bound for a nullable column.
pub fn write_timestamp(value: Option<NaiveDateTime>) -> Option<Timestamp> {
    value.map(write_required_timestamp)
}

/// Converts a local date-time to the instant it denotes in the local zone.
///
/// A time repeated by a DST fold maps to its earliest instant. A time skipped
/// by a DST gap is moved forward by an hour.
pub fn write_required_timestamp(value: NaiveDateTime) -> Timestamp {
    match Local.from_local_datetime(&value) {
        LocalResult::Single(local) => local.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => value
            .checked_add_signed(Duration::hours(1))
            .and_then(|shifted| Local.from_local_datetime(&shifted).earliest())
            .map(|local| local.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&value)),
    }
}

/// Wraps a value that was just read from the current row, using the cursor's
/// null flag to decide whether it is present.
///
/// Must be called right after the typed read that produced `value`, before
/// anything else touches the cursor.
pub fn read_optional_column_value<T, C>(value: T, cursor: &C) -> Option<T>
where
    C: Cursor + ?Sized,
{
    if cursor.was_null() { None } else { Some(value) }
}
