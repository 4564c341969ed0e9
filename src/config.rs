use serde::Deserialize;

use crate::error::PgCursorError;

/// Rows fetched per `FETCH FORWARD` round-trip when nothing else is configured.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Options used when declaring a server-side cursor.
///
/// Deserializes from any serde format; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CursorOptions {
    /// The number of rows fetched from the server in each batch.
    pub batch_size: usize,
    /// Cursor name. A unique name is generated when unset.
    pub name: Option<String>,
}

impl Default for CursorOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            name: None,
        }
    }
}

impl CursorOptions {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<(), PgCursorError> {
        if self.batch_size == 0 {
            return Err(PgCursorError::InvalidOptions(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        if self.name.as_deref().is_some_and(str::is_empty) {
            return Err(PgCursorError::InvalidOptions(
                "cursor name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
