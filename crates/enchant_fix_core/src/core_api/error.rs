use std::error::Error;
use std::fmt;

use crate::record::FormKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Io,
    Parse,
    InvalidRecord,
    Store,
    TextRepair,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
    /// Record being processed when the error was raised, if any.
    pub record: Option<FormKey>,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            record: None,
        }
    }

    /// Attach the offending record. An identity that is already attached is kept.
    pub fn with_record(mut self, record: &FormKey) -> Self {
        if self.record.is_none() {
            self.record = Some(record.clone());
        }
        self
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.record {
            Some(record) => write!(f, "{:?}: record {record}: {}", self.code, self.message),
            None => write!(f, "{:?}: {}", self.code, self.message),
        }
    }
}

impl Error for CoreError {}
