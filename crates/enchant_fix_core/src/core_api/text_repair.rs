//! Text repair steps applied to localized NPC names.
//!
//! Some localized string sources hand the patcher names whose characters must
//! be written back as their UTF-8 bytes reinterpreted as ISO-8859-1 for the
//! game to display them correctly. The step is kept behind [`TextRepair`] so it
//! can be disabled or swapped per data source.

use super::error::CoreError;

pub trait TextRepair {
    fn name(&self) -> &'static str;

    fn repair(&self, text: &str) -> Result<String, CoreError>;
}

/// Re-reads the UTF-8 encoding of `text` as ISO-8859-1, one char per byte.
#[derive(Debug, Default, Clone, Copy)]
pub struct Utf8AsLatin1;

impl TextRepair for Utf8AsLatin1 {
    fn name(&self) -> &'static str {
        "utf8-as-latin1"
    }

    fn repair(&self, text: &str) -> Result<String, CoreError> {
        Ok(utf8_as_latin1(text))
    }
}

pub fn utf8_as_latin1(text: &str) -> String {
    // Every byte maps to the code point of the same value in ISO-8859-1.
    text.bytes().map(char::from).collect()
}
