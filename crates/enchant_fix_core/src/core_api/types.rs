use serde::{Deserialize, Serialize};

use crate::language::Language;
use crate::record::FormKey;

use super::error::{CoreError, CoreErrorCode};
use super::well_known_perks::WellKnownPerk;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatchSettings {
    /// Run the name text repair on patched NPCs.
    pub repair_names: bool,
    /// Localized variant the text repair reads.
    pub source_language: Language,
    /// Where the repaired text is written.
    pub name_write_back: NameWriteBack,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameWriteBack {
    /// The whole field becomes the repaired text, stored under
    /// [`TranslatedString::DEFAULT_LANGUAGE`](crate::language::TranslatedString::DEFAULT_LANGUAGE).
    #[default]
    ReplaceField,
    /// Only the source language variant is rewritten.
    SourceVariant,
}

impl Default for PatchSettings {
    fn default() -> Self {
        Self {
            repair_names: true,
            source_language: Language::French,
            name_write_back: NameWriteBack::ReplaceField,
        }
    }
}

impl PatchSettings {
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        serde_json::from_slice(bytes).map_err(|e| {
            CoreError::new(CoreErrorCode::Parse, format!("invalid patch settings: {e}"))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameField {
    Name,
    ShortName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchedRecord {
    pub form_key: FormKey,
    pub editor_id: Option<String>,
    pub added_perks: Vec<WellKnownPerk>,
    pub repaired_names: Vec<NameField>,
}

/// Why a record was left out of the patch, or what was done to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    InheritsSpellList,
    AlreadyComplete,
    Patched(PatchedRecord),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchReport {
    pub examined: usize,
    pub inherits_spell_list: usize,
    pub already_complete: usize,
    pub patched: Vec<PatchedRecord>,
}

impl PatchReport {
    pub fn record(&mut self, outcome: RecordOutcome) {
        self.examined += 1;
        match outcome {
            RecordOutcome::InheritsSpellList => self.inherits_spell_list += 1,
            RecordOutcome::AlreadyComplete => self.already_complete += 1,
            RecordOutcome::Patched(patched) => self.patched.push(patched),
        }
    }

    pub fn perks_added(&self) -> usize {
        self.patched.iter().map(|p| p.added_perks.len()).sum()
    }

    pub fn names_repaired(&self) -> usize {
        self.patched.iter().map(|p| p.repaired_names.len()).sum()
    }
}
