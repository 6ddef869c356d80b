use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::language::TranslatedString;

const LOCAL_ID_MASK: u32 = 0x00FF_FFFF;
const PLUGIN_EXTENSIONS: [&str; 3] = [".esm", ".esp", ".esl"];

/// Stable record identity: a 24-bit local form id plus the plugin that
/// originally defined the record, written as `0A725C:Skyrim.esm`.
///
/// Plugin names compare without regard to ASCII case, as the game does;
/// the spelling given at construction is kept for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FormKey {
    id: u32,
    plugin: String,
}

impl FormKey {
    pub fn new(id: u32, plugin: impl Into<String>) -> Result<Self, FormKeyError> {
        let plugin = plugin.into();
        if id & !LOCAL_ID_MASK != 0 {
            return Err(FormKeyError::IdOutOfRange(id));
        }
        if plugin.is_empty() {
            return Err(FormKeyError::EmptyPlugin);
        }
        let lower = plugin.to_ascii_lowercase();
        if !PLUGIN_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            return Err(FormKeyError::BadPluginExtension(plugin));
        }
        Ok(Self { id, plugin })
    }

    /// For compile-time tables whose keys are known to be valid.
    pub(crate) fn from_static(id: u32, plugin: &'static str) -> Self {
        debug_assert!(id & !LOCAL_ID_MASK == 0);
        Self {
            id,
            plugin: plugin.to_string(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn plugin(&self) -> &str {
        &self.plugin
    }
}

impl PartialEq for FormKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.plugin.eq_ignore_ascii_case(&other.plugin)
    }
}

impl Eq for FormKey {}

impl Hash for FormKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        for byte in self.plugin.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl Ord for FormKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id).then_with(|| {
            let lhs = self.plugin.bytes().map(|b| b.to_ascii_lowercase());
            let rhs = other.plugin.bytes().map(|b| b.to_ascii_lowercase());
            lhs.cmp(rhs)
        })
    }
}

impl PartialOrd for FormKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for FormKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06X}:{}", self.id, self.plugin)
    }
}

impl FromStr for FormKey {
    type Err = FormKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, plugin) = s
            .split_once(':')
            .ok_or_else(|| FormKeyError::Malformed(s.to_string()))?;
        if id.is_empty() || id.len() > 6 {
            return Err(FormKeyError::Malformed(s.to_string()));
        }
        let id = u32::from_str_radix(id, 16).map_err(|_| FormKeyError::Malformed(s.to_string()))?;
        Self::new(id, plugin)
    }
}

impl TryFrom<String> for FormKey {
    type Error = FormKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FormKey> for String {
    fn from(value: FormKey) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKeyError {
    Malformed(String),
    IdOutOfRange(u32),
    EmptyPlugin,
    BadPluginExtension(String),
}

impl fmt::Display for FormKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(raw) => write!(f, "malformed form key {raw:?}, expected ID:Plugin.esm"),
            Self::IdOutOfRange(id) => write!(f, "form id {id:#X} does not fit in 24 bits"),
            Self::EmptyPlugin => f.write_str("form key has an empty plugin name"),
            Self::BadPluginExtension(plugin) => {
                write!(f, "plugin {plugin:?} must end in .esm, .esp or .esl")
            }
        }
    }
}

impl std::error::Error for FormKeyError {}

/// NPC template "use" flags. A set flag means that part of the record is
/// taken from the NPC's template at runtime, so edits to it have no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TemplateFlag {
    Traits,
    Stats,
    Factions,
    SpellList,
    AiData,
    AiPackages,
    ModelAnimation,
    BaseData,
    Inventory,
    Script,
    DefPackList,
    AttackData,
    Keywords,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NpcConfiguration {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub template_flags: BTreeSet<TemplateFlag>,
}

impl NpcConfiguration {
    pub fn inherits(&self, flag: TemplateFlag) -> bool {
        self.template_flags.contains(&flag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerkPlacement {
    pub perk: FormKey,
    pub rank: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NpcRecord {
    pub form_key: FormKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<String>,
    #[serde(default)]
    pub configuration: NpcConfiguration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perks: Option<Vec<PerkPlacement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<TranslatedString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<TranslatedString>,
}

impl NpcRecord {
    pub fn new(form_key: FormKey) -> Self {
        Self {
            form_key,
            editor_id: None,
            configuration: NpcConfiguration::default(),
            perks: None,
            name: None,
            short_name: None,
        }
    }

    /// Perk list as a slice; a record without a perk list reads as empty.
    pub fn perks(&self) -> &[PerkPlacement] {
        self.perks.as_deref().unwrap_or(&[])
    }

    /// `0A725C:Skyrim.esm` or `0A725C:Skyrim.esm (EditorId)` for diagnostics.
    pub fn label(&self) -> String {
        match &self.editor_id {
            Some(editor_id) => format!("{} ({editor_id})", self.form_key),
            None => self.form_key.to_string(),
        }
    }
}
