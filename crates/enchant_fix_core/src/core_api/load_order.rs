use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::record::{FormKey, NpcRecord};

use super::error::{CoreError, CoreErrorCode};
use super::store::RecordStore;

pub const DEFAULT_PATCH_NAME: &str = "NPCEnchantFix.esp";

/// One plugin of a load order, in its JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plugin {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub masters: Vec<String>,
    #[serde(default)]
    pub npcs: Vec<NpcRecord>,
}

impl Plugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            masters: Vec::new(),
            npcs: Vec::new(),
        }
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        serde_json::from_slice(bytes)
            .map_err(|e| CoreError::new(CoreErrorCode::Parse, format!("invalid plugin: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let bytes = fs::read(path).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to read {}: {e}", path.display()),
            )
        })?;
        Self::from_json_bytes(&bytes).map_err(|e| {
            CoreError::new(e.code, format!("{}: {}", path.display(), e.message))
        })
    }
}

/// A [`RecordStore`] over an in-memory load order of JSON plugins.
///
/// Plugins are given lowest priority first; the last plugin defining an NPC
/// provides its winning version.
#[derive(Debug)]
pub struct LoadOrderStore {
    load_order: Vec<String>,
    winning: Vec<NpcRecord>,
    patch: Plugin,
    overrides: HashMap<FormKey, usize>,
    output: Option<PathBuf>,
    committed: bool,
}

impl LoadOrderStore {
    pub fn new(plugins: Vec<Plugin>, patch_name: impl Into<String>) -> Result<Self, CoreError> {
        let patch_name = patch_name.into();
        let mut seen_plugins = HashSet::new();
        let mut load_order = Vec::with_capacity(plugins.len());
        let mut winning: Vec<NpcRecord> = Vec::new();
        let mut positions: HashMap<FormKey, usize> = HashMap::new();

        for plugin in plugins {
            let lower = plugin.name.to_ascii_lowercase();
            if lower == patch_name.to_ascii_lowercase() {
                return Err(CoreError::new(
                    CoreErrorCode::Store,
                    format!("load order already contains the patch plugin {patch_name}"),
                ));
            }
            if !seen_plugins.insert(lower) {
                return Err(CoreError::new(
                    CoreErrorCode::Store,
                    format!("plugin {} appears twice in the load order", plugin.name),
                ));
            }

            let mut in_plugin = HashSet::new();
            for npc in plugin.npcs {
                if !in_plugin.insert(npc.form_key.clone()) {
                    return Err(CoreError::new(
                        CoreErrorCode::InvalidRecord,
                        format!("plugin {} defines NPC {} twice", plugin.name, npc.form_key),
                    )
                    .with_record(&npc.form_key));
                }
                match positions.get(&npc.form_key) {
                    Some(&index) => winning[index] = npc,
                    None => {
                        positions.insert(npc.form_key.clone(), winning.len());
                        winning.push(npc);
                    }
                }
            }
            load_order.push(plugin.name);
        }

        tracing::debug!(
            plugins = load_order.len(),
            npcs = winning.len(),
            "resolved winning NPC records"
        );

        Ok(Self {
            load_order,
            winning,
            patch: Plugin::new(patch_name),
            overrides: HashMap::new(),
            output: None,
            committed: false,
        })
    }

    pub fn load_paths(paths: &[PathBuf], patch_name: impl Into<String>) -> Result<Self, CoreError> {
        let plugins = paths
            .iter()
            .map(|path| Plugin::load(path))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(plugins, patch_name)
    }

    /// Write the patch plugin to `path` on commit.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn load_order(&self) -> &[String] {
        &self.load_order
    }

    pub fn patch(&self) -> &Plugin {
        &self.patch
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Plugins the patch refers to, in load order. Plugins outside the load
    /// order (e.g. a master not listed) follow, sorted by name.
    fn referenced_masters(&self) -> Vec<String> {
        let mut referenced = BTreeSet::new();
        for npc in &self.patch.npcs {
            referenced.insert(npc.form_key.plugin().to_string());
            for placement in npc.perks() {
                referenced.insert(placement.perk.plugin().to_string());
            }
        }
        referenced.retain(|name| !name.eq_ignore_ascii_case(&self.patch.name));

        let mut masters: Vec<String> = self
            .load_order
            .iter()
            .filter(|name| referenced.iter().any(|r| r.eq_ignore_ascii_case(name)))
            .cloned()
            .collect();
        for name in referenced {
            if !masters.iter().any(|m| m.eq_ignore_ascii_case(&name)) {
                masters.push(name);
            }
        }
        masters
    }
}

impl RecordStore for LoadOrderStore {
    fn winning_npcs(&self) -> Result<Vec<NpcRecord>, CoreError> {
        Ok(self.winning.clone())
    }

    fn get_or_add_override(&mut self, npc: &NpcRecord) -> Result<&mut NpcRecord, CoreError> {
        if self.committed {
            return Err(CoreError::new(
                CoreErrorCode::Store,
                "cannot add overrides after the patch was committed",
            )
            .with_record(&npc.form_key));
        }

        let index = match self.overrides.get(&npc.form_key) {
            Some(&index) => index,
            None => {
                let index = self.patch.npcs.len();
                self.patch.npcs.push(npc.clone());
                self.overrides.insert(npc.form_key.clone(), index);
                index
            }
        };
        Ok(&mut self.patch.npcs[index])
    }

    fn commit(&mut self) -> Result<(), CoreError> {
        if self.committed {
            return Err(CoreError::new(
                CoreErrorCode::Store,
                format!("patch {} was already committed", self.patch.name),
            ));
        }

        self.patch.masters = self.referenced_masters();

        if let Some(path) = &self.output {
            let bytes = serde_json::to_vec_pretty(&self.patch).map_err(|e| {
                CoreError::new(
                    CoreErrorCode::Io,
                    format!("failed to serialize patch {}: {e}", self.patch.name),
                )
            })?;
            fs::write(path, bytes).map_err(|e| {
                CoreError::new(
                    CoreErrorCode::Io,
                    format!("failed to write {}: {e}", path.display()),
                )
            })?;
            tracing::info!(
                path = %path.display(),
                overrides = self.patch.npcs.len(),
                "wrote patch plugin"
            );
        }

        self.committed = true;
        Ok(())
    }
}
