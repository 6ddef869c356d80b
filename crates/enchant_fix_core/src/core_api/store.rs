use crate::record::{FormKey, NpcRecord};

use super::error::CoreError;
use super::well_known_perks::WellKnownPerk;

/// The record store the patcher reads from and stages overrides into.
///
/// Loading plugins, resolving which plugin wins for each record, and writing
/// the output plugin all belong to the store. The patcher only asks for the
/// winning NPCs, edits overrides, and hands control back for the commit.
pub trait RecordStore {
    /// Winning version of every NPC in the load order, in load order.
    fn winning_npcs(&self) -> Result<Vec<NpcRecord>, CoreError>;

    /// Override of `npc` in the output plugin, created from `npc` on first
    /// request. Later requests for the same identity return the same override.
    fn get_or_add_override(&mut self, npc: &NpcRecord) -> Result<&mut NpcRecord, CoreError>;

    /// Identity of a well-known perk in this store's game data.
    fn perk_form_key(&self, perk: WellKnownPerk) -> Result<FormKey, CoreError> {
        Ok(perk.form_key())
    }

    /// Persist every staged override as one output plugin.
    fn commit(&mut self) -> Result<(), CoreError>;
}
