//! Perk identities referenced by the patcher, taken from the Skyrim.esm
//! master. These are stable across game releases that ship Skyrim.esm.

use serde::{Deserialize, Serialize};

use crate::record::FormKey;

const SKYRIM_MASTER: &str = "Skyrim.esm";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WellKnownPerk {
    /// Lets alchemy-style skill fortify effects apply to the NPC.
    AlchemySkillBoosts,
    /// Lets perk-driven skill fortify effects apply to the NPC.
    PerkSkillBoosts,
}

struct PerkEntry {
    editor_id: &'static str,
    local_id: u32,
}

// Indexed by `WellKnownPerk` discriminant.
#[rustfmt::skip]
const WELL_KNOWN_PERKS: [PerkEntry; 2] = [
    PerkEntry { editor_id: "AlchemySkillBoosts", local_id: 0x0A725C },
    PerkEntry { editor_id: "PerkSkillBoosts",    local_id: 0x0CF788 },
];

/// Perks every eligible NPC must carry, in the order they are appended.
pub const REQUIRED_PERKS: [WellKnownPerk; 2] =
    [WellKnownPerk::AlchemySkillBoosts, WellKnownPerk::PerkSkillBoosts];

impl WellKnownPerk {
    pub fn editor_id(self) -> &'static str {
        WELL_KNOWN_PERKS[self as usize].editor_id
    }

    pub fn form_key(self) -> FormKey {
        FormKey::from_static(WELL_KNOWN_PERKS[self as usize].local_id, SKYRIM_MASTER)
    }
}
