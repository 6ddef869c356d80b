use crate::language::{Language, TranslatedString};
use crate::record::{FormKey, NpcRecord, PerkPlacement, TemplateFlag};

use super::error::CoreError;
use super::store::RecordStore;
use super::text_repair::{TextRepair, Utf8AsLatin1};
use super::types::{
    NameField, NameWriteBack, PatchReport, PatchSettings, PatchedRecord, RecordOutcome,
};
use super::well_known_perks::{REQUIRED_PERKS, WellKnownPerk};

const ADDED_PERK_RANK: u8 = 1;

/// Adds the skill boost perks to every NPC that lacks them and can take
/// them, repairing localized names on each NPC it touches.
pub struct Patcher {
    source_language: Language,
    name_write_back: NameWriteBack,
    name_repair: Option<Box<dyn TextRepair>>,
}

/// A required perk resolved against the store's game data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredPerk {
    pub perk: WellKnownPerk,
    pub form_key: FormKey,
}

impl Patcher {
    pub fn new(settings: &PatchSettings) -> Self {
        let name_repair: Option<Box<dyn TextRepair>> = if settings.repair_names {
            Some(Box::new(Utf8AsLatin1))
        } else {
            None
        };
        Self {
            source_language: settings.source_language,
            name_write_back: settings.name_write_back,
            name_repair,
        }
    }

    /// Replace the name repair step, or disable it with `None`.
    pub fn with_name_repair(mut self, repair: Option<Box<dyn TextRepair>>) -> Self {
        self.name_repair = repair;
        self
    }

    /// Patch every winning NPC. Stops at the first failing record; the store
    /// is left uncommitted.
    pub fn run<S: RecordStore + ?Sized>(&self, store: &mut S) -> Result<PatchReport, CoreError> {
        let required = resolve_required_perks(store)?;
        let npcs = store.winning_npcs()?;
        let mut report = PatchReport::default();

        for npc in &npcs {
            let outcome = self
                .patch_npc(store, npc, &required)
                .map_err(|e| e.with_record(&npc.form_key))?;
            report.record(outcome);
        }

        tracing::info!(
            examined = report.examined,
            inherits_spell_list = report.inherits_spell_list,
            already_complete = report.already_complete,
            patched = report.patched.len(),
            perks_added = report.perks_added(),
            names_repaired = report.names_repaired(),
            "patch run finished"
        );
        Ok(report)
    }

    /// [`Patcher::run`], then commit the store if every record succeeded.
    pub fn run_and_commit<S: RecordStore + ?Sized>(
        &self,
        store: &mut S,
    ) -> Result<PatchReport, CoreError> {
        let report = self.run(store)?;
        store.commit()?;
        Ok(report)
    }

    pub fn patch_npc<S: RecordStore + ?Sized>(
        &self,
        store: &mut S,
        npc: &NpcRecord,
        required: &[RequiredPerk],
    ) -> Result<RecordOutcome, CoreError> {
        if npc.configuration.inherits(TemplateFlag::SpellList) {
            tracing::debug!(record = %npc.label(), "skipped: perk list comes from template");
            return Ok(RecordOutcome::InheritsSpellList);
        }

        let missing = missing_perks(npc, required);
        if missing.is_empty() {
            tracing::debug!(record = %npc.label(), "skipped: skill boost perks present");
            return Ok(RecordOutcome::AlreadyComplete);
        }

        let patched = store.get_or_add_override(npc)?;

        let mut repaired_names = Vec::new();
        if self.repair_name(&mut patched.name)? {
            repaired_names.push(NameField::Name);
        }
        if self.repair_name(&mut patched.short_name)? {
            repaired_names.push(NameField::ShortName);
        }

        let perks = patched.perks.get_or_insert_with(Vec::new);
        for required in &missing {
            perks.push(PerkPlacement {
                perk: required.form_key.clone(),
                rank: ADDED_PERK_RANK,
            });
        }

        let added_perks: Vec<WellKnownPerk> = missing.iter().map(|r| r.perk).collect();
        tracing::debug!(
            record = %npc.label(),
            added = ?added_perks,
            repaired_names = repaired_names.len(),
            name_repair = self.name_repair.as_ref().map(|r| r.name()).unwrap_or("off"),
            "patched"
        );

        Ok(RecordOutcome::Patched(PatchedRecord {
            form_key: npc.form_key.clone(),
            editor_id: npc.editor_id.clone(),
            added_perks,
            repaired_names,
        }))
    }

    fn repair_name(&self, field: &mut Option<TranslatedString>) -> Result<bool, CoreError> {
        let Some(repair) = &self.name_repair else {
            return Ok(false);
        };
        let Some(name) = field.as_mut() else {
            return Ok(false);
        };
        let Some(text) = name.lookup(self.source_language) else {
            return Ok(false);
        };

        let repaired = repair.repair(text)?;
        match self.name_write_back {
            NameWriteBack::ReplaceField => *name = TranslatedString::plain(repaired),
            NameWriteBack::SourceVariant => name.set(self.source_language, repaired),
        }
        Ok(true)
    }
}

pub fn resolve_required_perks<S: RecordStore + ?Sized>(
    store: &S,
) -> Result<Vec<RequiredPerk>, CoreError> {
    REQUIRED_PERKS
        .iter()
        .map(|&perk| {
            Ok(RequiredPerk {
                perk,
                form_key: store.perk_form_key(perk)?,
            })
        })
        .collect()
}

/// Required perks `npc` does not carry, in required order. The scan stops as
/// soon as every required perk has been seen.
pub fn missing_perks<'a>(npc: &NpcRecord, required: &'a [RequiredPerk]) -> Vec<&'a RequiredPerk> {
    let mut missing: Vec<&RequiredPerk> = required.iter().collect();
    for placement in npc.perks() {
        if missing.is_empty() {
            break;
        }
        missing.retain(|r| r.form_key != placement.perk);
    }
    missing
}
