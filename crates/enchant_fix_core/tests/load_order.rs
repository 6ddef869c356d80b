use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use enchant_fix_core::core_api::{
    CoreErrorCode, DEFAULT_PATCH_NAME, LoadOrderStore, PatchSettings, Patcher, Plugin,
    RecordStore, WellKnownPerk,
};
use enchant_fix_core::language::Language;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn fixture_load_order() -> Vec<PathBuf> {
    vec![
        fixture_path("Skyrim.esm.json"),
        fixture_path("Tweaks.esp.json"),
    ]
}

fn temp_output_path(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}_{}_{}.json", std::process::id(), nanos))
}

#[test]
fn loads_fixture_load_order() {
    let store = LoadOrderStore::load_paths(&fixture_load_order(), DEFAULT_PATCH_NAME)
        .expect("fixtures load");
    assert_eq!(store.load_order(), ["Skyrim.esm", "Tweaks.esp"]);

    let winners = store.winning_npcs().expect("winning NPCs");
    assert_eq!(winners.len(), 4);
    let guard = winners
        .iter()
        .find(|npc| npc.editor_id.as_deref() == Some("GuardWhiterun"))
        .expect("guard present");
    assert_eq!(guard.perks().len(), 2);
    assert_eq!(guard.perks()[0].rank, 2);
}

#[test]
fn patches_fixture_load_order_end_to_end() {
    let output = temp_output_path("npc_enchant_fix_patch");
    let mut store = LoadOrderStore::load_paths(&fixture_load_order(), DEFAULT_PATCH_NAME)
        .expect("fixtures load")
        .with_output(&output);

    let report = Patcher::new(&PatchSettings::default())
        .run_and_commit(&mut store)
        .expect("patch run succeeds");

    assert_eq!(report.examined, 4);
    assert_eq!(report.inherits_spell_list, 1);
    assert_eq!(report.already_complete, 0);
    let patched_ids: Vec<_> = report
        .patched
        .iter()
        .map(|p| p.editor_id.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(patched_ids, vec!["BanditArcher", "GuardWhiterun", "BanditElite"]);
    assert_eq!(report.perks_added(), 4);
    assert_eq!(report.names_repaired(), 2);

    let written = fs::read(&output).expect("patch written");
    let patch = Plugin::from_json_bytes(&written).expect("patch parses");
    assert_eq!(patch.name, DEFAULT_PATCH_NAME);
    assert_eq!(patch.masters, vec!["Skyrim.esm"]);
    assert_eq!(patch.npcs.len(), 3);

    let guard = &patch.npcs[1];
    let perk_keys: Vec<String> = guard.perks().iter().map(|p| p.perk.to_string()).collect();
    assert_eq!(
        perk_keys,
        vec!["058F7A:Skyrim.esm", "0A725C:Skyrim.esm", "0CF788:Skyrim.esm"]
    );

    let elite = &patch.npcs[2];
    assert_eq!(
        elite.perks().iter().map(|p| p.perk.clone()).collect::<Vec<_>>(),
        vec![
            WellKnownPerk::AlchemySkillBoosts.form_key(),
            WellKnownPerk::PerkSkillBoosts.form_key()
        ]
    );
    let name = elite.name.as_ref().expect("name kept");
    assert_eq!(name.lookup(Language::English), Some("Bandit \u{c3}\u{a9}lite"));
    assert_eq!(name.lookup(Language::French), None);

    let _ = fs::remove_file(&output);
}

#[test]
fn missing_plugin_file_is_an_io_error() {
    let err = LoadOrderStore::load_paths(
        &[fixture_path("DoesNotExist.esp.json")],
        DEFAULT_PATCH_NAME,
    )
    .expect_err("missing file should fail");
    assert_eq!(err.code, CoreErrorCode::Io);
}

#[test]
fn malformed_plugin_is_a_parse_error() {
    let err = Plugin::from_json_bytes(br#"{"name":"Bad.esp","npcs":[{"form_key":"nope"}]}"#)
        .expect_err("bad form key should fail");
    assert_eq!(err.code, CoreErrorCode::Parse);
}
