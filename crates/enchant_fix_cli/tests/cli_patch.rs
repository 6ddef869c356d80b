use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../enchant_fix_core/tests/fixtures")
        .join(name)
}

fn load_order_args() -> Vec<String> {
    ["Skyrim.esm.json", "Tweaks.esp.json"]
        .iter()
        .map(|name| fixture_path(name).to_string_lossy().to_string())
        .collect()
}

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_npc-enchant-fix"))
        .args(args)
        .output()
        .expect("failed to run npc-enchant-fix CLI")
}

fn temp_path(prefix: &str, ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}_{}_{}.{ext}", std::process::id(), nanos))
}

#[test]
fn cli_writes_patch_plugin() {
    let output = temp_path("npc_enchant_fix_cli_patch", "json");
    let output_arg = output.to_string_lossy().to_string();
    let plugins = load_order_args();

    let mut args: Vec<&str> = plugins.iter().map(String::as_str).collect();
    args.extend(["--output", output_arg.as_str()]);
    let result = run_cli(&args);
    assert!(
        result.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("Patched:                  3"));
    assert!(stdout.contains("013BC2:Skyrim.esm (BanditElite): +AlchemySkillBoosts, +PerkSkillBoosts [repaired name, short name]"));

    let written: Value =
        serde_json::from_slice(&fs::read(&output).expect("patch written")).expect("valid JSON");
    assert_eq!(written["name"], "NPCEnchantFix.esp");
    assert_eq!(written["npcs"].as_array().map(Vec::len), Some(3));

    let _ = fs::remove_file(&output);
}

#[test]
fn cli_dry_run_json_report_writes_nothing() {
    let plugins = load_order_args();
    let mut args: Vec<&str> = plugins.iter().map(String::as_str).collect();
    args.extend(["--dry-run", "--json", "--no-name-fix"]);
    let result = run_cli(&args);
    assert!(result.status.success());

    let report: Value = serde_json::from_slice(&result.stdout).expect("report is JSON");
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["examined"], 4);
    assert_eq!(report["inherits_spell_list"], 1);
    assert_eq!(report["perks_added"], 4);
    assert_eq!(report["names_repaired"], 0);
    assert_eq!(report["patched"][0]["editor_id"], "BanditArcher");
    assert_eq!(report["patched"][0]["added_perks"][0], "PerkSkillBoosts");
}

#[test]
fn cli_reads_settings_file() {
    let settings = temp_path("npc_enchant_fix_cli_settings", "json");
    fs::write(&settings, br#"{"source_language": "english"}"#).expect("write settings");
    let settings_arg = settings.to_string_lossy().to_string();

    let plugins = load_order_args();
    let mut args: Vec<&str> = plugins.iter().map(String::as_str).collect();
    args.extend(["--dry-run", "--json", "--settings", settings_arg.as_str()]);
    let result = run_cli(&args);
    assert!(result.status.success());

    let report: Value = serde_json::from_slice(&result.stdout).expect("report is JSON");
    // Only BanditElite has an English name.
    assert_eq!(report["names_repaired"], 1);

    let _ = fs::remove_file(&settings);
}

#[test]
fn cli_requires_output_without_dry_run() {
    let plugins = load_order_args();
    let args: Vec<&str> = plugins.iter().map(String::as_str).collect();
    let result = run_cli(&args);
    assert_eq!(result.status.code(), Some(2));
}

#[test]
fn cli_rejects_unknown_language() {
    let plugins = load_order_args();
    let mut args: Vec<&str> = plugins.iter().map(String::as_str).collect();
    args.extend(["--dry-run", "--language", "klingon"]);
    let result = run_cli(&args);
    assert_eq!(result.status.code(), Some(2));
}

#[test]
fn cli_reports_missing_plugin() {
    let missing = fixture_path("Missing.esp.json");
    let missing = missing.to_string_lossy().to_string();
    let result = run_cli(&[missing.as_str(), "--dry-run"]);
    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Error loading load order"));
}
