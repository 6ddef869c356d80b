use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use enchant_fix_core::core_api::{
    DEFAULT_PATCH_NAME, LoadOrderStore, NameField, PatchReport, PatchSettings, Patcher,
};
use enchant_fix_core::language::Language;
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Plugin JSON files, lowest priority first.
    #[arg(value_name = "PLUGIN.json", required = true)]
    plugins: Vec<PathBuf>,
    #[arg(long, value_name = "PATH", required_unless_present = "dry_run")]
    output: Option<PathBuf>,
    #[arg(long = "patch-name", value_name = "NAME", default_value = DEFAULT_PATCH_NAME)]
    patch_name: String,
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,
    #[arg(long = "no-name-fix")]
    no_name_fix: bool,
    #[arg(long, value_name = "LANGUAGE", value_parser = parse_language)]
    language: Option<Language>,
    #[arg(long = "dry-run", conflicts_with = "output")]
    dry_run: bool,
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut settings = match &cli.settings {
        Some(path) => {
            let bytes = fs::read(path).unwrap_or_else(|e| {
                eprintln!("Error reading {}: {e}", path.display());
                process::exit(1);
            });
            PatchSettings::from_json_bytes(&bytes).unwrap_or_else(|e| {
                eprintln!("Error parsing settings file: {}", path.display());
                eprintln!("  {e}");
                process::exit(1);
            })
        }
        None => PatchSettings::default(),
    };
    if cli.no_name_fix {
        settings.repair_names = false;
    }
    if let Some(language) = cli.language {
        settings.source_language = language;
    }

    let mut store =
        LoadOrderStore::load_paths(&cli.plugins, cli.patch_name.as_str()).unwrap_or_else(|e| {
            eprintln!("Error loading load order:");
            eprintln!("  {e}");
            process::exit(1);
        });
    if let Some(output) = &cli.output {
        store = store.with_output(output);
    }

    let patcher = Patcher::new(&settings);
    let result = if cli.dry_run {
        patcher.run(&mut store)
    } else {
        patcher.run_and_commit(&mut store)
    };
    let report = result.unwrap_or_else(|e| {
        eprintln!("Error patching NPC records:");
        eprintln!("  {e}");
        process::exit(1);
    });

    if cli.json {
        let json = JsonValue::Object(report_json(&report, &cli.patch_name, cli.dry_run));
        let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        });
        println!("{rendered}");
        return;
    }

    print_report(&report);
    match &cli.output {
        Some(path) => println!("Wrote {} to {}", cli.patch_name, path.display()),
        None => println!("Dry run: no patch written"),
    }
}

fn parse_language(raw: &str) -> Result<Language, String> {
    raw.parse()
}

fn report_json(report: &PatchReport, patch_name: &str, dry_run: bool) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();
    out.insert(
        "patch".to_string(),
        JsonValue::String(patch_name.to_string()),
    );
    out.insert("dry_run".to_string(), JsonValue::Bool(dry_run));
    out.insert("examined".to_string(), JsonValue::from(report.examined));
    out.insert(
        "inherits_spell_list".to_string(),
        JsonValue::from(report.inherits_spell_list),
    );
    out.insert(
        "already_complete".to_string(),
        JsonValue::from(report.already_complete),
    );
    out.insert(
        "perks_added".to_string(),
        JsonValue::from(report.perks_added()),
    );
    out.insert(
        "names_repaired".to_string(),
        JsonValue::from(report.names_repaired()),
    );
    let patched = serde_json::to_value(&report.patched).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    out.insert("patched".to_string(), patched);
    out
}

fn print_report(report: &PatchReport) {
    println!("NPCs examined:            {}", report.examined);
    println!("Perk list from template:  {}", report.inherits_spell_list);
    println!("Already complete:         {}", report.already_complete);
    println!("Patched:                  {}", report.patched.len());

    for record in &report.patched {
        let label = match &record.editor_id {
            Some(editor_id) => format!("{} ({editor_id})", record.form_key),
            None => record.form_key.to_string(),
        };
        let perks: Vec<String> = record.added_perks.iter().map(|p| format!("{p:?}")).collect();
        let mut line = format!("  {label}: +{}", perks.join(", +"));
        if !record.repaired_names.is_empty() {
            let names: Vec<&str> = record
                .repaired_names
                .iter()
                .map(|field| match field {
                    NameField::Name => "name",
                    NameField::ShortName => "short name",
                })
                .collect();
            line.push_str(&format!(" [repaired {}]", names.join(", ")));
        }
        println!("{line}");
    }
}
