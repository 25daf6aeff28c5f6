// snipkey-cli: shared utilities for CLI tools.

use std::collections::BTreeMap;
use std::process;

use snipkey_automaton::manager::EngineKind;
use snipkey_core::rule::RuleConfig;
use snipkey_expand::config::{RuleTable, rule_configs};

/// Load a JSON rule table from disk and convert it to rule configs.
pub fn load_rule_table(path: &str) -> Result<BTreeMap<String, RuleConfig>, String> {
    let data =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read {path}: {e}"))?;
    let table: RuleTable =
        serde_json::from_str(&data).map_err(|e| format!("failed to parse {path}: {e}"))?;
    Ok(rule_configs(table))
}

/// Parse an `--engine=trie|dfa` or `-e NAME` argument.
///
/// Returns `(engine, remaining_args)`; defaults to the compiled table.
pub fn parse_engine(args: &[String]) -> (EngineKind, Vec<String>) {
    let mut engine = EngineKind::default();
    let mut remaining = Vec::new();
    let mut skip_next = false;

    for (i, arg) in args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if let Some(val) = arg.strip_prefix("--engine=") {
            engine = engine_by_name(val);
        } else if arg == "--engine" || arg == "-e" {
            if i + 1 < args.len() {
                engine = engine_by_name(&args[i + 1]);
                skip_next = true;
            } else {
                eprintln!("error: {arg} requires a value");
                process::exit(1);
            }
        } else {
            remaining.push(arg.clone());
        }
    }

    (engine, remaining)
}

fn engine_by_name(name: &str) -> EngineKind {
    match name {
        "dfa" => EngineKind::Dfa,
        "trie" => EngineKind::Trie,
        other => fatal(&format!("unknown engine {other:?} (expected dfa or trie)")),
    }
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

/// Check if `--help` or `-h` is in the args.
pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|a| a == "--help" || a == "-h")
}
