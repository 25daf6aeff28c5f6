// snipkey-check: Validate a JSON rule table.
//
// Loads the table, builds the matching machinery, and prints any
// diagnostics (indistinguishable rule pairs). Exits 1 when the table
// cannot be loaded or is rejected outright; diagnostics alone exit 0.
//
// Usage:
//   snipkey-check RULES.JSON [OPTIONS]
//
// Options:
//   -e, --engine NAME   Matching backend: dfa (default) or trie
//   -h, --help          Print help

use snipkey_expand::expander::{Expander, ExpanderOptions};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (engine, args) = snipkey_cli::parse_engine(&args);

    if snipkey_cli::wants_help(&args) || args.is_empty() {
        println!("snipkey-check: Validate a JSON rule table.");
        println!();
        println!("Usage: snipkey-check RULES.JSON [OPTIONS]");
        println!();
        println!("Exits 1 when the table cannot be loaded or is rejected;");
        println!("non-fatal diagnostics are printed and exit 0.");
        println!();
        println!("Options:");
        println!("  -e, --engine NAME   Matching backend: dfa (default) or trie");
        println!("  -h, --help          Print this help");
        return;
    }

    let rules = snipkey_cli::load_rule_table(&args[0]).unwrap_or_else(|e| snipkey_cli::fatal(&e));
    let options = ExpanderOptions {
        engine,
        ..ExpanderOptions::default()
    };
    let (expander, diagnostics) =
        Expander::new(rules, &options).unwrap_or_else(|e| snipkey_cli::fatal(&e.to_string()));

    for diagnostic in &diagnostics {
        println!("warning: {}", diagnostic.message);
    }
    println!(
        "ok: {} rules, {} diagnostics",
        expander.rules().len(),
        diagnostics.len()
    );
}
