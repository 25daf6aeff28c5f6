// snipkey-run: Feed stdin through an expander and print what fires.
//
// Reads a JSON rule table, then consumes stdin character by character
// (newlines count as boundary characters). Each expansion is printed as:
//   E: "trigger" -> "output" (erase N)
//
// Usage:
//   snipkey-run RULES.JSON [OPTIONS]
//
// Options:
//   -e, --engine NAME   Matching backend: dfa (default) or trie
//   -h, --help          Print help

use std::io::{self, Read, Write};

use snipkey_expand::expander::{Expander, ExpanderOptions};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (engine, args) = snipkey_cli::parse_engine(&args);

    if snipkey_cli::wants_help(&args) || args.is_empty() {
        println!("snipkey-run: Feed stdin through an expander and print what fires.");
        println!();
        println!("Usage: snipkey-run RULES.JSON [OPTIONS]");
        println!();
        println!("Each expansion is printed as:");
        println!("  E: \"trigger\" -> \"output\" (erase N)");
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
    let (mut expander, diagnostics) =
        Expander::new(rules, &options).unwrap_or_else(|e| snipkey_cli::fatal(&e.to_string()));
    for diagnostic in &diagnostics {
        eprintln!("warning: {}", diagnostic.message);
    }

    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        snipkey_cli::fatal(&format!("error reading stdin: {e}"));
    }

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    for c in input.chars() {
        if let Some(resolved) = expander.handle_character(c) {
            let _ = writeln!(
                out,
                "E: {:?} -> {:?} (erase {})",
                resolved.trigger, resolved.output, resolved.backspace_count
            );
        } else if let Some(err) = expander.take_output_error() {
            eprintln!("warning: {err}");
        }
    }
}
