//! List rules command implementation.

use symlint_rules::{all_rules, Preset};

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<8} {:<36} {:<8} Description", "Code", "Name", "Severity");
    println!("{}", "-".repeat(100));

    for rule in all_rules() {
        println!(
            "{:<8} {:<36} {:<8} {}",
            rule.code(),
            rule.name(),
            rule.default_severity(),
            rule.description()
        );
    }
    println!(
        "{:<8} {:<36} {:<8} {}",
        "SLD001", "invocation-rule", "config", "Declarative [[invocation-rule]] tables"
    );

    println!("\nPresets:");
    for (name, preset) in [
        ("recommended", Preset::Recommended),
        ("strict", Preset::Strict),
        ("minimal", Preset::Minimal),
    ] {
        let default = if preset == Preset::default() {
            " (default)"
        } else {
            ""
        };
        println!("  {name:<12} - {}{default}", preset.rule_names().join(", "));
    }

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  symlint check --rules no-local-clock,prefer-async-alternative");
    println!("  symlint check --rules SL001,SL005,invocation-rule");
}
