//! Unlinked mention commands: preview and apply.

use palace_core::config::ResolvedConfig;
use palace_core::retro::{ApplyOptions, ApplyOutcome, ApplyReport, RetroPreview, RetroTarget};
use palace_core::vaults::VaultRegistry;

use super::output::print_json;
use super::{fail, note_path};
use crate::{LinkMentionsArgs, MentionsArgs};

fn load_target(registry: &mut VaultRegistry, alias: &str, note: &str) -> RetroTarget {
    let path = note_path(note);
    let db = match registry.db(alias) {
        Ok(db) => db,
        Err(e) => fail(format!("Error opening index: {}", e)),
    };

    match RetroTarget::load(db, &path) {
        Ok(target) => target,
        Err(e) => {
            eprintln!("{}", e);
            fail("Hint: Check the path or run 'palace reindex'.");
        }
    }
}

pub fn run_preview(rc: &ResolvedConfig, args: MentionsArgs) {
    let alias = rc.default_vault.as_str();
    let mut registry = VaultRegistry::from_config(rc);
    let target = load_target(&mut registry, alias, &args.note);

    let preview = match registry.preview_retroactive_links(alias, &target) {
        Ok(preview) => preview,
        Err(e) => fail(format!("Error scanning for mentions: {}", e)),
    };

    if args.json {
        print_json(&preview);
    } else {
        print_preview(&preview);
    }
}

pub fn run_apply(rc: &ResolvedConfig, args: LinkMentionsArgs) {
    let alias = rc.default_vault.as_str();
    let mut registry = VaultRegistry::from_config(rc);
    let target = load_target(&mut registry, alias, &args.note);

    let options = ApplyOptions {
        confirm: args.confirm,
        max_notes: args.max_notes.unwrap_or(rc.retro_linking.max_notes),
    };
    if options.max_notes == 0 {
        fail("--max-notes must be at least 1");
    }

    let outcome = match registry.apply_retroactive_links(alias, &target, &options) {
        Ok(outcome) => outcome,
        Err(e) => fail(format!("Error linking mentions: {}", e)),
    };

    if args.json {
        print_json(&outcome);
    } else {
        match &outcome {
            ApplyOutcome::Preview(preview) => {
                print_preview(preview);
                if !preview.candidates.is_empty() {
                    println!();
                    println!("Dry run: re-run with --confirm to write these links.");
                }
            }
            ApplyOutcome::Applied(report) => print_report(&target, report),
        }
    }

    if let Err(e) = registry.close_all() {
        fail(format!("Error closing index: {}", e));
    }

    if let ApplyOutcome::Applied(report) = &outcome
        && !report.errors.is_empty()
    {
        fail(format!("{} note(s) could not be updated", report.errors.len()));
    }
}

fn print_preview(preview: &RetroPreview) {
    if preview.candidates.is_empty() {
        println!("No unlinked mentions of '{}' found.", preview.target.title);
        return;
    }

    println!(
        "{} unlinked mention(s) of '{}' in {} note(s):",
        preview.total_mentions,
        preview.target.title,
        preview.notes_affected()
    );
    for candidate in &preview.candidates {
        println!();
        println!("  {} ({})", candidate.path.display(), candidate.mention_count);
        for snippet in &candidate.snippets {
            println!("    {:>4}: {}", snippet.line, snippet.text);
        }
    }
}

fn print_report(target: &RetroTarget, report: &ApplyReport) {
    println!(
        "Linked {} mention(s) of '{}' in {} note(s).",
        report.links_added(),
        target.title,
        report.applied.len()
    );
    for note in &report.applied {
        println!("  updated  {} (+{})", note.path.display(), note.links_added);
    }
    for failure in &report.errors {
        println!("  failed   {}: {}", failure.path.display(), failure.error);
    }
    if report.remaining > 0 {
        println!();
        println!("{} more note(s) left; run again to continue.", report.remaining);
    }
}
