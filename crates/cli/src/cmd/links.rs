//! Links command implementation.

use palace_core::config::ResolvedConfig;
use palace_core::graph::{GraphLink, LinkGraph};
use palace_core::vaults::VaultRegistry;
use serde::Serialize;

use super::output::print_json;
use super::{fail, note_path};
use crate::LinksArgs;

/// Formatted link for JSON output.
#[derive(Debug, Serialize)]
struct LinkOutput {
    source: String,
    target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved: Option<String>,
}

impl From<&GraphLink> for LinkOutput {
    fn from(link: &GraphLink) -> Self {
        Self {
            source: link.source.path.to_string_lossy().to_string(),
            target: link.target.clone(),
            resolved: link.resolved.as_ref().map(|n| n.path.to_string_lossy().to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct LinksOutput {
    note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    incoming: Option<Vec<LinkOutput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outgoing: Option<Vec<LinkOutput>>,
}

pub fn run(rc: &ResolvedConfig, args: LinksArgs) {
    let mut registry = VaultRegistry::from_config(rc);
    let db = match registry.db(&rc.default_vault) {
        Ok(db) => db,
        Err(e) => fail(format!("Error opening index: {}", e)),
    };

    let path = note_path(&args.note);
    match db.get_note_by_path(&path) {
        Ok(Some(_)) => {}
        Ok(None) => {
            eprintln!("Note not found in index: {}", path.display());
            fail("Hint: Check the path or run 'palace reindex'.");
        }
        Err(e) => fail(format!("Error looking up note: {}", e)),
    }

    // Both directions unless one is requested
    let show_incoming = args.incoming || !args.outgoing;
    let show_outgoing = args.outgoing || !args.incoming;

    let graph = LinkGraph::new(db);
    let incoming = show_incoming.then(|| {
        graph.incoming_links(&path).unwrap_or_else(|e| fail(format!("Error getting incoming links: {}", e)))
    });
    let outgoing = show_outgoing.then(|| {
        graph.outgoing_links(&path).unwrap_or_else(|e| fail(format!("Error getting outgoing links: {}", e)))
    });

    if args.json {
        print_json(&LinksOutput {
            note: path.to_string_lossy().to_string(),
            incoming: incoming.as_ref().map(|l| l.iter().map(LinkOutput::from).collect()),
            outgoing: outgoing.as_ref().map(|l| l.iter().map(LinkOutput::from).collect()),
        });
        return;
    }

    if let Some(links) = &incoming {
        println!("=== Incoming links ({}) ===", links.len());
        for link in links {
            println!("  {}  [[{}]]", link.source.path.display(), link.target);
        }
    }
    if let Some(links) = &outgoing {
        if incoming.is_some() {
            println!();
        }
        println!("=== Outgoing links ({}) ===", links.len());
        for link in links {
            match &link.resolved {
                Some(note) => println!("  [[{}]] -> {}", link.target, note.path.display()),
                None => println!("  [[{}]] (unresolved)", link.target),
            }
        }
    }
}
