//! Graph traversal command implementation.

use palace_core::config::ResolvedConfig;
use palace_core::graph::{LinkDirection, LinkGraph};
use palace_core::vaults::VaultRegistry;

use super::output::print_json;
use super::{fail, note_path};
use crate::GraphArgs;

pub fn run(rc: &ResolvedConfig, args: GraphArgs) {
    let Some(direction) = LinkDirection::parse(&args.direction) else {
        fail(format!(
            "Invalid direction '{}': expected incoming, outgoing or both",
            args.direction
        ));
    };

    let mut registry = VaultRegistry::from_config(rc);
    let db = match registry.db(&rc.default_vault) {
        Ok(db) => db,
        Err(e) => fail(format!("Error opening index: {}", e)),
    };

    let start = note_path(&args.note);
    let nodes = match LinkGraph::new(db).traverse(&start, direction, args.depth) {
        Ok(nodes) => nodes,
        Err(e) => fail(format!("Error traversing graph: {}", e)),
    };

    if args.json {
        print_json(&nodes);
        return;
    }

    if nodes.is_empty() {
        println!("(no linked notes within {} hops of {})", args.depth, start.display());
        return;
    }

    for node in &nodes {
        let arrow = match node.direction {
            LinkDirection::Incoming => "<-",
            _ => "->",
        };
        println!(
            "{}{} {}  ({})",
            "  ".repeat(node.depth - 1),
            arrow,
            node.note.path.display(),
            node.note.title
        );
    }
    println!();
    println!("{} note(s) reached", nodes.len());
}
