//! Integration tests for indexing and link graph commands.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn palace_cmd(config: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("palace"));
    cmd.env_remove("RUST_LOG");
    cmd.args(["--config", config.to_str().unwrap()]);
    cmd
}

fn write_note(vault: &Path, rel: &str, content: &str) {
    let path = vault.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn create_vault(root: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let vault = root.join("vault");
    write_note(
        &vault,
        "projects/palace.md",
        "---\ntitle: Palace\ntype: project\ntags: [rust]\n---\nUses [[SQLite]] and [[Ghost Note]].\n",
    );
    write_note(&vault, "tech/sqlite.md", "---\ntitle: SQLite\ntype: tech\n---\nEmbedded database.\n");
    write_note(&vault, "daily/today.md", "# Today\n\nWorked on [[Palace]].\n");
    write_note(&vault, "templates/skip.md", "# Template\n\n[[Palace]]\n");

    let config = root.join("config.toml");
    fs::write(
        &config,
        format!(
            "version = 1\n\n[logging]\nlevel = \"warn\"\n\n\
             [vaults.main]\npath = \"{}\"\nexcluded_folders = [\"templates\"]\n",
            vault.display()
        ),
    )
    .unwrap();
    (vault, config)
}

#[test]
fn reindex_reports_counts() {
    let tmp = tempdir().unwrap();
    let (vault, config) = create_vault(tmp.path());

    palace_cmd(&config)
        .args(["reindex", "--verbose"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexing complete:"))
        .stdout(predicate::str::contains("Files found:    3"))
        .stdout(predicate::str::contains("Inserted:       3"))
        .stdout(predicate::str::contains("projects/palace.md"));

    assert!(vault.join(".palace/index.db").exists());

    // Second run: nothing changed.
    palace_cmd(&config)
        .arg("reindex")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unchanged:      3"));
}

#[test]
fn reindex_full_rebuilds() {
    let tmp = tempdir().unwrap();
    let (_vault, config) = create_vault(tmp.path());

    palace_cmd(&config).arg("reindex").assert().success();
    palace_cmd(&config)
        .args(["reindex", "--full"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Inserted:       3"));
}

#[test]
fn stats_json_counts_notes_and_links() {
    let tmp = tempdir().unwrap();
    let (_vault, config) = create_vault(tmp.path());
    palace_cmd(&config).arg("reindex").assert().success();

    let output = palace_cmd(&config).args(["stats", "--json"]).output().unwrap();
    assert!(output.status.success());

    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["notes"], 3);
    assert_eq!(stats["links"], 3);
    assert_eq!(stats["by_type"]["project"], 1);
}

#[test]
fn links_shows_both_directions() {
    let tmp = tempdir().unwrap();
    let (_vault, config) = create_vault(tmp.path());
    palace_cmd(&config).arg("reindex").assert().success();

    palace_cmd(&config)
        .args(["links", "./projects/palace.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Incoming links (1) ==="))
        .stdout(predicate::str::contains("daily/today.md"))
        .stdout(predicate::str::contains("=== Outgoing links (2) ==="))
        .stdout(predicate::str::contains("[[SQLite]] -> tech/sqlite.md"))
        .stdout(predicate::str::contains("[[Ghost Note]] (unresolved)"));

    palace_cmd(&config)
        .args(["links", "projects/palace.md", "--incoming"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Outgoing").not());
}

#[test]
fn links_unknown_note_fails() {
    let tmp = tempdir().unwrap();
    let (_vault, config) = create_vault(tmp.path());
    palace_cmd(&config).arg("reindex").assert().success();

    palace_cmd(&config)
        .args(["links", "nowhere.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Note not found in index"));
}

#[test]
fn graph_walks_both_directions() {
    let tmp = tempdir().unwrap();
    let (_vault, config) = create_vault(tmp.path());
    palace_cmd(&config).arg("reindex").assert().success();

    let output = palace_cmd(&config)
        .args(["graph", "tech/sqlite.md", "--direction", "incoming", "--depth", "5", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let nodes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let nodes = nodes.as_array().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0]["note"]["path"], "projects/palace.md");
    assert_eq!(nodes[0]["depth"], 1);
    assert_eq!(nodes[1]["note"]["path"], "daily/today.md");
    assert_eq!(nodes[1]["depth"], 2);

    palace_cmd(&config)
        .args(["graph", "tech/sqlite.md", "--direction", "sideways"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid direction"));
}
