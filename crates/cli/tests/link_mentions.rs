//! Integration tests for `palace mentions` and `palace link-mentions`.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

fn palace_cmd(config: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("palace"));
    cmd.env_remove("RUST_LOG");
    cmd.args(["--config", config.to_str().unwrap()]);
    cmd
}

fn setup(root: &Path, max_notes: usize) -> (PathBuf, PathBuf) {
    let vault = root.join("vault");
    fs::create_dir_all(vault.join("research")).unwrap();
    fs::write(
        vault.join("research/docker.md"),
        "---\ntitle: Docker\n---\n# Docker\n\nContainer runtime.\n",
    )
    .unwrap();
    fs::write(
        vault.join("research/containers.md"),
        "---\ntitle: Containers\n---\nDocker is great. Use Docker for dev.\n",
    )
    .unwrap();
    fs::write(vault.join("research/ci.md"), "# CI\n\nBuilds run in docker.\n").unwrap();
    fs::write(vault.join("research/linked.md"), "See [[Docker]] for docker details.\n").unwrap();

    let config = root.join("config.toml");
    fs::write(
        &config,
        format!(
            "version = 1\n\n[logging]\nlevel = \"warn\"\n\n\
             [retro_linking]\nmax_notes = {}\n\n\
             [vaults.main]\npath = \"{}\"\n",
            max_notes,
            vault.display()
        ),
    )
    .unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("palace"));
    cmd.args(["--config", config.to_str().unwrap(), "reindex"]).assert().success();
    (vault, config)
}

#[test]
fn mentions_previews_candidates() {
    let tmp = tempdir().unwrap();
    let (_vault, config) = setup(tmp.path(), 10);

    palace_cmd(&config)
        .args(["mentions", "research/docker.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 unlinked mention(s) of 'Docker' in 2 note(s):"))
        .stdout(predicate::str::contains("research/containers.md (2)"))
        .stdout(predicate::str::contains("research/ci.md (1)"))
        .stdout(predicate::str::contains("research/linked.md").not());
}

#[test]
fn mentions_json_lists_snippets() {
    let tmp = tempdir().unwrap();
    let (_vault, config) = setup(tmp.path(), 10);

    let output = palace_cmd(&config)
        .args(["mentions", "research/docker.md", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let preview: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(preview["total_mentions"], 3);
    assert_eq!(preview["target"]["title"], "Docker");
    let first = &preview["candidates"][0];
    assert_eq!(first["path"], "research/ci.md");
    assert_eq!(first["snippets"][0]["text"], "Builds run in docker.");
}

#[test]
fn link_mentions_without_confirm_is_dry_run() {
    let tmp = tempdir().unwrap();
    let (vault, config) = setup(tmp.path(), 10);
    let before = fs::read_to_string(vault.join("research/containers.md")).unwrap();

    palace_cmd(&config)
        .args(["link-mentions", "research/docker.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run: re-run with --confirm"));

    let after = fs::read_to_string(vault.join("research/containers.md")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn link_mentions_confirm_writes_links() {
    let tmp = tempdir().unwrap();
    let (vault, config) = setup(tmp.path(), 10);

    palace_cmd(&config)
        .args(["link-mentions", "research/docker.md", "--confirm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Linked 3 mention(s) of 'Docker' in 2 note(s)."));

    let containers = fs::read_to_string(vault.join("research/containers.md")).unwrap();
    assert!(containers.contains("[[Docker]] is great. Use [[Docker]] for dev."));
    assert!(containers.contains("[[Docker]]"));

    let ci = fs::read_to_string(vault.join("research/ci.md")).unwrap();
    assert!(ci.contains("Builds run in [[Docker|docker]]."));

    // The index was updated in place: nothing left to link.
    palace_cmd(&config)
        .args(["mentions", "research/docker.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No unlinked mentions of 'Docker' found."));
}

#[test]
fn link_mentions_honours_max_notes() {
    let tmp = tempdir().unwrap();
    let (vault, config) = setup(tmp.path(), 1);

    palace_cmd(&config)
        .args(["link-mentions", "research/docker.md", "--confirm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("in 1 note(s)."))
        .stdout(predicate::str::contains("1 more note(s) left"));

    // Candidates are processed in path order: ci.md first.
    let ci = fs::read_to_string(vault.join("research/ci.md")).unwrap();
    assert!(ci.contains("[[Docker|docker]]"));
    let containers = fs::read_to_string(vault.join("research/containers.md")).unwrap();
    assert!(!containers.contains("[[Docker]]"));

    palace_cmd(&config)
        .args(["link-mentions", "research/docker.md", "--confirm", "--max-notes", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Linked 2 mention(s)"));
}

#[test]
fn link_mentions_unknown_target_fails() {
    let tmp = tempdir().unwrap();
    let (_vault, config) = setup(tmp.path(), 10);

    palace_cmd(&config)
        .args(["link-mentions", "research/podman.md", "--confirm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("note not found in index"))
        .stderr(predicate::str::contains("palace reindex"));
}

#[test]
fn link_mentions_refused_on_read_only_vault() {
    let tmp = tempdir().unwrap();
    let (vault, _config) = setup(tmp.path(), 10);

    let ro_config = tmp.path().join("ro.toml");
    fs::write(
        &ro_config,
        format!(
            "version = 1\n[logging]\nlevel = \"warn\"\n[vaults.main]\npath = \"{}\"\nmode = \"read-only\"\n",
            vault.display()
        ),
    )
    .unwrap();

    // Indexing a read-only vault is allowed; only notes are protected.
    fs::write(vault.join("research/new.md"), "More docker.\n").unwrap();
    palace_cmd(&ro_config)
        .arg("reindex")
        .assert()
        .success()
        .stdout(predicate::str::contains("Inserted:       1"));

    palace_cmd(&ro_config)
        .args(["link-mentions", "research/docker.md", "--confirm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("read-only"));

    palace_cmd(&ro_config)
        .args(["mentions", "research/docker.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("research/containers.md (2)"))
        .stdout(predicate::str::contains("research/new.md (1)"));
    assert_eq!(fs::read_to_string(vault.join("research/new.md")).unwrap(), "More docker.\n");
}
