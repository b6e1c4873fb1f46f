//! End-to-end CLI integration tests for the `kado` binary.
//!
//! Each test writes its `.kd` files into a temporary directory and runs the
//! `kado` binary there as a subprocess via `assert_cmd`. No test needs
//! terraform, ansible or opa installed.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn kado() -> Command {
    let mut cmd = Command::cargo_bin("kado").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (name, content) in files {
        write(tmp.path(), name, content);
    }
    tmp
}

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

const CANONICAL: &str = "\
# provisioning
bead \"terraform\" {
  relay = \"opa\"
}

bead \"opa\" {
  input = \"terraform/plan.json\"
  path = \"policy.rego\"
}
";

// ---------------------------------------------------------------------------
// version / completion
// ---------------------------------------------------------------------------

#[test]
fn version_prints_name_and_version() {
    kado()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("kado version "));
}

#[test]
fn version_json() {
    let output = kado().args(["version", "--json"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn version_reports_configured_opa_binary() {
    let tmp = project(&[]);
    kado()
        .arg("version")
        .env("KADO_OPA_BINARY", "/opt/opa/bin/opa")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("opa: /opt/opa/bin/opa (query data.terraform.allow)"));
}

#[test]
fn completion_generates_script() {
    kado()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kado"));
}

// ---------------------------------------------------------------------------
// fmt / lint
// ---------------------------------------------------------------------------

#[test]
fn fmt_rewrites_and_then_lints_clean() {
    let messy = "\n\n# provisioning\n   bead \"terraform\" {\nrelay=opa\n    }\n\n\n\nbead \"opa\"{\n      input = terraform/plan.json\n path = \"policy.rego\"\n}\n\n";
    let tmp = project(&[("infra.kd", messy)]);

    kado()
        .arg("lint")
        .current_dir(tmp.path())
        .assert()
        .failure();

    kado()
        .arg("fmt")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("formatted infra.kd"))
        .stdout(predicate::str::contains("1 of 1 file(s) reformatted"));

    let formatted = std::fs::read_to_string(tmp.path().join("infra.kd")).unwrap();
    assert_eq!(formatted, CANONICAL);

    kado()
        .arg("lint")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("no lint violations"));
}

#[test]
fn fmt_on_canonical_file_changes_nothing() {
    let tmp = project(&[("infra.kd", CANONICAL)]);
    kado()
        .args(["fmt", "."])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0 of 1 file(s) reformatted"));
    let after = std::fs::read_to_string(tmp.path().join("infra.kd")).unwrap();
    assert_eq!(after, CANONICAL);
}

#[test]
fn fmt_reaches_nested_files_and_skips_the_landing_zone() {
    let cloned = "bead \"opa\" {\npath = p\n}\n";
    let tmp = project(&[
        ("envs/prod.kd", "bead \"opa\" {\npath = p\n}\n"),
        ("LandingZone/terraform/cloned.kd", cloned),
    ]);

    kado()
        .arg("fmt")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("formatted envs/prod.kd"))
        .stdout(predicate::str::contains("1 of 1 file(s) reformatted"));

    kado()
        .arg("lint")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("no lint violations"));

    let untouched =
        std::fs::read_to_string(tmp.path().join("LandingZone/terraform/cloned.kd")).unwrap();
    assert_eq!(untouched, cloned);
}

#[test]
fn lint_reports_unclosed_block_at_last_line() {
    let tmp = project(&[("nested/open.kd", "bead \"opa\" {\n  path = \"p.rego\"\n")]);

    kado()
        .arg("lint")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "nested/open.kd:2: unclosed bead block at end of file",
        ))
        .stderr(predicate::str::contains("1 lint violation(s) found"));
}

#[test]
fn lint_json_lists_violations_and_never_modifies() {
    let text = "bead \"opa\" {\n    path = \"p.rego\"\n}\n";
    let tmp = project(&[("a.kd", text)]);

    let output = kado()
        .args(["lint", "--json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let violations = json.as_array().unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0]["file"], "a.kd");
    assert_eq!(violations[0]["line"], 2);

    assert_eq!(std::fs::read_to_string(tmp.path().join("a.kd")).unwrap(), text);
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn config_prints_chains_with_arrows() {
    let tmp = project(&[
        ("infra.kd", CANONICAL),
        ("post.kd", "bead \"ansible\" {\n  playbook = \"site.yml\"\n}\n"),
    ]);

    kado()
        .arg("config")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Bead: terraform\n  relay = opa\n↓\nBead: opa\n",
        ))
        .stdout(predicate::str::contains("\nBead: ansible\n  playbook = site.yml\n"));
}

#[test]
fn config_json_keeps_first_declaration_of_duplicates() {
    let tmp = project(&[
        ("a.kd", "bead \"terraform\" {\n  refs = \"v1\"\n}\n"),
        ("b.kd", "bead \"terraform\" {\n  refs = \"v2\"\n  source = \"x\"\n}\n"),
    ]);

    let output = kado()
        .args(["config", "--json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let chains = json["chains"].as_array().unwrap();
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0][0]["kind"], "terraform");
    assert_eq!(chains[0][0]["fields"]["refs"], "v1");
    assert!(chains[0][0]["fields"].get("source").is_none());
}

#[test]
fn config_loads_beads_from_subdirectories() {
    let tmp = project(&[
        ("infra.kd", "bead \"terraform\" {\n  relay = \"opa\"\n}\n"),
        ("policy/gate.kd", "bead \"opa\" {\n  path = \"policy.rego\"\n}\n"),
        ("LandingZone/ansible/site.kd", "bead \"ansible\" {\n}\n"),
    ]);

    kado()
        .arg("config")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Bead: terraform\n  relay = opa\n↓\nBead: opa\n  path = policy.rego\n",
        ))
        .stdout(predicate::str::contains("Bead: ansible").not());
}

#[test]
fn config_honours_dir_flag() {
    let tmp = project(&[("infra/main.kd", CANONICAL)]);
    kado()
        .args(["-C", "infra", "config"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Bead: opa"));
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_reports_skipped_beads() {
    let tmp = project(&[
        (
            "infra.kd",
            "bead \"terraform\" {\n  enabled = false\n}\n\nbead \"pulumi\" {\n  stack = \"dev\"\n}\n",
        ),
        ("cluster.yaml", "cluster:\n  name: dev\n"),
    ]);

    kado()
        .arg("run")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped beads:"))
        .stdout(predicate::str::contains("  - terraform (disabled)"))
        .stdout(predicate::str::contains("  - pulumi (invalid name)"))
        .stdout(predicate::str::contains("Processed beads").not());

    assert!(tmp.path().join("LandingZone").is_dir());
}

#[test]
fn default_command_renders_templates_for_ansible() {
    let tmp = project(&[
        ("site.kd", "bead \"ansible\" {\n  inventory = \"hosts\"\n}\n"),
        (
            "cluster.yaml",
            "cluster:\n  name: dev\nhosts: [web1, web2]\nkado:\n  templates:\n    - templates/inventory.tmpl\n",
        ),
        (
            "templates/inventory.tmpl",
            "<inventory.ini>\n[{{ cluster.name }}]\n{{ join \"hosts\" \"\\n\" }}\n",
        ),
    ]);
    write(tmp.path(), "LandingZone/stale.txt", "old");

    kado()
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed beads:\n  - ansible\n"));

    let inventory = std::fs::read_to_string(tmp.path().join("LandingZone/inventory.ini")).unwrap();
    assert_eq!(inventory, "[dev]\nweb1\nweb2\n");
    assert!(!tmp.path().join("LandingZone/stale.txt").exists());
}

#[test]
fn run_json_summary() {
    let tmp = project(&[
        ("site.kd", "bead \"ansible\" {\n}\n"),
        ("prod.yaml", "kado:\n  templates: []\n"),
    ]);

    let output = kado()
        .args(["run", "prod.yaml", "--json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["apply"], false);
    assert_eq!(json["processed"], serde_json::json!(["ansible"]));
    assert_eq!(json["decisions"], serde_json::json!([]));
}

#[test]
fn missing_data_file_is_fatal() {
    let tmp = project(&[("infra.kd", CANONICAL)]);
    kado()
        .arg("run")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: failed to load data file"));
}

#[test]
fn policy_failure_names_the_bead() {
    let tmp = project(&[
        ("gate.kd", "bead \"opa\" {\n  path = \"policy.rego\"\n}\n"),
        ("cluster.yaml", "{}\n"),
    ]);

    kado()
        .arg("set")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "failed to process bead opa: input path not specified in bead",
        ));
}

#[test]
fn landing_zone_from_settings_file() {
    let tmp = project(&[
        (".kado.yaml", "landing_zone: work\n"),
        ("cluster.yaml", "{}\n"),
    ]);
    kado().arg("run").current_dir(tmp.path()).assert().success();
    assert!(tmp.path().join("work").is_dir());
    assert!(!tmp.path().join("LandingZone").exists());
}
