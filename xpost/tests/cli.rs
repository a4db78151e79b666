//! CLI integration tests for xpost
//!
//! None of these reach the network: they exercise argument handling,
//! configuration errors and platforms that are not configured.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const ARTICLE: &str = "+++\ntitle = \"Hello\"\ntags = [\"rust\"]\n+++\n\nBody text.\n";

struct TestEnv {
    dir: TempDir,
    config: PathBuf,
}

impl TestEnv {
    fn new(config: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, config).unwrap();
        Self {
            dir,
            config: config_path,
        }
    }

    fn article(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("xpost").unwrap();
        cmd.env("XPOST_CONFIG", &self.config)
            .env_remove("DEVTO_API_KEY")
            .env_remove("HASHNODE_TOKEN")
            .env_remove("HASHNODE_PUBLICATION_ID")
            .env_remove("RUST_LOG");
        cmd
    }
}

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("xpost").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cross-post markdown articles"))
        .stdout(predicate::str::contains("post"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("auth"))
        .stdout(predicate::str::contains("--format"));
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("xpost").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("xpost"));
}

#[test]
fn test_missing_article_is_invalid_input() {
    let env = TestEnv::new("");
    env.cmd()
        .args(["post", "does-not-exist.md"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Failed to read markdown file"));
}

#[test]
fn test_article_without_title_is_invalid_input() {
    let env = TestEnv::new("");
    let article = env.article("untitled.md", "Just some text.\n");
    env.cmd()
        .arg("post")
        .arg(&article)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("no title"));
}

#[test]
fn test_unconfigured_platform_is_reported() {
    let env = TestEnv::new("");
    let article = env.article("hello.md", ARTICLE);
    env.cmd()
        .arg("post")
        .arg(&article)
        .args(["--platform", "medium"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "✗ medium: Platform medium not configured",
        ))
        .stdout(predicate::str::contains("0/1 platform(s) succeeded"));
}

#[test]
fn test_verbose_prints_progress() {
    let env = TestEnv::new("");
    let article = env.article("hello.md", ARTICLE);
    env.cmd()
        .args(["--verbose", "post"])
        .arg(&article)
        .args(["--platform", "medium"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("create on medium..."))
        .stderr(predicate::str::contains(
            "medium failed: Platform medium not configured",
        ));
}

#[test]
fn test_json_report() {
    let env = TestEnv::new("");
    let article = env.article("hello.md", ARTICLE);
    let output = env
        .cmd()
        .args(["--format", "json", "post"])
        .arg(&article)
        .args(["--platform", "devto,hashnode"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["total"], 2);
    assert_eq!(report["successful"], 0);
    assert_eq!(report["failed"], 2);
    assert_eq!(report["results"][0]["platform"], "devto");
    assert_eq!(report["results"][1]["platform"], "hashnode");
    assert_eq!(report["results"][1]["success"], false);
}

#[test]
fn test_malformed_id_is_invalid_input() {
    let env = TestEnv::new("");
    let article = env.article("hello.md", ARTICLE);
    env.cmd()
        .arg("update")
        .arg(&article)
        .args(["--id", "devto"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Expected KEY=ID"));
}

#[test]
fn test_get_unknown_platform() {
    let env = TestEnv::new("");
    env.cmd()
        .args(["get", "devto", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Platform devto not configured"));
}

#[test]
fn test_list_rejects_zero_page_size() {
    let env = TestEnv::new("");
    env.cmd()
        .args(["list", "devto", "--per-page", "0"])
        .assert()
        .code(3);
}

#[test]
fn test_auth_without_platforms() {
    let env = TestEnv::new("");
    env.cmd()
        .arg("auth")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No platforms configured"));
}

#[test]
fn test_incomplete_platform_section() {
    let env = TestEnv::new("[hashnode]\ntoken = \"abc\"\n");
    env.cmd()
        .arg("auth")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("hashnode.publication_id"));
}

#[test]
fn test_invalid_format_rejected() {
    let env = TestEnv::new("");
    env.cmd()
        .args(["--format", "xml", "auth"])
        .assert()
        .failure();
}
