use assert_cmd::prelude::*;
use std::{fs, path::Path, process::Command};
use tempfile::tempdir;

const COINS_JSON: &str = r#"[
  {"name":"Bitcoin","symbol":"BTC","is_new":false,"is_active":true,"type":"coin"},
  {"name":"Ethereum","symbol":"ETH","is_new":true,"is_active":true,"type":"coin"},
  {"name":"Ripple","symbol":"XRP","is_new":false,"is_active":false,"type":"token"}
]"#;

fn coinlist() -> Command {
    let mut cmd = Command::cargo_bin("coinlist").unwrap();
    cmd.env_remove("COINLIST__DEFAULT__ROOT")
        .env_remove("COINLIST__DEFAULT__BACKEND");
    cmd
}

fn import_fixture(root: &Path) {
    let src = root.join("coins.json");
    fs::write(&src, COINS_JSON).unwrap();
    let output = coinlist()
        .args(["import", "--from"])
        .arg(&src)
        .arg("--root")
        .arg(root)
        .output()
        .unwrap();
    assert!(output.status.success());
    let s = String::from_utf8_lossy(&output.stdout);
    assert!(s.contains("Imported: 3"), "summary missing or incorrect: {}", s);
}

fn list_symbols(root: &Path, extra: &[&str]) -> Vec<String> {
    let output = coinlist()
        .arg("list")
        .arg("--root")
        .arg(root)
        .args(["--format", "json"])
        .args(extra)
        .output()
        .unwrap();
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    v.as_array()
        .unwrap()
        .iter()
        .map(|c| c["symbol"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn import_then_list_with_toggles_and_search() {
    let tmp = tempdir().unwrap();
    import_fixture(tmp.path());

    assert_eq!(list_symbols(tmp.path(), &[]), ["BTC", "ETH", "XRP"]);
    assert_eq!(
        list_symbols(tmp.path(), &["--filter", "Active Coins"]),
        ["BTC", "ETH"]
    );
    assert_eq!(
        list_symbols(
            tmp.path(),
            &["--filter", "Active Coins", "--filter", "New Coins"]
        ),
        ["BTC", "ETH", "ETH"]
    );
    assert_eq!(
        list_symbols(
            tmp.path(),
            &[
                "--filter",
                "Active Coins",
                "--filter",
                "New Coins",
                "--search",
                "eth"
            ]
        ),
        ["ETH", "ETH"]
    );
    assert_eq!(
        list_symbols(tmp.path(), &["--filter", "Only Tokens"]),
        ["XRP"]
    );
}

#[test]
fn unknown_filter_label_fails() {
    let tmp = tempdir().unwrap();
    import_fixture(tmp.path());
    coinlist()
        .arg("list")
        .arg("--root")
        .arg(tmp.path())
        .args(["--filter", "Meme Coins"])
        .assert()
        .failure();
}

#[test]
fn query_is_conjunctive_and_clear_empties_cache() {
    let tmp = tempdir().unwrap();
    import_fixture(tmp.path());

    let output = coinlist()
        .arg("query")
        .arg("--root")
        .arg(tmp.path())
        .args(["--active", "true", "--new", "true", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let arr = v.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["symbol"], "ETH");

    coinlist()
        .arg("clear")
        .arg("--root")
        .arg(tmp.path())
        .assert()
        .success();
    assert!(list_symbols(tmp.path(), &[]).is_empty());
}

#[test]
fn dry_run_import_leaves_cache_alone() {
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("coins.json");
    fs::write(&src, COINS_JSON).unwrap();
    let output = coinlist()
        .args(["import", "--dry-run", "--from"])
        .arg(&src)
        .arg("--root")
        .arg(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Parsed: 3 (dry run)"));
    assert!(list_symbols(tmp.path(), &[]).is_empty());
}

#[test]
fn fetch_from_unreachable_source_fails() {
    let tmp = tempdir().unwrap();
    coinlist()
        .arg("fetch")
        .arg("--root")
        .arg(tmp.path())
        .args(["--url", "http://127.0.0.1:9/coins", "--timeout", "2"])
        .assert()
        .failure();
}

#[test]
fn explicit_root_and_backend_override_env_config() {
    let tmp = tempdir().unwrap();
    import_fixture(tmp.path());
    let elsewhere = tempdir().unwrap();

    let output = coinlist()
        .env("COINLIST__DEFAULT__ROOT", elsewhere.path())
        .env("COINLIST__DEFAULT__BACKEND", "ephemeral")
        .args(["list", "--backend", "local", "--format", "json", "--root"])
        .arg(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v.as_array().unwrap().len(), 3);
}
