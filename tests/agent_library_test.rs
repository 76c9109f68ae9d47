//! Tests for AgentLibrary directory scanning.

use std::fs;
use tempfile::TempDir;

use strictly_codenames::{AgentLibrary, LlmProvider};

fn make_agent_toml(dir: &TempDir, filename: &str, name: &str) {
    let content = format!(
        r#"name = "{name}"
llm_provider = "anthropic"
llm_model = "claude-3-5-haiku-20241022"
llm_max_tokens = 400
temperature = 0.2
"#
    );
    fs::write(dir.path().join(filename), content).expect("Failed to write TOML");
}

#[test]
fn test_scan_loads_sorted_configs() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    make_agent_toml(&dir, "zzz.toml", "Zebra");
    make_agent_toml(&dir, "aaa.toml", "Apple");
    make_agent_toml(&dir, "mmm.toml", "Mango");

    let library = AgentLibrary::scan(dir.path()).expect("Scan failed");
    assert_eq!(library.names(), ["Apple", "Mango", "Zebra"]);
    assert_eq!(library.agents()[0].llm_provider(), &LlmProvider::Anthropic);
}

#[test]
fn test_scan_skips_foreign_and_invalid_files() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    make_agent_toml(&dir, "good.toml", "GoodAgent");
    fs::write(dir.path().join("notes.txt"), "not a config").expect("Write failed");
    fs::write(dir.path().join("bad.toml"), "this is not valid toml !!!@@@").expect("Write failed");

    let library = AgentLibrary::scan(dir.path()).expect("Scan should succeed despite bad file");
    assert_eq!(library.len(), 1);
    assert_eq!(library.agents()[0].name(), "GoodAgent");
}

#[test]
fn test_scan_empty_or_missing_directory_fails() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    assert!(AgentLibrary::scan(dir.path()).is_err());
    assert!(AgentLibrary::scan("/this/path/does/not/exist/at/all").is_err());
}

#[test]
fn test_lookup_ignores_case() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    make_agent_toml(&dir, "alpha.toml", "Alpha");

    let library = AgentLibrary::scan(dir.path()).expect("Scan failed");
    assert!(library.get_by_name("alpha").is_some());
    assert!(library.get_by_name("beta").is_none());
}

#[test]
fn test_resolve_falls_back_to_file_path() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    make_agent_toml(&dir, "alpha.toml", "Alpha");
    let other = TempDir::new().expect("Failed to create temp dir");
    make_agent_toml(&other, "solo.toml", "Solo");

    let library = AgentLibrary::scan(dir.path()).expect("Scan failed");
    let path = other.path().join("solo.toml");
    let solo = library
        .resolve(path.to_str().expect("utf-8 path"))
        .expect("resolve by path");
    assert_eq!(solo.name(), "Solo");

    let err = library.resolve("Nobody").expect_err("unknown agent");
    assert!(err.message.contains("Alpha"));
}

#[test]
fn test_scan_bundled_agents_directory() {
    let library = AgentLibrary::scan("agents").expect("Scan of agents/ failed");
    assert!(library.get_by_name("o1-preview").is_some());
    let o1 = library.get_by_name("o1-preview").expect("o1 preset");
    assert!(*o1.inline_system_prompt());
}
