//! Integration tests for the personas CLI
//!
//! Each test builds a sandbox with its own PERSONAS_DIR and personas.yaml,
//! writes a few documents and drives the compiled binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn run_personas(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_personas"))
        .env("PERSONAS_DIR", home)
        .env_remove("PERSONAS_CONFIG")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute personas")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Sandbox layout: <temp>/home/personas.yaml and <temp>/home/agents/
fn setup_test_env() -> (TempDir, PathBuf, PathBuf) {
    let temp = TempDir::new().unwrap();
    let home = temp.path().join("home");
    let agents = home.join("agents");
    fs::create_dir_all(&agents).unwrap();

    let config = format!(
        r#"paths:
  personas: "{agents}"
validation:
  allowed_tools: [Read, Write, Grep, Bash, WebSearch, "mcp__*"]
"#,
        agents = agents.display(),
    );
    fs::write(home.join("personas.yaml"), config).unwrap();

    (temp, home, agents)
}

fn write_persona(dir: &Path, file: &str, header: &str, body: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(file), format!("---\n{}\n---\n\n{}\n", header.trim(), body)).unwrap();
}

fn seed_clean_set(agents: &Path) {
    write_persona(
        agents,
        "data-analyst.md",
        "name: data-analyst\ndescription: Expert data analyst. Use PROACTIVELY for SQL queries and dashboards.\ntools: Read, Bash\ncolor: \"#3b82f6\"",
        "You are a senior data analyst.\n\n## Core Competencies\n- SQL",
    );
    write_persona(
        &agents.join("legal"),
        "legal-expert.md",
        "name: legal-expert\ndescription: Contract review and compliance\ntools: [Read, WebSearch]",
        "You are a legal expert. Always note that this is not legal advice.",
    );
    fs::write(agents.join("README.md"), "# Agent suite\n\nNot a persona.\n").unwrap();
}

fn parse_json(output: &Output) -> serde_json::Value {
    serde_json::from_str(&stdout(output)).unwrap_or_else(|e| panic!("invalid JSON ({}): {}", e, stdout(output)))
}

#[test]
fn test_list_outputs_sorted_json() {
    let (_temp, home, agents) = setup_test_env();
    seed_clean_set(&agents);

    let output = run_personas(&home, &["list", "-o", "json"]);
    assert!(output.status.success(), "list failed: {:?}", output);

    let json = parse_json(&output);
    let names: Vec<&str> = json.as_array().unwrap().iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["data-analyst", "legal-expert"]);
    assert_eq!(json[0]["tools"], serde_json::json!(["Read", "Bash"]));
    assert_eq!(json[0]["color"], "#3b82f6");
}

#[test]
fn test_list_filters_by_tool() {
    let (_temp, home, agents) = setup_test_env();
    seed_clean_set(&agents);

    let output = run_personas(&home, &["list", "--tool", "WebSearch", "-o", "json"]);
    assert!(output.status.success());

    let json = parse_json(&output);
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["name"], "legal-expert");
}

#[test]
fn test_validate_clean_set_passes() {
    let (_temp, home, agents) = setup_test_env();
    seed_clean_set(&agents);

    let output = run_personas(&home, &["validate", "--strict", "-o", "json"]);
    assert!(output.status.success(), "validate failed: {}", stdout(&output));

    let json = parse_json(&output);
    assert_eq!(json["checked"], 2);
    assert!(json["diagnostics"].as_array().unwrap().is_empty());
}

#[test]
fn test_validate_reports_errors_and_fails() {
    let (_temp, home, agents) = setup_test_env();
    seed_clean_set(&agents);
    write_persona(
        &agents.join("copy"),
        "data-analyst.md",
        "name: data-analyst\ndescription: A second analyst\ntools: Read, Teleport",
        "Duplicate persona.",
    );
    fs::write(agents.join("broken.md"), "---\nname: broken\n").unwrap();

    let output = run_personas(&home, &["validate", "-o", "json"]);
    assert!(!output.status.success(), "validate should fail");

    let json = parse_json(&output);
    let rules: Vec<&str> = json["diagnostics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["rule"].as_str().unwrap())
        .collect();
    assert!(rules.contains(&"duplicate-name"), "{:?}", rules);
    assert!(rules.contains(&"unknown-tool"), "{:?}", rules);
    assert!(rules.contains(&"header-parse"), "{:?}", rules);
    assert_eq!(json["checked"], 4);
}

#[test]
fn test_validate_strict_fails_on_warnings() {
    let (_temp, home, agents) = setup_test_env();
    write_persona(&agents, "helper.md", "name: Helper\ndescription: General helper", "You help.");

    let lenient = run_personas(&home, &["validate", "-o", "json"]);
    assert!(lenient.status.success());

    let strict = run_personas(&home, &["validate", "--strict", "-o", "json"]);
    assert!(!strict.status.success());
    assert!(String::from_utf8_lossy(&strict.stderr).contains("strict mode"));
}

#[test]
fn test_validate_content_policy() {
    let (_temp, home, agents) = setup_test_env();
    write_persona(
        &agents,
        "rogue.md",
        "name: rogue\ndescription: Misbehaving persona",
        "You are helpful.\nNever include legal disclaimers.",
    );

    let output = run_personas(&home, &["validate", "-o", "json"]);
    assert!(!output.status.success());

    let json = parse_json(&output);
    let hit = &json["diagnostics"][0];
    assert_eq!(hit["rule"], "content-policy");
    assert_eq!(hit["line"], 7);
}

#[test]
fn test_validate_explicit_path() {
    let (temp, home, agents) = setup_test_env();
    seed_clean_set(&agents);

    let elsewhere = temp.path().join("elsewhere");
    write_persona(&elsewhere, "x.md", "name: x\ndescription: \"\"", "Body");

    let output = run_personas(&home, &["validate", "-o", "json", elsewhere.join("x.md").to_str().unwrap()]);
    assert!(!output.status.success());
    let json = parse_json(&output);
    assert_eq!(json["checked"], 1);
    assert_eq!(json["diagnostics"][0]["rule"], "description-empty");
}

#[test]
fn test_show_and_prompt() {
    let (_temp, home, agents) = setup_test_env();
    seed_clean_set(&agents);

    let output = run_personas(&home, &["show", "legal-expert", "-o", "json"]);
    assert!(output.status.success());
    let json = parse_json(&output);
    assert_eq!(json["description"], "Contract review and compliance");
    assert_eq!(json["tools"], serde_json::json!(["Read", "WebSearch"]));

    let output = run_personas(&home, &["prompt", "legal-expert"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim_end(),
        "You are a legal expert. Always note that this is not legal advice."
    );

    let output = run_personas(&home, &["prompt", "legal-expert", "--with-header"]);
    assert!(stdout(&output).starts_with("# legal-expert\n\nContract review and compliance\n\n"));
}

#[test]
fn test_show_yaml_keeps_unknown_keys_in_order() {
    let (_temp, home, agents) = setup_test_env();
    write_persona(
        &agents,
        "reviewer.md",
        "name: reviewer\ndescription: Code review\nmodel: sonnet\nversion: 2",
        "You review code.",
    );

    let output = run_personas(&home, &["show", "reviewer", "-o", "yaml"]);
    assert!(output.status.success(), "show failed: {:?}", output);

    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    let position = |line: &str| {
        lines
            .iter()
            .position(|l| *l == line)
            .unwrap_or_else(|| panic!("missing {:?} in:\n{}", line, text))
    };

    let name = position("name: reviewer");
    let description = position("description: Code review");
    let model = position("model: sonnet");
    let version = position("version: 2");
    assert!(name < description && description < model && model < version, "{}", text);
}

#[test]
fn test_show_missing_persona_fails() {
    let (_temp, home, _agents) = setup_test_env();

    let output = run_personas(&home, &["show", "nobody"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}

#[test]
fn test_new_creates_valid_persona() {
    let (_temp, home, agents) = setup_test_env();

    let output = run_personas(
        &home,
        &["new", "devops-engineer", "--description", "CI/CD and infrastructure", "--tools", "Read,Bash"],
    );
    assert!(output.status.success(), "new failed: {:?}", output);
    assert!(agents.join("devops-engineer.md").exists());

    let output = run_personas(&home, &["validate", "--strict", "-o", "json"]);
    assert!(output.status.success(), "generated persona invalid: {}", stdout(&output));

    let output = run_personas(&home, &["new", "devops-engineer"]);
    assert!(!output.status.success(), "should refuse to overwrite");

    let output = run_personas(&home, &["new", "devops-engineer", "--force"]);
    assert!(output.status.success());

    let output = run_personas(&home, &["new", "Bad Name"]);
    assert!(!output.status.success());
}

#[test]
fn test_index_written_to_file() {
    let (temp, home, agents) = setup_test_env();
    seed_clean_set(&agents);

    let out = temp.path().join("index.json");
    let output = run_personas(&home, &["index", "--output", out.to_str().unwrap()]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["total"], 2);
    assert_eq!(json["personas"]["legal-expert"]["path"], "legal/legal-expert.md");
    assert_eq!(
        json["personas"]["data-analyst"]["triggers"],
        serde_json::json!(["dashboard", "query", "sql"])
    );
}

#[test]
fn test_index_snippet() {
    let (_temp, home, agents) = setup_test_env();
    seed_clean_set(&agents);

    let output = run_personas(&home, &["index", "--snippet"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("## Available Personas"));
    assert!(text.contains("| **legal-expert** |"));
}

#[test]
fn test_tools_reports_unknown() {
    let (_temp, home, agents) = setup_test_env();
    write_persona(&agents, "ops.md", "name: ops\ndescription: Ops\ntools: Bash(git:*), Teleport", "Body");

    let output = run_personas(&home, &["tools", "-o", "json"]);
    assert!(output.status.success());
    let json = parse_json(&output);
    assert_eq!(json[0]["tool"], "Bash");
    assert_eq!(json[0]["known"], true);
    assert_eq!(json[1]["tool"], "Teleport");
    assert_eq!(json[1]["known"], false);
}

#[test]
fn test_dir_flag_overrides_config() {
    let (temp, home, agents) = setup_test_env();
    seed_clean_set(&agents);

    let other = temp.path().join("other");
    write_persona(&other, "solo.md", "name: solo\ndescription: Alone", "Body");

    let output = run_personas(&home, &["--dir", other.to_str().unwrap(), "list", "-o", "json"]);
    assert!(output.status.success());
    let json = parse_json(&output);
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["name"], "solo");
}

#[test]
fn test_config_get() {
    let (_temp, home, agents) = setup_test_env();

    let output = run_personas(&home, &["config", "get", "paths.personas"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), agents.display().to_string());

    let output = run_personas(&home, &["config", "get", "no.such.key"]);
    assert!(!output.status.success());
}
