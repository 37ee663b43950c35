//! CLI integration tests for dbexplorer.
//!
//! These tests verify command-line argument parsing, help output,
//! and exit codes for error conditions that occur before any database
//! connection is attempted.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the dbexplorer binary.
fn cmd() -> Command {
    Command::cargo_bin("dbexplorer").unwrap()
}

/// A config file that passes YAML parsing; `extra` is appended verbatim.
fn config_file(database_type: &str, extra: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "database:").unwrap();
    writeln!(file, "  type: {}", database_type).unwrap();
    writeln!(file, "  host: 127.0.0.1").unwrap();
    writeln!(file, "  database: shop").unwrap();
    writeln!(file, "  user: app").unwrap();
    write!(file, "{}", extra).unwrap();
    file
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("tables"))
        .stdout(predicate::str::contains("describe"))
        .stdout(predicate::str::contains("health-check"));
}

#[test]
fn test_serve_subcommand_help() {
    cmd()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--host"))
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--workers"));
}

#[test]
fn test_describe_requires_table() {
    cmd()
        .arg("describe")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<TABLE>"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dbexplorer"));
}

#[test]
fn test_output_json_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-json"));
}

#[test]
fn test_log_format_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"));
}

#[test]
fn test_verbosity_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: info]"));
}

// =============================================================================
// Exit Code Tests
// =============================================================================

#[test]
fn test_missing_config_exits_with_code_7() {
    // Missing file is an IO error (code 7), not config error (code 1)
    cmd()
        .args(["--config", "nonexistent_config_file.yaml", "health-check"])
        .assert()
        .code(7); // EXIT_IO_ERROR - file not found
}

#[test]
fn test_invalid_yaml_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "invalid: yaml: content: [").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "tables"])
        .assert()
        .code(1); // EXIT_CONFIG_ERROR
}

#[test]
fn test_empty_config_exits_with_code_1() {
    let file = tempfile::NamedTempFile::new().unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .code(1); // EXIT_CONFIG_ERROR
}

#[test]
fn test_missing_required_fields_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "database:").unwrap();
    writeln!(file, "  type: mysql").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .code(1); // EXIT_CONFIG_ERROR
}

#[test]
fn test_unsupported_database_type_exits_with_code_1() {
    let file = config_file("postgres", "");

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "tables"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("database.type must be 'mysql'"));
}

#[test]
fn test_serve_rejects_zero_workers() {
    let file = config_file("mysql", "");

    cmd()
        .args([
            "--config",
            file.path().to_str().unwrap(),
            "serve",
            "--workers",
            "0",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("server.workers"));
}

// =============================================================================
// Subcommand Existence Tests
// =============================================================================

#[test]
fn test_health_check_command_exists() {
    cmd()
        .args(["health-check", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Test the database connection"));
}

#[test]
fn test_tables_command_exists() {
    cmd()
        .args(["tables", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("List the tables"));
}

// =============================================================================
// Config Path Tests
// =============================================================================

#[test]
fn test_config_default_path() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[default: config.yaml]"));
}

#[test]
fn test_short_config_flag() {
    // -c should work as short for --config
    cmd()
        .args(["-c", "some_config.yaml", "--help"])
        .assert()
        .success();
}

// =============================================================================
// No Subcommand Tests
// =============================================================================

#[test]
fn test_no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}
