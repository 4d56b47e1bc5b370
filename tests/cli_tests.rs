//! CLI smoke tests for the leadgate binary.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_serve_subcommand() {
    Command::cargo_bin("leadgate")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("Contact-form intake service"));
}

#[test]
fn serve_help_documents_port() {
    Command::cargo_bin("leadgate")
        .unwrap()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--port"));
}

#[test]
fn serve_without_database_url_fails_with_clear_error() {
    Command::cargo_bin("leadgate")
        .unwrap()
        .env_remove("DATABASE_URL")
        .arg("serve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DATABASE_URL is required"));
}
