use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PASSWORD: &str = "correct horse battery";

fn hearth(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hearth").unwrap();
    cmd.env("HEARTH_DATA_DIR", dir.path())
        .env_remove("HEARTH_PASSWORD")
        .env("HEARTH_LOG", "off");
    cmd
}

/// Initialized household with a signed-in user
fn ready() -> TempDir {
    let dir = TempDir::new().unwrap();
    hearth(&dir).arg("init").assert().success();
    hearth(&dir)
        .args(["auth", "signup", "sam@example.com", "--name", "Sam", "--password", PASSWORD])
        .assert()
        .success();
    dir
}

#[test]
fn test_commands_require_init() {
    let dir = TempDir::new().unwrap();
    hearth(&dir)
        .args(["category", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hearth init"));
}

#[test]
fn test_init_seeds_categories_once() {
    let dir = TempDir::new().unwrap();
    hearth(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("10 default categories"));
    hearth(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already initialized"));

    hearth(&dir)
        .args(["category", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Groceries").and(predicate::str::contains("Investments")));
}

#[test]
fn test_auth_flow() {
    let dir = ready();
    hearth(&dir)
        .args(["auth", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sam <sam@example.com>"));

    hearth(&dir).args(["auth", "logout"]).assert().success();
    hearth(&dir)
        .args(["auth", "whoami"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));

    hearth(&dir)
        .args(["auth", "login", "sam@example.com", "--password", "wrong password"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid email or password"));
    hearth(&dir)
        .args(["auth", "login", "SAM@example.com", "--password", PASSWORD])
        .assert()
        .success();
}

#[test]
fn test_expense_needs_signed_in_spender() {
    let dir = TempDir::new().unwrap();
    hearth(&dir).arg("init").assert().success();
    hearth(&dir)
        .args(["expense", "add", "12.50", "--category", "Groceries"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn test_category_archive_lifecycle() {
    let dir = ready();
    hearth(&dir)
        .args(["category", "add", "Pets", "--color", "#795548"])
        .assert()
        .success();
    hearth(&dir)
        .args(["category", "add", "pets"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    hearth(&dir).args(["category", "archive", "Pets"]).assert().success();
    hearth(&dir)
        .args(["category", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pets").not());
    hearth(&dir)
        .args(["category", "list", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("archived"));

    hearth(&dir).args(["category", "unarchive", "Pets"]).assert().success();
}

#[test]
fn test_budget_progress() {
    let dir = ready();
    hearth(&dir)
        .args([
            "budget", "create", "March", "1000", "--start", "2025-03-01", "--end", "2025-03-31",
            "--strategy", "rule",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Allocated $1000.00 of $1000.00"));

    for (amount, date) in [("12.50", "2025-03-05"), ("150", "2025-03-31"), ("99", "2025-04-01")] {
        hearth(&dir)
            .args(["expense", "add", amount, "-c", "groceries", "--date", date])
            .assert()
            .success();
    }

    hearth(&dir)
        .args(["budget", "progress", "march"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Spent $162.50 of $1000.00")
                .and(predicate::str::contains("OVER")),
        );

    hearth(&dir)
        .args(["report", "spending", "--from", "2025-03-01", "--to", "2025-03-31"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$162.50 across 2 expense(s)"));
}

#[test]
fn test_budget_rejects_inverted_range() {
    let dir = ready();
    hearth(&dir)
        .args(["budget", "create", "Bad", "100", "--start", "2025-03-31", "--end", "2025-03-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation error"));
}

#[test]
fn test_zero_allocations_are_skipped() {
    let dir = ready();
    hearth(&dir)
        .args([
            "budget", "create", "B", "100", "--start", "2025-03-01", "--end", "2025-03-31",
            "--allocate", "Groceries=50", "--allocate", "Rent=0", "--allocate", "Utilities=0%",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Allocated $50.00 of $100.00"));

    hearth(&dir)
        .args(["budget", "show", "B"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Groceries")
                .and(predicate::str::contains("Rent").not())
                .and(predicate::str::contains("Utilities").not()),
        );

    hearth(&dir)
        .args(["expense", "add", "20", "-c", "groceries", "--date", "2025-03-10"])
        .assert()
        .success();
    hearth(&dir)
        .args(["budget", "progress", "B"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Spent $20.00 of $100.00"));
}

#[test]
fn test_reallocate_and_delete_budget() {
    let dir = ready();
    hearth(&dir)
        .args([
            "budget", "create", "Week", "700", "--period", "weekly", "--start", "2025-06-04",
            "--allocate", "Rent=400", "--allocate", "Groceries=25%",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Allocated $575.00 of $700.00"));

    hearth(&dir)
        .args(["budget", "reallocate", "Week", "--strategy", "equal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$700.00 across 10 categories"));

    hearth(&dir).args(["budget", "delete", "Week"]).assert().success();
    hearth(&dir)
        .args(["budget", "show", "Week"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_export_json_and_audit() {
    let dir = ready();
    hearth(&dir)
        .args(["expense", "add", "8", "-c", "Dining Out", "--date", "2025-05-01", "-m", "Coffee, beans"])
        .assert()
        .success();

    let output = hearth(&dir).args(["export", "json"]).output().unwrap();
    assert!(output.status.success());
    let snapshot: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(snapshot["schema_version"], "1.0.0");
    assert_eq!(snapshot["expenses"].as_array().unwrap().len(), 1);
    assert_eq!(snapshot["metadata"]["category_count"], 10);

    hearth(&dir)
        .args(["export", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Coffee, beans\""));

    hearth(&dir)
        .args(["audit", "--limit", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE"));
}

#[test]
fn test_config_set() {
    let dir = ready();
    hearth(&dir)
        .args(["config", "set", "currency_symbol", "€"])
        .assert()
        .success();
    hearth(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("€"));
    hearth(&dir)
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown setting"));
}
