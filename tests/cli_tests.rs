use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn league_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("league"));
    cmd.env_remove("LEAGUE_LOG").env_remove("LEAGUE_API_TOKEN");
    cmd
}

/// Run `league -C <dir> <args>`
fn league(config_path: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    league_cmd()
        .arg("-C")
        .arg(config_path)
        .args(args)
        .assert()
}

fn init_config(temp_dir: &TempDir) -> std::path::PathBuf {
    let config_path = temp_dir.path().join("league-config");
    league(&config_path, &["init"]).success();
    config_path
}

fn edit_config(config_path: &Path, from: &str, to: &str) {
    let path = config_path.join("config.toml");
    let config = fs::read_to_string(&path).unwrap();
    assert!(config.contains(from));
    fs::write(&path, config.replace(from, to)).unwrap();
}

fn write_state(config_path: &Path, state: &str) {
    fs::write(config_path.join("state.toml"), state).unwrap();
}

#[test]
fn test_help() {
    league_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Billing for basketball league programs"));
}

#[test]
fn test_version() {
    league_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("league"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("league-config");

    league(&config_path, &["init"])
        .success()
        .stdout(predicate::str::contains("Initialized league config"));

    assert!(config_path.join("config.toml").exists());
    assert!(config_path.join("state.toml").exists());
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    league(&config_path, &["init"])
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_status_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    league(&config_path, &["status"])
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_status() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    league(&config_path, &["status"])
        .success()
        .stdout(predicate::str::contains("League Billing Status"))
        .stdout(predicate::str::contains("Next invoice:"))
        .stdout(predicate::str::contains("INV-"));
}

#[test]
fn test_invoice_create_no_items() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    league(&config_path, &["invoice", "create", "--bill-to", "Rivera family"])
        .failure()
        .stderr(predicate::str::contains("No items specified"));
}

#[test]
fn test_invoice_create_bad_item_format() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    league(
        &config_path,
        &["invoice", "create", "--bill-to", "Rivera family", "--item", "Registration"],
    )
    .failure()
    .stderr(predicate::str::contains("Invalid item format"));

    league(
        &config_path,
        &["invoice", "create", "--bill-to", "Rivera family", "--item", "Registration:abc"],
    )
    .failure()
    .stderr(predicate::str::contains("Invalid amount 'abc'"));
}

#[test]
fn test_invoice_create_computes_totals() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    league(
        &config_path,
        &[
            "invoice",
            "create",
            "--bill-to",
            "Rivera family",
            "--item",
            "Registration:50:2",
            "--item",
            "Jersey:10",
            "--tax",
            "10",
            "--issued",
            "2026-01-10",
        ],
    )
    .success()
    .stdout(predicate::str::contains("Created INV-2026-0001 (draft)"))
    .stdout(predicate::str::contains("$110.00"))
    .stdout(predicate::str::contains("$121.00"))
    .stdout(predicate::str::contains("2026-02-09"));

    let state = fs::read_to_string(config_path.join("state.toml")).unwrap();
    assert!(state.contains("INV-2026-0001"));
    assert!(state.contains("Rivera family"));
}

#[test]
fn test_invoice_create_rejects_negative_amount() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    league(
        &config_path,
        &["invoice", "create", "--bill-to", "Lee", "--item", "Refund:-20"],
    )
    .failure()
    .stderr(predicate::str::contains("negative amount"));

    // Nothing was persisted and no number was claimed
    league(&config_path, &["invoice", "list"])
        .success()
        .stdout(predicate::str::contains("No invoices created yet."));
}

#[test]
fn test_invoice_create_rejects_out_of_range_amounts() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    league(
        &config_path,
        &["invoice", "create", "--bill-to", "Lee", "--item", "X:79228162514264337593543950335:2"],
    )
    .failure()
    .stderr(predicate::str::contains("is larger than 1,000,000,000,000"));

    league(
        &config_path,
        &["invoice", "create", "--bill-to", "Lee", "--item", "X:10.005"],
    )
    .failure()
    .stderr(predicate::str::contains("fractions of a cent"));
}

#[test]
fn test_invoice_create_due_days_out_of_range() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    edit_config(&config_path, "due_days = 30", "due_days = 4294967295");

    league(
        &config_path,
        &["invoice", "create", "--bill-to", "Lee", "--item", "Clinic:40"],
    )
    .failure()
    .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn test_yearless_number_format_never_repeats() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    edit_config(&config_path, "INV-{year}-{seq:04}", "L{seq:03}");

    for issued in ["2025-12-30", "2026-01-02"] {
        league(
            &config_path,
            &["invoice", "create", "--bill-to", "Lee", "--item", "Clinic:40", "--issued", issued],
        )
        .success();
    }

    let state = fs::read_to_string(config_path.join("state.toml")).unwrap();
    assert!(state.contains("number = \"L001\""));
    assert!(state.contains("number = \"L002\""));
}

#[test]
fn test_invoice_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    league(
        &config_path,
        &[
            "invoice",
            "create",
            "--bill-to",
            "Okafor family",
            "--item",
            "Summer camp:250",
            "--issued",
            "2026-06-01",
        ],
    )
    .success();

    league(&config_path, &["invoice", "pay", "1"])
        .failure()
        .stderr(predicate::str::contains("cannot move from draft to paid"));

    league(&config_path, &["invoice", "send", "INV-2026-0001"])
        .success()
        .stdout(predicate::str::contains("Marked INV-2026-0001 as sent"));

    league(&config_path, &["invoice", "delete", "1"])
        .failure()
        .stderr(predicate::str::contains("can no longer be deleted"));

    league(&config_path, &["invoice", "pay", "1", "--date", "2026-06-20"])
        .success()
        .stdout(predicate::str::contains("Marked INV-2026-0001 as paid"));

    league(&config_path, &["invoice", "cancel", "1"])
        .failure()
        .stderr(predicate::str::contains("cannot move from paid to cancelled"));

    league(&config_path, &["invoice", "show", "1"])
        .success()
        .stdout(predicate::str::contains("Invoice INV-2026-0001 (paid)"))
        .stdout(predicate::str::contains("Summer camp"))
        .stdout(predicate::str::contains("Paid:    2026-06-20"));
}

#[test]
fn test_invoice_delete_draft() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    league(
        &config_path,
        &["invoice", "create", "--bill-to", "Lee", "--item", "Clinic:40"],
    )
    .success();

    league(&config_path, &["invoice", "delete", "1"])
        .success()
        .stdout(predicate::str::contains("Deleted draft"));

    league(&config_path, &["invoice", "show", "1"])
        .failure()
        .stderr(predicate::str::contains("Invalid invoice index"));
}

const TWO_INVOICES: &str = r#"[counter]
last_number = 2
last_year = 2026

[[invoices]]
number = "INV-2026-0001"
bill_to = "Rivera family"
issue_date = "2026-01-10"
due_date = "2026-02-09"
status = "paid"
paid_date = "2026-01-20"
tax_rate = "0"
subtotal = "200"
tax_amount = "0"
total = "200"

[[invoices.items]]
name = "Winter league"
amount = "200"
quantity = 1

[[invoices]]
number = "INV-2026-0002"
bill_to = "Price family"
issue_date = "2026-01-11"
due_date = "2026-02-10"
status = "sent"
tax_rate = "0"
subtotal = "300"
tax_amount = "0"
total = "300"

[[invoices.items]]
name = "Travel team"
amount = "150"
quantity = 2
"#;

#[test]
fn test_list_shows_financial_footer() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    write_state(&config_path, TWO_INVOICES);

    league(&config_path, &["invoice", "list"])
        .success()
        .stdout(predicate::str::contains("STATUS"))
        .stdout(predicate::str::contains("PAID"))
        .stdout(predicate::str::contains("TOTAL"))
        .stdout(predicate::str::contains("(-) PAID"))
        .stdout(predicate::str::contains("(=) OUTSTANDING"))
        .stdout(predicate::str::contains("$   500"))
        .stdout(predicate::str::contains("$   200"))
        .stdout(predicate::str::contains("$   300"));
}

#[test]
fn test_list_status_filter() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    write_state(&config_path, TWO_INVOICES);

    league(&config_path, &["invoice", "list", "--status", "paid"])
        .success()
        .stdout(predicate::str::contains("INV-2026-0001"))
        .stdout(predicate::str::contains("INV-2026-0002").not());

    league(&config_path, &["invoice", "list", "--status", "void"])
        .failure()
        .stderr(predicate::str::contains("Invalid status 'void'"));
}

#[test]
fn test_past_due_invoice_becomes_overdue() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    write_state(&config_path, TWO_INVOICES);

    // INV-2026-0002 was sent with a due date long past
    league(&config_path, &["invoice", "show", "INV-2026-0002"])
        .success()
        .stdout(predicate::str::contains("(overdue)"));

    let state = fs::read_to_string(config_path.join("state.toml")).unwrap();
    assert!(state.contains("status = \"overdue\""));
}

#[test]
fn test_plan_create_and_pay() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    league(
        &config_path,
        &[
            "plan",
            "create",
            "--member",
            "Jordan Price",
            "--total",
            "300",
            "--installments",
            "3",
            "--frequency",
            "monthly",
            "--first-date",
            "2026-11-01",
        ],
    )
    .success()
    .stdout(predicate::str::contains("Created payment plan 1 for Jordan Price"))
    .stdout(predicate::str::contains("3 monthly installments of $100.00 starting 2026-11-01"));

    league(&config_path, &["plan", "show", "1"])
        .success()
        .stdout(predicate::str::contains("2026-12-01"))
        .stdout(predicate::str::contains("2027-01-01"))
        .stdout(predicate::str::contains("PENDING"))
        .stdout(predicate::str::contains("(=) REMAINING"));

    league(&config_path, &["plan", "pay", "1", "--date", "2026-11-01"])
        .success()
        .stdout(predicate::str::contains("Recorded payment for transaction 1"))
        .stdout(predicate::str::contains("1/3 paid"));

    league(&config_path, &["plan", "pay", "1"])
        .success()
        .stdout(predicate::str::contains("already paid"))
        .stdout(predicate::str::contains("1/3 paid"));

    league(&config_path, &["plan", "pay", "2"]).success();
    league(&config_path, &["plan", "pay", "3"])
        .success()
        .stdout(predicate::str::contains("3/3 paid"))
        .stdout(predicate::str::contains("(completed)"));
}

#[test]
fn test_plan_uneven_split_and_bounds() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    league(
        &config_path,
        &["plan", "create", "-m", "Sam", "-t", "100", "-n", "3", "-f", "weekly"],
    )
    .success()
    .stdout(predicate::str::contains("$33.33"))
    .stdout(predicate::str::contains("Final installment: $33.34"));

    league(
        &config_path,
        &["plan", "create", "-m", "Sam", "-t", "100", "-n", "13"],
    )
    .failure()
    .stderr(predicate::str::contains("between 2 and 12"));

    league(
        &config_path,
        &["plan", "create", "-m", "Sam", "-t", "100", "-n", "4", "-f", "daily"],
    )
    .failure()
    .stderr(predicate::str::contains("Unknown payment frequency"));
}

#[test]
fn test_plan_rejects_fractions_of_a_cent() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    league(
        &config_path,
        &["plan", "create", "-m", "Sam", "-t", "100.005", "-n", "3"],
    )
    .failure()
    .stderr(predicate::str::contains("fractions of a cent"));
}

#[test]
fn test_plan_assess_with_endless_grace_period() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    edit_config(&config_path, "grace_days = 15", "grace_days = 4294967295");

    league(
        &config_path,
        &["plan", "create", "-m", "Alex", "-t", "240", "-n", "4", "--first-date", "2026-01-05"],
    )
    .success();

    league(&config_path, &["plan", "assess", "--date", "2030-01-01"])
        .success()
        .stdout(predicate::str::contains("No plans past the 4294967295-day grace period"));
}

#[test]
fn test_plan_assess_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    league(
        &config_path,
        &[
            "plan", "create", "-m", "Alex", "-t", "240", "-n", "4", "-f", "bi-weekly",
            "--first-date", "2026-01-05",
        ],
    )
    .success();

    league(&config_path, &["plan", "assess", "--date", "2026-01-20"])
        .success()
        .stdout(predicate::str::contains("No plans past the 15-day grace period"));

    league(&config_path, &["plan", "assess", "--date", "2026-01-21"])
        .success()
        .stdout(predicate::str::contains("Plan 1 (Alex) is now defaulted"));

    league(&config_path, &["plan", "list"])
        .success()
        .stdout(predicate::str::contains("DEFAULTED"));

    league(&config_path, &["plan", "cancel", "1"]).success();
    league(&config_path, &["plan", "pay", "1"])
        .failure()
        .stderr(predicate::str::contains("does not accept payments"));
}

#[test]
fn test_affiliate_flow() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    league(
        &config_path,
        &["affiliate", "apply", "--name", "Hoops Academy", "--email", "coach@hoops.test"],
    )
    .success()
    .stdout(predicate::str::contains("Recorded application 1 for Hoops Academy"));

    league(
        &config_path,
        &["affiliate", "commission", "1", "--amount", "150", "--reference", "REG-1"],
    )
    .failure()
    .stderr(predicate::str::contains("commissions require an approved affiliate"));

    league(&config_path, &["affiliate", "approve", "1"])
        .success()
        .stdout(predicate::str::contains("Approved affiliate 1"));

    league(&config_path, &["affiliate", "reject", "1", "--reason", "late"])
        .failure()
        .stderr(predicate::str::contains("cannot move from approved to rejected"));

    league(
        &config_path,
        &["affiliate", "commission", "1", "--amount", "149.95", "--reference", "REG-1"],
    )
    .success()
    .stdout(predicate::str::contains("Recorded $15.00 commission"));

    league(&config_path, &["affiliate", "payouts"])
        .success()
        .stdout(predicate::str::contains("No affiliate balances at or above the $50.00 minimum"));

    league(
        &config_path,
        &["affiliate", "commission", "1", "--amount", "600", "--reference", "REG-2"],
    )
    .success();

    league(&config_path, &["affiliate", "payouts"])
        .success()
        .stdout(predicate::str::contains("Paid $75.00 to Hoops Academy"));

    league(&config_path, &["affiliate", "list"])
        .success()
        .stdout(predicate::str::contains("APPROVED"))
        .stdout(predicate::str::contains("$75.00"));
}

#[test]
fn test_affiliate_reject_with_reason() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    league(
        &config_path,
        &["affiliate", "apply", "-n", "Court Kings", "-e", "ck@test", "--rate", "12.5"],
    )
    .success()
    .stdout(predicate::str::contains("12.5% commission"));

    league(&config_path, &["affiliate", "reject", "1", "--reason", "Outside service area"])
        .success()
        .stdout(predicate::str::contains("Rejected affiliate 1: Outside service area"));

    league(&config_path, &["affiliate", "approve", "1"])
        .failure()
        .stderr(predicate::str::contains("cannot move from rejected to approved"));
}

#[test]
fn test_remote_requires_configuration() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    league(&config_path, &["remote", "invoices"])
        .failure()
        .stderr(predicate::str::contains("No API base URL configured"));
}
