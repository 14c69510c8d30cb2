use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use predicates::str::contains;

fn cli(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("subscription_core_cli").unwrap();
    cmd.env("SUBSCRIPTION_CORE_CLI_SCRIPT", "1")
        .env("SUBSCRIPTION_CORE_HOME", home.path())
        .env("SUBSCRIPTION_CORE_NOW", "2023-04-20")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn script_mode_runs_basic_flow() {
    let home = TempDir::new().unwrap();
    let export = home.child("out.csv");
    let input = format!(
        "add Music 9.99 monthly 2023-01-15 streaming\n\
         add \"Cloud Drive\" 120 yearly 2023-01-01 software\n\
         list\n\
         summary\n\
         export csv {}\n\
         exit\n",
        export.path().display()
    );

    cli(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Added `Music`"))
        .stdout(contains("Recorded 3 past payment(s); next due 2023-05-15."))
        .stdout(contains("Cloud Drive"))
        .stdout(contains("Monthly total : $19.99"))
        .stdout(contains("Year to date  : $29.97"))
        .stdout(contains("2 subscription(s)."));

    export.assert(contains("Cloud Drive,120.00,yearly,2024-01-01,2023-01-01,software,"));
    home.child("subscriptions.json")
        .assert(contains("\"payments\""))
        .assert(contains("Auto-generated"));
}

#[test]
fn state_persists_between_runs() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .write_stdin("add News 4 monthly 2023-03-01 news\n")
        .assert()
        .success();

    cli(&home)
        .write_stdin("upcoming 30\n")
        .assert()
        .success()
        .stdout(contains("2023-05-01"))
        .stdout(contains("1 due, $4.00 in total."));
}

#[test]
fn mistakes_are_reported_without_aborting() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .write_stdin("sumary\nadd Broken abc monthly 2023-01-01\nshow nothing-here\nhelp add\n")
        .assert()
        .success()
        .stdout(contains("Suggestion: `summary`?"))
        .stdout(contains("add <name> <cost>"));
}

#[test]
fn config_changes_are_saved() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .write_stdin("config set currency_symbol EUR\nconfig show\n")
        .assert()
        .success()
        .stdout(contains("EUR"));

    home.child("config.json")
        .assert(predicate::path::is_file())
        .assert(contains("EUR"));
}
