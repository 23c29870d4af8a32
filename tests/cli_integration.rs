//! Integration tests for the SecretVault CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.  The
//! master password is supplied through `SECRETVAULT_PASSWORD` so no test
//! ever hits an interactive prompt, and every vault lives in its own
//! temp directory configured with a cheap KDF.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const PASSWORD: &str = "correct-horse-battery";

/// Helper: get a Command pointing at the secretvault binary.
fn secretvault() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("secretvault").expect("binary should exist");
    cmd.env_remove("SECRETVAULT_DIR")
        .env_remove("SECRETVAULT_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper: a temp vault directory whose config keeps key derivation fast.
fn vault_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tmp.child("config.toml")
        .write_str(
            "kdf = \"argon2id\"\n\
             argon2_memory_kib = 8192\n\
             argon2_iterations = 1\n\
             argon2_parallelism = 1\n",
        )
        .unwrap();
    tmp
}

/// Helper: a command bound to `dir` with the master password set.
fn in_vault(dir: &TempDir) -> Command {
    let mut cmd = secretvault();
    cmd.env("SECRETVAULT_DIR", dir.path())
        .env("SECRETVAULT_PASSWORD", PASSWORD);
    cmd
}

/// Helper: run `add` and return the new secret's id.
fn add(dir: &TempDir, args: &[&str]) -> String {
    let out = in_vault(dir)
        .arg("add")
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(out).unwrap();
    let rest = stdout
        .split("with id ")
        .nth(1)
        .expect("add should report the new id");
    rest.split_whitespace().next().unwrap().to_string()
}

#[test]
fn help_flag_shows_usage() {
    secretvault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Local encrypted store"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("verify"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn version_flag_shows_version() {
    secretvault()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("secretvault"));
}

#[test]
fn no_args_shows_help() {
    secretvault()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn get_on_missing_vault_exits_with_not_initialized() {
    let tmp = TempDir::new().unwrap();

    secretvault()
        .args(["get", "abc", "--vault-dir"])
        .arg(tmp.path().join("nowhere"))
        .env("SECRETVAULT_PASSWORD", PASSWORD)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn init_add_get_round_trip() {
    let dir = vault_dir();

    in_vault(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vault created"));
    dir.child("vault.json").assert(predicate::path::exists());

    let id = add(&dir, &["db", "s3cr3t", "--type", "password", "--tag", "prod"]);

    in_vault(&dir)
        .args(["get", &id])
        .assert()
        .success()
        .stdout(predicate::str::diff("s3cr3t\n"));

    // The file on disk never holds the plaintext.
    dir.child("vault.json")
        .assert(predicate::str::contains("s3cr3t").not());
}

#[test]
fn vault_dir_flag_overrides_environment() {
    let dir = vault_dir();

    secretvault()
        .arg("init")
        .arg("--vault-dir")
        .arg(dir.path())
        .env("SECRETVAULT_PASSWORD", PASSWORD)
        .assert()
        .success();
    dir.child("vault.json").assert(predicate::path::exists());
}

#[test]
fn init_twice_requires_force() {
    let dir = vault_dir();
    in_vault(&dir).arg("init").assert().success();

    in_vault(&dir)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    in_vault(&dir).args(["init", "--force"]).assert().success();
}

#[test]
fn init_rejects_short_password() {
    let dir = vault_dir();

    secretvault()
        .arg("init")
        .env("SECRETVAULT_DIR", dir.path())
        .env("SECRETVAULT_PASSWORD", "short")
        .assert()
        .code(5)
        .stderr(predicate::str::contains("at least 8"));
    dir.child("vault.json").assert(predicate::path::missing());
}

#[test]
fn get_unknown_id_exits_with_not_found() {
    let dir = vault_dir();
    in_vault(&dir).arg("init").assert().success();

    in_vault(&dir)
        .args(["get", "doesnotexist"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn add_reads_value_from_stdin() {
    let dir = vault_dir();
    in_vault(&dir).arg("init").assert().success();

    let out = in_vault(&dir)
        .args(["add", "piped"])
        .write_stdin("from-stdin\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(out).unwrap();
    let id = stdout
        .split("with id ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap()
        .to_string();

    in_vault(&dir)
        .args(["get", &id])
        .assert()
        .success()
        .stdout(predicate::str::diff("from-stdin\n"));
}

#[test]
fn list_and_search_show_metadata_only() {
    let dir = vault_dir();
    in_vault(&dir).arg("init").assert().success();
    add(&dir, &["github", "ghp_value", "--type", "token"]);
    add(&dir, &["postgres", "pg_value", "--type", "password"]);

    in_vault(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("github"))
        .stdout(predicate::str::contains("postgres"))
        .stdout(predicate::str::contains("ghp_value").not());

    in_vault(&dir)
        .args(["search", "GIT"])
        .assert()
        .success()
        .stdout(predicate::str::contains("github"))
        .stdout(predicate::str::contains("postgres").not());

    in_vault(&dir)
        .args(["list", "--type", "password"])
        .assert()
        .success()
        .stdout(predicate::str::contains("postgres"))
        .stdout(predicate::str::contains("github").not());
}

#[test]
fn update_then_verify_and_delete() {
    let dir = vault_dir();
    in_vault(&dir).arg("init").assert().success();
    let id = add(&dir, &["api", "oldval"]);

    in_vault(&dir)
        .args(["update", &id, "--value", "newval", "--notes", "rotated"])
        .assert()
        .success();

    in_vault(&dir)
        .args(["get", &id])
        .assert()
        .success()
        .stdout(predicate::str::diff("newval\n"));

    in_vault(&dir).args(["verify", &id]).assert().success();

    in_vault(&dir)
        .args(["delete", &id, "--force"])
        .assert()
        .success();

    in_vault(&dir).args(["get", &id]).assert().code(4);
}

#[test]
fn verify_fails_with_wrong_password() {
    let dir = vault_dir();
    in_vault(&dir).arg("init").assert().success();
    let id = add(&dir, &["db", "s3cr3t"]);

    secretvault()
        .args(["verify", &id])
        .env("SECRETVAULT_DIR", dir.path())
        .env("SECRETVAULT_PASSWORD", "not-the-password")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not match"));
}

#[test]
fn export_then_import_restores_secrets() {
    let dir = vault_dir();
    in_vault(&dir).arg("init").assert().success();
    let id = add(&dir, &["keep", "kept-value"]);

    let backup = dir.child("backup.json");
    in_vault(&dir)
        .args(["export", "--output"])
        .arg(backup.path())
        .assert()
        .success();
    backup.assert(predicate::str::contains("kept-value").not());

    in_vault(&dir)
        .args(["delete", &id, "--force"])
        .assert()
        .success();

    in_vault(&dir)
        .args(["import", "--force"])
        .arg(backup.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 secret"));

    in_vault(&dir)
        .args(["get", &id])
        .assert()
        .success()
        .stdout(predicate::str::diff("kept-value\n"));
}

#[test]
fn import_rejects_malformed_file() {
    let dir = vault_dir();
    in_vault(&dir).arg("init").assert().success();
    let bad = dir.child("bad.json");
    bad.write_str("{\"version\": 1}").unwrap();

    in_vault(&dir)
        .args(["import", "--force"])
        .arg(bad.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid vault format"));
}

#[test]
fn generate_prints_url_safe_token() {
    secretvault()
        .args(["generate", "24"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^[A-Za-z0-9_-]{32}\n$").unwrap());
}

#[test]
fn generate_rejects_zero_length() {
    secretvault().args(["generate", "0"]).assert().code(5);
}

#[test]
fn add_with_generate_prints_value_once() {
    let dir = vault_dir();
    in_vault(&dir).arg("init").assert().success();

    let out = in_vault(&dir)
        .args(["add", "session-key", "--generate", "16"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(out).unwrap();
    let id = stdout
        .split("with id ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap()
        .to_string();
    let generated = stdout.lines().last().unwrap().to_string();
    assert_eq!(generated.len(), 22);

    in_vault(&dir)
        .args(["get", &id])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{generated}\n")));
}

#[test]
fn add_with_out_of_range_generate_length_fails() {
    let dir = vault_dir();
    in_vault(&dir).arg("init").assert().success();

    in_vault(&dir)
        .args(["add", "empty", "--generate", "0"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("between 1 and 4096"));

    in_vault(&dir)
        .args(["add", "huge", "--generate", &usize::MAX.to_string()])
        .assert()
        .code(5);

    in_vault(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 of 0 secret(s)"));
}

#[test]
fn generate_rejects_oversized_length() {
    secretvault().args(["generate", "4097"]).assert().code(5);
}

#[test]
fn default_secret_length_from_config_is_checked() {
    let dir = vault_dir();
    dir.child("config.toml")
        .write_str("default_secret_length = 0\n")
        .unwrap();

    secretvault()
        .arg("generate")
        .env("SECRETVAULT_DIR", dir.path())
        .assert()
        .code(5);
}

#[test]
fn list_expired_shows_only_expired_secrets() {
    let dir = vault_dir();
    in_vault(&dir).arg("init").assert().success();
    add(&dir, &["stale-cert", "old", "--type", "certificate", "--expires", "2000-01-01"]);
    add(&dir, &["stale-token", "old", "--type", "token", "--expires", "2000-01-01"]);
    add(&dir, &["evergreen", "fresh", "--type", "token"]);

    in_vault(&dir)
        .args(["list", "--expired"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 of 3 secret(s)"))
        .stdout(predicate::str::contains("stale-cert"))
        .stdout(predicate::str::contains("stale-token"))
        .stdout(predicate::str::contains("(expired)"))
        .stdout(predicate::str::contains("evergreen").not());

    in_vault(&dir)
        .args(["list", "--expired", "--type", "token"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 3 secret(s)"))
        .stdout(predicate::str::contains("stale-token"))
        .stdout(predicate::str::contains("stale-cert").not())
        .stdout(predicate::str::contains("evergreen").not());
}

#[test]
fn completions_reject_unknown_shell() {
    secretvault()
        .args(["completions", "csh"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn completions_emit_script() {
    secretvault()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("secretvault"));
}
