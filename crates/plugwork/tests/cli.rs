use assert_cmd::Command; // Bring Command into scope
use predicates::prelude::*; // Bring predicate traits into scope
use std::fs::{self, File};
use tempfile::tempdir;

#[test]
fn test_ping_command() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("plugwork")?;
    cmd.arg("--ping");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("pong"));
    Ok(())
}

#[test]
fn test_no_args_lists_namespaces() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("plugwork")?;
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Command (2)"))
        .stdout(predicate::str::contains("Object (1)"))
        .stdout(predicate::str::contains("Backend (1)"))
        .stdout(predicate::str::contains("Display a user, with groups."));
    Ok(())
}

#[test]
fn test_plugins_lists_namespaces_joined() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("plugwork")?;
    cmd.arg("plugins");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("builtin.user.user: Object"))
        .stdout(predicate::str::contains("builtin.user_override.user_show: Command"))
        .stdout(predicate::str::contains("builtin.user.user_show").not());
    Ok(())
}

#[test]
fn test_run_command() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("plugwork")?;
    cmd.args(["run", "ping"]);
    cmd.assert().success().stdout("pong\n");

    // The override knows what it replaced
    let mut cmd = Command::cargo_bin("plugwork")?;
    cmd.args(["run", "user_show"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("user: admin (groups: admins)"))
        .stdout(predicate::str::contains("overrides builtin.user.user_show"));
    Ok(())
}

#[test]
fn test_run_unknown_command_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("plugwork")?;
    cmd.args(["run", "missing"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown command: missing"));
    Ok(())
}

#[test]
fn test_env_overrides_are_visible() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("plugwork")?;
    cmd.args(["-e", "realm=EXAMPLE.COM", "-e", "verbose=1", "env"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("realm = \"EXAMPLE.COM\""))
        .stdout(predicate::str::contains("context = \"cli\""))
        .stdout(predicate::str::contains("plugins_on_demand = true"))
        .stdout(predicate::str::contains("verbose = 1"));
    Ok(())
}

#[test]
fn test_invalid_mode_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("plugwork")?;
    cmd.args(["-e", "mode=staging"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value for 'mode'"));
    Ok(())
}

#[test]
fn test_fail_on_skip_aborts() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("plugwork")?;
    cmd.args(["-e", "fail_on_skip=true"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("builtin.ldap"));
    Ok(())
}

#[test]
fn test_unit_test_mode_skips_loading() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("plugwork")?;
    cmd.args(["-e", "mode=unit_test"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Command (0)"));
    Ok(())
}

#[test]
fn test_conf_file_values() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;
    let conf = temp_dir.path().join("plugwork.json");
    fs::write(&conf, r#"{"store_url": "file:///var/lib/plugwork", "realm": "FILE"}"#)?;

    let mut cmd = Command::cargo_bin("plugwork")?;
    cmd.arg("-c").arg(&conf).args(["-e", "realm=CLI", "env"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("store_url = \"file:///var/lib/plugwork\""))
        // Command line beats the file
        .stdout(predicate::str::contains("realm = \"CLI\""));
    Ok(())
}

#[test]
fn test_plugin_dir_adds_site_modules() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;
    File::create(temp_dir.path().join("hello.rs"))?;
    File::create(temp_dir.path().join("ping_override.rs"))?;
    File::create(temp_dir.path().join("mod.rs"))?;

    let mut cmd = Command::cargo_bin("plugwork")?;
    cmd.arg("--plugin-dir").arg(temp_dir.path()).args(["run", "hello"]);
    cmd.assert().success().stdout("hello, world\n");

    let mut cmd = Command::cargo_bin("plugwork")?;
    cmd.arg("--plugin-dir").arg(temp_dir.path()).args(["run", "ping"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("PONG (overrides builtin.ping.ping)"));
    Ok(())
}

#[test]
fn test_unknown_site_module_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;
    File::create(temp_dir.path().join("mystery.rs"))?;

    let mut cmd = Command::cargo_bin("plugwork")?;
    cmd.arg("--plugin-dir").arg(temp_dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("site.mystery"));
    Ok(())
}
