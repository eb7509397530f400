use std::env;
use std::fs;

use serial_test::serial;
use tempfile::TempDir;

use licensegate::config::{LicensingConfig, DEVELOPMENT_SECRET_KEY};
use licensegate::signing::SecretKey;
use licensegate::{LicenseError, LicenseStore, Licensing};

const ENV_VARS: &[&str] = &[
    "LICENSEGATE_SECRET_KEY",
    "LICENSE_SECRET_KEY",
    "LICENSEGATE_ENV",
    "LICENSEGATE_APP_DIR",
    "LICENSEGATE_LICENSE_FILE",
    "LICENSEGATE_MIGRATE_LEGACY",
    "LICENSEGATE_LOGGING_ENABLED",
    "LICENSEGATE_LOG_LEVEL",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

fn write_config(contents: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("licensegate.toml");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
#[serial]
fn loads_defaults_without_file_or_env() {
    clear_env();
    let (_dir, path) = write_config("");

    let config = LicensingConfig::load_from(&path).unwrap();
    assert_eq!(config.license.environment, "development");
    assert_eq!(config.storage.app_dir_name, "licensegate");
    assert_eq!(config.storage.file_name, "license.key");
    assert!(config.storage.migrate_legacy);
    assert!(!config.logging.enabled);
    assert_eq!(
        config.secret_key().unwrap(),
        SecretKey::from(DEVELOPMENT_SECRET_KEY)
    );
}

#[test]
#[serial]
fn file_values_override_defaults() {
    clear_env();
    let (_dir, path) = write_config(
        r#"
[license]
secret_key = "from-file"
default_client_name = "Factory"

[storage]
app_dir_name = "DateFactory"
search_working_dir = false

[logging]
enabled = true
level = "debug"
"#,
    );

    let config = LicensingConfig::load_from(&path).unwrap();
    assert_eq!(config.secret_key().unwrap(), SecretKey::from("from-file"));
    assert_eq!(config.license.default_client_name, "Factory");
    assert_eq!(config.storage.app_dir_name, "DateFactory");
    assert!(!config.storage.search_working_dir);
    assert!(config.storage.search_install_dir);
    assert!(config.logging.enabled);
    assert_eq!(config.logging.level, "debug");
}

#[test]
#[serial]
fn environment_overrides_file() {
    clear_env();
    let (_dir, path) = write_config(
        r#"
[license]
secret_key = "from-file"

[storage]
file_name = "file.key"
"#,
    );
    env::set_var("LICENSEGATE_SECRET_KEY", "from-env");
    env::set_var("LICENSEGATE_LICENSE_FILE", "env.key");
    env::set_var("LICENSEGATE_MIGRATE_LEGACY", "false");

    let config = LicensingConfig::load_from(&path).unwrap();
    clear_env();

    assert_eq!(config.secret_key().unwrap(), SecretKey::from("from-env"));
    assert_eq!(config.storage.file_name, "env.key");
    assert!(!config.storage.migrate_legacy);
}

#[test]
#[serial]
fn legacy_secret_variable_is_honored() {
    clear_env();
    let (_dir, path) = write_config("");
    env::set_var("LICENSE_SECRET_KEY", "legacy-env");

    let config = LicensingConfig::load_from(&path).unwrap();
    clear_env();

    assert_eq!(config.secret_key().unwrap(), SecretKey::from("legacy-env"));
}

#[test]
#[serial]
fn new_secret_variable_takes_precedence() {
    clear_env();
    let (_dir, path) = write_config("");
    env::set_var("LICENSE_SECRET_KEY", "legacy-env");
    env::set_var("LICENSEGATE_SECRET_KEY", "new-env");

    let config = LicensingConfig::load_from(&path).unwrap();
    clear_env();

    assert_eq!(config.secret_key().unwrap(), SecretKey::from("new-env"));
}

#[test]
#[serial]
fn production_without_secret_cannot_build_gate() {
    clear_env();
    let (_dir, path) = write_config("");
    env::set_var("LICENSEGATE_ENV", "production");

    let config = LicensingConfig::load_from(&path).unwrap();
    clear_env();

    assert!(config.is_production());
    assert!(matches!(
        Licensing::from_config(&config),
        Err(LicenseError::ConfigError(_))
    ));
}

#[test]
#[serial]
fn invalid_values_are_rejected_at_load() {
    clear_env();
    let (_dir, path) = write_config("");
    env::set_var("LICENSEGATE_LOG_LEVEL", "verbose");

    let result = LicensingConfig::load_from(&path);
    clear_env();

    assert!(matches!(result, Err(LicenseError::ConfigError(_))));
}

#[test]
#[serial]
fn missing_explicit_file_is_an_error() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let result = LicensingConfig::load_from(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(LicenseError::ConfigError(_))));
}

#[test]
#[serial]
fn store_follows_loaded_storage_section() {
    clear_env();
    let (_dir, path) = write_config(
        r#"
[storage]
file_name = "custom.key"
search_install_dir = false
search_working_dir = false
"#,
    );

    let config = LicensingConfig::load_from(&path).unwrap();
    let store = LicenseStore::from_config(&config.storage);
    assert_eq!(store.file_name(), "custom.key");
    assert_eq!(store.locations().len(), 1);
}
