// tests/config_env.rs
// Mutates process env and CWD, so every test is serialized.

use std::{env, fs};

use emotion_vsm::config::{
    AppConfig, ENV_CONFIG_PATH, ENV_DEBUG_ROUTES, ENV_HISTORY_CAPACITY, ENV_MAX_BATCH_ROWS,
};

fn clear_env() {
    for k in [
        ENV_CONFIG_PATH,
        ENV_HISTORY_CAPACITY,
        ENV_MAX_BATCH_ROWS,
        ENV_DEBUG_ROUTES,
    ] {
        env::remove_var(k);
    }
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // isolate CWD so the repo's own config/ is not read
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    // 1) nothing on disk → defaults
    assert_eq!(AppConfig::load().unwrap(), AppConfig::default());

    // 2) fallback TOML in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("emotion.toml"), "history_capacity = 25\n").unwrap();
    let cfg = AppConfig::load().unwrap();
    assert_eq!(cfg.history_capacity, 25);
    assert_eq!(cfg.max_batch_rows, 5_000);

    // 3) explicit path wins over the fallback
    let p_env = tmp.path().join("other.toml");
    fs::write(&p_env, "max_batch_rows = 7\ndebug_routes = true\n").unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    let cfg = AppConfig::load().unwrap();
    assert_eq!(cfg.history_capacity, 10_000);
    assert_eq!(cfg.max_batch_rows, 7);
    assert!(cfg.debug_routes);

    // 4) a dangling explicit path is an error
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
    assert!(AppConfig::load().is_err());

    clear_env();
    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn env_overrides_apply_on_top_of_file() {
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    env::set_var(ENV_HISTORY_CAPACITY, "3");
    env::set_var(ENV_MAX_BATCH_ROWS, "not-a-number");
    env::set_var(ENV_DEBUG_ROUTES, "1");
    let cfg = AppConfig::load().unwrap();
    assert_eq!(cfg.history_capacity, 3);
    assert_eq!(cfg.max_batch_rows, 5_000, "unparsable override is ignored");
    assert!(cfg.debug_routes);

    env::set_var(ENV_DEBUG_ROUTES, "true");
    env::set_var(ENV_HISTORY_CAPACITY, "0");
    let cfg = AppConfig::load().unwrap();
    assert!(!cfg.debug_routes, "only DEBUG_ROUTES=1 enables debug routes");
    assert_eq!(cfg.history_capacity, 10_000);

    clear_env();
    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn broken_file_reports_its_path() {
    let tmp = tempfile::tempdir().unwrap();
    clear_env();
    let p = tmp.path().join("broken.toml");
    fs::write(&p, "history_capacity = [").unwrap();
    env::set_var(ENV_CONFIG_PATH, p.display().to_string());

    let err = AppConfig::load().unwrap_err();
    assert!(format!("{err:#}").contains("broken.toml"));

    clear_env();
}
