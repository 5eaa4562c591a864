use super::*;

#[test]
fn no_flags_runs_full_check() {
    let cli = Cli::try_parse_from(["salewatch"]).expect("expected valid cli args");
    assert!(!cli.verbose);
    assert!(!cli.dry_run);
    assert!(!cli.test_notify);
    assert!(!cli.list);
    assert!(cli.store.is_none());
    assert!(cli.state_file.is_none());
}

#[test]
fn parses_short_flags() {
    let cli = Cli::try_parse_from(["salewatch", "-v", "-n", "-s", "H&M Herr"])
        .expect("expected valid cli args");
    assert!(cli.verbose);
    assert!(cli.dry_run);
    assert_eq!(cli.store.as_deref(), Some("H&M Herr"));
}

#[test]
fn parses_paths() {
    let cli = Cli::try_parse_from([
        "salewatch",
        "--state-file",
        "/var/lib/salewatch/state.json",
        "--stores",
        "custom.yaml",
    ])
    .expect("expected valid cli args");
    assert_eq!(
        cli.state_file,
        Some(PathBuf::from("/var/lib/salewatch/state.json"))
    );
    assert_eq!(cli.stores, Some(PathBuf::from("custom.yaml")));
}

#[test]
fn test_notify_conflicts_with_store() {
    let result = Cli::try_parse_from(["salewatch", "--test-notify", "--store", "COS"]);
    assert!(result.is_err());
}

#[test]
fn list_conflicts_with_store() {
    let result = Cli::try_parse_from(["salewatch", "--list", "--store", "COS"]);
    assert!(result.is_err());
}

#[test]
fn overrides_replace_config_paths() {
    let cli = Cli::try_parse_from(["salewatch", "--state-file", "other.json"])
        .expect("expected valid cli args");
    let mut config = AppConfig {
        env: salewatch_core::Environment::Test,
        log_level: "info".to_string(),
        stores_path: PathBuf::from("./config/stores.yaml"),
        state_file: PathBuf::from("sale_state.json"),
        request_timeout_secs: 30,
        user_agent: "ua".to_string(),
        accept_language: "sv-SE".to_string(),
        max_retries: 0,
        retry_backoff_base_ms: 0,
        max_concurrent_stores: 1,
        ntfy: None,
        email: None,
    };
    cli.apply_overrides(&mut config);
    assert_eq!(config.state_file, PathBuf::from("other.json"));
    assert_eq!(config.stores_path, PathBuf::from("./config/stores.yaml"));
}
