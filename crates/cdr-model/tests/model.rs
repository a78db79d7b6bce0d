use cdr_model::{AppConfig, BatchFailurePolicy, CurrentStatus, Stage};

#[test]
fn empty_toml_yields_defaults() {
    let config: AppConfig = toml::from_str("").unwrap();
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.store.page_size, 1000);
    assert_eq!(config.store.batch_size, 500);
    assert_eq!(config.rules.excluded_outbound_years, vec![2022, 2023, 2024]);
    assert_eq!(config.orchestration.delay_secs, 20);
}

#[test]
fn partial_toml_overrides_only_named_fields() {
    let config: AppConfig = toml::from_str(
        r#"
[rules]
release_prefixes = ["5"]

[store]
consolidate_failure = "abort"

[orchestration]
stages = ["transfer", "wms-compare"]
delay_secs = 0
"#,
    )
    .unwrap();

    assert_eq!(config.rules.release_prefixes, vec!["5".to_string()]);
    assert_eq!(config.rules.archive_before_year, 2025);
    assert_eq!(config.store.consolidate_failure, BatchFailurePolicy::Abort);
    assert_eq!(
        config.orchestration.stages,
        vec![Stage::Transfer, Stage::WmsCompare]
    );
    assert_eq!(config.orchestration.delay_secs, 0);
}

#[test]
fn unknown_keys_are_rejected() {
    let result: Result<AppConfig, _> = toml::from_str("[rules]\nexclude_years = [2020]\n");
    assert!(result.is_err());
}

#[test]
fn statuses_serialize_as_variant_names() {
    let json = serde_json::to_string(&CurrentStatus::InStock).unwrap();
    assert_eq!(json, "\"InStock\"");
    assert_eq!(CurrentStatus::InStock.to_string(), "In-Stock");
}
