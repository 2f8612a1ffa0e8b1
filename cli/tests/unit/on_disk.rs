//! Services against the real filesystem adapter in a temporary directory.

#![allow(clippy::unwrap_used)]

use agent_bootstrap::application::services::platform::Dedicated;
use agent_bootstrap::application::services::profile::configure_profile;
use agent_bootstrap::commands::exit_code;
use agent_bootstrap::domain::ProfileChange;
use agent_bootstrap::infra::fs::StdFs;

#[test]
fn profile_from_template_then_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("amazon-ssm-agent.json.template"),
        r#"{"Agent": {"Region": ""}, "Profile": {"ShareProfile": ""}}"#,
    )
    .unwrap();

    assert_eq!(configure_profile(&StdFs, dir.path()), ProfileChange::Updated);
    let first = std::fs::read_to_string(dir.path().join("amazon-ssm-agent.json")).unwrap();
    assert!(first.ends_with('\n'));
    let value: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(value["Profile"]["ShareProfile"], "rackspace");
    assert_eq!(value["Agent"]["Region"], "");

    assert_eq!(configure_profile(&StdFs, dir.path()), ProfileChange::Unchanged);
    let second = std::fs::read_to_string(dir.path().join("amazon-ssm-agent.json")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn profile_without_any_config_is_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(configure_profile(&StdFs, dir.path()), ProfileChange::Unchanged);
    assert!(!dir.path().join("amazon-ssm-agent.json").exists());
}

#[test]
fn dedicated_token_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token");
    let dedicated = Dedicated {
        token_file: path.clone(),
    };

    let err = dedicated.token(&StdFs).unwrap_err();
    assert_eq!(exit_code(&err), 122);

    std::fs::write(&path, "\n\n").unwrap();
    assert_eq!(exit_code(&dedicated.token(&StdFs).unwrap_err()), 123);

    std::fs::write(&path, "  secret-token \n").unwrap();
    assert_eq!(dedicated.token(&StdFs).unwrap().as_str(), "secret-token");
}
