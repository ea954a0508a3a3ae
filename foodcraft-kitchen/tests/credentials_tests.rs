//! Tests for provider credential resolution
//!
//! Covers ENV → TOML priority for the ordered text keys and the single image
//! key, plus blank/duplicate handling.
//!
//! Note: every test touches FOODCRAFT_TEXT_API_KEYS or FOODCRAFT_IMAGE_API_KEY
//! and is marked #[serial] so they never run in parallel.

use serial_test::serial;

use foodcraft_common::config::TomlConfig;
use foodcraft_kitchen::config::{
    resolve_image_key, resolve_text_credentials, IMAGE_API_KEY_ENV, TEXT_API_KEYS_ENV,
};

fn clear_env() {
    std::env::remove_var(TEXT_API_KEYS_ENV);
    std::env::remove_var(IMAGE_API_KEY_ENV);
}

fn toml_with_keys(text_keys: &[&str], image_key: Option<&str>) -> TomlConfig {
    let mut toml_config = TomlConfig::default();
    toml_config.text_provider.api_keys = text_keys.iter().map(|k| k.to_string()).collect();
    toml_config.image_provider.api_key = image_key.map(str::to_string);
    toml_config
}

// ============================================================================
// Text provider keys
// ============================================================================

#[test]
#[serial]
fn test_env_text_keys_override_toml() {
    clear_env();
    std::env::set_var(TEXT_API_KEYS_ENV, "env-primary, env-fallback");
    let toml_config = toml_with_keys(&["toml-primary", "toml-fallback"], None);

    let keys = resolve_text_credentials(&toml_config);

    assert_eq!(keys, vec!["env-primary", "env-fallback"]);
    clear_env();
}

#[test]
#[serial]
fn test_toml_text_keys_used_without_env() {
    clear_env();
    let toml_config = toml_with_keys(&["toml-primary", "toml-fallback"], None);

    let keys = resolve_text_credentials(&toml_config);

    assert_eq!(keys, vec!["toml-primary", "toml-fallback"]);
}

#[test]
#[serial]
fn test_blank_env_falls_back_to_toml() {
    clear_env();
    std::env::set_var(TEXT_API_KEYS_ENV, " , ,");
    let toml_config = toml_with_keys(&["toml-primary"], None);

    let keys = resolve_text_credentials(&toml_config);

    assert_eq!(keys, vec!["toml-primary"]);
    clear_env();
}

#[test]
#[serial]
fn test_text_keys_drop_blanks_and_duplicates_in_order() {
    clear_env();
    let toml_config = toml_with_keys(&[" b ", "", "a", "b", "  ", "c"], None);

    let keys = resolve_text_credentials(&toml_config);

    assert_eq!(keys, vec!["b", "a", "c"]);
}

#[test]
#[serial]
fn test_no_text_keys_anywhere() {
    clear_env();
    let toml_config = toml_with_keys(&[], None);

    assert!(resolve_text_credentials(&toml_config).is_empty());
}

// ============================================================================
// Image provider key
// ============================================================================

#[test]
#[serial]
fn test_env_image_key_overrides_toml() {
    clear_env();
    std::env::set_var(IMAGE_API_KEY_ENV, "  env-image  ");
    let toml_config = toml_with_keys(&[], Some("toml-image"));

    assert_eq!(resolve_image_key(&toml_config).as_deref(), Some("env-image"));
    clear_env();
}

#[test]
#[serial]
fn test_image_key_falls_back_to_toml() {
    clear_env();
    let toml_config = toml_with_keys(&[], Some("toml-image"));

    assert_eq!(resolve_image_key(&toml_config).as_deref(), Some("toml-image"));
}

#[test]
#[serial]
fn test_empty_env_image_key_is_ignored() {
    clear_env();
    std::env::set_var(IMAGE_API_KEY_ENV, "   ");
    let toml_config = toml_with_keys(&[], Some("toml-image"));

    assert_eq!(resolve_image_key(&toml_config).as_deref(), Some("toml-image"));
    clear_env();
}

#[test]
#[serial]
fn test_no_image_key_anywhere() {
    clear_env();
    let toml_config = toml_with_keys(&[], Some(""));

    assert_eq!(resolve_image_key(&toml_config), None);
}
