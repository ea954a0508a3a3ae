//! Provider credential resolution
//!
//! Credentials are an explicit ordered list supplied at startup. The
//! environment wins over TOML so secrets can stay out of config files.
//! Priority: ENV → TOML

use foodcraft_common::config::TomlConfig;
use tracing::{info, warn};

/// Comma-separated, ordered text-provider keys (primary first)
pub const TEXT_API_KEYS_ENV: &str = "FOODCRAFT_TEXT_API_KEYS";

/// Image-provider key
pub const IMAGE_API_KEY_ENV: &str = "FOODCRAFT_IMAGE_API_KEY";

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Trim keys, drop blanks and duplicates, keep first-seen order
pub fn normalize_keys<I, S>(keys: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for key in keys {
        let key = key.as_ref().trim();
        if is_valid_key(key) && !normalized.iter().any(|k| k == key) {
            normalized.push(key.to_string());
        }
    }
    normalized
}

/// Split a comma-separated key list
pub fn parse_key_list(raw: &str) -> Vec<String> {
    normalize_keys(raw.split(','))
}

/// Resolve the ordered text-provider credential list
///
/// An empty result is not an error here: the resolver reports it as a
/// configuration error on first use, before any network call.
pub fn resolve_text_credentials(toml_config: &TomlConfig) -> Vec<String> {
    let env_keys = std::env::var(TEXT_API_KEYS_ENV)
        .map(|raw| parse_key_list(&raw))
        .unwrap_or_default();
    let toml_keys = normalize_keys(&toml_config.text_provider.api_keys);

    if !env_keys.is_empty() {
        if !toml_keys.is_empty() {
            warn!(
                "Text provider keys found in both {} and TOML. Using environment.",
                TEXT_API_KEYS_ENV
            );
        }
        info!(count = env_keys.len(), "Text provider keys loaded from environment");
        return env_keys;
    }

    if !toml_keys.is_empty() {
        info!(count = toml_keys.len(), "Text provider keys loaded from TOML config");
        return toml_keys;
    }

    warn!(
        "No text provider key configured. Set {} or text_provider.api_keys; combinations will fail until then.",
        TEXT_API_KEYS_ENV
    );
    Vec::new()
}

/// Resolve the optional image-provider key
pub fn resolve_image_key(toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(IMAGE_API_KEY_ENV)
        .ok()
        .filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .image_provider
        .api_key
        .clone()
        .filter(|k| is_valid_key(k));

    match (env_key, toml_key) {
        (Some(env), toml) => {
            if toml.is_some() {
                warn!(
                    "Image provider key found in both {} and TOML. Using environment.",
                    IMAGE_API_KEY_ENV
                );
            }
            info!("Image provider key loaded from environment");
            Some(env.trim().to_string())
        }
        (None, Some(toml)) => {
            info!("Image provider key loaded from TOML config");
            Some(toml.trim().to_string())
        }
        (None, None) => {
            info!("No image provider key configured, dishes will have no images");
            None
        }
    }
}
