//! Environment helpers shared by the storefront, admin and CLI binaries.
//!
//! Each binary owns its config struct; this module only reads and checks
//! individual variables. Secrets come back as [`SecretString`] and are
//! screened for placeholder values and low entropy before use.

use std::collections::HashMap;
use std::str::FromStr;

use secrecy::SecretString;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Values that show up when a `.env.example` is copied without editing.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "seu-",
    "sua-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "exemplo",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Load `.env` if present. A missing file is not an error.
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        tracing::warn!(error = %e, "failed to read .env file");
    }
}

/// Get a required, non-blank environment variable.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnvVar`] when unset or blank.
pub fn required_env(key: &str) -> Result<String, ConfigError> {
    optional_env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get an optional environment variable. Blank values count as unset.
#[must_use]
pub fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
#[must_use]
pub fn env_or_default(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] when the value does not parse.
pub fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
}

/// Database URL from `primary_key`, falling back to the generic
/// `DATABASE_URL` set by managed Postgres attachments.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnvVar`] naming `primary_key` when neither
/// variable is set.
pub fn database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    optional_env(primary_key)
        .or_else(|| optional_env("DATABASE_URL"))
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_owned()))
}

/// Load a required secret and check its strength.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnvVar`] or [`ConfigError::InsecureSecret`].
pub fn validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

/// Load an optional secret; when present it must pass the strength check.
///
/// # Errors
///
/// Returns [`ConfigError::InsecureSecret`] for a weak value.
pub fn optional_validated_secret(key: &str) -> Result<Option<SecretString>, ConfigError> {
    optional_env(key)
        .map(|value| {
            validate_secret_strength(&value, key)?;
            Ok(SecretString::from(value))
        })
        .transpose()
}

/// Calculate Shannon entropy in bits per character.
#[must_use]
pub fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholder values and low-entropy strings.
///
/// # Errors
///
/// Returns [`ConfigError::InsecureSecret`] describing the problem.
pub fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated key."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_bounds() {
        assert!(shannon_entropy("").abs() < f64::EPSILON);
        assert!(shannon_entropy("aaaaaaa").abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_rejects_placeholders() {
        for value in ["your-abacatepay-key", "sua-chave-aqui", "changeme123"] {
            assert!(matches!(
                validate_secret_strength(value, "ABACATEPAY_API_KEY"),
                Err(ConfigError::InsecureSecret(_, _))
            ));
        }
    }

    #[test]
    fn test_rejects_low_entropy() {
        assert!(validate_secret_strength(&"a".repeat(40), "NOTION_API_KEY").is_err());
    }

    #[test]
    fn test_accepts_random_key() {
        assert!(validate_secret_strength("abc_dev_9fK2mQ7xLp4Rt8Vw1Zs6", "ABACATEPAY_API_KEY").is_ok());
    }

    #[test]
    fn test_missing_required_env() {
        let err = required_env("OPEN_BAR_TEST_SURELY_UNSET").unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "OPEN_BAR_TEST_SURELY_UNSET"));
        assert_eq!(env_or_default("OPEN_BAR_TEST_SURELY_UNSET", "3000"), "3000");
        assert_eq!(parse_env::<u16>("OPEN_BAR_TEST_SURELY_UNSET", "3000").unwrap(), 3000);
        assert!(parse_env::<u16>("OPEN_BAR_TEST_SURELY_UNSET", "porta").is_err());
    }
}
