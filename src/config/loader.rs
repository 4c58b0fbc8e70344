//! Configuration loader with TOML parsing and environment variable overrides
//!
//! Values are resolved in this order, later steps winning:
//!
//! 1. the TOML file, after `${VAR}` substitution
//! 2. `SLUICE_<SECTION>_<KEY>` overrides
//! 3. the legacy `MONGOURI` / `POSTGRES_*` variables, only for connection
//!    settings that are still empty

use super::schema::{SluiceConfig, WriteMode};
use super::secret::secret_string;
use crate::domain::errors::SluiceError;
use crate::domain::result::Result;
use regex::Regex;
use secrecy::ExposeSecret;
use std::fs;
use std::path::Path;
use url::Url;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into SluiceConfig
/// 4. Applies environment variable overrides (SLUICE_* prefix, then legacy names)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`SluiceError::Configuration`] if the file is missing or unreadable,
/// a referenced variable is unset, the TOML is malformed, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use sluice::config::loader::load_config;
///
/// let config = load_config("sluice.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SluiceConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SluiceError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SluiceError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents, |name| std::env::var(name).ok())
}

/// Parse and validate configuration text, resolving variables through `lookup`
///
/// [`load_config`] passes the process environment; tests pass a map.
pub fn parse_config<F>(contents: &str, lookup: F) -> Result<SluiceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let contents = substitute_env_vars(contents, &lookup)?;

    let mut config: SluiceConfig = toml::from_str(&contents)
        .map_err(|e| SluiceError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config, &lookup)?;
    apply_legacy_env(&mut config, &lookup)?;

    config.validate().map_err(|e| {
        SluiceError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars<F>(input: &str, lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SluiceError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match lookup(var_name) {
                Some(value) => value,
                None => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SluiceError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using SLUICE_* prefix
///
/// Environment variables follow the pattern: SLUICE_<SECTION>_<KEY>
/// For example: SLUICE_SOURCE_URI, SLUICE_PIPELINE_WRITE_MODE
fn apply_env_overrides<F>(config: &mut SluiceConfig, lookup: &F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    // Application overrides
    if let Some(val) = lookup("SLUICE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = lookup("SLUICE_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Source overrides
    if let Some(val) = lookup("SLUICE_SOURCE_URI") {
        config.source.uri = secret_string(val);
    }
    if let Some(val) = lookup("SLUICE_SOURCE_DATABASE") {
        config.source.database = val;
    }
    if let Some(val) = lookup("SLUICE_SOURCE_CONNECT_TIMEOUT_SECONDS") {
        if let Ok(secs) = val.parse() {
            config.source.connect_timeout_seconds = secs;
        }
    }

    // Destination overrides
    if let Some(val) = lookup("SLUICE_DESTINATION_CONNECTION_STRING") {
        config.destination.connection_string = secret_string(val);
    }
    if let Some(val) = lookup("SLUICE_DESTINATION_MAX_CONNECTIONS") {
        if let Ok(max) = val.parse() {
            config.destination.max_connections = max;
        }
    }
    if let Some(val) = lookup("SLUICE_DESTINATION_STATEMENT_TIMEOUT_SECONDS") {
        if let Ok(secs) = val.parse() {
            config.destination.statement_timeout_seconds = secs;
        }
    }
    if let Some(val) = lookup("SLUICE_DESTINATION_INSERT_CHUNK_SIZE") {
        if let Ok(size) = val.parse() {
            config.destination.insert_chunk_size = size;
        }
    }

    // Pipeline overrides
    if let Some(val) = lookup("SLUICE_PIPELINE_WRITE_MODE") {
        config.pipeline.write_mode = val
            .parse::<WriteMode>()
            .map_err(SluiceError::Configuration)?;
    }

    // Logging overrides
    if let Some(val) = lookup("SLUICE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Some(val) = lookup("SLUICE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = lookup("SLUICE_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

/// Fill empty connection settings from `MONGOURI` and `POSTGRES_*`
fn apply_legacy_env<F>(config: &mut SluiceConfig, lookup: &F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if config.source.uri.expose_secret().is_empty() {
        if let Some(uri) = lookup("MONGOURI") {
            config.source.uri = secret_string(uri);
        }
    }

    if config.destination.connection_string.expose_secret().is_empty() {
        if let Some(host) = lookup("POSTGRES_HOST") {
            let connection_string = legacy_connection_string(
                &host,
                lookup("POSTGRES_PORT").as_deref(),
                lookup("POSTGRES_USER").as_deref(),
                lookup("POSTGRES_PASSWORD").as_deref(),
                lookup("POSTGRES_DB").as_deref(),
            )?;
            config.destination.connection_string = secret_string(connection_string);
        }
    }

    Ok(())
}

/// Assemble a `postgresql://` URL, percent-encoding the credentials
fn legacy_connection_string(
    host: &str,
    port: Option<&str>,
    user: Option<&str>,
    password: Option<&str>,
    database: Option<&str>,
) -> Result<String> {
    let invalid = |what: &str| SluiceError::Configuration(format!("Invalid POSTGRES_{what}"));

    let mut url = Url::parse(&format!("postgresql://{host}")).map_err(|_| invalid("HOST"))?;

    if let Some(port) = port.filter(|p| !p.is_empty()) {
        let port: u16 = port.parse().map_err(|_| invalid("PORT"))?;
        url.set_port(Some(port)).map_err(|_| invalid("PORT"))?;
    }
    if let Some(user) = user.filter(|u| !u.is_empty()) {
        url.set_username(user).map_err(|_| invalid("USER"))?;
    }
    if let Some(password) = password.filter(|p| !p.is_empty()) {
        url.set_password(Some(password))
            .map_err(|_| invalid("PASSWORD"))?;
    }
    if let Some(database) = database.filter(|d| !d.is_empty()) {
        url.set_path(&format!("/{database}"));
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[source]
uri = "mongodb://localhost:27017"

[destination]
connection_string = "postgresql://etl:pw@localhost:5432/warehouse"

[[pipeline.collections]]
name = "sports"
key = "sports"
"#;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_substitute_env_vars() {
        let lookup = env(&[("TEST_VAR", "test_value")]);
        let result = substitute_env_vars("password = \"${TEST_VAR}\"", &lookup).unwrap();
        assert_eq!(result, "password = \"test_value\"\n");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        let lookup = env(&[]);
        let err = substitute_env_vars("a = \"${MISSING_A}\"\nb = \"${MISSING_B}\"", &lookup)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("MISSING_A"));
        assert!(message.contains("MISSING_B"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        let lookup = env(&[]);
        let result = substitute_env_vars("# uri = \"${NOT_SET}\"", &lookup).unwrap();
        assert!(result.contains("${NOT_SET}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(SluiceError::Configuration(_))));
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = parse_config(MINIMAL, env(&[])).unwrap();
        assert_eq!(config.source.database, "odds");
        assert_eq!(config.pipeline.write_mode, WriteMode::Replace);
        assert_eq!(config.pipeline.collections.len(), 1);
        assert_eq!(config.destination.insert_chunk_size, 1000);
    }

    #[test]
    fn test_prefixed_overrides() {
        let config = parse_config(
            MINIMAL,
            env(&[
                ("SLUICE_SOURCE_DATABASE", "odds_staging"),
                ("SLUICE_PIPELINE_WRITE_MODE", "append"),
                ("SLUICE_DESTINATION_INSERT_CHUNK_SIZE", "250"),
            ]),
        )
        .unwrap();

        assert_eq!(config.source.database, "odds_staging");
        assert_eq!(config.pipeline.write_mode, WriteMode::Append);
        assert_eq!(config.destination.insert_chunk_size, 250);
    }

    #[test]
    fn test_invalid_write_mode_override() {
        let result = parse_config(MINIMAL, env(&[("SLUICE_PIPELINE_WRITE_MODE", "merge")]));
        assert!(matches!(result, Err(SluiceError::Configuration(_))));
    }

    #[test]
    fn test_legacy_env_fallback() {
        let contents = r#"
[[pipeline.collections]]
name = "outcomes"
key = "markets"
"#;
        let config = parse_config(
            contents,
            env(&[
                ("MONGOURI", "mongodb://mongo:27017"),
                ("POSTGRES_HOST", "warehouse"),
                ("POSTGRES_PORT", "5433"),
                ("POSTGRES_USER", "etl"),
                ("POSTGRES_PASSWORD", "p@ss word"),
                ("POSTGRES_DB", "odds"),
            ]),
        )
        .unwrap();

        assert_eq!(
            config.source.uri.expose_secret().as_ref(),
            "mongodb://mongo:27017"
        );
        let conn = config.destination.connection_string.expose_secret();
        let parsed: tokio_postgres::Config = conn.as_ref().parse().unwrap();
        assert_eq!(parsed.get_user(), Some("etl"));
        assert_eq!(parsed.get_password(), Some("p@ss word".as_bytes()));
        assert_eq!(parsed.get_dbname(), Some("odds"));
        assert_eq!(parsed.get_ports(), &[5433]);
    }

    #[test]
    fn test_legacy_env_does_not_override_file() {
        let config = parse_config(MINIMAL, env(&[("MONGOURI", "mongodb://other:27017")])).unwrap();
        assert_eq!(
            config.source.uri.expose_secret().as_ref(),
            "mongodb://localhost:27017"
        );
    }

    #[test]
    fn test_legacy_invalid_port() {
        let contents = "[[pipeline.collections]]\nname = \"sports\"\nkey = \"sports\"\n";
        let result = parse_config(
            contents,
            env(&[
                ("MONGOURI", "mongodb://mongo:27017"),
                ("POSTGRES_HOST", "warehouse"),
                ("POSTGRES_PORT", "not-a-port"),
            ]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_connections_fail_validation() {
        let contents = "[[pipeline.collections]]\nname = \"sports\"\nkey = \"sports\"\n";
        let err = parse_config(contents, env(&[])).unwrap_err();
        assert!(err.to_string().contains("source.uri is required"));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.collections[0].name, "sports");
    }
}
