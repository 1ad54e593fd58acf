use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default config file location: ~/.cloudctl/config
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cloudctl")
        .join("config")
}

/// Expand `~` and environment variables in a user supplied path
pub fn expand_path(path: &Path) -> Result<PathBuf, ContextError> {
    let raw = path.to_string_lossy();
    let expanded =
        shellexpand::full(&raw).map_err(|e| ContextError::InvalidPath(e.to_string()))?;
    Ok(PathBuf::from(expanded.into_owned()))
}

/// Errors that can occur during context operations
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Context '{0}' not found")]
    ContextNotFound(String),

    #[error("No current context set, use 'cloudctl context add' and 'cloudctl context use'")]
    NoCurrentContext,

    #[error("No {0} URL configured in the current context")]
    MissingUrl(&'static str),

    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Failed to write config: {0}")]
    WriteError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Endpoints and credentials of one garden/metal installation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Display name for this context
    pub name: String,
    /// URL of the garden (cluster lifecycle) API
    pub garden_url: String,
    /// URL of the metal (network allocation) API
    pub metal_url: String,
    /// Optional bearer token sent to both services
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The complete configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Currently active context name
    #[serde(rename = "current-context")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_context: Option<String>,

    /// Map of context name to context definition
    #[serde(default)]
    pub contexts: HashMap<String, Context>,
}

/// Values given on the command line or through the environment.
/// Each one wins over the context file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub context: Option<String>,
    pub garden_url: Option<String>,
    pub metal_url: Option<String>,
    pub api_token: Option<String>,
}

/// Where to reach the services for this invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub garden_url: String,
    pub metal_url: String,
    pub api_token: Option<String>,
}

// ============================================================================
// SBIO: Pure business logic (no I/O)
// ============================================================================

/// Parse config from YAML string
pub fn parse_config(content: &str) -> Result<Config, ContextError> {
    serde_yaml::from_str(content).map_err(|e| ContextError::ParseError(e.to_string()))
}

/// Serialize config to YAML string
pub fn serialize_config(config: &Config) -> Result<String, ContextError> {
    serde_yaml::to_string(config).map_err(|e| ContextError::WriteError(e.to_string()))
}

/// Add or update a context in the config
pub fn add_context(config: &mut Config, context: Context) {
    config.contexts.insert(context.name.clone(), context);
}

/// Remove a context from the config
pub fn remove_context(config: &mut Config, name: &str) -> Option<Context> {
    let removed = config.contexts.remove(name);
    if config.current_context.as_deref() == Some(name) {
        config.current_context = None;
    }
    removed
}

/// Set the current context
pub fn set_current_context(config: &mut Config, name: &str) -> Result<(), ContextError> {
    if !config.contexts.contains_key(name) {
        return Err(ContextError::ContextNotFound(name.to_string()));
    }
    config.current_context = Some(name.to_string());
    Ok(())
}

/// Get a context by name
pub fn get_context<'a>(config: &'a Config, name: &str) -> Result<&'a Context, ContextError> {
    config
        .contexts
        .get(name)
        .ok_or_else(|| ContextError::ContextNotFound(name.to_string()))
}

/// Combine the config file with overrides into concrete endpoints.
///
/// When both URLs are overridden no context is needed at all.
pub fn resolve_endpoints(config: &Config, overrides: &Overrides) -> Result<Endpoints, ContextError> {
    let selected = overrides
        .context
        .as_deref()
        .or(config.current_context.as_deref());

    let context = match selected {
        Some(name) => Some(get_context(config, name)?),
        None if overrides.garden_url.is_some() && overrides.metal_url.is_some() => None,
        None => return Err(ContextError::NoCurrentContext),
    };

    let garden_url = overrides
        .garden_url
        .clone()
        .or_else(|| context.map(|c| c.garden_url.clone()))
        .filter(|url| !url.is_empty())
        .ok_or(ContextError::MissingUrl("garden"))?;
    let metal_url = overrides
        .metal_url
        .clone()
        .or_else(|| context.map(|c| c.metal_url.clone()))
        .filter(|url| !url.is_empty())
        .ok_or(ContextError::MissingUrl("metal"))?;
    let api_token = overrides
        .api_token
        .clone()
        .or_else(|| context.and_then(|c| c.api_token.clone()));

    Ok(Endpoints {
        garden_url,
        metal_url,
        api_token,
    })
}

// ============================================================================
// I/O boundary functions
// ============================================================================

/// Load config from a specific path, an absent file is an empty config
pub fn load_config_from(path: &Path) -> Result<Config, ContextError> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Save config to a specific path
pub fn save_config_to(config: &Config, path: &Path) -> Result<(), ContextError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serialize_config(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

impl Context {
    /// Create a new context
    pub fn new(
        name: impl Into<String>,
        garden_url: impl Into<String>,
        metal_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            garden_url: garden_url.into(),
            metal_url: metal_url.into(),
            api_token: None,
            description: None,
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(name: &str) -> Config {
        let mut config = Config::default();
        add_context(
            &mut config,
            Context::new(name, "https://garden.example", "https://metal.example")
                .with_api_token("secret"),
        );
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.current_context.is_none());
        assert!(config.contexts.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
current-context: prod
contexts:
  prod:
    name: prod
    garden_url: https://garden.example
    metal_url: https://metal.example
    api_token: secret123
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.current_context, Some("prod".to_string()));
        let ctx = &config.contexts["prod"];
        assert_eq!(ctx.metal_url, "https://metal.example");
        assert_eq!(ctx.api_token.as_deref(), Some("secret123"));
    }

    #[test]
    fn test_parse_config_invalid() {
        let result = parse_config("contexts: [1, 2");
        assert!(matches!(result, Err(ContextError::ParseError(_))));
    }

    #[test]
    fn test_serialize_config() {
        let mut config = config_with("test");
        set_current_context(&mut config, "test").unwrap();

        let yaml = serialize_config(&config).unwrap();
        assert!(yaml.contains("current-context: test"));
        assert!(yaml.contains("garden_url: https://garden.example"));
    }

    #[test]
    fn test_remove_current_context() {
        let mut config = config_with("test");
        set_current_context(&mut config, "test").unwrap();

        let removed = remove_context(&mut config, "test");
        assert!(removed.is_some());
        assert!(config.current_context.is_none());
    }

    #[test]
    fn test_set_current_context_not_found() {
        let mut config = Config::default();
        let result = set_current_context(&mut config, "nonexistent");
        assert!(matches!(result, Err(ContextError::ContextNotFound(_))));
    }

    #[test]
    fn test_resolve_from_current_context() {
        let mut config = config_with("prod");
        set_current_context(&mut config, "prod").unwrap();

        let endpoints = resolve_endpoints(&config, &Overrides::default()).unwrap();
        assert_eq!(endpoints.garden_url, "https://garden.example");
        assert_eq!(endpoints.metal_url, "https://metal.example");
        assert_eq!(endpoints.api_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_resolve_overrides_win() {
        let mut config = config_with("prod");
        set_current_context(&mut config, "prod").unwrap();
        let overrides = Overrides {
            garden_url: Some("http://localhost:9000".to_string()),
            api_token: Some("other".to_string()),
            ..Default::default()
        };

        let endpoints = resolve_endpoints(&config, &overrides).unwrap();
        assert_eq!(endpoints.garden_url, "http://localhost:9000");
        assert_eq!(endpoints.metal_url, "https://metal.example");
        assert_eq!(endpoints.api_token.as_deref(), Some("other"));
    }

    #[test]
    fn test_resolve_without_context() {
        let config = Config::default();
        assert!(matches!(
            resolve_endpoints(&config, &Overrides::default()),
            Err(ContextError::NoCurrentContext)
        ));

        let overrides = Overrides {
            garden_url: Some("http://garden".to_string()),
            metal_url: Some("http://metal".to_string()),
            ..Default::default()
        };
        let endpoints = resolve_endpoints(&config, &overrides).unwrap();
        assert_eq!(endpoints.metal_url, "http://metal");
        assert!(endpoints.api_token.is_none());
    }

    #[test]
    fn test_resolve_unknown_context_override() {
        let config = config_with("prod");
        let overrides = Overrides {
            context: Some("staging".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_endpoints(&config, &overrides),
            Err(ContextError::ContextNotFound(_))
        ));
    }

    #[test]
    fn test_resolve_empty_url() {
        let mut config = Config::default();
        add_context(&mut config, Context::new("half", "https://garden.example", ""));
        set_current_context(&mut config, "half").unwrap();
        assert!(matches!(
            resolve_endpoints(&config, &Overrides::default()),
            Err(ContextError::MissingUrl("metal"))
        ));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config");

        let mut config = config_with("prod");
        set_current_context(&mut config, "prod").unwrap();
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.current_context.as_deref(), Some("prod"));
        assert_eq!(loaded.contexts["prod"], config.contexts["prod"]);
    }

    #[test]
    fn test_load_missing_file() {
        let config = load_config_from(Path::new("/nonexistent/cloudctl/config")).unwrap();
        assert!(config.contexts.is_empty());
    }

    #[test]
    fn test_expand_path_plain() {
        let path = expand_path(Path::new("/etc/cloudctl/config")).unwrap();
        assert_eq!(path, PathBuf::from("/etc/cloudctl/config"));
    }
}
