//! Service configuration.
//!
//! The configuration is either read from a YAML file, or assembled from
//! environment variables named after its sections (`MODEL`, `SERVER`, `URLS`
//! and `SECRETS`, matched case-insensitively) whose values are JSON objects.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

/// Errors that can occur while loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The config file could not be read.
    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        /// The path that was read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
    /// The config file is not valid YAML, or doesn't match the schema.
    #[error("invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// A section variable is not valid JSON, or doesn't match the schema.
    #[error("invalid value of `{var}`: {source}")]
    Json {
        /// The environment variable holding the section.
        var: String,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// A required section is missing from the environment.
    #[error("missing config section `{0}`")]
    MissingSection(&'static str),
    /// A field has a value that doesn't make sense.
    #[error("invalid `{field}`: {reason}")]
    InvalidValue {
        /// Dotted path of the field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Model settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Model {
    /// Maximum number of tokens to generate per reply.
    pub max_tokens: u32,
    /// Model identifier, as known to the LLM endpoint.
    pub name: String,
    /// Forwarded to the endpoint as the `ttl` request field.
    pub timeout: u64,
}

/// Server settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Server {
    /// Listening host.
    pub host: String,
    /// Listening port.
    pub port: u16,
    /// Number of worker threads of the runtime.
    pub threads: usize,
}

/// Endpoint URLs.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Urls {
    /// Base URL of the OpenAI-compatible endpoint.
    pub llm: String,
    /// Token service URL.
    pub tokens: String,
}

/// Where secrets are stored.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SecretsConfig {
    /// Directory holding one file per secret.
    pub path: PathBuf,
}

/// The whole configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Model settings.
    pub model: Model,
    /// Server settings.
    pub server: Server,
    /// Endpoint URLs.
    pub urls: Urls,
    /// Secrets location.
    pub secrets: SecretsConfig,
}

impl Config {
    /// Loads the configuration from `path` if given, or from the environment
    /// otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        info!("loading config");
        match path {
            Some(path) => Self::from_file(path),
            None => Self::from_env(),
        }
    }

    /// Reads a YAML config file. Relative paths are resolved against the
    /// current working directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let cwd = env::current_dir().map_err(|source| Error::Io {
            path: PathBuf::from("."),
            source,
        })?;
        info!("current working directory: {}", cwd.display());

        let path = if path.is_absolute() {
            path.to_owned()
        } else {
            cwd.join(path)
        };
        let text = fs::read_to_string(&path)
            .map_err(|source| Error::Io { path, source })?;
        Self::from_yaml_str(&text)
    }

    /// Parses a YAML document. Unknown keys are ignored.
    pub fn from_yaml_str(text: &str) -> Result<Self, Error> {
        let config: Config = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Assembles the configuration from the process environment.
    pub fn from_env() -> Result<Self, Error> {
        // Variables that are not valid unicode can't hold a section anyway.
        Self::from_vars(env::vars_os().filter_map(|(key, value)| {
            Some((key.into_string().ok()?, value.into_string().ok()?))
        }))
    }

    /// Assembles the configuration from the given variables.
    ///
    /// Each section is looked up by name regardless of case, and its value
    /// is parsed as JSON.
    pub fn from_vars<I>(vars: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, (String, String)> = vars
            .into_iter()
            .map(|(key, value)| (key.to_ascii_lowercase(), (key, value)))
            .collect();

        let config = Config {
            model: section(&vars, "model")?,
            server: section(&vars, "server")?,
            urls: section(&vars, "urls")?,
            secrets: section(&vars, "secrets")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the values that deserialization alone can't catch.
    pub fn validate(&self) -> Result<(), Error> {
        if self.model.name.trim().is_empty() {
            return Err(invalid("model.name", "must not be empty"));
        }
        if self.model.max_tokens == 0 {
            return Err(invalid("model.max_tokens", "must be positive"));
        }
        if self.server.threads == 0 {
            return Err(invalid("server.threads", "must be positive"));
        }
        check_url("urls.llm", &self.urls.llm)?;
        check_url("urls.tokens", &self.urls.tokens)?;
        Ok(())
    }
}

fn section<T: DeserializeOwned>(
    vars: &HashMap<String, (String, String)>,
    name: &'static str,
) -> Result<T, Error> {
    let (var, value) = vars.get(name).ok_or(Error::MissingSection(name))?;
    serde_json::from_str(value).map_err(|source| Error::Json {
        var: var.clone(),
        source,
    })
}

fn check_url(field: &'static str, value: &str) -> Result<(), Error> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|err| invalid(field, err.to_string()))
}

#[inline]
fn invalid<S: Into<String>>(field: &'static str, reason: S) -> Error {
    Error::InvalidValue {
        field,
        reason: reason.into(),
    }
}
