//! File-backed secrets.
//!
//! Every regular file in the secrets directory holds one secret. The key is
//! derived from the file name by [`file_name_to_key_name`].

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur while loading or reading secrets.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The directory or one of its files could not be read.
    #[error("failed to read secret `{}`: {source}", path.display())]
    Io {
        /// The path being read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
    /// A secret file is neither valid UTF-8 nor valid UTF-16.
    #[error("secret `{}` is not valid text", .0.display())]
    Encoding(PathBuf),
    /// No secret with this key, and no default was given.
    #[error("secret key {0} not found")]
    NotFound(String),
}

/// Turns a secret file name into its key: spaces and dashes become
/// underscores, and letters are upper-cased.
pub fn file_name_to_key_name(name: &str) -> String {
    name.replace([' ', '-'], "_").to_uppercase()
}

/// A read-only set of secrets.
#[derive(Clone, Default)]
pub struct Secrets {
    values: HashMap<String, String>,
}

impl Secrets {
    /// Loads all secrets in `dir`.
    ///
    /// A directory that doesn't exist yields an empty set, and nested
    /// directories are skipped.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        let dir = dir.as_ref();
        let io_err = |path: &Path| {
            let path = path.to_owned();
            move |source| Error::Io { path, source }
        };

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!("secrets directory {} does not exist", dir.display());
                return Ok(Self::default());
            }
            Err(err) => return Err(io_err(dir)(err)),
        };

        let mut values = HashMap::new();
        for entry in entries {
            let entry = entry.map_err(io_err(dir))?;
            let path = entry.path();
            if !path.is_file() {
                trace!("skipping {}", path.display());
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            let key = file_name_to_key_name(name);
            let bytes = fs::read(&path).map_err(io_err(&path))?;
            let value = decode_text(bytes)
                .ok_or_else(|| Error::Encoding(path.clone()))?;
            debug!("loaded secret {key}");
            values.insert(key, value.trim().to_owned());
        }

        Ok(Self { values })
    }

    /// Returns the secret named `key`, or `default` if there is none.
    pub fn get_value(
        &self,
        key: &str,
        default: Option<&str>,
    ) -> Result<String, Error> {
        self.values
            .get(key)
            .map(String::as_str)
            .or(default)
            .map(str::to_owned)
            .ok_or_else(|| Error::NotFound(key.to_owned()))
    }

    /// Returns the number of secrets.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no secrets.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("Secrets").field("keys", &keys).finish()
    }
}

/// Decodes UTF-8, falling back to UTF-16 (little-endian unless a BOM says
/// otherwise).
fn decode_text(bytes: Vec<u8>) -> Option<String> {
    let bytes = match String::from_utf8(bytes) {
        Ok(text) => return Some(text),
        Err(err) => err.into_bytes(),
    };

    let (body, big_endian) = match bytes.as_slice() {
        [0xFF, 0xFE, rest @ ..] => (rest, false),
        [0xFE, 0xFF, rest @ ..] => (rest, true),
        rest => (rest, false),
    };
    if body.len() % 2 != 0 {
        return None;
    }
    let units = body.chunks_exact(2).map(|pair| {
        let pair = [pair[0], pair[1]];
        if big_endian {
            u16::from_be_bytes(pair)
        } else {
            u16::from_le_bytes(pair)
        }
    });
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_name() {
        assert_eq!(file_name_to_key_name("litellm-token"), "LITELLM_TOKEN");
        assert_eq!(file_name_to_key_name("my api key"), "MY_API_KEY");
    }

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("litellm-token"), "sk-123\n").unwrap();
        fs::write(dir.path().join("db password"), "  hunter2  ").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let secrets = Secrets::load(dir.path()).unwrap();
        assert_eq!(secrets.len(), 2);
        assert_eq!(secrets.get_value("LITELLM_TOKEN", None).unwrap(), "sk-123");
        assert_eq!(secrets.get_value("DB_PASSWORD", None).unwrap(), "hunter2");
    }

    #[test]
    fn test_utf16_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "sk-utf16".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        fs::write(dir.path().join("token"), bytes).unwrap();

        let secrets = Secrets::load(dir.path()).unwrap();
        assert_eq!(secrets.get_value("TOKEN", None).unwrap(), "sk-utf16");
    }

    #[test]
    fn test_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let secrets = Secrets::load(dir.path().join("missing")).unwrap();
        assert!(secrets.is_empty());
    }

    #[test]
    fn test_get_value_default() {
        let secrets = Secrets::default();
        assert_eq!(secrets.get_value("A", Some("fallback")).unwrap(), "fallback");
        let err = secrets.get_value("A", None).unwrap_err();
        assert!(matches!(err, Error::NotFound(ref key) if key == "A"));
        assert_eq!(err.to_string(), "secret key A not found");
    }

    #[test]
    fn test_debug_hides_values() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("token"), "sk-secret").unwrap();
        let secrets = Secrets::load(dir.path()).unwrap();
        let debug = format!("{secrets:?}");
        assert!(debug.contains("TOKEN"));
        assert!(!debug.contains("sk-secret"));
    }
}
