use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::{fs, io};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("component {component}'s config file {path} could not be read: {source}")]
    Read {
        component: String,
        path: PathBuf,
        source: io::Error,
    },
    #[error("component {component}'s config file {path} is malformed: {source}")]
    Malformed {
        component: String,
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error(
        "component {component}'s config file {path} contained unknown configuration options: {}",
        .fields.join(", ")
    )]
    UnknownConfigField {
        component: String,
        path: PathBuf,
        fields: Vec<String>,
    },
}

/// `strict_decode_file()` decodes a TOML file into `T`, failing if the file holds any key that `T`
/// does not map. A typo in operational config must stop the command, not silently fall back to a
/// default.
pub fn strict_decode_file<T: DeserializeOwned>(path: &Path, component: &str) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        component: component.to_string(),
        path: path.to_path_buf(),
        source,
    })?;

    strict_decode_str(&contents, path, component)
}

pub(crate) fn strict_decode_str<T: DeserializeOwned>(
    contents: &str,
    path: &Path,
    component: &str,
) -> Result<T, ConfigError> {
    let mut unknown = Vec::new();
    let mut deserializer = toml::Deserializer::new(contents);
    let decoded: T = serde_ignored::deserialize(&mut deserializer, |ignored| unknown.push(ignored.to_string()))
        .map_err(|source| ConfigError::Malformed {
            component: component.to_string(),
            path: path.to_path_buf(),
            source,
        })?;

    if !unknown.is_empty() {
        return Err(ConfigError::UnknownConfigField {
            component: component.to_string(),
            path: path.to_path_buf(),
            fields: unknown,
        });
    }

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default, rename_all = "kebab-case")]
    struct Sample {
        name: String,
        nested: Nested,
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default, rename_all = "kebab-case")]
    struct Nested {
        retry_count: u32,
    }

    fn decode(contents: &str) -> Result<Sample, ConfigError> {
        strict_decode_str(contents, Path::new("sample.toml"), "cdc")
    }

    #[test]
    fn known_fields_decode() {
        let sample = decode("name = \"x\"\n[nested]\nretry-count = 3\n").unwrap();
        assert_eq!(sample.name, "x");
        assert_eq!(sample.nested.retry_count, 3);
    }

    #[test]
    fn every_unknown_field_is_reported() {
        let err = decode("name = \"x\"\nnmae = \"typo\"\n[nested]\nretry-cuont = 3\n").unwrap_err();
        match err {
            ConfigError::UnknownConfigField { component, fields, .. } => {
                assert_eq!(component, "cdc");
                assert_eq!(fields.len(), 2, "fields: {:?}", fields);
                assert!(fields.iter().any(|f| f.contains("nmae")));
                assert!(fields.iter().any(|f| f.contains("retry-cuont")));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn unknown_field_error_names_the_file() {
        let err = decode("bogus = 1\n").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("sample.toml"), "{}", message);
        assert!(message.contains("bogus"), "{}", message);
    }

    #[test]
    fn syntax_error_is_malformed() {
        let err = decode("name = \n").unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = strict_decode_file::<Sample>(Path::new("/nonexistent/cdc.toml"), "cdc").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
