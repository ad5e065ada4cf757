//! WBS configuration
//!
//! [`WbsConfig`] describes the source format and which passes run. It is
//! loaded from an optional TOML file; every field has a default, so an
//! empty file is valid.

use crate::error::ConfigError;
use crate::record::DEFAULT_NESTING_MARKER;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default inclusion marker character
pub const DEFAULT_INCLUSION_MARKER: char = '!';

/// WBS configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WbsConfig {
    /// Character whose run encodes nesting depth
    pub nesting_marker: char,
    /// Prefix of an id naming an external source to splice in
    pub inclusion_marker: char,
    /// Field delimiter
    pub delimiter: char,
    /// Quote character
    pub quote: char,
    /// Level of the root node
    pub root_level: usize,
    /// Run the final-resolution pass after propagation
    pub fix: bool,
    /// Renderers to run
    pub render: RenderSelection,
}

impl WbsConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text and validate
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// With fix pass toggle
    #[inline]
    #[must_use]
    pub fn with_fix(mut self, fix: bool) -> Self {
        self.fix = fix;
        self
    }

    /// With root level
    #[inline]
    #[must_use]
    pub fn with_root_level(mut self, root_level: usize) -> Self {
        self.root_level = root_level;
        self
    }

    /// With field delimiter
    #[inline]
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Check that markers and delimiters can be told apart
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, c) in [
            ("nesting_marker", self.nesting_marker),
            ("inclusion_marker", self.inclusion_marker),
        ] {
            if c.is_whitespace() {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: "must not be whitespace".to_string(),
                });
            }
        }
        if self.nesting_marker == self.inclusion_marker {
            return Err(ConfigError::InvalidValue {
                field: "inclusion_marker",
                message: format!("must differ from nesting marker '{}'", self.nesting_marker),
            });
        }
        for (field, c) in [("delimiter", self.delimiter), ("quote", self.quote)] {
            if !c.is_ascii() {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: format!("'{c}' is not a single ASCII character"),
                });
            }
        }
        if self.delimiter == self.quote {
            return Err(ConfigError::InvalidValue {
                field: "quote",
                message: "must differ from delimiter".to_string(),
            });
        }
        Ok(())
    }

    /// Delimiter as a byte
    #[inline]
    #[must_use]
    pub fn delimiter_byte(&self) -> u8 {
        ascii_byte(self.delimiter)
    }

    /// Quote as a byte
    #[inline]
    #[must_use]
    pub fn quote_byte(&self) -> u8 {
        ascii_byte(self.quote)
    }
}

impl Default for WbsConfig {
    fn default() -> Self {
        Self {
            nesting_marker: DEFAULT_NESTING_MARKER,
            inclusion_marker: DEFAULT_INCLUSION_MARKER,
            delimiter: ',',
            quote: '"',
            root_level: 0,
            fix: false,
            render: RenderSelection::default(),
        }
    }
}

/// Which renderers run after percolation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSelection {
    /// Hierarchy diagram
    pub wbs: bool,
    /// Timeline diagram
    pub gantt: bool,
    /// Three-candidate diagnostic table
    pub outline: bool,
    /// JSON dump of the reconciled tree
    pub json: bool,
}

impl RenderSelection {
    /// Any renderer selected
    #[inline]
    #[must_use]
    pub fn any(&self) -> bool {
        self.wbs || self.gantt || self.outline || self.json
    }
}

fn ascii_byte(c: char) -> u8 {
    u8::try_from(u32::from(c)).unwrap_or(b',')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let config = WbsConfig::from_toml_str("").unwrap();
        assert_eq!(config, WbsConfig::default());
        assert_eq!(config.delimiter_byte(), b',');
        assert_eq!(config.quote_byte(), b'"');
    }

    #[test]
    fn toml_overrides() {
        let config = WbsConfig::from_toml_str(
            r#"
            delimiter = ";"
            fix = true

            [render]
            gantt = true
            "#,
        )
        .unwrap();
        assert_eq!(config.delimiter_byte(), b';');
        assert!(config.fix);
        assert!(config.render.gantt);
        assert!(!config.render.wbs);
        assert!(config.render.any());
    }

    #[test]
    fn unknown_field_rejected() {
        assert!(matches!(
            WbsConfig::from_toml_str("colour = \"red\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn markers_must_differ() {
        let err = WbsConfig::from_toml_str("inclusion_marker = \"*\"").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "inclusion_marker",
                ..
            }
        ));
    }

    #[test]
    fn non_ascii_delimiter_rejected() {
        let config = WbsConfig::new().with_delimiter('§');
        assert!(config.validate().is_err());
    }
}
