//! Grid-wide defaults loaded from TOML
//!
//! ```toml
//! default_page_size = 25
//! page_size_options = [25, 50, 100]
//! export_line_ending = "crlf"
//! ```

use std::path::Path;

use backoffice_core::{GridError, Result};
use serde::{Deserialize, Serialize};

/// Record delimiter for CSV exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
        }
    }
}

/// Defaults applied to every grid that does not override them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSettings {
    /// Page size used when the pagination config does not set one
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Page sizes offered to the user
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<usize>,

    #[serde(default)]
    pub export_line_ending: LineEnding,
}

fn default_page_size() -> usize {
    10
}

fn default_page_size_options() -> Vec<usize> {
    vec![10, 25, 50, 100]
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            page_size_options: default_page_size_options(),
            export_line_ending: LineEnding::default(),
        }
    }
}

impl GridSettings {
    /// Parse settings from TOML text, missing keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: GridSettings =
            toml::from_str(text).map_err(|e| GridError::InvalidSettings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read and parse a TOML settings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "Loaded grid settings");
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.default_page_size == 0 {
            return Err(GridError::InvalidPageSize(0));
        }
        if self.page_size_options.iter().any(|&size| size == 0) {
            return Err(GridError::InvalidSettings(
                "page_size_options must not contain 0".to_string(),
            ));
        }
        Ok(())
    }
}
