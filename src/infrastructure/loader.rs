//! Tree descriptor files (TOML or JSON in, JSON out)

use std::path::Path;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::NodeInput;
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::traits::FileSystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormat {
    Toml,
    Json,
}

impl DescriptorFormat {
    /// Format by file extension (`.toml` or `.json`).
    pub fn from_path(path: &Path) -> InfraResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            other => Err(InfraError::Parse {
                path: path.to_path_buf(),
                message: format!("unsupported extension: {:?}", other.unwrap_or("")),
            }),
        }
    }
}

/// Reads tree descriptors and writes serialized trees.
pub struct TreeLoader<F: FileSystem> {
    fs: F,
}

impl<F: FileSystem> TreeLoader<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> InfraResult<NodeInput> {
        let format = DescriptorFormat::from_path(path)?;
        let content = self
            .fs
            .read_to_string(path)
            .map_err(|e| InfraError::io(format!("read {}", path.display()), e))?;
        let input = parse(&content, format).map_err(|message| InfraError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        debug!("Loaded tree {} from {}", input.id, path.display());
        Ok(input)
    }

    /// Write `value` (a snapshot or node view) as pretty JSON.
    #[instrument(level = "debug", skip(self, value))]
    pub fn save_json<T: Serialize>(&self, path: &Path, value: &T) -> InfraResult<()> {
        let content = to_json(value)?;
        self.fs
            .write(path, &content)
            .map_err(|e| InfraError::io(format!("write {}", path.display()), e))
    }
}

pub fn parse(content: &str, format: DescriptorFormat) -> Result<NodeInput, String> {
    match format {
        DescriptorFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        DescriptorFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
    }
}

pub fn to_json<T: Serialize>(value: &T) -> InfraResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| InfraError::Parse {
        path: "<output>".into(),
        message: e.to_string(),
    })
}
