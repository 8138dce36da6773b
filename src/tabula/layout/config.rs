use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::tabula::layout::error::{LayoutError, Result};

/// Free-form parameters handed to a component factory.
pub type ComponentParams = BTreeMap<String, serde_yaml::Value>;

/// A pipeline component, given either by name alone or by name plus
/// parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentSpec {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        params: ComponentParams,
    },
}

impl ComponentSpec {
    pub fn name(&self) -> &str {
        match self {
            ComponentSpec::Name(name) | ComponentSpec::Detailed { name, .. } => name,
        }
    }

    /// Parameters of the component; empty when given by name only.
    pub fn params(&self) -> ComponentParams {
        match self {
            ComponentSpec::Name(_) => ComponentParams::new(),
            ComponentSpec::Detailed { params, .. } => params.clone(),
        }
    }
}

/// Pipeline configuration as loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub cell_classifier: ComponentSpec,
    pub block_extractor: ComponentSpec,
    pub layout_detector: ComponentSpec,
    /// Requests block colorizing of the input workbook.
    #[serde(default)]
    pub colorize: bool,
    /// Requests dataframe extraction per sheet.
    #[serde(default)]
    pub output_dataframe: bool,
}

impl PipelineConfig {
    /// Loads the configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LayoutError::MissingInput(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }

    pub fn from_yaml_str(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }
}

/// Loads the list of input files: a YAML sequence of paths.
pub fn load_file_list(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        return Err(LayoutError::MissingInput(path.to_path_buf()));
    }
    let source = fs::read_to_string(path)?;
    let files: Option<Vec<PathBuf>> = serde_yaml::from_str(&source)?;
    Ok(files.unwrap_or_default())
}
