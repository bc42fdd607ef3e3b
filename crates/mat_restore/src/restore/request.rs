//! Restore requests

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::ShaderSelection;
use crate::description::MaterialDescription;

/// Request validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RequestError {
    /// Custom shader selected without a name
    #[error("Custom shader name is empty")]
    EmptyShaderName,

    /// No output folder given
    #[error("Output folder is empty")]
    EmptyOutputFolder,
}

/// One material to restore
///
/// Built once from user input and not changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreRequest {
    /// JSON dump to read
    pub input: PathBuf,
    /// Target shader choice
    pub shader: ShaderSelection,
    /// Folder the `.mat` file is written to
    pub output_folder: PathBuf,
}

impl RestoreRequest {
    /// Create a request
    pub fn new(input: impl Into<PathBuf>, shader: ShaderSelection, output_folder: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            shader,
            output_folder: output_folder.into(),
        }
    }

    /// Reject requests that cannot be run
    pub fn validate(&self) -> Result<(), RequestError> {
        if let ShaderSelection::Custom(name) = &self.shader {
            if name.trim().is_empty() {
                return Err(RequestError::EmptyShaderName);
            }
        }
        if self.output_folder.as_os_str().is_empty() {
            return Err(RequestError::EmptyOutputFolder);
        }
        Ok(())
    }

    /// Name for the restored material
    ///
    /// The dump's `m_Name`, or the input file stem when it has none.
    pub fn material_name(&self, description: &MaterialDescription) -> String {
        description.name.clone().unwrap_or_else(|| input_stem(&self.input))
    }

    /// Path of the `.mat` file for a material called `name`
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_folder.join(format!("{}.mat", sanitize_file_name(name)))
    }
}

fn input_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "Material".to_string())
}

/// Replace characters that are not allowed in file names
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim().trim_end_matches('.');
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        "Material".to_string()
    } else {
        trimmed.to_string()
    }
}
