//! Restore pipeline
//!
//! Runs one [`RestoreRequest`] from JSON dump to `.mat` asset. Requests that
//! cannot succeed are rejected before any file is touched, and a failing run
//! never leaves an output file behind.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use super::request::{RequestError, RestoreRequest};
use super::shader_select::select_shader;
use super::{PropertyRestorer, RestoreReport, SkipReason, TargetMaterial};
use crate::config::{RestoreConfig, UnmatchedPolicy};
use crate::description::{parse_description, DescriptionError};
use crate::host::{AssetHost, ShaderHandle};
use crate::writer::{MaterialWriter, WriteError};

/// Errors that abort a restore
#[derive(Error, Debug)]
pub enum RestoreError {
    /// The request was rejected before running
    #[error("Invalid request: {0}")]
    Request(#[from] RequestError),

    /// The input file could not be read
    #[error("Failed to read {path:?}: {source}")]
    Io {
        /// Input path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The input is not a material description
    #[error("Failed to parse material description: {0}")]
    Description(#[from] DescriptionError),

    /// None of the candidate shaders exist
    #[error("No shader found among {candidates:?}")]
    ShaderNotFound {
        /// Names that were tried, in order
        candidates: Vec<String>,
    },

    /// Properties were not declared by the shader and the policy rejects them
    #[error("Shader '{shader}' does not declare: {}", .names.join(", "))]
    Unmatched {
        /// Target shader
        shader: String,
        /// Rejected properties as `group.name`
        names: Vec<String>,
    },

    /// The asset could not be written
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Result of a successful restore
#[derive(Debug, Clone)]
pub struct RestoreOutcome {
    /// Path of the `.mat` file
    pub path: PathBuf,
    /// Restored material
    pub material: TargetMaterial,
    /// Applied and skipped properties
    pub report: RestoreReport,
}

/// Runs restore requests against an asset host
pub struct MaterialRestorer<'h> {
    host: &'h dyn AssetHost,
    config: RestoreConfig,
}

impl<'h> MaterialRestorer<'h> {
    /// Create a restorer
    pub fn new(host: &'h dyn AssetHost, config: RestoreConfig) -> Self {
        Self { host, config }
    }

    /// Configuration in use
    pub fn config(&self) -> &RestoreConfig {
        &self.config
    }

    /// Restore the request's input and write the `.mat` asset
    pub fn run(&self, request: &RestoreRequest) -> Result<RestoreOutcome, RestoreError> {
        request.validate()?;
        let shader = select_shader(self.host, &request.shader, &self.config)?;

        let json = fs::read_to_string(&request.input).map_err(|source| RestoreError::Io {
            path: request.input.clone(),
            source,
        })?;

        let outcome = self.restore_with(&shader, &json, request)?;
        MaterialWriter::write(&outcome.material, &outcome.path)?;

        log::info!(
            "Restored '{}' with shader '{}' to {:?}: {} applied, {} skipped",
            outcome.material.name(),
            shader.name,
            outcome.path,
            outcome.report.applied,
            outcome.report.skipped.len()
        );
        Ok(outcome)
    }

    /// Restore `json` as if it were the request's input, without writing
    pub fn restore_str(&self, json: &str, request: &RestoreRequest) -> Result<RestoreOutcome, RestoreError> {
        request.validate()?;
        let shader = select_shader(self.host, &request.shader, &self.config)?;
        self.restore_with(&shader, json, request)
    }

    fn restore_with(
        &self,
        shader: &ShaderHandle,
        json: &str,
        request: &RestoreRequest,
    ) -> Result<RestoreOutcome, RestoreError> {
        let description = parse_description(json)?;
        let name = request.material_name(&description);

        let (material, report) = PropertyRestorer::new(self.host).restore(&description, &name, shader);
        self.check_unmatched(shader, &report)?;

        Ok(RestoreOutcome {
            path: request.output_path(&name),
            material,
            report,
        })
    }

    fn check_unmatched(&self, shader: &ShaderHandle, report: &RestoreReport) -> Result<(), RestoreError> {
        match self.config.unmatched {
            UnmatchedPolicy::Ignore => {
                for skipped in &report.skipped {
                    log::debug!("Skipped {}", skipped);
                }
            }
            UnmatchedPolicy::Warn => {
                for skipped in &report.skipped {
                    log::warn!("Skipped {}", skipped);
                }
            }
            UnmatchedPolicy::Reject => {
                let names: Vec<String> = report
                    .undeclared()
                    .map(|skipped| format!("{}.{}", skipped.group, skipped.name))
                    .collect();
                if !names.is_empty() {
                    return Err(RestoreError::Unmatched {
                        shader: shader.name.clone(),
                        names,
                    });
                }
                for skipped in &report.skipped {
                    if let SkipReason::TextureNotFound(_) = skipped.reason {
                        log::warn!("Skipped {}", skipped);
                    }
                }
            }
        }
        Ok(())
    }
}
