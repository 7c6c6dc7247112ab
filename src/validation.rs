//! Input validation: log file selection and the numeric constants form

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::humanize::ByteSize;

/// Suffix every uploadable well log must carry (case-sensitive)
pub const REQUIRED_EXTENSION: &str = ".las";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Please upload a .las file.")]
    WrongExtension { file_name: String },

    #[error("Please select a file to upload.")]
    NoFileSelected,

    #[error("File '{file_name}' is {size} bytes, limit is {limit}")]
    FileTooLarge {
        file_name: String,
        size: u64,
        limit: ByteSize,
    },

    #[error("Please enter a valid number for: {}", join_labels(.fields))]
    InvalidConstants { fields: Vec<ConstantField> },

    #[error("Unknown constant '{0}'")]
    UnknownConstant(String),
}

fn join_labels(fields: &[ConstantField]) -> String {
    fields
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A file the user picked, before validation
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub contents: Bytes,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Read a file from disk, keeping only its final path component as name
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let contents = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self::new(name, contents))
    }
}

/// A validated `.las` file ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadableFile {
    name: String,
    contents: Bytes,
}

impl UploadableFile {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File name without the `.las` suffix
    pub fn basename(&self) -> &str {
        self.name
            .strip_suffix(REQUIRED_EXTENSION)
            .unwrap_or(&self.name)
    }

    pub fn contents(&self) -> &Bytes {
        &self.contents
    }

    pub fn size(&self) -> u64 {
        self.contents.len() as u64
    }
}

/// Accept `candidate` if its name ends with `.las` and it fits in `max_size`
pub fn validate_file(
    candidate: CandidateFile,
    max_size: ByteSize,
) -> Result<UploadableFile, ValidationError> {
    if !candidate.name.ends_with(REQUIRED_EXTENSION) {
        return Err(ValidationError::WrongExtension {
            file_name: candidate.name,
        });
    }

    let size = candidate.contents.len() as u64;
    if size > max_size.as_u64() {
        return Err(ValidationError::FileTooLarge {
            file_name: candidate.name,
            size,
            limit: max_size,
        });
    }

    Ok(UploadableFile {
        name: candidate.name,
        contents: candidate.contents,
    })
}

/// The six user-supplied constants, in form order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstantField {
    MatrixDensity,
    FluidDensity,
    WaterResistivity,
    Tortuosity,
    SaturationExponent,
    CementationExponent,
}

impl ConstantField {
    pub const ALL: [ConstantField; 6] = [
        ConstantField::MatrixDensity,
        ConstantField::FluidDensity,
        ConstantField::WaterResistivity,
        ConstantField::Tortuosity,
        ConstantField::SaturationExponent,
        ConstantField::CementationExponent,
    ];

    /// Form key, e.g. `matrixDensity`
    pub fn key(&self) -> &'static str {
        match self {
            ConstantField::MatrixDensity => "matrixDensity",
            ConstantField::FluidDensity => "fluidDensity",
            ConstantField::WaterResistivity => "waterResistivity",
            ConstantField::Tortuosity => "tortuosity",
            ConstantField::SaturationExponent => "saturationExponent",
            ConstantField::CementationExponent => "cementationExponent",
        }
    }

    /// Human label, e.g. `Matrix Density`
    pub fn label(&self) -> &'static str {
        match self {
            ConstantField::MatrixDensity => "Matrix Density",
            ConstantField::FluidDensity => "Fluid Density",
            ConstantField::WaterResistivity => "Water Resistivity",
            ConstantField::Tortuosity => "Tortuosity",
            ConstantField::SaturationExponent => "Saturation Exponent",
            ConstantField::CementationExponent => "Cementation Exponent",
        }
    }
}

impl fmt::Display for ConstantField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ConstantField {
    type Err = ValidationError;

    /// Accepts the form key (`matrixDensity`) or its snake/kebab spelling
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        ConstantField::ALL
            .into_iter()
            .find(|field| field.key().to_ascii_lowercase() == normalized)
            .ok_or_else(|| ValidationError::UnknownConstant(s.to_string()))
    }
}

/// Free-text values of the constants form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantsConfig {
    values: [String; 6],
}

impl Default for ConstantsConfig {
    fn default() -> Self {
        Self {
            values: [
                String::new(),
                String::new(),
                String::new(),
                "1".to_string(),
                "2".to_string(),
                "1".to_string(),
            ],
        }
    }
}

impl ConstantsConfig {
    fn index(field: ConstantField) -> usize {
        ConstantField::ALL
            .iter()
            .position(|candidate| *candidate == field)
            .unwrap_or_default()
    }

    pub fn get(&self, field: ConstantField) -> &str {
        &self.values[Self::index(field)]
    }

    pub fn set(&mut self, field: ConstantField, value: impl Into<String>) {
        self.values[Self::index(field)] = value.into();
    }

    /// Fields with their current text, in form order
    pub fn iter(&self) -> impl Iterator<Item = (ConstantField, &str)> {
        ConstantField::ALL
            .into_iter()
            .zip(self.values.iter().map(String::as_str))
    }
}

/// Constants after numeric parsing; unparseable fields hold `NaN`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParsedConstants {
    #[serde(rename = "constant_matrix_density")]
    pub matrix_density: f64,
    #[serde(rename = "constant_fluid_density")]
    pub fluid_density: f64,
    #[serde(rename = "constant_water_resistivity")]
    pub water_resistivity: f64,
    #[serde(rename = "constant_tortuosity")]
    pub tortuosity: f64,
    #[serde(rename = "constant_saturation_exponent")]
    pub saturation_exponent: f64,
    #[serde(rename = "constant_cementation_exponent")]
    pub cementation_exponent: f64,
}

impl ParsedConstants {
    pub fn get(&self, field: ConstantField) -> f64 {
        match field {
            ConstantField::MatrixDensity => self.matrix_density,
            ConstantField::FluidDensity => self.fluid_density,
            ConstantField::WaterResistivity => self.water_resistivity,
            ConstantField::Tortuosity => self.tortuosity,
            ConstantField::SaturationExponent => self.saturation_exponent,
            ConstantField::CementationExponent => self.cementation_exponent,
        }
    }

    /// Fields whose value is NaN or infinite
    pub fn invalid_fields(&self) -> Vec<ConstantField> {
        ConstantField::ALL
            .into_iter()
            .filter(|field| !self.get(*field).is_finite())
            .collect()
    }
}

fn parse_number(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Parse every field on its own; a bad field becomes `NaN` and never stops
/// the others from being parsed.
pub fn parse_constants(config: &ConstantsConfig) -> ParsedConstants {
    ParsedConstants {
        matrix_density: parse_number(config.get(ConstantField::MatrixDensity)),
        fluid_density: parse_number(config.get(ConstantField::FluidDensity)),
        water_resistivity: parse_number(config.get(ConstantField::WaterResistivity)),
        tortuosity: parse_number(config.get(ConstantField::Tortuosity)),
        saturation_exponent: parse_number(config.get(ConstantField::SaturationExponent)),
        cementation_exponent: parse_number(config.get(ConstantField::CementationExponent)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: ByteSize = ByteSize(1024);

    #[test]
    fn accepts_las_file() {
        let file = validate_file(CandidateFile::new("well42.las", "~VERSION"), LIMIT).unwrap();
        assert_eq!(file.name(), "well42.las");
        assert_eq!(file.basename(), "well42");
        assert_eq!(file.size(), 8);
    }

    #[test]
    fn rejects_other_extensions_with_fixed_message() {
        for name in ["report.txt", "well42.LAS", "well42.las.bak", "las", "well42"] {
            let err = validate_file(CandidateFile::new(name, "data"), LIMIT).unwrap_err();
            assert!(matches!(err, ValidationError::WrongExtension { .. }), "{name}");
            assert_eq!(err.to_string(), "Please upload a .las file.");
        }
    }

    #[test]
    fn rejects_oversized_file() {
        let err = validate_file(CandidateFile::new("big.las", vec![0u8; 2048]), LIMIT).unwrap_err();
        assert!(matches!(err, ValidationError::FileTooLarge { size: 2048, .. }));
    }

    #[test]
    fn basename_only_strips_the_final_suffix() {
        let file = validate_file(CandidateFile::new("field.las.las", ""), LIMIT).unwrap();
        assert_eq!(file.basename(), "field.las");
    }

    #[test]
    fn constants_defaults() {
        let config = ConstantsConfig::default();
        let values: Vec<(&str, &str)> = config.iter().map(|(f, v)| (f.key(), v)).collect();

        assert_eq!(
            values,
            vec![
                ("matrixDensity", ""),
                ("fluidDensity", ""),
                ("waterResistivity", ""),
                ("tortuosity", "1"),
                ("saturationExponent", "2"),
                ("cementationExponent", "1"),
            ]
        );
    }

    #[test]
    fn parse_constants_is_per_field() {
        let mut config = ConstantsConfig::default();
        config.set(ConstantField::MatrixDensity, "2.65");
        config.set(ConstantField::FluidDensity, "abc");
        config.set(ConstantField::WaterResistivity, " 0.05 ");

        let parsed = parse_constants(&config);
        assert_eq!(parsed.matrix_density, 2.65);
        assert!(parsed.fluid_density.is_nan());
        assert_eq!(parsed.water_resistivity, 0.05);
        assert_eq!(parsed.tortuosity, 1.0);
        assert_eq!(parsed.saturation_exponent, 2.0);
        assert_eq!(parsed.cementation_exponent, 1.0);
        assert_eq!(parsed.invalid_fields(), vec![ConstantField::FluidDensity]);
    }

    #[test]
    fn empty_and_infinite_constants_are_invalid() {
        let mut config = ConstantsConfig::default();
        config.set(ConstantField::FluidDensity, "1.0");
        config.set(ConstantField::WaterResistivity, "inf");

        let parsed = parse_constants(&config);
        assert_eq!(
            parsed.invalid_fields(),
            vec![ConstantField::MatrixDensity, ConstantField::WaterResistivity]
        );

        let err = ValidationError::InvalidConstants {
            fields: parsed.invalid_fields(),
        };
        assert_eq!(
            err.to_string(),
            "Please enter a valid number for: Matrix Density, Water Resistivity"
        );
    }

    #[test]
    fn constant_field_from_str() {
        assert_eq!("matrixDensity".parse::<ConstantField>().unwrap(), ConstantField::MatrixDensity);
        assert_eq!("water_resistivity".parse::<ConstantField>().unwrap(), ConstantField::WaterResistivity);
        assert_eq!("saturation-exponent".parse::<ConstantField>().unwrap(), ConstantField::SaturationExponent);
        assert!("porosity".parse::<ConstantField>().is_err());
    }
}
