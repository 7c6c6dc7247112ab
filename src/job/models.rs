//! Wire models for the processing endpoint.
//!
//! The request is a flat JSON object:
//!
//! ```json
//! {
//!   "input_bucket": "physicscalc",
//!   "input_key": "input/well42.las",
//!   "output_bucket": "physicscalc",
//!   "plots_key": "output_pdf/well42.pdf",
//!   "data_key": "output_xlxs/well42.xlxs",
//!   "bulk_density_column_name": "RHOB",
//!   "neutron_porosity_column_name": "NPHI",
//!   "deep_resistivity_column_name": "ILD",
//!   "porosity_column_name": "PHI",
//!   "water_saturation_column_name": "SW",
//!   "density_log_porosity_column_name": "DPHI",
//!   "permeability_column_name": "K",
//!   "constant_matrix_density": 2.65,
//!   "constant_fluid_density": 1.0,
//!   "constant_water_resistivity": 0.05,
//!   "constant_tortuosity": 1.0,
//!   "constant_saturation_exponent": 2.0,
//!   "constant_cementation_exponent": 1.0
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ColumnConfig;
use crate::storage::ArtifactKeys;
use crate::validation::ParsedConstants;

/// Curve mnemonics the service should read from the log file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    #[serde(rename = "bulk_density_column_name")]
    pub bulk_density: String,
    #[serde(rename = "neutron_porosity_column_name")]
    pub neutron_porosity: String,
    #[serde(rename = "deep_resistivity_column_name")]
    pub deep_resistivity: String,
    #[serde(rename = "porosity_column_name")]
    pub porosity: String,
    #[serde(rename = "water_saturation_column_name")]
    pub water_saturation: String,
    #[serde(rename = "density_log_porosity_column_name")]
    pub density_log_porosity: String,
    #[serde(rename = "permeability_column_name")]
    pub permeability: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self::from(&ColumnConfig::default())
    }
}

impl From<&ColumnConfig> for ColumnNames {
    fn from(config: &ColumnConfig) -> Self {
        Self {
            bulk_density: config.bulk_density.clone(),
            neutron_porosity: config.neutron_porosity.clone(),
            deep_resistivity: config.deep_resistivity.clone(),
            porosity: config.porosity.clone(),
            water_saturation: config.water_saturation.clone(),
            density_log_porosity: config.density_log_porosity.clone(),
            permeability: config.permeability.clone(),
        }
    }
}

/// Immutable snapshot sent to the processing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    pub input_bucket: String,
    pub input_key: String,
    pub output_bucket: String,
    pub plots_key: String,
    pub data_key: String,
    #[serde(flatten)]
    pub columns: ColumnNames,
    #[serde(flatten)]
    pub constants: ParsedConstants,
}

impl JobRequest {
    pub fn new(keys: &ArtifactKeys, columns: ColumnNames, constants: ParsedConstants) -> Self {
        Self {
            input_bucket: keys.input.bucket.clone(),
            input_key: keys.input.key.clone(),
            output_bucket: keys.plots.bucket.clone(),
            plots_key: keys.plots.key.clone(),
            data_key: keys.data.key.clone(),
            columns,
            constants,
        }
    }
}

/// Opaque success payload, kept as received
#[derive(Debug, Clone, PartialEq)]
pub struct JobResult {
    pub payload: Value,
    pub received_at: DateTime<Utc>,
}

impl JobResult {
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            received_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::humanize::ByteSize;
    use crate::validation::{
        CandidateFile, ConstantField, ConstantsConfig, parse_constants, validate_file,
    };
    use serde_json::json;

    fn well42_request() -> JobRequest {
        let file = validate_file(CandidateFile::new("well42.las", "~A"), ByteSize(1024)).unwrap();
        let keys = ArtifactKeys::for_file("physicscalc", &file);

        let mut constants = ConstantsConfig::default();
        constants.set(ConstantField::MatrixDensity, "2.65");
        constants.set(ConstantField::FluidDensity, "1.0");
        constants.set(ConstantField::WaterResistivity, "0.05");

        JobRequest::new(&keys, ColumnNames::default(), parse_constants(&constants))
    }

    #[test]
    fn request_serializes_to_flat_schema() {
        let value = serde_json::to_value(well42_request()).unwrap();

        assert_eq!(
            value,
            json!({
                "input_bucket": "physicscalc",
                "input_key": "input/well42.las",
                "output_bucket": "physicscalc",
                "plots_key": "output_pdf/well42.pdf",
                "data_key": "output_xlxs/well42.xlxs",
                "bulk_density_column_name": "RHOB",
                "neutron_porosity_column_name": "NPHI",
                "deep_resistivity_column_name": "ILD",
                "porosity_column_name": "PHI",
                "water_saturation_column_name": "SW",
                "density_log_porosity_column_name": "DPHI",
                "permeability_column_name": "K",
                "constant_matrix_density": 2.65,
                "constant_fluid_density": 1.0,
                "constant_water_resistivity": 0.05,
                "constant_tortuosity": 1.0,
                "constant_saturation_exponent": 2.0,
                "constant_cementation_exponent": 1.0
            })
        );
    }

    #[test]
    fn constants_are_numbers_not_strings() {
        let value = serde_json::to_value(well42_request()).unwrap();
        assert!(value["constant_matrix_density"].is_f64());
        assert_eq!(value["constant_matrix_density"].as_f64(), Some(2.65));
    }

    #[test]
    fn nan_constant_serializes_as_null() {
        let mut request = well42_request();
        request.constants.fluid_density = f64::NAN;

        let value = serde_json::to_value(&request).unwrap();
        assert!(value["constant_fluid_density"].is_null());
    }
}
