//! Key layout for one log file and its artifacts.
//!
//! Key format: `input/{file_name}`, `output_pdf/{basename}.pdf` and
//! `output_xlxs/{basename}.xlxs`, all in the same bucket. Keys depend only on
//! the file name, so resubmitting a file overwrites its previous objects.

use super::StorageLocation;
use crate::validation::UploadableFile;

pub const INPUT_PREFIX: &str = "input";
pub const PLOTS_PREFIX: &str = "output_pdf";
pub const DATA_PREFIX: &str = "output_xlxs";
pub const PLOTS_EXTENSION: &str = "pdf";
/// Kept as the processing service names it
pub const DATA_EXTENSION: &str = "xlxs";

/// Input and output locations derived from one file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactKeys {
    pub input: StorageLocation,
    pub plots: StorageLocation,
    pub data: StorageLocation,
    plots_file_name: String,
    data_file_name: String,
}

impl ArtifactKeys {
    pub fn for_file(bucket: &str, file: &UploadableFile) -> Self {
        Self::from_parts(bucket, file.name(), file.basename())
    }

    /// Derive keys from a bare `.las` file name, e.g. to re-fetch artifacts
    /// of a file processed earlier.
    pub fn for_file_name(bucket: &str, file_name: &str) -> Self {
        let basename = file_name
            .strip_suffix(crate::validation::REQUIRED_EXTENSION)
            .unwrap_or(file_name);
        Self::from_parts(bucket, file_name, basename)
    }

    fn from_parts(bucket: &str, file_name: &str, basename: &str) -> Self {
        let plots_file_name = format!("{}.{}", basename, PLOTS_EXTENSION);
        let data_file_name = format!("{}.{}", basename, DATA_EXTENSION);

        Self {
            input: StorageLocation::new(bucket, format!("{}/{}", INPUT_PREFIX, file_name)),
            plots: StorageLocation::new(bucket, format!("{}/{}", PLOTS_PREFIX, plots_file_name)),
            data: StorageLocation::new(bucket, format!("{}/{}", DATA_PREFIX, data_file_name)),
            plots_file_name,
            data_file_name,
        }
    }

    /// Local file name for the plots download, `<basename>.pdf`
    pub fn plots_file_name(&self) -> &str {
        &self.plots_file_name
    }

    /// Local file name for the data download, `<basename>.xlxs`
    pub fn data_file_name(&self) -> &str {
        &self.data_file_name
    }
}
