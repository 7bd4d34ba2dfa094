//! CSV loading and saving

use crate::error::{CreditError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Loads tabular input from disk
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Rows scanned to infer column types
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            infer_schema_length: 1000,
        }
    }

    /// Load a headered CSV file.
    ///
    /// A missing file is reported as [`CreditError::InputNotFound`] before anything is read.
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CreditError::InputNotFound(path.to_path_buf()));
        }

        let start = Instant::now();
        let file = File::open(path).map_err(|e| CreditError::DataError(e.to_string()))?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| CreditError::DataError(format!("{}: {e}", path.display())))?;

        tracing::info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "loaded CSV"
        );
        Ok(df)
    }

    /// Load a CSV file along with its size and shape
    pub fn load_with_info(&self, path: impl AsRef<Path>) -> Result<(DataFrame, FileInfo)> {
        let path = path.as_ref();
        let df = self.load_csv(path)?;
        let info = FileInfo::from_frame(path, &df)?;
        Ok((df, info))
    }
}

/// File information
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: PathBuf,
    pub file_size: u64,
    pub n_rows: usize,
    pub n_cols: usize,
    pub columns: Vec<String>,
}

impl FileInfo {
    /// Describe an already loaded frame; only the file size is read from disk
    pub fn from_frame(path: impl AsRef<Path>, df: &DataFrame) -> Result<Self> {
        let path = path.as_ref();
        Ok(Self {
            path: path.to_path_buf(),
            file_size: std::fs::metadata(path)?.len(),
            n_rows: df.height(),
            n_cols: df.width(),
            columns: df.get_column_names().into_iter().map(|s| s.to_string()).collect(),
        })
    }
}

/// Writes frames back out
pub struct DataSaver;

impl DataSaver {
    /// Save to CSV, creating missing parent directories
    pub fn save_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = File::create(path)?;
        CsvWriter::new(&mut file)
            .finish(df)
            .map_err(|e| CreditError::DataError(e.to_string()))?;

        tracing::debug!(path = %path.display(), rows = df.height(), "saved CSV");
        Ok(())
    }
}

/// Render a frame as CSV bytes with a header row
pub fn frame_to_csv_bytes(df: &mut DataFrame) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .finish(df)
        .map_err(|e| CreditError::DataError(e.to_string()))?;
    Ok(buf)
}
