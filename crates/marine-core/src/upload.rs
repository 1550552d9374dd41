//! File payloads for multipart uploads
//!
//! Every upload-driven feature sends exactly one file under the `file` form
//! field. The pre-flight check here only warns; the backend stays the
//! authority on whether a file is acceptable.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::{Error, Result};

/// Multipart form field the backend reads the upload from
pub const FILE_FIELD: &str = "file";

/// A file selected for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl FilePayload {
    /// Build a payload, guessing the MIME type from the extension
    pub fn new(file_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            mime: mime_for(file_name).to_string(),
            bytes,
        }
    }

    /// Read a payload from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::InvalidRequest(format!("not a file path: {}", path.display()))
            })?;
        Ok(Self::new(file_name, bytes))
    }

    /// Lowercased extension without the dot
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }

    /// SHA-256 of the contents
    pub fn digest(&self) -> [u8; 32] {
        Sha256::digest(&self.bytes).into()
    }

    /// Short hex fingerprint for logs and display
    pub fn fingerprint(&self) -> String {
        hex::encode(&self.digest()[..6])
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("csv") => "text/csv",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("fasta") | Some("fa") | Some("fastq") | Some("fq") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// What an upload is for; decides accepted extensions and CSV columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    FishImage,
    OverfishingCsv,
    ChlorophyllCsv,
    SstCsv,
    EdnaSequence,
}

impl UploadKind {
    pub fn accepted_extensions(&self) -> &'static [&'static str] {
        match self {
            Self::FishImage => &["jpg", "jpeg", "png", "webp"],
            Self::OverfishingCsv | Self::ChlorophyllCsv | Self::SstCsv => &["csv"],
            Self::EdnaSequence => &["fasta", "fastq", "fa", "fq"],
        }
    }

    /// Columns the backend requires (matched case-insensitively, trimmed)
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            Self::OverfishingCsv => &["date", "stock_volume", "catch_volume"],
            Self::ChlorophyllCsv => &["depth", "salinity", "ph"],
            Self::SstCsv => &["date", "value"],
            Self::FishImage | Self::EdnaSequence => &[],
        }
    }
}

/// Result of the local pre-flight check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadCheck {
    pub extension_ok: bool,
    pub missing_columns: Vec<String>,
    /// Data rows (CSV only)
    pub rows: Option<usize>,
}

impl UploadCheck {
    pub fn is_clean(&self) -> bool {
        self.extension_ok && self.missing_columns.is_empty()
    }

    /// Human-readable warnings
    pub fn warnings(&self, kind: UploadKind) -> Vec<String> {
        let mut out = Vec::new();
        if !self.extension_ok {
            out.push(format!(
                "expected one of: {}",
                kind.accepted_extensions()
                    .iter()
                    .map(|e| format!(".{}", e))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
        if !self.missing_columns.is_empty() {
            out.push(format!(
                "missing columns: {}",
                self.missing_columns.join(", ")
            ));
        }
        out
    }
}

/// Inspect a payload before sending it
pub fn check_upload(kind: UploadKind, payload: &FilePayload) -> Result<UploadCheck> {
    let extension_ok = payload
        .extension()
        .map(|ext| kind.accepted_extensions().contains(&ext.as_str()))
        .unwrap_or(false);

    let required = kind.required_columns();
    if required.is_empty() {
        return Ok(UploadCheck {
            extension_ok,
            ..Default::default()
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(payload.bytes.as_slice());
    let headers: HashSet<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();
    let missing_columns = required
        .iter()
        .filter(|col| !headers.contains(**col))
        .map(|col| col.to_string())
        .collect();
    let rows = reader.records().filter(|r| r.is_ok()).count();

    Ok(UploadCheck {
        extension_ok,
        missing_columns,
        rows: Some(rows),
    })
}

/// Run the pre-flight check and log its warnings
pub(crate) fn warn_on_suspect_upload(kind: UploadKind, payload: &FilePayload) {
    match check_upload(kind, payload) {
        Ok(check) => {
            for warning in check.warnings(kind) {
                warn!(file = %payload.file_name, "{}", warning);
            }
        }
        Err(e) => warn!(file = %payload.file_name, "Could not inspect upload: {}", e),
    }
}
