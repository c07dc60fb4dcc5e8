//! Scan and analysis lifecycle statuses plus scan field validation.
//!
//! Statuses are persisted as their snake_case wire strings; the strict
//! parsers back the list-endpoint status filter.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a scan name.
pub const MAX_SCAN_NAME_LEN: usize = 255;

/// Maximum length of a scan description.
pub const MAX_SCAN_DESCRIPTION_LEN: usize = 1000;

/// Maximum length of a scan location.
pub const MAX_SCAN_LOCATION_LEN: usize = 500;

// ---------------------------------------------------------------------------
// Scan status
// ---------------------------------------------------------------------------

/// Lifecycle state of a scan.
///
/// `pending` → `uploading` → `ready` while images arrive, then `analyzing`
/// and finally `completed` or `failed`. Deleting a scan's last image drops
/// it back to `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Pending,
    Uploading,
    Ready,
    Analyzing,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Uploading => "uploading",
            Self::Ready => "ready",
            Self::Analyzing => "analyzing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "uploading" => Ok(Self::Uploading),
            "ready" => Ok(Self::Ready),
            "analyzing" => Ok(Self::Analyzing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(CoreError::Validation(format!("Invalid scan status '{s}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Analysis status
// ---------------------------------------------------------------------------

/// Lifecycle state of a scan's analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(CoreError::Validation(format!(
                "Invalid analysis status '{s}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate a scan name: non-empty after trimming, at most
/// [`MAX_SCAN_NAME_LEN`] characters.
pub fn validate_scan_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Scan name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_SCAN_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Scan name exceeds {MAX_SCAN_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate an optional scan description against
/// [`MAX_SCAN_DESCRIPTION_LEN`].
pub fn validate_scan_description(description: Option<&str>) -> Result<(), CoreError> {
    if let Some(text) = description {
        if text.chars().count() > MAX_SCAN_DESCRIPTION_LEN {
            return Err(CoreError::Validation(format!(
                "Scan description exceeds {MAX_SCAN_DESCRIPTION_LEN} characters"
            )));
        }
    }
    Ok(())
}

/// Validate an optional scan location against [`MAX_SCAN_LOCATION_LEN`].
pub fn validate_scan_location(location: Option<&str>) -> Result<(), CoreError> {
    if let Some(text) = location {
        if text.chars().count() > MAX_SCAN_LOCATION_LEN {
            return Err(CoreError::Validation(format!(
                "Scan location exceeds {MAX_SCAN_LOCATION_LEN} characters"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- status round trips ------------------------------------------------

    #[test]
    fn scan_status_round_trips_all_variants() {
        for status in [
            ScanStatus::Pending,
            ScanStatus::Uploading,
            ScanStatus::Ready,
            ScanStatus::Analyzing,
            ScanStatus::Completed,
            ScanStatus::Failed,
        ] {
            assert_eq!(ScanStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn scan_status_invalid_rejected() {
        assert!(ScanStatus::from_str("archived").is_err());
    }

    #[test]
    fn analysis_status_round_trips_all_variants() {
        for status in [
            AnalysisStatus::Pending,
            AnalysisStatus::InProgress,
            AnalysisStatus::Completed,
            AnalysisStatus::Failed,
        ] {
            assert_eq!(AnalysisStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn analysis_status_invalid_rejected() {
        assert!(AnalysisStatus::from_str("running").is_err());
    }

    // -- scan field validation ---------------------------------------------

    #[test]
    fn scan_name_valid() {
        assert!(validate_scan_name("Main library entrance").is_ok());
    }

    #[test]
    fn scan_name_empty_rejected() {
        assert!(validate_scan_name("").is_err());
        assert!(validate_scan_name("   ").is_err());
    }

    #[test]
    fn scan_name_too_long_rejected() {
        let name = "x".repeat(MAX_SCAN_NAME_LEN + 1);
        assert!(validate_scan_name(&name).is_err());
    }

    #[test]
    fn scan_description_none_accepted() {
        assert!(validate_scan_description(None).is_ok());
    }

    #[test]
    fn scan_description_too_long_rejected() {
        let text = "x".repeat(MAX_SCAN_DESCRIPTION_LEN + 1);
        assert!(validate_scan_description(Some(&text)).is_err());
    }

    #[test]
    fn scan_location_too_long_rejected() {
        let text = "x".repeat(MAX_SCAN_LOCATION_LEN + 1);
        assert!(validate_scan_location(Some(&text)).is_err());
    }
}
