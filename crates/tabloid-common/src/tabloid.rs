//! Tabloid domain types and draft validation.

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TabloidError, TabloidResult};
use crate::media::ImageFormat;

/// An inbound tabloid submission, before anything is persisted.
///
/// This is the input to the ingestion coordinator and is never stored
/// directly.
#[derive(Debug, Clone)]
pub struct TabloidDraft {
    pub name: String,
    pub region_id: i64,
    pub start_validity: NaiveDate,
    pub end_validity: NaiveDate,
    /// Raw image payload for page 0.
    pub image: Bytes,
}

impl TabloidDraft {
    /// Validate the draft's shape.
    ///
    /// Fails fast with `InvalidRequest` before any I/O happens. The image
    /// type check sniffs the payload bytes; the HTTP layer's content-type
    /// label plays no part.
    pub fn validate(&self) -> TabloidResult<()> {
        if self.name.trim().is_empty() {
            return Err(TabloidError::InvalidRequest("name is required".to_string()));
        }

        if self.region_id <= 0 {
            return Err(TabloidError::InvalidRequest(
                "region_id is required with min 1".to_string(),
            ));
        }

        if self.end_validity <= self.start_validity {
            return Err(TabloidError::InvalidRequest(
                "end_validity_date must be after start_validity_date".to_string(),
            ));
        }

        if ImageFormat::detect(&self.image).is_none() {
            return Err(TabloidError::InvalidRequest(
                "file must be a PNG or JPEG image".to_string(),
            ));
        }

        Ok(())
    }
}

/// The persisted form of a draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabloidRecord {
    pub id: i64,
    pub name: String,
    pub region_id: i64,
    pub start_validity: NaiveDate,
    pub end_validity: NaiveDate,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// A stored image location owned by a tabloid record.
///
/// Never persisted unless the object key it points at was durably written
/// first; that ordering is the core invariant of the whole workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageReference {
    pub object_key: String,
    pub tabloid_id: i64,
    /// Zero-based page order; single-image ingestion always uses 0.
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn valid_draft() -> TabloidDraft {
        TabloidDraft {
            name: "Ofertas da Semana".to_string(),
            region_id: 144,
            start_validity: NaiveDate::from_ymd_opt(2024, 4, 8).unwrap(),
            end_validity: NaiveDate::from_ymd_opt(2024, 4, 10).unwrap(),
            image: Bytes::from_static(PNG_MAGIC),
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(valid_draft().validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut draft = valid_draft();
        draft.name = "   ".to_string();
        let err = draft.validate().unwrap_err();
        assert!(matches!(err, TabloidError::InvalidRequest(_)));
    }

    #[test]
    fn test_non_positive_region_rejected() {
        let mut draft = valid_draft();
        draft.region_id = 0;
        assert!(matches!(
            draft.validate(),
            Err(TabloidError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_end_equal_to_start_rejected() {
        let mut draft = valid_draft();
        draft.end_validity = draft.start_validity;
        assert!(matches!(
            draft.validate(),
            Err(TabloidError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut draft = valid_draft();
        draft.end_validity = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        assert!(matches!(
            draft.validate(),
            Err(TabloidError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_non_image_payload_rejected() {
        let mut draft = valid_draft();
        draft.image = Bytes::from_static(b"plain text pretending to be an image");
        assert!(matches!(
            draft.validate(),
            Err(TabloidError::InvalidRequest(_))
        ));
    }
}
