use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use chrono::NaiveDate;
use garden_planner_core::{BedId, CellAssignment, PlantId};
use serde::{Deserialize, Serialize};

const TOKEN_DOMAIN: &str = "preview";
const TOKEN_VERSION: &str = "v1";

/// Identifier prefix emitted before the bed and encoded payload.
pub(crate) const TOKEN_HEADER: &str = "preview:v1";
/// Delimiter separating the prefix, bed and payload.
const FIELD_DELIMITER: char = ':';

/// Cells chosen by a placement preview, carried to a later commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PreviewToken {
    /// Bed that was searched.
    pub bed: BedId,
    /// Plant being placed.
    pub plant: PlantId,
    /// Planting date the preview was computed for.
    pub planted: NaiveDate,
    /// Previewed cells with their plant counts.
    pub cells: Vec<CellAssignment>,
}

impl PreviewToken {
    /// Encodes the token into a single line suitable for pasting into `commit`.
    pub(crate) fn encode(&self) -> Result<String, PreviewTransferError> {
        let payload = SerializablePreview {
            plant: self.plant,
            planted: self.planted,
            cells: self.cells.clone(),
        };
        let json = serde_json::to_vec(&payload).map_err(PreviewTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!("{TOKEN_HEADER}:{}:{encoded}", self.bed))
    }

    /// Decodes a token from its string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, PreviewTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PreviewTransferError::EmptyToken);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(PreviewTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(PreviewTransferError::MissingVersion)?;
        let bed = parts.next().ok_or(PreviewTransferError::MissingBed)?;
        let payload = parts.next().ok_or(PreviewTransferError::MissingPayload)?;

        if domain != TOKEN_DOMAIN {
            return Err(PreviewTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != TOKEN_VERSION {
            return Err(PreviewTransferError::UnsupportedVersion(version.to_owned()));
        }

        let bed = bed
            .trim()
            .parse::<u32>()
            .map(BedId::new)
            .map_err(|_| PreviewTransferError::InvalidBed(bed.to_owned()))?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(PreviewTransferError::InvalidEncoding)?;
        let decoded: SerializablePreview =
            serde_json::from_slice(&bytes).map_err(PreviewTransferError::InvalidPayload)?;

        Ok(Self {
            bed,
            plant: decoded.plant,
            planted: decoded.planted,
            cells: decoded.cells,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializablePreview {
    plant: PlantId,
    planted: NaiveDate,
    cells: Vec<CellAssignment>,
}

/// Errors that can occur while encoding or decoding preview tokens.
#[derive(Debug)]
pub(crate) enum PreviewTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyToken,
    /// The prefix segment was missing.
    MissingPrefix,
    /// The token did not contain a version segment.
    MissingVersion,
    /// The token did not name a bed.
    MissingBed,
    /// The token did not include the payload segment.
    MissingPayload,
    /// The token used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The token used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The bed segment was not a numeric identifier.
    InvalidBed(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for PreviewTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyToken => write!(f, "preview token was empty"),
            Self::MissingPrefix => write!(f, "preview token is missing the prefix"),
            Self::MissingVersion => write!(f, "preview token is missing the version"),
            Self::MissingBed => write!(f, "preview token is missing the bed"),
            Self::MissingPayload => write!(f, "preview token is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "token prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "token version '{version}' is not supported")
            }
            Self::InvalidBed(bed) => write!(f, "could not parse bed identifier '{bed}'"),
            Self::InvalidEncoding(error) => write!(f, "could not decode token payload: {error}"),
            Self::InvalidPayload(error) => write!(f, "could not parse token payload: {error}"),
        }
    }
}

impl Error for PreviewTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garden_planner_core::CellCoord;

    fn token() -> PreviewToken {
        PreviewToken {
            bed: BedId::new(3),
            plant: PlantId::new(7),
            planted: NaiveDate::from_ymd_opt(2026, 4, 1).expect("valid date"),
            cells: vec![
                CellAssignment {
                    cell: CellCoord::new(0, 0),
                    quantity: 16,
                },
                CellAssignment {
                    cell: CellCoord::new(1, 0),
                    quantity: 4,
                },
            ],
        }
    }

    #[test]
    fn token_carries_the_previewed_cells() {
        let token = token();
        let encoded = token.encode().expect("token encodes");
        assert!(encoded.starts_with(&format!("{TOKEN_HEADER}:3:")));

        let decoded = PreviewToken::decode(&format!("  {encoded}\n")).expect("token decodes");
        assert_eq!(decoded, token);
    }

    #[test]
    fn foreign_prefix_is_rejected() {
        let encoded = token().encode().expect("token encodes");
        let foreign = encoded.replacen("preview", "maze", 1);
        assert!(matches!(
            PreviewToken::decode(&foreign),
            Err(PreviewTransferError::InvalidPrefix(prefix)) if prefix == "maze"
        ));
    }

    #[test]
    fn truncated_token_is_rejected() {
        assert!(matches!(
            PreviewToken::decode("preview:v1:3"),
            Err(PreviewTransferError::MissingPayload)
        ));
        assert!(matches!(
            PreviewToken::decode("   "),
            Err(PreviewTransferError::EmptyToken)
        ));
        assert!(matches!(
            PreviewToken::decode("preview:v1:north:abc"),
            Err(PreviewTransferError::InvalidBed(_))
        ));
    }
}
