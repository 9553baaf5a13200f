//! Asset records as exchanged with the remote asset service.
//!
//! The wire format carries boolean flags as `0`/`1` integers and the
//! playback duration as either a number or a numeric string, so the
//! [`flag`] and [`duration_secs`] codecs normalise both directions.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{AssetId, Timestamp};

/// Coarse content kind derived from an asset's `mimetype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MimeKind {
    Image,
    Video,
    Webpage,
    Other,
}

impl MimeKind {
    /// Classify a mimetype string by substring, matching how the service
    /// labels assets (`image`, `video`, `webpage`, or anything else).
    pub fn from_mimetype(mimetype: &str) -> Self {
        if mimetype.contains("image") {
            Self::Image
        } else if mimetype.contains("video") {
            Self::Video
        } else if mimetype.contains("webpage") {
            Self::Webpage
        } else {
            Self::Other
        }
    }
}

/// One scheduled media entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub asset_id: AssetId,

    /// Display label. A null name on the wire is read as empty.
    #[serde(default, deserialize_with = "string_or_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Scheduling window start; `None` means never started.
    pub start_date: Option<Timestamp>,

    /// Scheduling window end; `None` means never ending.
    pub end_date: Option<Timestamp>,

    /// Playback length in whole seconds.
    #[serde(default, with = "duration_secs")]
    pub duration: u64,

    #[serde(default, deserialize_with = "string_or_empty")]
    pub mimetype: String,

    #[serde(with = "flag")]
    pub is_enabled: bool,

    /// Asset is mid-ingestion; its enablement control must stay disabled.
    #[serde(default, with = "flag")]
    pub is_processing: bool,

    #[serde(default, with = "flag")]
    pub nocache: bool,

    #[serde(default, with = "flag")]
    pub skip_asset_check: bool,

    /// Rank among enabled assets. Meaningless (usually null) when disabled.
    pub play_order: Option<i64>,
}

impl Asset {
    pub fn kind(&self) -> MimeKind {
        MimeKind::from_mimetype(&self.mimetype)
    }
}

/// Request body for creating an asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAsset {
    pub name: String,
    pub uri: String,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    #[serde(with = "duration_secs")]
    pub duration: u64,
    pub mimetype: String,
    #[serde(with = "flag")]
    pub is_enabled: bool,
    #[serde(with = "flag")]
    pub nocache: bool,
    #[serde(with = "flag")]
    pub skip_asset_check: bool,
}

/// Enablement state echoed by the service after a toggle.
///
/// The service may answer with the full asset record; only these two
/// fields are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledState {
    #[serde(with = "flag")]
    pub is_enabled: bool,
    #[serde(default)]
    pub play_order: Option<i64>,
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// `0`/`1` integer codec for boolean flags. Accepts JSON booleans on input.
pub mod flag {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
    }

    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Bool(value) => Ok(value),
            Raw::Int(0) => Ok(false),
            Raw::Int(1) => Ok(true),
            Raw::Int(other) => Err(D::Error::custom(format!(
                "flag must be 0 or 1, got {other}"
            ))),
        }
    }
}

/// Whole-second duration codec. Accepts a number, a numeric string, or
/// null (read as zero).
pub mod duration_secs {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Float(f64),
        Text(String),
    }

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(*value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(0),
            Some(Raw::Int(secs)) => Ok(secs),
            Some(Raw::Float(secs)) if secs >= 0.0 && secs.fract() == 0.0 => Ok(secs as u64),
            Some(Raw::Float(secs)) => Err(D::Error::custom(format!(
                "duration must be a non-negative whole number, got {secs}"
            ))),
            Some(Raw::Text(text)) if text.trim().is_empty() => Ok(0),
            Some(Raw::Text(text)) => text
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid duration '{text}'"))),
        }
    }
}
