use crate::error::{GalleryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Validated `"<year>-<month>"` key of a month bucket.
///
/// The month is 1-12 and written without padding, so `Display` always yields
/// the same string the id was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BucketId {
    year: i32,
    month: u32,
}

impl BucketId {
    /// Builds an id from its parts, rejecting months outside 1-12.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(GalleryError::invalid_bucket_id(
                format!("{}-{}", year, month),
                "month must be between 1 and 12",
            ));
        }
        if year < 0 {
            return Err(GalleryError::invalid_bucket_id(
                format!("{}-{}", year, month),
                "year must not be negative",
            ));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// English month name, e.g. "June".
    pub fn month_name(&self) -> &'static str {
        // month is validated to 1..=12 at construction
        u8::try_from(self.month)
            .ok()
            .and_then(|m| chrono::Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("")
    }
}

fn parse_component<T: FromStr>(raw: &str, id: &str, what: &str) -> Result<T> {
    let canonical = !raw.is_empty()
        && raw.bytes().all(|b| b.is_ascii_digit())
        && !(raw.len() > 1 && raw.starts_with('0'));
    if !canonical {
        return Err(GalleryError::invalid_bucket_id(
            id,
            format!("{} '{}' is not an unpadded number", what, raw),
        ));
    }
    raw.parse::<T>()
        .map_err(|_| GalleryError::invalid_bucket_id(id, format!("{} '{}' is out of range", what, raw)))
}

impl FromStr for BucketId {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| GalleryError::invalid_bucket_id(s, "expected '<year>-<month>'"))?;
        let year: i32 = parse_component(year, s, "year")?;
        let month: u32 = parse_component(month, s, "month")?;
        Self::new(year, month).map_err(|_| GalleryError::invalid_bucket_id(s, "month must be between 1 and 12"))
    }
}

impl TryFrom<String> for BucketId {
    type Error = GalleryError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<BucketId> for String {
    fn from(id: BucketId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for BucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_ids() {
        let id: BucketId = "2023-6".parse().unwrap();
        assert_eq!(id.year(), 2023);
        assert_eq!(id.month(), 6);
        assert_eq!(id.to_string(), "2023-6");

        let december: BucketId = "1999-12".parse().unwrap();
        assert_eq!(december.month_name(), "December");
    }

    #[test]
    fn test_parse_rejects_malformed_ids() {
        for raw in ["", "2023", "2023-", "-6", "2023-13", "2023-0", "2023-06", "abcd-1", "2023-6-1", "2023 - 6"] {
            let err = raw.parse::<BucketId>().unwrap_err();
            assert!(err.is_invalid_bucket_id(), "expected rejection for {:?}", raw);
        }
    }

    #[test]
    fn test_new_validates_month() {
        assert!(BucketId::new(2020, 0).is_err());
        assert!(BucketId::new(2020, 13).is_err());
        assert_eq!(BucketId::new(2020, 1).unwrap().to_string(), "2020-1");
    }

    #[test]
    fn test_serde_as_string() {
        let id = BucketId::new(2021, 3).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"2021-3\"");

        let back: BucketId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<BucketId>("\"2021-x\"").is_err());
    }
}
