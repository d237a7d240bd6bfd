//! Photo records and the paged photo responses returned per bucket.

use crate::error::{GalleryError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single photo as reported by the server.
///
/// The client never reorders or deduplicates photos; server order is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub uuid: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl Photo {
    pub fn new(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            date: None,
        }
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Path of the thumbnail image, relative to the API root.
    pub fn thumbnail_path(&self) -> String {
        format!("thumbnail/{}.jpg", self.uuid)
    }

    /// Path of the full resolution image, relative to the API root.
    pub fn full_image_path(&self) -> String {
        format!("full/{}.jpg", self.uuid)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of photos for a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoPage {
    pub photos: Vec<Photo>,
    /// Total reported alongside the page, when the server sends one.
    pub total_count: Option<u64>,
    /// Cursor to pass as `after` to fetch the following page.
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

impl PhotoPage {
    /// A terminal page holding exactly `photos`.
    pub fn last(photos: Vec<Photo>) -> Self {
        Self {
            photos,
            ..Self::default()
        }
    }

    /// Decodes a per-bucket response body.
    ///
    /// Accepts either a bare array of photo records or the connection shape
    /// `{ photosConnection: { totalCount, edges: [{ node, cursor }], pageInfo } }`.
    /// `null` decodes to an empty terminal page.
    pub fn from_value(path: &str, value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }

        let wire: PhotosWire =
            serde_json::from_value(value).map_err(|e| GalleryError::decode(path, e.to_string()))?;

        Ok(match wire {
            PhotosWire::List(photos) => Self::last(photos),
            PhotosWire::Connection { photos_connection } => {
                let page_info = photos_connection.page_info.unwrap_or_default();
                let last_edge_cursor = photos_connection
                    .edges
                    .last()
                    .and_then(|edge| edge.cursor.clone());
                Self {
                    photos: photos_connection
                        .edges
                        .into_iter()
                        .map(|edge| edge.node)
                        .collect(),
                    total_count: photos_connection.total_count,
                    end_cursor: page_info.end_cursor.or(last_edge_cursor),
                    has_next_page: page_info.has_next_page,
                }
            }
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PhotosWire {
    Connection {
        #[serde(rename = "photosConnection")]
        photos_connection: ConnectionWire,
    },
    List(Vec<Photo>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionWire {
    #[serde(default)]
    total_count: Option<u64>,
    #[serde(default)]
    edges: Vec<EdgeWire>,
    #[serde(default)]
    page_info: Option<PageInfoWire>,
}

#[derive(Deserialize)]
struct EdgeWire {
    node: Photo,
    #[serde(default)]
    cursor: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PageInfoWire {
    #[serde(default)]
    end_cursor: Option<String>,
    #[serde(default)]
    has_next_page: bool,
}
