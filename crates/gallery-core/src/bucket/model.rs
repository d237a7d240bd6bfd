use super::id::BucketId;
use crate::error::Result;
use crate::photo::{Photo, PhotoPage};
use serde::{Deserialize, Serialize};

/// One entry of the outline: a month with the number of photos it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketDescriptor {
    pub year: i32,
    pub month: u32,
    pub total_count: u64,
}

impl BucketDescriptor {
    pub fn new(year: i32, month: u32, total_count: u64) -> Self {
        Self {
            year,
            month,
            total_count,
        }
    }

    /// Validated id of the bucket this descriptor describes.
    pub fn id(&self) -> Result<BucketId> {
        BucketId::new(self.year, self.month)
    }
}

/// A calendar month's photo group and its incremental fill state.
///
/// Photos only ever accumulate: pages are concatenated in the order they are
/// committed and nothing is removed, sorted or deduplicated locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketModel {
    id: BucketId,
    total_count: u64,
    photos: Vec<Photo>,
    next_cursor: Option<String>,
    has_more: bool,
}

impl BucketModel {
    /// Parses `id` (`"<year>-<month>"`) and builds an empty bucket.
    pub fn new(id: &str, total_count: u64) -> Result<Self> {
        Ok(Self::with_id(id.parse()?, total_count))
    }

    pub fn with_id(id: BucketId, total_count: u64) -> Self {
        Self {
            id,
            total_count,
            photos: Vec::new(),
            next_cursor: None,
            has_more: total_count > 0,
        }
    }

    pub fn from_descriptor(descriptor: &BucketDescriptor) -> Result<Self> {
        Ok(Self::with_id(descriptor.id()?, descriptor.total_count))
    }

    pub fn id(&self) -> BucketId {
        self.id
    }

    pub fn year(&self) -> i32 {
        self.id.year()
    }

    pub fn month(&self) -> u32 {
        self.id.month()
    }

    /// Number of photos the server reports for this month.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    /// Key used for year-level section headers.
    pub fn grouping(&self) -> i32 {
        self.id.year()
    }

    /// Display heading, e.g. `"2023 June"`.
    pub fn heading(&self) -> String {
        format!("{} {}", self.id.year(), self.id.month_name())
    }

    /// Concatenates `photos` after the photos already loaded.
    pub fn append_photos(&mut self, photos: impl IntoIterator<Item = Photo>) -> &[Photo] {
        self.photos.extend(photos);
        if self.photos.len() as u64 > self.total_count {
            tracing::debug!(
                "[Bucket] {} holds {} photos, server reported {}",
                self.id,
                self.photos.len(),
                self.total_count
            );
        }
        &self.photos
    }

    /// Appends a fetched page and remembers where the next one starts.
    pub fn apply_page(&mut self, page: PhotoPage) {
        self.append_photos(page.photos);
        if page.has_next_page && page.end_cursor.is_none() {
            tracing::warn!(
                "[Bucket] {} page reports more photos but no cursor, treating it as the last",
                self.id
            );
        }
        self.has_more = page.has_next_page && page.end_cursor.is_some();
        self.next_cursor = page.end_cursor;
    }

    /// Cursor to send as `after` for the next page, if a page was loaded.
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    /// True once the server said there are no more pages, or the reported
    /// total has been reached.
    pub fn is_fully_loaded(&self) -> bool {
        !self.has_more || self.photos.len() as u64 >= self.total_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photos(ids: &[&str]) -> Vec<Photo> {
        ids.iter().map(|id| Photo::new(*id, format!("{}.jpg", id))).collect()
    }

    #[test]
    fn test_heading_and_grouping() {
        let cases = [(2023, 6, "2023 June"), (1999, 1, "1999 January"), (2000, 12, "2000 December")];
        for (year, month, heading) in cases {
            let bucket = BucketModel::new(&format!("{}-{}", year, month), 0).unwrap();
            assert_eq!(bucket.heading(), heading);
            assert_eq!(bucket.grouping(), year);
            assert_eq!(bucket.year(), year);
            assert_eq!(bucket.month(), month);
        }
    }

    #[test]
    fn test_new_rejects_malformed_id() {
        assert!(BucketModel::new("2023/6", 3).unwrap_err().is_invalid_bucket_id());
        assert!(BucketModel::new("2023-13", 3).is_err());
    }

    #[test]
    fn test_append_is_order_preserving_and_associative() {
        let mut split = BucketModel::new("2023-6", 4).unwrap();
        split.append_photos(photos(&["a", "b"]));
        split.append_photos(photos(&["c", "d"]));

        let mut once = BucketModel::new("2023-6", 4).unwrap();
        once.append_photos(photos(&["a", "b", "c", "d"]));

        assert_eq!(split.photos(), once.photos());
        assert_eq!(
            split.photos().iter().map(|p| p.uuid.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "c", "d"]
        );
    }

    #[test]
    fn test_append_does_not_deduplicate_or_bound() {
        let mut bucket = BucketModel::new("2023-6", 1).unwrap();
        bucket.append_photos(photos(&["a"]));
        let all = bucket.append_photos(photos(&["a", "b"]));
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_apply_page_tracks_cursor() {
        let mut bucket = BucketModel::new("2023-7", 3).unwrap();
        assert!(!bucket.is_fully_loaded());
        assert!(bucket.next_cursor().is_none());

        bucket.apply_page(PhotoPage {
            photos: photos(&["a", "b"]),
            total_count: Some(3),
            end_cursor: Some("c2".to_string()),
            has_next_page: true,
        });
        assert_eq!(bucket.next_cursor(), Some("c2"));
        assert!(!bucket.is_fully_loaded());

        bucket.apply_page(PhotoPage::last(photos(&["c"])));
        assert!(bucket.is_fully_loaded());
        assert_eq!(bucket.photos().len(), 3);
    }

    #[test]
    fn test_page_without_cursor_ends_the_bucket() {
        let mut bucket = BucketModel::new("2023-7", 5).unwrap();
        bucket.apply_page(PhotoPage {
            photos: photos(&["a", "b"]),
            total_count: Some(5),
            end_cursor: None,
            has_next_page: true,
        });

        assert!(bucket.is_fully_loaded());
        assert!(bucket.next_cursor().is_none());
        assert_eq!(bucket.photos().len(), 2);
    }

    #[test]
    fn test_empty_bucket_is_fully_loaded() {
        let bucket = BucketModel::new("2020-2", 0).unwrap();
        assert!(bucket.is_fully_loaded());
    }

    #[test]
    fn test_descriptor_deserializes_camel_case() {
        let descriptor: BucketDescriptor =
            serde_json::from_str(r#"{"year":2023,"month":6,"totalCount":12}"#).unwrap();
        assert_eq!(descriptor, BucketDescriptor::new(2023, 6, 12));
        assert_eq!(descriptor.id().unwrap().to_string(), "2023-6");

        let bucket = BucketModel::from_descriptor(&descriptor).unwrap();
        assert_eq!(bucket.total_count(), 12);
        assert!(bucket.photos().is_empty());
    }
}
