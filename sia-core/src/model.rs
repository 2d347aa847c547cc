use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use crate::error::SiaError;

/// One file as reported by `/renter/files` at the moment of the fetch.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FileRecord {
    pub siapath: String,
    #[serde(rename = "filesize")]
    pub file_size: u64,
    pub available: bool,
    pub renewing: bool,
    pub redundancy: f64,
    #[serde(rename = "uploadprogress")]
    pub upload_progress: f64,
    pub expiration: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FileListing {
    #[serde(deserialize_with = "null_as_empty")]
    pub files: Vec<FileRecord>,
}

impl FileListing {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileRecord> {
        self.files.iter()
    }

    pub fn find(&self, siapath: &str) -> Option<&FileRecord> {
        self.files.iter().find(|file| file.siapath == siapath)
    }
}

impl IntoIterator for FileListing {
    type Item = FileRecord;
    type IntoIter = std::vec::IntoIter<FileRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DownloadRecord {
    pub siapath: String,
    pub destination: String,
    #[serde(rename = "filesize")]
    pub file_size: u64,
    pub received: u64,
    #[serde(rename = "starttime", with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(default)]
    pub error: String,
}

impl DownloadRecord {
    pub fn is_complete(&self) -> bool {
        self.error.is_empty() && self.received >= self.file_size
    }

    pub fn has_failed(&self) -> bool {
        !self.error.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DownloadListing {
    #[serde(deserialize_with = "null_as_empty")]
    pub downloads: Vec<DownloadRecord>,
}

impl DownloadListing {
    pub fn len(&self) -> usize {
        self.downloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.downloads.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DownloadRecord> {
        self.downloads.iter()
    }

    pub fn find(&self, siapath: &str) -> Option<&DownloadRecord> {
        self.downloads.iter().find(|download| download.siapath == siapath)
    }
}

/// Parses a response body into `T`. Nothing partial is returned on failure.
pub fn decode<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, SiaError> {
    Ok(serde_json::from_str(body)?)
}

// The node serializes empty lists as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_file_listing_verbatim() {
        let body = r#"{"files":[
            {"siapath":"a","filesize":10,"available":true,"renewing":false,"redundancy":2.5,"uploadprogress":100,"expiration":500},
            {"siapath":"b/c","filesize":0,"available":false,"renewing":true,"redundancy":0,"uploadprogress":12.5,"expiration":7},
            {"siapath":"d","filesize":3,"available":false,"renewing":false,"redundancy":1,"uploadprogress":50,"expiration":9}
        ]}"#;
        let listing: FileListing = decode(body).unwrap();

        assert_eq!(listing.len(), 3);
        let first = &listing.files[0];
        assert_eq!(first.siapath, "a");
        assert_eq!(first.file_size, 10);
        assert!(first.available);
        assert!(!first.renewing);
        assert_eq!(first.redundancy, 2.5);
        assert_eq!(first.upload_progress, 100.0);
        assert_eq!(first.expiration, 500);
        assert_eq!(listing.find("b/c").map(|f| f.upload_progress), Some(12.5));
        assert!(listing.find("missing").is_none());
    }

    #[test]
    fn null_lists_are_empty() {
        let listing: FileListing = decode(r#"{"files":null}"#).unwrap();
        assert!(listing.is_empty());
        let downloads: DownloadListing = decode(r#"{"downloads":null}"#).unwrap();
        assert!(downloads.is_empty());
    }

    #[test]
    fn missing_list_key_is_decode_error() {
        let err = decode::<FileListing>(r#"{"message":"renter not loaded"}"#).unwrap_err();
        assert!(matches!(err, SiaError::Decode(_)));
        let err = decode::<DownloadListing>("{}").unwrap_err();
        assert!(matches!(err, SiaError::Decode(_)));
    }

    #[test]
    fn truncated_body_is_decode_error() {
        let err = decode::<FileListing>(r#"{"files":["#).unwrap_err();
        assert!(matches!(err, SiaError::Decode(_)));
    }

    #[test]
    fn shape_mismatch_is_decode_error() {
        let err = decode::<FileListing>(r#"{"files":[{"siapath":7}]}"#).unwrap_err();
        assert!(matches!(err, SiaError::Decode(_)));
    }

    #[test]
    fn decodes_download_listing() {
        let body = r#"{"downloads":[
            {"siapath":"movies/a.mkv","destination":"/tmp/a.mkv","filesize":100,"received":100,"starttime":"2017-03-01T12:30:00Z","error":""},
            {"siapath":"b","destination":"/tmp/b","filesize":100,"received":4,"starttime":"2017-03-01T12:31:00.5+02:00","error":"host offline"}
        ]}"#;
        let listing: DownloadListing = decode(body).unwrap();

        assert_eq!(listing.len(), 2);
        let done = listing.find("movies/a.mkv").unwrap();
        assert!(done.is_complete());
        assert_eq!(done.start_time.unix_timestamp(), 1_488_371_400);
        let failed = &listing.downloads[1];
        assert!(failed.has_failed());
        assert!(!failed.is_complete());
    }
}
