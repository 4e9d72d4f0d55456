/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::v0::parsers::{from_empty_str_to_none, from_rfc2822};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Describes a file or folder as returned by the metadata, search, fileops
/// and upload APIs.
///
/// See [Dropbox API Docs](https://www.dropbox.com/developers/docs#metadata) for more
/// details on the individual fields.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Metadata {
    pub path: String,

    #[serde(default)]
    pub is_dir: bool,

    /// Human readable size, e.g. "225.4KB"
    #[serde(default)]
    pub size: String,

    #[serde(default)]
    pub bytes: u64,

    #[serde(default, deserialize_with = "from_empty_str_to_none")]
    pub rev: Option<String>,

    #[serde(default)]
    pub revision: Option<u64>,

    #[serde(default)]
    pub thumb_exists: bool,

    #[serde(default)]
    pub icon: Option<String>,

    #[serde(default)]
    pub root: Option<String>,

    #[serde(default)]
    pub mime_type: Option<String>,

    #[serde(default, deserialize_with = "from_rfc2822", skip_serializing)]
    pub modified: Option<DateTime<Utc>>,

    /// Folder hash, only present on directory listings
    #[serde(default)]
    pub hash: Option<String>,

    #[serde(default)]
    pub is_deleted: bool,

    /// Child entries, only present on directory listings
    #[serde(default)]
    pub contents: Vec<Metadata>,
}

impl Metadata {
    /// True when this describes the root folder
    pub fn is_root(&self) -> bool {
        self.path.is_empty() || self.path == "/"
    }

    /// Last path segment, empty for the root
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or_default()
    }
}

impl PartialEq for Metadata {
    fn eq(&self, other: &Self) -> bool {
        self.path.eq_ignore_ascii_case(&other.path) && self.rev == other.rev
    }
}
impl Eq for Metadata {}

impl Hash for Metadata {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.path.to_ascii_lowercase().hash(state);
        self.rev.hash(state);
    }
}

impl std::fmt::Display for Metadata {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let kind = if self.is_dir { "dir" } else { "file" };
        write!(f, "{} ({}, {})", self.path, kind, self.size)
    }
}

/// Information about the account of the authenticated user
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct AccountInfo {
    pub uid: u64,

    pub display_name: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub referral_link: Option<String>,

    pub quota_info: QuotaInfo,
}

/// Storage usage, in bytes
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct QuotaInfo {
    pub quota: u64,
    pub normal: u64,
    pub shared: u64,
}

/// Access token pair handed out by the token endpoint
#[derive(Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub token: String,
    pub secret: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("token", &"xxx")
            .field("secret", &"xxx")
            .finish()
    }
}

/// One page of changes from the delta endpoint
#[derive(Deserialize, Clone, Debug)]
pub struct DeltaPage {
    #[serde(default)]
    pub entries: Vec<DeltaEntry>,

    /// The client should drop any state it derived from earlier pages
    #[serde(default)]
    pub reset: bool,

    pub cursor: String,

    /// More changes are available right away
    #[serde(default)]
    pub has_more: bool,
}

/// A change to a single path. A missing `metadata` means the path was deleted.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(from = "(String, Option<Metadata>)")]
pub struct DeltaEntry {
    pub path: String,
    pub metadata: Option<Metadata>,
}

impl DeltaEntry {
    pub fn is_deleted(&self) -> bool {
        self.metadata.is_none()
    }
}

impl From<(String, Option<Metadata>)> for DeltaEntry {
    fn from((path, metadata): (String, Option<Metadata>)) -> Self {
        Self { path, metadata }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_folder_listing() {
        let body = r#"{
            "hash": "37eb1ba1849d4b0fb0b28caf7ef3af52",
            "thumb_exists": false,
            "bytes": 0,
            "modified": "Wed, 27 Apr 2011 22:18:51 +0000",
            "path": "/Photos",
            "is_dir": true,
            "icon": "folder",
            "root": "dropbox",
            "contents": [
                {
                    "size": "2.3 MB",
                    "rev": "38af1b183490",
                    "thumb_exists": true,
                    "bytes": 2453963,
                    "modified": "Mon, 07 Apr 2014 23:13:16 +0000",
                    "path": "/Photos/flower.jpg",
                    "is_dir": false,
                    "icon": "page_white_picture",
                    "root": "dropbox",
                    "mime_type": "image/jpeg",
                    "revision": 14511
                }
            ],
            "size": "0 bytes"
        }"#;
        let meta: Metadata = serde_json::from_str(body).unwrap();
        assert!(meta.is_dir);
        assert_eq!(meta.name(), "Photos");
        assert_eq!(meta.contents.len(), 1);

        let child = &meta.contents[0];
        assert_eq!(child.rev.as_deref(), Some("38af1b183490"));
        assert_eq!(child.revision, Some(14511));
        assert_eq!(child.bytes, 2453963);
        assert_eq!(
            child.modified.unwrap().to_rfc3339(),
            "2014-04-07T23:13:16+00:00"
        );
    }

    #[test]
    fn parses_delta_page_with_tombstone() {
        let body = r#"{
            "entries": [
                ["/a.txt", {"path": "/a.txt", "is_dir": false, "bytes": 3, "size": "3 bytes"}],
                ["/gone", null]
            ],
            "reset": true,
            "cursor": "AAE",
            "has_more": false
        }"#;
        let page: DeltaPage = serde_json::from_str(body).unwrap();
        assert!(page.reset);
        assert_eq!(page.cursor, "AAE");
        assert_eq!(page.entries.len(), 2);
        assert!(!page.entries[0].is_deleted());
        assert_eq!(page.entries[1].path, "/gone");
        assert!(page.entries[1].is_deleted());
    }

    #[test]
    fn root_metadata() {
        let meta: Metadata =
            serde_json::from_str(r#"{"path": "/", "is_dir": true, "contents": []}"#).unwrap();
        assert!(meta.is_root());
        assert!(meta.contents.is_empty());
    }
}
