//! Path codec: the reversible mapping between public object URLs and
//! bucket-relative storage paths.
//!
//! `encode` produces the path a fresh upload is written to; `decode`
//! recovers a deletable path from a previously issued public URL. Decoding
//! is total: foreign, legacy, or malformed URLs yield `None`, never an
//! error, because "nothing to delete" is an expected case.

use percent_encoding::percent_decode_str;
use url::Url;
use uuid::Uuid;

use jajan_shared::OwnerId;

/// Codec for one configured bucket.
#[derive(Debug, Clone)]
pub struct PathCodec {
    bucket: String,
}

impl PathCodec {
    /// Creates a codec for the given bucket.
    #[must_use]
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }

    /// Returns the bucket this codec operates on.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Generates a collision-resistant storage path for a new photo.
    ///
    /// Format: `{owner}/{uuid-v4}[.ext]`. The original file's extension is
    /// preserved when present; everything else about the original name is
    /// discarded.
    #[must_use]
    pub fn encode(&self, owner: &OwnerId, original_file_name: &str) -> String {
        let stem = Uuid::new_v4();
        match sanitized_extension(original_file_name) {
            Some(ext) => format!("{owner}/{stem}.{ext}"),
            None => format!("{owner}/{stem}"),
        }
    }

    /// Recovers the bucket-relative path from a public URL.
    ///
    /// Locates the bucket segment among the URL's path components and
    /// returns the percent-decoded remainder. Returns `None` when the URL
    /// is malformed or does not point into the configured bucket.
    #[must_use]
    pub fn decode(&self, public_url: &str) -> Option<String> {
        let parsed = Url::parse(public_url).ok()?;
        let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();

        let bucket_index = segments.iter().position(|s| *s == self.bucket)?;
        let object_segments = &segments[bucket_index + 1..];

        if object_segments.is_empty() {
            return None;
        }

        let decoded: Vec<String> = object_segments
            .iter()
            .map(|segment| {
                percent_decode_str(segment)
                    .decode_utf8()
                    .map_or_else(|_| (*segment).to_string(), |s| s.to_string())
            })
            .collect();

        Some(decoded.join("/"))
    }
}

/// Extracts and sanitizes the extension of an uploaded file name.
///
/// Only ASCII alphanumeric characters survive, which keeps the generated
/// path free of separators and percent-encoding surprises. Returns `None`
/// when the name has no usable extension.
fn sanitized_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let cleaned: String = ext.chars().filter(char::is_ascii_alphanumeric).collect();
    if cleaned.is_empty() { None } else { Some(cleaned) }
}
