//! Object (blob) storage gateway.
//!
//! [`ObjectStore`] is the seam the orchestration layer uploads assets
//! through; it returns a public URL and deletes by that same URL.
//! [`S3ObjectStore`] is the production implementation (one bucket per
//! asset class); [`MemoryObjectStore`] serves local development and tests.
//!
//! Contract: uploads are atomic from the caller's perspective, deletes are
//! idempotent, and implementations are safe for concurrent use.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;

/// Object storage failure.
#[derive(Debug, thiserror::Error)]
#[error("storage error: {0}")]
pub struct StorageError(pub String);

/// Uploads and deletes binary assets, addressed by public URL.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload `bytes` into `container` at `path`; returns the public URL.
    async fn upload(
        &self,
        container: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, StorageError>;

    /// Delete the object behind a URL previously returned by
    /// [`upload`](Self::upload). Deleting a nonexistent object succeeds.
    async fn delete(&self, url: &str) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// S3
// ---------------------------------------------------------------------------

/// S3-backed object store. Containers map to buckets; public URLs are
/// `{public_base_url}/{bucket}/{key}`.
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    public_base_url: String,
}

impl S3ObjectStore {
    /// Build a client from the ambient AWS environment (credentials,
    /// region, optional endpoint override).
    pub async fn from_env(public_base_url: String) -> Self {
        let shared = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self {
            client: aws_sdk_s3::Client::new(&shared),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Split a public URL back into (bucket, key). `None` when the URL was
    /// not produced by this store.
    fn parse_url<'a>(&self, url: &'a str) -> Option<(&'a str, &'a str)> {
        let rest = url.strip_prefix(&self.public_base_url)?;
        rest.trim_start_matches('/').split_once('/')
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(
        &self,
        container: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        self.client
            .put_object()
            .bucket(container)
            .key(path)
            .body(ByteStream::from(bytes))
            .set_content_type(content_type.map(str::to_string))
            .send()
            .await
            .map_err(|e| StorageError(format!("put_object {container}/{path}: {e}")))?;

        Ok(format!("{}/{container}/{path}", self.public_base_url))
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let Some((bucket, key)) = self.parse_url(url) else {
            // Foreign or malformed URL; nothing of ours to delete.
            tracing::warn!(%url, "Skipping delete of unrecognized blob URL");
            return Ok(());
        };

        // S3 DeleteObject on a missing key succeeds, which gives us the
        // idempotency the contract requires.
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError(format!("delete_object {bucket}/{key}: {e}")))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Base URL used by [`MemoryObjectStore`] URLs.
pub const MEMORY_BASE_URL: &str = "memory://storydeck";

/// Process-local object store used when S3 is not configured, and in tests.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects (test hook).
    pub fn len(&self) -> usize {
        self.objects.lock().expect("storage lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an object with this URL currently exists (test hook).
    pub fn contains_url(&self, url: &str) -> bool {
        match url.strip_prefix(MEMORY_BASE_URL) {
            Some(rest) => self
                .objects
                .lock()
                .expect("storage lock poisoned")
                .contains_key(rest.trim_start_matches('/')),
            None => false,
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(
        &self,
        container: &str,
        path: &str,
        bytes: Vec<u8>,
        _content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        let key = format!("{container}/{path}");
        self.objects
            .lock()
            .expect("storage lock poisoned")
            .insert(key.clone(), bytes);
        Ok(format!("{MEMORY_BASE_URL}/{key}"))
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        if let Some(rest) = url.strip_prefix(MEMORY_BASE_URL) {
            self.objects
                .lock()
                .expect("storage lock poisoned")
                .remove(rest.trim_start_matches('/'));
        }
        Ok(())
    }
}
