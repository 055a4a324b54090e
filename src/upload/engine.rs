//! Upload engine: multipart parsing, sniffing and storage.

use std::path::Path;
use std::sync::Arc;

use axum::extract::Request;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use multer::{Constraints, Field, Multipart, SizeLimit};
use tokio::io::AsyncWriteExt;

use crate::files::ensure_dir;
use crate::observability::metrics;
use crate::text::random_string;
use crate::upload::classifier::{ContentClassifier, MagicClassifier, SNIFF_LEN};
use crate::upload::types::{PartialUpload, UploadError, UploadPolicy, UploadedFile};

/// Length of the random part of a generated file name.
pub const RANDOM_NAME_LEN: usize = 25;

/// Stores the files of a multipart request under a directory.
#[derive(Clone)]
pub struct Uploader {
    policy: UploadPolicy,
    classifier: Arc<dyn ContentClassifier>,
}

impl std::fmt::Debug for Uploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Uploader").field("policy", &self.policy).finish_non_exhaustive()
    }
}

impl Default for Uploader {
    fn default() -> Self {
        Self::new(UploadPolicy::default())
    }
}

impl Uploader {
    /// Create an uploader using the magic-number classifier.
    pub fn new(policy: UploadPolicy) -> Self {
        Self {
            policy,
            classifier: Arc::new(MagicClassifier),
        }
    }

    /// Replace the content classifier.
    pub fn with_classifier(mut self, classifier: impl ContentClassifier + 'static) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Store every file part of `request` under `dir`, in transport order.
    ///
    /// On failure the returned [`PartialUpload`] carries the records of the
    /// files stored before the failing one.
    pub async fn upload_files(
        &self,
        request: Request,
        dir: impl AsRef<Path>,
    ) -> Result<Vec<UploadedFile>, PartialUpload> {
        self.ingest(request, dir.as_ref(), None).await
    }

    /// Store only the first file part of `request` under `dir`.
    ///
    /// A form without any file part fails with [`UploadError::NoFile`].
    pub async fn upload_one(
        &self,
        request: Request,
        dir: impl AsRef<Path>,
    ) -> Result<UploadedFile, UploadError> {
        let mut stored = self
            .ingest(request, dir.as_ref(), Some(1))
            .await
            .map_err(|partial| partial.error)?;
        stored.pop().ok_or(UploadError::NoFile)
    }

    async fn ingest(
        &self,
        request: Request,
        dir: &Path,
        max_files: Option<usize>,
    ) -> Result<Vec<UploadedFile>, PartialUpload> {
        ensure_dir(dir).await.map_err(PartialUpload::empty)?;
        let mut multipart = self.open_multipart(request).map_err(PartialUpload::empty)?;

        let mut stored = Vec::new();
        while max_files.map_or(true, |max| stored.len() < max) {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(err) => return Err(PartialUpload { error: err.into(), stored }),
            };

            // Plain form values carry no filename (or an empty one).
            let original = match field.file_name() {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => continue,
            };

            match self.store_field(field, original, dir).await {
                Ok(file) => stored.push(file),
                Err(error) => return Err(PartialUpload { error, stored }),
            }
        }

        Ok(stored)
    }

    fn open_multipart(&self, request: Request) -> Result<Multipart<'static>, UploadError> {
        let limit = self.policy.max_total_bytes;
        let headers = request.headers();

        let declared_len = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        if declared_len.is_some_and(|len| len > limit) {
            return Err(UploadError::UploadTooLarge { limit });
        }

        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| UploadError::MultipartParse("missing Content-Type header".to_string()))?;
        let boundary = multer::parse_boundary(content_type)?;

        let constraints = Constraints::new().size_limit(SizeLimit::new().whole_stream(limit));
        let stream = request.into_body().into_data_stream();
        Ok(Multipart::with_constraints(stream, boundary, constraints))
    }

    async fn store_field(
        &self,
        mut field: Field<'static>,
        original_file_name: String,
        dir: &Path,
    ) -> Result<UploadedFile, UploadError> {
        // Buffer at least SNIFF_LEN bytes (or the whole part) so the sniffed
        // prefix can be written ahead of the rest of the stream.
        let mut head = Vec::with_capacity(SNIFF_LEN);
        while head.len() < SNIFF_LEN {
            match field.chunk().await? {
                Some(chunk) => head.extend_from_slice(&chunk),
                None => break,
            }
        }

        let content_type = self.classifier.classify(&head[..head.len().min(SNIFF_LEN)]);
        if !self.policy.permits(&content_type) {
            return Err(UploadError::UnsupportedFileType { content_type });
        }

        let new_file_name = if self.policy.rename_on_store {
            format!("{}{}", random_string(RANDOM_NAME_LEN), extension(&original_file_name))
        } else {
            base_name(&original_file_name)
                .ok_or_else(|| {
                    UploadError::MultipartParse(format!("invalid file name {original_file_name:?}"))
                })?
                .to_string()
        };

        let path = dir.join(&new_file_name);
        let out = tokio::fs::File::create(&path).await?;
        let file_size = match write_field(out, &head, &mut field).await {
            Ok(size) => size,
            Err(err) => {
                // The caller is only told about completed files.
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    tracing::debug!(path = %path.display(), error = %remove_err, "Partial file left behind");
                }
                return Err(err);
            }
        };

        tracing::debug!(
            new_file_name = %new_file_name,
            original_file_name = %original_file_name,
            content_type = %content_type,
            file_size,
            "Stored uploaded file"
        );
        metrics::record_file_stored(file_size);

        Ok(UploadedFile {
            new_file_name,
            original_file_name,
            file_size,
        })
    }
}

async fn write_field(
    mut out: tokio::fs::File,
    head: &[u8],
    field: &mut Field<'static>,
) -> Result<u64, UploadError> {
    out.write_all(head).await?;
    let mut file_size = head.len() as u64;
    while let Some(chunk) = field.chunk().await? {
        out.write_all(&chunk).await?;
        file_size += chunk.len() as u64;
    }
    out.flush().await?;
    Ok(file_size)
}

/// Final path component of a client-supplied file name, if it has one.
fn base_name(file_name: &str) -> Option<&str> {
    Path::new(file_name).file_name().and_then(|name| name.to_str())
}

/// Extension of the last path component, dot included ("" when absent).
fn extension(file_name: &str) -> &str {
    let base = file_name.rfind('/').map_or(0, |i| i + 1);
    file_name[base..]
        .rfind('.')
        .map_or("", |dot| &file_name[base + dot..])
}
