//! Attachment use-cases: three-step upload and optimistic delete.

use std::sync::Arc;

use tracing::{debug, warn};

use td_core::attachment::{Attachment, PresignRequest, UploadCompleteRequest, UploadSource};
use td_core::cache::QueryCache;
use td_core::ports::FileRemotePort;
use td_core::todo::TodoId;

use crate::error::ClientError;

/// Attachment lists cached per owning todo.
pub type AttachmentCache = QueryCache<TodoId, Vec<Attachment>>;

pub struct AttachmentService<F> {
    cache: Arc<AttachmentCache>,
    remote: Arc<F>,
}

impl<F: FileRemotePort> AttachmentService<F> {
    pub fn new(cache: Arc<AttachmentCache>, remote: Arc<F>) -> Self {
        Self { cache, remote }
    }

    /// Upload a file for `todo_id`: presign, raw PUT to the object store,
    /// then register the object with the backend. `progress` receives
    /// coarse percentages (10/30/80/100) for upload UI.
    ///
    /// There is no optimistic phase; the attachment exists only once the
    /// backend has registered it, so the cached list grows through the
    /// invalidation-driven refetch.
    pub async fn upload(
        &self,
        todo_id: TodoId,
        source: UploadSource,
        progress: impl Fn(u8) + Send,
    ) -> Result<Attachment, ClientError> {
        source.validate()?;
        progress(10);

        let UploadSource {
            file_name: original_name,
            content_type,
            bytes,
        } = source;
        let file_size = bytes.len() as u64;

        let presign = self
            .remote
            .presign(&PresignRequest {
                file_name: original_name.clone(),
                content_type: content_type.clone(),
                file_size,
                todo_id,
            })
            .await?;
        progress(30);

        self.remote
            .upload(&presign.presigned_url, &content_type, bytes)
            .await?;
        progress(80);

        // The stored name is the last segment of the object key the
        // backend chose, not the user's file name.
        let file_name = presign
            .file_key
            .rsplit('/')
            .next()
            .unwrap_or(original_name.as_str())
            .to_string();

        let attachment = self
            .remote
            .complete(&UploadCompleteRequest {
                todo_id,
                file_name,
                original_name,
                file_path: presign.file_key,
                file_size,
                content_type,
            })
            .await?;
        progress(100);

        debug!(todo_id, attachment = attachment.id, "upload registered");
        self.cache.invalidate_matching(|k| *k == todo_id).await;
        Ok(attachment)
    }

    /// Upload gate for the editor's inline images: only image types go
    /// through; the caller gets the public URL to embed.
    pub async fn upload_image(
        &self,
        todo_id: TodoId,
        source: UploadSource,
        progress: impl Fn(u8) + Send,
    ) -> Result<String, ClientError> {
        if !source.is_image() {
            return Err(td_core::error::ValidationError {
                issues: vec![td_core::error::FieldIssue::new(
                    "contentType",
                    "only image files can be embedded",
                )],
            }
            .into());
        }
        let attachment = self.upload(todo_id, source, progress).await?;
        Ok(attachment.file_url)
    }

    /// Optimistically remove the attachment from the cached list of its
    /// todo; restore and refetch if the server refuses.
    pub async fn delete(&self, todo_id: TodoId, attachment_id: i64) -> Result<(), ClientError> {
        let snapshot = self.cache.snapshot_all().await;
        self.cache
            .update(&todo_id, |list| list.retain(|a| a.id != attachment_id))
            .await;

        match self.remote.delete(attachment_id).await {
            Ok(()) => {
                self.cache.invalidate_matching(|k| *k == todo_id).await;
                Ok(())
            }
            Err(err) => {
                warn!(todo_id, attachment_id, error = %err, "attachment delete failed, restoring");
                self.cache.restore(snapshot).await;
                self.cache.invalidate_matching(|k| *k == todo_id).await;
                Err(err.into())
            }
        }
    }
}
