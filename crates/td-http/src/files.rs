//! Attachment endpoints and the direct object-store upload.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;

use td_core::attachment::{Attachment, PresignRequest, PresignResponse, UploadCompleteRequest};
use td_core::ports::{FileRemotePort, RemoteResult};
use td_core::todo::TodoId;

use crate::client::HttpRemote;

#[async_trait]
impl FileRemotePort for HttpRemote {
    async fn presign(&self, request: &PresignRequest) -> RemoteResult<PresignResponse> {
        let builder = self
            .request(Method::POST, "/files/presigned-url")
            .json(request);
        self.send_json(builder).await
    }

    async fn upload(
        &self,
        presigned_url: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> RemoteResult<()> {
        // The presigned URL is absolute and already authorized; the
        // bearer token must not leak to the object store.
        let builder = self
            .raw(Method::PUT, presigned_url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        self.send_empty(builder).await
    }

    async fn complete(&self, request: &UploadCompleteRequest) -> RemoteResult<Attachment> {
        let builder = self.request(Method::POST, "/files/complete").json(request);
        self.send_json(builder).await
    }

    async fn list_for_todo(&self, todo_id: TodoId) -> RemoteResult<Vec<Attachment>> {
        let builder = self.request(Method::GET, &format!("/files/todo/{todo_id}"));
        self.send_json(builder).await
    }

    async fn delete(&self, id: i64) -> RemoteResult<()> {
        let builder = self.request(Method::DELETE, &format!("/files/{id}"));
        self.send_empty(builder).await
    }
}
