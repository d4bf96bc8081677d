//! Typed HTTP client for the notes REST API.

use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use sticky_types::snapshot::{self, ImportSummary};
use sticky_types::{ErrorBody, ImportMode, NewNote, Note, NoteId, NotePatch};

use super::NoteStore;
use crate::error::NoteError;

pub struct RemoteNoteStore {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteNoteStore {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn notes_url(&self) -> String {
        format!("{}/api/notes", self.base_url)
    }

    /// The id goes in as one escaped path segment.
    fn note_url(&self, id: &NoteId) -> Result<Url, NoteError> {
        let mut url = Url::parse(&self.notes_url())
            .map_err(|e| NoteError::Transport(format!("Invalid API URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| NoteError::Transport(format!("Invalid API URL {}", self.base_url)))?
            .push(&id.to_string());
        Ok(url)
    }

    /// The server only hands out integer ids, so any other id cannot exist there.
    fn server_id(id: &NoteId) -> Result<(), NoteError> {
        match id {
            NoteId::Int(_) => Ok(()),
            NoteId::Text(_) => Err(NoteError::NotFound(id.clone())),
        }
    }

    /// Check if the notes server is reachable
    pub async fn health(&self) -> Result<bool, NoteError> {
        let resp = self
            .client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await?;

        Ok(resp.status().is_success())
    }
}

/// Pull the server's `{"error": ...}` message out of a failed response,
/// falling back to the raw body.
async fn error_message(resp: Response) -> String {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.error,
        Err(_) if body.is_empty() => format!("HTTP {}", status),
        Err(_) => format!("HTTP {}: {}", status, body),
    }
}

/// Map a non-success response for a call addressing `id`.
async fn status_error(resp: Response, id: Option<&NoteId>) -> NoteError {
    let status = resp.status();
    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => NoteError::NotFound(id.clone()),
        (StatusCode::BAD_REQUEST, _) => NoteError::Validation(error_message(resp).await),
        _ => NoteError::Transport(error_message(resp).await),
    }
}

#[async_trait]
impl NoteStore for RemoteNoteStore {
    async fn list(&self) -> Result<Vec<Note>, NoteError> {
        let resp = self
            .client
            .get(self.notes_url())
            .send()
            .await
            .map_err(|e| NoteError::StorageUnavailable(format!("List notes failed: {}", e)))?;

        if !resp.status().is_success() {
            let msg = error_message(resp).await;
            return Err(NoteError::StorageUnavailable(format!("List notes error: {}", msg)));
        }

        resp.json::<Vec<Note>>()
            .await
            .map_err(|e| NoteError::StorageUnavailable(format!("Parse notes: {}", e)))
    }

    async fn create(&self, new_note: NewNote) -> Result<Note, NoteError> {
        let text = new_note.normalized_text().ok_or_else(NoteError::empty_text)?;
        let body = NewNote { text, ..new_note };

        let resp = self.client.post(self.notes_url()).json(&body).send().await?;

        if !resp.status().is_success() {
            return Err(status_error(resp, None).await);
        }

        Ok(resp.json::<Note>().await?)
    }

    async fn update(&self, id: &NoteId, patch: NotePatch) -> Result<Note, NoteError> {
        patch.normalized_text().map_err(NoteError::Validation)?;
        Self::server_id(id)?;

        let resp = self.client.put(self.note_url(id)?).json(&patch).send().await?;

        if !resp.status().is_success() {
            return Err(status_error(resp, Some(id)).await);
        }

        Ok(resp.json::<Note>().await?)
    }

    async fn delete(&self, id: &NoteId) -> Result<(), NoteError> {
        Self::server_id(id)?;

        let resp = self.client.delete(self.note_url(id)?).send().await?;

        if !resp.status().is_success() {
            return Err(status_error(resp, Some(id)).await);
        }

        Ok(())
    }

    async fn export_all(&self) -> Result<String, NoteError> {
        let resp = self
            .client
            .get(format!("{}/export", self.notes_url()))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(status_error(resp, None).await);
        }

        Ok(resp.text().await?)
    }

    async fn import_all(&self, raw: &str, mode: ImportMode) -> Result<ImportSummary, NoteError> {
        // Reject locally first so a bad file never reaches the server.
        let notes = snapshot::parse_snapshot(raw)?;

        let resp = self
            .client
            .post(format!("{}/import", self.notes_url()))
            .query(&[("mode", mode.as_str())])
            .json(&notes)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(status_error(resp, None).await);
        }

        Ok(resp.json::<ImportSummary>().await?)
    }
}
