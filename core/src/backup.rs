//! Configuration backup and restore.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::{info, instrument};

use crate::client::{check_success, expect_no_content, HttpClient};
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpResponse, RequestBody, Sink, Target};
use crate::types::BackupRequest;

const BACKUP_PATH: &str = "api/v1/configuration/backup";

/// Fallback when the extension is unknown.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub struct BackupService<'a, C: HttpClient + ?Sized> {
    client: &'a C,
}

impl<'a, C: HttpClient + ?Sized> BackupService<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Download a configuration backup into `destination`.
    ///
    /// `password` encrypts the sensitive entries inside the archive and is
    /// needed again when restoring; the archive itself is not protected.
    /// The returned response has an empty body since it was streamed out.
    #[instrument(skip(self, password, destination))]
    pub fn create_backup(&self, password: &str, destination: &mut dyn Write) -> Result<HttpResponse> {
        let body = RequestBody::json(&BackupRequest { password })?;
        let request = self
            .client
            .new_request(Target::Default, HttpMethod::Post, BACKUP_PATH, body)?;
        let response = check_success(self.client.execute(request, Sink::Writer(destination))?)?;
        info!(status = response.status, "configuration backup downloaded");
        Ok(response)
    }

    /// Upload `file` to restore the connector configuration. Requires 204.
    ///
    /// `name` is only used to pick the content type. The password is accepted
    /// for symmetry with `create_backup` but is not sent with the upload.
    /// The whole file is read into memory before the request is sent.
    #[instrument(skip(self, _password, file))]
    pub fn restore_backup(&self, _password: &str, file: &mut File, name: &Path) -> Result<HttpResponse> {
        let metadata = file.metadata()?;
        if metadata.is_dir() {
            return Err(ApiError::InvalidUpload(
                "the backup to upload can't be a directory".to_string(),
            ));
        }

        let content_type = content_type_for(name);
        let request = self.client.new_upload_request(
            HttpMethod::Put,
            BACKUP_PATH,
            file,
            metadata.len(),
            content_type,
        )?;
        let response = self.client.execute(request, Sink::Discard)?;
        let response = expect_no_content("backup restore", response)?;
        info!(size = metadata.len(), "configuration backup restored");
        Ok(response)
    }
}

/// Media type for a file, derived from its extension.
pub fn content_type_for(name: &Path) -> &'static str {
    let ext = match name.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_ascii_lowercase(),
        None => return DEFAULT_CONTENT_TYPE,
    };
    match ext.as_str() {
        "zip" => "application/zip",
        "gz" | "tgz" => "application/gzip",
        "tar" => "application/x-tar",
        "json" => "application/json",
        "xml" => "text/xml; charset=utf-8",
        "txt" => "text/plain; charset=utf-8",
        "pdf" => "application/pdf",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
