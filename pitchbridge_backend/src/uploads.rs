//! Object storage for pitch media: company logos, pitch decks, and avatars.
//! Files land under `uploads/<namespace>/` with their metadata in the
//! `uploads` table; the public URL is `/uploads/{id}`.

use crate::config::PitchbridgePaths;
use crate::database::models::UploadRecord;
use crate::database::repositories::UploadRepository;
use crate::database::Database;
use crate::error::{DomainError, DomainResult};
use crate::utils::now_utc_iso;
use blake3::Hasher;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadNamespace {
    #[serde(rename = "company-logos")]
    CompanyLogos,
    #[serde(rename = "pitch-decks")]
    PitchDecks,
    #[serde(rename = "avatars")]
    Avatars,
}

impl UploadNamespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadNamespace::CompanyLogos => "company-logos",
            UploadNamespace::PitchDecks => "pitch-decks",
            UploadNamespace::Avatars => "avatars",
        }
    }

    pub fn parse(raw: &str) -> DomainResult<Self> {
        match raw {
            "company-logos" => Ok(UploadNamespace::CompanyLogos),
            "pitch-decks" => Ok(UploadNamespace::PitchDecks),
            "avatars" => Ok(UploadNamespace::Avatars),
            other => Err(DomainError::validation(format!(
                "unknown upload namespace {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreUploadInput {
    pub namespace: UploadNamespace,
    pub original_name: Option<String>,
    pub mime: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadView {
    pub id: String,
    pub namespace: String,
    pub original_name: Option<String>,
    pub mime: Option<String>,
    pub size_bytes: Option<i64>,
    pub checksum: Option<String>,
    pub public_url: String,
}

impl UploadView {
    fn from_record(record: UploadRecord) -> Self {
        Self {
            public_url: format!("/uploads/{}", record.id),
            id: record.id,
            namespace: record.namespace,
            original_name: record.original_name,
            mime: record.mime,
            size_bytes: record.size_bytes,
            checksum: record.checksum,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadDownload {
    pub metadata: UploadView,
    pub absolute_path: PathBuf,
}

#[derive(Clone)]
pub struct UploadService {
    database: Database,
    paths: PitchbridgePaths,
}

impl UploadService {
    pub fn new(database: Database, paths: PitchbridgePaths) -> Self {
        Self { database, paths }
    }

    pub async fn store(&self, input: StoreUploadInput) -> DomainResult<UploadView> {
        if input.data.is_empty() {
            return Err(DomainError::validation("upload data may not be empty"));
        }
        if input.namespace == UploadNamespace::PitchDecks {
            ensure_pdf(input.mime.as_deref(), &input.data)?;
        }

        let upload_id = Uuid::new_v4().to_string();
        let original_name = input.original_name.as_deref().map(sanitize_filename);

        let stored_name = match original_name
            .as_deref()
            .and_then(|name| Path::new(name).extension().and_then(|ext| ext.to_str()))
        {
            Some(ext) if !ext.is_empty() => format!("{upload_id}.{ext}"),
            _ => upload_id.clone(),
        };

        let relative_path = format!("uploads/{}/{stored_name}", input.namespace.as_str());
        let absolute_path = self.paths.base.join(&relative_path);
        if let Some(parent) = absolute_path.parent() {
            fs::create_dir_all(parent).await.map_err(|err| {
                DomainError::Upstream(anyhow::anyhow!(
                    "failed to create upload directory {}: {err}",
                    parent.display()
                ))
            })?;
        }
        fs::write(&absolute_path, &input.data).await.map_err(|err| {
            DomainError::Upstream(anyhow::anyhow!(
                "failed to write upload to {}: {err}",
                absolute_path.display()
            ))
        })?;

        let mut hasher = Hasher::new();
        hasher.update(&input.data);
        let checksum = format!("blake3:{}", hasher.finalize().to_hex());

        let record = UploadRecord {
            id: upload_id,
            namespace: input.namespace.as_str().to_string(),
            path: relative_path,
            original_name,
            mime: input.mime,
            size_bytes: Some(input.data.len() as i64),
            checksum: Some(checksum),
            created_at: now_utc_iso(),
        };
        self.database
            .with_repositories(|repos| repos.uploads().create(&record))?;
        tracing::info!(
            upload_id = %record.id,
            namespace = %record.namespace,
            size_bytes = record.size_bytes,
            "upload stored"
        );
        Ok(UploadView::from_record(record))
    }

    pub async fn open(&self, id: &str) -> DomainResult<UploadDownload> {
        let record = self
            .database
            .with_repositories(|repos| repos.uploads().get(id))?
            .ok_or_else(|| DomainError::not_found(format!("upload {id}")))?;
        let absolute_path = self.paths.base.join(&record.path);
        if fs::metadata(&absolute_path).await.is_err() {
            tracing::warn!(path = %absolute_path.display(), "upload missing on disk");
            return Err(DomainError::not_found(format!("upload {id}")));
        }
        Ok(UploadDownload {
            metadata: UploadView::from_record(record),
            absolute_path,
        })
    }
}

/// Pitch decks must be PDF. Both the declared content type and the actual
/// bytes are checked; a spoofed extension with a non-PDF body is rejected.
fn ensure_pdf(declared_mime: Option<&str>, data: &[u8]) -> DomainResult<()> {
    if let Some(mime) = declared_mime {
        if mime != "application/pdf" {
            return Err(DomainError::validation(
                "pitch decks must be PDF (content type application/pdf)",
            ));
        }
    }
    let sniffed_pdf = infer::get(data)
        .map(|kind| kind.mime_type() == "application/pdf")
        .unwrap_or(false);
    if !sniffed_pdf {
        return Err(DomainError::validation(
            "pitch decks must be PDF (file content is not a PDF)",
        ));
    }
    Ok(())
}

fn sanitize_filename(name: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|file| file.to_str())
        .unwrap_or("upload")
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}
