//! Multipart upload parsing and validation shared by the image endpoints.

use axum::{body::Bytes, extract::Multipart};
use size_fit::ConvertFormat;
use std::collections::HashMap;

use crate::error::ApiError;
use crate::models::AppConfig;

/// The `file` part of a multipart request plus its text fields
#[derive(Debug)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
    fields: HashMap<String, String>,
}

impl Upload {
    /// Read every part of the request and validate the file against `config`
    pub async fn read(mut multipart: Multipart, config: &AppConfig) -> Result<Self, ApiError> {
        let mut file = None;
        let mut fields = HashMap::new();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let file_name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                file = Some((file_name, content_type, bytes));
            } else if !name.is_empty() {
                let value = field.text().await?;
                fields.insert(name, value);
            }
        }

        let (file_name, content_type, bytes) = file.ok_or(ApiError::MissingField("file"))?;
        let upload = Self {
            file_name,
            content_type,
            bytes,
            fields,
        };
        upload.validate(config)?;
        Ok(upload)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Check size, extension and MIME type before any decoding
    pub fn validate(&self, config: &AppConfig) -> Result<(), ApiError> {
        if self.bytes.is_empty() {
            return Err(ApiError::InvalidField {
                field: "file",
                reason: "file is empty".to_string(),
            });
        }

        if self.bytes.len() > config.max_file_size {
            return Err(ApiError::FileTooLarge {
                size: self.bytes.len(),
                max: config.max_file_size,
            });
        }

        if let Some(name) = &self.file_name {
            let extension = name
                .rfind('.')
                .map(|idx| name[idx..].to_ascii_lowercase())
                .unwrap_or_default();
            if !config.allowed_extensions.contains(&extension) {
                return Err(ApiError::FileTypeNotAllowed(name.clone()));
            }
        }

        if let Some(mime) = self.content_type.as_deref() {
            let mime = mime.split(';').next().unwrap_or(mime).trim().to_ascii_lowercase();
            if mime != "application/octet-stream" && !config.allowed_mime_types.contains(&mime) {
                return Err(ApiError::FileTypeNotAllowed(mime));
            }
        }

        Ok(())
    }

    /// Target size in KB from the `size` field, or the configured default
    pub fn target_size(&self, config: &AppConfig) -> Result<u32, ApiError> {
        let Some(raw) = self.field("size") else {
            return Ok(config.default_size_kb);
        };

        let range = || format!("must be between {} and {}", config.min_size_kb, config.max_size_kb);
        let size: u32 = raw.trim().parse().map_err(|_| ApiError::InvalidField {
            field: "size",
            reason: range(),
        })?;
        if !(config.min_size_kb..=config.max_size_kb).contains(&size) {
            return Err(ApiError::InvalidField {
                field: "size",
                reason: range(),
            });
        }
        Ok(size)
    }

    /// Conversion target from the `format` field
    pub fn format(&self) -> Result<ConvertFormat, ApiError> {
        let name = self.field("format").ok_or(ApiError::MissingField("format"))?;
        Ok(ConvertFormat::parse(name)?)
    }
}
