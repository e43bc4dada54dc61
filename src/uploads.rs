// src/uploads.rs

use std::collections::HashMap;
use std::path::Path;

use actix_multipart::Multipart;
use chrono::Utc;
use futures_util::StreamExt;
use uuid::Uuid;

use crate::error::AppError;

/// Which multipart part carries files, and how many are accepted.
#[derive(Debug, Clone, Copy)]
pub struct UploadRules {
    pub file_field: &'static str,
    pub max_files: usize,
}

pub const LISTING_IMAGES: UploadRules = UploadRules {
    file_field: "images",
    max_files: 5,
};

pub const PAYMENT_SCREENSHOT: UploadRules = UploadRules {
    file_field: "screenshot",
    max_files: 1,
};

/// Text parts of a multipart form plus the stored names of its files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Form {
    pub fields: HashMap<String, String>,
    pub files: Vec<String>,
}

impl Form {
    pub fn from_fields<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Form {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            files: Vec::new(),
        }
    }

    /// Trimmed value; blank counts as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// True when the only submitted text part is `name` and no files came along.
    pub fn only(&self, name: &str) -> bool {
        self.fields.len() == 1 && self.has(name) && self.files.is_empty()
    }
}

pub fn sanitize(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '.' || *c == '_' || *c == '-')
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// `{millis}-{random}-{sanitized}`; unique even for repeated client names.
pub fn stored_name(original: &str) -> String {
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        sanitize(original)
    )
}

/// Reads the whole form. Files stored before a failure are removed again.
pub async fn read_form(
    mut payload: Multipart,
    dir: &Path,
    rules: UploadRules,
) -> Result<Form, AppError> {
    let mut form = Form::default();

    match read_parts(&mut payload, dir, rules, &mut form).await {
        Ok(()) => Ok(form),
        Err(e) => {
            discard(dir, &form.files).await;
            Err(e)
        }
    }
}

async fn read_parts(
    payload: &mut Multipart,
    dir: &Path,
    rules: UploadRules,
    form: &mut Form,
) -> Result<(), AppError> {
    while let Some(item) = payload.next().await {
        let mut field = item?;

        let cd = field.content_disposition();
        let name = cd.get_name().unwrap_or_default().to_string();
        let filename = cd.get_filename().map(str::to_string);

        let mut data: Vec<u8> = Vec::new();
        while let Some(chunk) = field.next().await {
            data.extend_from_slice(&chunk?);
        }

        match filename {
            Some(filename) if name == rules.file_field => {
                if data.is_empty() {
                    continue;
                }
                if form.files.len() >= rules.max_files {
                    return Err(AppError::Upload(format!(
                        "at most {} file(s) allowed in '{}'",
                        rules.max_files, rules.file_field
                    )));
                }
                let stored = stored_name(&filename);
                tokio::fs::write(dir.join(&stored), &data).await?;
                log::debug!("stored upload field={} file={}", name, stored);
                form.files.push(stored);
            }
            Some(filename) => {
                log::warn!("ignoring unexpected file field={} file={}", name, filename);
            }
            None => {
                let value = String::from_utf8(data).map_err(|_| {
                    AppError::Upload(format!("field '{name}' is not valid UTF-8"))
                })?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(())
}

/// Best-effort removal of stored files, e.g. after a rejected form.
pub async fn discard(dir: &Path, files: &[String]) {
    for file in files {
        if let Err(e) = tokio::fs::remove_file(dir.join(file)).await {
            log::warn!("could not remove upload file={}: {}", file, e);
        }
    }
}

/// Passes `result` through; on error the stored `files` are removed first.
pub async fn discard_on_err<T, E>(
    dir: &Path,
    files: &[String],
    result: Result<T, E>,
) -> Result<T, E> {
    if result.is_err() {
        discard(dir, files).await;
    }
    result
}
