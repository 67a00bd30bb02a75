//! Multipart form reading shared by the upload and update routes

use actix_multipart::Multipart;
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use std::collections::HashMap;

use crate::error::{AppError, Result};

/// Text fields and files of one multipart request
#[derive(Debug, Default)]
pub struct FormParts {
    text: HashMap<String, String>,
    files: HashMap<String, Bytes>,
}

impl FormParts {
    pub fn text(&self, name: &str) -> Option<String> {
        self.text.get(name).cloned()
    }

    pub fn take_file(&mut self, name: &str) -> Option<Bytes> {
        self.files.remove(name)
    }
}

/// Read the whole form.
///
/// Parts with a filename are files and must be named in `file_fields`; each
/// file field may appear once. Every other part is read as UTF-8 text (last
/// value wins). A part larger than `max_part_bytes` is rejected.
pub async fn read_form(
    mut payload: Multipart,
    file_fields: &[&str],
    max_part_bytes: usize,
) -> Result<FormParts> {
    let mut parts = FormParts::default();

    while let Some(field) = payload.next().await {
        let mut field =
            field.map_err(|e| AppError::ValidationError(format!("Multipart error: {}", e)))?;

        let name = field.name().unwrap_or_default().to_string();
        let is_file = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .is_some();

        if is_file && !file_fields.contains(&name.as_str()) {
            return Err(AppError::ValidationError(format!(
                "Unexpected file field: {}",
                name
            )));
        }

        let mut data = BytesMut::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk
                .map_err(|e| AppError::ValidationError(format!("Multipart read error: {}", e)))?;
            if data.len() + chunk.len() > max_part_bytes {
                return Err(AppError::ValidationError(format!(
                    "Field {} exceeds {} bytes",
                    name, max_part_bytes
                )));
            }
            data.extend_from_slice(&chunk);
        }

        if is_file {
            if parts.files.contains_key(&name) {
                return Err(AppError::ValidationError(format!(
                    "Only one file allowed in field: {}",
                    name
                )));
            }
            parts.files.insert(name, data.freeze());
        } else {
            let value = String::from_utf8(data.to_vec()).map_err(|_| {
                AppError::ValidationError(format!("Field {} is not valid UTF-8", name))
            })?;
            parts.text.insert(name, value);
        }
    }

    Ok(parts)
}
