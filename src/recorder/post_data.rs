//! Request body interpretation for recorded requests.

use std::convert::Infallible;

use axum::http::Method;
use bytes::Bytes;
use futures_util::{future, stream};
use multer::{Constraints, Multipart, SizeLimit};

use crate::recorder::har::{NameValue, PostData};
use crate::recorder::RecordError;

/// Upper bound on a multipart body the recorder will decode (3 GiB).
pub const MULTIPART_SIZE_LIMIT: u64 = 3 * 1024 * 1024 * 1024;

/// Value recorded in place of uploaded file content.
pub const FILE_PLACEHOLDER: &str = "<FILE>";

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Build the `postData` entry for a buffered request body.
///
/// Returns `None` for an empty GET or HEAD body.
pub async fn decode_post_data(
    method: &Method,
    content_type: Option<&str>,
    body: &Bytes,
) -> Result<Option<PostData>, RecordError> {
    if body.is_empty() && (method == Method::GET || method == Method::HEAD) {
        return Ok(None);
    }

    let mime_type = content_type.unwrap_or_default().to_string();
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let params = if essence == FORM_URLENCODED {
        url::form_urlencoded::parse(body)
            .map(|(name, value)| NameValue::new(name, value))
            .collect()
    } else if essence == MULTIPART_FORM_DATA {
        decode_multipart(&mime_type, body.clone()).await?
    } else {
        Vec::new()
    };

    Ok(Some(PostData {
        mime_type,
        text: String::from_utf8_lossy(body).into_owned(),
        params,
    }))
}

async fn decode_multipart(content_type: &str, body: Bytes) -> Result<Vec<NameValue>, RecordError> {
    let boundary = multer::parse_boundary(content_type)?;
    let constraints =
        Constraints::new().size_limit(SizeLimit::new().whole_stream(MULTIPART_SIZE_LIMIT));
    let body = stream::once(future::ready(Ok::<Bytes, Infallible>(body)));
    let mut multipart = Multipart::with_constraints(body, boundary, constraints);

    let mut params = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if field.file_name().is_some() {
            params.push(NameValue::new(name, FILE_PLACEHOLDER));
        } else {
            let value = field.bytes().await?;
            params.push(NameValue::new(name, String::from_utf8_lossy(&value)));
        }
    }

    Ok(params)
}
