use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use uuid::Uuid;

use crate::errors::AppError;

/// Blob store key for an uploaded original file, scoped by owner and record id.
pub fn object_key(prefix: &str, user_id: Uuid, record_id: Uuid, filename: &str) -> String {
    format!("{prefix}/{user_id}/{record_id}/{filename}")
}

pub async fn put_object(
    s3: &S3Client,
    bucket: &str,
    key: &str,
    bytes: Vec<u8>,
    content_type: &str,
) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(bytes))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("upload of {key} failed: {e}")))?;
    Ok(())
}

pub async fn get_object(s3: &S3Client, bucket: &str, key: &str) -> Result<Vec<u8>, AppError> {
    let out = s3
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("download of {key} failed: {e}")))?;
    let data = out
        .body
        .collect()
        .await
        .map_err(|e| AppError::S3(format!("read of {key} failed: {e}")))?;
    Ok(data.into_bytes().to_vec())
}

pub async fn delete_object(s3: &S3Client, bucket: &str, key: &str) -> Result<(), AppError> {
    s3.delete_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("delete of {key} failed: {e}")))?;
    Ok(())
}

/// Content type for serving a stored original back to the client,
/// derived from the stored filename.
pub fn content_type_for(filename: &str) -> &'static str {
    let lower = filename.to_lowercase();
    if lower.ends_with(".pdf") {
        "application/pdf"
    } else if lower.ends_with(".docx") {
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    } else if lower.ends_with(".txt") {
        "text/plain"
    } else if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else {
        "application/octet-stream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_layout() {
        let user = Uuid::nil();
        let id = Uuid::nil();
        let key = object_key("resumes", user, id, "cv.pdf");
        assert_eq!(
            key,
            format!("resumes/{user}/{id}/cv.pdf")
        );
    }

    #[test]
    fn test_content_type_known_extensions() {
        assert_eq!(content_type_for("a.PDF"), "application/pdf");
        assert_eq!(content_type_for("b.txt"), "text/plain");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
