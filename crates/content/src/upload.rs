//! In-memory representation of an uploaded file.

/// Bytes plus metadata for one uploaded file part.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: Option<String>,
}

impl FileUpload {
    /// Lowercased extension of the original filename, without the dot.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.filename.rsplit_once('.')?;
        if ext.is_empty() || ext.contains('/') {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// Build a blob path `{prefix}{stem}[.{ext}]`, carrying over the upload's
/// original extension when it has one.
pub(crate) fn blob_path(prefix: &str, stem: &str, upload: &FileUpload) -> String {
    match upload.extension() {
        Some(ext) => format!("{prefix}{stem}.{ext}"),
        None => format!("{prefix}{stem}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(filename: &str) -> FileUpload {
        FileUpload {
            bytes: Vec::new(),
            filename: filename.to_string(),
            content_type: None,
        }
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(upload("Cover.PNG").extension().as_deref(), Some("png"));
        assert_eq!(upload("noext").extension(), None);
    }

    #[test]
    fn blob_path_keeps_prefix_and_extension() {
        let path = blob_path("stories/thumbnails/", "abc-123", &upload("photo.jpg"));
        assert_eq!(path, "stories/thumbnails/abc-123.jpg");
    }
}
