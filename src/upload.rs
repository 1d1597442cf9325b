use std::path::{Path, PathBuf};

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// True when the text after the last `.` is one of [`ALLOWED_EXTENSIONS`].
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

/// Reduces a client-supplied name to something safe to join onto the
/// scratch directory.
pub fn secure_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

pub async fn save_upload(dir: &Path, filename: &str, data: &[u8]) -> std::io::Result<PathBuf> {
    let path = dir.join(secure_filename(filename));
    tokio::fs::write(&path, data).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_allowed_extensions() {
        let names = [
            "scan.png",
            "scan.jpg",
            "scan.jpeg",
            "scan.gif",
            "SCAN.PNG",
            "a.b.JpEg",
            ".png",
        ];
        for name in names {
            assert!(allowed_file(name), "{name} should be allowed");
        }
    }

    #[test]
    fn rejects_everything_else() {
        for name in ["png", "scan.", "scan.bmp", "scan.png.exe", "", "scan.tiff"] {
            assert!(!allowed_file(name), "{name} should be rejected");
        }
    }

    #[test]
    fn secure_filename_strips_paths_and_junk() {
        assert_eq!(secure_filename("../../etc/passwd"), "passwd");
        assert_eq!(secure_filename("C:\\Users\\me\\brain scan.png"), "brain_scan.png");
        assert_eq!(secure_filename("..hidden.jpg"), "hidden.jpg");
        assert_eq!(secure_filename("tümor.gif"), "tmor.gif");
        assert_eq!(secure_filename("///"), "upload");
    }

    #[tokio::test]
    async fn saves_into_scratch_dir() {
        let dir = tempfile::tempdir().unwrap();

        let path = save_upload(dir.path(), "../scan.png", b"bytes").await.unwrap();
        assert_eq!(path, dir.path().join("scan.png"));
        assert_eq!(std::fs::read(path).unwrap(), b"bytes");
    }
}
