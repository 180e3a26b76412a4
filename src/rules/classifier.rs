//! Extension-based file categories.

use std::path::Path;

/// Category reported for directories
pub const FOLDER: &str = "folder";

/// Coarse category for a path, `None` when the extension is not in the table.
///
/// Does not touch the filesystem; the caller says whether the path is a directory.
pub fn classify(path: &Path, is_dir: bool) -> Option<&'static str> {
    if is_dir {
        return Some(FOLDER);
    }

    let ext = path.extension()?.to_string_lossy().to_lowercase();
    category_for_extension(&ext)
}

/// Category for a bare extension (lowercase, no dot)
pub fn category_for_extension(ext: &str) -> Option<&'static str> {
    let category = match ext {
        "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp" | "tiff" | "heic" => "image",
        "mp4" | "mov" | "avi" | "mkv" | "wmv" | "flv" | "webm" => "video",
        "mp3" | "wav" | "aac" | "flac" | "m4a" | "ogg" => "audio",
        "zip" | "rar" | "7z" | "tar" | "gz" | "bz2" | "xz" => "archive",
        "pdf" | "doc" | "docx" | "xls" | "xlsx" | "ppt" | "pptx" | "txt" | "md" | "rtf"
        | "csv" => "document",
        "go" | "js" | "ts" | "jsx" | "tsx" | "py" | "java" | "cpp" | "c" | "h" | "rs" | "rb"
        | "php" | "html" | "css" | "json" | "yaml" | "yml" => "code",
        "dmg" | "pkg" | "exe" | "msi" => "installer",
        "psd" | "sketch" | "ai" | "xd" | "fig" => "design",
        "epub" | "mobi" | "azw" | "azw3" => "ebook",
        _ => return None,
    };
    Some(category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directories_are_folders() {
        assert_eq!(classify(Path::new("/tmp/photos.jpg"), true), Some("folder"));
    }

    #[test]
    fn test_extension_lookup_ignores_case() {
        assert_eq!(classify(Path::new("IMG_0001.HEIC"), false), Some("image"));
        assert_eq!(classify(Path::new("notes.Md"), false), Some("document"));
        assert_eq!(classify(Path::new("main.rs"), false), Some("code"));
        assert_eq!(classify(Path::new("Setup.MSI"), false), Some("installer"));
        assert_eq!(classify(Path::new("book.azw3"), false), Some("ebook"));
    }

    #[test]
    fn test_unknown_is_none() {
        assert_eq!(classify(Path::new("data.bin"), false), None);
        assert_eq!(classify(Path::new("Makefile"), false), None);
        // only the last extension counts
        assert_eq!(classify(Path::new("backup.tar.gz"), false), Some("archive"));
        assert_eq!(classify(Path::new("report.pdf.part"), false), None);
    }
}
