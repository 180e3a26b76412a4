//! Filename templates: rendering, sanitizing and timestamp selection.

use chrono::{DateTime, Local};
use std::path::Path;

use crate::models::{DateSource, TemplateComponent, TemplateToken};

/// Name used when sanitizing leaves nothing
const UNTITLED: &str = "untitled";

/// Placeholder shown for the original name in library previews
const PREVIEW_ORIGINAL: &str = "filename";

/// Splits `name` into base and extension, the extension keeping its dot.
///
/// Leading-dot names such as `.env` have no extension.
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

/// Trims, falls back to "untitled" and replaces path separators and colons.
pub fn sanitize(value: &str) -> String {
    let name = value.trim();
    if name.is_empty() {
        return UNTITLED.to_string();
    }
    name.replace(['/', '\\', ':'], "_")
}

/// Builds a new base name (no extension) from `template`.
///
/// Tokens are concatenated in order; separators are tokens themselves.
pub fn render(
    template: &[TemplateToken],
    original_name: &str,
    ai_name: Option<&str>,
    timestamp: &DateTime<Local>,
) -> String {
    let (original_base, _) = split_name(original_name);
    let name_part = match ai_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(ai) => sanitize(split_name(ai).0),
        None => sanitize(original_base),
    };

    let mut out = String::new();
    for token in template {
        match token {
            TemplateToken::Year => out.push_str(&timestamp.format("%Y").to_string()),
            TemplateToken::Month => out.push_str(&timestamp.format("%m").to_string()),
            TemplateToken::Day => out.push_str(&timestamp.format("%d").to_string()),
            TemplateToken::Hour => out.push_str(&timestamp.format("%H").to_string()),
            TemplateToken::Minute => out.push_str(&timestamp.format("%M").to_string()),
            TemplateToken::Original => out.push_str(&name_part),
            TemplateToken::Separator(sep) => out.push_str(sep),
            TemplateToken::Text(text) => out.push_str(&sanitize(text)),
        }
    }
    out
}

/// Name used when a rule has no template: `YYYY-MM-DD_<ai name or base>`.
///
/// The AI name is sanitized so it can never introduce a path separator.
pub fn fallback_name(original_name: &str, ai_name: Option<&str>, timestamp: &DateTime<Local>) -> String {
    let base = match ai_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(ai) => sanitize(ai),
        None => split_name(original_name).0.to_string(),
    };
    format!("{}_{}", timestamp.format("%Y-%m-%d"), base)
}

/// Timestamp for the date tokens; never fails.
///
/// `Created` and `Modified` both read the modification time, since creation
/// time is not available on every platform. Anything else, or a failed stat,
/// yields the current time.
pub fn select_timestamp(path: &Path, source: DateSource) -> DateTime<Local> {
    match source {
        DateSource::Created | DateSource::Modified => std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map(DateTime::<Local>::from)
            .unwrap_or_else(|_| Local::now()),
        DateSource::Current => Local::now(),
    }
}

/// Example name for a library template, using today's date.
pub fn preview_components(components: &[TemplateComponent]) -> String {
    let now = Local::now();
    components
        .iter()
        .map(|c| match c.kind.as_str() {
            "year" => now.format("%Y").to_string(),
            "month" => now.format("%m").to_string(),
            "day" => now.format("%d").to_string(),
            "date" => now.format("%Y-%m-%d").to_string(),
            "original" => PREVIEW_ORIGINAL.to_string(),
            _ => c.label.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn tokens(raw: &[&str]) -> Vec<TemplateToken> {
        raw.iter().map(|t| TemplateToken::from(*t)).collect()
    }

    fn march_fifth() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("a/b:c\\d"), "a_b_c_d");
        assert_eq!(sanitize("   "), "untitled");
        assert_eq!(sanitize("  Quarterly report "), "Quarterly report");
    }

    #[test]
    fn test_render_date_and_original() {
        let template = tokens(&["YYYY", "separator-", "MM", "separator-", "DD", "original"]);
        assert_eq!(render(&template, "photo.png", None, &march_fifth()), "2024-03-05photo");
        assert_eq!(render(&template, "photo.png", Some(""), &march_fifth()), "2024-03-05photo");
    }

    #[test]
    fn test_render_time_tokens() {
        let ts = Local.with_ymd_and_hms(2023, 12, 31, 7, 4, 0).unwrap();
        let template = tokens(&["HH", "separator:", "mm"]);
        // separators are used verbatim, even unsafe characters
        assert_eq!(render(&template, "x.txt", None, &ts), "07:04");
    }

    #[test]
    fn test_render_prefers_ai_name() {
        let template = tokens(&["original", "separator_", "final"]);
        assert_eq!(
            render(&template, "IMG_1234.jpg", Some("Beach/Sunset.jpeg"), &march_fifth()),
            "Beach_Sunset_final"
        );
    }

    #[test]
    fn test_render_sanitizes_text_tokens() {
        let template = tokens(&["a:b", "original"]);
        assert_eq!(render(&template, "   .txt", None, &march_fifth()), "a_buntitled");
        assert_eq!(render(&tokens(&["original"]), "notes", None, &march_fifth()), "notes");
    }

    #[test]
    fn test_fallback_name() {
        assert_eq!(fallback_name("scan.pdf", None, &march_fifth()), "2024-03-05_scan");
        assert_eq!(
            fallback_name("scan.pdf", Some("Lease agreement"), &march_fifth()),
            "2024-03-05_Lease agreement"
        );
        assert_eq!(
            fallback_name("scan.pdf", Some("../etc/passwd"), &march_fifth()),
            "2024-03-05_.._etc_passwd"
        );
    }

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_name("README"), ("README", ""));
        assert_eq!(split_name(".env"), (".env", ""));
    }

    #[test]
    fn test_select_timestamp_missing_file_is_now() {
        let before = Local::now();
        let ts = select_timestamp(Path::new("/definitely/not/here.txt"), DateSource::Modified);
        assert!(ts >= before - Duration::seconds(1));
        assert!(ts <= Local::now() + Duration::seconds(1));
    }

    #[test]
    fn test_select_timestamp_uses_mtime() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("old.txt");
        std::fs::write(&path, b"x").unwrap();
        let mtime = filetime::FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&path, mtime).unwrap();

        assert_eq!(select_timestamp(&path, DateSource::Modified).timestamp(), 1_600_000_000);
        assert_eq!(select_timestamp(&path, DateSource::Created).timestamp(), 1_600_000_000);
        assert!(select_timestamp(&path, DateSource::Current).timestamp() > 1_600_000_000);
    }

    #[test]
    fn test_preview_components() {
        let components = vec![
            TemplateComponent { label: "Invoice".into(), kind: "text".into() },
            TemplateComponent { label: "_".into(), kind: "separator".into() },
            TemplateComponent { label: "".into(), kind: "original".into() },
        ];
        assert_eq!(preview_components(&components), "Invoice_filename");
    }
}
