//! First-page rasterization of PDFs for vision models.
//!
//! Shells out to Quick Look (`qlmanage`) on macOS and to poppler's
//! `pdftoppm` elsewhere. The image lives in a private temp directory that is
//! removed when the returned [`RenderedPage`] is dropped.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Longest edge of the rendered page, in pixels
const RENDER_SIZE: u32 = 1200;

/// Rendered first page; dropping it deletes the image.
#[derive(Debug)]
pub struct RenderedPage {
    path: PathBuf,
    _dir: TempDir,
}

impl RenderedPage {
    /// Take ownership of `dir`, which holds the image at `path`
    pub fn new(path: PathBuf, dir: TempDir) -> Self {
        Self { path, _dir: dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Render page one of `pdf` on a blocking thread
pub async fn render_first_page(pdf: &Path) -> io::Result<RenderedPage> {
    let pdf = pdf.to_path_buf();
    tokio::task::spawn_blocking(move || render_first_page_blocking(&pdf))
        .await
        .map_err(|e| io::Error::other(format!("Render task failed: {}", e)))?
}

fn render_first_page_blocking(pdf: &Path) -> io::Result<RenderedPage> {
    let dir = tempfile::Builder::new().prefix("blackhole-pdf").tempdir()?;
    let output = rasterize(pdf, dir.path())?;

    if !output.status.success() {
        return Err(io::Error::other(format!(
            "rasterizer exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let path = expected_output(pdf, dir.path());
    if !path.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("rendered page not found at {}", path.display()),
        ));
    }

    Ok(RenderedPage::new(path, dir))
}

#[cfg(target_os = "macos")]
fn rasterize(pdf: &Path, out_dir: &Path) -> io::Result<std::process::Output> {
    Command::new("qlmanage")
        .arg("-t")
        .arg("-s")
        .arg(RENDER_SIZE.to_string())
        .arg("-o")
        .arg(out_dir)
        .arg(pdf)
        .output()
}

/// Quick Look names the thumbnail `<file name>.png`
#[cfg(target_os = "macos")]
fn expected_output(pdf: &Path, out_dir: &Path) -> PathBuf {
    let name = pdf
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "page".to_string());
    out_dir.join(format!("{}.png", name))
}

#[cfg(not(target_os = "macos"))]
fn rasterize(pdf: &Path, out_dir: &Path) -> io::Result<std::process::Output> {
    Command::new("pdftoppm")
        .args(["-png", "-f", "1", "-l", "1", "-singlefile", "-scale-to"])
        .arg(RENDER_SIZE.to_string())
        .arg(pdf)
        .arg(out_dir.join("page"))
        .output()
}

#[cfg(not(target_os = "macos"))]
fn expected_output(_pdf: &Path, out_dir: &Path) -> PathBuf {
    out_dir.join("page.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_removes_rendered_image() {
        let dir = TempDir::new().unwrap();
        let dir_path = dir.path().to_path_buf();
        let image = dir_path.join("page.png");
        std::fs::write(&image, b"png").unwrap();

        let page = RenderedPage::new(image.clone(), dir);
        assert_eq!(page.path(), image.as_path());
        assert!(image.is_file());

        drop(page);
        assert!(!dir_path.exists());
    }

    #[tokio::test]
    async fn test_missing_pdf_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = render_first_page(&dir.path().join("nope.pdf")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_garbage_pdf_is_an_error() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("broken.pdf");
        std::fs::write(&pdf, b"not a pdf at all").unwrap();
        assert!(render_first_page(&pdf).await.is_err());
    }
}
