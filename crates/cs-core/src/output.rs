//! Output directory, page files and assets.

use crate::error::{Result, SiteError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the asset subdirectory of the output.
pub const ASSETS_DIR: &str = "assets";

/// Stylesheet linked by the built-in template.
pub const STYLESHEET_FILE: &str = "site.css";

const DEFAULT_STYLESHEET: &str = include_str!("../assets/site.css");

/// Create the output directory. It must not exist yet.
pub fn create_output_dir(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(SiteError::DirectoryCreation {
            path: path.to_path_buf(),
            message: "file or directory already exists".to_string(),
        });
    }
    fs::create_dir(path).map_err(|e| SiteError::DirectoryCreation {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Write a page and check that all bytes reached the file.
pub fn write_page(path: &Path, html: &str) -> Result<usize> {
    let bytes = html.as_bytes();
    let write_err = |message: String| SiteError::OutputWrite {
        path: path.to_path_buf(),
        message,
    };
    let mut file = fs::File::create(path).map_err(|e| write_err(e.to_string()))?;
    file.write_all(bytes).map_err(|e| write_err(e.to_string()))?;
    file.sync_all().map_err(|e| write_err(e.to_string()))?;

    let written = fs::metadata(path)
        .map_err(|e| write_err(e.to_string()))?
        .len();
    if written != bytes.len() as u64 {
        return Err(write_err(format!(
            "only {} of {} bytes were written",
            written,
            bytes.len()
        )));
    }
    Ok(bytes.len())
}

/// Create `<output>/assets` and write the built-in stylesheet into it.
///
/// Returns the assets directory.
pub fn create_assets_dir(output: &Path) -> Result<PathBuf> {
    let target = output.join(ASSETS_DIR);
    fs::create_dir(&target).map_err(|e| SiteError::DirectoryCreation {
        path: target.clone(),
        message: e.to_string(),
    })?;
    write_page(&target.join(STYLESHEET_FILE), DEFAULT_STYLESHEET)?;
    Ok(target)
}

/// Copy the regular files of `source` into `target`, replacing existing ones.
///
/// Subdirectories are not copied. Returns the copied destination paths, sorted.
pub fn copy_assets(source: &Path, target: &Path) -> Result<Vec<PathBuf>> {
    let copy_err = |path: &Path, message: String| SiteError::AssetCopy {
        path: path.to_path_buf(),
        message,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(source).map_err(|e| copy_err(source, e.to_string()))? {
        let entry = entry.map_err(|e| copy_err(source, e.to_string()))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut copied = Vec::with_capacity(files.len());
    for origin in files {
        let Some(name) = origin.file_name() else {
            continue;
        };
        let destination = target.join(name);
        let bytes = fs::copy(&origin, &destination).map_err(|e| copy_err(&origin, e.to_string()))?;
        let expected = fs::metadata(&origin)
            .map_err(|e| copy_err(&origin, e.to_string()))?
            .len();
        if bytes != expected {
            return Err(copy_err(
                &origin,
                format!("only {} of {} bytes were copied", bytes, expected),
            ));
        }
        debug!(from = %origin.display(), to = %destination.display(), bytes, "Copied asset");
        copied.push(destination);
    }
    Ok(copied)
}

/// Minify a full page, keeping the input if the result is not valid UTF-8.
pub fn minify_page(html: String) -> String {
    let cfg = minify_html::Cfg {
        minify_js: true,
        minify_css: true,
        ..Default::default()
    };
    String::from_utf8(minify_html::minify(html.as_bytes(), &cfg)).unwrap_or(html)
}
