use std::path::{Path, PathBuf};

use crate::{domain::extraction::DiagnosticBundle, error::PageError};

use super::BrowserPage;

/// Captures page markup and a screenshot for a retailer whose price was not
/// found. Never fails: whatever could not be captured is logged and left out.
pub async fn collect_diagnostics(
    page: &dyn BrowserPage,
    retailer: &str,
    artifact_dir: &Path,
    excerpt_len: usize,
) -> DiagnosticBundle {
    log::error!(
        "{} price not found. Dumping HTML and taking screenshot.",
        retailer
    );

    let markup_excerpt = match page.markup().await {
        Ok(markup) => truncate_markup(&markup, excerpt_len).to_string(),
        Err(e) => format!("<markup unavailable: {}>", e),
    };
    log::error!("{} page HTML: {}", retailer, markup_excerpt);

    let screenshot = match save_screenshot(page, retailer, artifact_dir).await {
        Ok(path) => {
            log::error!("{} screenshot saved to {}", retailer, path.display());
            Some(path)
        }
        Err(e) => {
            log::error!("Failed to capture {} screenshot: {:?}", retailer, e);
            None
        }
    };

    DiagnosticBundle {
        markup_excerpt,
        screenshot,
    }
}

pub fn screenshot_path(artifact_dir: &Path, retailer: &str) -> PathBuf {
    artifact_dir.join(format!("{}_debug.png", retailer))
}

async fn save_screenshot(
    page: &dyn BrowserPage,
    retailer: &str,
    artifact_dir: &Path,
) -> Result<PathBuf, PageError> {
    tokio::fs::create_dir_all(artifact_dir).await?;
    let path = screenshot_path(artifact_dir, retailer);
    page.screenshot(&path).await?;
    Ok(path)
}

/// First `max_chars` characters of `markup`, cut on a char boundary.
pub fn truncate_markup(markup: &str, max_chars: usize) -> &str {
    match markup.char_indices().nth(max_chars) {
        Some((idx, _)) => &markup[..idx],
        None => markup,
    }
}
