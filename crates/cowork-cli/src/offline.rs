//! Offline parse commands: run the extraction rules over saved page markup
//! without starting a browser.

use std::path::Path;

use anyhow::Context;

fn read_markup(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Listing entries parsed from a saved listing page, as pretty JSON.
pub(crate) fn listing_json(path: &Path, base_url: &str) -> anyhow::Result<String> {
    let html = read_markup(path)?;
    let entries = cowork_scraper::parse_listing(&html, base_url);
    tracing::info!(count = entries.len(), path = %path.display(), "parsed listing file");
    Ok(serde_json::to_string_pretty(&entries)?)
}

/// Detail record parsed from a saved detail page, as pretty JSON.
pub(crate) fn detail_json(path: &Path) -> anyhow::Result<String> {
    let html = read_markup(path)?;
    let record = cowork_scraper::parse_detail(&html);
    tracing::info!(found = record.found_count(), path = %path.display(), "parsed detail file");
    Ok(serde_json::to_string_pretty(&record)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_json_uses_export_column_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listing.html");
        std::fs::write(
            &path,
            r#"<div class="view-content"><div class="views-row">
                 <div class="spaces-list-title"><a href="/espacio/uno"><h2>Uno</h2></a></div>
               </div></div>"#,
        )
        .unwrap();

        let json = listing_json(&path, "https://coworkingspain.es/espacios").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["Name"], "Uno");
        assert_eq!(value[0]["Link"], "https://coworkingspain.es/espacio/uno");
    }

    #[test]
    fn detail_json_fills_missing_fields_with_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detail.html");
        std::fs::write(&path, "<html><body></body></html>").unwrap();

        let json = detail_json(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["Description"], "N/A");
        assert_eq!(value.as_object().unwrap().len(), 11);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = detail_json(Path::new("/definitely/not/here.html")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
