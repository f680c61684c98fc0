use std::path::PathBuf;

/// Directory page the listing stage starts from.
pub const DEFAULT_LISTING_URL: &str = "https://coworkingspain.es/espacios/coworking/barcelona";

/// File name of the final workbook, relative to the output directory.
pub const DEFAULT_OUTPUT_FILE: &str = "coworking_barcelona.xlsx";

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub listing_url: String,
    pub output_dir: PathBuf,
    pub output_file: String,
    pub log_level: String,
    /// Write a checkpoint workbook after every `checkpoint_every` processed entries.
    pub checkpoint_every: usize,
    /// Politeness delay between detail page fetches.
    pub inter_request_delay_ms: u64,
    /// Safety valve for the "show more" loop on the listing page.
    pub max_pagination_clicks: usize,
    pub user_agent: String,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub chrome_executable: Option<PathBuf>,
    pub page_load_timeout_secs: u64,
}

impl AppConfig {
    /// Path of the final workbook.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            output_dir: PathBuf::from("."),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            log_level: "info".to_string(),
            checkpoint_every: 10,
            inter_request_delay_ms: 2000,
            max_pagination_clicks: 150,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headless: true,
            window_width: 1920,
            window_height: 1080,
            chrome_executable: None,
            page_load_timeout_secs: 20,
        }
    }
}
