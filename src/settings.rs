use crate::arc_templates;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub default_template: String,
    pub prepopulate_arc_beats: bool,
    pub log_filter: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_template: "custom".to_string(),
            prepopulate_arc_beats: true,
            log_filter: "info".to_string(),
        }
    }
}

impl AppSettings {
    pub fn validate(&self) -> AppResult<()> {
        if !arc_templates::is_valid(&self.default_template) {
            return Err(AppError::Validation(format!(
                "Unknown arc template '{}'",
                self.default_template
            )));
        }
        if self.log_filter.trim().is_empty() {
            return Err(AppError::Validation("Log filter cannot be empty".to_string()));
        }
        Ok(())
    }
}
