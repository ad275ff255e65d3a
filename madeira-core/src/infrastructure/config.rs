use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_file: PathBuf,
    pub reports_dir: PathBuf,
    /// Admin screens stay locked when unset.
    pub admin_password: Option<String>,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("./data/madeira.json"),
            reports_dir: PathBuf::from("./reports"),
            admin_password: None,
            log_filter: "warn".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let data_file = path_var("MADEIRA_DATA_FILE")?.unwrap_or(defaults.data_file);
        let reports_dir = path_var("MADEIRA_REPORTS_DIR")?.unwrap_or(defaults.reports_dir);
        let admin_password = std::env::var("MADEIRA_ADMIN_PASSWORD")
            .ok()
            .filter(|p| !p.is_empty());
        let log_filter = std::env::var("MADEIRA_LOG")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.log_filter);

        Ok(Self {
            data_file,
            reports_dir,
            admin_password,
            log_filter,
        })
    }
}

fn path_var(name: &str) -> anyhow::Result<Option<PathBuf>> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => Err(anyhow::anyhow!("{} must not be empty", name)),
        Ok(value) => Ok(Some(PathBuf::from(value.trim()))),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(anyhow::anyhow!("invalid {}: {}", name, e)),
    }
}
