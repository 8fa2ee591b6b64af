use crate::error::{Result, SeriesMatcherError};
use serde::{Deserialize, Serialize};
use series_matcher_common::types::{DEFAULT_TOP_N, MAX_TOP_N, MIN_TOP_N};
use std::path::{Path, PathBuf};

const MASTER_ENV: &str = "SERIES_MATCHER_MASTER";
const ADDR_ENV: &str = "SERIES_MATCHER_ADDR";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_top_n: usize,
    pub default_threshold: f64,
    pub master_path: PathBuf,
    pub master_sheet: String,
    pub log_dir: PathBuf,
    pub bind_addr: String,
    pub max_upload_mb: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_top_n: DEFAULT_TOP_N,
            default_threshold: 0.0,
            master_path: PathBuf::from("./MasterSeriesHistory.xlsx"),
            master_sheet: "Master".into(),
            log_dir: PathBuf::from("./logs"),
            bind_addr: "127.0.0.1:8501".into(),
            max_upload_mb: 20,
        }
    }
}

impl Config {
    /// 実行時の設定（保存値に環境変数を上書き）
    pub fn load() -> Result<Self> {
        Ok(Self::load_stored()?.with_env_overrides())
    }

    /// 設定ファイルの値だけを読む（編集・保存用）
    pub fn load_stored() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| SeriesMatcherError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("series-matcher").join("config.json"))
    }

    /// 環境変数を優先
    fn with_env_overrides(self) -> Self {
        self.apply_overrides(std::env::var(MASTER_ENV).ok(), std::env::var(ADDR_ENV).ok())
    }

    /// 空でない値だけ上書き
    pub fn apply_overrides(mut self, master: Option<String>, addr: Option<String>) -> Self {
        if let Some(path) = master.filter(|p| !p.trim().is_empty()) {
            self.master_path = PathBuf::from(path);
        }
        if let Some(addr) = addr.filter(|a| !a.trim().is_empty()) {
            self.bind_addr = addr;
        }
        self
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    pub fn set_default_top_n(&mut self, top_n: usize) -> Result<()> {
        if !(MIN_TOP_N..=MAX_TOP_N).contains(&top_n) {
            return Err(SeriesMatcherError::InvalidParameter(format!(
                "上位件数は{}〜{}で指定してください",
                MIN_TOP_N, MAX_TOP_N
            )));
        }
        self.default_top_n = top_n;
        self.save()
    }

    pub fn set_default_threshold(&mut self, threshold: f64) -> Result<()> {
        if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
            return Err(SeriesMatcherError::InvalidParameter(
                "使用率の閾値は0〜100で指定してください".into(),
            ));
        }
        self.default_threshold = threshold;
        self.save()
    }

    pub fn set_master_path(&mut self, path: PathBuf) -> Result<()> {
        self.master_path = path;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_top_n, 5);
        assert_eq!(config.master_sheet, "Master");
        assert_eq!(config.max_upload_bytes(), 20 * 1024 * 1024);
    }

    #[test]
    fn test_apply_overrides() {
        let config = Config::default().apply_overrides(Some("/srv/master.xlsx".into()), Some("  ".into()));
        assert_eq!(config.master_path, PathBuf::from("/srv/master.xlsx"));
        assert_eq!(config.bind_addr, "127.0.0.1:8501");
    }

    #[test]
    fn test_override_not_written_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let stored = Config {
            master_path: PathBuf::from("./stored.xlsx"),
            ..Default::default()
        };
        stored.save_to(&path).unwrap();

        let runtime = Config::load_from(&path)
            .unwrap()
            .apply_overrides(Some("/tmp/override.xlsx".into()), None);
        assert_eq!(runtime.master_path, PathBuf::from("/tmp/override.xlsx"));

        // 編集は保存値に対して行う
        let mut edited = Config::load_from(&path).unwrap();
        edited.default_top_n = 7;
        edited.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.master_path, PathBuf::from("./stored.xlsx"));
        assert_eq!(reloaded.default_top_n, 7);
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(config.default_top_n, DEFAULT_TOP_N);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"default_top_n": 3}"#).unwrap();
        assert_eq!(config.default_top_n, 3);
        assert_eq!(config.bind_addr, "127.0.0.1:8501");
    }
}
