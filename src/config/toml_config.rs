use crate::config::{
    DEFAULT_ARCHIVE_NAME, DEFAULT_FINANCE_SOURCE, DEFAULT_GEO_SOURCE, DEFAULT_OBJECT_NAME,
    DEFAULT_OUTPUT_PATH, DEFAULT_REGION_KEY, DEFAULT_YEAR,
};
use crate::core::color_scale::Palette;
use crate::core::ConfigProvider;
use crate::domain::model::Year;
use crate::utils::error::{MapError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapConfig {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_geo_source")]
    pub geo: String,
    #[serde(default = "default_finance_source")]
    pub finance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_year")]
    pub year: String,
    #[serde(default)]
    pub all_years: bool,
    #[serde(default = "default_region_key")]
    pub region_key: String,
    #[serde(default = "default_object_name")]
    pub object_name: String,
    pub palette: Option<PaletteConfig>,
}

/// Hex colors for the three scale stops; missing entries keep the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaletteConfig {
    pub high: Option<String>,
    pub mid: Option<String>,
    pub low: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
    #[serde(default = "default_archive_name")]
    pub archive: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

fn default_geo_source() -> String {
    DEFAULT_GEO_SOURCE.to_string()
}

fn default_finance_source() -> String {
    DEFAULT_FINANCE_SOURCE.to_string()
}

fn default_year() -> String {
    DEFAULT_YEAR.to_string()
}

fn default_region_key() -> String {
    DEFAULT_REGION_KEY.to_string()
}

fn default_object_name() -> String {
    DEFAULT_OBJECT_NAME.to_string()
}

fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}

fn default_archive_name() -> String {
    DEFAULT_ARCHIVE_NAME.to_string()
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            geo: default_geo_source(),
            finance: default_finance_source(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            year: default_year(),
            all_years: false,
            region_key: default_region_key(),
            object_name: default_object_name(),
            palette: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            archive: default_archive_name(),
        }
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| MapError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_HOST})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn name(&self) -> &str {
        self.map.name.as_deref().unwrap_or("investment-map")
    }
}

impl ConfigProvider for TomlConfig {
    fn geo_source(&self) -> &str {
        &self.sources.geo
    }

    fn finance_source(&self) -> &str {
        &self.sources.finance
    }

    fn year(&self) -> Year {
        Year::new(self.render.year.as_str())
    }

    fn all_years(&self) -> bool {
        self.render.all_years
    }

    fn region_key(&self) -> &str {
        &self.render.region_key
    }

    fn object_name(&self) -> &str {
        &self.render.object_name
    }

    fn palette(&self) -> Result<Palette> {
        let mut palette = Palette::default();
        if let Some(config) = &self.render.palette {
            if let Some(high) = &config.high {
                palette.high = validation::validate_hex_color("render.palette.high", high)?;
            }
            if let Some(mid) = &config.mid {
                palette.mid = validation::validate_hex_color("render.palette.mid", mid)?;
            }
            if let Some(low) = &config.low {
                palette.low = validation::validate_hex_color("render.palette.low", low)?;
            }
        }
        Ok(palette)
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn archive_name(&self) -> &str {
        &self.output.archive
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_source("sources.geo", &self.sources.geo)?;
        validation::validate_source("sources.finance", &self.sources.finance)?;
        if !self.render.all_years {
            validation::validate_non_empty_string("render.year", &self.render.year)?;
        }
        validation::validate_non_empty_string("render.region_key", &self.render.region_key)?;
        validation::validate_non_empty_string("render.object_name", &self.render.object_name)?;
        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_file_name("output.archive", &self.output.archive)?;
        self.palette()?;
        Ok(())
    }
}
