use crate::config::{
    DEFAULT_ARCHIVE_NAME, DEFAULT_FINANCE_SOURCE, DEFAULT_GEO_SOURCE, DEFAULT_OBJECT_NAME,
    DEFAULT_OUTPUT_PATH, DEFAULT_REGION_KEY, DEFAULT_YEAR,
};
use crate::core::color_scale::Palette;
use crate::core::ConfigProvider;
use crate::domain::model::Year;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "investment-map")]
#[command(about = "Binds regional finance data to map regions and colors them")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_GEO_SOURCE)]
    pub geo_source: String,

    #[arg(long, default_value = DEFAULT_FINANCE_SOURCE)]
    pub finance_source: String,

    #[arg(long, default_value = DEFAULT_YEAR)]
    pub year: String,

    #[arg(long, help = "Render every year in the finance dataset")]
    pub all_years: bool,

    #[arg(long, default_value = DEFAULT_REGION_KEY)]
    pub region_key: String,

    #[arg(long, default_value = DEFAULT_OBJECT_NAME)]
    pub object_name: String,

    #[arg(long, default_value = "#d73027")]
    pub color_high: String,

    #[arg(long, default_value = "#fee08b")]
    pub color_mid: String,

    #[arg(long, default_value = "#1a9850")]
    pub color_low: String,

    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_ARCHIVE_NAME)]
    pub archive_name: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory per phase")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn geo_source(&self) -> &str {
        &self.geo_source
    }

    fn finance_source(&self) -> &str {
        &self.finance_source
    }

    fn year(&self) -> Year {
        Year::new(self.year.as_str())
    }

    fn all_years(&self) -> bool {
        self.all_years
    }

    fn region_key(&self) -> &str {
        &self.region_key
    }

    fn object_name(&self) -> &str {
        &self.object_name
    }

    fn palette(&self) -> Result<Palette> {
        Ok(Palette {
            high: validation::validate_hex_color("color_high", &self.color_high)?,
            mid: validation::validate_hex_color("color_mid", &self.color_mid)?,
            low: validation::validate_hex_color("color_low", &self.color_low)?,
        })
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn archive_name(&self) -> &str {
        &self.archive_name
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_source("geo_source", &self.geo_source)?;
        validation::validate_source("finance_source", &self.finance_source)?;
        if !self.all_years {
            validation::validate_non_empty_string("year", &self.year)?;
        }
        validation::validate_non_empty_string("region_key", &self.region_key)?;
        validation::validate_non_empty_string("object_name", &self.object_name)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_file_name("archive_name", &self.archive_name)?;
        self.palette()?;
        Ok(())
    }
}
