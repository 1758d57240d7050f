pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;
pub use config::{storage::LocalStorage, toml_config::TomlConfig};

pub use core::{
    binder::{render_year, ChoroplethBinder},
    color_scale::{DivergingColorScale, Palette},
    engine::MapEngine,
    finance_index::{RegionFinanceIndex, DEFAULT_RECORD},
    pipeline::ChoroplethPipeline,
};
pub use domain::model::{
    Color, EnrichedRegion, FinanceRecord, GeoRegion, Geometry, Year, YearlyFinanceDataset,
};
pub use utils::error::{MapError, Result};
