#[cfg(feature = "cli")]
pub mod cli;
pub mod storage;
pub mod toml_config;

pub const DEFAULT_GEO_SOURCE: &str = "data/geo/russia.topo.json";
pub const DEFAULT_FINANCE_SOURCE: &str = "data/finance/by-regions.json";
pub const DEFAULT_YEAR: &str = "2009";
pub const DEFAULT_REGION_KEY: &str = "OKATO";
pub const DEFAULT_OBJECT_NAME: &str = "regions";
pub const DEFAULT_OUTPUT_PATH: &str = "./output";
pub const DEFAULT_ARCHIVE_NAME: &str = "choropleth.zip";
