use anyhow::Context;
use clap::Parser;
use investment_map::core::loader::{load_inputs, DataSource};
use investment_map::core::ConfigProvider;
use investment_map::utils::{logger, validation::Validate};
use investment_map::{render_year, ChoroplethPipeline, LocalStorage, MapEngine, TomlConfig, Year};

#[derive(Parser)]
#[command(name = "toml-map")]
#[command(about = "Renders map data using a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "map-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Override the year from config
    #[arg(long)]
    year: Option<String>,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Load data and report scale domains without writing output
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based map renderer");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;

    // 應用命令列覆蓋設定
    if let Some(year) = &args.year {
        config.render.year = year.clone();
        config.render.all_years = false;
        tracing::info!("🔧 Year overridden to: {}", year);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No output will be written");
        return perform_dry_run(&config).await;
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = ChoroplethPipeline::new(storage, config);
    let engine = MapEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Map data rendered successfully!");
            println!("📁 Output saved to: {}", output_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Render failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            Err(anyhow::anyhow!(e.user_friendly_message()))
        }
    }
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Configuration Summary:");
    tracing::info!("  Map: {}", config.name());
    tracing::info!("  Geo source: {}", config.geo_source());
    tracing::info!("  Finance source: {}", config.finance_source());
    if config.all_years() {
        tracing::info!("  Years: all");
    } else {
        tracing::info!("  Year: {}", config.year());
    }
    tracing::info!(
        "  Output: {}/{}",
        config.output_path(),
        config.archive_name()
    );
}

async fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let geo = DataSource::parse(config.geo_source())?;
    let finance = DataSource::parse(config.finance_source())?;

    let inputs = load_inputs(
        &client,
        &geo,
        &finance,
        config.object_name(),
        config.region_key(),
    )
    .await?;

    let years: Vec<Year> = if config.all_years() {
        inputs.dataset.years().cloned().collect()
    } else {
        vec![config.year()]
    };

    let palette = config.palette()?;
    for year in &years {
        let rendered = render_year(&inputs.regions, &inputs.dataset, year, palette)?;
        println!(
            "{}: {} regions ({} without data), domain [{}, 0, {}]",
            year,
            rendered.regions.len(),
            rendered.unmatched(),
            rendered.domain.max,
            rendered.domain.min
        );
    }

    Ok(())
}
