use crate::core::binder::render_year;
use crate::core::loader::{load_inputs, DataSource};
use crate::core::{ConfigProvider, MapInputs, Pipeline, RenderResult, RenderedYear, Storage};
use crate::domain::model::{ScaleDomain, Year};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub struct ChoroplethPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> ChoroplethPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }

    /// Years rendered in this pass: the configured one, or every dataset year.
    fn selected_years(&self, inputs: &MapInputs) -> Vec<Year> {
        if self.config.all_years() {
            let mut years: Vec<Year> = Vec::new();
            for year in inputs.dataset.years() {
                if !years.contains(year) {
                    years.push(year.clone());
                }
            }
            years
        } else {
            vec![self.config.year()]
        }
    }
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    code: &'a str,
    receive: f64,
    invest: f64,
    delta: f64,
    fill: String,
    matched: bool,
}

#[derive(Debug, Serialize)]
struct YearSummary<'a> {
    year: &'a Year,
    domain: ScaleDomain,
    regions: usize,
    unmatched: usize,
    geojson: String,
    csv: String,
}

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    generated_at: DateTime<Utc>,
    region_key: &'a str,
    years: Vec<YearSummary<'a>>,
}

fn geojson_name(year: &Year) -> String {
    format!("regions_{}.geojson", year)
}

fn csv_name(year: &Year) -> String {
    format!("regions_{}.csv", year)
}

/// Renderer handoff: one GeoJSON feature per enriched region, in bind order.
pub fn feature_collection(rendered: &RenderedYear) -> Result<Value> {
    let features = rendered
        .regions
        .iter()
        .map(|region| -> Result<Value> {
            let mut properties = region.properties.clone();
            properties.insert("matched".to_string(), json!(region.matched));
            Ok(json!({
                "type": "Feature",
                "id": region.region_code,
                "properties": properties,
                "geometry": region.geometry.to_geojson()?,
            }))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(json!({
        "type": "FeatureCollection",
        "year": rendered.year,
        "features": features,
    }))
}

pub fn regions_csv(rendered: &RenderedYear) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for region in &rendered.regions {
        writer.serialize(CsvRow {
            code: &region.region_code,
            receive: region.figures.receive,
            invest: region.figures.invest,
            delta: region.figures.delta,
            fill: region.fill.to_hex(),
            matched: region.matched,
        })?;
    }
    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error().into())
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ChoroplethPipeline<S, C> {
    async fn extract(&self) -> Result<MapInputs> {
        let geo = DataSource::parse(self.config.geo_source())?;
        let finance = DataSource::parse(self.config.finance_source())?;

        tracing::debug!("Loading geo data from {} and finance data from {}", geo, finance);
        load_inputs(
            &self.client,
            &geo,
            &finance,
            self.config.object_name(),
            self.config.region_key(),
        )
        .await
    }

    async fn transform(&self, inputs: MapInputs) -> Result<RenderResult> {
        let palette = self.config.palette()?;
        let years = self.selected_years(&inputs);

        // every selected year must resolve before anything is handed on
        let mut rendered = Vec::with_capacity(years.len());
        for year in &years {
            let pass = render_year(&inputs.regions, &inputs.dataset, year, palette)?;
            tracing::info!(
                "Year {}: bound {} regions, domain [{}, 0, {}]",
                year,
                pass.regions.len(),
                pass.domain.max,
                pass.domain.min
            );
            rendered.push(pass);
        }

        Ok(RenderResult {
            region_key: self.config.region_key().to_string(),
            years: rendered,
        })
    }

    async fn load(&self, result: RenderResult) -> Result<String> {
        let archive_name = self.config.archive_name();
        let output_path = format!("{}/{}", self.config.output_path(), archive_name);

        tracing::debug!("Creating ZIP file with {} years", result.years.len());

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            let mut summaries = Vec::with_capacity(result.years.len());

            for rendered in &result.years {
                let geojson = geojson_name(&rendered.year);
                zip.start_file::<_, ()>(geojson.as_str(), FileOptions::default())?;
                let collection = feature_collection(rendered)?;
                zip.write_all(serde_json::to_string(&collection)?.as_bytes())?;

                let csv = csv_name(&rendered.year);
                zip.start_file::<_, ()>(csv.as_str(), FileOptions::default())?;
                zip.write_all(&regions_csv(rendered)?)?;

                summaries.push(YearSummary {
                    year: &rendered.year,
                    domain: rendered.domain,
                    regions: rendered.regions.len(),
                    unmatched: rendered.unmatched(),
                    geojson,
                    csv,
                });
            }

            let manifest = Manifest {
                generated_at: Utc::now(),
                region_key: &result.region_key,
                years: summaries,
            };
            zip.start_file::<_, ()>("manifest.json", FileOptions::default())?;
            zip.write_all(serde_json::to_string_pretty(&manifest)?.as_bytes())?;

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(archive_name, &zip_data).await?;

        Ok(output_path)
    }
}
