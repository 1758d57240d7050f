use crate::core::color_scale::{DivergingColorScale, Palette};
use crate::core::finance_index::RegionFinanceIndex;
use crate::domain::model::{
    EnrichedRegion, GeoRegion, RegionFigures, RenderedYear, Year, YearlyFinanceDataset,
};
use crate::utils::error::Result;
use serde_json::{json, Value};
use std::sync::Arc;

pub const RECEIVE_FIELD: &str = "receive";
pub const INVEST_FIELD: &str = "invest";
pub const DELTA_FIELD: &str = "delta";
pub const FILL_FIELD: &str = "fill";

/// Joins geo regions with one year's finance figures and resolves fills.
///
/// Each call produces fresh [`EnrichedRegion`] views; the source regions are
/// only read, and their geometry is shared rather than copied.
pub struct ChoroplethBinder<'a> {
    index: &'a RegionFinanceIndex,
    scale: &'a DivergingColorScale,
}

impl<'a> ChoroplethBinder<'a> {
    pub fn new(index: &'a RegionFinanceIndex, scale: &'a DivergingColorScale) -> Self {
        Self { index, scale }
    }

    /// Enriches every region, keeping input order.
    pub fn bind(&self, regions: &[GeoRegion]) -> Vec<EnrichedRegion> {
        regions.iter().map(|region| self.bind_one(region)).collect()
    }

    pub fn bind_one(&self, region: &GeoRegion) -> EnrichedRegion {
        let matched = self.index.contains(&region.region_code);
        let info = self.index.get(&region.region_code);

        let figures = RegionFigures {
            receive: info.receive,
            invest: -info.invest,
            delta: info.delta,
        };
        let fill = self.scale.color(info.delta);

        let mut properties = region.properties.clone();
        properties.insert(RECEIVE_FIELD.to_string(), number(figures.receive));
        properties.insert(INVEST_FIELD.to_string(), number(figures.invest));
        properties.insert(DELTA_FIELD.to_string(), number(figures.delta));
        properties.insert(FILL_FIELD.to_string(), json!(fill.to_hex()));

        EnrichedRegion {
            region_code: region.region_code.clone(),
            geometry: Arc::clone(&region.geometry),
            properties,
            figures,
            fill,
            matched,
        }
    }
}

// JSON has no NaN or infinity.
fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Runs index, scale and binding for one year, from scratch.
pub fn render_year(
    regions: &[GeoRegion],
    dataset: &YearlyFinanceDataset,
    year: &Year,
    palette: Palette,
) -> Result<RenderedYear> {
    let records = dataset.records_for(year)?;
    let index = RegionFinanceIndex::from_records(records);
    let scale = DivergingColorScale::with_palette(records, palette);
    let domain = scale.domain();

    tracing::debug!(
        "Year {}: {} finance records, domain [{}, {}, {}]",
        year,
        index.len(),
        domain.max,
        domain.zero,
        domain.min
    );

    let enriched = ChoroplethBinder::new(&index, &scale).bind(regions);
    let rendered = RenderedYear {
        year: year.clone(),
        domain,
        regions: enriched,
    };

    let unmatched = rendered.unmatched();
    if unmatched > 0 {
        tracing::warn!(
            "Year {}: {} of {} regions have no finance record, rendered neutral",
            year,
            unmatched,
            rendered.regions.len()
        );
    }

    Ok(rendered)
}
