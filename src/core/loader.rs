use crate::core::topology::regions_from_slice;
use crate::domain::model::{MapInputs, YearlyFinanceDataset};
use crate::utils::error::{MapError, Result};
use reqwest::Client;
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Where an input document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Http(Url),
    File(PathBuf),
}

impl DataSource {
    pub fn parse(source: &str) -> Result<Self> {
        let trimmed = source.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            let url = Url::parse(trimmed).map_err(|e| MapError::InvalidConfigValueError {
                field: "source".to_string(),
                value: source.to_string(),
                reason: format!("Invalid URL format: {}", e),
            })?;
            Ok(DataSource::Http(url))
        } else {
            Ok(DataSource::File(PathBuf::from(trimmed)))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Http(url) => write!(f, "{}", url),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

pub async fn fetch_bytes(client: &Client, source: &DataSource) -> Result<Vec<u8>> {
    tracing::debug!("Fetching {}", source);
    let bytes = match source {
        DataSource::Http(url) => {
            let response = client.get(url.clone()).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(MapError::FetchFailure {
                    resource: source.to_string(),
                    message: format!("HTTP status {}", status),
                });
            }
            response.bytes().await?.to_vec()
        }
        DataSource::File(path) => tokio::fs::read(path).await?,
    };
    tracing::debug!("Fetched {} bytes from {}", bytes.len(), source);
    Ok(bytes)
}

/// Any fetch error becomes a [`MapError::FetchFailure`] naming the source.
async fn fetch_labeled(client: &Client, label: &str, source: &DataSource) -> Result<Vec<u8>> {
    fetch_bytes(client, source).await.map_err(|e| match e {
        failure @ MapError::FetchFailure { .. } => failure,
        other => MapError::FetchFailure {
            resource: format!("{} ({})", label, source),
            message: other.to_string(),
        },
    })
}

/// Fetches geo and finance data concurrently and parses them once both arrived.
///
/// The first failing fetch drops the other one; nothing is parsed in that case.
pub async fn load_inputs(
    client: &Client,
    geo: &DataSource,
    finance: &DataSource,
    object_name: &str,
    region_key: &str,
) -> Result<MapInputs> {
    let (geo_bytes, finance_bytes) = tokio::try_join!(
        fetch_labeled(client, "geo data", geo),
        fetch_labeled(client, "finance data", finance),
    )?;

    let regions = regions_from_slice(&geo_bytes, object_name, region_key)?;
    let dataset = YearlyFinanceDataset::from_slice(&finance_bytes)?;

    tracing::info!(
        "Loaded {} regions and {} finance years",
        regions.len(),
        dataset.years.len()
    );

    Ok(MapInputs { regions, dataset })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const GEO: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"OKATO": "45"}, "geometry": null}
    ]}"#;
    const FINANCE: &str = r#"{"Years": [{"Year": 2009, "Regions": [
        {"Code": "45", "Receive": 100, "Invest": 40, "Delta": -60}
    ]}]}"#;

    #[test]
    fn test_parse_source_kinds() {
        assert!(matches!(
            DataSource::parse("https://example.com/geo.json").unwrap(),
            DataSource::Http(_)
        ));
        assert_eq!(
            DataSource::parse("data/geo/russia.topo.json").unwrap(),
            DataSource::File(PathBuf::from("data/geo/russia.topo.json"))
        );
        assert!(DataSource::parse("http://").is_err());
    }

    #[tokio::test]
    async fn test_load_inputs_from_files() {
        let mut geo = NamedTempFile::new().unwrap();
        geo.write_all(GEO.as_bytes()).unwrap();
        let mut finance = NamedTempFile::new().unwrap();
        finance.write_all(FINANCE.as_bytes()).unwrap();

        let inputs = load_inputs(
            &Client::new(),
            &DataSource::File(geo.path().to_path_buf()),
            &DataSource::File(finance.path().to_path_buf()),
            "regions",
            "OKATO",
        )
        .await
        .unwrap();

        assert_eq!(inputs.regions.len(), 1);
        assert_eq!(inputs.dataset.years.len(), 1);
    }

    #[tokio::test]
    async fn test_load_inputs_over_http() {
        let server = MockServer::start_async().await;
        let geo_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/geo.json");
                then.status(200).body(GEO);
            })
            .await;
        let finance_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/finance.json");
                then.status(200).body(FINANCE);
            })
            .await;

        let inputs = load_inputs(
            &Client::new(),
            &DataSource::parse(&server.url("/geo.json")).unwrap(),
            &DataSource::parse(&server.url("/finance.json")).unwrap(),
            "regions",
            "OKATO",
        )
        .await
        .unwrap();

        geo_mock.assert_async().await;
        finance_mock.assert_async().await;
        assert_eq!(inputs.regions[0].region_code, "45");
    }

    #[tokio::test]
    async fn test_http_error_status_is_fetch_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/finance.json");
                then.status(404);
            })
            .await;

        let source = DataSource::parse(&server.url("/finance.json")).unwrap();
        let err = fetch_bytes(&Client::new(), &source).await.unwrap_err();
        assert!(matches!(err, MapError::FetchFailure { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_aborts_whole_load() {
        let mut geo = NamedTempFile::new().unwrap();
        geo.write_all(GEO.as_bytes()).unwrap();

        let err = load_inputs(
            &Client::new(),
            &DataSource::File(geo.path().to_path_buf()),
            &DataSource::File(PathBuf::from("/definitely/missing/by-regions.json")),
            "regions",
            "OKATO",
        )
        .await
        .unwrap_err();

        match err {
            MapError::FetchFailure { resource, .. } => assert!(resource.contains("finance data")),
            other => panic!("expected fetch failure, got {:?}", other),
        }
    }
}
