use httpmock::prelude::*;
use investment_map::{ChoroplethPipeline, CliConfig, LocalStorage, MapEngine, MapError};
use tempfile::TempDir;

const GEOJSON: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {"type": "Feature", "properties": {"OKATO": 45},
         "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}},
        {"type": "Feature", "properties": {"OKATO": 46}, "geometry": null}
    ]
}"#;

const FINANCE: &str = r#"{"Years": [{"Year": "2009", "Regions": [
    {"OKATO": 45, "Receive": 7, "Invest": 2, "Delta": -5}
]}]}"#;

fn cli_config(geo: String, finance: String, output_path: &str) -> CliConfig {
    CliConfig {
        geo_source: geo,
        finance_source: finance,
        year: "2009".to_string(),
        all_years: false,
        region_key: "OKATO".to_string(),
        object_name: "regions".to_string(),
        color_high: "#d73027".to_string(),
        color_mid: "#fee08b".to_string(),
        color_low: "#1a9850".to_string(),
        output_path: output_path.to_string(),
        archive_name: "choropleth.zip".to_string(),
        verbose: false,
        monitor: false,
    }
}

#[tokio::test]
async fn test_end_to_end_with_http_sources() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start_async().await;
    let geo_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/geo/russia.topo.json");
            then.status(200)
                .header("Content-Type", "application/json")
                .body(GEOJSON);
        })
        .await;
    let finance_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/finance/by-regions.json");
            then.status(200)
                .header("Content-Type", "application/json")
                .body(FINANCE);
        })
        .await;

    let config = cli_config(
        server.url("/geo/russia.topo.json"),
        server.url("/finance/by-regions.json"),
        &output_path,
    );
    let pipeline = ChoroplethPipeline::new(LocalStorage::new(output_path.clone()), config);
    let engine = MapEngine::new_with_monitoring(pipeline, true);

    let result = engine.run().await;

    geo_mock.assert_async().await;
    finance_mock.assert_async().await;
    assert!(result.is_ok());

    let zip_data = std::fs::read(temp_dir.path().join("choropleth.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    let mut csv_file = archive.by_name("regions_2009.csv").unwrap();
    let mut csv_content = String::new();
    std::io::Read::read_to_string(&mut csv_file, &mut csv_content).unwrap();

    assert!(csv_content.contains("45,7.0,-2.0,-5.0,#1a9850,true"));
    assert!(csv_content.contains("46,0.0,"));
}

#[tokio::test]
async fn test_failed_finance_fetch_aborts_render() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/geo.json");
            then.status(200).body(GEOJSON);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/finance.json");
            then.status(500);
        })
        .await;

    let config = cli_config(server.url("/geo.json"), server.url("/finance.json"), &output_path);
    let pipeline = ChoroplethPipeline::new(LocalStorage::new(output_path.clone()), config);
    let engine = MapEngine::new(pipeline);

    let err = engine.run().await.unwrap_err();

    assert!(matches!(err, MapError::FetchFailure { .. }));
    assert!(!temp_dir.path().join("choropleth.zip").exists());
}

#[tokio::test]
async fn test_failed_geo_fetch_aborts_render() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/finance.json");
            then.status(200).body(FINANCE);
        })
        .await;

    // nothing is mocked for the geo path, so the server answers 404
    let config = cli_config(server.url("/geo.json"), server.url("/finance.json"), &output_path);
    let pipeline = ChoroplethPipeline::new(LocalStorage::new(output_path.clone()), config);

    let err = MapEngine::new(pipeline).run().await.unwrap_err();

    match err {
        MapError::FetchFailure { resource, .. } => assert!(resource.contains("geo.json")),
        other => panic!("expected fetch failure, got {:?}", other),
    }
    assert!(!temp_dir.path().join("choropleth.zip").exists());
}
