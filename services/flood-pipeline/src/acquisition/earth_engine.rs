//! Google Earth Engine REST backend.
//!
//! A layer request is compiled into an Earth Engine expression graph, posted
//! as a GeoTIFF thumbnail request, and the resulting `getPixels` URL is
//! streamed to disk.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use flood_common::{AreaOfInterest, CrsCode, FloodError, FloodResult};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::download::DownloadManager;
use super::RasterSource;
use crate::config::{EarthEngineSettings, LayerSpec, Reducer};

/// Metadata property holding scene cloud cover on Sentinel-2 products.
const CLOUD_PROPERTY: &str = "CLOUDY_PIXEL_PERCENTAGE";

/// `{"constantValue": v}`
fn constant(value: impl Into<Value>) -> Value {
    json!({ "constantValue": value.into() })
}

/// `{"functionInvocationValue": {"functionName": f, "arguments": args}}`
fn invoke(function: &str, arguments: Value) -> Value {
    json!({
        "functionInvocationValue": {
            "functionName": function,
            "arguments": arguments,
        }
    })
}

fn polygon(aoi: &AreaOfInterest) -> Value {
    invoke(
        "GeometryConstructors.Polygon",
        json!({
            "coordinates": constant(json!(aoi.coordinates())),
            "evenOdd": constant(true),
        }),
    )
}

/// Build the expression graph that yields the clipped single-band image.
pub fn build_expression(layer: &LayerSpec, aoi: &AreaOfInterest) -> Value {
    let geometry = polygon(aoi);

    let mut image = if layer.collection {
        let mut collection = invoke(
            "ImageCollection.load",
            json!({ "id": constant(layer.dataset.as_str()) }),
        );

        let mut filters = vec![invoke(
            "Filter.intersects",
            json!({
                "leftField": constant(".all"),
                "rightValue": geometry.clone(),
            }),
        )];
        if let Some(range) = &layer.date_range {
            filters.push(invoke(
                "Filter.dateRangeContains",
                json!({
                    "leftValue": invoke(
                        "DateRange",
                        json!({
                            "start": constant(range.start.to_string()),
                            "end": constant(range.end.to_string()),
                        }),
                    ),
                    "rightField": constant("system:time_start"),
                }),
            ));
        }
        if let Some(max_cloud) = layer.cloud_cover_max {
            filters.push(invoke(
                "Filter.lessThan",
                json!({
                    "leftField": constant(CLOUD_PROPERTY),
                    "rightValue": constant(max_cloud),
                }),
            ));
        }

        for filter in filters {
            collection = invoke(
                "Collection.filter",
                json!({ "collection": collection, "filter": filter }),
            );
        }

        match layer.reducer {
            Reducer::Median => invoke("reduce.median", json!({ "collection": collection })),
            Reducer::Mean => invoke("reduce.mean", json!({ "collection": collection })),
            Reducer::None => invoke("ImageCollection.mosaic", json!({ "collection": collection })),
        }
    } else {
        invoke("Image.load", json!({ "id": constant(layer.dataset.as_str()) }))
    };

    if let Some([a, b]) = &layer.normalized_difference {
        image = invoke(
            "Image.normalizedDifference",
            json!({
                "input": image,
                "bandNames": constant(json!([a, b])),
            }),
        );
    }
    if let Some(name) = &layer.band_name {
        image = invoke(
            "Image.rename",
            json!({ "input": image, "names": constant(json!([name])) }),
        );
    }

    image = invoke(
        "Image.clip",
        json!({ "input": image, "geometry": geometry.clone() }),
    );

    invoke(
        "Image.clipToBoundsAndScale",
        json!({
            "input": image,
            "geometry": geometry,
            "scale": constant(layer.scale),
        }),
    )
}

/// Body of the thumbnail request for a GeoTIFF download.
pub fn thumbnail_request(layer: &LayerSpec, aoi: &AreaOfInterest, crs: CrsCode) -> Value {
    json!({
        "expression": {
            "result": "0",
            "values": { "0": build_expression(layer, aoi) },
        },
        "fileFormat": "GEO_TIFF",
        "grid": { "crsCode": crs.to_string() },
    })
}

#[derive(Debug, Deserialize)]
struct ThumbnailResponse {
    name: String,
}

/// Earth Engine REST client.
pub struct EarthEngineSource {
    settings: EarthEngineSettings,
    access_token: String,
    downloader: DownloadManager,
}

impl EarthEngineSource {
    pub fn new(
        settings: EarthEngineSettings,
        access_token: impl Into<String>,
        downloader: DownloadManager,
    ) -> Self {
        Self {
            settings,
            access_token: access_token.into(),
            downloader,
        }
    }

    fn thumbnails_url(&self) -> String {
        format!(
            "{}/projects/{}/thumbnails",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.project
        )
    }

    fn pixels_url(&self, name: &str) -> String {
        format!(
            "{}/{}:getPixels",
            self.settings.api_base.trim_end_matches('/'),
            name
        )
    }

    async fn fetch_inner(
        &self,
        layer: &LayerSpec,
        aoi: &AreaOfInterest,
        crs: CrsCode,
        dest: &Path,
    ) -> anyhow::Result<PathBuf> {
        let body = thumbnail_request(layer, aoi, crs);

        let response = self
            .downloader
            .client()
            .post(self.thumbnails_url())
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .context("thumbnail request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(300).collect();
            return Err(anyhow!("thumbnail request returned {}: {}", status, snippet));
        }

        let thumbnail: ThumbnailResponse = response
            .json()
            .await
            .context("unexpected thumbnail response")?;

        self.downloader
            .download(
                &self.pixels_url(&thumbnail.name),
                Some(&self.access_token),
                dest,
            )
            .await?;

        Ok(dest.to_path_buf())
    }
}

#[async_trait]
impl RasterSource for EarthEngineSource {
    fn name(&self) -> &str {
        "earth-engine"
    }

    #[instrument(skip_all, fields(layer = %layer.kind, dataset = %layer.dataset))]
    async fn fetch(
        &self,
        layer: &LayerSpec,
        aoi: &AreaOfInterest,
        crs: CrsCode,
        dest: &Path,
    ) -> FloodResult<PathBuf> {
        info!(scale = layer.scale, "Requesting layer from Earth Engine");
        self.fetch_inner(layer, aoi, crs, dest)
            .await
            .map_err(|e| FloodError::acquisition(layer.kind.label(), format!("{:#}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayerSpecs;

    fn function_names(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::Object(map) => {
                if let Some(name) = map.get("functionName").and_then(Value::as_str) {
                    out.push(name.to_string());
                }
                map.values().for_each(|v| function_names(v, out));
            }
            Value::Array(items) => items.iter().for_each(|v| function_names(v, out)),
            _ => {}
        }
    }

    fn names_for(layer: &LayerSpec) -> Vec<String> {
        let mut names = Vec::new();
        function_names(&build_expression(layer, &AreaOfInterest::grenada()), &mut names);
        names
    }

    #[test]
    fn test_water_expression() {
        let names = names_for(&LayerSpecs::default().water);
        for expected in [
            "ImageCollection.load",
            "Collection.filter",
            "Filter.intersects",
            "Filter.dateRangeContains",
            "Filter.lessThan",
            "reduce.median",
            "Image.normalizedDifference",
            "Image.rename",
            "Image.clip",
            "Image.clipToBoundsAndScale",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_elevation_expression_loads_single_image() {
        let names = names_for(&LayerSpecs::default().elevation);
        assert!(names.iter().any(|n| n == "Image.load"));
        assert!(!names.iter().any(|n| n == "ImageCollection.load"));
        assert!(!names.iter().any(|n| n == "Image.normalizedDifference"));
    }

    #[test]
    fn test_population_expression_uses_mean() {
        let names = names_for(&LayerSpecs::default().population);
        assert!(names.iter().any(|n| n == "reduce.mean"));
        assert!(!names.iter().any(|n| n == "Filter.lessThan"));
    }

    #[test]
    fn test_thumbnail_request_shape() {
        let body = thumbnail_request(
            &LayerSpecs::default().elevation,
            &AreaOfInterest::grenada(),
            CrsCode::Epsg4326,
        );
        assert_eq!(body["fileFormat"], "GEO_TIFF");
        assert_eq!(body["grid"]["crsCode"], "EPSG:4326");
        let root = &body["expression"]["values"]["0"]["functionInvocationValue"];
        assert_eq!(root["functionName"], "Image.clipToBoundsAndScale");
        assert_eq!(root["arguments"]["scale"]["constantValue"], 30.0);
    }

    #[test]
    fn test_dates_and_bands_are_constants() {
        let text = build_expression(&LayerSpecs::default().water, &AreaOfInterest::grenada())
            .to_string();
        assert!(text.contains("\"2023-01-01\""));
        assert!(text.contains("\"2023-12-31\""));
        assert!(text.contains("[\"B3\",\"B8\"]"));
        assert!(text.contains("CLOUDY_PIXEL_PERCENTAGE"));
        assert!(text.contains("[-61.8,12.0]"));
    }

    #[test]
    fn test_urls() {
        let source = EarthEngineSource::new(
            EarthEngineSettings {
                project: "demo".to_string(),
                api_base: "https://ee.example/v1/".to_string(),
            },
            "token",
            DownloadManager::new(Default::default()).unwrap(),
        );
        assert_eq!(source.thumbnails_url(), "https://ee.example/v1/projects/demo/thumbnails");
        assert_eq!(
            source.pixels_url("projects/demo/thumbnails/abc"),
            "https://ee.example/v1/projects/demo/thumbnails/abc:getPixels"
        );
    }
}
