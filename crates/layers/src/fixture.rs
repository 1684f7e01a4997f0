//! In-process backend over static layer descriptions.
//!
//! Images are constant over an optional footprint, collections mosaic by first
//! non-null band value, and features are matched on the bounding box of their
//! GeoJSON coordinates. Any object may be told to fail every query, which is how
//! per-layer failure isolation gets exercised.

use foundation::bounds::GeoBounds;
use foundation::math::LatLon;
use serde::Deserialize;
use thiserror::Error;

use crate::layer::{LayerEntry, LayerSource};
use crate::query::{BandValues, EarthEngine, GeometryType, QueryError, Region};
use crate::registry::{LayerRegistry, RegistryError};
use crate::symbology::LayerStyle;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("invalid fixture json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FixtureImage {
    #[serde(default)]
    pub bands: BandValues,
    /// `[min_lon, min_lat, max_lon, max_lat]`; absent means global coverage.
    #[serde(default)]
    pub footprint: Option<[f64; 4]>,
    #[serde(default)]
    pub fail: Option<String>,
}

impl FixtureImage {
    /// Builds an image from a JSON object of band values; anything else yields no bands.
    pub fn new(bands: serde_json::Value) -> Self {
        let bands = match bands {
            serde_json::Value::Object(map) => map.into_iter().collect(),
            _ => BandValues::new(),
        };
        Self {
            bands,
            footprint: None,
            fail: None,
        }
    }

    pub fn with_footprint(mut self, bounds: GeoBounds) -> Self {
        self.footprint = Some([bounds.min[0], bounds.min[1], bounds.max[0], bounds.max[1]]);
        self
    }

    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.fail = Some(message.into());
        self
    }

    fn covers(&self, p: LatLon) -> bool {
        match self.footprint {
            Some([min_lon, min_lat, max_lon, max_lat]) => {
                GeoBounds::new([min_lon, min_lat], [max_lon, max_lat]).contains(p)
            }
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FixtureImageCollection {
    #[serde(default)]
    pub images: Vec<FixtureImage>,
    #[serde(default)]
    pub fail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FixtureFeature {
    #[serde(default)]
    pub id: Option<String>,
    pub geometry: serde_json::Value,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl FixtureFeature {
    pub fn point(lon: f64, lat: f64) -> Self {
        Self {
            id: None,
            geometry: serde_json::json!({"type": "Point", "coordinates": [lon, lat]}),
            properties: serde_json::Map::new(),
        }
    }

    pub fn line(coords: &[[f64; 2]]) -> Self {
        Self {
            id: None,
            geometry: serde_json::json!({"type": "LineString", "coordinates": coords}),
            properties: serde_json::Map::new(),
        }
    }

    pub fn polygon(ring: &[[f64; 2]]) -> Self {
        Self {
            id: None,
            geometry: serde_json::json!({"type": "Polygon", "coordinates": [ring]}),
            properties: serde_json::Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn geometry_type(&self) -> Option<GeometryType> {
        self.geometry
            .get("type")
            .and_then(|t| t.as_str())
            .map(GeometryType::from_name)
    }

    pub fn bounds(&self) -> Option<GeoBounds> {
        let mut positions = Vec::new();
        collect_positions(&self.geometry, &mut positions);
        GeoBounds::from_lon_lat(positions)
    }

    fn within(&self, region: &Region) -> bool {
        let Some(b) = self.bounds() else {
            return false;
        };
        match region {
            Region::Point(p) => b.contains(*p),
            Region::BBox(bbox) => b.intersects(bbox),
        }
    }
}

fn collect_positions(geometry: &serde_json::Value, out: &mut Vec<[f64; 2]>) {
    if let Some(coords) = geometry.get("coordinates") {
        collect_coordinate_array(coords, out);
    }
    if let Some(serde_json::Value::Array(parts)) = geometry.get("geometries") {
        for part in parts {
            collect_positions(part, out);
        }
    }
}

fn collect_coordinate_array(value: &serde_json::Value, out: &mut Vec<[f64; 2]>) {
    let serde_json::Value::Array(items) = value else {
        return;
    };
    if let [x, y, ..] = items.as_slice()
        && let (Some(lon), Some(lat)) = (x.as_f64(), y.as_f64())
    {
        out.push([lon, lat]);
        return;
    }
    for item in items {
        collect_coordinate_array(item, out);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FixtureFeatureCollection {
    #[serde(default)]
    pub features: Vec<FixtureFeature>,
    #[serde(default)]
    pub fail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum FixtureObject {
    Image(FixtureImage),
    ImageCollection(FixtureImageCollection),
    FeatureCollection(FixtureFeatureCollection),
    /// Result of `mosaic`; never read from JSON.
    #[serde(skip)]
    Mosaic(Vec<FixtureImage>),
}

impl FixtureObject {
    pub fn collection(images: Vec<FixtureImage>) -> Self {
        FixtureObject::ImageCollection(FixtureImageCollection { images, fail: None })
    }

    pub fn features(features: Vec<FixtureFeature>) -> Self {
        FixtureObject::FeatureCollection(FixtureFeatureCollection {
            features,
            fail: None,
        })
    }

    /// Tags the object with the layer classification the inspector dispatches on.
    pub fn classify(self) -> LayerSource<FixtureObject> {
        match self {
            FixtureObject::Image(_) | FixtureObject::Mosaic(_) => LayerSource::RasterSingle(self),
            FixtureObject::ImageCollection(_) => LayerSource::RasterCollection(self),
            FixtureObject::FeatureCollection(_) => LayerSource::VectorCollection(self),
        }
    }
}

fn fail_if_set(fail: &Option<String>) -> Result<(), QueryError> {
    match fail {
        Some(message) => Err(QueryError::Backend(message.clone())),
        None => Ok(()),
    }
}

/// A registered layer as written in a scenario file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FixtureLayer {
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    pub object: FixtureObject,
}

fn default_visible() -> bool {
    true
}

impl FixtureLayer {
    pub fn into_entry(self) -> LayerEntry<FixtureObject> {
        LayerEntry::new(self.name, self.object.classify())
            .with_style(LayerStyle::new(self.visible))
    }
}

pub fn registry_from_layers(
    layers: Vec<FixtureLayer>,
) -> Result<LayerRegistry<FixtureObject>, FixtureError> {
    let mut registry = LayerRegistry::new();
    for layer in layers {
        registry.add(layer.into_entry())?;
    }
    Ok(registry)
}

/// Parses a JSON array of layers into a registry.
pub fn registry_from_json(json: &str) -> Result<LayerRegistry<FixtureObject>, FixtureError> {
    let layers: Vec<FixtureLayer> = serde_json::from_str(json)?;
    registry_from_layers(layers)
}

/// Backend answering queries from `FixtureObject`s.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct StaticBackend;

impl EarthEngine for StaticBackend {
    type Object = FixtureObject;
    type Feature = FixtureFeature;

    fn mosaic(&self, collection: &FixtureObject) -> Result<FixtureObject, QueryError> {
        match collection {
            FixtureObject::ImageCollection(c) => {
                fail_if_set(&c.fail)?;
                Ok(FixtureObject::Mosaic(c.images.clone()))
            }
            _ => Err(QueryError::Unsupported),
        }
    }

    fn reduce_first(
        &self,
        image: &FixtureObject,
        point: LatLon,
        _scale_m: f64,
    ) -> Result<BandValues, QueryError> {
        match image {
            FixtureObject::Image(img) => {
                fail_if_set(&img.fail)?;
                if img.covers(point) {
                    Ok(img.bands.clone())
                } else {
                    Ok(BandValues::new())
                }
            }
            FixtureObject::Mosaic(images) => {
                let mut out = BandValues::new();
                for img in images.iter().filter(|img| img.covers(point)) {
                    fail_if_set(&img.fail)?;
                    for (band, value) in &img.bands {
                        let filled = out.get(band).is_some_and(|v| !v.is_null());
                        if !filled {
                            out.insert(band.clone(), value.clone());
                        }
                    }
                }
                Ok(out)
            }
            _ => Err(QueryError::Unsupported),
        }
    }

    fn first_geometry_type(
        &self,
        collection: &FixtureObject,
    ) -> Result<Option<GeometryType>, QueryError> {
        let FixtureObject::FeatureCollection(fc) = collection else {
            return Err(QueryError::Unsupported);
        };
        fail_if_set(&fc.fail)?;
        let Some(first) = fc.features.first() else {
            return Ok(None);
        };
        first
            .geometry_type()
            .map(Some)
            .ok_or_else(|| QueryError::Malformed("feature geometry has no type".to_string()))
    }

    fn filter_bounds_first(
        &self,
        collection: &FixtureObject,
        region: &Region,
    ) -> Result<Option<FixtureFeature>, QueryError> {
        let FixtureObject::FeatureCollection(fc) = collection else {
            return Err(QueryError::Unsupported);
        };
        fail_if_set(&fc.fail)?;
        Ok(fc.features.iter().find(|f| f.within(region)).cloned())
    }

    fn feature_info(&self, feature: &FixtureFeature) -> Result<serde_json::Value, QueryError> {
        let mut info = serde_json::Map::new();
        info.insert("type".to_string(), serde_json::Value::from("Feature"));
        info.insert("geometry".to_string(), feature.geometry.clone());
        if let Some(id) = &feature.id {
            info.insert("id".to_string(), serde_json::Value::from(id.as_str()));
        }
        info.insert(
            "properties".to_string(),
            serde_json::Value::Object(feature.properties.clone()),
        );
        Ok(serde_json::Value::Object(info))
    }
}

#[cfg(test)]
mod tests {
    use super::{FixtureFeature, FixtureImage, FixtureObject, StaticBackend, registry_from_json};
    use crate::layer::LayerKind;
    use crate::query::{EarthEngine, GeometryType, Region};
    use crate::symbology::LayerStyle;
    use foundation::bounds::GeoBounds;
    use foundation::math::LatLon;
    use serde_json::json;

    #[test]
    fn loads_and_classifies_layers_from_json() {
        let registry = registry_from_json(
            r#"[
                {"name": "dem", "object": {"type": "Image", "bands": {"elevation": 12.5}}},
                {"name": "l8", "visible": false,
                 "object": {"type": "ImageCollection", "images": [{"bands": {"B1": 1}}]}},
                {"name": "roads", "object": {"type": "FeatureCollection", "features": []}}
            ]"#,
        )
        .expect("registry");

        let kinds: Vec<(&str, LayerKind, bool)> = registry
            .iter()
            .map(|e| (e.name(), e.kind(), e.visible()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("dem", LayerKind::RasterSingle, true),
                ("l8", LayerKind::RasterCollection, false),
                ("roads", LayerKind::VectorCollection, true),
            ]
        );
    }

    #[test]
    fn layer_style_is_visibility_only() {
        let registry = registry_from_json(
            r#"[
                {"name": "shown", "object": {"type": "Image"}},
                {"name": "off", "visible": false, "object": {"type": "Image"}}
            ]"#,
        )
        .expect("registry");
        assert_eq!(registry.get("shown").map(|e| e.style), Some(LayerStyle::default()));
        assert_eq!(registry.get("off").map(|e| e.style), Some(LayerStyle::hidden()));
    }

    #[test]
    fn duplicate_layer_names_are_rejected() {
        let err = registry_from_json(
            r#"[
                {"name": "a", "object": {"type": "Image"}},
                {"name": "a", "object": {"type": "Image"}}
            ]"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "layer already registered: a");
    }

    #[test]
    fn footprint_limits_coverage() {
        let img = FixtureObject::Image(
            FixtureImage::new(json!({"b": 1}))
                .with_footprint(GeoBounds::new([0.0, 0.0], [1.0, 1.0])),
        );
        let inside = StaticBackend
            .reduce_first(&img, LatLon::new(0.5, 0.5), 30.0)
            .expect("inside");
        let outside = StaticBackend
            .reduce_first(&img, LatLon::new(5.0, 5.0), 30.0)
            .expect("outside");
        assert_eq!(inside.len(), 1);
        assert!(outside.is_empty());
    }

    #[test]
    fn feature_bounds_cover_nested_coordinates() {
        let f = FixtureFeature::polygon(&[[0.0, 0.0], [2.0, 0.0], [2.0, 1.0], [0.0, 0.0]]);
        let b = f.bounds().expect("bounds");
        assert_eq!(b.min, [0.0, 0.0]);
        assert_eq!(b.max, [2.0, 1.0]);
        assert_eq!(f.geometry_type(), Some(GeometryType::Polygon));
    }

    #[test]
    fn point_region_needs_exact_hit() {
        let fc = FixtureObject::features(vec![FixtureFeature::point(-122.0, 37.0)]);
        let hit = StaticBackend
            .filter_bounds_first(&fc, &Region::Point(LatLon::new(37.0, -122.0)))
            .expect("query");
        let miss = StaticBackend
            .filter_bounds_first(&fc, &Region::Point(LatLon::new(37.0001, -122.0)))
            .expect("query");
        assert!(hit.is_some());
        assert!(miss.is_none());
    }

    #[test]
    fn feature_info_matches_feature_shape() {
        let f = FixtureFeature::line(&[[-67.1, 46.2], [-67.3, 46.4]])
            .with_id("00000000000000000001")
            .with_property("mtfcc", json!("S1400"));
        let info = StaticBackend.feature_info(&f).expect("info");
        assert_eq!(info["type"], json!("Feature"));
        assert_eq!(info["id"], json!("00000000000000000001"));
        assert_eq!(info["geometry"]["type"], json!("LineString"));
        assert_eq!(info["properties"]["mtfcc"], json!("S1400"));
    }

    #[test]
    fn empty_collection_has_no_geometry_type() {
        let fc = FixtureObject::features(Vec::new());
        assert_eq!(StaticBackend.first_geometry_type(&fc).expect("query"), None);
    }
}
