use foundation::math::{CLICK_BBOX_HALF_WIDTH_DEG, LatLon, bbox_around};
use tracing::debug;

use crate::layer::{LayerEntry, LayerSource};
use crate::query::{EarthEngine, LayerOutcome, LayerSkip, Region, ResultSet, SkipReason};
use crate::registry::{LayerRegistry, LayerSelection};

/// Description of the one feature matched for a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInfo {
    pub info: serde_json::Value,
}

/// Region used to pick features around a click.
///
/// Point collections need an exact hit; anything else is matched against a box
/// of [`CLICK_BBOX_HALF_WIDTH_DEG`] around the click.
pub fn click_region(first_is_point: bool, coord: LatLon) -> Region {
    if first_is_point {
        Region::Point(coord)
    } else {
        Region::BBox(bbox_around(coord, CLICK_BBOX_HALF_WIDTH_DEG))
    }
}

/// Finds the feature under a click for each vector layer.
///
/// Failure contract matches `PointQueryEngine`: per-layer skips, never a global
/// failure. When several features match, the backend's first one wins.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectQueryEngine {
    pub selection: LayerSelection,
}

impl ObjectQueryEngine {
    pub fn new(selection: LayerSelection) -> Self {
        Self { selection }
    }

    pub fn query<B: EarthEngine>(
        &self,
        backend: &B,
        layers: &LayerRegistry<B::Object>,
        coord: LatLon,
    ) -> ResultSet<FeatureInfo> {
        let results = layers
            .select(&self.selection)
            .into_iter()
            .map(|entry| match self.match_layer(backend, entry, coord) {
                Ok(value) => Ok(LayerOutcome {
                    layer: entry.name().to_string(),
                    kind: entry.kind(),
                    value,
                }),
                Err(reason) => {
                    debug!(layer = entry.name(), %reason, "object query skipped layer");
                    Err(LayerSkip {
                        layer: entry.name().to_string(),
                        reason,
                    })
                }
            })
            .collect();
        ResultSet::new(results)
    }

    fn match_layer<B: EarthEngine>(
        &self,
        backend: &B,
        entry: &LayerEntry<B::Object>,
        coord: LatLon,
    ) -> Result<FeatureInfo, SkipReason> {
        let LayerSource::VectorCollection(collection) = entry.source() else {
            return Err(SkipReason::NotApplicable(entry.kind()));
        };

        let Some(geometry) = backend.first_geometry_type(collection)? else {
            return Err(SkipReason::NoMatch);
        };
        let region = click_region(geometry.is_point(), coord);

        let feature = backend
            .filter_bounds_first(collection, &region)?
            .ok_or(SkipReason::NoMatch)?;
        let info = backend.feature_info(&feature)?;
        Ok(FeatureInfo { info })
    }
}

#[cfg(test)]
mod tests {
    use super::{ObjectQueryEngine, click_region};
    use crate::fixture::{
        FixtureFeature, FixtureFeatureCollection, FixtureImage, FixtureObject, StaticBackend,
    };
    use crate::layer::{LayerEntry, LayerKind, LayerSource};
    use crate::query::{QueryError, Region, SkipReason};
    use crate::registry::{LayerRegistry, LayerSelection};
    use crate::symbology::LayerStyle;
    use foundation::math::LatLon;
    use serde_json::json;

    fn click() -> LatLon {
        LatLon::new(37.0, -122.0)
    }

    fn vector(name: &str, features: Vec<FixtureFeature>) -> LayerEntry<FixtureObject> {
        LayerEntry::new(
            name,
            LayerSource::VectorCollection(FixtureObject::features(features)),
        )
    }

    #[test]
    fn region_depends_on_geometry_type() {
        assert_eq!(click_region(true, click()), Region::Point(click()));
        let Region::BBox(b) = click_region(false, click()) else {
            panic!("expected a box");
        };
        assert!((b.max[0] - b.min[0] - 0.01).abs() < 1e-9);
        assert!(b.contains(click()));
    }

    #[test]
    fn polygon_near_click_is_matched_by_box() {
        // Polygon whose nearest corner sits 0.004 degrees east of the click.
        let parcel = FixtureFeature::polygon(&[
            [-121.996, 36.99],
            [-121.98, 36.99],
            [-121.98, 37.01],
            [-121.996, 36.99],
        ])
        .with_id("parcel-1")
        .with_property("owner", json!("county"));
        let far = FixtureFeature::polygon(&[[-121.0, 36.0], [-120.9, 36.0], [-120.9, 36.1]]);

        let mut layers = LayerRegistry::new();
        layers
            .add(vector("parcels", vec![far, parcel]))
            .expect("add");

        let set = ObjectQueryEngine::new(LayerSelection::visible()).query(
            &StaticBackend,
            &layers,
            click(),
        );
        let parcels = set.outcome("parcels").expect("matched");
        assert_eq!(parcels.kind, LayerKind::VectorCollection);
        assert_eq!(parcels.value.info["id"], json!("parcel-1"));
        assert_eq!(parcels.value.info["properties"]["owner"], json!("county"));
    }

    #[test]
    fn point_collections_need_exact_hit() {
        let mut layers = LayerRegistry::new();
        layers
            .add(vector("wells", vec![FixtureFeature::point(-122.001, 37.0)]))
            .expect("add");

        let set = ObjectQueryEngine::new(LayerSelection::visible()).query(
            &StaticBackend,
            &layers,
            click(),
        );
        assert!(!set.has_outcomes());
        assert_eq!(set.skipped().next().map(|s| &s.reason), Some(&SkipReason::NoMatch));

        let hit = ObjectQueryEngine::new(LayerSelection::visible()).query(
            &StaticBackend,
            &layers,
            LatLon::new(37.0, -122.001),
        );
        assert!(hit.outcome("wells").is_some());
    }

    #[test]
    fn first_matching_feature_wins() {
        let a = FixtureFeature::point(-122.0, 37.0).with_id("a");
        let b = FixtureFeature::point(-122.0, 37.0).with_id("b");
        let mut layers = LayerRegistry::new();
        layers.add(vector("pts", vec![a, b])).expect("add");

        let set = ObjectQueryEngine::new(LayerSelection::visible()).query(
            &StaticBackend,
            &layers,
            click(),
        );
        assert_eq!(set.outcome("pts").map(|o| o.value.info["id"].clone()), Some(json!("a")));
    }

    #[test]
    fn failures_and_rasters_are_isolated() {
        let mut layers = LayerRegistry::new();
        layers
            .add(LayerEntry::new(
                "broken",
                LayerSource::VectorCollection(FixtureObject::FeatureCollection(
                    FixtureFeatureCollection {
                        features: vec![FixtureFeature::point(-122.0, 37.0)],
                        fail: Some("timeout".to_string()),
                    },
                )),
            ))
            .expect("add broken");
        layers
            .add(LayerEntry::new(
                "dem",
                LayerSource::RasterSingle(FixtureObject::Image(FixtureImage::new(
                    json!({"e": 1}),
                ))),
            ))
            .expect("add dem");
        layers
            .add(vector("ok", vec![FixtureFeature::point(-122.0, 37.0)]))
            .expect("add ok");
        layers
            .add(
                vector("hidden", vec![FixtureFeature::point(-122.0, 37.0)])
                    .with_style(LayerStyle::hidden()),
            )
            .expect("add hidden");

        let set = ObjectQueryEngine::new(LayerSelection::visible()).query(
            &StaticBackend,
            &layers,
            click(),
        );
        let reported: Vec<&str> = set.outcomes().map(|o| o.layer.as_str()).collect();
        assert_eq!(reported, vec!["ok"]);

        let reasons: Vec<(&str, &SkipReason)> = set
            .skipped()
            .map(|s| (s.layer.as_str(), &s.reason))
            .collect();
        assert_eq!(
            reasons,
            vec![
                (
                    "broken",
                    &SkipReason::Failed(QueryError::Backend("timeout".to_string()))
                ),
                ("dem", &SkipReason::NotApplicable(LayerKind::RasterSingle)),
            ]
        );

        let with_hidden = ObjectQueryEngine::new(LayerSelection::all()).query(
            &StaticBackend,
            &layers,
            click(),
        );
        assert!(with_hidden.outcome("hidden").is_some());
    }

    #[test]
    fn empty_collection_is_a_miss() {
        let mut layers = LayerRegistry::new();
        layers.add(vector("empty", Vec::new())).expect("add");
        let set = ObjectQueryEngine::new(LayerSelection::visible()).query(
            &StaticBackend,
            &layers,
            click(),
        );
        assert_eq!(set.skipped().next().map(|s| &s.reason), Some(&SkipReason::NoMatch));
    }
}
