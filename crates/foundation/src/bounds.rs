use crate::math::LatLon;

/// Axis-aligned lon/lat box in degrees.
///
/// `min` and `max` are `[lon, lat]` pairs. Edges are inclusive.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoBounds {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl GeoBounds {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        GeoBounds { min, max }
    }

    /// Degenerate box covering a single point.
    pub fn point(p: LatLon) -> Self {
        let lon_lat = p.lon_lat();
        GeoBounds::new(lon_lat, lon_lat)
    }

    /// Smallest box covering every `[lon, lat]` pair, or `None` for an empty input.
    pub fn from_lon_lat<I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = [f64; 2]>,
    {
        let mut it = coords.into_iter();
        let first = it.next()?;
        let mut out = GeoBounds::new(first, first);
        for [lon, lat] in it {
            out.min[0] = out.min[0].min(lon);
            out.min[1] = out.min[1].min(lat);
            out.max[0] = out.max[0].max(lon);
            out.max[1] = out.max[1].max(lat);
        }
        Some(out)
    }

    pub fn contains(&self, p: LatLon) -> bool {
        p.lon >= self.min[0] && p.lon <= self.max[0] && p.lat >= self.min[1] && p.lat <= self.max[1]
    }

    pub fn intersects(&self, other: &GeoBounds) -> bool {
        !(other.max[0] < self.min[0]
            || other.min[0] > self.max[0]
            || other.max[1] < self.min[1]
            || other.min[1] > self.max[1])
    }

    pub fn center(&self) -> LatLon {
        LatLon::new(
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[0] + self.max[0]) * 0.5,
        )
    }
}
