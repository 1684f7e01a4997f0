use crate::symbology::LayerStyle;

/// Closed classification of what a registered layer holds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LayerKind {
    RasterSingle,
    RasterCollection,
    VectorCollection,
}

impl LayerKind {
    /// Backend type name shown next to pixel results.
    pub fn type_name(self) -> &'static str {
        match self {
            LayerKind::RasterSingle => "Image",
            LayerKind::RasterCollection => "ImageCollection",
            LayerKind::VectorCollection => "FeatureCollection",
        }
    }

    pub fn is_raster(self) -> bool {
        matches!(self, LayerKind::RasterSingle | LayerKind::RasterCollection)
    }
}

/// A backend object tagged with its classification.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerSource<O> {
    RasterSingle(O),
    RasterCollection(O),
    VectorCollection(O),
}

impl<O> LayerSource<O> {
    pub fn kind(&self) -> LayerKind {
        match self {
            LayerSource::RasterSingle(_) => LayerKind::RasterSingle,
            LayerSource::RasterCollection(_) => LayerKind::RasterCollection,
            LayerSource::VectorCollection(_) => LayerKind::VectorCollection,
        }
    }

    pub fn object(&self) -> &O {
        match self {
            LayerSource::RasterSingle(o)
            | LayerSource::RasterCollection(o)
            | LayerSource::VectorCollection(o) => o,
        }
    }
}

/// A named layer registered on the host map.
///
/// The inspector only ever reads entries; the host map owns their lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerEntry<O> {
    name: String,
    source: LayerSource<O>,
    pub style: LayerStyle,
}

impl<O> LayerEntry<O> {
    pub fn new(name: impl Into<String>, source: LayerSource<O>) -> Self {
        Self {
            name: name.into(),
            source,
            style: LayerStyle::default(),
        }
    }

    pub fn with_style(mut self, style: LayerStyle) -> Self {
        self.style = style;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &LayerSource<O> {
        &self.source
    }

    pub fn kind(&self) -> LayerKind {
        self.source.kind()
    }

    pub fn visible(&self) -> bool {
        self.style.visible
    }
}

#[cfg(test)]
mod tests {
    use super::{LayerEntry, LayerKind, LayerSource};
    use crate::symbology::LayerStyle;

    #[test]
    fn kind_follows_source_variant() {
        let e = LayerEntry::new("roads", LayerSource::VectorCollection(7u32));
        assert_eq!(e.kind(), LayerKind::VectorCollection);
        assert_eq!(*e.source().object(), 7);
        assert!(!e.kind().is_raster());
        assert!(LayerKind::RasterCollection.is_raster());
    }

    #[test]
    fn entries_default_to_visible() {
        let e = LayerEntry::new("dem", LayerSource::RasterSingle(()));
        assert!(e.visible());
        let hidden = e.with_style(LayerStyle::hidden());
        assert!(!hidden.visible());
        assert_eq!(hidden.name(), "dem");
    }
}
