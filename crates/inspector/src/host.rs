use foundation::math::LatLon;
use layers::LayerRegistry;
use runtime::{Interaction, InteractionBus, SubscriberId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum CursorStyle {
    #[default]
    Default,
    Crosshair,
    Wait,
}

impl CursorStyle {
    /// CSS cursor name.
    pub fn as_str(self) -> &'static str {
        match self {
            CursorStyle::Default => "default",
            CursorStyle::Crosshair => "crosshair",
            CursorStyle::Wait => "wait",
        }
    }
}

/// Whatever draws the pointer over the map.
pub trait CursorSink {
    fn set_cursor(&mut self, style: CursorStyle);
}

/// Cursor sink that remembers every style it was given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingCursor {
    pub history: Vec<CursorStyle>,
}

impl RecordingCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> CursorStyle {
        self.history.last().copied().unwrap_or_default()
    }
}

impl CursorSink for RecordingCursor {
    fn set_cursor(&mut self, style: CursorStyle) {
        self.history.push(style);
    }
}

/// The interactive map an inspector is attached to.
pub trait HostMap {
    type Object;

    fn zoom(&self) -> u8;
    fn center(&self) -> LatLon;
    fn layers(&self) -> &LayerRegistry<Self::Object>;
    fn subscribe_interactions(&mut self) -> SubscriberId;
    /// Returns `true` if `id` was subscribed.
    fn unsubscribe_interactions(&mut self, id: SubscriberId) -> bool;
}

/// Host map kept entirely in memory; used by the CLI and in tests.
#[derive(Debug)]
pub struct InMemoryMap<O> {
    zoom: u8,
    center: LatLon,
    layers: LayerRegistry<O>,
    bus: InteractionBus,
}

impl<O> InMemoryMap<O> {
    pub fn new(center: LatLon, zoom: u8, layers: LayerRegistry<O>) -> Self {
        Self {
            zoom,
            center,
            layers,
            bus: InteractionBus::new(),
        }
    }

    pub fn layers_mut(&mut self) -> &mut LayerRegistry<O> {
        &mut self.layers
    }

    pub fn set_zoom(&mut self, zoom: u8) {
        self.zoom = zoom;
    }

    pub fn set_center(&mut self, center: LatLon) {
        self.center = center;
    }

    pub fn bus(&self) -> &InteractionBus {
        &self.bus
    }

    /// Records `interaction` and returns the subscribers that should receive it.
    pub fn dispatch(&mut self, interaction: Interaction) -> Vec<SubscriberId> {
        self.bus.dispatch(interaction)
    }
}

impl<O> HostMap for InMemoryMap<O> {
    type Object = O;

    fn zoom(&self) -> u8 {
        self.zoom
    }

    fn center(&self) -> LatLon {
        self.center
    }

    fn layers(&self) -> &LayerRegistry<O> {
        &self.layers
    }

    fn subscribe_interactions(&mut self) -> SubscriberId {
        self.bus.subscribe()
    }

    fn unsubscribe_interactions(&mut self, id: SubscriberId) -> bool {
        self.bus.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::{CursorSink, CursorStyle, HostMap, InMemoryMap, RecordingCursor};
    use foundation::math::LatLon;
    use layers::LayerRegistry;
    use runtime::Interaction;

    #[test]
    fn recording_cursor_tracks_last_style() {
        let mut cursor = RecordingCursor::new();
        assert_eq!(cursor.current(), CursorStyle::Default);
        cursor.set_cursor(CursorStyle::Wait);
        cursor.set_cursor(CursorStyle::Crosshair);
        assert_eq!(cursor.current().as_str(), "crosshair");
        assert_eq!(cursor.history.len(), 2);
    }

    #[test]
    fn in_memory_map_routes_interactions_to_subscribers() {
        let mut map: InMemoryMap<()> =
            InMemoryMap::new(LatLon::new(40.0, -100.0), 4, LayerRegistry::new());
        let id = map.subscribe_interactions();
        assert_eq!(
            map.dispatch(Interaction::click(LatLon::new(1.0, 2.0))),
            vec![id]
        );
        assert!(map.unsubscribe_interactions(id));
        assert!(!map.unsubscribe_interactions(id));
        assert!(map.dispatch(Interaction::click(LatLon::new(1.0, 2.0))).is_empty());
        map.set_zoom(9);
        assert_eq!(map.zoom(), 9);
        assert_eq!(map.center(), LatLon::new(40.0, -100.0));
    }
}
