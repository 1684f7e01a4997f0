use foundation::math::ground_resolution;
use layers::raster::PointQueryEngine;
use layers::vector::ObjectQueryEngine;
use layers::{EarthEngine, LayerSelection};
use runtime::{Interaction, InteractionKind, SubscriberId};
use tracing::debug;

use crate::builder::ResultTreeBuilder;
use crate::error::InspectorError;
use crate::host::{CursorSink, CursorStyle, HostMap};
use crate::options::InspectorOptions;
use crate::state::{Category, InspectorState};
use crate::tree::DisplayTree;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum InspectorStatus {
    /// Not subscribed to map clicks.
    Closed,
    /// Subscribed; cursor is a crosshair.
    Open,
    /// Handling a click; cursor is `wait`.
    Busy,
}

/// Called once per close action, typically to unselect the toolbar toggle.
pub type OnClose = Box<dyn FnMut()>;

pub struct InspectorBuilder<M, B, C> {
    host_map: Option<M>,
    backend: Option<B>,
    cursor: Option<C>,
    options: InspectorOptions,
    on_close: Option<OnClose>,
}

impl<M, B, C> Default for InspectorBuilder<M, B, C> {
    fn default() -> Self {
        Self {
            host_map: None,
            backend: None,
            cursor: None,
            options: InspectorOptions::default(),
            on_close: None,
        }
    }
}

impl<M, B, C> InspectorBuilder<M, B, C>
where
    M: HostMap,
    B: EarthEngine<Object = M::Object>,
    C: CursorSink,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host_map(mut self, host_map: M) -> Self {
        self.host_map = Some(host_map);
        self
    }

    pub fn backend(mut self, backend: B) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn cursor(mut self, cursor: C) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn options(mut self, options: InspectorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn on_close(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_close = Some(Box::new(callback));
        self
    }

    /// Validates the parts and, when `options.opened` is set, activates the inspector.
    pub fn build(self) -> Result<Inspector<M, B, C>, InspectorError> {
        let host_map = self.host_map.ok_or(InspectorError::MissingHostMap)?;
        let backend = self.backend.ok_or(InspectorError::MissingBackend)?;
        let cursor = self.cursor.ok_or(InspectorError::MissingCursorSink)?;
        self.options.validate()?;

        let mut inspector = Inspector {
            host_map,
            backend,
            cursor,
            state: InspectorState::from(&self.options),
            options: self.options,
            status: InspectorStatus::Closed,
            subscription: None,
            tree: None,
            on_close: self.on_close,
        };
        if inspector.options.opened {
            inspector.activate();
        }
        Ok(inspector)
    }
}

/// Click-to-query controller attached to a host map.
///
/// State machine:
/// - `activate`: Closed -> Open (subscribe, crosshair cursor).
/// - click while Open: Open -> Busy -> Open (wait cursor, query, tree replaced, crosshair).
/// - `close`: Open -> Closed (unsubscribe, default cursor, on-close callback).
///
/// Anything else is ignored.
pub struct Inspector<M, B, C> {
    host_map: M,
    backend: B,
    cursor: C,
    options: InspectorOptions,
    state: InspectorState,
    status: InspectorStatus,
    subscription: Option<SubscriberId>,
    tree: Option<DisplayTree>,
    on_close: Option<OnClose>,
}

impl<M, B, C> Inspector<M, B, C>
where
    M: HostMap,
    B: EarthEngine<Object = M::Object>,
    C: CursorSink,
{
    pub fn builder() -> InspectorBuilder<M, B, C> {
        InspectorBuilder::new()
    }

    /// Returns `false` if the inspector was already open.
    ///
    /// A fresh session starts with no tree; the previous session's result is dropped.
    pub fn activate(&mut self) -> bool {
        if self.status != InspectorStatus::Closed {
            return false;
        }
        self.tree = None;
        let id = self.host_map.subscribe_interactions();
        self.subscription = Some(id);
        self.cursor.set_cursor(CursorStyle::Crosshair);
        self.status = InspectorStatus::Open;
        self.state.enabled = true;
        debug!(subscriber = id.0, "inspector opened");
        true
    }

    /// Handles one map interaction and returns the new tree if it was a click.
    ///
    /// Non-click interactions and clicks while closed leave everything untouched.
    pub fn on_interaction(&mut self, interaction: Interaction) -> Option<&DisplayTree> {
        if interaction.kind != InteractionKind::Click || self.status != InspectorStatus::Open {
            return None;
        }
        self.status = InspectorStatus::Busy;
        self.cursor.set_cursor(CursorStyle::Wait);

        let coord = interaction.coordinates;
        let zoom = self.host_map.zoom();
        let selection = LayerSelection {
            names: self.options.names.clone(),
            visible_only: self.state.visible_only,
        };
        let layers = self.host_map.layers();
        let pixels = PointQueryEngine::new(selection.clone(), self.state.decimals).query(
            &self.backend,
            layers,
            coord,
            zoom,
        );
        let objects = ObjectQueryEngine::new(selection).query(&self.backend, layers, coord);
        debug!(
            lat = coord.lat,
            lon = coord.lon,
            zoom,
            scale_m = ground_resolution(coord.lat, zoom),
            pixel_layers = pixels.outcomes().count(),
            object_layers = objects.outcomes().count(),
            skipped = pixels.skipped().count() + objects.skipped().count(),
            "inspector click handled"
        );

        let tree = ResultTreeBuilder::new(self.state.decimals).build(
            coord,
            zoom,
            &pixels,
            &objects,
            &self.state,
        );
        self.tree = Some(tree);

        self.cursor.set_cursor(CursorStyle::Crosshair);
        self.status = InspectorStatus::Open;
        self.tree.as_ref()
    }

    /// Closes the inspector. Returns `false`, and does nothing, if it was already closed.
    pub fn close(&mut self) -> bool {
        if self.status == InspectorStatus::Closed {
            return false;
        }
        if let Some(id) = self.subscription.take() {
            self.host_map.unsubscribe_interactions(id);
        }
        self.cursor.set_cursor(CursorStyle::Default);
        self.status = InspectorStatus::Closed;
        self.state.enabled = false;
        debug!("inspector closed");
        if let Some(callback) = self.on_close.as_mut() {
            callback();
        }
        true
    }

    pub fn deactivate(&mut self) -> bool {
        self.close()
    }

    /// Two-way bound toggle value: `true` opens, `false` closes.
    pub fn set_open(&mut self, open: bool) {
        if open {
            self.activate();
        } else {
            self.close();
        }
    }

    pub fn is_open(&self) -> bool {
        self.status != InspectorStatus::Closed
    }

    /// Takes effect on the next click; the current tree keeps its layout.
    pub fn set_expanded(&mut self, category: Category, expanded: bool) {
        self.state.set_expanded(category, expanded);
    }

    pub fn set_visible_only(&mut self, visible_only: bool) {
        self.state.visible_only = visible_only;
    }

    pub fn set_on_close(&mut self, callback: impl FnMut() + 'static) {
        self.on_close = Some(Box::new(callback));
    }

    pub fn status(&self) -> InspectorStatus {
        self.status
    }

    pub fn state(&self) -> &InspectorState {
        &self.state
    }

    pub fn options(&self) -> &InspectorOptions {
        &self.options
    }

    pub fn tree(&self) -> Option<&DisplayTree> {
        self.tree.as_ref()
    }

    pub fn subscription(&self) -> Option<SubscriberId> {
        self.subscription
    }

    pub fn host_map(&self) -> &M {
        &self.host_map
    }

    pub fn host_map_mut(&mut self) -> &mut M {
        &mut self.host_map
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cursor(&self) -> &C {
        &self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::{Inspector, InspectorStatus};
    use crate::error::InspectorError;
    use crate::host::{CursorStyle, InMemoryMap, RecordingCursor};
    use crate::options::InspectorOptions;
    use foundation::math::LatLon;
    use layers::LayerRegistry;
    use layers::fixture::{FixtureObject, StaticBackend};
    use runtime::{Interaction, InteractionKind};

    type TestInspector = Inspector<InMemoryMap<FixtureObject>, StaticBackend, RecordingCursor>;

    fn map() -> InMemoryMap<FixtureObject> {
        InMemoryMap::new(LatLon::new(0.0, 0.0), 3, LayerRegistry::new())
    }

    #[test]
    fn build_requires_a_host_map() {
        let err = TestInspector::builder()
            .backend(StaticBackend)
            .cursor(RecordingCursor::new())
            .build()
            .err();
        assert_eq!(err, Some(InspectorError::MissingHostMap));
        assert_eq!(
            err.map(|e| e.to_string()).as_deref(),
            Some("must pass a valid map when creating an inspector")
        );
    }

    #[test]
    fn build_rejects_invalid_options() {
        let options = InspectorOptions {
            decimals: 16,
            ..InspectorOptions::default()
        };
        let err = TestInspector::builder()
            .host_map(map())
            .backend(StaticBackend)
            .cursor(RecordingCursor::new())
            .options(options)
            .build()
            .err();
        assert!(matches!(err, Some(InspectorError::InvalidOptions(_))));
    }

    #[test]
    fn opened_option_controls_initial_status() {
        let open = TestInspector::builder()
            .host_map(map())
            .backend(StaticBackend)
            .cursor(RecordingCursor::new())
            .build()
            .expect("inspector");
        assert_eq!(open.status(), InspectorStatus::Open);
        assert_eq!(open.cursor().current(), CursorStyle::Crosshair);
        assert!(open.state().enabled);

        let closed = TestInspector::builder()
            .host_map(map())
            .backend(StaticBackend)
            .cursor(RecordingCursor::new())
            .options(InspectorOptions {
                opened: false,
                ..InspectorOptions::default()
            })
            .build()
            .expect("inspector");
        assert_eq!(closed.status(), InspectorStatus::Closed);
        assert!(closed.subscription().is_none());
        assert!(closed.cursor().history.is_empty());
    }

    #[test]
    fn click_cycles_cursor_through_wait() {
        let mut inspector = TestInspector::builder()
            .host_map(map())
            .backend(StaticBackend)
            .cursor(RecordingCursor::new())
            .build()
            .expect("inspector");
        let tree = inspector
            .on_interaction(Interaction::click(LatLon::new(10.0, 20.0)))
            .expect("tree");
        assert!(tree.pixels.is_none());
        assert_eq!(
            inspector.cursor().history,
            vec![CursorStyle::Crosshair, CursorStyle::Wait, CursorStyle::Crosshair]
        );
        assert_eq!(inspector.status(), InspectorStatus::Open);
    }

    #[test]
    fn non_click_and_closed_clicks_are_ignored() {
        let mut inspector = TestInspector::builder()
            .host_map(map())
            .backend(StaticBackend)
            .cursor(RecordingCursor::new())
            .build()
            .expect("inspector");
        let moved = Interaction {
            kind: InteractionKind::MouseMove,
            coordinates: LatLon::new(1.0, 1.0),
        };
        assert!(inspector.on_interaction(moved).is_none());
        inspector.set_open(false);
        assert!(!inspector.is_open());
        assert!(
            inspector
                .on_interaction(Interaction::click(LatLon::new(1.0, 1.0)))
                .is_none()
        );
        assert!(inspector.tree().is_none());
    }
}
