//! Keeps the map widget in step with the committed selection.

use foundation::{GeoBounds, LatLng, wrap_lon_deg};
use formats::{GeoJsonDocument, bounds_of_document};

use crate::state::ViewState;

/// Country-level zoom used for every selection flight.
pub const FLY_TO_ZOOM: u8 = 6;

/// Flight animation length in seconds.
pub const FLY_TO_DURATION_S: f64 = 2.0;

/// One camera move command for the map widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFlight {
    pub center: LatLng,
    pub zoom: u8,
    pub duration_s: f64,
    pub animate: bool,
}

impl CameraFlight {
    /// Flight to the arithmetic center of `bounds` at the fixed zoom.
    /// The center is normalized so junk coordinates cannot park the camera
    /// off the map: longitude wrapped, latitude clamped.
    pub fn to_bounds(bounds: &GeoBounds) -> Self {
        let center = bounds.center();
        Self {
            center: LatLng::new(
                center.lat_deg.clamp(-89.9, 89.9),
                wrap_lon_deg(center.lng_deg),
            ),
            zoom: FLY_TO_ZOOM,
            duration_s: FLY_TO_DURATION_S,
            animate: true,
        }
    }
}

/// Map widget surface as the synchronizer drives it.
///
/// `is_ready` stays false until the shell has mounted both the map and its
/// overlay layer; nothing is issued before then.
pub trait MapPort {
    fn is_ready(&self) -> bool;
    fn clear_overlay(&mut self);
    fn fly_to(&mut self, flight: CameraFlight);
    fn set_overlay(&mut self, doc: &GeoJsonDocument);
}

/// Reconciles the map with the committed selection: clear the previous
/// overlay, fly once to the new bounding-box center, then mount the new
/// data. The flight starts before the data lands so the animation frames
/// the incoming layer.
///
/// No-ops (returning `None`) when the map is not ready, the selection does
/// not resolve, or the document has no finite coordinates to frame.
pub fn sync_map_to_selection(state: &ViewState, map: &mut dyn MapPort) -> Option<CameraFlight> {
    if !map.is_ready() {
        return None;
    }
    let doc = state.active_document()?;
    let bounds = bounds_of_document(doc)?;
    let flight = CameraFlight::to_bounds(&bounds);
    map.clear_overlay();
    map.fly_to(flight);
    map.set_overlay(doc);
    Some(flight)
}

#[cfg(test)]
mod tests {
    use formats::GeoJsonDocument;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::selection::SelectionId;

    #[derive(Debug, Clone, PartialEq)]
    enum MapOp {
        Clear,
        Fly(CameraFlight),
        Overlay(String),
    }

    #[derive(Debug, Default)]
    struct RecordingMap {
        ready: bool,
        ops: Vec<MapOp>,
    }

    impl MapPort for RecordingMap {
        fn is_ready(&self) -> bool {
            self.ready
        }

        fn clear_overlay(&mut self) {
            self.ops.push(MapOp::Clear);
        }

        fn fly_to(&mut self, flight: CameraFlight) {
            self.ops.push(MapOp::Fly(flight));
        }

        fn set_overlay(&mut self, doc: &GeoJsonDocument) {
            self.ops.push(MapOp::Overlay(doc.content_id()));
        }
    }

    const TWO_POINTS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"geometry": {"type": "Point", "coordinates": [110.0, -10.0]}},
            {"geometry": {"type": "Point", "coordinates": [116.0, -6.0]}}
        ]
    }"#;

    fn state_with_upload(text: &str) -> ViewState {
        let mut state = ViewState::new();
        let ticket = state.begin_upload();
        state.accept_upload(ticket, GeoJsonDocument::parse(text).unwrap());
        state
    }

    #[test]
    fn sync_clears_flies_then_mounts_in_order() {
        let state = state_with_upload(TWO_POINTS);
        let mut map = RecordingMap {
            ready: true,
            ..RecordingMap::default()
        };

        let flight = sync_map_to_selection(&state, &mut map).unwrap();
        assert_eq!(flight.center, foundation::LatLng::new(-8.0, 113.0));
        assert_eq!(flight.zoom, FLY_TO_ZOOM);
        assert_eq!(flight.duration_s, FLY_TO_DURATION_S);
        assert!(flight.animate);

        let doc = state.active_document().unwrap();
        assert_eq!(
            map.ops,
            vec![
                MapOp::Clear,
                MapOp::Fly(flight),
                MapOp::Overlay(doc.content_id()),
            ]
        );
    }

    #[test]
    fn nothing_is_issued_before_the_map_is_ready() {
        let state = state_with_upload(TWO_POINTS);
        let mut map = RecordingMap::default();

        assert_eq!(sync_map_to_selection(&state, &mut map), None);
        assert!(map.ops.is_empty());
    }

    #[test]
    fn nothing_is_issued_without_a_resolvable_selection() {
        let mut state = ViewState::new();
        let mut map = RecordingMap {
            ready: true,
            ..RecordingMap::default()
        };

        assert_eq!(sync_map_to_selection(&state, &mut map), None);

        state.select(SelectionId::Stored("missing".to_string()));
        assert_eq!(sync_map_to_selection(&state, &mut map), None);
        assert!(map.ops.is_empty());
    }

    #[test]
    fn empty_feature_collection_has_nothing_to_frame() {
        let state = state_with_upload(r#"{"type":"FeatureCollection","features":[]}"#);
        let mut map = RecordingMap {
            ready: true,
            ..RecordingMap::default()
        };

        assert_eq!(sync_map_to_selection(&state, &mut map), None);
        assert!(map.ops.is_empty());
    }

    #[test]
    fn each_committed_selection_flies_exactly_once() {
        let mut state = state_with_upload(TWO_POINTS);
        let mut stored = catalog::NamedCollection::new();
        stored.upsert(
            "east".to_string(),
            GeoJsonDocument::parse(
                r#"{"type":"FeatureCollection","features":[{"geometry":{"type":"Point","coordinates":[100.0,0.0]}}]}"#,
            )
            .unwrap(),
        );
        state.apply_list(stored);

        let mut map = RecordingMap {
            ready: true,
            ..RecordingMap::default()
        };
        sync_map_to_selection(&state, &mut map);
        state.select(SelectionId::Stored("east".to_string()));
        sync_map_to_selection(&state, &mut map);

        let flights = map
            .ops
            .iter()
            .filter(|op| matches!(op, MapOp::Fly(_)))
            .count();
        assert_eq!(flights, 2);
        assert_eq!(
            map.ops.last(),
            Some(&MapOp::Overlay(
                state.active_document().unwrap().content_id()
            ))
        );
    }

    #[test]
    fn junk_coordinates_cannot_park_the_camera_off_the_map() {
        let state = state_with_upload(
            r#"{"type":"FeatureCollection","features":[{"geometry":{"type":"Point","coordinates":[560.0,95.0]}}]}"#,
        );
        let mut map = RecordingMap {
            ready: true,
            ..RecordingMap::default()
        };

        let flight = sync_map_to_selection(&state, &mut map).unwrap();
        assert!(flight.center.lng_deg >= -180.0 && flight.center.lng_deg < 180.0);
        assert!(flight.center.lat_deg.abs() <= 89.9);
    }
}
