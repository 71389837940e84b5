//! Fixed UI configuration the shell renders: initial view, base tile
//! layers and chrome texts.

use foundation::LatLng;

/// Map view before any selection: East Java at country-level zoom.
pub const INITIAL_CENTER: LatLng = LatLng::new(-8.16666648, 113.50000106);
pub const INITIAL_ZOOM: u8 = 6;

/// One switchable base tile layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseLayer {
    pub name: &'static str,
    pub url_template: &'static str,
    pub attribution: &'static str,
}

/// Base layers in menu order; the first one starts checked.
pub const BASE_LAYERS: [BaseLayer; 3] = [
    BaseLayer {
        name: "OpenStreetMap",
        url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
        attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors",
    },
    BaseLayer {
        name: "Google Basemap",
        url_template: "https://mt1.google.com/vt/lyrs=r&x={x}&y={y}&z={z}",
        attribution: "&copy; <a href=\"https://opensourceoptions.com/blog/how-to-add-google-satellite-imagery-and-google-maps-to-qgis\">Google Basemap</a> contributors",
    },
    BaseLayer {
        name: "ESRI ArcGIS World Street Map",
        url_template: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Street_Map/MapServer/tile/{z}/{y}/{x}",
        attribution: "&copy; <a href=\"https://help.socialpinpoint.com/en/articles/5114868-common-esri-arcgis-base-map-urls\">ESRI ArcGIS</a> contributors",
    },
];

/// Sidebar chrome.
pub const APP_TITLE: &str = "World Resources Institute";
pub const LIST_CAPTION: &str = "List of DB GeoJSON";
/// Radio label for the not-yet-submitted upload.
pub const CURRENT_INPUT_LABEL: &str = "Current input GeoJSON";

/// Form texts.
pub const FILE_FIELD_LABEL: &str = "Input your GEOJSON";
pub const FILE_FIELD_FEEDBACK: &str = "GeoJSON is required";
pub const NAME_FIELD_LABEL: &str = "Input name";
pub const NAME_FIELD_PLACEHOLDER: &str = "Insert unique name";
pub const NAME_FIELD_FEEDBACK: &str = "Name is required";
pub const SUBMIT_BUTTON_LABEL: &str = "Submit";
