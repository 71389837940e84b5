use foundation::{GeoBounds, extend_bounds};
use serde_json::Value;

/// Exact user-facing message for a structurally invalid upload.
pub const NOT_GEOJSON_MESSAGE: &str = "File type is not GeoJSON";

#[derive(Debug, Clone, PartialEq)]
pub enum GeoJsonError {
    /// Content is not valid JSON; carries the parser's message.
    Parse(String),
    /// Valid JSON that is not a recognizable FeatureCollection, or content
    /// that was not readable as text in the first place.
    Format,
}

impl std::fmt::Display for GeoJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoJsonError::Parse(msg) => write!(f, "{msg}"),
            GeoJsonError::Format => write!(f, "{NOT_GEOJSON_MESSAGE}"),
        }
    }
}

impl std::error::Error for GeoJsonError {}

/// A validated GeoJSON FeatureCollection, kept as parsed JSON.
///
/// The wrapped value is exactly what the user uploaded (deep-equal), so a
/// later submission round-trips without re-encoding surprises. Only the
/// shallow shape documented on [`GeoJsonDocument::parse`] has been checked;
/// coordinate ranges, ring closure and CRS are the mapping widget's problem.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoJsonDocument {
    value: Value,
}

impl GeoJsonDocument {
    /// Validates text as a GeoJSON FeatureCollection.
    ///
    /// The check is deliberately shallow: the root must be an object with
    /// `type == "FeatureCollection"` and an array `features`, and every
    /// feature needs a truthy `geometry` whose `type` is truthy and whose
    /// `coordinates` is an array. Features do not need a `"type"` member,
    /// and an empty `features` array is valid.
    pub fn parse(text: &str) -> Result<Self, GeoJsonError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| GeoJsonError::Parse(e.to_string()))?;
        Self::from_value(value)
    }

    /// Validates raw file bytes, treating non-text content as a format error.
    pub fn from_reader_text(bytes: &[u8]) -> Result<Self, GeoJsonError> {
        let text = std::str::from_utf8(bytes).map_err(|_| GeoJsonError::Format)?;
        Self::parse(text)
    }

    pub fn from_value(value: Value) -> Result<Self, GeoJsonError> {
        if !is_feature_collection(&value) {
            return Err(GeoJsonError::Format);
        }
        Ok(Self { value })
    }

    /// Wraps a value fetched from the backend store without re-checking it.
    ///
    /// Stored entries were validated on their way in; the list endpoint is
    /// trusted the same way the rendering widget trusts it.
    pub fn from_stored(value: Value) -> Self {
        Self { value }
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn feature_count(&self) -> usize {
        self.value
            .get("features")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    /// blake3 hex of the serialized document; stable across clones, used in
    /// logs and upload summaries.
    pub fn content_id(&self) -> String {
        blake3::hash(self.value.to_string().as_bytes())
            .to_hex()
            .to_string()
    }

    pub fn to_json_string(&self) -> String {
        self.value.to_string()
    }
}

impl serde::Serialize for GeoJsonDocument {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

/// Deserializes as a bare JSON value, i.e. with `from_stored` trust. The
/// upload gate stays at [`GeoJsonDocument::parse`] / [`GeoJsonDocument::from_value`].
impl<'de> serde::Deserialize<'de> for GeoJsonDocument {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_stored(Value::deserialize(deserializer)?))
    }
}

fn is_feature_collection(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    if obj.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return false;
    }
    let Some(features) = obj.get("features").and_then(Value::as_array) else {
        return false;
    };
    features.iter().all(feature_has_wellformed_geometry)
}

fn feature_has_wellformed_geometry(feature: &Value) -> bool {
    let Some(geometry) = feature.get("geometry") else {
        return false;
    };
    if !is_truthy(geometry) {
        return false;
    }
    let Some(geometry_type) = geometry.get("type") else {
        return false;
    };
    if !is_truthy(geometry_type) {
        return false;
    }
    matches!(geometry.get("coordinates"), Some(Value::Array(_)))
}

/// JSON-side mirror of the upload form's script truthiness, so the gate
/// accepts and rejects exactly the same documents.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Minimal box enclosing every coordinate position in the document.
///
/// Positions are `[lon, lat, ...]` number arrays found by walking each
/// feature's `geometry.coordinates` at any nesting depth, so every geometry
/// kind folds through the same path. `None` when the collection holds no
/// finite positions (for example, zero features).
pub fn bounds_of_document(doc: &GeoJsonDocument) -> Option<GeoBounds> {
    let features = doc.as_value().get("features")?.as_array()?;
    let mut acc = None;
    for feature in features {
        if let Some(coords) = feature.get("geometry").and_then(|g| g.get("coordinates")) {
            fold_positions(coords, &mut acc);
        }
    }
    acc
}

fn fold_positions(coords: &Value, acc: &mut Option<GeoBounds>) {
    let Some(items) = coords.as_array() else {
        return;
    };
    let lon = items.first().and_then(Value::as_f64);
    let lat = items.get(1).and_then(Value::as_f64);
    match (lon, lat) {
        (Some(lon), Some(lat)) => extend_bounds(acc, lon, lat),
        _ => {
            for item in items {
                fold_positions(item, acc);
            }
        }
    }
}
