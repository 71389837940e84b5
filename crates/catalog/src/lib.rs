use formats::GeoJsonDocument;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One stored entry: unique name plus its GeoJSON document.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionEntry {
    pub name: String,
    pub geojson: GeoJsonDocument,
}

/// Named GeoJSON documents as served by the backend store.
///
/// Keys are unique; presentation order is the backend response's key order,
/// so entries live in a vector rather than a sorted map. A duplicate key in
/// a response keeps its first position and its last value.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NamedCollection {
    entries: Vec<CollectionEntry>,
}

impl NamedCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a list-endpoint response body (a JSON object mapping names to
    /// GeoJSON documents) preserving key order.
    pub fn from_response_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&GeoJsonDocument> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.geojson)
    }

    /// Replaces the value in place when the name exists, appends otherwise.
    pub fn upsert(&mut self, name: impl Into<String>, geojson: GeoJsonDocument) {
        let name = name.into();
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.geojson = geojson,
            None => self.entries.push(CollectionEntry { name, geojson }),
        }
    }

    /// Entry names in presentation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollectionEntry> {
        self.entries.iter()
    }
}

impl Serialize for NamedCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.geojson)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NamedCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedMapVisitor;

        impl<'de> Visitor<'de> for OrderedMapVisitor {
            type Value = NamedCollection;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a JSON object mapping names to GeoJSON documents")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut collection = NamedCollection::default();
                while let Some((name, geojson)) = map.next_entry::<String, GeoJsonDocument>()? {
                    collection.upsert(name, geojson);
                }
                Ok(collection)
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::NamedCollection;
    use formats::GeoJsonDocument;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn point_doc(lon: f64, lat: f64) -> GeoJsonDocument {
        GeoJsonDocument::from_value(json!({
            "type": "FeatureCollection",
            "features": [{"geometry": {"type": "Point", "coordinates": [lon, lat]}}]
        }))
        .expect("valid")
    }

    #[test]
    fn preserves_response_key_order() {
        let body = r#"{
            "zebra": {"type":"FeatureCollection","features":[]},
            "alpha": {"type":"FeatureCollection","features":[]},
            "mango": {"type":"FeatureCollection","features":[]}
        }"#;
        let collection = NamedCollection::from_response_text(body).expect("parse");
        let names: Vec<&str> = collection.names().collect();
        assert_eq!(names, vec!["zebra", "alpha", "mango"]);
    }

    #[test]
    fn duplicate_key_keeps_first_position_and_last_value() {
        let body = r#"{
            "a": {"first": true},
            "b": {},
            "a": {"last": true}
        }"#;
        let collection = NamedCollection::from_response_text(body).expect("parse");
        let names: Vec<&str> = collection.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(
            collection.get("a").expect("a").as_value(),
            &json!({"last": true})
        );
    }

    #[test]
    fn get_and_contains_by_name() {
        let mut collection = NamedCollection::new();
        collection.upsert("jember", point_doc(113.5, -8.17));
        assert!(collection.contains("jember"));
        assert!(!collection.contains("bali"));
        assert_eq!(collection.get("jember").expect("doc").feature_count(), 1);
        assert!(collection.get("bali").is_none());
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut collection = NamedCollection::new();
        collection.upsert("a", point_doc(0.0, 0.0));
        collection.upsert("b", point_doc(1.0, 1.0));
        collection.upsert("a", point_doc(2.0, 2.0));

        let names: Vec<&str> = collection.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        let a = collection.get("a").expect("a");
        assert_eq!(
            a.as_value()["features"][0]["geometry"]["coordinates"],
            json!([2.0, 2.0])
        );
    }

    #[test]
    fn serializes_in_presentation_order() {
        let body = r#"{"second":{},"first":{}}"#;
        let collection = NamedCollection::from_response_text(body).expect("parse");
        let out = serde_json::to_string(&collection).expect("serialize");
        assert!(out.find("second").expect("second") < out.find("first").expect("first"));
    }

    #[test]
    fn non_object_bodies_fail_to_parse() {
        assert!(NamedCollection::from_response_text("[]").is_err());
        assert!(NamedCollection::from_response_text("\"nope\"").is_err());
        assert!(NamedCollection::from_response_text("{broken").is_err());
    }
}
