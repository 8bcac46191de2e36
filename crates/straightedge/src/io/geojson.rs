use std::path::Path;

use geo_types::LineString;
use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Number, Value as JsonValue};

use crate::{
    error::Result,
    types::FrameDetection,
};

fn float(value: f32) -> JsonValue {
    Number::from_f64(value as f64)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

fn line_feature(id: usize, kind: &str, index: usize, length: f32, line: &LineString<f32>) -> Feature {
    let mut properties = Map::new();
    properties.insert("kind".to_string(), JsonValue::String(kind.to_string()));
    properties.insert("index".to_string(), JsonValue::Number(Number::from(index)));
    properties.insert("length".to_string(), float(length));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::from(line))),
        id: Some(geojson::feature::Id::Number(Number::from(id))),
        properties: Some(properties),
        foreign_members: None,
    }
}

impl FrameDetection {
    /// Contours then segments as LineString features, in source pixel coordinates
    pub fn to_geojson(&self) -> Result<FeatureCollection> {
        let mut features = Vec::with_capacity(self.contours.len() + self.segments.len());

        for (index, contour) in self.contours.iter().enumerate() {
            let line = contour.to_line_string();
            features.push(line_feature(features.len(), "contour", index, contour.length(), &line));
        }

        for (index, segment) in self.segments.iter().enumerate() {
            let line = segment.to_line_string();
            features.push(line_feature(features.len(), "segment", index, segment.length(), &line));
        }

        let mut foreign_members = Map::new();
        foreign_members.insert("image_width".to_string(), JsonValue::Number(Number::from(self.image_width)));
        foreign_members.insert("image_height".to_string(), JsonValue::Number(Number::from(self.image_height)));
        foreign_members.insert("scale".to_string(), float(self.scale));

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        })
    }

    pub fn to_geojson_string(&self) -> Result<String> {
        let collection = self.to_geojson()?;
        Ok(serde_json::to_string_pretty(&collection)?)
    }

    pub fn save_geojson<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_geojson_string()?)?;
        Ok(())
    }

    /// Plain JSON form of the whole detection
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Contour, LineSegment, Point};

    fn detection() -> FrameDetection {
        FrameDetection {
            contours: vec![Contour::new(vec![
                Point::new(0.0, 0.0),
                Point::new(4.0, 0.0),
                Point::new(4.0, 3.0),
            ])],
            segments: vec![LineSegment::new(Point::new(8.0, 8.0), Point::new(8.0, 20.0))],
            scale: 4.0,
            working_width: 300,
            working_height: 225,
            image_width: 1200,
            image_height: 900,
        }
    }

    #[test]
    fn test_features_are_tagged_by_kind() {
        let collection = detection().to_geojson().unwrap();
        assert_eq!(collection.features.len(), 2);

        let contour = &collection.features[0];
        assert_eq!(contour.property("kind"), Some(&JsonValue::from("contour")));
        assert_eq!(contour.property("length").and_then(|v| v.as_f64()), Some(7.0));
        match &contour.geometry.as_ref().unwrap().value {
            Value::LineString(coords) => assert_eq!(coords.len(), 3),
            other => panic!("unexpected geometry {other:?}"),
        }

        let segment = &collection.features[1];
        match &segment.geometry.as_ref().unwrap().value {
            Value::LineString(coords) => assert_eq!(coords, &vec![vec![8.0, 8.0], vec![8.0, 20.0]]),
            other => panic!("unexpected geometry {other:?}"),
        }
        assert_eq!(segment.property("kind"), Some(&JsonValue::from("segment")));
        assert_eq!(segment.property("index").and_then(|v| v.as_u64()), Some(0));
        assert_eq!(segment.property("length").and_then(|v| v.as_f64()), Some(12.0));
    }

    #[test]
    fn test_collection_carries_image_metadata() {
        let collection = detection().to_geojson().unwrap();
        let members = collection.foreign_members.unwrap();
        assert_eq!(members["image_width"], 1200);
        assert_eq!(members["image_height"], 900);
        assert_eq!(members["scale"].as_f64(), Some(4.0));
    }

    #[test]
    fn test_save_geojson_writes_parsable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edges.geojson");
        detection().save_geojson(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: FeatureCollection = text.parse().unwrap();
        assert_eq!(parsed.features.len(), 2);
    }

    #[test]
    fn test_json_round_trip_preserves_detection() {
        let original = detection();
        let restored: FrameDetection = serde_json::from_str(&original.to_json().unwrap()).unwrap();
        assert_eq!(restored, original);
    }
}
