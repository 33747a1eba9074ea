use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;

pub use chrono;

/// Spatial reference identifier for 2D cartesian points.
pub const SRID_CARTESIAN: u32 = 7203;
/// Spatial reference identifier for 3D cartesian points.
pub const SRID_CARTESIAN_3D: u32 = 9157;
/// Spatial reference identifier for 2D WGS-84 points.
pub const SRID_WGS84: u32 = 4326;
/// Spatial reference identifier for 3D WGS-84 points.
pub const SRID_WGS84_3D: u32 = 4979;

/// Property value types that can be bound as statement parameters.
///
/// Mirrors the value space a Cypher-speaking driver accepts:
/// - Null: NULL values
/// - Bool: true/false
/// - Int: 64-bit signed integers
/// - Float: 64-bit floating point
/// - String: UTF-8 strings
/// - Bytes: raw byte arrays
/// - List: Ordered list of PropertyValues
/// - Map: String-keyed map of PropertyValues
/// - Date / LocalTime / LocalDateTime / DateTime / Duration: temporal values
/// - Point: spatial values
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<PropertyValue>),
    Map(BTreeMap<String, PropertyValue>),
    Date(NaiveDate),
    LocalTime(NaiveTime),
    LocalDateTime(NaiveDateTime),
    DateTime(DateTime<FixedOffset>),
    Duration(TimeDelta),
    Point(Point),
}

/// A point in a 2D or 3D coordinate reference system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub srid: u32,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl Point {
    pub fn cartesian(x: f64, y: f64) -> Self {
        Self {
            srid: SRID_CARTESIAN,
            x,
            y,
            z: None,
        }
    }

    pub fn cartesian_3d(x: f64, y: f64, z: f64) -> Self {
        Self {
            srid: SRID_CARTESIAN_3D,
            x,
            y,
            z: Some(z),
        }
    }

    /// Geographic point; `x` is the longitude and `y` the latitude.
    pub fn wgs84(longitude: f64, latitude: f64) -> Self {
        Self {
            srid: SRID_WGS84,
            x: longitude,
            y: latitude,
            z: None,
        }
    }

    pub fn wgs84_3d(longitude: f64, latitude: f64, height: f64) -> Self {
        Self {
            srid: SRID_WGS84_3D,
            x: longitude,
            y: latitude,
            z: Some(height),
        }
    }
}

impl PropertyValue {
    /// Short, stable name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Null => "null",
            PropertyValue::Bool(_) => "boolean",
            PropertyValue::Int(_) => "integer",
            PropertyValue::Float(_) => "float",
            PropertyValue::String(_) => "string",
            PropertyValue::Bytes(_) => "bytes",
            PropertyValue::List(_) => "list",
            PropertyValue::Map(_) => "map",
            PropertyValue::Date(_) => "date",
            PropertyValue::LocalTime(_) => "local time",
            PropertyValue::LocalDateTime(_) => "local datetime",
            PropertyValue::DateTime(_) => "datetime",
            PropertyValue::Duration(_) => "duration",
            PropertyValue::Point(_) => "point",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// Returns the integer value if this variant is `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns float value if this variant is `Float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PropertyValue::Null => serializer.serialize_unit(),
            PropertyValue::Bool(b) => serializer.serialize_bool(*b),
            PropertyValue::Int(i) => serializer.serialize_i64(*i),
            PropertyValue::Float(f) => serializer.serialize_f64(*f),
            PropertyValue::String(s) => serializer.serialize_str(s),
            PropertyValue::Bytes(bytes) => {
                let mut seq = serializer.serialize_seq(Some(bytes.len()))?;
                for b in bytes {
                    seq.serialize_element(b)?;
                }
                seq.end()
            }
            PropertyValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            PropertyValue::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            PropertyValue::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
            PropertyValue::LocalTime(t) => serializer.collect_str(&t.format("%H:%M:%S%.f")),
            PropertyValue::LocalDateTime(dt) => {
                serializer.collect_str(&dt.format("%Y-%m-%dT%H:%M:%S%.f"))
            }
            PropertyValue::DateTime(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            PropertyValue::Duration(d) => serializer.collect_str(d),
            PropertyValue::Point(p) => p.serialize(serializer),
        }
    }
}

/// A JSON number with no exact [`PropertyValue`] counterpart, such as an
/// integer above `i64::MAX`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("number {0} is neither a 64-bit integer nor a float")]
pub struct UnrepresentableNumber(pub serde_json::Number);

impl TryFrom<serde_json::Value> for PropertyValue {
    type Error = UnrepresentableNumber;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        Ok(match value {
            serde_json::Value::Null => PropertyValue::Null,
            serde_json::Value::Bool(b) => PropertyValue::Bool(b),
            serde_json::Value::Number(n) => match (n.as_i64(), n.is_f64()) {
                (Some(i), _) => PropertyValue::Int(i),
                (None, true) => match n.as_f64() {
                    Some(f) => PropertyValue::Float(f),
                    None => return Err(UnrepresentableNumber(n)),
                },
                (None, false) => return Err(UnrepresentableNumber(n)),
            },
            serde_json::Value::String(s) => PropertyValue::String(s),
            serde_json::Value::Array(items) => PropertyValue::List(
                items
                    .into_iter()
                    .map(PropertyValue::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(entries) => PropertyValue::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| PropertyValue::try_from(v).map(|v| (k, v)))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Int(i)
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        PropertyValue::Int(i64::from(i))
    }
}

impl From<u32> for PropertyValue {
    fn from(i: u32) -> Self {
        PropertyValue::Int(i64::from(i))
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<NaiveDate> for PropertyValue {
    fn from(d: NaiveDate) -> Self {
        PropertyValue::Date(d)
    }
}

impl From<NaiveTime> for PropertyValue {
    fn from(t: NaiveTime) -> Self {
        PropertyValue::LocalTime(t)
    }
}

impl From<NaiveDateTime> for PropertyValue {
    fn from(dt: NaiveDateTime) -> Self {
        PropertyValue::LocalDateTime(dt)
    }
}

impl From<DateTime<FixedOffset>> for PropertyValue {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        PropertyValue::DateTime(dt)
    }
}

impl From<DateTime<Utc>> for PropertyValue {
    fn from(dt: DateTime<Utc>) -> Self {
        PropertyValue::DateTime(dt.fixed_offset())
    }
}

impl From<TimeDelta> for PropertyValue {
    fn from(d: TimeDelta) -> Self {
        PropertyValue::Duration(d)
    }
}

impl From<Point> for PropertyValue {
    fn from(p: Point) -> Self {
        PropertyValue::Point(p)
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(items: Vec<T>) -> Self {
        PropertyValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(PropertyValue::Null)
    }
}

/// Anything that can name the label of the nodes it describes.
///
/// Model metadata implements this so a model reference can stand in wherever
/// a label is expected. The returned text is treated as canonical: it is
/// spliced into patterns as-is and must already be escaped where needed.
pub trait Labeled {
    fn label(&self) -> String;
}

impl<T: Labeled + ?Sized> Labeled for &T {
    fn label(&self) -> String {
        (**self).label()
    }
}

#[cfg(test)]
mod tests {
    use super::{Labeled, Point, PropertyValue, SRID_WGS84};
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::collections::BTreeMap;

    #[test]
    fn property_value_from_json_keeps_integers_and_nesting() {
        let value = PropertyValue::try_from(serde_json::json!({
            "k": [7, true, null, 1.5]
        }))
        .expect("representable");
        assert_eq!(
            value,
            PropertyValue::Map(BTreeMap::from([(
                "k".to_string(),
                PropertyValue::List(vec![
                    PropertyValue::Int(7),
                    PropertyValue::Bool(true),
                    PropertyValue::Null,
                    PropertyValue::Float(1.5),
                ]),
            )]))
        );
    }

    #[test]
    fn json_integers_beyond_i64_are_rejected() {
        let err = PropertyValue::try_from(serde_json::json!([1, u64::MAX]))
            .expect_err("u64::MAX does not fit");
        assert_eq!(err.0.as_u64(), Some(u64::MAX));
        assert_eq!(
            PropertyValue::try_from(serde_json::json!(i64::MAX)),
            Ok(PropertyValue::Int(i64::MAX))
        );
    }

    #[test]
    fn temporal_values_serialize_as_iso_strings() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).expect("valid date");
        let json = serde_json::to_value(PropertyValue::from(date)).expect("serialize");
        assert_eq!(json, serde_json::json!("2024-02-29"));

        let dt = Utc
            .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
            .single()
            .expect("valid datetime");
        let json = serde_json::to_value(PropertyValue::from(dt)).expect("serialize");
        assert_eq!(json, serde_json::json!("2024-01-02T03:04:05+00:00"));
    }

    #[test]
    fn point_serializes_without_missing_z() {
        let json = serde_json::to_value(PropertyValue::from(Point::wgs84(4.9, 52.3)))
            .expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({ "srid": SRID_WGS84, "x": 4.9, "y": 52.3 })
        );
    }

    #[test]
    fn option_and_vec_conversions() {
        assert_eq!(PropertyValue::from(None::<i64>), PropertyValue::Null);
        assert_eq!(
            PropertyValue::from(vec![1i64, 2]),
            PropertyValue::List(vec![PropertyValue::Int(1), PropertyValue::Int(2)])
        );
        assert_eq!(PropertyValue::Int(3).as_float(), None);
        assert_eq!(PropertyValue::Int(3).type_name(), "integer");
    }

    #[test]
    fn labeled_is_implemented_through_references() {
        struct Person;
        impl Labeled for Person {
            fn label(&self) -> String {
                "Person".to_string()
            }
        }

        fn resolve(model: impl Labeled) -> String {
            model.label()
        }
        assert_eq!(resolve(&Person), "Person");
    }
}
