//! Load a [`Model`] from the JSON shape document.
//!
//! The document is a map of absolute shape ids to shape bodies:
//!
//! ```json
//! {
//!   "shapes": {
//!     "example.weather#Forecast": {
//!       "type": "structure",
//!       "members": {
//!         "chance": { "target": "smithy.api#Float", "traits": { "smithy.api#required": {} } }
//!       },
//!       "traits": { "smithy.api#documentation": "A forecast." }
//!     }
//!   }
//! }
//! ```
//!
//! ## Notes
//! - Trait keys are absolute (`smithy.api#required`). Traits the generator does not consult are ignored.
//! - Members are read into a sorted map, so member order in the loaded model is alphabetical.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::{EnumValue, ErrorFault, Member, Model, ModelError, Shape, ShapeId, ShapeKind, Traits};

const TRAIT_REQUIRED: &str = "smithy.api#required";
const TRAIT_ERROR: &str = "smithy.api#error";
const TRAIT_STREAMING: &str = "smithy.api#streaming";
const TRAIT_BOX: &str = "smithy.api#box";
const TRAIT_SPARSE: &str = "smithy.api#sparse";
const TRAIT_DOCUMENTATION: &str = "smithy.api#documentation";
const TRAIT_ENUM_VALUE: &str = "smithy.api#enumValue";

#[derive(Debug, Deserialize)]
struct JsonModel {
    #[serde(default)]
    shapes: BTreeMap<String, JsonShape>,
}

#[derive(Debug, Deserialize)]
struct JsonShape {
    #[serde(rename = "type")]
    shape_type: String,
    #[serde(default)]
    members: BTreeMap<String, JsonMember>,
    member: Option<JsonMember>,
    key: Option<JsonMember>,
    value: Option<JsonMember>,
    input: Option<JsonRef>,
    output: Option<JsonRef>,
    #[serde(default)]
    errors: Vec<JsonRef>,
    #[serde(default)]
    operations: Vec<JsonRef>,
    version: Option<String>,
    #[serde(default)]
    traits: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct JsonMember {
    target: String,
    #[serde(default)]
    traits: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct JsonRef {
    target: String,
}

impl Model {
    /// Parse a JSON shape document.
    ///
    /// ## Errors
    /// - [`ModelError::Json`] for malformed JSON.
    /// - [`ModelError::InvalidShapeId`] / [`ModelError::InvalidModel`] for malformed shapes.
    #[tracing::instrument(skip_all, fields(source_len = source.len()))]
    pub fn from_json_str(source: &str) -> Result<Model, ModelError> {
        let document: JsonModel = serde_json::from_str(source)?;
        let mut model = Model::new();
        for (raw_id, body) in &document.shapes {
            let id = ShapeId::parse(raw_id)?;
            if id.member().is_some() {
                return Err(ModelError::invalid(raw_id.as_str(), "top-level shape ids cannot name a member"));
            }
            let shape = convert_shape(id, body)?;
            model.insert(shape);
        }
        tracing::debug!(shapes = model.len(), "loaded model");
        Ok(model)
    }

    /// Read and parse a JSON shape document from disk.
    pub fn from_json_file(path: &Path) -> Result<Model, ModelError> {
        let source = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&source)
    }
}

fn convert_shape(id: ShapeId, body: &JsonShape) -> Result<Shape, ModelError> {
    let traits = convert_traits(&id, &body.traits)?;
    let members = || -> Result<Vec<Member>, ModelError> {
        body.members
            .iter()
            .map(|(name, member)| convert_member(&id, name, member))
            .collect()
    };
    let single = |field: &Option<JsonMember>, name: &str| -> Result<Box<Member>, ModelError> {
        let member = field
            .as_ref()
            .ok_or_else(|| ModelError::invalid(id.to_string(), format!("missing `{name}` member")))?;
        Ok(Box::new(convert_member(&id, name, member)?))
    };

    let kind = match body.shape_type.as_str() {
        "blob" => ShapeKind::Blob,
        "boolean" => ShapeKind::Boolean,
        "string" => ShapeKind::String,
        "byte" => ShapeKind::Byte,
        "short" => ShapeKind::Short,
        "integer" => ShapeKind::Integer,
        "long" => ShapeKind::Long,
        "float" => ShapeKind::Float,
        "double" => ShapeKind::Double,
        "bigInteger" => ShapeKind::BigInteger,
        "bigDecimal" => ShapeKind::BigDecimal,
        "timestamp" => ShapeKind::Timestamp,
        "document" => ShapeKind::Document,
        "enum" => ShapeKind::Enum {
            values: convert_enum_values(&id, &body.members, false)?,
        },
        "intEnum" => ShapeKind::IntEnum {
            values: convert_enum_values(&id, &body.members, true)?,
        },
        "list" => ShapeKind::List {
            member: single(&body.member, "member")?,
        },
        "set" => ShapeKind::Set {
            member: single(&body.member, "member")?,
        },
        "map" => ShapeKind::Map {
            key: single(&body.key, "key")?,
            value: single(&body.value, "value")?,
        },
        "structure" => ShapeKind::Structure { members: members()? },
        "union" => ShapeKind::Union { members: members()? },
        "operation" => ShapeKind::Operation {
            input: body.input.as_ref().map(|r| ShapeId::parse(&r.target)).transpose()?,
            output: body.output.as_ref().map(|r| ShapeId::parse(&r.target)).transpose()?,
            errors: parse_refs(&body.errors)?,
        },
        "service" => ShapeKind::Service {
            version: body.version.clone().unwrap_or_default(),
            operations: parse_refs(&body.operations)?,
        },
        other => {
            return Err(ModelError::invalid(id.to_string(), format!("unsupported shape type `{other}`")));
        }
    };

    Ok(Shape::new(id, kind).with_traits(traits))
}

fn convert_member(container: &ShapeId, name: &str, body: &JsonMember) -> Result<Member, ModelError> {
    let member_id = container.with_member(name);
    let traits = convert_traits(&member_id, &body.traits)?;
    Ok(Member::new(container, name, ShapeId::parse(&body.target)?).with_traits(traits))
}

fn convert_enum_values(
    id: &ShapeId,
    members: &BTreeMap<String, JsonMember>,
    int_enum: bool,
) -> Result<Vec<EnumValue>, ModelError> {
    members
        .iter()
        .map(|(name, member)| -> Result<EnumValue, ModelError> {
            let raw = member.traits.get(TRAIT_ENUM_VALUE);
            if int_enum {
                let value = raw
                    .and_then(Value::as_i64)
                    .and_then(|v| i32::try_from(v).ok())
                    .ok_or_else(|| {
                        ModelError::invalid(id.with_member(name).to_string(), "intEnum member needs an i32 enumValue")
                    })?;
                Ok(EnumValue::Int {
                    name: name.clone(),
                    value,
                })
            } else {
                let value = match raw {
                    Some(Value::String(s)) => s.clone(),
                    None => name.clone(),
                    Some(_) => {
                        return Err(ModelError::invalid(
                            id.with_member(name).to_string(),
                            "enum member enumValue must be a string",
                        ));
                    }
                };
                Ok(EnumValue::String {
                    name: name.clone(),
                    value,
                })
            }
        })
        .collect()
}

fn parse_refs(refs: &[JsonRef]) -> Result<Vec<ShapeId>, ModelError> {
    refs.iter().map(|r| ShapeId::parse(&r.target)).collect()
}

fn convert_traits(owner: &ShapeId, raw: &BTreeMap<String, Value>) -> Result<Traits, ModelError> {
    let mut traits = Traits::default();
    for (key, value) in raw {
        match key.as_str() {
            TRAIT_REQUIRED => traits.required = true,
            TRAIT_STREAMING => traits.streaming = true,
            TRAIT_BOX => traits.boxed = true,
            TRAIT_SPARSE => traits.sparse = true,
            TRAIT_DOCUMENTATION => {
                traits.documentation = value.as_str().map(str::to_string);
            }
            TRAIT_ERROR => {
                traits.error = Some(match value.as_str() {
                    Some("client") => ErrorFault::Client,
                    Some("server") => ErrorFault::Server,
                    _ => {
                        return Err(ModelError::invalid(
                            owner.to_string(),
                            "error trait must be \"client\" or \"server\"",
                        ));
                    }
                });
            }
            TRAIT_ENUM_VALUE => {}
            other => tracing::trace!(shape = %owner, trait_id = other, "ignoring trait"),
        }
    }
    Ok(traits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(text: &str) -> ShapeId {
        ShapeId::parse(text).unwrap()
    }

    const WEATHER: &str = r#"{
        "smithy": "2.0",
        "shapes": {
            "example.weather#Forecast": {
                "type": "structure",
                "members": {
                    "chance": { "target": "smithy.api#Float", "traits": { "smithy.api#required": {} } },
                    "city": { "target": "smithy.api#String" }
                },
                "traits": { "smithy.api#documentation": "A forecast." }
            },
            "example.weather#NoSuchCity": {
                "type": "structure",
                "members": {},
                "traits": { "smithy.api#error": "client" }
            },
            "example.weather#Sky": {
                "type": "enum",
                "members": {
                    "CLEAR": { "target": "smithy.api#Unit", "traits": { "smithy.api#enumValue": "clear" } },
                    "CLOUDY": { "target": "smithy.api#Unit" }
                }
            },
            "example.weather#Level": {
                "type": "intEnum",
                "members": {
                    "LOW": { "target": "smithy.api#Unit", "traits": { "smithy.api#enumValue": 1 } }
                }
            },
            "example.weather#Tags": {
                "type": "map",
                "key": { "target": "smithy.api#String" },
                "value": { "target": "smithy.api#String" }
            },
            "example.weather#GetForecast": {
                "type": "operation",
                "output": { "target": "example.weather#Forecast" },
                "errors": [ { "target": "example.weather#NoSuchCity" } ]
            },
            "example.weather#Weather": {
                "type": "service",
                "version": "2024-01-01",
                "operations": [ { "target": "example.weather#GetForecast" } ]
            }
        }
    }"#;

    #[test]
    fn test_load_structure_members_and_traits() {
        let model = Model::from_json_str(WEATHER).unwrap();
        let chance = model.expect_member(&id("example.weather#Forecast"), "chance").unwrap();
        assert!(chance.is_required());
        assert_eq!(chance.target, id("smithy.api#Float"));
        let forecast = model.expect_shape(&id("example.weather#Forecast")).unwrap();
        assert_eq!(forecast.traits.documentation.as_deref(), Some("A forecast."));
    }

    #[test]
    fn test_load_error_trait() {
        let model = Model::from_json_str(WEATHER).unwrap();
        let shape = model.expect_shape(&id("example.weather#NoSuchCity")).unwrap();
        assert_eq!(shape.traits.error, Some(ErrorFault::Client));
    }

    #[test]
    fn test_load_enums() {
        let model = Model::from_json_str(WEATHER).unwrap();
        let sky = model.expect_shape(&id("example.weather#Sky")).unwrap();
        let ShapeKind::Enum { values } = &sky.kind else {
            panic!("expected enum");
        };
        assert_eq!(
            values,
            &vec![
                EnumValue::String {
                    name: "CLEAR".to_string(),
                    value: "clear".to_string()
                },
                EnumValue::String {
                    name: "CLOUDY".to_string(),
                    value: "CLOUDY".to_string()
                },
            ]
        );
        let level = model.expect_shape(&id("example.weather#Level")).unwrap();
        assert!(matches!(&level.kind, ShapeKind::IntEnum { values } if values.len() == 1));
    }

    #[test]
    fn test_load_validates() {
        let model = Model::from_json_str(WEATHER).unwrap();
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_unknown_shape_type() {
        let err = Model::from_json_str(r#"{"shapes": {"a#B": {"type": "resource"}}}"#).unwrap_err();
        assert!(matches!(err, ModelError::InvalidModel { .. }));
    }

    #[test]
    fn test_list_requires_member() {
        let err = Model::from_json_str(r#"{"shapes": {"a#B": {"type": "list"}}}"#).unwrap_err();
        assert!(err.to_string().contains("missing `member` member"));
    }

    #[test]
    fn test_bad_error_trait_value() {
        let source = r#"{"shapes": {"a#B": {"type": "structure", "traits": {"smithy.api#error": "nobody"}}}}"#;
        assert!(Model::from_json_str(source).is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(Model::from_json_str("{"), Err(ModelError::Json(_))));
    }

    #[test]
    fn test_member_id_rejected_at_top_level() {
        let source = r#"{"shapes": {"a#B$c": {"type": "string"}}}"#;
        assert!(Model::from_json_str(source).is_err());
    }
}
