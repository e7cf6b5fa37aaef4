//! Shape graph model for the shapegen code generator: shape ids, shapes, traits, the JSON loader, and model
//! transforms.
//!
//! The generator core only needs a small view of the model: each shape's type, its member edges, and a handful of
//! boolean-valued annotations (`required`, `error`, `streaming`, `box`, `sparse`). This crate provides exactly that
//! view, plus the loader that builds it from a JSON document.
//!
//! ## Notes
//! - Shapes are stored in a `BTreeMap` keyed by [`ShapeId`], so every iteration is sorted and reproducible.
//! - The model is read-only once loaded; transforms such as [`transform::synthesize_operation_io`] return a new model.
//!
//! ## Examples
//! ```rust
//! use shapegen_model::{Model, ShapeId};
//!
//! let model = Model::from_json_str(r#"{
//!     "shapes": {
//!         "example.weather#CityId": { "type": "string" }
//!     }
//! }"#).unwrap();
//! let id = ShapeId::parse("example.weather#CityId").unwrap();
//! assert!(model.shape(&id).is_some());
//! ```

mod errors;
pub mod json;
mod model;
mod shape;
mod shape_id;
pub mod transform;

pub use errors::ModelError;
pub use model::{Model, PRELUDE_NAMESPACE};
pub use shape::{EnumValue, ErrorFault, Member, Shape, ShapeKind, SyntheticTrait, Traits};
pub use shape_id::ShapeId;
