//! Map shapes and members to [`Symbol`]s.
//!
//! ## Namespaces
//!
//! - Synthesized operation input/output, operations, and the service client live in the module root.
//! - Structures, unions, enums, and errors live in `<module>/types`.
//! - Document support lives in `<module>/document`.
//! - Simple shapes map to predeclared types, `time.Time`, or `*big.Int` / `*big.Float`.
//!
//! ## Pointability
//!
//! A structure member is written through a pointer when the target cannot otherwise represent "unset": scalar and
//! timestamp targets are pointers unless the member is required and not boxed; structure targets are always
//! pointers. Slices, maps, blobs, documents, unions, and enums are nil-able or have a zero sentinel and stay values.
//! Collection elements are pointers only for sparse collections of pointable targets.

use shapegen_core::lang::conventions::{self, CLIENT_NAME, DOCUMENT_PACKAGE, TYPES_PACKAGE};
use shapegen_core::lang::types::{self as go_types, GoTypeId};
use shapegen_model::{Member, Model, Shape, ShapeId, ShapeKind};

use super::dependency::packages;
use super::errors::CodegenResult;
use super::reserved::Escaper;
use super::settings::CodegenSettings;
use super::symbol::{PointerKind, Symbol};

/// File holding structures and unions of the types package.
pub const TYPES_FILE: &str = "types/types.go";
/// File holding enums of the types package.
pub const ENUMS_FILE: &str = "types/enums.go";
/// File holding error structures of the types package.
pub const ERRORS_FILE: &str = "types/errors.go";
/// File holding the document interface.
pub const DOCUMENT_FILE: &str = "document/document.go";
/// File holding the client type.
pub const CLIENT_FILE: &str = "api_client.go";

/// File holding one operation and its input/output.
pub fn operation_file(operation: &str) -> String {
    format!("api_op_{}.go", conventions::to_exported(operation))
}

/// Package paths of the generated module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    pub root: String,
    pub types: String,
    pub document: String,
}

impl Namespaces {
    pub fn for_module(module: &str) -> Self {
        Self {
            root: module.to_string(),
            types: format!("{module}/{TYPES_PACKAGE}"),
            document: format!("{module}/{DOCUMENT_PACKAGE}"),
        }
    }
}

/// Deterministic shape → symbol mapping for one generation run.
#[derive(Debug, Clone)]
pub struct SymbolResolver<'a> {
    model: &'a Model,
    escaper: &'a Escaper,
    namespaces: Namespaces,
}

impl<'a> SymbolResolver<'a> {
    pub fn new(model: &'a Model, settings: &CodegenSettings, escaper: &'a Escaper) -> Self {
        Self {
            model,
            escaper,
            namespaces: Namespaces::for_module(&settings.module),
        }
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    /// Resolve the symbol for a shape as it is declared.
    ///
    /// Structures resolve by value here; member references decide pointability.
    ///
    /// ## Errors
    /// - [`shapegen_model::ModelError::UnknownShapeReference`] if `id` is not in the model.
    pub fn resolve_shape(&self, id: &ShapeId) -> CodegenResult<Symbol> {
        let shape = self.model.expect_shape(id)?;
        self.shape_symbol(shape)
    }

    /// Resolve the symbol for a member reference, with pointability applied.
    pub fn resolve_member(&self, member: &Member) -> CodegenResult<Symbol> {
        let container = self.model.expect_shape(&member.container())?;
        let target = self.model.expect_shape(&member.target)?;
        let symbol = self.shape_symbol(target)?;
        if symbol.is_pointer() {
            return Ok(symbol);
        }
        let pointer = match &container.kind {
            ShapeKind::Structure { .. } => is_pointable(target, member.traits.required, member.traits.boxed),
            ShapeKind::List { .. } | ShapeKind::Set { .. } | ShapeKind::Map { .. } => {
                container.traits.sparse && is_pointable(target, false, false)
            }
            _ => false,
        };
        Ok(if pointer {
            symbol.with_pointer_kind(PointerKind::Pointer)
        } else {
            symbol
        })
    }

    /// Escaped field name of a member.
    pub fn member_name(&self, member: &Member) -> CodegenResult<String> {
        if let Some(field) = self.escaper.field_name(&member.id) {
            return Ok(field.to_string());
        }
        let container = self.model.expect_shape(&member.container())?;
        let exported = conventions::to_exported(member.name());
        Ok(self.escaper.escape_member(container, &exported))
    }

    /// Escaped package-level name of a generated shape.
    pub fn shape_name(&self, id: &ShapeId) -> String {
        match self.escaper.shape_name(id) {
            Some(name) => name.to_string(),
            None => self.escaper.escape_global(&conventions::to_exported(id.name())),
        }
    }

    /// Type name of the variant wrapping union member `member`.
    pub fn union_variant_name(&self, union: &ShapeId, member: &str) -> String {
        match self.escaper.derived_name(union, member) {
            Some(name) => name.to_string(),
            None => self
                .escaper
                .escape_global(&conventions::union_member_name(&self.shape_name(union), member)),
        }
    }

    /// Constant name of one enum value.
    pub fn enum_constant_name(&self, enumeration: &ShapeId, value: &str) -> String {
        match self.escaper.derived_name(enumeration, value) {
            Some(name) => name.to_string(),
            None => self.escaper.escape_global(&format!(
                "{}{}",
                self.shape_name(enumeration),
                conventions::enum_value_name(value)
            )),
        }
    }

    fn shape_symbol(&self, shape: &Shape) -> CodegenResult<Symbol> {
        let symbol = match &shape.kind {
            ShapeKind::Blob => Symbol::slice(builtin(GoTypeId::Byte)),
            ShapeKind::Boolean => builtin(GoTypeId::Bool),
            ShapeKind::String => builtin(GoTypeId::String),
            ShapeKind::Byte => builtin(GoTypeId::Int8),
            ShapeKind::Short => builtin(GoTypeId::Int16),
            ShapeKind::Integer => builtin(GoTypeId::Int32),
            ShapeKind::Long => builtin(GoTypeId::Int64),
            ShapeKind::Float => builtin(GoTypeId::Float32),
            ShapeKind::Double => builtin(GoTypeId::Float64),
            ShapeKind::BigInteger => Symbol::new("Int", "math/big")
                .with_pointer_kind(PointerKind::Pointer)
                .with_dependency(packages::math_big()),
            ShapeKind::BigDecimal => Symbol::new("Float", "math/big")
                .with_pointer_kind(PointerKind::Pointer)
                .with_dependency(packages::math_big()),
            ShapeKind::Timestamp => Symbol::new("Time", "time").with_dependency(packages::time()),
            ShapeKind::Document => {
                Symbol::new("Interface", &self.namespaces.document).with_definition_file(DOCUMENT_FILE)
            }
            ShapeKind::List { member } | ShapeKind::Set { member } => Symbol::slice(self.resolve_member(member)?),
            ShapeKind::Map { value, .. } => Symbol::map(self.resolve_member(value)?),
            ShapeKind::Enum { .. } | ShapeKind::IntEnum { .. } => self.types_symbol(shape, ENUMS_FILE),
            ShapeKind::Union { .. } => self.types_symbol(shape, TYPES_FILE),
            ShapeKind::Structure { .. } => match &shape.traits.synthetic {
                Some(synthetic) => Symbol::new(self.shape_name(&shape.id), &self.namespaces.root)
                    .with_definition_file(operation_file(&self.shape_name(&synthetic.operation))),
                None if shape.is_error() => self.types_symbol(shape, ERRORS_FILE),
                None => self.types_symbol(shape, TYPES_FILE),
            },
            ShapeKind::Operation { .. } => {
                let name = self.shape_name(&shape.id);
                let file = operation_file(&name);
                Symbol::new(name, &self.namespaces.root).with_definition_file(file)
            }
            ShapeKind::Service { .. } => {
                Symbol::new(CLIENT_NAME, &self.namespaces.root).with_definition_file(CLIENT_FILE)
            }
        };
        Ok(symbol.with_origin(shape.id.clone()))
    }

    fn types_symbol(&self, shape: &Shape, file: &str) -> Symbol {
        Symbol::new(self.shape_name(&shape.id), &self.namespaces.types).with_definition_file(file)
    }
}

fn builtin(id: GoTypeId) -> Symbol {
    Symbol::builtin(go_types::as_str(id))
}

/// Scalars and timestamps may need a pointer to represent "unset"; structures always do.
fn is_pointable(target: &Shape, required: bool, boxed: bool) -> bool {
    match &target.kind {
        ShapeKind::Boolean
        | ShapeKind::String
        | ShapeKind::Byte
        | ShapeKind::Short
        | ShapeKind::Integer
        | ShapeKind::Long
        | ShapeKind::Float
        | ShapeKind::Double
        | ShapeKind::Timestamp => !required || boxed || target.traits.boxed,
        ShapeKind::Structure { .. } | ShapeKind::BigInteger | ShapeKind::BigDecimal => true,
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::reserved::reservation_pass;
    use crate::backend::symbol::ContainerKind;
    use shapegen_model::Traits;

    fn id(text: &str) -> ShapeId {
        ShapeId::parse(text).unwrap()
    }

    fn required() -> Traits {
        Traits {
            required: true,
            ..Traits::default()
        }
    }

    fn boxed() -> Traits {
        Traits {
            boxed: true,
            ..Traits::default()
        }
    }

    fn model() -> Model {
        let mut model = Model::new();
        let forecast = id("ns#Forecast");
        model.insert(Shape::new(
            forecast.clone(),
            ShapeKind::Structure {
                members: vec![
                    Member::new(&forecast, "city", id("smithy.api#String")).with_traits(required()),
                    Member::new(&forecast, "chance", id("smithy.api#Integer")).with_traits(boxed()),
                    Member::new(&forecast, "observed", id("smithy.api#Timestamp")),
                    Member::new(&forecast, "tags", id("ns#Tags")),
                    Member::new(&forecast, "next", id("ns#Forecast")),
                    Member::new(&forecast, "type", id("smithy.api#String")).with_traits(required()),
                    Member::new(&forecast, "getCity", id("smithy.api#String")),
                ],
            },
        ));
        let tags = id("ns#Tags");
        model.insert(
            Shape::new(
                tags.clone(),
                ShapeKind::List {
                    member: Box::new(Member::new(&tags, "member", id("smithy.api#String"))),
                },
            )
            .with_traits(Traits {
                sparse: true,
                ..Traits::default()
            }),
        );
        let plain = id("ns#Plain");
        model.insert(Shape::new(
            plain.clone(),
            ShapeKind::List {
                member: Box::new(Member::new(&plain, "member", id("ns#Forecast"))),
            },
        ));
        model
    }

    fn with_resolver<T>(f: impl FnOnce(&SymbolResolver<'_>) -> T) -> T {
        let model = model();
        let shapes: Vec<ShapeId> = model.shapes().map(|s| s.id.clone()).collect();
        let escaper = reservation_pass(&model, &shapes).unwrap();
        let settings = CodegenSettings::new("github.com/acme/weather", id("ns#Weather"));
        let resolver = SymbolResolver::new(&model, &settings, &escaper);
        f(&resolver)
    }

    fn member_symbol(resolver: &SymbolResolver<'_>, member_id: &str) -> Symbol {
        let model = resolver.model;
        resolver.resolve_member(model.member(&id(member_id)).unwrap()).unwrap()
    }

    #[test]
    fn test_required_string_is_value() {
        with_resolver(|r| {
            let sym = member_symbol(r, "ns#Forecast$city");
            assert_eq!(sym.name(), "string");
            assert_eq!(sym.pointer_kind(), PointerKind::Value);
        });
    }

    #[test]
    fn test_boxed_integer_is_pointer() {
        with_resolver(|r| {
            let sym = member_symbol(r, "ns#Forecast$chance");
            assert_eq!(sym.name(), "int32");
            assert!(sym.is_pointer());
        });
    }

    #[test]
    fn test_optional_timestamp_is_pointer_with_dependency() {
        with_resolver(|r| {
            let sym = member_symbol(r, "ns#Forecast$observed");
            assert_eq!(sym.namespace(), "time");
            assert!(sym.is_pointer());
            assert_eq!(sym.dependencies()[0].import_path(), "time");
        });
    }

    #[test]
    fn test_structure_member_is_pointer() {
        with_resolver(|r| {
            let sym = member_symbol(r, "ns#Forecast$next");
            assert!(sym.is_pointer());
            assert_eq!(sym.namespace(), "github.com/acme/weather/types");
            assert_eq!(sym.definition_file(), Some(TYPES_FILE));
        });
    }

    #[test]
    fn test_sparse_list_elements_are_pointers() {
        with_resolver(|r| {
            let sym = member_symbol(r, "ns#Forecast$tags");
            assert_eq!(sym.container_kind(), ContainerKind::Slice);
            assert!(!sym.is_pointer());
            assert!(sym.element().unwrap().is_pointer());
        });
    }

    #[test]
    fn test_dense_list_of_structures_holds_values() {
        with_resolver(|r| {
            let sym = r.resolve_shape(&id("ns#Plain")).unwrap();
            assert!(!sym.element().unwrap().is_pointer());
        });
    }

    #[test]
    fn test_member_names_escaped() {
        with_resolver(|r| {
            let model = r.model;
            let ty = model.member(&id("ns#Forecast$type")).unwrap();
            assert_eq!(r.member_name(ty).unwrap(), "Type");
            let get_city = model.member(&id("ns#Forecast$getCity")).unwrap();
            assert_eq!(r.member_name(get_city).unwrap(), "GetCity_");
        });
    }

    #[test]
    fn test_unknown_shape() {
        with_resolver(|r| {
            let err = r.resolve_shape(&id("ns#Nope")).unwrap_err();
            assert!(err.to_string().contains("ns#Nope"));
        });
    }

    #[test]
    fn test_same_shape_resolves_identically() {
        with_resolver(|r| {
            let a = r.resolve_shape(&id("ns#Forecast")).unwrap();
            let b = r.resolve_shape(&id("ns#Forecast")).unwrap();
            assert_eq!(a, b);
            assert_eq!(a.pointer_kind(), b.pointer_kind());
        });
    }

    #[test]
    fn test_operation_file_names() {
        assert_eq!(operation_file("GetForecast"), "api_op_GetForecast.go");
        let ns = Namespaces::for_module("github.com/acme/weather");
        assert_eq!(ns.types, "github.com/acme/weather/types");
        assert_eq!(ns.document, "github.com/acme/weather/document");
    }
}
