//! Reserved names and the per-scope escaper.
//!
//! Generated identifiers share two kinds of Go scope with names the generator itself emits: the package scope (Go
//! keywords, predeclared identifiers, [`UNKNOWN_UNION_MEMBER`], the client declarations, union variant types and
//! enum constants) and the field/method scope of each structure (accessors, [`RESULT_METADATA`], and the error method
//! set on error structures). The reservation pass walks the service closure once, before any file is written,
//! declares every name each scope will hold, and assigns the final identifiers.
//!
//! ## Assignment
//!
//! A declared name keeps its spelling unless it is reserved or already taken in its scope. Otherwise `_` is appended
//! until the result is neither reserved, declared, nor taken. Within one scope:
//!
//! - two declarations never receive the same identifier, including two shapes with one name from different
//!   namespaces (the later one in sorted id order is suffixed);
//! - no declaration receives a reserved word;
//! - escaping is idempotent: an assigned identifier escapes to itself.
//!
//! Names generated from a parent (`<Union>Member<Variant>`, `<Enum><Value>`) are reserved while shape names are
//! assigned, so user shapes move out of their way; they are assigned from the parent's final name afterwards.

use std::collections::{BTreeMap, BTreeSet};

use shapegen_core::lang::conventions::{
    self, CLIENT_NAME, ERROR_METHOD_NAMES, ESCAPE_SUFFIX, NO_DOCUMENT_SERDE, RESULT_METADATA, UNKNOWN_UNION_MEMBER,
};
use shapegen_core::lang::go_keywords::{GO_KEYWORDS, GO_PREDECLARED};
use shapegen_model::{Model, Shape, ShapeId, ShapeKind};

use super::errors::CodegenResult;

/// Package-level names written by the client generator.
const CLIENT_DECLARATIONS: &[&str] = &[CLIENT_NAME, "Handler", "New", "ServiceID", "ServiceAPIVersion"];

/// One table of reserved words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservedWords {
    words: BTreeSet<String>,
}

impl ReservedWords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Go keywords and predeclared identifiers.
    pub fn go() -> Self {
        let mut words = Self::new();
        for word in GO_KEYWORDS.iter().chain(GO_PREDECLARED.iter()) {
            words.reserve(*word);
        }
        words
    }

    pub fn reserve(&mut self, word: impl Into<String>) {
        self.words.insert(word.into());
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Identifiers of one Go scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameScope {
    reserved: ReservedWords,
    synthesized: ReservedWords,
    declared: BTreeSet<String>,
    taken: BTreeSet<String>,
    first: BTreeMap<String, String>,
}

impl NameScope {
    pub fn new(reserved: ReservedWords) -> Self {
        Self {
            reserved,
            ..Self::default()
        }
    }

    /// Announce a name assigned later; escaped identifiers never land on it.
    pub fn declare(&mut self, name: impl Into<String>) {
        self.declared.insert(name.into());
    }

    /// Reserve a name the generator writes itself. [`Self::assign`] moves around it, [`Self::assign_synthesized`]
    /// may take it.
    pub fn reserve_synthesized(&mut self, name: impl Into<String>) {
        self.synthesized.reserve(name);
    }

    /// Assign the identifier for one declaration of `name`.
    pub fn assign(&mut self, name: &str) -> String {
        let blocked = self.reserved.contains(name) || self.synthesized.contains(name);
        self.claim(name, blocked)
    }

    /// Assign the identifier for a generator-synthesized name.
    pub fn assign_synthesized(&mut self, name: &str) -> String {
        let blocked = self.reserved.contains(name);
        self.claim(name, blocked)
    }

    fn claim(&mut self, name: &str, blocked: bool) -> String {
        self.declared.insert(name.to_string());
        let chosen = if blocked || self.taken.contains(name) {
            self.fresh(name, |_| false)
        } else {
            name.to_string()
        };
        self.taken.insert(chosen.clone());
        self.first.entry(name.to_string()).or_insert_with(|| chosen.clone());
        chosen
    }

    /// Escape `name` without assigning it.
    ///
    /// A declared name maps to its first assignment and an assigned identifier maps to itself.
    pub fn escape(&self, name: &str) -> String {
        self.escape_with(name, |_| false)
    }

    /// [`Self::escape`] with `extra` treated as reserved as well.
    pub fn escape_with(&self, name: &str, extra: impl Fn(&str) -> bool) -> String {
        if let Some(chosen) = self.first.get(name) {
            return chosen.clone();
        }
        if self.taken.contains(name) {
            return name.to_string();
        }
        if self.reserved.contains(name) || self.synthesized.contains(name) || extra(name) {
            return self.fresh(name, extra);
        }
        name.to_string()
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    /// True if some declaration was assigned `name`.
    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    fn fresh(&self, name: &str, extra: impl Fn(&str) -> bool) -> String {
        let mut candidate = format!("{name}{ESCAPE_SUFFIX}");
        while self.reserved.contains(&candidate)
            || self.synthesized.contains(&candidate)
            || self.declared.contains(&candidate)
            || self.taken.contains(&candidate)
            || extra(&candidate)
        {
            candidate.push(ESCAPE_SUFFIX);
        }
        candidate
    }
}

/// Accumulates reservations and package-level declarations by plain name.
#[derive(Debug, Clone)]
pub struct ReservedWordsBuilder {
    global: ReservedWords,
    containers: BTreeMap<ShapeId, ReservedWords>,
    error_members: ReservedWords,
    declared_global: Vec<String>,
}

impl Default for ReservedWordsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReservedWordsBuilder {
    /// Start with Go keywords, predeclared identifiers, and the fixed error method set.
    pub fn new() -> Self {
        let mut error_members = ReservedWords::new();
        for word in ERROR_METHOD_NAMES {
            error_members.reserve(*word);
        }
        Self {
            global: ReservedWords::go(),
            containers: BTreeMap::new(),
            error_members,
            declared_global: Vec::new(),
        }
    }

    pub fn reserve_global(&mut self, word: impl Into<String>) -> &mut Self {
        self.global.reserve(word);
        self
    }

    pub fn reserve_in(&mut self, container: &ShapeId, word: impl Into<String>) -> &mut Self {
        self.containers.entry(container.clone()).or_default().reserve(word);
        self
    }

    pub fn reserve_error_member(&mut self, word: impl Into<String>) -> &mut Self {
        self.error_members.reserve(word);
        self
    }

    /// Declare a package-level name; names are assigned in declaration order.
    pub fn declare_global(&mut self, name: impl Into<String>) -> &mut Self {
        self.declared_global.push(name.into());
        self
    }

    pub fn build(self) -> Escaper {
        let mut package = NameScope::new(self.global);
        for name in &self.declared_global {
            package.declare(name.clone());
        }
        for name in &self.declared_global {
            package.assign(name);
        }

        let members = self
            .containers
            .into_iter()
            .map(|(id, words)| {
                let mut reserved = ReservedWords::go();
                reserved.words.extend(words.words);
                (id, NameScope::new(reserved))
            })
            .collect();

        Escaper {
            package,
            members,
            detached: NameScope::new(ReservedWords::go()),
            error_members: self.error_members,
            ..Escaper::default()
        }
    }
}

/// Read-only escaper produced by the reservation pass.
#[derive(Debug, Clone, Default)]
pub struct Escaper {
    package: NameScope,
    shape_names: BTreeMap<ShapeId, String>,
    derived: BTreeMap<(ShapeId, String), String>,
    members: BTreeMap<ShapeId, NameScope>,
    fields: BTreeMap<ShapeId, String>,
    detached: NameScope,
    error_members: ReservedWords,
}

impl Escaper {
    /// Escape a package-level identifier.
    pub fn escape_global(&self, name: &str) -> String {
        self.package.escape(name)
    }

    /// Escape a structure member's field name.
    ///
    /// The name is checked against the container's scope and, for error structures, the error method set.
    pub fn escape_member(&self, container: &Shape, name: &str) -> String {
        let scope = self.members.get(&container.id).unwrap_or(&self.detached);
        let is_error = container.is_error();
        scope.escape_with(name, |candidate| is_error && self.error_members.contains(candidate))
    }

    /// Assigned package-level name of a shape in the reserved closure.
    pub fn shape_name(&self, id: &ShapeId) -> Option<&str> {
        self.shape_names.get(id).map(String::as_str)
    }

    /// Assigned name of a union variant type or enum constant, keyed by parent shape and member name.
    pub fn derived_name(&self, parent: &ShapeId, member: &str) -> Option<&str> {
        self.derived
            .get(&(parent.clone(), member.to_string()))
            .map(String::as_str)
    }

    /// Assigned field name of a structure member, keyed by absolute member id.
    pub fn field_name(&self, member: &ShapeId) -> Option<&str> {
        self.fields.get(member).map(String::as_str)
    }

    pub fn global(&self) -> &NameScope {
        &self.package
    }

    pub fn container(&self, id: &ShapeId) -> Option<&NameScope> {
        self.members.get(id)
    }

    pub fn error_members(&self) -> &ReservedWords {
        &self.error_members
    }
}

/// Declare and assign every name the generator will write for `shapes`.
///
/// `shapes` must be in sorted id order; it decides which of two same-named shapes keeps the plain name. Must run on
/// the whole closure before generation starts; the escaper it returns is immutable.
#[tracing::instrument(skip_all, fields(shapes = shapes.len()))]
pub fn reservation_pass(model: &Model, shapes: &[ShapeId]) -> CodegenResult<Escaper> {
    let mut reserved = ReservedWords::go();
    reserved.reserve(UNKNOWN_UNION_MEMBER);
    for word in CLIENT_DECLARATIONS {
        reserved.reserve(*word);
    }
    let mut package = NameScope::new(reserved);

    let mut named: Vec<&Shape> = Vec::new();
    for id in shapes {
        let shape = model.expect_shape(id)?;
        if !declares_package_name(shape) {
            continue;
        }
        let raw = conventions::to_exported(id.name());
        for (_, derived) in derived_names(&raw, shape) {
            package.reserve_synthesized(derived);
        }
        package.declare(raw);
        named.push(shape);
    }

    let mut shape_names = BTreeMap::new();
    let mut assigned: Vec<(&Shape, String)> = Vec::with_capacity(named.len());
    for shape in named {
        let raw = conventions::to_exported(shape.id.name());
        let chosen = package.assign(&raw);
        if chosen != raw {
            tracing::debug!(shape = %shape.id, name = %chosen, "escaped shape name");
        }
        shape_names.insert(shape.id.clone(), chosen.clone());
        assigned.push((shape, chosen));
    }

    let mut derived = BTreeMap::new();
    for (shape, name) in &assigned {
        for (member, candidate) in derived_names(name, shape) {
            let chosen = package.assign_synthesized(&candidate);
            derived.insert((shape.id.clone(), member), chosen);
        }
    }

    let mut members = BTreeMap::new();
    let mut fields = BTreeMap::new();
    for (shape, _) in &assigned {
        let ShapeKind::Structure { members: declared } = &shape.kind else {
            continue;
        };
        let mut reserved = ReservedWords::go();
        reserved.reserve(NO_DOCUMENT_SERDE);
        for member in declared {
            reserved.reserve(conventions::accessor_name(member.name()));
        }
        if is_operation_output(model, shape)? {
            reserved.reserve(RESULT_METADATA);
        }
        if shape.is_error() {
            for word in ERROR_METHOD_NAMES {
                reserved.reserve(*word);
            }
        }

        let mut scope = NameScope::new(reserved);
        for member in declared {
            scope.declare(conventions::to_exported(member.name()));
        }
        for member in declared {
            let field = scope.assign(&conventions::to_exported(member.name()));
            fields.insert(member.id.clone(), field);
        }
        members.insert(shape.id.clone(), scope);
    }

    let mut error_members = ReservedWords::new();
    for word in ERROR_METHOD_NAMES {
        error_members.reserve(*word);
    }
    tracing::debug!(
        shapes = shape_names.len(),
        derived = derived.len(),
        containers = members.len(),
        "assigned names"
    );
    Ok(Escaper {
        package,
        shape_names,
        derived,
        members,
        fields,
        detached: NameScope::new(ReservedWords::go()),
        error_members,
    })
}

/// Shapes that declare a package-level Go name (operations name their client method and file).
fn declares_package_name(shape: &Shape) -> bool {
    matches!(
        shape.kind,
        ShapeKind::Structure { .. }
            | ShapeKind::Union { .. }
            | ShapeKind::Enum { .. }
            | ShapeKind::IntEnum { .. }
            | ShapeKind::Operation { .. }
    )
}

/// `(member name, identifier)` for each union variant type or enum constant of `shape`, named after `parent`.
fn derived_names(parent: &str, shape: &Shape) -> Vec<(String, String)> {
    match &shape.kind {
        ShapeKind::Union { members } => members
            .iter()
            .map(|member| {
                let variant = conventions::union_member_name(parent, member.name());
                (member.name().to_string(), variant)
            })
            .collect(),
        ShapeKind::Enum { values } | ShapeKind::IntEnum { values } => values
            .iter()
            .map(|value| {
                let constant = format!("{parent}{}", conventions::enum_value_name(value.name()));
                (value.name().to_string(), constant)
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// True if `shape` is the synthesized output of its operation.
pub fn is_operation_output(model: &Model, shape: &Shape) -> CodegenResult<bool> {
    let Some(synthetic) = &shape.traits.synthetic else {
        return Ok(false);
    };
    let operation = model.expect_shape(&synthetic.operation)?;
    Ok(matches!(&operation.kind, ShapeKind::Operation { output: Some(out), .. } if *out == shape.id))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shapegen_model::{EnumValue, ErrorFault, Member, Traits};

    fn id(text: &str) -> ShapeId {
        ShapeId::parse(text).unwrap()
    }

    fn structure(name: &str, members: &[&str]) -> Shape {
        let shape_id = id(name);
        let members = members
            .iter()
            .map(|m| Member::new(&shape_id, m, id("smithy.api#String")))
            .collect();
        Shape::new(shape_id, ShapeKind::Structure { members })
    }

    fn string_enum(name: &str, values: &[&str]) -> Shape {
        let values = values
            .iter()
            .map(|v| EnumValue::String {
                name: v.to_string(),
                value: v.to_ascii_lowercase(),
            })
            .collect();
        Shape::new(id(name), ShapeKind::Enum { values })
    }

    fn pass(shapes: Vec<Shape>) -> (Model, Escaper) {
        let mut model = Model::new();
        let mut ids: Vec<ShapeId> = shapes.iter().map(|s| s.id.clone()).collect();
        ids.sort();
        for shape in shapes {
            model.insert(shape);
        }
        let escaper = reservation_pass(&model, &ids).unwrap();
        (model, escaper)
    }

    // ========================================
    // NameScope
    // ========================================

    #[test]
    fn test_reserved_name_moves_past_declared_names() {
        let mut reserved = ReservedWords::new();
        reserved.reserve("Foo");
        let mut scope = NameScope::new(reserved);
        for name in ["Foo", "Foo_"] {
            scope.declare(name);
        }
        assert_eq!(scope.assign("Foo"), "Foo__");
        assert_eq!(scope.assign("Foo_"), "Foo_");
        assert_eq!(scope.escape("Foo"), "Foo__");
        assert_eq!(scope.escape("Foo__"), "Foo__");
    }

    #[test]
    fn test_repeated_declaration_is_suffixed() {
        let mut scope = NameScope::new(ReservedWords::go());
        scope.declare("Thing");
        assert_eq!(scope.assign("Thing"), "Thing");
        assert_eq!(scope.assign("Thing"), "Thing_");
        assert!(scope.is_taken("Thing_"));
    }

    #[test]
    fn test_synthesized_name_wins_over_declaration() {
        let mut scope = NameScope::new(ReservedWords::go());
        scope.reserve_synthesized("SkyClear");
        scope.declare("SkyClear");
        assert_eq!(scope.assign("SkyClear"), "SkyClear_");
        assert_eq!(scope.assign_synthesized("SkyClear"), "SkyClear");
    }

    // ========================================
    // Escaper
    // ========================================

    #[test]
    fn test_escape_global_keyword() {
        let escaper = ReservedWordsBuilder::new().build();
        assert_eq!(escaper.escape_global("type"), "type_");
        assert_eq!(escaper.escape_global("type_"), "type_");
        assert_eq!(escaper.escape_global("string"), "string_");
        assert_eq!(escaper.escape_global("Forecast"), "Forecast");
    }

    #[test]
    fn test_escape_is_collision_free() {
        let inputs = ["Foo", "Foo_", "Foo__", "Bar", "Bar_"];
        let mut builder = ReservedWordsBuilder::new();
        builder.reserve_global("Foo");
        for name in inputs {
            builder.declare_global(name);
        }
        let escaper = builder.build();
        let outputs: BTreeSet<String> = inputs.iter().map(|n| escaper.escape_global(n)).collect();
        assert_eq!(outputs.len(), inputs.len());
        assert!(!outputs.contains("Foo"));
        assert_eq!(escaper.escape_global("Foo_"), "Foo_");
    }

    #[test]
    fn test_escape_member_scopes() {
        let container = Shape::new(id("ns#Thing"), ShapeKind::Structure { members: vec![] });
        let error = Shape::new(id("ns#Oops"), ShapeKind::Structure { members: vec![] }).with_traits(Traits {
            error: Some(ErrorFault::Client),
            ..Traits::default()
        });
        let mut builder = ReservedWordsBuilder::new();
        builder.reserve_in(&container.id, "GetName");
        let escaper = builder.build();

        assert_eq!(escaper.escape_member(&container, "GetName"), "GetName_");
        assert_eq!(escaper.escape_member(&error, "GetName"), "GetName");
        assert_eq!(escaper.escape_member(&error, "ErrorCode"), "ErrorCode_");
        assert_eq!(escaper.escape_member(&container, "ErrorCode"), "ErrorCode");
    }

    #[test]
    fn test_extra_error_member_reservation() {
        let error = Shape::new(id("ns#Oops"), ShapeKind::Structure { members: vec![] }).with_traits(Traits {
            error: Some(ErrorFault::Server),
            ..Traits::default()
        });
        let mut builder = ReservedWordsBuilder::new();
        builder.reserve_error_member("Temporary");
        let escaper = builder.build();
        assert_eq!(escaper.escape_member(&error, "Temporary"), "Temporary_");
        assert_eq!(escaper.escape_member(&error, "Temporary_"), "Temporary_");
    }

    // ========================================
    // Reservation pass
    // ========================================

    #[test]
    fn test_reservation_pass_collects_synthesized_names() {
        let union = id("ns#Precipitation");
        let precipitation = Shape::new(
            union.clone(),
            ShapeKind::Union {
                members: vec![Member::new(&union, "rain", id("smithy.api#Double"))],
            },
        );
        let (_, escaper) = pass(vec![precipitation, structure("ns#City", &["name"])]);
        let city = id("ns#City");

        assert_eq!(escaper.derived_name(&union, "rain"), Some("PrecipitationMemberRain"));
        assert!(escaper.global().is_taken("PrecipitationMemberRain"));
        assert!(escaper.global().is_reserved(UNKNOWN_UNION_MEMBER));
        let table = escaper.container(&city).unwrap();
        assert!(table.is_reserved("GetName"));
        assert!(table.is_reserved(NO_DOCUMENT_SERDE));
        assert!(!table.is_reserved(RESULT_METADATA));
        assert_eq!(escaper.field_name(&id("ns#City$name")), Some("Name"));
    }

    #[test]
    fn test_structure_named_like_enum_constant_is_escaped() {
        let (_, escaper) = pass(vec![string_enum("ns#Sky", &["CLEAR"]), structure("ns#SkyClear", &[])]);
        assert_eq!(escaper.derived_name(&id("ns#Sky"), "CLEAR"), Some("SkyClear"));
        assert_eq!(escaper.shape_name(&id("ns#SkyClear")), Some("SkyClear_"));
        assert_eq!(escaper.shape_name(&id("ns#Sky")), Some("Sky"));
    }

    #[test]
    fn test_same_name_in_two_namespaces() {
        let (_, escaper) = pass(vec![structure("other#Thing", &["y"]), structure("ns#Thing", &["x"])]);
        assert_eq!(escaper.shape_name(&id("ns#Thing")), Some("Thing"));
        assert_eq!(escaper.shape_name(&id("other#Thing")), Some("Thing_"));
    }

    #[test]
    fn test_colliding_enum_constants_are_suffixed() {
        let (_, escaper) = pass(vec![string_enum("ns#A", &["BC"]), string_enum("ns#AB", &["C"])]);
        let first = escaper.derived_name(&id("ns#A"), "BC").unwrap();
        let second = escaper.derived_name(&id("ns#AB"), "C").unwrap();
        assert_eq!(first, "ABc");
        assert_eq!(second, "ABC");

        let (_, escaper) = pass(vec![string_enum("ns#A", &["B_C"]), string_enum("ns#AB", &["C"])]);
        assert_eq!(escaper.derived_name(&id("ns#A"), "B_C"), Some("ABC"));
        assert_eq!(escaper.derived_name(&id("ns#AB"), "C"), Some("ABC_"));
    }

    #[test]
    fn test_fields_differing_in_case_stay_distinct() {
        let (_, escaper) = pass(vec![structure("ns#Pair", &["value", "Value"])]);
        let lower = escaper.field_name(&id("ns#Pair$value")).unwrap();
        let upper = escaper.field_name(&id("ns#Pair$Value")).unwrap();
        assert_ne!(lower, upper);
    }
}
