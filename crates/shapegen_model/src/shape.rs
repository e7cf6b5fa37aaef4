//! Shapes, members, and the traits the generator core consults.

use crate::ShapeId;

/// Whether an error shape is caused by the caller or the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorFault {
    Client,
    Server,
}

impl ErrorFault {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorFault::Client => "client",
            ErrorFault::Server => "server",
        }
    }
}

/// Back-reference carried by generated operation input/output shapes.
///
/// The back-reference is traceability only. It never influences naming or pointability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticTrait {
    /// Operation the shape was synthesized for.
    pub operation: ShapeId,
    /// Hand-authored shape the members were copied from, if there was one.
    pub original: Option<ShapeId>,
}

/// Annotations queryable on a shape or member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Traits {
    pub required: bool,
    pub error: Option<ErrorFault>,
    pub streaming: bool,
    /// Member (or target) must be able to represent "unset" distinctly from its zero value.
    pub boxed: bool,
    /// Collection elements may be null.
    pub sparse: bool,
    pub documentation: Option<String>,
    pub synthetic: Option<SyntheticTrait>,
}

/// One named value of an `enum` or `intEnum` shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumValue {
    String { name: String, value: String },
    Int { name: String, value: i32 },
}

impl EnumValue {
    pub fn name(&self) -> &str {
        match self {
            EnumValue::String { name, .. } | EnumValue::Int { name, .. } => name,
        }
    }
}

/// A member edge from a container shape to its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Absolute member id (`container$name`).
    pub id: ShapeId,
    pub target: ShapeId,
    pub traits: Traits,
}

impl Member {
    pub fn new(container: &ShapeId, name: &str, target: ShapeId) -> Self {
        Self {
            id: container.with_member(name),
            target,
            traits: Traits::default(),
        }
    }

    pub fn with_traits(mut self, traits: Traits) -> Self {
        self.traits = traits;
        self
    }

    pub fn name(&self) -> &str {
        self.id.member().unwrap_or_default()
    }

    pub fn container(&self) -> ShapeId {
        self.id.without_member()
    }

    pub fn is_required(&self) -> bool {
        self.traits.required
    }
}

/// Closed set of shape kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeKind {
    Blob,
    Boolean,
    String,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    BigInteger,
    BigDecimal,
    Timestamp,
    Document,
    Enum { values: Vec<EnumValue> },
    IntEnum { values: Vec<EnumValue> },
    List { member: Box<Member> },
    Set { member: Box<Member> },
    Map { key: Box<Member>, value: Box<Member> },
    Structure { members: Vec<Member> },
    Union { members: Vec<Member> },
    Operation {
        input: Option<ShapeId>,
        output: Option<ShapeId>,
        errors: Vec<ShapeId>,
    },
    Service { version: String, operations: Vec<ShapeId> },
}

impl ShapeKind {
    /// Model spelling of the shape type (`structure`, `intEnum`, ...).
    pub fn type_name(&self) -> &'static str {
        match self {
            ShapeKind::Blob => "blob",
            ShapeKind::Boolean => "boolean",
            ShapeKind::String => "string",
            ShapeKind::Byte => "byte",
            ShapeKind::Short => "short",
            ShapeKind::Integer => "integer",
            ShapeKind::Long => "long",
            ShapeKind::Float => "float",
            ShapeKind::Double => "double",
            ShapeKind::BigInteger => "bigInteger",
            ShapeKind::BigDecimal => "bigDecimal",
            ShapeKind::Timestamp => "timestamp",
            ShapeKind::Document => "document",
            ShapeKind::Enum { .. } => "enum",
            ShapeKind::IntEnum { .. } => "intEnum",
            ShapeKind::List { .. } => "list",
            ShapeKind::Set { .. } => "set",
            ShapeKind::Map { .. } => "map",
            ShapeKind::Structure { .. } => "structure",
            ShapeKind::Union { .. } => "union",
            ShapeKind::Operation { .. } => "operation",
            ShapeKind::Service { .. } => "service",
        }
    }

    /// Kinds that map onto a single scalar value.
    pub fn is_simple(&self) -> bool {
        matches!(
            self,
            ShapeKind::Blob
                | ShapeKind::Boolean
                | ShapeKind::String
                | ShapeKind::Byte
                | ShapeKind::Short
                | ShapeKind::Integer
                | ShapeKind::Long
                | ShapeKind::Float
                | ShapeKind::Double
                | ShapeKind::BigInteger
                | ShapeKind::BigDecimal
                | ShapeKind::Timestamp
                | ShapeKind::Document
        )
    }

    /// Lists, sets and maps; these have no name of their own in generated code.
    pub fn is_collection(&self) -> bool {
        matches!(self, ShapeKind::List { .. } | ShapeKind::Set { .. } | ShapeKind::Map { .. })
    }
}

/// A node in the shape graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub traits: Traits,
}

impl Shape {
    pub fn new(id: ShapeId, kind: ShapeKind) -> Self {
        Self {
            id,
            kind,
            traits: Traits::default(),
        }
    }

    pub fn with_traits(mut self, traits: Traits) -> Self {
        self.traits = traits;
        self
    }

    /// Member edges in declaration order (`key` before `value` for maps).
    pub fn members(&self) -> Vec<&Member> {
        match &self.kind {
            ShapeKind::Structure { members } | ShapeKind::Union { members } => members.iter().collect(),
            ShapeKind::List { member } | ShapeKind::Set { member } => vec![member.as_ref()],
            ShapeKind::Map { key, value } => vec![key.as_ref(), value.as_ref()],
            _ => Vec::new(),
        }
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members().into_iter().find(|m| m.name() == name)
    }

    pub fn is_error(&self) -> bool {
        self.traits.error.is_some()
    }

    pub fn is_synthetic(&self) -> bool {
        self.traits.synthetic.is_some()
    }
}
