//! Go declarations for each kind of generated shape.
//!
//! Generators only write text; every name comes from the [`SymbolResolver`] and every foreign reference goes
//! through [`GoWriter::write_type`], so imports and dependencies are recorded as a side effect.

use shapegen_core::lang::conventions::{CLIENT_NAME, RESULT_METADATA, UNKNOWN_UNION_MEMBER};
use shapegen_core::lang::types::{self as go_types, GoTypeId};
use shapegen_model::{EnumValue, ErrorFault, Member, Model, Shape, ShapeKind};

use super::dependency::packages;
use super::errors::{CodegenError, CodegenResult};
use super::reserved::is_operation_output;
use super::resolver::SymbolResolver;
use super::symbol::Symbol;
use super::writer::{GoWriter, quote};

const REQUIRED_DOC: &str = "This member is required.";

/// Writes declarations for shapes of one model.
#[derive(Debug, Clone, Copy)]
pub struct ShapeGenerator<'a> {
    model: &'a Model,
    resolver: &'a SymbolResolver<'a>,
}

impl<'a> ShapeGenerator<'a> {
    pub fn new(model: &'a Model, resolver: &'a SymbolResolver<'a>) -> Self {
        Self { model, resolver }
    }

    // ---- structures ----

    /// `type X struct { ... }`, plus the error method set for error structures.
    pub fn structure(&self, w: &mut GoWriter, shape: &Shape) -> CodegenResult<()> {
        let ShapeKind::Structure { members } = &shape.kind else {
            return Err(unexpected(shape, "structure"));
        };
        let symbol = self.resolver.resolve_shape(&shape.id)?;
        let is_output = is_operation_output(self.model, shape)?;

        if let Some(docs) = &shape.traits.documentation {
            w.write_docs(docs)?;
        }
        w.block(&format!("type {} struct {{", symbol.name()), "}", |w| {
            for (i, member) in required_then_alphabetical(members).into_iter().enumerate() {
                if i > 0 {
                    w.newline();
                }
                self.field(w, member)?;
            }
            if is_output {
                if !members.is_empty() {
                    w.newline();
                }
                w.write_docs("Metadata pertaining to the operation's result.")?;
                w.write(RESULT_METADATA).write(" ");
                w.write_type(&result_metadata())?;
                w.newline();
            }
            Ok(())
        })?;

        if let Some(fault) = shape.traits.error {
            self.error_methods(w, shape, &symbol, fault)?;
        }
        Ok(())
    }

    fn field(&self, w: &mut GoWriter, member: &Member) -> CodegenResult<()> {
        let docs = match (&member.traits.documentation, member.is_required()) {
            (Some(docs), true) => Some(format!("{}\n\n{REQUIRED_DOC}", docs.trim_end())),
            (Some(docs), false) => Some(docs.clone()),
            (None, true) => Some(REQUIRED_DOC.to_string()),
            (None, false) => None,
        };
        if let Some(docs) = docs {
            w.write_docs(&docs)?;
        }
        w.write(&self.resolver.member_name(member)?).write(" ");
        w.write_type(&self.resolver.resolve_member(member)?)?;
        w.newline();
        Ok(())
    }

    fn error_methods(&self, w: &mut GoWriter, shape: &Shape, symbol: &Symbol, fault: ErrorFault) -> CodegenResult<()> {
        let receiver = format!("func (e *{})", symbol.name());

        w.ensure_blank_line();
        w.block(&format!("{receiver} Error() string {{"), "}", |w| {
            w.write("return ");
            w.write_type(&sprintf())?;
            w.writeln("(\"%s: %s\", e.ErrorCode(), e.ErrorMessage())");
            Ok(())
        })?;

        w.ensure_blank_line();
        w.block(&format!("{receiver} ErrorMessage() string {{"), "}", |w| {
            self.error_message_body(w, shape)
        })?;

        w.ensure_blank_line();
        w.block(&format!("{receiver} ErrorCode() string {{"), "}", |w| {
            w.write("return ").write_string(shape.id.name()).newline();
            Ok(())
        })?;

        w.ensure_blank_line();
        let fault_type = smithy_symbol("ErrorFault");
        let fault_value = smithy_symbol(match fault {
            ErrorFault::Client => "FaultClient",
            ErrorFault::Server => "FaultServer",
        });
        w.write(&receiver).write(" ErrorFault() ");
        w.write_type(&fault_type)?;
        w.block(" {", "}", |w| {
            w.write("return ");
            w.write_type(&fault_value)?;
            w.newline();
            Ok(())
        })?;
        Ok(())
    }

    fn error_message_body(&self, w: &mut GoWriter, shape: &Shape) -> CodegenResult<()> {
        let message = shape
            .members()
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case("message"));
        let Some(member) = message else {
            w.write("return ").writeln(go_types::zero_value(GoTypeId::String));
            return Ok(());
        };
        let target = self.model.expect_shape(&member.target)?;
        if !matches!(target.kind, ShapeKind::String) {
            w.write("return ").writeln(go_types::zero_value(GoTypeId::String));
            return Ok(());
        }

        let field = self.resolver.member_name(member)?;
        if self.resolver.resolve_member(member)?.is_pointer() {
            w.block(&format!("if e.{field} == nil {{"), "}", |w| {
                w.write("return ").writeln(go_types::zero_value(GoTypeId::String));
                Ok(())
            })?;
            w.writeln(&format!("return *e.{field}"));
        } else {
            w.writeln(&format!("return e.{field}"));
        }
        Ok(())
    }

    // ---- unions ----

    /// Sealed interface plus one `<Union>Member<Variant>` struct per variant.
    pub fn union(&self, w: &mut GoWriter, shape: &Shape) -> CodegenResult<()> {
        let ShapeKind::Union { members } = &shape.kind else {
            return Err(unexpected(shape, "union"));
        };
        let symbol = self.resolver.resolve_shape(&shape.id)?;
        let marker = union_marker(symbol.name());

        let mut docs = shape.traits.documentation.clone().unwrap_or_default();
        if !docs.is_empty() {
            docs.push_str("\n\n");
        }
        docs.push_str("The following types satisfy this interface:\n");
        let mut variants = Vec::with_capacity(members.len());
        for member in members {
            let variant = self.resolver.union_variant_name(&shape.id, member.name());
            docs.push_str(&format!("\n  - {variant}"));
            variants.push((variant, member));
        }
        w.write_docs(&docs)?;
        w.block(&format!("type {} interface {{", symbol.name()), "}", |w| {
            w.writeln(&format!("{marker}()"));
            Ok(())
        })?;

        for (variant, member) in variants {
            w.ensure_blank_line();
            if let Some(docs) = &member.traits.documentation {
                w.write_docs(docs)?;
            }
            w.block(&format!("type {variant} struct {{"), "}", |w| {
                w.write("Value ");
                w.write_type(&self.resolver.resolve_member(member)?)?;
                w.newline();
                Ok(())
            })?;
            w.ensure_blank_line();
            w.writeln(&format!("func (*{variant}) {marker}() {{}}"));
        }
        Ok(())
    }

    /// `UnknownUnionMember`, satisfying every union in `unions`.
    pub fn unknown_union_member(&self, w: &mut GoWriter, unions: &[&Shape]) -> CodegenResult<()> {
        w.write_docs(&format!(
            "{UNKNOWN_UNION_MEMBER} is returned when a union member is returned over the wire, but has an unknown tag."
        ))?;
        w.block(&format!("type {UNKNOWN_UNION_MEMBER} struct {{"), "}", |w| {
            w.writeln("Tag string");
            w.newline();
            w.writeln("Value []byte");
            Ok(())
        })?;
        for shape in unions {
            let symbol = self.resolver.resolve_shape(&shape.id)?;
            w.ensure_blank_line();
            w.writeln(&format!(
                "func (*{UNKNOWN_UNION_MEMBER}) {}() {{}}",
                union_marker(symbol.name())
            ));
        }
        Ok(())
    }

    // ---- enums ----

    /// `type X string` or `type X int32`, the value constants, and `Values()`.
    pub fn enumeration(&self, w: &mut GoWriter, shape: &Shape) -> CodegenResult<()> {
        let (values, underlying) = match &shape.kind {
            ShapeKind::Enum { values } => (values, GoTypeId::String),
            ShapeKind::IntEnum { values } => (values, GoTypeId::Int32),
            _ => return Err(unexpected(shape, "enum")),
        };
        let symbol = self.resolver.resolve_shape(&shape.id)?;
        let name = symbol.name();

        if let Some(docs) = &shape.traits.documentation {
            w.write_docs(docs)?;
        }
        w.writeln(&format!("type {name} {}", go_types::as_str(underlying)));

        let constants: Vec<(String, String)> = values
            .iter()
            .map(|value| {
                let constant = self.resolver.enum_constant_name(&shape.id, value.name());
                (constant, enum_literal(value))
            })
            .collect();

        if !constants.is_empty() {
            let width = constants.iter().map(|(c, _)| c.len()).max().unwrap_or_default();
            w.newline();
            w.writeln(&format!("// Enum values for {name}"));
            w.block("const (", ")", |w| {
                for (constant, literal) in &constants {
                    w.writeln(&format!("{constant:<width$} {name} = {literal}"));
                }
                Ok(())
            })?;
        }

        w.newline();
        w.writeln(&format!("// Values returns all known values for {name}."));
        w.block(&format!("func ({name}) Values() []{name} {{"), "}", |w| {
            w.block(&format!("return []{name}{{"), "}", |w| {
                for (_, literal) in &constants {
                    w.write_literal(literal).writeln(",");
                }
                Ok(())
            })?;
            Ok(())
        })?;
        Ok(())
    }

    // ---- operations and service ----

    /// Client method for one operation.
    pub fn operation(&self, w: &mut GoWriter, shape: &Shape) -> CodegenResult<()> {
        let ShapeKind::Operation {
            input: Some(input),
            output: Some(output),
            ..
        } = &shape.kind
        else {
            return Err(unexpected(shape, "operation with synthesized input and output"));
        };
        let client = Symbol::new(CLIENT_NAME, &self.resolver.namespaces().root);
        let input = self.resolver.resolve_shape(input)?;
        let output = self.resolver.resolve_shape(output)?;
        let method = self.resolver.shape_name(&shape.id);

        if let Some(docs) = &shape.traits.documentation {
            w.write_docs(docs)?;
        }
        w.write("func (c ");
        w.write_pointer_type(&client)?;
        w.write(&format!(") {method}(ctx "));
        w.write_type(&context_symbol())?;
        w.write(", params ");
        w.write_pointer_type(&input)?;
        w.write(") (");
        w.write_pointer_type(&output)?;
        w.write(", error)");
        w.block(" {", "}", |w| {
            let input_value = w.type_reference(&input)?;
            let output_pointer = format!("*{}", w.type_reference(&output)?);
            w.block("if params == nil {", "}", |w| {
                w.writeln(&format!("params = &{input_value}{{}}"));
                Ok(())
            })?;
            w.write("result, err := c.handler.Handle(ctx, ")
                .write_string(shape.id.name())
                .writeln(", params)");
            w.block("if err != nil {", "}", |w| {
                w.writeln("return nil, err");
                Ok(())
            })?;
            w.writeln(&format!("out, ok := result.({output_pointer})"));
            w.block("if !ok {", "}", |w| {
                w.write("return nil, ");
                w.write_type(&errorf())?;
                w.write("(")
                    .write_string(&format!("unexpected result type %T for {}", shape.id.name()))
                    .writeln(", result)");
                Ok(())
            })?;
            w.writeln("return out, nil");
            Ok(())
        })?;
        Ok(())
    }

    /// `Client`, its `Handler`, and service identification constants.
    pub fn service(&self, w: &mut GoWriter, shape: &Shape) -> CodegenResult<()> {
        let ShapeKind::Service { version, .. } = &shape.kind else {
            return Err(unexpected(shape, "service"));
        };
        let service_name = shape.id.name();

        let docs = shape
            .traits
            .documentation
            .clone()
            .unwrap_or_else(|| format!("{CLIENT_NAME} is the client for the {service_name} service."));
        w.write_docs(&docs)?;
        w.block(&format!("type {CLIENT_NAME} struct {{"), "}", |w| {
            w.writeln("handler Handler");
            Ok(())
        })?;

        w.newline();
        w.write_docs(&format!("Handler performs one operation call on behalf of a {CLIENT_NAME}."))?;
        w.block("type Handler interface {", "}", |w| {
            w.write("Handle(ctx ");
            w.write_type(&context_symbol())?;
            w.writeln(", operation string, input interface{}) (interface{}, error)");
            Ok(())
        })?;

        w.newline();
        w.write_docs("New returns a client that sends every operation through handler.")?;
        w.block(&format!("func New(handler Handler) *{CLIENT_NAME} {{"), "}", |w| {
            w.writeln(&format!("return &{CLIENT_NAME}{{handler: handler}}"));
            Ok(())
        })?;

        w.newline();
        w.write_docs(&format!("ServiceID is the identifier of the {service_name} service."))?;
        w.write("const ServiceID = ").write_string(service_name).newline();
        w.newline();
        w.write_docs(&format!("ServiceAPIVersion is the version of the {service_name} API."))?;
        w.write("const ServiceAPIVersion = ").write_string(version).newline();
        Ok(())
    }

    /// `document.Interface`, backed by the runtime's marshaling interfaces.
    pub fn document(&self, w: &mut GoWriter) -> CodegenResult<()> {
        w.write_docs(
            "Interface defines a document which is a protocol-agnostic type which supports a JSON-like data-model.",
        )?;
        w.block("type Interface interface {", "}", |w| {
            for name in ["Marshaler", "Unmarshaler"] {
                let symbol =
                    Symbol::new(name, packages::SMITHY_GO_DOCUMENT).with_dependency(packages::smithy_document());
                w.write_type(&symbol)?;
                w.newline();
            }
            Ok(())
        })?;
        Ok(())
    }
}

/// Structure field order: required members first, then by name.
pub fn required_then_alphabetical(members: &[Member]) -> Vec<&Member> {
    let mut sorted: Vec<&Member> = members.iter().collect();
    sorted.sort_by(|a, b| {
        b.is_required()
            .cmp(&a.is_required())
            .then_with(|| a.name().cmp(b.name()))
    });
    sorted
}

fn union_marker(union: &str) -> String {
    format!("is{union}")
}

fn enum_literal(value: &EnumValue) -> String {
    match value {
        EnumValue::String { value, .. } => quote(value),
        EnumValue::Int { value, .. } => value.to_string(),
    }
}

fn unexpected(shape: &Shape, expected: &str) -> CodegenError {
    CodegenError::UnsupportedShape {
        shape: shape.id.clone(),
        reason: format!("expected {expected}, found {}", shape.kind.type_name()),
    }
}

fn smithy_symbol(name: &str) -> Symbol {
    Symbol::new(name, packages::SMITHY_GO_MODULE).with_dependency(packages::smithy_go())
}

fn result_metadata() -> Symbol {
    Symbol::new("Metadata", packages::SMITHY_GO_MIDDLEWARE).with_dependency(packages::smithy_middleware())
}

fn context_symbol() -> Symbol {
    Symbol::new("Context", "context").with_dependency(packages::context())
}

fn sprintf() -> Symbol {
    Symbol::new("Sprintf", "fmt").with_dependency(packages::fmt())
}

fn errorf() -> Symbol {
    Symbol::new("Errorf", "fmt").with_dependency(packages::fmt())
}
