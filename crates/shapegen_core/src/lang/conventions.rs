//! Naming conventions for generated Go code (well-known identifiers and name derivation).

/// Marker appended to an identifier that collides with a reserved name.
pub const ESCAPE_SUFFIX: char = '_';

/// Import alias that would pull a package's exported names into file scope. Generated code never uses it.
pub const DOT_IMPORT_ALIAS: &str = ".";

/// Fallback variant every generated union carries for members unknown to this client.
pub const UNKNOWN_UNION_MEMBER: &str = "UnknownUnionMember";

/// Embedded marker field that opts generated structures out of document serialization.
pub const NO_DOCUMENT_SERDE: &str = "noSmithyDocumentSerde";

/// Field added to every operation output for response metadata.
pub const RESULT_METADATA: &str = "ResultMetadata";

/// Prefix of generated accessor methods (`GetName` for member `Name`).
pub const ACCESSOR_PREFIX: &str = "Get";

/// Infix of generated union variant types (`<Union>Member<Variant>`).
pub const UNION_MEMBER_INFIX: &str = "Member";

/// Names synthesized on error structures; members of error shapes must not collide with them.
pub const ERROR_METHOD_NAMES: &[&str] = &["Error", "ErrorCode", "ErrorFault", "ErrorMessage", "Unwrap"];

/// Name of the generated service client type.
pub const CLIENT_NAME: &str = "Client";

/// Sub-package holding shared structures, unions, enums and errors.
pub const TYPES_PACKAGE: &str = "types";

/// Sub-package holding document support.
pub const DOCUMENT_PACKAGE: &str = "document";

/// Upper-case the first character (`forecastId` → `ForecastId`).
pub fn to_exported(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Accessor method name for a member.
pub fn accessor_name(member: &str) -> String {
    format!("{ACCESSOR_PREFIX}{}", to_exported(member))
}

/// Type name of one union variant.
pub fn union_member_name(union: &str, variant: &str) -> String {
    format!("{}{UNION_MEMBER_INFIX}{}", to_exported(union), to_exported(variant))
}

/// Exported identifier for an enum value name (`PARTLY_CLOUDY` → `PartlyCloudy`, `partlyCloudy` → `PartlyCloudy`).
///
/// Words are split on `_` and any character that cannot appear in an identifier. All-caps words are title-cased.
pub fn enum_value_name(name: &str) -> String {
    name.split(|c: char| !(c.is_ascii_alphanumeric()))
        .filter(|word| !word.is_empty())
        .map(|word| {
            if word.chars().all(|c| !c.is_ascii_lowercase()) {
                to_exported(&word.to_ascii_lowercase())
            } else {
                to_exported(word)
            }
        })
        .collect()
}

/// Default import alias for a package path: the last path element.
///
/// A trailing major-version element (`/v2`) is skipped, and characters that cannot appear in a Go identifier are
/// dropped (`smithy-go` → `smithygo`).
pub fn default_package_alias(path: &str) -> String {
    let mut segments = path.rsplit('/').filter(|s| !s.is_empty());
    let last = segments.next().unwrap_or_default();
    let chosen = if is_major_version_segment(last) {
        segments.next().unwrap_or(last)
    } else {
        last
    };
    chosen.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_').collect()
}

fn is_major_version_segment(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}
