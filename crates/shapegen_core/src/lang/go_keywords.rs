//! Go keyword vocabulary (for codegen identifier escaping).

/// Reserved keywords in Go. None of these may be used as an identifier.
pub const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough", "for", "func", "go",
    "goto", "if", "import", "interface", "map", "package", "range", "return", "select", "struct", "switch", "type",
    "var",
];

/// Predeclared identifiers in the Go universe block.
///
/// These are legal identifiers, but shadowing them in generated code breaks references to the builtin.
pub const GO_PREDECLARED: &[&str] = &[
    "any", "append", "bool", "byte", "cap", "clear", "close", "comparable", "complex", "complex64", "complex128",
    "copy", "delete", "error", "false", "float32", "float64", "imag", "int", "int8", "int16", "int32", "int64",
    "iota", "len", "make", "max", "min", "new", "nil", "panic", "print", "println", "real", "recover", "rune",
    "string", "true", "uint", "uint8", "uint16", "uint32", "uint64", "uintptr",
];

/// Check whether an identifier is a Go keyword.
pub fn is_keyword(name: &str) -> bool {
    GO_KEYWORDS.contains(&name)
}

/// Check whether an identifier is predeclared in the Go universe block.
pub fn is_predeclared(name: &str) -> bool {
    GO_PREDECLARED.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_lowercase() {
        assert!(GO_KEYWORDS.iter().all(|k| k.chars().all(|c| c.is_ascii_lowercase())));
    }

    #[test]
    fn test_keyword_and_predeclared_disjoint() {
        assert!(GO_KEYWORDS.iter().all(|k| !is_predeclared(k)));
    }

    #[test]
    fn test_exported_names_never_keywords() {
        assert!(!is_keyword("Type"));
        assert!(is_keyword("type"));
    }
}
