//! Symbol types and the widening rules between them

use crate::frontend::lexer::TokenKind;
use std::fmt;

/// Type recorded for every symbol and derived for every expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolType {
    Integer,
    IntegerArray,
    Float,
    FloatArray,
    String,
    StringArray,
    Bool,
    BoolArray,
    Procedure,
    None,
}

impl SymbolType {
    /// Scalar type named by a type mark keyword
    pub fn from_type_mark(kind: &TokenKind) -> Option<SymbolType> {
        match kind {
            TokenKind::Integer => Some(SymbolType::Integer),
            TokenKind::Float => Some(SymbolType::Float),
            TokenKind::String => Some(SymbolType::String),
            TokenKind::Bool => Some(SymbolType::Bool),
            _ => None,
        }
    }

    pub fn is_array(self) -> bool {
        matches!(
            self,
            SymbolType::IntegerArray
                | SymbolType::FloatArray
                | SymbolType::StringArray
                | SymbolType::BoolArray
        )
    }

    /// Element type of an array type
    pub fn element(self) -> Option<SymbolType> {
        match self {
            SymbolType::IntegerArray => Some(SymbolType::Integer),
            SymbolType::FloatArray => Some(SymbolType::Float),
            SymbolType::StringArray => Some(SymbolType::String),
            SymbolType::BoolArray => Some(SymbolType::Bool),
            _ => None,
        }
    }

    /// Array type whose elements are `self`; arrays and non-values map to themselves
    pub fn array_of(self) -> SymbolType {
        match self {
            SymbolType::Integer => SymbolType::IntegerArray,
            SymbolType::Float => SymbolType::FloatArray,
            SymbolType::String => SymbolType::StringArray,
            SymbolType::Bool => SymbolType::BoolArray,
            other => other,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, SymbolType::Integer | SymbolType::Float)
    }

    /// Result of `+ - * /` on the two operand types
    ///
    /// Same-type numeric operands keep their type; a mix of integer and
    /// float widens to float.
    pub fn arithmetic_result(left: SymbolType, right: SymbolType) -> Option<SymbolType> {
        match (left, right) {
            (SymbolType::Integer, SymbolType::Integer) => Some(SymbolType::Integer),
            (SymbolType::Float, SymbolType::Float)
            | (SymbolType::Integer, SymbolType::Float)
            | (SymbolType::Float, SymbolType::Integer) => Some(SymbolType::Float),
            _ => None,
        }
    }

    /// Whether `left op right` is a valid comparison. Every valid comparison yields bool.
    pub fn comparable(left: SymbolType, right: SymbolType, op: &TokenKind) -> bool {
        match (left, right) {
            (SymbolType::Integer, SymbolType::Integer)
            | (SymbolType::Float, SymbolType::Float)
            | (SymbolType::Bool, SymbolType::Bool) => true,
            // bool is encoded as 0/1
            (SymbolType::Bool, SymbolType::Integer) | (SymbolType::Integer, SymbolType::Bool) => {
                true
            }
            (SymbolType::String, SymbolType::String) => {
                matches!(op, TokenKind::EqEq | TokenKind::NotEq)
            }
            _ => false,
        }
    }

    /// Result of `& |` on the two operand types
    pub fn logical_result(left: SymbolType, right: SymbolType) -> Option<SymbolType> {
        match (left, right) {
            (SymbolType::Integer, SymbolType::Integer) => Some(SymbolType::Integer),
            (SymbolType::Bool, SymbolType::Bool) => Some(SymbolType::Bool),
            _ => None,
        }
    }

    /// Whether a value of type `value` may be stored into a destination of type `self`
    pub fn accepts(self, value: SymbolType) -> bool {
        self == value
            || matches!(
                (self, value),
                (SymbolType::Integer, SymbolType::Bool)
                    | (SymbolType::Bool, SymbolType::Integer)
                    | (SymbolType::Float, SymbolType::Integer)
                    | (SymbolType::Integer, SymbolType::Float)
            )
    }

    /// Whether an if/loop condition of this type is acceptable
    pub fn is_condition(self) -> bool {
        matches!(self, SymbolType::Bool | SymbolType::Integer)
    }

    pub fn name(self) -> &'static str {
        match self {
            SymbolType::Integer => "integer",
            SymbolType::IntegerArray => "integer_array",
            SymbolType::Float => "float",
            SymbolType::FloatArray => "float_array",
            SymbolType::String => "string",
            SymbolType::StringArray => "string_array",
            SymbolType::Bool => "bool",
            SymbolType::BoolArray => "bool_array",
            SymbolType::Procedure => "procedure",
            SymbolType::None => "none",
        }
    }
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ALL: [SymbolType; 10] = [
        SymbolType::Integer,
        SymbolType::IntegerArray,
        SymbolType::Float,
        SymbolType::FloatArray,
        SymbolType::String,
        SymbolType::StringArray,
        SymbolType::Bool,
        SymbolType::BoolArray,
        SymbolType::Procedure,
        SymbolType::None,
    ];

    #[test]
    fn test_arithmetic_table() {
        for left in ALL {
            for right in ALL {
                let expected = match (left, right) {
                    (SymbolType::Integer, SymbolType::Integer) => Some(SymbolType::Integer),
                    (SymbolType::Float, SymbolType::Float)
                    | (SymbolType::Integer, SymbolType::Float)
                    | (SymbolType::Float, SymbolType::Integer) => Some(SymbolType::Float),
                    _ => None,
                };
                assert_eq!(
                    SymbolType::arithmetic_result(left, right),
                    expected,
                    "{left} op {right}"
                );
            }
        }
    }

    #[test]
    fn test_string_comparison_only_for_equality() {
        let s = SymbolType::String;
        assert!(SymbolType::comparable(s, s, &TokenKind::EqEq));
        assert!(SymbolType::comparable(s, s, &TokenKind::NotEq));
        assert!(!SymbolType::comparable(s, s, &TokenKind::Lt));
        assert!(!SymbolType::comparable(s, s, &TokenKind::GtEq));
    }

    #[test]
    fn test_bool_integer_comparison() {
        assert!(SymbolType::comparable(SymbolType::Bool, SymbolType::Integer, &TokenKind::Lt));
        assert!(SymbolType::comparable(SymbolType::Integer, SymbolType::Bool, &TokenKind::EqEq));
        assert!(!SymbolType::comparable(SymbolType::Integer, SymbolType::Float, &TokenKind::Lt));
        assert!(!SymbolType::comparable(SymbolType::IntegerArray, SymbolType::IntegerArray, &TokenKind::EqEq));
    }

    #[test]
    fn test_logical_requires_matching_integer_or_bool() {
        assert_eq!(
            SymbolType::logical_result(SymbolType::Bool, SymbolType::Bool),
            Some(SymbolType::Bool)
        );
        assert_eq!(
            SymbolType::logical_result(SymbolType::Integer, SymbolType::Integer),
            Some(SymbolType::Integer)
        );
        assert_eq!(SymbolType::logical_result(SymbolType::Integer, SymbolType::Bool), None);
        assert_eq!(SymbolType::logical_result(SymbolType::Float, SymbolType::Float), None);
    }

    #[test]
    fn test_assignment_compatibility() {
        let int = SymbolType::Integer;
        assert!(int.accepts(SymbolType::Integer));
        assert!(int.accepts(SymbolType::Bool));
        assert!(int.accepts(SymbolType::Float));
        assert!(!int.accepts(SymbolType::String));

        let string = SymbolType::String;
        for value in ALL {
            assert_eq!(string.accepts(value), value == SymbolType::String);
        }

        let boolean = SymbolType::Bool;
        assert!(boolean.accepts(SymbolType::Bool));
        assert!(boolean.accepts(SymbolType::Integer));
        assert!(!boolean.accepts(SymbolType::Float));

        assert!(SymbolType::Float.accepts(SymbolType::Integer));
        assert!(!SymbolType::Float.accepts(SymbolType::Bool));
    }

    #[test]
    fn test_condition_types() {
        let accepted: Vec<SymbolType> = ALL.into_iter().filter(|t| t.is_condition()).collect();
        assert_eq!(accepted, vec![SymbolType::Integer, SymbolType::Bool]);
    }

    #[test]
    fn test_array_element_round_trip() {
        for scalar in [SymbolType::Integer, SymbolType::Float, SymbolType::String, SymbolType::Bool] {
            let array = scalar.array_of();
            assert!(array.is_array());
            assert_eq!(array.element(), Some(scalar));
        }
        assert_eq!(SymbolType::Procedure.element(), None);
    }

    #[test]
    fn test_type_marks_are_scalar() {
        assert_eq!(SymbolType::from_type_mark(&TokenKind::Float), Some(SymbolType::Float));
        assert_eq!(SymbolType::from_type_mark(&TokenKind::Bool), Some(SymbolType::Bool));
        assert_eq!(SymbolType::from_type_mark(&TokenKind::Enum), None);
    }
}
