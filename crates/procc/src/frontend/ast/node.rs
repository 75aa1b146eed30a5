//! Syntax tree nodes

use super::Production;
use crate::frontend::lexer::{Token, TokenKind};
use crate::frontend::sema::SymbolTable;
use std::fmt;

/// A node of the syntax tree
///
/// Only procedure declarations own a symbol table, so that case gets its
/// own variant instead of an optional field on every node.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxNode {
    /// Terminal token
    Leaf(Token),
    /// Application of any production other than a procedure declaration
    Branch {
        production: Production,
        children: Vec<SyntaxNode>,
    },
    /// Procedure declaration with the table scoped to its body
    Procedure {
        children: Vec<SyntaxNode>,
        locals: SymbolTable,
    },
}

impl SyntaxNode {
    pub fn leaf(token: Token) -> Self {
        SyntaxNode::Leaf(token)
    }

    pub fn branch(production: Production, children: Vec<SyntaxNode>) -> Self {
        debug_assert_ne!(
            production,
            Production::ProcedureDeclaration,
            "procedure declarations carry a local table"
        );
        SyntaxNode::Branch { production, children }
    }

    pub fn procedure(children: Vec<SyntaxNode>, locals: SymbolTable) -> Self {
        SyntaxNode::Procedure { children, locals }
    }

    /// Production of an interior node; `None` for leaves
    pub fn production(&self) -> Option<Production> {
        match self {
            SyntaxNode::Leaf(_) => None,
            SyntaxNode::Branch { production, .. } => Some(*production),
            SyntaxNode::Procedure { .. } => Some(Production::ProcedureDeclaration),
        }
    }

    pub fn is(&self, production: Production) -> bool {
        self.production() == Some(production)
    }

    pub fn children(&self) -> &[SyntaxNode] {
        match self {
            SyntaxNode::Leaf(_) => &[],
            SyntaxNode::Branch { children, .. } | SyntaxNode::Procedure { children, .. } => {
                children
            }
        }
    }

    pub fn child(&self, index: usize) -> Option<&SyntaxNode> {
        self.children().get(index)
    }

    pub fn token(&self) -> Option<&Token> {
        match self {
            SyntaxNode::Leaf(token) => Some(token),
            _ => None,
        }
    }

    /// Whether this is a leaf holding a token of `kind`'s variant
    pub fn is_token(&self, kind: &TokenKind) -> bool {
        self.token()
            .is_some_and(|t| std::mem::discriminant(&t.kind) == std::mem::discriminant(kind))
    }

    /// Identifier text of a leaf, if it is one
    pub fn identifier(&self) -> Option<&str> {
        self.token().and_then(Token::identifier)
    }

    /// Local symbol table of a procedure declaration
    pub fn locals(&self) -> Option<&SymbolTable> {
        match self {
            SyntaxNode::Procedure { locals, .. } => Some(locals),
            _ => None,
        }
    }

    /// First line covered by this subtree
    pub fn line(&self) -> Option<usize> {
        match self {
            SyntaxNode::Leaf(token) => Some(token.line),
            _ => self.children().iter().find_map(SyntaxNode::line),
        }
    }

    /// Write the tree one node per line, indented by depth
    pub fn dump(&self, out: &mut impl fmt::Write, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            SyntaxNode::Leaf(token) => writeln!(out, "{indent}{}", token.kind),
            _ => {
                if let Some(production) = self.production() {
                    writeln!(out, "{indent}{production}")?;
                }
                for child in self.children() {
                    child.dump(out, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.dump(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::common::Span;

    fn ident(name: &str) -> SyntaxNode {
        SyntaxNode::leaf(Token::new(TokenKind::Identifier(name.into()), 1, Span::default()))
    }

    #[test]
    fn test_leaf_has_no_production() {
        let leaf = ident("x");
        assert_eq!(leaf.production(), None);
        assert!(leaf.children().is_empty());
        assert_eq!(leaf.identifier(), Some("x"));
        assert!(leaf.is_token(&TokenKind::Identifier(String::new())));
    }

    #[test]
    fn test_procedure_node_reports_its_production() {
        let node = SyntaxNode::procedure(vec![ident("p")], SymbolTable::new());
        assert!(node.is(Production::ProcedureDeclaration));
        assert!(node.locals().is_some());
        assert_eq!(node.children().len(), 1);
    }

    #[test]
    fn test_branch_has_no_locals() {
        let node = SyntaxNode::branch(Production::Name, vec![ident("x")]);
        assert!(node.locals().is_none());
        assert_eq!(node.line(), Some(1));
    }

    #[test]
    fn test_dump_indents_by_depth() {
        let node = SyntaxNode::branch(
            Production::Destination,
            vec![ident("x")],
        );
        assert_eq!(node.to_string(), "<destination>\n  identifier 'x'\n");
    }
}
