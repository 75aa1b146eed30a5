//! Semantic analyzer - scope resolution and type checking

use super::scope::{ScopeChain, SymbolEntry, SymbolTable};
use super::types::SymbolType;
use crate::common::{CompileError, CompileResult};
use crate::frontend::ast::{Production, SyntaxNode};
use crate::frontend::lexer::TokenKind;

/// Tables visible at a point in the tree, plus the enclosing procedure's return type
#[derive(Debug, Clone, Copy)]
struct Context<'a> {
    scopes: ScopeChain<'a>,
    return_type: Option<SymbolType>,
}

/// Checks a parsed tree against the global and builtin tables of the same run
pub struct SemanticAnalyzer<'a> {
    global: &'a SymbolTable,
    builtin: &'a SymbolTable,
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn new(global: &'a SymbolTable, builtin: &'a SymbolTable) -> Self {
        Self { global, builtin }
    }

    /// Analyze a whole program; the first error aborts
    pub fn analyze(&self, root: &'a SyntaxNode) -> CompileResult<()> {
        let ctx = Context {
            scopes: ScopeChain::new(self.global, self.builtin),
            return_type: None,
        };
        self.visit(root, ctx)
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    fn visit(&self, node: &'a SyntaxNode, ctx: Context<'a>) -> CompileResult<()> {
        let Some(production) = node.production() else {
            return Ok(());
        };
        match production {
            Production::Program
            | Production::ProgramBody
            | Production::ProcedureBody
            | Production::Declaration
            | Production::Statement => self.visit_children(node, ctx),
            Production::ProcedureDeclaration => self.visit_procedure(node, ctx),
            Production::AssignmentStatement => self.check_assignment(node, ctx),
            Production::IfStatement => self.check_if(node, ctx),
            Production::LoopStatement => self.check_loop(node, ctx),
            Production::ReturnStatement => self.check_return(node, ctx),
            // Declarations were entered into their tables while parsing
            _ => Ok(()),
        }
    }

    fn visit_children(&self, node: &'a SyntaxNode, ctx: Context<'a>) -> CompileResult<()> {
        for child in node.children() {
            self.visit(child, ctx)?;
        }
        Ok(())
    }

    fn visit_procedure(&self, node: &'a SyntaxNode, ctx: Context<'a>) -> CompileResult<()> {
        let locals = node.locals().ok_or_else(|| malformed(node))?;
        let name = nth(node, 0)
            .and_then(|header| nth(header, 1))?
            .identifier()
            .ok_or_else(|| malformed(node))?;
        let signature = locals
            .lookup(name)
            .filter(|entry| entry.is_procedure())
            .ok_or_else(|| error_at(node, format!("procedure '{name}' has no signature in its own scope")))?;

        log::debug!("checking procedure '{name}'");
        let inner = Context {
            scopes: ctx.scopes.with_local(locals),
            return_type: Some(signature.procedure_return_type),
        };
        self.visit_children(node, inner)
    }

    /// Statements of an if/loop body, stopping at its `end`
    fn visit_statements(
        &self,
        children: impl Iterator<Item = &'a SyntaxNode>,
        ctx: Context<'a>,
    ) -> CompileResult<()> {
        for child in children
            .take_while(|c| !c.is_token(&TokenKind::End))
            .filter(|c| c.is(Production::Statement))
        {
            self.visit(child, ctx)?;
        }
        Ok(())
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// `destination := expression`
    fn check_assignment(&self, node: &'a SyntaxNode, ctx: Context<'a>) -> CompileResult<()> {
        let destination = nth(node, 0)?;
        let target = self.name_type(destination, ctx)?;
        let value = self.derive_type(nth(node, 2)?, ctx)?;

        if !target.accepts(value) {
            let name = nth(destination, 0)?.identifier().unwrap_or_default();
            return Err(error_at(
                node,
                format!("cannot assign {value} to '{name}' of type {target}"),
            ));
        }
        Ok(())
    }

    /// `if ( expression ) then ... [else ...] end if`
    fn check_if(&self, node: &'a SyntaxNode, ctx: Context<'a>) -> CompileResult<()> {
        self.check_condition(nth(node, 2)?, "if", ctx)?;
        self.visit_statements(node.children().iter().skip(5), ctx)
    }

    /// `for ( assignment ; expression ) ... end for`
    fn check_loop(&self, node: &'a SyntaxNode, ctx: Context<'a>) -> CompileResult<()> {
        self.check_assignment(nth(node, 2)?, ctx)?;
        self.check_condition(nth(node, 4)?, "loop", ctx)?;
        self.visit_statements(node.children().iter().skip(6), ctx)
    }

    fn check_condition(&self, expr: &'a SyntaxNode, what: &str, ctx: Context<'a>) -> CompileResult<()> {
        let ty = self.derive_type(expr, ctx)?;
        if !ty.is_condition() {
            return Err(error_at(
                expr,
                format!("{what} condition must be bool or integer, found {ty}"),
            ));
        }
        Ok(())
    }

    /// Return types must match exactly; no widening
    fn check_return(&self, node: &'a SyntaxNode, ctx: Context<'a>) -> CompileResult<()> {
        let Some(expected) = ctx.return_type else {
            return Err(error_at(node, "return outside of a procedure"));
        };
        let found = self.derive_type(nth(node, 1)?, ctx)?;
        if found != expected {
            return Err(error_at(
                node,
                format!("return type mismatch: expected {expected}, found {found}"),
            ));
        }
        Ok(())
    }

    // =========================================================================
    // Expression types
    // =========================================================================

    /// Type of an expression-chain node, folding its prime continuation left to right
    fn derive_type(&self, node: &'a SyntaxNode, ctx: Context<'a>) -> CompileResult<SymbolType> {
        match node.production() {
            Some(Production::Expression) => self.expression_type(node, ctx),
            Some(Production::ArithOp | Production::Relation | Production::Term) => {
                let left = self.derive_type(nth(node, 0)?, ctx)?;
                match node.child(1) {
                    Some(prime) => self.fold_prime(left, prime, ctx),
                    None => Ok(left),
                }
            }
            Some(Production::Factor) => self.factor_type(node, ctx),
            _ => Err(malformed(node)),
        }
    }

    /// `[not] arith_op [expression_prime]`
    fn expression_type(&self, node: &'a SyntaxNode, ctx: Context<'a>) -> CompileResult<SymbolType> {
        let mut children = node.children().iter().peekable();
        let negated = children.next_if(|c| c.is_token(&TokenKind::Not)).is_some();

        let first = children.next().ok_or_else(|| malformed(node))?;
        let mut ty = self.derive_type(first, ctx)?;
        if let Some(prime) = children.next() {
            ty = self.fold_prime(ty, prime, ctx)?;
        }

        if negated && !matches!(ty, SymbolType::Integer | SymbolType::Bool) {
            return Err(error_at(
                node,
                format!("'not' needs an integer or bool operand, found {ty}"),
            ));
        }
        Ok(ty)
    }

    /// Apply each `op operand` of a prime chain to the running left type
    fn fold_prime(
        &self,
        mut left: SymbolType,
        mut prime: &'a SyntaxNode,
        ctx: Context<'a>,
    ) -> CompileResult<SymbolType> {
        loop {
            let op = nth(prime, 0)?.token().ok_or_else(|| malformed(prime))?;
            let right = self.derive_type(nth(prime, 1)?, ctx)?;

            let result = match prime.production() {
                Some(Production::ExpressionPrime) => SymbolType::logical_result(left, right),
                Some(Production::ArithOpPrime | Production::TermPrime) => {
                    SymbolType::arithmetic_result(left, right)
                }
                Some(Production::RelationPrime) => {
                    SymbolType::comparable(left, right, &op.kind).then_some(SymbolType::Bool)
                }
                _ => return Err(malformed(prime)),
            };
            left = result.ok_or_else(|| {
                error_at(
                    prime,
                    format!("operator {} cannot be applied to {left} and {right}", op.kind),
                )
            })?;

            match prime.child(2) {
                Some(next) => prime = next,
                None => return Ok(left),
            }
        }
    }

    fn factor_type(&self, node: &'a SyntaxNode, ctx: Context<'a>) -> CompileResult<SymbolType> {
        let first = nth(node, 0)?;
        match first.production() {
            Some(Production::ProcedureCall) => return self.call_type(first, ctx),
            Some(Production::Name) => return self.name_type(first, ctx),
            Some(Production::Number) => return number_type(first),
            Some(Production::String) => return Ok(SymbolType::String),
            _ => {}
        }

        match first.token().map(|t| &t.kind) {
            Some(TokenKind::LParen) => self.derive_type(nth(node, 1)?, ctx),
            Some(TokenKind::Minus) => {
                let operand = nth(node, 1)?;
                let ty = if operand.is(Production::Number) {
                    number_type(operand)?
                } else {
                    self.name_type(operand, ctx)?
                };
                if !ty.is_numeric() {
                    return Err(error_at(node, format!("unary '-' cannot be applied to {ty}")));
                }
                Ok(ty)
            }
            Some(TokenKind::True | TokenKind::False) => Ok(SymbolType::Bool),
            _ => Err(malformed(node)),
        }
    }

    /// Type of a name or destination: `IDENT [ [ expression ] ]`
    fn name_type(&self, node: &'a SyntaxNode, ctx: Context<'a>) -> CompileResult<SymbolType> {
        let ident = nth(node, 0)?;
        let entry = self.resolve(ident, ctx)?;
        let name = &entry.identifier;

        if entry.is_procedure() {
            return Err(error_at(node, format!("procedure '{name}' used as a variable")));
        }

        let Some(index) = node.child(2) else {
            return Ok(entry.entry_type);
        };
        let Some(element) = entry.entry_type.element() else {
            return Err(error_at(node, format!("'{name}' is not an array")));
        };
        let index_type = self.derive_type(index, ctx)?;
        if index_type != SymbolType::Integer {
            return Err(error_at(
                node,
                format!("index into '{name}' must be integer, found {index_type}"),
            ));
        }
        Ok(element)
    }

    /// Checks the arguments against the callee's signature and yields its return type
    fn call_type(&self, node: &'a SyntaxNode, ctx: Context<'a>) -> CompileResult<SymbolType> {
        let entry = self.resolve(nth(node, 0)?, ctx)?;
        let name = &entry.identifier;
        if !entry.is_procedure() {
            return Err(error_at(node, format!("'{name}' is not a procedure")));
        }

        let args: Vec<&'a SyntaxNode> = node
            .children()
            .iter()
            .find(|c| c.is(Production::ArgumentList))
            .map(|list| list.children().iter().filter(|c| c.is(Production::Expression)).collect())
            .unwrap_or_default();

        let params = &entry.procedure_arg_types;
        if args.len() != params.len() {
            return Err(error_at(
                node,
                format!("'{name}' expects {} argument(s), found {}", params.len(), args.len()),
            ));
        }

        for (position, (arg, expected)) in args.into_iter().zip(params).enumerate() {
            let found = self.derive_type(arg, ctx)?;
            if found != *expected {
                return Err(error_at(
                    arg,
                    format!(
                        "argument {} of '{name}' expects {expected}, found {found}",
                        position + 1
                    ),
                ));
            }
        }

        Ok(entry.procedure_return_type)
    }

    fn resolve(&self, ident: &'a SyntaxNode, ctx: Context<'a>) -> CompileResult<&'a SymbolEntry> {
        let name = ident.identifier().ok_or_else(|| malformed(ident))?;
        ctx.scopes
            .resolve(name)
            .ok_or_else(|| error_at(ident, format!("undeclared identifier '{name}'")))
    }
}

fn number_type(node: &SyntaxNode) -> CompileResult<SymbolType> {
    match nth(node, 0)?.token().map(|t| &t.kind) {
        Some(TokenKind::IntLiteral(_)) => Ok(SymbolType::Integer),
        Some(TokenKind::FloatLiteral(_)) => Ok(SymbolType::Float),
        _ => Err(malformed(node)),
    }
}

fn nth(node: &SyntaxNode, index: usize) -> CompileResult<&SyntaxNode> {
    node.child(index).ok_or_else(|| malformed(node))
}

fn malformed(node: &SyntaxNode) -> CompileError {
    let what = node
        .production()
        .map_or_else(|| "token".to_string(), |p| p.to_string());
    error_at(node, format!("malformed {what} node"))
}

/// Semantic error, tagged with the node's first line when it has one
fn error_at(node: &SyntaxNode, message: impl Into<String>) -> CompileError {
    let message = message.into();
    match node.line() {
        Some(line) => CompileError::semantic(format!("{message} (line {line})")),
        None => CompileError::semantic(message),
    }
}
