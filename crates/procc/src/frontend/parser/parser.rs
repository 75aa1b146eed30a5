//! Recursive descent parser
//!
//! One method per grammar production. Each method consumes a prefix of the
//! remaining tokens and returns the subtree for it. Declarations are entered
//! into symbol tables as they are parsed; references are left unresolved for
//! the semantic analyzer.

use crate::common::{CompileError, CompileResult, Span};
use crate::frontend::ast::{Production, SyntaxNode};
use crate::frontend::lexer::{Token, TokenKind};
use crate::frontend::sema::{SymbolEntry, SymbolTable, SymbolType};

/// Deepest expression nesting accepted, counting parentheses, indices and arguments
pub const MAX_EXPRESSION_DEPTH: usize = 64;

/// Result of a successful parse: the tree plus the tables built alongside it
#[derive(Debug, Clone)]
pub struct ParsedProgram {
    pub tree: SyntaxNode,
    pub globals: SymbolTable,
    pub builtins: SymbolTable,
}

/// Table a declaration is entered into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclScope {
    /// Innermost open scope (global at top level, the procedure's own table inside one)
    Current,
    Global,
}

/// Recursive descent parser over a scanned token sequence
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    globals: SymbolTable,
    /// Tables of the procedures currently being parsed, innermost last
    locals: Vec<SymbolTable>,
    builtins: SymbolTable,
    /// Expressions currently open
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            globals: SymbolTable::new(),
            locals: Vec::new(),
            builtins: SymbolTable::builtins(),
            depth: 0,
        }
    }

    /// Parse a complete program and hand back the tree with its tables
    pub fn parse(mut self) -> CompileResult<ParsedProgram> {
        let tree = self.parse_program()?;

        if let Some(token) = self.current() {
            return Err(CompileError::parse(
                "end of file",
                token.kind.to_string(),
                token.line,
                token.span,
            ));
        }

        log::debug!("parsed program with {} global symbols", self.globals.len());
        Ok(ParsedProgram {
            tree,
            globals: self.globals,
            builtins: self.builtins,
        })
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind(0)
            .is_some_and(|k| std::mem::discriminant(k) == std::mem::discriminant(kind))
    }

    fn check_with(&self, pred: fn(&TokenKind) -> bool) -> bool {
        self.peek_kind(0).is_some_and(pred)
    }

    /// Error for an `expected` construct that is absent at the cursor
    fn error_expected(&self, expected: impl Into<String>) -> CompileError {
        match self.current() {
            Some(token) => {
                CompileError::parse(expected, token.kind.to_string(), token.line, token.span)
            }
            None => {
                let (line, end) = self
                    .tokens
                    .last()
                    .map_or((1, 0), |t| (t.line, t.span.end));
                CompileError::parse(expected, "end of file", line, Span::new(end, end))
            }
        }
    }

    /// Consume the current token as a leaf
    fn advance(&mut self) -> CompileResult<SyntaxNode> {
        match self.tokens.get(self.pos) {
            Some(token) => {
                let token = token.clone();
                self.pos += 1;
                Ok(SyntaxNode::leaf(token))
            }
            None => Err(self.error_expected("more input")),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> CompileResult<SyntaxNode> {
        if self.check(&kind) {
            self.advance()
        } else {
            Err(self.error_expected(kind.to_string()))
        }
    }

    /// Consume an identifier, returning its text, its token and its leaf
    fn expect_identifier(&mut self) -> CompileResult<(String, Token, SyntaxNode)> {
        let token = match self.current() {
            Some(token) if matches!(token.kind, TokenKind::Identifier(_)) => token.clone(),
            _ => return Err(self.error_expected("identifier")),
        };
        self.pos += 1;
        let name = token.identifier().unwrap_or_default().to_string();
        Ok((name, token.clone(), SyntaxNode::leaf(token)))
    }

    /// Enter `entry` into the table selected by `scope`
    fn declare(&mut self, entry: SymbolEntry, scope: DeclScope, at: &Token) -> CompileResult<()> {
        let table = match scope {
            DeclScope::Global => &mut self.globals,
            DeclScope::Current => self.locals.last_mut().unwrap_or(&mut self.globals),
        };
        Self::define_in(table, entry, at)
    }

    fn define_in(table: &mut SymbolTable, entry: SymbolEntry, at: &Token) -> CompileResult<()> {
        log::trace!("declare '{}' as {}", entry.identifier, entry.entry_type);
        table.define(entry).map_err(|message| {
            CompileError::parse(
                "an identifier not yet declared in this scope",
                message,
                at.line,
                at.span,
            )
        })
    }

    // =========================================================================
    // Program structure
    // =========================================================================

    fn parse_program(&mut self) -> CompileResult<SyntaxNode> {
        let header = self.parse_program_header()?;
        let body = self.parse_body(Production::ProgramBody, TokenKind::Program)?;
        let dot = self.expect(TokenKind::Dot)?;
        Ok(SyntaxNode::branch(Production::Program, vec![header, body, dot]))
    }

    fn parse_program_header(&mut self) -> CompileResult<SyntaxNode> {
        let program = self.expect(TokenKind::Program)?;
        let (_, _, name) = self.expect_identifier()?;
        let is = self.expect(TokenKind::Is)?;
        Ok(SyntaxNode::branch(Production::ProgramHeader, vec![program, name, is]))
    }

    /// `( declaration ; )* begin ( statement ; )* end <closing>`
    fn parse_body(&mut self, production: Production, closing: TokenKind) -> CompileResult<SyntaxNode> {
        let mut children = Vec::new();

        while !self.check(&TokenKind::Begin) {
            children.push(self.parse_declaration()?);
            children.push(self.expect(TokenKind::Semi)?);
        }
        children.push(self.expect(TokenKind::Begin)?);

        while !self.check(&TokenKind::End) {
            children.push(self.parse_statement()?);
            children.push(self.expect(TokenKind::Semi)?);
        }
        children.push(self.expect(TokenKind::End)?);
        children.push(self.expect(closing)?);

        Ok(SyntaxNode::branch(production, children))
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_declaration(&mut self) -> CompileResult<SyntaxNode> {
        let mut children = Vec::new();
        let scope = if self.check(&TokenKind::Global) {
            children.push(self.advance()?);
            DeclScope::Global
        } else {
            DeclScope::Current
        };

        let decl = match self.peek_kind(0) {
            Some(TokenKind::Procedure) => self.parse_procedure_declaration(scope)?,
            Some(TokenKind::Variable) => {
                let (node, entry, at) = self.parse_variable_declaration()?;
                self.declare(entry, scope, &at)?;
                node
            }
            _ => return Err(self.error_expected("'procedure' or 'variable'")),
        };
        children.push(decl);

        Ok(SyntaxNode::branch(Production::Declaration, children))
    }

    /// The signature goes into the declaring scope and into the procedure's
    /// own table, so the body can recurse and find its return type.
    fn parse_procedure_declaration(&mut self, scope: DeclScope) -> CompileResult<SyntaxNode> {
        let (header, signature, mut own, at) = self.parse_procedure_header()?;

        self.declare(signature.clone(), scope, &at)?;
        Self::define_in(&mut own, signature, &at)?;

        self.locals.push(own);
        let body = self.parse_body(Production::ProcedureBody, TokenKind::Procedure);
        let locals = self.locals.pop().unwrap_or_default();
        let body = body?;

        log::debug!(
            "procedure '{}' closes with {} local symbols",
            at.identifier().unwrap_or_default(),
            locals.len()
        );
        Ok(SyntaxNode::procedure(vec![header, body], locals))
    }

    /// Header node, the signature entry, a table holding the parameters and
    /// the name token
    fn parse_procedure_header(&mut self) -> CompileResult<(SyntaxNode, SymbolEntry, SymbolTable, Token)> {
        let procedure = self.expect(TokenKind::Procedure)?;
        let (name, name_token, name_leaf) = self.expect_identifier()?;
        let colon = self.expect(TokenKind::Colon)?;
        let (type_mark, return_type) = self.parse_type_mark()?;
        let lparen = self.expect(TokenKind::LParen)?;

        let mut children = vec![procedure, name_leaf, colon, type_mark, lparen];
        let mut params = SymbolTable::new();
        let mut arg_types = Vec::new();
        if !self.check(&TokenKind::RParen) {
            children.push(self.parse_parameter_list(&mut params, &mut arg_types)?);
        }
        children.push(self.expect(TokenKind::RParen)?);

        let signature = SymbolEntry::procedure(name, arg_types, return_type);
        Ok((
            SyntaxNode::branch(Production::ProcedureHeader, children),
            signature,
            params,
            name_token,
        ))
    }

    fn parse_parameter_list(
        &mut self,
        params: &mut SymbolTable,
        arg_types: &mut Vec<SymbolType>,
    ) -> CompileResult<SyntaxNode> {
        let mut children = Vec::new();
        loop {
            let (decl, entry, at) = self.parse_variable_declaration()?;
            arg_types.push(entry.entry_type);
            Self::define_in(params, entry, &at)?;
            children.push(SyntaxNode::branch(Production::Parameter, vec![decl]));

            if !self.check(&TokenKind::Comma) {
                break;
            }
            children.push(self.advance()?);
        }
        Ok(SyntaxNode::branch(Production::ParameterList, children))
    }

    /// `variable IDENT : type_mark [ [ bound ] ]`; the caller decides which
    /// table the entry goes into
    fn parse_variable_declaration(&mut self) -> CompileResult<(SyntaxNode, SymbolEntry, Token)> {
        let variable = self.expect(TokenKind::Variable)?;
        let (name, name_token, name_leaf) = self.expect_identifier()?;
        let colon = self.expect(TokenKind::Colon)?;
        let (type_mark, element) = self.parse_type_mark()?;

        let mut children = vec![variable, name_leaf, colon, type_mark];
        let mut size = None;
        if self.check(&TokenKind::LBracket) {
            children.push(self.advance()?);
            let (bound, value) = self.parse_bound()?;
            children.push(bound);
            children.push(self.expect(TokenKind::RBracket)?);
            size = Some(value);
        }

        let entry = SymbolEntry::variable(name, element, size);
        Ok((
            SyntaxNode::branch(Production::VariableDeclaration, children),
            entry,
            name_token,
        ))
    }

    fn parse_type_mark(&mut self) -> CompileResult<(SyntaxNode, SymbolType)> {
        let Some(ty) = self
            .peek_kind(0)
            .and_then(SymbolType::from_type_mark)
        else {
            return Err(self.error_expected("type mark"));
        };
        let leaf = self.advance()?;
        Ok((SyntaxNode::branch(Production::TypeMark, vec![leaf]), ty))
    }

    fn parse_bound(&mut self) -> CompileResult<(SyntaxNode, usize)> {
        let size = match self.peek_kind(0) {
            Some(&TokenKind::IntLiteral(value)) => usize::try_from(value).ok(),
            _ => None,
        };
        let Some(size) = size else {
            return Err(self.error_expected("integer array bound"));
        };
        let number = SyntaxNode::branch(Production::Number, vec![self.advance()?]);
        Ok((SyntaxNode::branch(Production::Bound, vec![number]), size))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_statement(&mut self) -> CompileResult<SyntaxNode> {
        let inner = match self.peek_kind(0) {
            Some(TokenKind::Identifier(_)) => self.parse_assignment_statement()?,
            Some(TokenKind::If) => self.parse_if_statement()?,
            Some(TokenKind::For) => self.parse_loop_statement()?,
            Some(TokenKind::Return) => self.parse_return_statement()?,
            _ => return Err(self.error_expected("statement")),
        };
        Ok(SyntaxNode::branch(Production::Statement, vec![inner]))
    }

    fn parse_assignment_statement(&mut self) -> CompileResult<SyntaxNode> {
        let destination = self.parse_indexed_identifier(Production::Destination)?;
        let assign = self.expect(TokenKind::Assign)?;
        let expression = self.parse_expression()?;
        Ok(SyntaxNode::branch(
            Production::AssignmentStatement,
            vec![destination, assign, expression],
        ))
    }

    /// Statements with their `;`, up to (not including) any of `terminators`
    fn parse_statement_block(
        &mut self,
        children: &mut Vec<SyntaxNode>,
        terminators: &[TokenKind],
    ) -> CompileResult<()> {
        while !terminators.iter().any(|t| self.check(t)) {
            children.push(self.parse_statement()?);
            children.push(self.expect(TokenKind::Semi)?);
        }
        Ok(())
    }

    fn parse_if_statement(&mut self) -> CompileResult<SyntaxNode> {
        let mut children = vec![
            self.expect(TokenKind::If)?,
            self.expect(TokenKind::LParen)?,
            self.parse_expression()?,
            self.expect(TokenKind::RParen)?,
            self.expect(TokenKind::Then)?,
        ];

        self.parse_statement_block(&mut children, &[TokenKind::Else, TokenKind::End])?;
        if self.check(&TokenKind::Else) {
            children.push(self.advance()?);
            self.parse_statement_block(&mut children, &[TokenKind::End])?;
        }
        children.push(self.expect(TokenKind::End)?);
        children.push(self.expect(TokenKind::If)?);

        Ok(SyntaxNode::branch(Production::IfStatement, children))
    }

    fn parse_loop_statement(&mut self) -> CompileResult<SyntaxNode> {
        let mut children = vec![
            self.expect(TokenKind::For)?,
            self.expect(TokenKind::LParen)?,
            self.parse_assignment_statement()?,
            self.expect(TokenKind::Semi)?,
            self.parse_expression()?,
            self.expect(TokenKind::RParen)?,
        ];

        self.parse_statement_block(&mut children, &[TokenKind::End])?;
        children.push(self.expect(TokenKind::End)?);
        children.push(self.expect(TokenKind::For)?);

        Ok(SyntaxNode::branch(Production::LoopStatement, children))
    }

    fn parse_return_statement(&mut self) -> CompileResult<SyntaxNode> {
        let keyword = self.expect(TokenKind::Return)?;
        let expression = self.parse_expression()?;
        Ok(SyntaxNode::branch(Production::ReturnStatement, vec![keyword, expression]))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expression(&mut self) -> CompileResult<SyntaxNode> {
        if self.depth == MAX_EXPRESSION_DEPTH {
            return Err(self.error_expected(format!(
                "expression nested at most {MAX_EXPRESSION_DEPTH} deep"
            )));
        }
        self.depth += 1;
        let expression = self.parse_expression_inner();
        self.depth -= 1;
        expression
    }

    /// `[not] arith_op [expression_prime]`
    fn parse_expression_inner(&mut self) -> CompileResult<SyntaxNode> {
        let mut children = Vec::new();
        if self.check(&TokenKind::Not) {
            children.push(self.advance()?);
        }
        children.push(self.parse_arith_op()?);
        if let Some(prime) = self.parse_prime(Production::ExpressionPrime, is_logical_op, Self::parse_arith_op)? {
            children.push(prime);
        }
        Ok(SyntaxNode::branch(Production::Expression, children))
    }

    fn parse_arith_op(&mut self) -> CompileResult<SyntaxNode> {
        self.parse_level(Production::ArithOp, Production::ArithOpPrime, is_additive_op, Self::parse_relation)
    }

    fn parse_relation(&mut self) -> CompileResult<SyntaxNode> {
        self.parse_level(Production::Relation, Production::RelationPrime, TokenKind::is_relational_op, Self::parse_term)
    }

    fn parse_term(&mut self) -> CompileResult<SyntaxNode> {
        self.parse_level(Production::Term, Production::TermPrime, is_multiplicative_op, Self::parse_factor)
    }

    /// `operand [prime]` for one precedence level
    fn parse_level(
        &mut self,
        production: Production,
        prime: Production,
        is_op: fn(&TokenKind) -> bool,
        operand: fn(&mut Self) -> CompileResult<SyntaxNode>,
    ) -> CompileResult<SyntaxNode> {
        let mut children = vec![operand(self)?];
        if let Some(rest) = self.parse_prime(prime, is_op, operand)? {
            children.push(rest);
        }
        Ok(SyntaxNode::branch(production, children))
    }

    /// Zero or more `op operand` repetitions, nested to the right
    fn parse_prime(
        &mut self,
        prime: Production,
        is_op: fn(&TokenKind) -> bool,
        operand: fn(&mut Self) -> CompileResult<SyntaxNode>,
    ) -> CompileResult<Option<SyntaxNode>> {
        let mut links = Vec::new();
        while self.check_with(is_op) {
            links.push((self.advance()?, operand(self)?));
        }

        let mut rest = None;
        for (op, value) in links.into_iter().rev() {
            let mut children = vec![op, value];
            children.extend(rest);
            rest = Some(SyntaxNode::branch(prime, children));
        }
        Ok(rest)
    }

    fn parse_factor(&mut self) -> CompileResult<SyntaxNode> {
        let children = match self.peek_kind(0) {
            Some(TokenKind::LParen) => vec![
                self.advance()?,
                self.parse_expression()?,
                self.expect(TokenKind::RParen)?,
            ],
            Some(TokenKind::Minus) => {
                let minus = self.advance()?;
                let operand = match self.peek_kind(0) {
                    Some(TokenKind::Identifier(_)) => self.parse_indexed_identifier(Production::Name)?,
                    Some(TokenKind::IntLiteral(_) | TokenKind::FloatLiteral(_)) => self.parse_number()?,
                    _ => return Err(self.error_expected("name or number after '-'")),
                };
                vec![minus, operand]
            }
            Some(TokenKind::Identifier(_)) => {
                if matches!(self.peek_kind(1), Some(TokenKind::LParen)) {
                    vec![self.parse_procedure_call()?]
                } else {
                    vec![self.parse_indexed_identifier(Production::Name)?]
                }
            }
            Some(TokenKind::IntLiteral(_) | TokenKind::FloatLiteral(_)) => vec![self.parse_number()?],
            Some(TokenKind::StringLiteral(_)) => {
                vec![SyntaxNode::branch(Production::String, vec![self.advance()?])]
            }
            Some(TokenKind::True | TokenKind::False) => vec![self.advance()?],
            _ => return Err(self.error_expected("expression")),
        };
        Ok(SyntaxNode::branch(Production::Factor, children))
    }

    fn parse_number(&mut self) -> CompileResult<SyntaxNode> {
        let literal = self.advance()?;
        Ok(SyntaxNode::branch(Production::Number, vec![literal]))
    }

    /// `IDENT [ [ expression ] ]`, as a name or a destination
    fn parse_indexed_identifier(&mut self, production: Production) -> CompileResult<SyntaxNode> {
        let (_, _, ident) = self.expect_identifier()?;
        let mut children = vec![ident];
        if self.check(&TokenKind::LBracket) {
            children.push(self.advance()?);
            children.push(self.parse_expression()?);
            children.push(self.expect(TokenKind::RBracket)?);
        }
        Ok(SyntaxNode::branch(production, children))
    }

    fn parse_procedure_call(&mut self) -> CompileResult<SyntaxNode> {
        let (_, _, ident) = self.expect_identifier()?;
        let mut children = vec![ident, self.expect(TokenKind::LParen)?];
        if !self.check(&TokenKind::RParen) {
            children.push(self.parse_argument_list()?);
        }
        children.push(self.expect(TokenKind::RParen)?);
        Ok(SyntaxNode::branch(Production::ProcedureCall, children))
    }

    fn parse_argument_list(&mut self) -> CompileResult<SyntaxNode> {
        let mut children = vec![self.parse_expression()?];
        while self.check(&TokenKind::Comma) {
            children.push(self.advance()?);
            children.push(self.parse_expression()?);
        }
        Ok(SyntaxNode::branch(Production::ArgumentList, children))
    }
}

fn is_logical_op(kind: &TokenKind) -> bool {
    matches!(kind, TokenKind::Amp | TokenKind::Pipe)
}

fn is_additive_op(kind: &TokenKind) -> bool {
    matches!(kind, TokenKind::Plus | TokenKind::Minus)
}

fn is_multiplicative_op(kind: &TokenKind) -> bool {
    matches!(kind, TokenKind::Star | TokenKind::Slash)
}

/// Parse a token sequence into a tree plus its global and builtin tables
pub fn parse(tokens: Vec<Token>) -> CompileResult<ParsedProgram> {
    Parser::new(tokens).parse()
}
