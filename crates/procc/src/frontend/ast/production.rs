//! Grammar productions

use std::fmt;

/// Grammar nonterminal an interior node was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Production {
    Program,
    ProgramHeader,
    ProgramBody,
    Declaration,
    ProcedureDeclaration,
    ProcedureHeader,
    ProcedureBody,
    ParameterList,
    Parameter,
    VariableDeclaration,
    TypeMark,
    Bound,
    Number,
    String,
    Statement,
    AssignmentStatement,
    Destination,
    IfStatement,
    LoopStatement,
    ReturnStatement,
    ProcedureCall,
    ArgumentList,
    Expression,
    ExpressionPrime,
    ArithOp,
    ArithOpPrime,
    Relation,
    RelationPrime,
    Term,
    TermPrime,
    Factor,
    Name,
}

impl Production {
    pub fn name(self) -> &'static str {
        match self {
            Production::Program => "program",
            Production::ProgramHeader => "program_header",
            Production::ProgramBody => "program_body",
            Production::Declaration => "declaration",
            Production::ProcedureDeclaration => "procedure_declaration",
            Production::ProcedureHeader => "procedure_header",
            Production::ProcedureBody => "procedure_body",
            Production::ParameterList => "parameter_list",
            Production::Parameter => "parameter",
            Production::VariableDeclaration => "variable_declaration",
            Production::TypeMark => "type_mark",
            Production::Bound => "bound",
            Production::Number => "number",
            Production::String => "string",
            Production::Statement => "statement",
            Production::AssignmentStatement => "assignment_statement",
            Production::Destination => "destination",
            Production::IfStatement => "if_statement",
            Production::LoopStatement => "loop_statement",
            Production::ReturnStatement => "return_statement",
            Production::ProcedureCall => "procedure_call",
            Production::ArgumentList => "argument_list",
            Production::Expression => "expression",
            Production::ExpressionPrime => "expression_prime",
            Production::ArithOp => "arithOp",
            Production::ArithOpPrime => "arithOpPrime",
            Production::Relation => "relation",
            Production::RelationPrime => "relationPrime",
            Production::Term => "term",
            Production::TermPrime => "termPrime",
            Production::Factor => "factor",
            Production::Name => "name",
        }
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.name())
    }
}
