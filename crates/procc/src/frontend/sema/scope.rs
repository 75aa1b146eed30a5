//! Symbol tables and scope resolution

use super::types::SymbolType;
use std::collections::HashMap;

/// A symbol in a symbol table
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolEntry {
    pub identifier: String,
    pub entry_type: SymbolType,
    pub is_array: bool,
    pub array_size: usize,
    /// Parameter types in declared order (procedures only)
    pub procedure_arg_types: Vec<SymbolType>,
    /// Declared return type (procedures only)
    pub procedure_return_type: SymbolType,
    /// Slot owned by the code generator; never read or written by the front end
    pub codegen_binding: Option<usize>,
}

impl SymbolEntry {
    /// Scalar or array variable
    pub fn variable(identifier: impl Into<String>, element: SymbolType, array_size: Option<usize>) -> Self {
        let is_array = array_size.is_some();
        Self {
            identifier: identifier.into(),
            entry_type: if is_array { element.array_of() } else { element },
            is_array,
            array_size: array_size.unwrap_or(0),
            procedure_arg_types: Vec::new(),
            procedure_return_type: SymbolType::None,
            codegen_binding: None,
        }
    }

    pub fn procedure(
        identifier: impl Into<String>,
        arg_types: Vec<SymbolType>,
        return_type: SymbolType,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            entry_type: SymbolType::Procedure,
            is_array: false,
            array_size: 0,
            procedure_arg_types: arg_types,
            procedure_return_type: return_type,
            codegen_binding: None,
        }
    }

    pub fn is_procedure(&self) -> bool {
        self.entry_type == SymbolType::Procedure
    }
}

/// One scope level: identifier -> entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    symbols: HashMap<String, SymbolEntry>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a new symbol; redeclaring a name in the same table is an error
    pub fn define(&mut self, entry: SymbolEntry) -> Result<(), String> {
        if self.symbols.contains_key(&entry.identifier) {
            return Err(format!("redeclaration of '{}'", entry.identifier));
        }
        self.symbols.insert(entry.identifier.clone(), entry);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&SymbolEntry> {
        self.symbols.get(name)
    }

    /// Mutable access, used by the code generator to fill in `codegen_binding`
    pub fn get_mut(&mut self, name: &str) -> Option<&mut SymbolEntry> {
        self.symbols.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The fixed table of intrinsic I/O procedures
    pub fn builtins() -> Self {
        use SymbolType as T;

        let signatures: [(&str, &[SymbolType], SymbolType); 9] = [
            ("getbool", &[], T::Bool),
            ("getinteger", &[], T::Integer),
            ("getfloat", &[], T::Float),
            ("getstring", &[], T::String),
            ("putbool", &[T::Bool], T::Bool),
            ("putinteger", &[T::Integer], T::Bool),
            ("putfloat", &[T::Float], T::Bool),
            ("putstring", &[T::String], T::Bool),
            ("sqrt", &[T::Integer], T::Float),
        ];

        let mut table = Self::new();
        for (name, args, ret) in signatures {
            table
                .symbols
                .insert(name.to_string(), SymbolEntry::procedure(name, args.to_vec(), ret));
        }
        table
    }
}

/// Resolution order for a reference: innermost local, then global, then builtin
#[derive(Debug, Clone, Copy)]
pub struct ScopeChain<'a> {
    pub local: Option<&'a SymbolTable>,
    pub global: &'a SymbolTable,
    pub builtin: &'a SymbolTable,
}

impl<'a> ScopeChain<'a> {
    pub fn new(global: &'a SymbolTable, builtin: &'a SymbolTable) -> Self {
        Self { local: None, global, builtin }
    }

    /// Same chain with a different innermost local table
    pub fn with_local(self, local: &'a SymbolTable) -> Self {
        Self { local: Some(local), ..self }
    }

    /// First match wins
    pub fn resolve(&self, name: &str) -> Option<&'a SymbolEntry> {
        self.local
            .and_then(|table| table.lookup(name))
            .or_else(|| self.global.lookup(name))
            .or_else(|| self.builtin.lookup(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_lookup() {
        let mut table = SymbolTable::new();
        table.define(SymbolEntry::variable("x", SymbolType::Integer, None)).unwrap();
        let entry = table.lookup("x").unwrap();
        assert_eq!(entry.entry_type, SymbolType::Integer);
        assert!(!entry.is_array);
        assert_eq!(entry.codegen_binding, None);
    }

    #[test]
    fn test_redeclaration_rejected() {
        let mut table = SymbolTable::new();
        table.define(SymbolEntry::variable("x", SymbolType::Integer, None)).unwrap();
        let err = table
            .define(SymbolEntry::variable("x", SymbolType::Float, None))
            .unwrap_err();
        assert_eq!(err, "redeclaration of 'x'");
        assert_eq!(table.lookup("x").unwrap().entry_type, SymbolType::Integer);
    }

    #[test]
    fn test_array_variable() {
        let entry = SymbolEntry::variable("a", SymbolType::Float, Some(8));
        assert_eq!(entry.entry_type, SymbolType::FloatArray);
        assert!(entry.is_array);
        assert_eq!(entry.array_size, 8);
    }

    #[test]
    fn test_local_shadows_global() {
        let mut global = SymbolTable::new();
        global.define(SymbolEntry::variable("x", SymbolType::Integer, None)).unwrap();
        let mut local = SymbolTable::new();
        local.define(SymbolEntry::variable("x", SymbolType::String, None)).unwrap();
        let builtin = SymbolTable::builtins();

        let outer = ScopeChain::new(&global, &builtin);
        let inner = outer.with_local(&local);
        assert_eq!(inner.resolve("x").unwrap().entry_type, SymbolType::String);
        assert_eq!(outer.resolve("x").unwrap().entry_type, SymbolType::Integer);
    }

    #[test]
    fn test_builtins_resolve_last() {
        let global = SymbolTable::new();
        let builtin = SymbolTable::builtins();
        let chain = ScopeChain::new(&global, &builtin);

        let put = chain.resolve("putinteger").unwrap();
        assert!(put.is_procedure());
        assert_eq!(put.procedure_arg_types, vec![SymbolType::Integer]);
        assert_eq!(put.procedure_return_type, SymbolType::Bool);
        assert_eq!(chain.resolve("sqrt").unwrap().procedure_return_type, SymbolType::Float);
        assert!(chain.resolve("missing").is_none());
    }

    #[test]
    fn test_global_shadows_builtin() {
        let mut global = SymbolTable::new();
        global
            .define(SymbolEntry::procedure("sqrt", vec![SymbolType::Float], SymbolType::Float))
            .unwrap();
        let builtin = SymbolTable::builtins();
        let chain = ScopeChain::new(&global, &builtin);
        assert_eq!(chain.resolve("sqrt").unwrap().procedure_arg_types, vec![SymbolType::Float]);
    }

    #[test]
    fn test_codegen_binding_is_preserved() {
        let mut table = SymbolTable::new();
        table.define(SymbolEntry::variable("x", SymbolType::Bool, None)).unwrap();
        table.get_mut("x").unwrap().codegen_binding = Some(3);
        assert_eq!(table.lookup("x").unwrap().codegen_binding, Some(3));
    }
}
