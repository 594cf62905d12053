//! The whole-program container
//!
//! Owns the procedure list, the global operand set, and the
//! string-literal pool. Populated by one pass over the AST, read-only
//! afterward. A distinguished `__init` procedure hosts module-level
//! evaluation; Della has no executable statements outside functions, so
//! it stays empty, but it keeps the emission pipeline uniform.

use crate::opd::Opd;
use crate::proc::Procedure;
use dlc_common::{StrId, SymbolId, Width};
use std::collections::HashMap;

#[derive(Debug)]
pub struct Program {
    procs: Vec<Procedure>,
    init: Procedure,
    globals: Vec<(SymbolId, Width)>,
    global_index: HashMap<SymbolId, usize>,
    strings: Vec<String>,
    string_index: HashMap<String, StrId>,
}

impl Program {
    pub fn new() -> Self {
        Program {
            procs: Vec::new(),
            init: Procedure::new("__init"),
            globals: Vec::new(),
            global_index: HashMap::new(),
            strings: Vec::new(),
            string_index: HashMap::new(),
        }
    }

    pub fn add_proc(&mut self, proc: Procedure) {
        self.procs.push(proc);
    }

    pub fn procs(&self) -> &[Procedure] {
        &self.procs
    }

    pub fn init_proc(&self) -> &Procedure {
        &self.init
    }

    pub fn init_proc_mut(&mut self) -> &mut Procedure {
        &mut self.init
    }

    pub fn gather_global(&mut self, sym: SymbolId, width: Width) {
        if !self.global_index.contains_key(&sym) {
            self.global_index.insert(sym, self.globals.len());
            self.globals.push((sym, width));
        }
    }

    /// Operand for a gathered global symbol
    pub fn global_opd(&self, sym: SymbolId) -> Option<Opd> {
        self.global_index
            .get(&sym)
            .map(|&idx| self.globals[idx])
            .map(|(sym, width)| Opd::Sym { sym, width })
    }

    /// Globals in gathering order
    pub fn globals(&self) -> &[(SymbolId, Width)] {
        &self.globals
    }

    /// Intern a string literal, de-duplicating by text: lowering the
    /// same literal twice yields the same pooled operand.
    pub fn intern_string(&mut self, text: &str) -> Opd {
        if let Some(&id) = self.string_index.get(text) {
            return Opd::Str { id };
        }
        let id = self.strings.len() as StrId;
        self.strings.push(text.to_string());
        self.string_index.insert(text.to_string(), id);
        Opd::Str { id }
    }

    /// String constants in interning order, with their pool ids
    pub fn strings(&self) -> impl Iterator<Item = (StrId, &str)> {
        self.strings
            .iter()
            .enumerate()
            .map(|(id, text)| (id as StrId, text.as_str()))
    }

    pub fn string_text(&self, id: StrId) -> Option<&str> {
        self.strings.get(id as usize).map(|s| s.as_str())
    }

    /// Data-section label for a pooled string constant
    pub fn string_label(id: StrId) -> String {
        format!("str_{}", id)
    }

    /// Validate every procedure, the `__init` one included
    pub fn validate(&self) -> Result<(), crate::error::IrError> {
        self.init.validate()?;
        for proc in &self.procs {
            proc.validate()?;
        }
        Ok(())
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}
