//! Procedures: instruction list, operand collections, frame layout
//!
//! A procedure owns its ordered instruction list and three operand
//! collections: formals (ordered), locals (keyed by symbol, stable
//! declaration order), and temporaries (creation order). It owns
//! exactly one `Enter` (pushed at construction) and one `Leave` (pushed
//! by [`Procedure::seal`]), and one designated leave label that every
//! `return` jumps to: one epilogue per procedure, no matter how many
//! return statements the source had.
//!
//! Label and temporary counters are fields of the procedure; there is
//! no global mutable numbering state anywhere in the pipeline.

use crate::error::IrError;
use crate::opd::Opd;
use crate::quad::{Inst, Quad};
use dlc_common::{LabelId, SymbolId, TempId, Width};
use std::collections::HashMap;

#[derive(Debug)]
pub struct Procedure {
    name: String,
    formals: Vec<(SymbolId, Width)>,
    locals: Vec<(SymbolId, Width)>,
    temps: Vec<Width>,
    addrs: Vec<Width>,
    body: Vec<Inst>,
    labels: Vec<String>,
    leave_label: LabelId,
}

impl Procedure {
    pub fn new(name: &str) -> Self {
        Procedure {
            name: name.to_string(),
            formals: Vec::new(),
            locals: Vec::new(),
            temps: Vec::new(),
            addrs: Vec::new(),
            body: vec![Inst::new(Quad::Enter)],
            labels: vec![format!("lbl_{}_leave", name)],
            leave_label: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gather_formal(&mut self, sym: SymbolId, width: Width) {
        self.formals.push((sym, width));
    }

    pub fn gather_local(&mut self, sym: SymbolId, width: Width) {
        if !self.locals.iter().any(|(s, _)| *s == sym) {
            self.locals.push((sym, width));
        }
    }

    /// Operand for a gathered formal or local symbol
    pub fn sym_opd(&self, sym: SymbolId) -> Option<Opd> {
        self.formals
            .iter()
            .chain(self.locals.iter())
            .find(|(s, _)| *s == sym)
            .map(|&(sym, width)| Opd::Sym { sym, width })
    }

    /// Operand for the i-th formal (0-based)
    pub fn formal_opd(&self, index: usize) -> Option<Opd> {
        self.formals
            .get(index)
            .map(|&(sym, width)| Opd::Sym { sym, width })
    }

    pub fn formals(&self) -> &[(SymbolId, Width)] {
        &self.formals
    }

    pub fn num_formals(&self) -> usize {
        self.formals.len()
    }

    pub fn num_locals(&self) -> usize {
        self.locals.len()
    }

    pub fn num_temps(&self) -> usize {
        self.temps.len()
    }

    /// Synthesize a fresh temporary of the given width
    pub fn make_tmp(&mut self, width: Width) -> Opd {
        let id = self.temps.len() as TempId;
        self.temps.push(width);
        Opd::Tmp { id, width }
    }

    /// Synthesize a fresh address-of slot of the given pointee width
    pub fn make_addr(&mut self, width: Width) -> Opd {
        let id = self.addrs.len() as TempId;
        self.addrs.push(width);
        Opd::Addr { id, width }
    }

    /// Allocate a fresh label; anchor it later with [`Procedure::anchor`]
    pub fn make_label(&mut self) -> LabelId {
        let id = self.labels.len() as LabelId;
        self.labels.push(format!("lbl_{}_{}", self.name, id));
        id
    }

    pub fn leave_label(&self) -> LabelId {
        self.leave_label
    }

    pub fn label_name(&self, id: LabelId) -> Result<&str, IrError> {
        self.labels
            .get(id as usize)
            .map(|s| s.as_str())
            .ok_or(IrError::UnknownLabel {
                id,
                proc: self.name.clone(),
            })
    }

    pub fn push(&mut self, quad: Quad) {
        self.body.push(Inst::new(quad));
    }

    pub fn push_inst(&mut self, inst: Inst) {
        self.body.push(inst);
    }

    /// Anchor a label on a fresh no-op
    pub fn anchor(&mut self, label: LabelId) {
        self.body.push(Inst::labeled(label, Quad::Nop));
    }

    /// Append the single `Leave`, anchored on the leave label
    pub fn seal(&mut self) {
        self.body.push(Inst::labeled(self.leave_label, Quad::Leave));
    }

    pub fn body(&self) -> &[Inst] {
        &self.body
    }

    /// Check the structural invariants: exactly one enter and leave,
    /// and every jump target anchored to exactly one instruction.
    pub fn validate(&self) -> Result<(), IrError> {
        let enters = self
            .body
            .iter()
            .filter(|i| matches!(i.kind, Quad::Enter))
            .count();
        let leaves = self
            .body
            .iter()
            .filter(|i| matches!(i.kind, Quad::Leave))
            .count();
        if enters != 1 || leaves != 1 {
            return Err(IrError::MalformedFrame {
                proc: self.name.clone(),
            });
        }

        let mut anchors: HashMap<LabelId, usize> = HashMap::new();
        for inst in &self.body {
            for &label in &inst.labels {
                *anchors.entry(label).or_insert(0) += 1;
            }
        }
        for inst in &self.body {
            if let Some(target) = inst.kind.jump_target() {
                match anchors.get(&target).copied().unwrap_or(0) {
                    1 => {}
                    0 => {
                        return Err(IrError::DanglingLabel {
                            label: self.label_name(target)?.to_string(),
                            proc: self.name.clone(),
                        })
                    }
                    count => {
                        return Err(IrError::MultiplyAnchored {
                            label: self.label_name(target)?.to_string(),
                            proc: self.name.clone(),
                            count,
                        })
                    }
                }
            }
        }
        Ok(())
    }

    /// Assign stack offsets to every frame-resident operand.
    ///
    /// All slots are 8-byte granular, relative to the biased frame base
    /// (`%rbp` = entry `%rsp` + 16, per the enter template):
    ///
    /// - formals 1..=6 get home slots just below the frame base, used to
    ///   spill the register-passed arguments;
    /// - formals beyond the sixth stay in the caller-pushed area at
    ///   positive offsets and get no slot of their own;
    /// - locals sit below all home slots, in declaration order;
    /// - temporaries and address slots sit below the locals, in
    ///   creation order.
    ///
    /// The reserved size is rounded up to a multiple of 16 so the stack
    /// pointer stays 16-byte aligned at call sites.
    pub fn layout(&self) -> FrameLayout {
        let num_formals = self.formals.len() as i64;
        let homed = num_formals.min(6);
        let mut offsets = HashMap::new();

        for (i, &(sym, width)) in self.formals.iter().enumerate() {
            let i = i as i64 + 1;
            let offset = if i <= 6 {
                -16 - 8 * i
            } else {
                8 * (num_formals - i)
            };
            offsets.insert(Opd::Sym { sym, width }, offset);
        }

        let locals_base = -16 - 8 * homed;
        for (j, &(sym, width)) in self.locals.iter().enumerate() {
            let offset = locals_base - 8 * (j as i64 + 1);
            offsets.insert(Opd::Sym { sym, width }, offset);
        }

        let temps_base = locals_base - 8 * self.locals.len() as i64;
        for (k, &width) in self.temps.iter().enumerate() {
            let offset = temps_base - 8 * (k as i64 + 1);
            offsets.insert(
                Opd::Tmp {
                    id: k as TempId,
                    width,
                },
                offset,
            );
        }

        let addrs_base = temps_base - 8 * self.temps.len() as i64;
        for (k, &width) in self.addrs.iter().enumerate() {
            let offset = addrs_base - 8 * (k as i64 + 1);
            offsets.insert(
                Opd::Addr {
                    id: k as TempId,
                    width,
                },
                offset,
            );
        }

        let raw = 8 * (homed as usize + self.locals.len() + self.temps.len() + self.addrs.len());
        let alloc_bytes = (raw + 15) & !15;

        FrameLayout {
            offsets,
            alloc_bytes,
        }
    }
}

/// The frame-slot assignment for one procedure, computed exactly once
/// between lowering and emission
#[derive(Debug)]
pub struct FrameLayout {
    offsets: HashMap<Opd, i64>,
    alloc_bytes: usize,
}

impl FrameLayout {
    /// Offset of a frame-resident operand relative to the frame base
    pub fn offset(&self, opd: &Opd) -> Option<i64> {
        self.offsets.get(opd).copied()
    }

    /// Bytes reserved below the frame base by the enter sequence
    pub fn alloc_bytes(&self) -> usize {
        self.alloc_bytes
    }
}
