// Copyright (c) 2021 Saadi Save
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! # Compilation units
//! The program representation inspected by the checker
//!
//! Only debug metadata attachment is modelled. Operations carry a mnemonic and
//! an optional location handle, functions carry an optional subprogram handle.

use crate::error::{DiError, DiResult};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

mod ids;

pub use ids::{LocationRef, OpId, SubprogramRef};

/// Compile-unit-level debug record
///
/// Its presence on a [`CompilationUnit`] marks debug info generation as active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugCompileUnit {
    pub file: String,
}

/// The program processed by a pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationUnit {
    #[serde(default)]
    pub debug_units: Vec<DebugCompileUnit>,
    #[serde(default)]
    pub functions: Vec<Function>,
    /// Next id to hand out, `None` until the first one is minted
    #[serde(default)]
    next_id: Option<u32>,
}

impl CompilationUnit {
    /// A unit compiled with debug info, originating from `file`
    pub fn with_debug_info(file: impl Into<String>) -> Self {
        Self {
            debug_units: vec![DebugCompileUnit { file: file.into() }],
            ..Self::default()
        }
    }

    /// A unit compiled without debug info
    pub fn without_debug_info() -> Self {
        Self::default()
    }

    /// The first compile-unit-level debug record, if debug info is active
    ///
    /// Units carrying several records are identified by the first one only.
    pub fn debug_compile_unit(&self) -> Option<&DebugCompileUnit> {
        self.debug_units.first()
    }

    pub fn has_debug_info(&self) -> bool {
        self.debug_compile_unit().is_some()
    }

    pub fn functions(&self) -> std::slice::Iter<'_, Function> {
        self.functions.iter()
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn function_mut(&mut self, name: &str) -> Option<&mut Function> {
        self.functions.iter_mut().find(|f| f.name == name)
    }

    pub fn push_function(&mut self, function: Function) -> &mut Function {
        self.functions.push(function);
        let last = self.functions.len() - 1;
        &mut self.functions[last]
    }

    /// Mints an id not used anywhere in the unit
    ///
    /// Units deserialized without a counter start past every id in use.
    /// `u32::MAX` is never handed out.
    fn fresh_id(&mut self) -> DiResult<u32> {
        let id = match self.next_id {
            Some(id) => id,
            None => match self.max_used_id() {
                Some(max) => max.checked_add(1).ok_or(DiError::IdsExhausted)?,
                None => 0,
            },
        };

        self.next_id = Some(id.checked_add(1).ok_or(DiError::IdsExhausted)?);
        Ok(id)
    }

    fn max_used_id(&self) -> Option<u32> {
        self.functions
            .iter()
            .flat_map(|f| {
                let ops = f.operations().flat_map(|op| {
                    std::iter::once(op.id.raw()).chain(op.location.map(LocationRef::raw))
                });
                f.subprogram.map(SubprogramRef::raw).into_iter().chain(ops)
            })
            .max()
    }

    pub fn new_subprogram(&mut self) -> DiResult<SubprogramRef> {
        self.fresh_id().map(SubprogramRef::new)
    }

    pub fn new_location(&mut self) -> DiResult<LocationRef> {
        self.fresh_id().map(LocationRef::new)
    }

    /// Creates a computing operation with a fresh id and no location
    pub fn new_op(&mut self, opcode: impl Into<String>) -> DiResult<Operation> {
        let id = OpId::new(self.fresh_id()?);
        Ok(Operation::new(id, opcode, OpKind::Compute))
    }

    /// Creates a merge operation, which is never snapshotted
    pub fn new_merge(&mut self) -> DiResult<Operation> {
        let id = OpId::new(self.fresh_id()?);
        Ok(Operation::new(id, "phi", OpKind::Merge))
    }

    /// Creates a debug intrinsic, which is never snapshotted
    pub fn new_debug_intrinsic(&mut self) -> DiResult<Operation> {
        let id = OpId::new(self.fresh_id()?);
        Ok(Operation::new(id, "dbg.value", OpKind::DebugIntrinsic))
    }
}

/// Whether the body of a function is the one that will run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Linkage {
    /// The definition is final
    #[default]
    Exact,
    /// The definition may be replaced at link time
    Interposable,
}

/// A procedure of a [`CompilationUnit`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    #[serde(default)]
    pub subprogram: Option<SubprogramRef>,
    #[serde(default)]
    pub linkage: Linkage,
    /// Empty for declarations
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Function {
    pub fn definition(name: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            name: name.into(),
            subprogram: None,
            linkage: Linkage::Exact,
            blocks,
        }
    }

    pub fn declaration(name: impl Into<String>) -> Self {
        Self::definition(name, Vec::new())
    }

    #[must_use]
    pub fn with_subprogram(mut self, subprogram: SubprogramRef) -> Self {
        self.subprogram = Some(subprogram);
        self
    }

    #[must_use]
    pub fn interposable(mut self) -> Self {
        self.linkage = Linkage::Interposable;
        self
    }

    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Only functions with exactly one, final body are inspected
    pub fn is_eligible(&self) -> bool {
        !self.is_declaration() && self.linkage == Linkage::Exact
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.blocks.iter().flat_map(|bb| bb.ops.iter())
    }

    pub fn operation_mut(&mut self, id: OpId) -> Option<&mut Operation> {
        self.blocks
            .iter_mut()
            .flat_map(|bb| bb.ops.iter_mut())
            .find(|op| op.id == id)
    }
}

/// A straight-line sequence of operations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ops: Vec<Operation>,
}

impl Block {
    pub fn named(name: impl Into<String>, ops: Vec<Operation>) -> Self {
        Self {
            name: Some(name.into()),
            ops,
        }
    }

    pub fn anonymous(ops: Vec<Operation>) -> Self {
        Self { name: None, ops }
    }
}

/// Classifies operations for snapshotting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpKind {
    #[default]
    Compute,
    /// Joins values from several predecessors
    Merge,
    /// Carries debug metadata only
    DebugIntrinsic,
}

/// One instruction of a [`Block`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub id: OpId,
    pub opcode: String,
    #[serde(default)]
    pub kind: OpKind,
    #[serde(default)]
    pub location: Option<LocationRef>,
}

impl Operation {
    pub fn new(id: OpId, opcode: impl Into<String>, kind: OpKind) -> Self {
        Self {
            id,
            opcode: opcode.into(),
            kind,
            location: None,
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: LocationRef) -> Self {
        self.location = Some(location);
        self
    }

    pub fn is_snapshotted(&self) -> bool {
        self.kind == OpKind::Compute
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} = {}", self.id, self.opcode)?;

        if let Some(loc) = self.location {
            write!(f, ", !dbg {loc}")?;
        }

        Ok(())
    }
}
