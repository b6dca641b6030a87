//! Lowering from the named AST to the free-expression form.
//!
//! A term compiles against an ordered list of the names its environment
//! will carry, position 0 first. Abstractions with a used binder push the
//! bound name onto that list; applications split it between their sides,
//! recording a direction per slot. By the time a variable leaf is reached
//! the list has been pruned to exactly that variable, so closures only
//! ever capture values that are actually referenced.

use crate::arena::{CellId, Dir, Dirs, EnvId, Free, FreeId, Graph, NodeId};
use crate::engine::fill::fill;
use num_bigint::BigInt;
use rustc_hash::FxHashMap;
use std::fmt;
use tracing::debug;

/// A named source term, as delivered by the parser.
#[derive(Clone, Debug)]
pub enum Term<M> {
    Var { name: String, meta: M },
    Abst { bound: String, body: Box<Term<M>>, meta: M },
    Appl { left: Box<Term<M>>, right: Box<Term<M>>, meta: M },
    Global { name: String, meta: M },
    Int { value: BigInt, meta: M },
}

/// A compile failure carrying the offending node's metadata, so the
/// caller can point at the source position.
#[derive(Clone, Debug)]
pub struct CompileError<M> {
    pub meta: M,
    pub message: String,
}

impl<M> fmt::Display for CompileError<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl<M: fmt::Debug> std::error::Error for CompileError<M> {}

impl<M: Clone> Term<M> {
    pub fn meta(&self) -> &M {
        match self {
            Term::Var { meta, .. }
            | Term::Abst { meta, .. }
            | Term::Appl { meta, .. }
            | Term::Global { meta, .. }
            | Term::Int { meta, .. } => meta,
        }
    }

    /// Does `name` occur free in this term?
    pub fn has_free(&self, name: &str) -> bool {
        match self {
            Term::Var { name: n, .. } => n == name,
            Term::Abst { bound, body, .. } => bound != name && body.has_free(name),
            Term::Appl { left, right, .. } => left.has_free(name) || right.has_free(name),
            Term::Global { .. } | Term::Int { .. } => false,
        }
    }

    /// Lower this term into a free expression. `free` lists the names the
    /// resulting expression's environment will carry, position 0 first;
    /// `globals` maps global names to their stable cells.
    pub fn compile(
        &self,
        g: &mut Graph<M>,
        globals: &FxHashMap<String, CellId>,
        free: &[&str],
    ) -> Result<FreeId, CompileError<M>> {
        match self {
            Term::Var { name, meta } => {
                if free.len() != 1 || free[0] != name.as_str() {
                    return Err(CompileError {
                        meta: meta.clone(),
                        message: format!("'{name}' not defined"),
                    });
                }
                Ok(g.add_free(Free::Var { meta: meta.clone() }))
            }
            Term::Global { name, meta } => {
                let Some(&cell) = globals.get(name) else {
                    return Err(CompileError {
                        meta: meta.clone(),
                        message: format!("'{name}' not defined"),
                    });
                };
                debug_assert!(free.is_empty(), "global reference inside a pruned environment");
                Ok(g.add_free(Free::Ref { cell, meta: meta.clone() }))
            }
            Term::Int { value, .. } => {
                debug_assert!(free.is_empty(), "integer literal inside a pruned environment");
                Ok(g.add_free(Free::Int { value: value.clone() }))
            }
            Term::Abst { bound, body, meta } => {
                if !body.has_free(bound) {
                    let body = body.compile(g, globals, free)?;
                    return Ok(g.add_free(Free::Abst { used: false, body, meta: meta.clone() }));
                }
                let mut inner: Vec<&str> = Vec::with_capacity(free.len() + 1);
                inner.push(bound);
                inner.extend_from_slice(free);
                let body = body.compile(g, globals, &inner)?;
                Ok(g.add_free(Free::Abst { used: true, body, meta: meta.clone() }))
            }
            Term::Appl { left, right, meta } => {
                let mut dirs = Dirs::new();
                let mut lfree: Vec<&str> = Vec::new();
                let mut rfree: Vec<&str> = Vec::new();
                for &name in free {
                    let l = left.has_free(name);
                    let r = right.has_free(name);
                    if l {
                        lfree.push(name);
                    }
                    if r {
                        rfree.push(name);
                    }
                    dirs.push(match (l, r) {
                        (true, true) => Dir::Both,
                        (true, false) => Dir::Left,
                        (false, true) => Dir::Right,
                        (false, false) => {
                            return Err(CompileError {
                                meta: meta.clone(),
                                message: format!("'{name}' not defined"),
                            })
                        }
                    });
                }
                // Reversed so the cons-reversal in distribute restores
                // each side's positional order at fill time.
                lfree.reverse();
                rfree.reverse();
                let left = left.compile(g, globals, &lfree)?;
                let right = right.compile(g, globals, &rfree)?;
                Ok(g.add_free(Free::Appl { dirs, left, right, meta: meta.clone() }))
            }
        }
    }
}

/// Compile every definition against a shared cell table.
///
/// Cells for all names, builtins included, exist before any body is
/// lowered, so mutually recursive and cyclic references resolve. Each
/// compiled body is filled with the empty environment and stored into its
/// cell afterwards; compile order does not matter because a reference
/// captures the cell, not its contents.
pub fn compile_all<M: Clone>(
    g: &mut Graph<M>,
    defs: &[(String, Term<M>)],
    builtins: &[(String, NodeId)],
) -> Result<FxHashMap<String, NodeId>, CompileError<M>> {
    let mut cells: FxHashMap<String, CellId> = FxHashMap::default();
    for (name, node) in builtins {
        let cell = g.new_cell();
        g.set_cell(cell, *node);
        cells.insert(name.clone(), cell);
    }

    let mut def_cells: Vec<CellId> = Vec::with_capacity(defs.len());
    for (name, body) in defs {
        if cells.contains_key(name) {
            return Err(CompileError {
                meta: body.meta().clone(),
                message: format!("'{name}' already defined"),
            });
        }
        let cell = g.new_cell();
        cells.insert(name.clone(), cell);
        def_cells.push(cell);
    }

    let mut out: FxHashMap<String, NodeId> = FxHashMap::default();
    for (name, node) in builtins {
        out.insert(name.clone(), *node);
    }
    for ((name, body), &cell) in defs.iter().zip(&def_cells) {
        let ir = body.compile(g, &cells, &[])?;
        let filled = fill(g, ir, EnvId::NIL);
        g.set_cell(cell, filled);
        out.insert(name.clone(), filled);
        debug!(global = %name, "compiled");
    }
    Ok(out)
}
