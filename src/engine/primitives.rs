//! Curried big-integer primitives and the builtin globals table.
//!
//! Every op takes its operands one at a time: applying a bare op to an
//! integer yields a partially-applied op, applying that to a second
//! integer yields the result. Comparison results are the canonical Church
//! booleans cached on the graph.

use crate::arena::{BinOp, CmpOp, EnvId, Free, Graph, Node, NodeId};
use crate::engine::fill::fill;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Zero;

/// Apply a curried arithmetic op to a normal-form operand. Division and
/// modulo floor toward negative infinity; a zero divisor traps.
pub fn apply_binop<M: Clone>(
    g: &mut Graph<M>,
    op: BinOp,
    first: Option<BigInt>,
    operand: NodeId,
) -> NodeId {
    let value = int_operand(g, operand, "int bin op");
    let Some(first) = first else {
        return g.add(Node::BinOp { op, first: Some(value) });
    };
    let result = match op {
        BinOp::Add => first + value,
        BinOp::Sub => first - value,
        BinOp::Mul => first * value,
        BinOp::Div => {
            if value.is_zero() {
                panic!("int bin op: division by zero");
            }
            first.div_floor(&value)
        }
        BinOp::Mod => {
            if value.is_zero() {
                panic!("int bin op: division by zero");
            }
            first.mod_floor(&value)
        }
    };
    g.add(Node::Int { value: result })
}

/// Apply a curried comparison op to a normal-form operand. A completed
/// comparison returns one of the Church booleans.
pub fn apply_cmpop<M: Clone>(
    g: &mut Graph<M>,
    op: CmpOp,
    first: Option<BigInt>,
    operand: NodeId,
) -> NodeId {
    let value = int_operand(g, operand, "int cmp op");
    let Some(first) = first else {
        return g.add(Node::CmpOp { op, first: Some(value) });
    };
    let holds = match op {
        CmpOp::Eq => first == value,
        CmpOp::Neq => first != value,
        CmpOp::Less => first < value,
        CmpOp::More => first > value,
        CmpOp::LessEq => first <= value,
        CmpOp::MoreEq => first >= value,
    };
    let result = if holds { g.truth } else { g.falsity };
    if result == NodeId::NULL {
        panic!("int cmp op: booleans not installed");
    }
    result
}

fn int_operand<M>(g: &Graph<M>, id: NodeId, what: &str) -> BigInt {
    match g.get(id) {
        Node::Int { value } => value.clone(),
        _ => panic!("{what}: operand not int"),
    }
}

pub fn binop_name(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "Add",
        BinOp::Sub => "Sub",
        BinOp::Mul => "Mul",
        BinOp::Div => "Div",
        BinOp::Mod => "Mod",
    }
}

pub fn cmpop_name(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Eq => "Eq",
        CmpOp::Neq => "Neq",
        CmpOp::Less => "Less",
        CmpOp::More => "More",
        CmpOp::LessEq => "LessEq",
        CmpOp::MoreEq => "MoreEq",
    }
}

const BINOPS: [(&str, BinOp); 5] = [
    ("Add", BinOp::Add),
    ("Sub", BinOp::Sub),
    ("Mul", BinOp::Mul),
    ("Div", BinOp::Div),
    ("Mod", BinOp::Mod),
];

const CMPOPS: [(&str, CmpOp); 6] = [
    ("Eq", CmpOp::Eq),
    ("Neq", CmpOp::Neq),
    ("Less", CmpOp::Less),
    ("More", CmpOp::More),
    ("LessEq", CmpOp::LessEq),
    ("MoreEq", CmpOp::MoreEq),
];

/// Build the runtime nodes for the builtin globals: the curried integer
/// ops plus `True` and `False`. Also caches the booleans on the graph so
/// the comparison ops can return them. `meta_for` supplies the metadata
/// attached to the boolean binders.
pub fn builtins<M: Clone>(
    g: &mut Graph<M>,
    meta_for: &mut dyn FnMut(&str) -> M,
) -> Vec<(String, NodeId)> {
    let truth = church_bool(g, true, meta_for);
    let falsity = church_bool(g, false, meta_for);
    g.truth = truth;
    g.falsity = falsity;

    let mut out = vec![
        ("True".to_string(), truth),
        ("False".to_string(), falsity),
    ];
    for (name, op) in BINOPS {
        let node = g.add(Node::BinOp { op, first: None });
        out.push((name.to_string(), node));
    }
    for (name, op) in CMPOPS {
        let node = g.add(Node::CmpOp { op, first: None });
        out.push((name.to_string(), node));
    }
    out
}

/// λt λf t when `which`, λt λf f otherwise.
fn church_bool<M: Clone>(
    g: &mut Graph<M>,
    which: bool,
    meta_for: &mut dyn FnMut(&str) -> M,
) -> NodeId {
    let meta_t = meta_for("t");
    let meta_f = meta_for("f");
    let picked = if which { meta_t.clone() } else { meta_f.clone() };
    let var = g.add_free(Free::Var { meta: picked });
    let inner = g.add_free(Free::Abst { used: !which, body: var, meta: meta_f });
    let outer = g.add_free(Free::Abst { used: which, body: inner, meta: meta_t });
    fill(g, outer, EnvId::NIL)
}
