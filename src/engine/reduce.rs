use crate::arena::{Graph, Node, NodeId};
use crate::engine::fill::fill;
use crate::engine::primitives::{apply_binop, apply_cmpop};
use crate::engine::types::EvalContext;
use tracing::trace;

/// True when no redex remains at the top of `id`. Abstractions, integers
/// and ops are normal; references and applications are not.
pub fn is_normal<M>(g: &Graph<M>, id: NodeId) -> bool {
    match g.get(id) {
        Node::Ref { .. } | Node::Appl { .. } => false,
        Node::Abst { .. } | Node::Int { .. } | Node::BinOp { .. } | Node::CmpOp { .. } => true,
    }
}

/// Advance `id` one step toward normal form and return the next
/// expression. Normal order: the leftmost, outermost redex fires first;
/// only primitive ops force their operand.
pub fn reduce_step<M: Clone>(g: &mut Graph<M>, id: NodeId, ctx: &mut EvalContext) -> NodeId {
    match g.get(id).clone() {
        Node::Ref { cell, .. } => {
            let value = g.cell(cell);
            if value == NodeId::NULL {
                panic!("reduce ref: global cell not filled");
            }
            value
        }
        Node::Abst { .. } | Node::Int { .. } | Node::BinOp { .. } | Node::CmpOp { .. } => id,
        Node::Appl { left, right, memo, meta } => {
            if memo != NodeId::NULL {
                // This redex already fired; push the shared result one
                // step further so every alias sees the progress.
                let next = reduce_step(g, memo, ctx);
                g.advance_memo(id, next);
                return next;
            }
            if !is_normal(g, left) {
                let left = reduce_step(g, left, ctx);
                return g.add(Node::Appl { left, right, memo: NodeId::NULL, meta });
            }
            if matches!(g.get(left), Node::Int { .. }) {
                panic!("reduce appl: left side not applicable");
            }
            if let Some(hook) = ctx.on_application.as_mut() {
                hook(left, right);
            }
            let result = match g.get(left).clone() {
                Node::Abst { env, used, body, .. } => {
                    let env = if used { g.cons(right, env) } else { env };
                    fill(g, body, env)
                }
                Node::BinOp { op, first } => {
                    let operand = reduce(g, right, ctx);
                    if !is_normal(g, operand) {
                        // Step budget ran out under the operand.
                        return id;
                    }
                    apply_binop(g, op, first, operand)
                }
                Node::CmpOp { op, first } => {
                    let operand = reduce(g, right, ctx);
                    if !is_normal(g, operand) {
                        return id;
                    }
                    apply_cmpop(g, op, first, operand)
                }
                Node::Ref { .. } | Node::Appl { .. } | Node::Int { .. } => {
                    unreachable!("left side is normal and applicable")
                }
            };
            g.memoize(id, result);
            result
        }
    }
}

/// Reduce until normal form or until the context's step budget runs out.
pub fn reduce<M: Clone>(g: &mut Graph<M>, id: NodeId, ctx: &mut EvalContext) -> NodeId {
    let mut curr = id;
    while !is_normal(g, curr) {
        if ctx.steps >= ctx.step_limit {
            ctx.step_limit_hit = true;
            trace!(steps = ctx.steps, "step limit hit");
            return curr;
        }
        curr = reduce_step(g, curr, ctx);
        ctx.steps += 1;
    }
    curr
}
