use crate::arena::{Free, FreeId, Graph, Node, NodeId};
use crate::engine::primitives::{binop_name, cmpop_name};
use num_bigint::BigInt;

/// Render a runtime expression in parenthesized λ-notation. `repr` turns
/// node metadata into a display name. Rendering never reduces; an
/// application that has memoized its result renders through the memo.
pub fn show_expr<M, F: Fn(&M) -> String>(g: &Graph<M>, repr: &F, id: NodeId) -> String {
    render(g, repr, Item::Node(id))
}

/// Render a free expression. Abstraction bodies stay in this form until
/// applied, so the runtime renderer defers here for closure bodies.
pub fn show_free<M, F: Fn(&M) -> String>(g: &Graph<M>, repr: &F, ir: FreeId) -> String {
    render(g, repr, Item::Free(ir))
}

enum Item {
    Node(NodeId),
    Free(FreeId),
    Text(&'static str),
}

fn render<M, F: Fn(&M) -> String>(g: &Graph<M>, repr: &F, start: Item) -> String {
    let mut out = String::new();
    let mut stack: Vec<Item> = vec![start];

    while let Some(item) = stack.pop() {
        match item {
            Item::Text(s) => out.push_str(s),
            Item::Node(id) => match g.get(id) {
                Node::Ref { meta, .. } => out.push_str(&repr(meta)),
                Node::Abst { body, meta, .. } => {
                    out.push_str("(λ");
                    out.push_str(&repr(meta));
                    out.push(' ');
                    stack.push(Item::Text(")"));
                    stack.push(Item::Free(*body));
                }
                Node::Appl { left, right, memo, .. } => {
                    if *left == NodeId::NULL {
                        stack.push(Item::Node(*memo));
                    } else {
                        stack.push(Item::Text(")"));
                        stack.push(Item::Node(*right));
                        stack.push(Item::Text(" "));
                        stack.push(Item::Node(*left));
                        stack.push(Item::Text("("));
                    }
                }
                Node::Int { value } => out.push_str(&value.to_str_radix(10)),
                Node::BinOp { op, first } => push_op(&mut out, binop_name(*op), first),
                Node::CmpOp { op, first } => push_op(&mut out, cmpop_name(*op), first),
            },
            Item::Free(ir) => match g.free(ir) {
                Free::Var { meta } | Free::Ref { meta, .. } => out.push_str(&repr(meta)),
                Free::Abst { body, meta, .. } => {
                    out.push_str("(λ");
                    out.push_str(&repr(meta));
                    out.push(' ');
                    stack.push(Item::Text(")"));
                    stack.push(Item::Free(*body));
                }
                Free::Appl { left, right, .. } => {
                    stack.push(Item::Text(")"));
                    stack.push(Item::Free(*right));
                    stack.push(Item::Text(" "));
                    stack.push(Item::Free(*left));
                    stack.push(Item::Text("("));
                }
                Free::Int { value } => out.push_str(&value.to_str_radix(10)),
                Free::BinOp { op } => out.push_str(binop_name(*op)),
                Free::CmpOp { op } => out.push_str(cmpop_name(*op)),
            },
        }
    }

    out
}

fn push_op(out: &mut String, name: &str, first: &Option<BigInt>) {
    match first {
        Some(value) => {
            out.push('(');
            out.push_str(name);
            out.push(' ');
            out.push_str(&value.to_str_radix(10));
            out.push(')');
        }
        None => out.push_str(name),
    }
}
