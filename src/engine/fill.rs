use crate::arena::{Dir, EnvId, Free, FreeId, Graph, Node, NodeId};

/// Instantiate a free expression against an environment, producing a
/// runtime expression. The environment length must equal the slot count
/// of `ir`; a mismatch means a compile invariant broke, and traps.
pub fn fill<M: Clone>(g: &mut Graph<M>, ir: FreeId, env: EnvId) -> NodeId {
    match g.free(ir).clone() {
        Free::Var { .. } => {
            let Some((value, tail)) = g.uncons(env) else {
                panic!("free var: no environment values");
            };
            if tail != EnvId::NIL {
                panic!("free var: environment has more than one value");
            }
            value
        }
        Free::Ref { cell, meta } => {
            require_empty(env, "free ref");
            g.add(Node::Ref { cell, meta })
        }
        Free::Abst { used, body, meta } => g.add(Node::Abst { env, used, body, meta }),
        Free::Appl { dirs, left, right, meta } => {
            let (lenv, renv) = distribute(g, &dirs, env);
            let left = fill(g, left, lenv);
            let right = fill(g, right, renv);
            g.add(Node::Appl { left, right, memo: NodeId::NULL, meta })
        }
        Free::Int { value } => {
            require_empty(env, "int");
            g.add(Node::Int { value })
        }
        Free::BinOp { op } => {
            require_empty(env, "int op");
            g.add(Node::BinOp { op, first: None })
        }
        Free::CmpOp { op } => {
            require_empty(env, "int cmp op");
            g.add(Node::CmpOp { op, first: None })
        }
    }
}

fn require_empty(env: EnvId, what: &str) {
    if env != EnvId::NIL {
        panic!("{what}: environment not empty");
    }
}

/// Split an environment between the two sides of an application.
///
/// Prepending reverses the slot order once here; the lowering pass built
/// each subterm's slot order reversed relative to the same walk, so the
/// halves come out in exactly the order the subterms expect.
pub fn distribute<M>(g: &mut Graph<M>, dirs: &[Dir], mut env: EnvId) -> (EnvId, EnvId) {
    let mut lenv = EnvId::NIL;
    let mut renv = EnvId::NIL;
    for dir in dirs {
        let Some((value, tail)) = g.uncons(env) else {
            panic!("distribute: environment too short");
        };
        if matches!(dir, Dir::Left | Dir::Both) {
            lenv = g.cons(value, lenv);
        }
        if matches!(dir, Dir::Right | Dir::Both) {
            renv = g.cons(value, renv);
        }
        env = tail;
    }
    if env != EnvId::NIL {
        panic!("distribute: environment too long");
    }
    (lenv, renv)
}
