//! Arena storage for the evaluation graph.
//!
//! Four id spaces share one [`Graph`]: runtime expression nodes, lowered
//! free expressions, environment cons-cells, and the stable cells holding
//! compiled globals. Ids are plain `u32` newtypes; aliasing an id is how
//! the reducer shares work between every path that reaches a node.

use num_bigint::BigInt;
use smallvec::SmallVec;

/// Lightweight id of a runtime expression node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NULL: NodeId = NodeId(u32::MAX);
}

/// Id of a lowered free expression.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FreeId(pub u32);

/// Id of an environment cons-cell. `EnvId::NIL` is the empty environment.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EnvId(pub u32);

impl EnvId {
    pub const NIL: EnvId = EnvId(u32::MAX);
}

/// Id of the stable cell backing one global definition.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CellId(pub u32);

/// Routes one environment slot to the subterms of an application.
/// A slot routed to neither side is not representable.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dir {
    Left,
    Right,
    Both,
}

pub type Dirs = SmallVec<[Dir; 4]>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CmpOp {
    Eq,
    Neq,
    Less,
    More,
    LessEq,
    MoreEq,
}

/// A lowered, position-indexed term. Variables are gone; each variant
/// consumes a fixed number of environment slots when filled.
#[derive(Clone, Debug)]
pub enum Free<M> {
    /// Consumes exactly one slot.
    Var { meta: M },
    /// Late-bound reference to a global's cell; consumes no slots.
    Ref { cell: CellId, meta: M },
    /// `used == false` means the bound variable does not occur in the
    /// body and the argument is discarded on application.
    Abst { used: bool, body: FreeId, meta: M },
    /// `dirs` has one entry per consumed slot, in slot order.
    Appl {
        dirs: Dirs,
        left: FreeId,
        right: FreeId,
        meta: M,
    },
    Int { value: BigInt },
    BinOp { op: BinOp },
    CmpOp { op: CmpOp },
}

/// A runtime expression node.
#[derive(Clone, Debug)]
pub enum Node<M> {
    /// Unresolved reference to a global; reduces to the cell contents.
    Ref { cell: CellId, meta: M },
    /// A closure: captured environment plus the abstraction body IR.
    Abst {
        env: EnvId,
        used: bool,
        body: FreeId,
        meta: M,
    },
    /// Pending application. `memo` is NULL until the node has reduced;
    /// once set, the children are released and every alias of this node
    /// reads further progress through the memo.
    Appl {
        left: NodeId,
        right: NodeId,
        memo: NodeId,
        meta: M,
    },
    Int { value: BigInt },
    /// Curried integer op; `first` holds the operand once applied.
    BinOp { op: BinOp, first: Option<BigInt> },
    CmpOp { op: CmpOp, first: Option<BigInt> },
}

pub struct Graph<M> {
    pub nodes: Vec<Node<M>>,
    frees: Vec<Free<M>>,
    envs: Vec<(NodeId, EnvId)>,
    cells: Vec<NodeId>,
    /// Canonical Church booleans, set when the builtins are installed.
    pub truth: NodeId,
    pub falsity: NodeId,
}

impl<M> Graph<M> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(1024),
            frees: Vec::new(),
            envs: Vec::new(),
            cells: Vec::new(),
            truth: NodeId::NULL,
            falsity: NodeId::NULL,
        }
    }

    pub fn add(&mut self, node: Node<M>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> &Node<M> {
        &self.nodes[id.0 as usize]
    }

    pub fn add_free(&mut self, free: Free<M>) -> FreeId {
        let id = FreeId(self.frees.len() as u32);
        self.frees.push(free);
        id
    }

    pub fn free(&self, id: FreeId) -> &Free<M> {
        &self.frees[id.0 as usize]
    }

    /// Number of environment slots `id` consumes when filled. The first
    /// slot of an abstraction body's environment is the bound variable.
    pub fn slots(&self, id: FreeId) -> usize {
        match self.free(id) {
            Free::Var { .. } => 1,
            Free::Ref { .. } | Free::Int { .. } | Free::BinOp { .. } | Free::CmpOp { .. } => 0,
            Free::Abst { used, body, .. } => self.slots(*body) - usize::from(*used),
            Free::Appl { dirs, .. } => dirs.len(),
        }
    }

    /// Prepend a value to an environment. Environments are persistent;
    /// the tail is shared, never copied.
    pub fn cons(&mut self, value: NodeId, tail: EnvId) -> EnvId {
        let id = EnvId(self.envs.len() as u32);
        self.envs.push((value, tail));
        id
    }

    /// Head value and tail of a non-empty environment.
    pub fn uncons(&self, env: EnvId) -> Option<(NodeId, EnvId)> {
        if env == EnvId::NIL {
            None
        } else {
            Some(self.envs[env.0 as usize])
        }
    }

    pub fn env_len(&self, mut env: EnvId) -> usize {
        let mut len = 0;
        while let Some((_, tail)) = self.uncons(env) {
            len += 1;
            env = tail;
        }
        len
    }

    pub fn new_cell(&mut self) -> CellId {
        let id = CellId(self.cells.len() as u32);
        self.cells.push(NodeId::NULL);
        id
    }

    pub fn set_cell(&mut self, cell: CellId, value: NodeId) {
        self.cells[cell.0 as usize] = value;
    }

    /// Contents of a global cell; NULL until `set_cell` has run.
    pub fn cell(&self, cell: CellId) -> NodeId {
        self.cells[cell.0 as usize]
    }

    /// Store a reduction result on an application node. The children are
    /// released; every alias of `id` now reduces through the memo.
    pub fn memoize(&mut self, id: NodeId, result: NodeId) {
        match &mut self.nodes[id.0 as usize] {
            Node::Appl { left, right, memo, .. } => {
                *left = NodeId::NULL;
                *right = NodeId::NULL;
                *memo = result;
            }
            _ => panic!("memoize: not an application"),
        }
    }

    /// Advance an already-set memo to a further-reduced form.
    pub fn advance_memo(&mut self, id: NodeId, next: NodeId) {
        match &mut self.nodes[id.0 as usize] {
            Node::Appl { memo, .. } if *memo != NodeId::NULL => *memo = next,
            _ => panic!("advance memo: not a memoized application"),
        }
    }
}

impl<M> Default for Graph<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cons_is_persistent() {
        let mut g: Graph<()> = Graph::new();
        let a = g.add(Node::Int { value: BigInt::from(1) });
        let b = g.add(Node::Int { value: BigInt::from(2) });
        let tail = g.cons(a, EnvId::NIL);
        let e1 = g.cons(b, tail);
        let e2 = g.cons(b, tail);
        assert_eq!(g.env_len(e1), 2);
        assert_eq!(g.env_len(e2), 2);
        assert_eq!(g.uncons(e1).unwrap().1, g.uncons(e2).unwrap().1);
        assert_eq!(g.uncons(tail), Some((a, EnvId::NIL)));
    }

    #[test]
    fn memoize_releases_children() {
        let mut g: Graph<()> = Graph::new();
        let l = g.add(Node::Int { value: BigInt::from(1) });
        let r = g.add(Node::Int { value: BigInt::from(2) });
        let app = g.add(Node::Appl { left: l, right: r, memo: NodeId::NULL, meta: () });
        g.memoize(app, r);
        match g.get(app) {
            Node::Appl { left, right, memo, .. } => {
                assert_eq!(*left, NodeId::NULL);
                assert_eq!(*right, NodeId::NULL);
                assert_eq!(*memo, r);
            }
            _ => panic!("expected an application"),
        }
    }

    #[test]
    fn slot_counts() {
        let mut g: Graph<()> = Graph::new();
        let var = g.add_free(Free::Var { meta: () });
        assert_eq!(g.slots(var), 1);
        let used = g.add_free(Free::Abst { used: true, body: var, meta: () });
        assert_eq!(g.slots(used), 0);
        let unused = g.add_free(Free::Abst { used: false, body: var, meta: () });
        assert_eq!(g.slots(unused), 1);
        let shared = g.add_free(Free::Appl {
            dirs: smallvec::smallvec![Dir::Both],
            left: var,
            right: var,
            meta: (),
        });
        assert_eq!(g.slots(shared), 1);
    }
}
