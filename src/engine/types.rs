use crate::arena::NodeId;

/// Per-run evaluation state: step accounting plus the application hook.
///
/// The hook fires once per redex right before its left side applies to its
/// right side; memoization guarantees at most one firing per application
/// node over its lifetime.
pub struct EvalContext<'a> {
    pub steps: usize,
    pub step_limit: usize,
    pub step_limit_hit: bool,
    pub on_application: Option<&'a mut dyn FnMut(NodeId, NodeId)>,
}

impl Default for EvalContext<'_> {
    fn default() -> Self {
        Self {
            steps: 0,
            step_limit: usize::MAX,
            step_limit_hit: false,
            on_application: None,
        }
    }
}

impl EvalContext<'_> {
    pub fn with_step_limit(step_limit: usize) -> Self {
        Self {
            step_limit,
            ..Self::default()
        }
    }
}
