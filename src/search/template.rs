use crate::query::Behavior;
use crate::query::Kind;
use crate::query::Variable;
use crate::Delta;
use std::collections::BTreeSet;

/// an optimized behavioral tree prepared for searching: the root is
/// always sequential, and the stage metadata that drives viability
/// checking and result shaping is precomputed.
#[derive(Debug, Clone)]
pub struct Template {
    root: Behavior,
    variables: Vec<Variable>,
    stages: Vec<(BTreeSet<Variable>, Delta)>,
}

impl From<Behavior> for Template {
    fn from(root: Behavior) -> Self {
        let root = match root.kind {
            Kind::Then(_) => root,
            _ => Behavior::then(vec![root]),
        };
        let root = root.optimized();
        let stages = root.sequence_info(Delta::milliseconds(crate::STAGE_FLOOR_MS));
        // variables in stable first-appearance order; their position is
        // the agent's position in every window
        let mut variables = Vec::new();
        for (vars, _) in &stages {
            for var in vars {
                if !variables.contains(var) {
                    variables.push(var.clone());
                }
            }
        }
        Self {
            root,
            variables,
            stages,
        }
    }
}

impl Template {
    pub fn root(&self) -> &Behavior {
        &self.root
    }
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }
    pub fn stages(&self) -> &[(BTreeSet<Variable>, Delta)] {
        &self.stages
    }

    /// display names of the sequential stages, for result headers
    pub fn stage_names(&self) -> Vec<String> {
        match &self.root.kind {
            Kind::Then(children) => children.iter().map(|c| c.to_string()).collect(),
            _ => vec![self.root.to_string()],
        }
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.root)
    }
}
