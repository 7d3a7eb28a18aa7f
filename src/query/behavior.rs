use super::variable::Variable;
use crate::clock::Span;
use crate::rank::Confidence;
use crate::track::Direction;
use crate::track::Distance;
use crate::track::DistanceChange;
use crate::track::MutualDirection;
use crate::track::Speed;
use crate::Delta;
use std::collections::BTreeSet;

/// a behavioral tree node. leaves test feature values against windows,
/// interior nodes compose their children logically, temporally or
/// sequentially. the optional name only labels output; it never takes
/// part in equality.
#[derive(Debug, Clone)]
pub struct Behavior {
    pub name: Option<String>,
    pub kind: Kind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    /// every listed agent satisfies the expected speed and/or direction
    State {
        who: Vec<Variable>,
        speed: Option<Speed>,
        direction: Option<Direction>,
    },
    /// asymmetric pair expectation of the actor against the target
    Directed {
        actor: Variable,
        target: Variable,
        intended: Option<DistanceChange>,
        relative: Option<Direction>,
    },
    /// symmetric pair expectation over every pair among the listed agents
    Mutual {
        who: Vec<Variable>,
        actual: Option<DistanceChange>,
        mutual: Option<MutualDirection>,
        distance: Option<Distance>,
    },
    All(Vec<Behavior>),
    Any(Vec<Behavior>),
    Not(Box<Behavior>),
    Within(Box<Behavior>, Span),
    /// confidence floor; none defers to the configured default
    Must(Box<Behavior>, Option<Confidence>),
    Then(Vec<Behavior>),
}

impl PartialEq for Behavior {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// constructors
impl Behavior {
    pub fn state(who: Vec<Variable>, speed: Option<Speed>, direction: Option<Direction>) -> Self {
        Self::from(Kind::State {
            who,
            speed,
            direction,
        })
    }
    pub fn directed(
        actor: Variable,
        target: Variable,
        intended: Option<DistanceChange>,
        relative: Option<Direction>,
    ) -> Self {
        Self::from(Kind::Directed {
            actor,
            target,
            intended,
            relative,
        })
    }
    pub fn mutual(
        who: Vec<Variable>,
        actual: Option<DistanceChange>,
        mutual: Option<MutualDirection>,
        distance: Option<Distance>,
    ) -> Self {
        Self::from(Kind::Mutual {
            who,
            actual,
            mutual,
            distance,
        })
    }
    pub fn all(children: Vec<Behavior>) -> Self {
        Self::from(Kind::All(children))
    }
    pub fn any(children: Vec<Behavior>) -> Self {
        Self::from(Kind::Any(children))
    }
    pub fn not(child: Behavior) -> Self {
        Self::from(Kind::Not(Box::new(child)))
    }
    pub fn within(child: Behavior, span: Span) -> Self {
        Self::from(Kind::Within(Box::new(child), span))
    }
    pub fn must(child: Behavior) -> Self {
        Self::from(Kind::Must(Box::new(child), None))
    }
    pub fn then(children: Vec<Behavior>) -> Self {
        Self::from(Kind::Then(children))
    }
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

impl From<Kind> for Behavior {
    fn from(kind: Kind) -> Self {
        Self { name: None, kind }
    }
}

/// derived metadata queries
impl Behavior {
    /// actor constraints: which variable sets are engaged, first to last.
    /// logical nodes merge to at most a first and last set; sequential
    /// nodes concatenate.
    pub fn variables(&self) -> Vec<BTreeSet<Variable>> {
        match &self.kind {
            Kind::State { who, .. } | Kind::Mutual { who, .. } => {
                vec![who.iter().cloned().collect()]
            }
            Kind::Directed { actor, target, .. } => {
                vec![[actor.clone(), target.clone()].into_iter().collect()]
            }
            Kind::All(children) | Kind::Any(children) => Self::unioned_variables(children),
            Kind::Not(child) => Self::unioned_variables(std::slice::from_ref(child)),
            Kind::Within(child, _) | Kind::Must(child, _) => child.variables(),
            Kind::Then(children) => children.iter().flat_map(|c| c.variables()).collect(),
        }
    }

    fn unioned_variables(children: &[Behavior]) -> Vec<BTreeSet<Variable>> {
        fn union(a: &BTreeSet<Variable>, b: &BTreeSet<Variable>) -> BTreeSet<Variable> {
            a.union(b).cloned().collect()
        }
        fn merge(
            left: Vec<BTreeSet<Variable>>,
            right: Vec<BTreeSet<Variable>>,
        ) -> Vec<BTreeSet<Variable>> {
            if left.len() == 1 && right.len() == 1 {
                vec![union(&left[0], &right[0])]
            } else if left.len() == 1 || right.len() == 1 {
                left.iter()
                    .flat_map(|l| right.iter().map(move |r| union(l, r)))
                    .collect()
            } else {
                vec![
                    union(&left[0], &right[0]),
                    union(left.last().expect("non-empty"), right.last().expect("non-empty")),
                ]
            }
        }
        children
            .iter()
            .map(|c| c.variables())
            .fold(vec![BTreeSet::new()], merge)
    }

    /// actor-temporal constraints: in chronological sequence, which
    /// variables must be present for what minimal amount of time
    pub fn sequence_info(&self, default_min: Delta) -> Vec<(BTreeSet<Variable>, Delta)> {
        match &self.kind {
            Kind::State { .. }
            | Kind::Directed { .. }
            | Kind::Mutual { .. }
            | Kind::Within(..)
            | Kind::Must(..) => {
                let vars = self.variables().swap_remove(0);
                let floor = self.time_requirement(default_min, Delta::MAX).minimal;
                vec![(vars, floor)]
            }
            Kind::All(children) | Kind::Any(children) => {
                Self::merged_stages(children, default_min)
            }
            Kind::Not(child) => Self::merged_stages(std::slice::from_ref(child), default_min),
            Kind::Then(children) => children
                .iter()
                .flat_map(|c| c.sequence_info(default_min))
                .collect(),
        }
    }

    /// overlay concurrent stage sequences. single-stage sides union into
    /// one stage with the larger floor; once either side is sequential,
    /// only the first and last stages stay variable-aware and the middle
    /// collapses to an anonymous remainder.
    fn merged_stages(
        children: &[Behavior],
        default_min: Delta,
    ) -> Vec<(BTreeSet<Variable>, Delta)> {
        let mut stages: Vec<(BTreeSet<Variable>, Delta)> =
            vec![(BTreeSet::new(), default_min)];
        for child in children {
            let merging = child.sequence_info(default_min);
            if stages.len() == 1 && merging.len() == 1 {
                let (vars, floor) = stages.swap_remove(0);
                let (child_vars, child_floor) = merging.into_iter().next().expect("one stage");
                stages = vec![(
                    vars.union(&child_vars).cloned().collect(),
                    floor.max(child_floor),
                )];
            } else if stages.len() == 1 {
                let (vars, _) = stages.swap_remove(0);
                stages = merging
                    .into_iter()
                    .map(|(child_vars, child_floor)| {
                        (vars.union(&child_vars).cloned().collect(), child_floor)
                    })
                    .collect();
            } else {
                let total = |s: &[(BTreeSet<Variable>, Delta)]| {
                    s.iter().fold(Delta::zero(), |acc, (_, t)| acc + *t)
                };
                let (first_vars, first_floor) = stages.first().expect("non-empty");
                let (last_vars, last_floor) = stages.last().expect("non-empty");
                let (child_first_vars, child_first_floor) = merging.first().expect("non-empty");
                let (child_last_vars, child_last_floor) = merging.last().expect("non-empty");
                let first = *first_floor.min(child_first_floor);
                let last = *last_floor.min(child_last_floor);
                let middle = total(&stages).max(total(&merging)) - first - last;
                stages = vec![
                    (first_vars.union(child_first_vars).cloned().collect(), first),
                    (BTreeSet::new(), middle),
                    (last_vars.union(child_last_vars).cloned().collect(), last),
                ];
            }
        }
        stages
    }

    /// admissible total durations for this node
    pub fn time_requirement(&self, default_min: Delta, default_max: Delta) -> Span {
        match &self.kind {
            Kind::State { .. } | Kind::Directed { .. } | Kind::Mutual { .. } => {
                Span::new(default_min, default_max)
            }
            Kind::All(children) | Kind::Any(children) => children
                .iter()
                .map(|c| c.time_requirement(default_min, default_max))
                .reduce(|acc, s| acc.intersect(&s))
                .expect("logical node has children"),
            Kind::Not(child) => child.time_requirement(default_min, default_max),
            Kind::Within(child, span) => {
                let inherited = child.time_requirement(default_min, default_max);
                if inherited == Span::new(default_min, default_max) {
                    *span
                } else {
                    span.intersect(&inherited)
                }
            }
            Kind::Must(child, _) => child.time_requirement(default_min, default_max),
            Kind::Then(children) => children
                .iter()
                .map(|c| c.time_requirement(default_min, default_max))
                .fold(Span::new(Delta::zero(), Delta::zero()), |acc, s| acc + s),
        }
    }

    /// does the order of agent variables matter? combinations may replace
    /// permutations in the search only when it does not.
    pub fn is_symmetrical(&self, all: &BTreeSet<Variable>) -> bool {
        match &self.kind {
            Kind::State { who, .. } | Kind::Mutual { who, .. } => {
                &who.iter().cloned().collect::<BTreeSet<_>>() == all
            }
            Kind::Directed { .. } => false,
            Kind::All(children) | Kind::Any(children) | Kind::Then(children) => {
                children.iter().all(|c| c.is_symmetrical(all))
            }
            Kind::Not(child) | Kind::Within(child, _) | Kind::Must(child, _) => {
                child.is_symmetrical(all)
            }
        }
    }

    /// does this node hold no more information than the other?
    pub fn is_subset(&self, other: &Behavior) -> bool {
        fn covered<T: PartialEq>(own: &Option<T>, others: &Option<T>) -> bool {
            own.is_none() || own == others
        }
        match (&self.kind, &other.kind) {
            (
                Kind::State {
                    who,
                    speed,
                    direction,
                },
                Kind::State {
                    who: other_who,
                    speed: other_speed,
                    direction: other_direction,
                },
            ) => {
                who.iter().all(|v| other_who.contains(v))
                    && covered(speed, other_speed)
                    && covered(direction, other_direction)
            }
            (
                Kind::Directed {
                    actor,
                    target,
                    intended,
                    relative,
                },
                Kind::Directed {
                    actor: other_actor,
                    target: other_target,
                    intended: other_intended,
                    relative: other_relative,
                },
            ) => {
                [actor, target]
                    .iter()
                    .all(|v| *v == other_actor || *v == other_target)
                    && covered(intended, other_intended)
                    && covered(relative, other_relative)
            }
            (
                Kind::Mutual {
                    who,
                    actual,
                    mutual,
                    distance,
                },
                Kind::Mutual {
                    who: other_who,
                    actual: other_actual,
                    mutual: other_mutual,
                    distance: other_distance,
                },
            ) => {
                who.iter().all(|v| other_who.contains(v))
                    && covered(actual, other_actual)
                    && covered(mutual, other_mutual)
                    && covered(distance, other_distance)
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for Behavior {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(name) = &self.name {
            return write!(f, "{}", name);
        }
        fn optional(part: &Option<impl std::fmt::Display>) -> String {
            part.as_ref().map(|p| format!(" {}", p)).unwrap_or_default()
        }
        fn listed(who: &[Variable]) -> String {
            who.iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        }
        fn joined(children: &[Behavior], glue: &str) -> String {
            children
                .iter()
                .map(|c| format!("({})", c))
                .collect::<Vec<_>>()
                .join(glue)
        }
        match &self.kind {
            Kind::State {
                who,
                speed,
                direction,
            } => write!(f, "({}){}{}", listed(who), optional(speed), optional(direction)),
            Kind::Directed {
                actor,
                target,
                intended,
                relative,
            } => write!(
                f,
                "{}{}{} w.r.t. {}",
                actor,
                optional(intended),
                optional(relative),
                target
            ),
            Kind::Mutual {
                who,
                actual,
                mutual,
                distance,
            } => write!(
                f,
                "({}){}{}{}",
                listed(who),
                optional(actual),
                optional(mutual),
                optional(distance)
            ),
            Kind::All(children) => write!(f, "{}", joined(children, " AND ")),
            Kind::Any(children) => write!(f, "{}", joined(children, " OR ")),
            Kind::Not(child) => write!(f, "NOT ({})", child),
            Kind::Within(child, span) => write!(f, "{} FOR {}", child, span),
            Kind::Must(child, floor) => match floor {
                Some(floor) => write!(f, "{} WITH c >= {:.2}", child, floor.conformity()),
                None => write!(f, "{} WITH default c", child),
            },
            Kind::Then(children) => write!(f, "{}", joined(children, " THEN ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: i64) -> Delta {
        Delta::seconds(s)
    }
    fn vars(names: &[&str]) -> BTreeSet<Variable> {
        names.iter().map(|n| Variable::from(*n)).collect()
    }
    fn walk(name: &str) -> Behavior {
        Behavior::state(vec![Variable::from(name)], Some(Speed::Walk), None)
    }
    fn stand(name: &str) -> Behavior {
        Behavior::state(vec![Variable::from(name)], Some(Speed::Stand), None)
    }

    #[test]
    fn equality_ignores_names() {
        assert_eq!(walk("Anna"), walk("Anna").named("strolling"));
        assert_ne!(walk("Anna"), walk("Bob"));
        assert_ne!(walk("Anna"), stand("Anna"));
    }

    #[test]
    fn leaf_metadata() {
        let node = walk("Anna");
        assert_eq!(node.variables(), vec![vars(&["Anna"])]);
        assert_eq!(
            node.time_requirement(secs(3), Delta::MAX),
            Span::at_least(secs(3))
        );
        assert_eq!(node.sequence_info(secs(3)), vec![(vars(&["Anna"]), secs(3))]);
    }

    #[test]
    fn conjunction_merges_single_stages() {
        let node = Behavior::all(vec![
            Behavior::within(walk("Anna"), Span::at_least(secs(5))),
            Behavior::within(stand("Bob"), Span::at_least(secs(10))),
        ]);
        assert_eq!(node.variables(), vec![vars(&["Anna", "Bob"])]);
        assert_eq!(
            node.sequence_info(secs(3)),
            vec![(vars(&["Anna", "Bob"]), secs(10))]
        );
        assert_eq!(
            node.time_requirement(secs(3), Delta::MAX),
            Span::at_least(secs(10))
        );
    }

    #[test]
    fn conjunction_with_sequential_child_collapses_middle() {
        let sequential = Behavior::then(vec![
            Behavior::within(walk("Anna"), Span::at_least(secs(5))),
            Behavior::within(stand("Anna"), Span::at_least(secs(20))),
            Behavior::within(walk("Anna"), Span::at_least(secs(5))),
        ]);
        let node = Behavior::all(vec![sequential, walk("Bob")]);
        let stages = node.sequence_info(secs(3));
        // the single-stage side wins the first/last floors, the rest of
        // the longer side pools into an anonymous middle stage
        assert_eq!(stages.len(), 3);
        assert_eq!(stages[0], (vars(&["Anna", "Bob"]), secs(3)));
        assert_eq!(stages[1], (vars(&[]), secs(24)));
        assert_eq!(stages[2], (vars(&["Anna", "Bob"]), secs(3)));
    }

    #[test]
    fn sequence_concatenates_stages() {
        let node = Behavior::then(vec![
            walk("Anna"),
            Behavior::within(stand("Anna"), Span::at_least(secs(30))),
        ]);
        assert_eq!(
            node.sequence_info(secs(3)),
            vec![(vars(&["Anna"]), secs(3)), (vars(&["Anna"]), secs(30))]
        );
        assert_eq!(
            node.time_requirement(secs(3), Delta::MAX),
            Span::at_least(secs(33))
        );
    }

    #[test]
    fn sequence_requirement_saturates() {
        let node = Behavior::then(vec![
            Behavior::within(walk("Anna"), Span::new(secs(5), secs(10))),
            Behavior::within(stand("Anna"), Span::new(secs(5), secs(10))),
        ]);
        assert_eq!(
            node.time_requirement(secs(3), Delta::MAX),
            Span::new(secs(10), secs(20))
        );
        let open = Behavior::then(vec![
            Behavior::within(walk("Anna"), Span::new(secs(5), secs(10))),
            stand("Anna"),
        ]);
        let requirement = open.time_requirement(secs(3), Delta::MAX);
        assert_eq!(requirement.minimal, secs(8));
        assert_eq!(requirement.maximal, Delta::MAX);
    }

    #[test]
    fn restriction_keeps_or_intersects_inherited() {
        let plain = Behavior::within(walk("Anna"), Span::at_least(secs(10)));
        assert_eq!(
            plain.time_requirement(secs(3), Delta::MAX),
            Span::at_least(secs(10))
        );
        let nested = Behavior::within(
            Behavior::within(walk("Anna"), Span::at_most(secs(20))),
            Span::at_least(secs(10)),
        );
        assert_eq!(
            nested.time_requirement(secs(3), Delta::MAX),
            Span::new(secs(10), secs(20))
        );
    }

    #[test]
    fn symmetry_requires_full_coverage() {
        let all = vars(&["Anna", "Bob"]);
        let both = Behavior::state(
            vec![Variable::from("Anna"), Variable::from("Bob")],
            Some(Speed::Run),
            None,
        );
        assert!(both.is_symmetrical(&all));
        assert!(!walk("Anna").is_symmetrical(&all));
        let directed = Behavior::directed(
            Variable::from("Anna"),
            Variable::from("Bob"),
            Some(DistanceChange::Decreasing),
            None,
        );
        assert!(!directed.is_symmetrical(&all));
        let mutual = Behavior::mutual(
            vec![Variable::from("Anna"), Variable::from("Bob")],
            Some(DistanceChange::Decreasing),
            None,
            None,
        );
        assert!(Behavior::all(vec![both, mutual]).is_symmetrical(&all));
    }

    #[test]
    fn subset_needs_matching_variant_and_features() {
        let loose = walk("Anna");
        let tight = Behavior::state(
            vec![Variable::from("Anna"), Variable::from("Bob")],
            Some(Speed::Walk),
            Some(Direction::Left),
        );
        assert!(loose.is_subset(&tight));
        assert!(!tight.is_subset(&loose));
        assert!(!loose.is_subset(&stand("Anna")));
        assert!(!loose.is_subset(&Behavior::mutual(
            vec![Variable::from("Anna")],
            None,
            None,
            None
        )));
    }
}
