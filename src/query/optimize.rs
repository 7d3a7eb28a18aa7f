use super::behavior::Behavior;
use super::behavior::Kind;
use crate::clock::Span;

impl Behavior {
    /// rewrite the tree into a cheaper equivalent. runs single bottom-up
    /// passes until a pass leaves the tree unchanged, bounded so a
    /// pathological rewrite cycle cannot oscillate forever.
    pub fn optimized(self) -> Behavior {
        let mut node = self;
        for _ in 0..crate::OPTIMIZE_PASSES {
            let rewritten = node.clone().rewrite();
            if rewritten == node {
                return rewritten;
            }
            node = rewritten;
        }
        node
    }

    /// one bottom-up rewrite pass
    fn rewrite(self) -> Behavior {
        let Behavior { name, kind } = self;
        let kind = match kind {
            Kind::All(children) => {
                Kind::All(children.into_iter().map(|c| c.rewrite()).collect())
            }
            Kind::Any(children) => {
                Kind::Any(children.into_iter().map(|c| c.rewrite()).collect())
            }
            Kind::Then(children) => {
                Kind::Then(children.into_iter().map(|c| c.rewrite()).collect())
            }
            Kind::Not(child) => Kind::Not(Box::new(child.rewrite())),
            Kind::Within(child, span) => Kind::Within(Box::new(child.rewrite()), span),
            Kind::Must(child, floor) => Kind::Must(Box::new(child.rewrite()), floor),
            leaf => leaf,
        };
        Behavior { name, kind }.reduce()
    }

    /// local rewrite rules, children already reduced
    fn reduce(self) -> Behavior {
        let Behavior { mut name, kind } = self;
        let kind = match kind {
            Kind::Then(children) => {
                let mut flattened = Vec::with_capacity(children.len());
                for child in children {
                    match child.kind {
                        Kind::Then(grandchildren) => {
                            name = name.or(child.name);
                            flattened.extend(grandchildren);
                            log::debug!("rewrite: flattened nested sequence");
                        }
                        _ => flattened.push(child),
                    }
                }
                Kind::Then(flattened)
            }
            Kind::Within(child, span) => {
                let Behavior {
                    name: child_name,
                    kind: child_kind,
                } = *child;
                match child_kind {
                    Kind::Within(grandchild, inner) => {
                        name = name.or(child_name);
                        log::debug!("rewrite: intersected stacked time restrictions");
                        Kind::Within(grandchild, span.intersect(&inner))
                    }
                    kind => Kind::Within(
                        Box::new(Behavior {
                            name: child_name,
                            kind,
                        }),
                        span,
                    ),
                }
            }
            Kind::All(children) => {
                // lift time restrictions out of the conjunction, so one
                // restriction guards the conjunction of the bare children
                let mut lifted = Span::default();
                let mut flattened = Vec::with_capacity(children.len());
                for child in children {
                    match child.kind {
                        Kind::Within(grandchild, span) => {
                            lifted = lifted.intersect(&span);
                            flattened.push(*grandchild);
                            log::debug!("rewrite: lifted time restriction out of conjunction");
                        }
                        Kind::All(grandchildren) => {
                            flattened.extend(grandchildren);
                            log::debug!("rewrite: flattened nested conjunction");
                        }
                        _ => flattened.push(child),
                    }
                }
                let flattened = Self::deduplicated(flattened, true);
                match lifted == Span::default() {
                    true => Kind::All(flattened),
                    false => Kind::Within(Box::new(Behavior::all(flattened)), lifted),
                }
            }
            Kind::Any(children) => {
                let mut flattened = Vec::with_capacity(children.len());
                for child in children {
                    match child.kind {
                        Kind::Any(grandchildren) => {
                            name = name.or(child.name);
                            flattened.extend(grandchildren);
                            log::debug!("rewrite: flattened nested disjunction");
                        }
                        _ => flattened.push(child),
                    }
                }
                Kind::Any(Self::deduplicated(flattened, false))
            }
            Kind::Not(child) => {
                let Behavior {
                    name: child_name,
                    kind: child_kind,
                } = *child;
                match child_kind {
                    Kind::Not(grandchild) => {
                        log::debug!("rewrite: removed double negation");
                        let Behavior {
                            name: grandname,
                            kind,
                        } = *grandchild;
                        return Behavior {
                            name: grandname.or(name),
                            kind,
                        };
                    }
                    kind => Kind::Not(Box::new(Behavior {
                        name: child_name,
                        kind,
                    })),
                }
            }
            kind => kind,
        };
        Behavior { name, kind }
    }

    /// drop structurally equal duplicates, then apply subsumption: a
    /// conjunction keeps the more informative of a subset pair, a
    /// disjunction keeps the looser alternative
    fn deduplicated(children: Vec<Behavior>, conjunctive: bool) -> Vec<Behavior> {
        let mut kept: Vec<Behavior> = Vec::with_capacity(children.len());
        for child in children {
            if kept.contains(&child) {
                log::debug!("rewrite: dropped duplicate child");
            } else {
                kept.push(child);
            }
        }
        let mut dropped = vec![false; kept.len()];
        for i in 0..kept.len() {
            for j in 0..kept.len() {
                if i == j {
                    continue;
                }
                if kept[i].is_subset(&kept[j]) {
                    let victim = if conjunctive { i } else { j };
                    if !dropped[victim] {
                        log::debug!("rewrite: dropped subsumed child");
                        dropped[victim] = true;
                    }
                }
            }
        }
        kept.into_iter()
            .zip(dropped)
            .filter(|(_, dropped)| !dropped)
            .map(|(child, _)| child)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::variable::Variable;
    use crate::track::Direction;
    use crate::track::Speed;
    use crate::Delta;

    fn secs(s: i64) -> Delta {
        Delta::seconds(s)
    }
    fn walk(name: &str) -> Behavior {
        Behavior::state(vec![Variable::from(name)], Some(Speed::Walk), None)
    }
    fn stand(name: &str) -> Behavior {
        Behavior::state(vec![Variable::from(name)], Some(Speed::Stand), None)
    }
    fn run(name: &str) -> Behavior {
        Behavior::state(vec![Variable::from(name)], Some(Speed::Run), None)
    }

    #[test]
    fn nested_sequences_flatten() {
        let node = Behavior::then(vec![
            Behavior::then(vec![
                Behavior::all(vec![walk("Anna"), walk("Bob")]),
                run("Bob"),
            ]),
            run("Anna"),
        ]);
        let expected = Behavior::then(vec![
            Behavior::all(vec![walk("Anna"), walk("Bob")]),
            run("Bob"),
            run("Anna"),
        ]);
        assert_eq!(node.optimized(), expected);
    }

    #[test]
    fn stacked_time_restrictions_intersect() {
        let node = Behavior::then(vec![Behavior::within(
            Behavior::within(walk("Anna"), Span::at_most(secs(20))),
            Span::at_least(secs(10)),
        )]);
        let expected = Behavior::then(vec![Behavior::within(
            walk("Anna"),
            Span::new(secs(10), secs(20)),
        )]);
        assert_eq!(node.optimized(), expected);
    }

    #[test]
    fn conjunction_lifts_time_restrictions() {
        let node = Behavior::all(vec![
            Behavior::within(walk("Anna"), Span::at_least(secs(5))),
            Behavior::within(stand("Bob"), Span::at_least(secs(10))),
        ]);
        let expected = Behavior::within(
            Behavior::all(vec![walk("Anna"), stand("Bob")]),
            Span::at_least(secs(10)),
        );
        assert_eq!(node.optimized(), expected);
    }

    #[test]
    fn nested_conjunctions_flatten() {
        let node = Behavior::all(vec![
            Behavior::all(vec![walk("Anna"), walk("Bob")]),
            stand("Carol"),
        ]);
        let expected = Behavior::all(vec![walk("Anna"), walk("Bob"), stand("Carol")]);
        assert_eq!(node.optimized(), expected);
        let node = Behavior::any(vec![
            Behavior::any(vec![walk("Anna"), walk("Bob")]),
            stand("Carol"),
        ]);
        let expected = Behavior::any(vec![walk("Anna"), walk("Bob"), stand("Carol")]);
        assert_eq!(node.optimized(), expected);
    }

    #[test]
    fn duplicates_drop() {
        let node = Behavior::all(vec![walk("Anna"), stand("Bob"), walk("Anna")]);
        let expected = Behavior::all(vec![walk("Anna"), stand("Bob")]);
        assert_eq!(node.optimized(), expected);
    }

    #[test]
    fn conjunction_keeps_the_informative_child() {
        let loose = walk("Anna");
        let tight = Behavior::state(
            vec![Variable::from("Anna")],
            Some(Speed::Walk),
            Some(Direction::Left),
        );
        let node = Behavior::all(vec![loose.clone(), tight.clone(), stand("Bob")]);
        let expected = Behavior::all(vec![tight.clone(), stand("Bob")]);
        assert_eq!(node.optimized(), expected);
        // the disjunction keeps the looser alternative instead
        let node = Behavior::any(vec![loose.clone(), tight, stand("Bob")]);
        let expected = Behavior::any(vec![loose, stand("Bob")]);
        assert_eq!(node.optimized(), expected);
    }

    #[test]
    fn double_negation_unwraps() {
        let node = Behavior::not(Behavior::not(walk("Anna")));
        assert_eq!(node.optimized(), walk("Anna"));
        let node = Behavior::not(walk("Anna"));
        assert_eq!(node.clone().optimized(), node);
    }

    #[test]
    fn optimization_reaches_a_fixed_point() {
        let node = Behavior::then(vec![Behavior::then(vec![Behavior::then(vec![
            Behavior::all(vec![
                Behavior::all(vec![walk("Anna"), walk("Anna")]),
                Behavior::within(stand("Bob"), Span::at_least(secs(5))),
            ]),
        ])])]);
        let optimized = node.optimized();
        assert_eq!(optimized.clone().optimized(), optimized);
        let expected = Behavior::then(vec![Behavior::within(
            Behavior::all(vec![walk("Anna"), stand("Bob")]),
            Span::at_least(secs(5)),
        )]);
        assert_eq!(optimized, expected);
    }
}
