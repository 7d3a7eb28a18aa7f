use super::dense::Dense;
use super::graph::TimeGraph;
use super::layer::Layer;
use super::logic;
use super::restrict::Must;
use super::restrict::Within;
use crate::query::behavior::Behavior;
use crate::query::behavior::Kind;
use crate::query::variable::Variable;
use crate::rank::Comparator;
use crate::rank::Confidence;
use crate::search::config::Config;
use crate::search::config::Strategy;
use crate::track::Window;

impl Behavior {
    /// build this node's confidence layer over a window list. leaves
    /// evaluate windows into a dense layer, logical and restricting
    /// nodes wrap their children's layers, and a nested sequence
    /// contracts its own time graph back into a layer.
    pub fn layer(&self, vars: &[Variable], windows: &[Window], config: &Config) -> Box<dyn Layer> {
        match &self.kind {
            Kind::State { .. } | Kind::Directed { .. } | Kind::Mutual { .. } => {
                Box::new(Dense::from(
                    windows
                        .iter()
                        .map(|w| self.score(vars, w, config))
                        .collect::<Vec<_>>(),
                ))
            }
            Kind::All(children) => Box::new(logic::All {
                children: children
                    .iter()
                    .map(|c| c.layer(vars, windows, config))
                    .collect(),
                strategy: config.strategy,
                comparator: config.comparator(),
            }),
            Kind::Any(children) => Box::new(logic::Any {
                children: children
                    .iter()
                    .map(|c| c.layer(vars, windows, config))
                    .collect(),
                comparator: config.comparator(),
            }),
            Kind::Not(child) => Box::new(logic::Not {
                child: child.layer(vars, windows, config),
            }),
            Kind::Within(child, span) => Box::new(Within::new(
                child.layer(vars, windows, config),
                *span,
                &windows.iter().map(|w| w.duration).collect::<Vec<_>>(),
            )),
            Kind::Must(child, floor) => Box::new(Must {
                child: child.layer(vars, windows, config),
                floor: floor.unwrap_or_else(|| config.must_floor()),
            }),
            Kind::Then(_) => Box::new(self.graph(vars, windows, config).contracted()),
        }
    }

    /// build the layered time graph of a sequential node, one layer per
    /// stage. a non-sequential node becomes its own single stage.
    pub fn graph(&self, vars: &[Variable], windows: &[Window], config: &Config) -> TimeGraph {
        let stages = match &self.kind {
            Kind::Then(children) => children.as_slice(),
            _ => std::slice::from_ref(self),
        };
        let layers = stages
            .iter()
            .map(|stage| stage.layer(vars, windows, config))
            .collect();
        TimeGraph::new(layers, windows, config)
    }

    /// a leaf's confidence contribution for a single window
    fn score(&self, vars: &[Variable], window: &Window, config: &Config) -> Confidence {
        let seconds = crate::clock::seconds(window.duration);
        match &self.kind {
            Kind::State {
                who,
                speed,
                direction,
            } => {
                let blocks = vars
                    .iter()
                    .zip(&window.motions)
                    .filter(|(var, _)| who.contains(var))
                    .map(|(_, motion)| *motion)
                    .collect::<Vec<_>>();
                let partials = [
                    partial(
                        *speed,
                        &blocks.iter().map(|b| b.map(|b| b.speed)).collect::<Vec<_>>(),
                        config.strategy,
                    ),
                    partial(
                        *direction,
                        &blocks
                            .iter()
                            .map(|b| b.map(|b| b.direction))
                            .collect::<Vec<_>>(),
                        config.strategy,
                    ),
                ];
                combine(
                    &expected(&partials, &[speed.is_some(), direction.is_some()]),
                    config.strategy,
                    seconds,
                )
            }
            Kind::Directed {
                actor,
                target,
                intended,
                relative,
            } => {
                let actor = vars.iter().position(|v| v == actor).expect("actor bound");
                let target = vars.iter().position(|v| v == target).expect("target bound");
                let Some(contact) = window.contacts[actor][target] else {
                    return Confidence::IMPARTIAL;
                };
                let partials = [
                    partial(*intended, &[Some(contact.intended)], config.strategy),
                    partial(*relative, &[Some(contact.relative)], config.strategy),
                ];
                combine(
                    &expected(&partials, &[intended.is_some(), relative.is_some()]),
                    config.strategy,
                    seconds,
                )
            }
            Kind::Mutual {
                who,
                actual,
                mutual,
                distance,
            } => {
                let indices = vars
                    .iter()
                    .enumerate()
                    .filter(|(_, var)| who.contains(var))
                    .map(|(index, _)| index)
                    .collect::<Vec<_>>();
                let mut blocks = Vec::new();
                for i in &indices {
                    for j in &indices {
                        if i == j {
                            continue;
                        }
                        // symmetric reading falls back to the reverse entry
                        blocks.push(window.contacts[*i][*j].or(window.contacts[*j][*i]));
                    }
                }
                let partials = [
                    partial(
                        *actual,
                        &blocks.iter().map(|b| b.map(|b| b.actual)).collect::<Vec<_>>(),
                        config.strategy,
                    ),
                    partial(
                        *mutual,
                        &blocks.iter().map(|b| b.map(|b| b.mutual)).collect::<Vec<_>>(),
                        config.strategy,
                    ),
                    partial(
                        *distance,
                        &blocks
                            .iter()
                            .map(|b| b.map(|b| b.distance))
                            .collect::<Vec<_>>(),
                        config.strategy,
                    ),
                ];
                combine(
                    &expected(
                        &partials,
                        &[actual.is_some(), mutual.is_some(), distance.is_some()],
                    ),
                    config.strategy,
                    seconds,
                )
            }
            _ => unreachable!("only leaves score windows"),
        }
    }
}

/// per-feature confidence over the one-second abstraction. an unset
/// expectation or an empty value set contributes nothing.
fn partial<F: PartialEq + Copy>(
    expectation: Option<F>,
    values: &[Option<F>],
    strategy: Strategy,
) -> Confidence {
    let Some(expectation) = expectation else {
        return Confidence::IMPARTIAL;
    };
    if values.is_empty() {
        return Confidence::IMPARTIAL;
    }
    match strategy {
        Strategy::Min => {
            let all = values.iter().all(|v| *v == Some(expectation));
            Confidence(all as u8 as f64, 1.0)
        }
        Strategy::Avg => {
            let hits = values.iter().filter(|v| **v == Some(expectation)).count();
            Confidence(hits as f64 / values.len() as f64, 1.0)
        }
    }
}

/// keep only the partials whose feature was expected at all
fn expected(partials: &[Confidence], expectations: &[bool]) -> Vec<Confidence> {
    partials
        .iter()
        .zip(expectations)
        .filter(|(_, expected)| **expected)
        .map(|(partial, _)| *partial)
        .collect()
}

/// fold per-feature partials into the window's confidence and scale by
/// its duration. MIN keeps the least conforming non-impartial partial,
/// AVG averages both components over the expected features.
fn combine(partials: &[Confidence], strategy: Strategy, seconds: f64) -> Confidence {
    if partials.is_empty() {
        return Confidence::IMPARTIAL;
    }
    match strategy {
        Strategy::Min => {
            let tight = Comparator::conformity();
            partials
                .iter()
                .filter(|c| **c != Confidence::IMPARTIAL)
                .copied()
                .reduce(|worst, c| match tight.order(&c, &worst) {
                    std::cmp::Ordering::Less => c,
                    _ => worst,
                })
                .unwrap_or(Confidence::IMPARTIAL)
                * seconds
        }
        Strategy::Avg => {
            let count = partials.len() as f64;
            let total: Confidence = partials.iter().copied().sum();
            Confidence(total.0 / count, total.1 / count) * seconds
        }
    }
}
