use super::config::Config;
use super::template::Template;
use crate::query::parse;
use crate::query::Behavior;
use crate::query::Kind;
use crate::query::Variable;
use crate::rank::Confidence;
use crate::track::cut_to_windows;
use crate::track::Agent;
use crate::track::Contact;
use crate::track::Direction;
use crate::track::Distance;
use crate::track::DistanceChange;
use crate::track::Motion;
use crate::track::MutualDirection;
use crate::track::Pair;
use crate::track::Speed;
use crate::AgentId;
use crate::Delta;
use crate::Stamp;
use chrono::TimeZone;
use chrono::Utc;
use std::collections::BTreeMap;

fn at(s: i64) -> Stamp {
    Utc.timestamp_opt(s, 0).unwrap()
}

fn motion(start: i64, end: i64, speed: Speed, direction: Direction) -> Motion {
    Motion::new(at(start), at(end), speed, direction)
}

fn contact(
    start: i64,
    end: i64,
    change: DistanceChange,
    relative: Direction,
) -> Contact {
    Contact {
        start: at(start),
        end: at(end),
        intended: change,
        actual: change,
        relative,
        mutual: MutualDirection::Independent,
        distance: Distance::Near,
    }
}

fn agents(list: Vec<Agent>) -> BTreeMap<AgentId, Agent> {
    list.into_iter().map(|a| (a.id, a)).collect()
}

fn pairs(list: Vec<Pair>) -> BTreeMap<(AgentId, AgentId), Pair> {
    list.into_iter().map(|p| ((p.actor, p.target), p)).collect()
}

/// anna walks, stands, then walks off
fn wandering_anna() -> Agent {
    Agent::from((
        1,
        vec![
            motion(0, 30, Speed::Walk, Direction::Straight),
            motion(30, 60, Speed::Stand, Direction::NotMoving),
            motion(60, 90, Speed::Walk, Direction::Left),
        ],
    ))
}

#[test]
fn timed_stand_finds_the_standing_interval() {
    let template = Template::from(parse("Anna stands for at least 20 seconds").unwrap());
    let found = template.search(
        &agents(vec![wandering_anna()]),
        &pairs(vec![]),
        &Config::default(),
        10,
    );
    assert_eq!(found.len(), 1);
    let best = &found[0];
    assert_eq!(best.agents, vec![1]);
    assert_eq!(best.confidence, Confidence(30.0, 30.0));
    assert_eq!(best.times, vec![at(30), at(60)]);
}

#[test]
fn conjunction_lifts_into_one_restriction() {
    let template = Template::from(
        parse("Anna walks for at least 5 seconds and Bob stands for at least 10 seconds").unwrap(),
    );
    // the optimizer rewrote the two bounds into one lifted restriction
    match &template.root().kind {
        Kind::Then(children) => {
            assert!(matches!(children[0].kind, Kind::Within(_, _)));
        }
        _ => panic!("expected a sequential root"),
    }
    let anna = Agent::from((1, vec![motion(0, 10, Speed::Walk, Direction::Straight)]));
    let bob = Agent::from((2, vec![motion(0, 10, Speed::Stand, Direction::NotMoving)]));
    let found = template.search(
        &agents(vec![anna, bob]),
        &pairs(vec![]),
        &Config::default(),
        10,
    );
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].agents, vec![1, 2]);
    assert_eq!(found[0].confidence, Confidence(10.0, 10.0));
    assert_eq!(found[0].times, vec![at(0), at(10)]);
}

#[test]
fn three_sequential_stages_with_timestamps() {
    let template = Template::from(
        parse("X walks towards Y then X stands for at least 30 seconds then X walks away from Y")
            .unwrap(),
    );
    let x = Agent::from((
        1,
        vec![
            motion(0, 20, Speed::Walk, Direction::Straight),
            motion(20, 55, Speed::Stand, Direction::NotMoving),
            motion(55, 70, Speed::Walk, Direction::Straight),
        ],
    ));
    let y = Agent::from((2, vec![motion(0, 70, Speed::Stand, Direction::NotMoving)]));
    let link = Pair::from((
        1,
        2,
        vec![
            contact(0, 20, DistanceChange::Decreasing, Direction::Straight),
            contact(20, 55, DistanceChange::Constant, Direction::NotMoving),
            contact(55, 70, DistanceChange::Increasing, Direction::Opposite),
        ],
    ));
    let found = template.search(
        &agents(vec![x, y]),
        &pairs(vec![link]),
        &Config::default(),
        10,
    );
    assert!(!found.is_empty());
    let best = &found[0];
    assert_eq!(best.agents, vec![1, 2]);
    assert_eq!(best.confidence, Confidence(70.0, 70.0));
    assert_eq!(best.times, vec![at(0), at(20), at(55), at(70)]);
}

#[test]
fn negation_splits_the_evidence() {
    let anna = Agent::from((
        1,
        vec![
            motion(0, 10, Speed::Walk, Direction::Straight),
            motion(10, 20, Speed::Stand, Direction::NotMoving),
        ],
    ));
    let windows = cut_to_windows(
        &[anna],
        &[],
        false,
        Delta::milliseconds(crate::MAX_WINDOW_MS),
    );
    let node = Behavior::not(Behavior::state(
        vec![Variable::from("Anna")],
        Some(Speed::Walk),
        None,
    ));
    let vars = [Variable::from("Anna")];
    let layer = node.layer(&vars, &windows, &Config::default());
    // half the evidence contradicts "anna walks"
    assert_eq!(layer.confidence(0, 20), Confidence(10.0, 20.0));
    assert_eq!(layer.confidence(0, 10), Confidence(0.0, 10.0));
    assert_eq!(layer.confidence(10, 20), Confidence(10.0, 10.0));
}

#[test]
fn double_negation_reads_like_the_plain_layer() {
    let anna = Agent::from((
        1,
        vec![
            motion(0, 10, Speed::Walk, Direction::Straight),
            motion(10, 20, Speed::Stand, Direction::NotMoving),
        ],
    ));
    let windows = cut_to_windows(
        &[anna],
        &[],
        false,
        Delta::milliseconds(crate::MAX_WINDOW_MS),
    );
    let vars = [Variable::from("Anna")];
    let walk = Behavior::state(vec![Variable::from("Anna")], Some(Speed::Walk), None);
    let config = Config::default();
    let plain = walk.layer(&vars, &windows, &config);
    let doubled = Behavior::not(Behavior::not(walk)).layer(&vars, &windows, &config);
    for i in 0..20 {
        for j in (i + 1)..=20 {
            assert_eq!(plain.confidence(i, j), doubled.confidence(i, j));
        }
    }
}

#[test]
fn disjunction_covers_either_speed() {
    // a homogeneous trace conforms over its full range
    let template = Template::from(parse("Anna walks or Anna stands").unwrap());
    let anna = Agent::from((1, vec![motion(0, 20, Speed::Walk, Direction::Straight)]));
    let found = template.search(&agents(vec![anna]), &pairs(vec![]), &Config::default(), 10);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].confidence, Confidence(20.0, 20.0));
    assert_eq!(found[0].times, vec![at(0), at(20)]);

    // a mixed trace reads as the better half over any straddling span
    let anna = Agent::from((
        2,
        vec![
            motion(0, 10, Speed::Walk, Direction::Straight),
            motion(10, 20, Speed::Stand, Direction::NotMoving),
        ],
    ));
    let windows = cut_to_windows(
        &[anna],
        &[],
        false,
        Delta::milliseconds(crate::MAX_WINDOW_MS),
    );
    let node = Behavior::any(vec![
        Behavior::state(vec![Variable::from("Anna")], Some(Speed::Walk), None),
        Behavior::state(vec![Variable::from("Anna")], Some(Speed::Stand), None),
    ]);
    let vars = [Variable::from("Anna")];
    let layer = node.layer(&vars, &windows, &Config::default());
    assert_eq!(layer.confidence(0, 20), Confidence(10.0, 20.0));
    assert_eq!(layer.confidence(0, 10), Confidence(10.0, 10.0));
    assert_eq!(layer.confidence(10, 20), Confidence(10.0, 10.0));
}

#[test]
fn symmetric_search_reduces_to_combinations() {
    let template = Template::from(parse("Anna and Bob run towards each other").unwrap());
    let runners = |id| {
        Agent::from((
            id,
            vec![motion(0, 10, Speed::Run, Direction::Straight)],
        ))
    };
    let walkers = |id| {
        Agent::from((
            id,
            vec![motion(0, 10, Speed::Walk, Direction::Straight)],
        ))
    };
    let link = Pair::from((
        3,
        4,
        vec![contact(0, 10, DistanceChange::Decreasing, Direction::Straight)],
    ));
    let found = template.search(
        &agents(vec![walkers(1), walkers(2), runners(3), runners(4)]),
        &pairs(vec![link.clone()]),
        &Config::default(),
        10,
    );
    // of the six unordered assignments only one pair actually runs
    // toward each other
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].agents, vec![3, 4]);
    assert_eq!(found[0].confidence, Confidence(10.0, 10.0));

    // switching the roles of the matched pair is indistinguishable
    let config = Config::default();
    let forward = [runners(3), runners(4)];
    let reverse = [runners(4), runners(3)];
    let vars = template.variables().to_vec();
    let score = |selection: &[Agent]| {
        let windows = cut_to_windows(
            selection,
            &[link.clone()],
            false,
            Delta::milliseconds(crate::MAX_WINDOW_MS),
        );
        let mut graph = template.root().graph(&vars, &windows, &config);
        graph.best_paths(1)
    };
    let forward = score(&forward);
    let reverse = score(&reverse);
    assert_eq!(forward[0].1, reverse[0].1);
    assert_eq!(forward[0].0, reverse[0].0);
}

#[test]
fn optimization_preserves_layer_confidences() {
    use super::config::Strategy;
    let anna = Agent::from((
        1,
        vec![
            motion(0, 10, Speed::Walk, Direction::Straight),
            motion(10, 20, Speed::Stand, Direction::NotMoving),
        ],
    ));
    let bob = Agent::from((2, vec![motion(0, 20, Speed::Stand, Direction::NotMoving)]));
    let windows = cut_to_windows(
        &[anna.clone(), bob.clone()],
        &[],
        false,
        Delta::milliseconds(crate::MAX_WINDOW_MS),
    );
    let vars = [Variable::from("Anna"), Variable::from("Bob")];
    let walk_a = Behavior::state(vec![vars[0].clone()], Some(Speed::Walk), None);
    let stand_b = Behavior::state(vec![vars[1].clone()], Some(Speed::Stand), None);

    // duplicated and doubly-negated children rewrite away; under the
    // MIN strategy the fold is unchanged by either
    let verbose = Behavior::all(vec![
        walk_a.clone(),
        walk_a.clone(),
        Behavior::not(Behavior::not(stand_b.clone())),
    ]);
    let concise = verbose.clone().optimized();
    assert_eq!(concise, Behavior::all(vec![walk_a.clone(), stand_b.clone()]));
    let config = Config {
        strategy: Strategy::Min,
        ..Config::default()
    };
    let before = verbose.layer(&vars, &windows, &config);
    let after = concise.layer(&vars, &windows, &config);
    for i in 0..windows.len() {
        for j in (i + 1)..=windows.len() {
            assert_eq!(before.confidence(i, j), after.confidence(i, j));
        }
    }

    // flattening nested sequences keeps the stage layers, so the graphs
    // rank the same paths under either strategy
    let nested = Template::from(Behavior::then(vec![
        Behavior::then(vec![walk_a.clone()]),
        stand_b.clone(),
    ]));
    let flat = Template::from(Behavior::then(vec![walk_a, stand_b]));
    assert_eq!(nested.root(), flat.root());
    for strategy in [Strategy::Avg, Strategy::Min] {
        let config = Config {
            strategy,
            ..Config::default()
        };
        let maps = agents(vec![anna.clone(), bob.clone()]);
        let links = pairs(vec![]);
        assert_eq!(
            nested.search(&maps, &links, &config, 5),
            flat.search(&maps, &links, &config, 5)
        );
    }
}

#[test]
fn exhausted_assignments_return_nothing() {
    let template = Template::from(parse("Anna runs").unwrap());
    let anna = Agent::from((1, vec![motion(0, 20, Speed::Walk, Direction::Straight)]));
    let found = template.search(&agents(vec![anna]), &pairs(vec![]), &Config::default(), 10);
    assert!(found.is_empty());
}

#[test]
fn limit_caps_the_ranked_list() {
    let template = Template::from(parse("Anna walks").unwrap());
    let walkers = (1..=4)
        .map(|id| Agent::from((id, vec![motion(0, 10, Speed::Walk, Direction::Straight)])))
        .collect::<Vec<_>>();
    let found = template.search(&agents(walkers), &pairs(vec![]), &Config::default(), 2);
    assert_eq!(found.len(), 2);
}
