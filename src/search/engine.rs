use super::config::Config;
use super::report::Match;
use super::template::Template;
use crate::track::cut_to_windows;
use crate::track::Agent;
use crate::track::Pair;
use crate::AgentId;
use crate::Delta;
use itertools::Itertools;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Mutex;

impl Template {
    /// complete search of the encoded behavior over a set of agents and
    /// their pairs, returning up to `limit` ranked matches.
    ///
    /// assignments of agents onto template variables are enumerated as
    /// combinations when every variable is interchangeable, otherwise as
    /// permutations. each assignment is pre-checked for temporal
    /// viability, sliced to the useful range, granulated into windows
    /// and pushed through the root's time graph. assignments are
    /// independent, so they fan out across the thread pool; the only
    /// shared state is the running top list and a progress counter.
    pub fn search(
        &self,
        agents: &BTreeMap<AgentId, Agent>,
        pairs: &BTreeMap<(AgentId, AgentId), Pair>,
        config: &Config,
        limit: usize,
    ) -> Vec<Match> {
        let arity = self.variables().len();
        let all = self.variables().iter().cloned().collect::<BTreeSet<_>>();
        let selections = match self.root().is_symmetrical(&all) {
            true => agents.values().combinations(arity).collect::<Vec<_>>(),
            false => agents.values().permutations(arity).collect::<Vec<_>>(),
        };
        log::info!(
            "searching {} assignments of {} agents onto {} variables",
            selections.len(),
            agents.len(),
            arity
        );

        let comparator = config.comparator();
        let best = Mutex::new(Vec::<Match>::new());
        let progress = AtomicUsize::new(0);
        let skipped = AtomicUsize::new(0);
        let milestone = (selections.len() / 10).max(1);

        selections.par_iter().for_each(|selection| {
            let considered = progress.fetch_add(1, Ordering::Relaxed) + 1;
            if considered % milestone == 0 {
                log::info!("considered {}/{} assignments", considered, selections.len());
            }
            let Some(frame) = self.viability(selection) else {
                skipped.fetch_add(1, Ordering::Relaxed);
                return;
            };
            let clipped = selection
                .iter()
                .map(|agent| agent.clip(&frame))
                .collect::<Vec<_>>();
            let linked = selection
                .iter()
                .permutations(2)
                .filter_map(|ordered| pairs.get(&(ordered[0].id, ordered[1].id)))
                .map(|pair| pair.clip(&frame))
                .collect::<Vec<_>>();
            let windows = cut_to_windows(
                &clipped,
                &linked,
                false,
                Delta::milliseconds(crate::MAX_WINDOW_MS),
            );
            if windows.is_empty() {
                return;
            }
            let mut graph = self.root().graph(self.variables(), &windows, config);
            let found = graph.best_paths(1);
            if found.is_empty() {
                return;
            }
            let ids = selection.iter().map(|agent| agent.id).collect::<Vec<_>>();
            let mut best = best.lock().expect("top list lock");
            best.extend(found.into_iter().map(|(times, confidence)| Match {
                agents: ids.clone(),
                times,
                confidence,
            }));
            best.sort_by(|a, b| comparator.order(&b.confidence, &a.confidence));
            best.truncate(limit);
        });

        log::info!(
            "skipped {}/{} assignments as non-viable",
            skipped.load(Ordering::Relaxed),
            selections.len()
        );
        // an infinite denominator means no sequential ordering ever
        // completed for the assignment
        best.into_inner()
            .expect("top list lock")
            .into_iter()
            .filter(|m| m.confidence.denom().is_finite())
            .collect()
    }
}
