use super::template::Template;
use crate::clock::Frame;
use crate::track::Agent;
use crate::track::Direction;
use crate::track::Granulate;
use crate::track::Motion;
use crate::track::Speed;
use crate::Delta;

impl Template {
    /// cheap pre-check that an agent assignment has enough temporal
    /// presence to satisfy the stage minimums.
    ///
    /// each agent enters as one gap-free presence interval. the stage
    /// sequence and the presence windows are walked in lockstep,
    /// consuming required time while every required variable is
    /// present; a window missing one resets the current stage. on
    /// success the returned frame bounds the useful time range: from
    /// the first window where the first stage can begin to the last
    /// window where the final stage can end.
    pub fn viability(&self, selection: &[&Agent]) -> Option<Frame> {
        let streams = selection
            .iter()
            .map(|agent| {
                agent
                    .frame()
                    .map(|f| vec![Motion::new(f.start, f.end, Speed::Stand, Direction::NotMoving)])
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>();
        if streams.iter().any(|s| s.is_empty()) {
            return None;
        }
        let windows = Granulate::new(streams, false, Delta::MAX).collect::<Vec<_>>();
        if windows.is_empty() || self.stages().is_empty() {
            return None;
        }
        let indices = self
            .stages()
            .iter()
            .map(|(vars, _)| {
                vars.iter()
                    .map(|v| {
                        self.variables()
                            .iter()
                            .position(|x| x == v)
                            .expect("stage variable bound")
                    })
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        let mut stage = 0;
        let mut need = self.stages()[0].1;
        let mut cursor = 0;
        let mut left = windows[0].1.duration();
        let viable = loop {
            let (section, _) = &windows[cursor];
            if indices[stage].iter().any(|i| section[*i].is_none()) {
                // a required agent is absent: the running stage resets
                // and the walk moves on
                need = self.stages()[stage].1;
                cursor += 1;
                match windows.get(cursor) {
                    Some((_, frame)) => left = frame.duration(),
                    None => break false,
                }
                continue;
            }
            let fits = need <= left;
            let drains = need >= left;
            if fits {
                left = left - need;
                stage += 1;
                if stage >= self.stages().len() {
                    break true;
                }
                need = self.stages()[stage].1;
            }
            if drains {
                need = need - left;
                cursor += 1;
                match windows.get(cursor) {
                    Some((_, frame)) => left = frame.duration(),
                    None => break false,
                }
            }
        };
        if !viable {
            return None;
        }

        let first = indices.first().expect("non-empty stages");
        let last = indices.last().expect("non-empty stages");
        let start = windows
            .iter()
            .find(|(section, _)| first.iter().all(|i| section[*i].is_some()))
            .map(|(_, frame)| frame.start)?;
        let end = windows
            .iter()
            .rev()
            .find(|(section, _)| last.iter().all(|i| section[*i].is_some()))
            .map(|(_, frame)| frame.end)?;
        Some(Frame::from((start, end)))
    }
}
