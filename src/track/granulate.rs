use super::slice::Slice;
use crate::clock::Frame;
use crate::Delta;
use crate::Stamp;

/// lazy sliding-window granulation over any number of block streams.
///
/// each yielded window covers a maximal interval over which every
/// stream's active block is constant (or absent), additionally bounded
/// by `max_window`. the yielded section holds each stream's block
/// clipped to the window, or none where the stream has no cover.
///
/// windows at or under the 200 ms floor are dropped, as are windows
/// covered by no stream at all; `strip` additionally drops windows
/// missing any stream.
pub struct Granulate<T: Slice> {
    streams: Vec<Vec<T>>,
    cursors: Vec<usize>,
    left: Stamp,
    finish: Stamp,
    strip: bool,
    max_window: Delta,
    done: bool,
}

impl<T: Slice> Granulate<T> {
    pub fn new(streams: Vec<Vec<T>>, strip: bool, max_window: Delta) -> Self {
        let left = streams
            .iter()
            .filter_map(|s| s.first())
            .map(|b| b.start())
            .min();
        let finish = streams
            .iter()
            .filter_map(|s| s.last())
            .map(|b| b.end())
            .max();
        let cursors = vec![0; streams.len()];
        match (left, finish) {
            (Some(left), Some(finish)) => Self {
                streams,
                cursors,
                left,
                finish,
                strip,
                max_window,
                done: false,
            },
            // no stream has any block
            _ => Self {
                streams,
                cursors,
                left: Stamp::default(),
                finish: Stamp::default(),
                strip,
                max_window,
                done: true,
            },
        }
    }

    fn active(&self, index: usize) -> Option<&T> {
        self.streams[index].get(self.cursors[index])
    }
}

impl<T: Slice> Iterator for Granulate<T> {
    type Item = (Vec<Option<T>>, Frame);

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            if self.left >= self.finish {
                self.done = true;
                break;
            }

            // the window's right bound is the nearest of: each active
            // block's end, each pending block's start, and the size cap.
            let mut right = self.finish;
            let mut exhausted = Vec::new();
            for index in 0..self.streams.len() {
                let Some(block) = self.active(index) else {
                    continue;
                };
                if block.start() <= self.left {
                    if right == block.end() {
                        exhausted.push(index);
                    } else if right > block.end() {
                        right = block.end();
                        exhausted = vec![index];
                    }
                } else if right > block.start() {
                    right = block.start();
                    exhausted.clear();
                }
            }
            if right - self.left > self.max_window {
                right = self.left + self.max_window;
                exhausted.clear();
            }

            let section = (0..self.streams.len())
                .map(|index| {
                    self.active(index)
                        .filter(|b| b.start() < right)
                        .map(|b| b.clip(self.left, right))
                })
                .collect::<Vec<Option<T>>>();
            let frame = Frame::from((self.left, right));

            for index in exhausted {
                self.cursors[index] += 1;
            }
            self.left = right;

            if frame.duration() <= Delta::milliseconds(crate::MIN_WINDOW_MS) {
                continue;
            }
            if section.iter().all(|b| b.is_none()) {
                continue;
            }
            if self.strip && section.iter().any(|b| b.is_none()) {
                continue;
            }
            return Some((section, frame));
        }
        None
    }
}
