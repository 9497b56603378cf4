/*!
Breadth-first strategies: one shortest path, or all bounded simple paths.
*/

use std::collections::VecDeque;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::warn;

use super::{END, MAX_CASES, MAX_DEPTH, Properties, RANDOM_WALK, START, case_head, property, push_step};
use crate::bits::BitSet;
use crate::error::Error;
use crate::graph::Graph;
use crate::node::{LinkId, Node};

/// One shortest path (in links) from `from` to `to`, or `None` if no
/// directed walk of at least one link connects them.
///
/// Ties are broken by shuffling each adjacency list, so repeated calls
/// with different RNG states spread over the shortest-path set.
pub fn shortest_path<R: Rng>(
    g: &Graph,
    from: Node,
    to: Node,
    rng: &mut R,
) -> Option<Vec<LinkId>> {
    if !g.reachable(from, to) {
        return None;
    }
    let n = g.len();
    let mut discovered_via: Vec<Option<LinkId>> = vec![None; n];
    let mut visited = BitSet::new(n);
    let mut queue = VecDeque::from([from]);
    visited.set_bit(from as usize);

    'search: while let Some(v) = queue.pop_front() {
        let mut adj = g.links_of(v).to_vec();
        adj.shuffle(rng);
        for e in adj {
            let w = g.link_at(e).target;
            if w == to {
                discovered_via[w as usize] = Some(e);
                break 'search;
            }
            if !visited.set_bit(w as usize) {
                discovered_via[w as usize] = Some(e);
                queue.push_back(w);
            }
        }
    }

    let mut path = Vec::new();
    let mut link_id = discovered_via[to as usize]?;
    loop {
        path.push(link_id);
        let link = g.link_at(link_id);
        if link.source == from || link.is_loop() {
            break;
        }
        link_id = discovered_via[link.source as usize]?;
    }
    path.reverse();
    Some(path)
}

/// Emits a single shortest path from `START` to `END` as one case.
///
/// Unreachable or missing targets produce an empty trace and a warning,
/// not an error: when the driver sweeps start/end combinations, most
/// pairs of an arbitrary machine are simply not connected.
#[derive(Debug, Default)]
pub struct BfsOne {
    start: Node,
    end: Node,
    random: bool,
}

impl BfsOne {
    pub fn configure(&mut self, config: &Properties) {
        self.start = property(config, START, 0) as Node;
        self.end = property(config, END, 0) as Node;
        self.random = property(config, RANDOM_WALK, 0) != 0;
    }

    pub fn travel<R: Rng>(&mut self, g: &Graph, rng: &mut R) -> Result<String, Error> {
        if !g.reachable(self.start, self.end) {
            warn!(start = self.start, end = self.end, "end not reachable from start");
            return Ok(String::new());
        }
        let n = g.len();
        let mut backtrack: Vec<Option<LinkId>> = vec![None; n];
        let mut visited = BitSet::new(n);
        let mut queue = VecDeque::from([self.start]);
        visited.set_bit(self.start as usize);
        let mut found = false;

        'search: while let Some(v) = queue.pop_front() {
            let mut adj = g.links_of(v).to_vec();
            if self.random {
                adj.shuffle(rng);
            }
            for e in adj {
                let w = g.link_at(e).target;
                if w == self.end {
                    backtrack[w as usize] = Some(e);
                    found = true;
                    break 'search;
                }
                if !visited.set_bit(w as usize) {
                    backtrack[w as usize] = Some(e);
                    queue.push_back(w);
                }
            }
        }

        // Reflexive reachability passes the gate for start == end even
        // when no cycle returns to the start.
        if !found {
            warn!(start = self.start, end = self.end, "no path with at least one link");
            return Ok(String::new());
        }
        let mut line = self.print(g, &backtrack)?;
        line.push('\n');
        Ok(line)
    }

    /// Walks the backtrack chain from the end to the start, prepending
    /// one step per link.
    fn print(&self, g: &Graph, backtrack: &[Option<LinkId>]) -> Result<String, Error> {
        let mut line = String::new();
        let mut link_id = backtrack[self.end as usize].ok_or(Error::MissingBacktrack(self.end))?;
        loop {
            let link = g.link_at(link_id);
            if link.is_loop() || link.source == self.start {
                let mut head = case_head(link.source);
                push_step(&mut head, link);
                return Ok(head + &line);
            }
            let mut step = String::new();
            push_step(&mut step, link);
            line.insert_str(0, &step);
            link_id = backtrack[link.source as usize]
                .ok_or(Error::MissingBacktrack(link.source))?;
        }
    }
}

/// Emits every simple path from `START` to `END`, bounded by `MAX_DEPTH`
/// links per case and `MAX_CASES` cases in total.
///
/// "Simple" permits the start and end to coincide, so cycles through the
/// start are found; every other vertex appears at most once per case.
#[derive(Debug)]
pub struct BfsAll {
    start: Node,
    end: Node,
    max_depth: usize,
    max_cases: usize,
    random: bool,

    visited: BitSet,
    path: Vec<LinkId>,
    found: usize,
    trace: String,
}

impl Default for BfsAll {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            max_depth: usize::MAX,
            max_cases: usize::MAX,
            random: false,
            visited: BitSet::new(0),
            path: Vec::new(),
            found: 0,
            trace: String::new(),
        }
    }
}

impl BfsAll {
    pub fn configure(&mut self, config: &Properties) {
        self.start = property(config, START, 0) as Node;
        self.end = property(config, END, 0) as Node;
        self.max_depth = property(config, MAX_DEPTH, i64::MAX) as usize;
        self.max_cases = property(config, MAX_CASES, i64::MAX) as usize;
        self.random = property(config, RANDOM_WALK, 0) != 0;
    }

    pub fn travel<R: Rng>(&mut self, g: &Graph, rng: &mut R) -> Result<String, Error> {
        if !g.reachable(self.start, self.end) {
            warn!(start = self.start, end = self.end, "end not reachable from start");
            return Ok(String::new());
        }
        self.visited = BitSet::new(g.len());
        self.visited.set_bit(self.start as usize);
        self.path.clear();
        self.found = 0;
        self.trace = String::new();

        self.explore(g, self.start, rng);
        Ok(std::mem::take(&mut self.trace))
    }

    /// The first case is exempt from the depth bound, so a tiny
    /// `MAX_DEPTH` still yields at least one case when any path exists.
    fn search_further(&self) -> bool {
        self.found < self.max_cases && (self.found == 0 || self.path.len() < self.max_depth)
    }

    fn explore<R: Rng>(&mut self, g: &Graph, current: Node, rng: &mut R) {
        if !self.search_further() {
            return;
        }
        let mut adj = g.links_of(current).to_vec();
        if self.random {
            adj.shuffle(rng);
        }

        // Complete cases first so shallow paths survive the case cap.
        for &e in &adj {
            if self.found >= self.max_cases {
                return;
            }
            if g.link_at(e).target == self.end {
                self.path.push(e);
                self.emit(g);
                self.path.pop();
            }
        }

        for &e in &adj {
            let w = g.link_at(e).target;
            if w == self.end || self.visited.get_bit(w as usize) {
                continue;
            }
            self.path.push(e);
            self.visited.set_bit(w as usize);
            self.explore(g, w, rng);
            self.visited.clear_bit(w as usize);
            self.path.pop();
        }
    }

    fn emit(&mut self, g: &Graph) {
        self.found += 1;
        let mut line = case_head(self.start);
        for &e in &self.path {
            push_step(&mut line, g.link_at(e));
        }
        line.push('\n');
        self.trace.push_str(&line);
    }
}
