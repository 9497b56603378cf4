/*!
Depth-first strategies: a spanning forest of traces, and a greedy cover
of every link.
*/

use tracing::warn;

use super::{case_head, push_step};
use crate::bits::BitSet;
use crate::error::Error;
use crate::graph::Graph;
use crate::node::{LinkId, Node};

/// Emits one case per dead end of a depth-first spanning tree rooted at
/// vertex 0.
///
/// A *dead end* is a vertex whose expansion discovered nothing new, so
/// the emitted cases together sketch the reachable part of the machine
/// without repeating vertices.
#[derive(Debug, Default)]
pub struct Dfs;

impl Dfs {
    pub fn travel(&mut self, g: &Graph) -> Result<String, Error> {
        if g.is_empty() {
            return Ok(String::new());
        }
        let start: Node = 0;
        let n = g.len();
        let mut visited = BitSet::new(n);
        let mut backtrack: Vec<Option<LinkId>> = vec![None; n];
        let mut dead_ends = Vec::new();
        let mut stack = vec![start];
        visited.set_bit(start as usize);
        backtrack[start as usize] = g.links_of(start).first().copied();

        while let Some(v) = stack.pop() {
            let mut terminated = true;
            for &e in g.links_of(v) {
                let w = g.link_at(e).target;
                if visited.set_bit(w as usize) {
                    continue;
                }
                backtrack[w as usize] = Some(e);
                stack.push(w);
                terminated = false;
            }
            if terminated {
                dead_ends.push(v);
            }
        }

        let mut trace = String::new();
        for &end in &dead_ends {
            trace.push_str(&Self::print(g, start, end, &backtrack)?);
            trace.push('\n');
        }
        Ok(trace)
    }

    fn print(
        g: &Graph,
        start: Node,
        end: Node,
        backtrack: &[Option<LinkId>],
    ) -> Result<String, Error> {
        let mut line = String::new();
        let mut link_id = backtrack[end as usize].ok_or(Error::MissingBacktrack(end))?;
        loop {
            let link = g.link_at(link_id);
            if link.is_loop() {
                return Ok(line);
            }
            let mut step = String::new();
            push_step(&mut step, link);
            line.insert_str(0, &step);
            if link.source == start {
                return Ok(case_head(start) + &line);
            }
            link_id = backtrack[link.source as usize]
                .ok_or(Error::MissingBacktrack(link.source))?;
        }
    }
}

/// Emits a set of cases that together traverse every link exactly once.
///
/// Links are claimed greedily: each unvisited link seeds a case, which
/// is then extended by a single-step look-ahead that prefers the
/// out-link whose target still has the most unvisited out-links.
#[derive(Debug, Default)]
pub struct DfsPath;

impl DfsPath {
    pub fn travel(&mut self, g: &Graph) -> Result<String, Error> {
        let mut trace = String::new();
        for (_, path) in self.cover(g) {
            trace.push_str(&Self::print(g, &path));
            trace.push('\n');
        }
        Ok(trace)
    }

    /// The raw link cover: each entry is a case given by its start
    /// vertex and the links it takes, and every link of `g` appears in
    /// exactly one case.
    pub fn cover(&self, g: &Graph) -> Vec<(Node, Vec<LinkId>)> {
        let mut visited = BitSet::new(g.number_of_links() as usize);
        let mut cases = Vec::new();
        for e in 0..g.number_of_links() {
            if visited.get_bit(e as usize) {
                continue;
            }
            let start = g.link_at(e).source;
            cases.push((start, Self::walk(g, e, &mut visited)));
        }
        if !cases.is_empty() && cases.len() as u32 == g.number_of_links() {
            warn!("every case covers a single link; the graph is mostly disconnected");
        }
        cases
    }

    fn walk(g: &Graph, seed: LinkId, visited: &mut BitSet) -> Vec<LinkId> {
        let mut path = vec![seed];
        visited.set_bit(seed as usize);
        let mut current = g.link_at(seed).target;
        while let Some(next) = Self::most_choice(g, current, visited) {
            visited.set_bit(next as usize);
            current = g.link_at(next).target;
            path.push(next);
        }
        path
    }

    /// Among the unvisited out-links of `v`, the one whose target keeps
    /// the most onward options open.
    fn most_choice(g: &Graph, v: Node, visited: &BitSet) -> Option<LinkId> {
        let mut best: Option<(usize, LinkId)> = None;
        for &e in g.links_of(v) {
            if visited.get_bit(e as usize) {
                continue;
            }
            let onward = g
                .links_of(g.link_at(e).target)
                .iter()
                .filter(|&&f| !visited.get_bit(f as usize))
                .count();
            if best.is_none_or(|(score, _)| onward > score) {
                best = Some((onward, e));
            }
        }
        best.map(|(_, e)| e)
    }

    fn print(g: &Graph, path: &[LinkId]) -> String {
        let mut line = case_head(g.link_at(path[0]).source);
        for &e in path {
            push_step(&mut line, g.link_at(e));
        }
        line
    }
}
