//! Graph Scheduler
//!
//! Turns the declared pass list into an execution plan in three phases:
//! adjacency construction from resource dependencies, topological sort by
//! depth-first search, and longest-path layering into dependency levels.
//!
//! References on the approach:
//! - <https://levelup.gitconnected.com/organizing-gpu-work-with-directed-acyclic-graphs-f3fd5f2c2af3>
//! - <https://www.gdcvault.com/play/1024612/FrameGraph-Extensible-Rendering-Architecture-in>

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::resource::RgResourceHandle;

use super::pass::PassBox;

/// Passes sharing the same longest-path distance from the prologue.
///
/// The unit of barrier batching: the union of member reads and writes is
/// transitioned once per level instead of once per pass.
#[derive(Default)]
pub struct DependencyLevel {
    pub(crate) passes: Vec<usize>,
    pub(crate) reads: FxHashSet<RgResourceHandle>,
    pub(crate) writes: FxHashSet<RgResourceHandle>,
}

impl DependencyLevel {
    fn add_pass(&mut self, index: usize, pass: &PassBox<'_>) {
        self.passes.push(index);
        self.reads.extend(pass.reads.iter().copied());
        self.writes.extend(pass.writes.iter().copied());
    }

    /// Indices of member passes, in execution order.
    #[must_use]
    pub fn pass_indices(&self) -> &[usize] {
        &self.passes
    }

    /// Handles read by any pass in this level.
    #[must_use]
    pub fn reads(&self) -> &FxHashSet<RgResourceHandle> {
        &self.reads
    }

    /// Handles written by any pass in this level.
    #[must_use]
    pub fn writes(&self) -> &FxHashSet<RgResourceHandle> {
        &self.writes
    }
}

/// The compiled execution plan for one frame's graph.
pub struct Schedule {
    adjacency: Vec<SmallVec<[usize; 8]>>,
    execution_order: Vec<usize>,
    levels: Vec<DependencyLevel>,
}

impl Schedule {
    /// Pass indices in the order they will execute.
    #[must_use]
    pub fn execution_order(&self) -> &[usize] {
        &self.execution_order
    }

    /// The dependency levels, outermost execution loop first.
    #[must_use]
    pub fn levels(&self) -> &[DependencyLevel] {
        &self.levels
    }

    /// Successors of `pass` in the dependency DAG.
    #[must_use]
    pub fn adjacency(&self, pass: usize) -> &[usize] {
        &self.adjacency[pass]
    }

    /// All edges `(from, to)` in the DAG.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(from, successors)| successors.iter().map(move |&to| (from, to)))
    }
}

const WHITE: u8 = 0;
const GRAY: u8 = 1;
const BLACK: u8 = 2;

/// Compiles the pass list. `passes[0]` must be the prologue and the epilogue
/// must already be appended last. Records every pass's topological index.
///
/// # Panics
///
/// Panics if the declared dependencies form a cycle.
pub(crate) fn build_schedule(passes: &mut [PassBox<'_>]) -> Schedule {
    let count = passes.len();
    let prologue = 0;
    let epilogue = count - 1;

    // Adjacency from resource dependencies. Candidate successors are visited
    // in reverse declaration order so that when several passes could satisfy
    // a read, the most recently declared writer wins the tie.
    let mut adjacency: Vec<SmallVec<[usize; 8]>> = vec![SmallVec::new(); count];
    for i in 0..count {
        if !passes[i].has_any_dependencies() {
            continue;
        }
        for j in (0..count).rev() {
            if i == j {
                continue;
            }
            let depends = passes[i].writes.iter().any(|&written| {
                // Read-after-write on the bumped handle, or the next write of
                // the same resource (write-after-write orders rewrites).
                passes[j].reads_from(written) || passes[j].writes_to(written.next_version())
            });
            if depends {
                adjacency[i].push(j);
            }
        }
    }

    // The prologue sources every pass that has no other predecessor; every
    // user pass without a successor sinks into the epilogue. This pins the
    // two implicit passes to the first and last dependency levels.
    let mut in_degree = vec![0_usize; count];
    let mut out_degree = vec![0_usize; count];
    for (from, successors) in adjacency.iter().enumerate() {
        out_degree[from] = successors.len();
        for &to in successors {
            in_degree[to] += 1;
        }
    }
    for to in prologue + 1..count {
        if in_degree[to] == 0 {
            adjacency[prologue].push(to);
        }
    }
    for from in prologue + 1..epilogue {
        if out_degree[from] == 0 {
            adjacency[from].push(epilogue);
        }
    }

    // Iterative depth-first search; the reversed post-order is the execution
    // order. Seeding roots in reverse declaration order keeps independent
    // passes in the order they were added.
    let mut state = vec![WHITE; count];
    let mut post_order = Vec::with_capacity(count);
    for root in (0..count).rev() {
        if state[root] != WHITE {
            continue;
        }
        state[root] = GRAY;
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        while let Some(top) = stack.last_mut() {
            let node = top.0;
            if top.1 < adjacency[node].len() {
                let next = adjacency[node][top.1];
                top.1 += 1;
                match state[next] {
                    WHITE => {
                        state[next] = GRAY;
                        stack.push((next, 0));
                    }
                    GRAY => panic!(
                        "render graph contains a dependency cycle through pass '{}'",
                        passes[next].name()
                    ),
                    _ => {}
                }
            } else {
                state[node] = BLACK;
                post_order.push(node);
                stack.pop();
            }
        }
    }
    let execution_order: Vec<usize> = post_order.into_iter().rev().collect();
    for (order, &pass) in execution_order.iter().enumerate() {
        passes[pass].topological_index = order;
    }

    // Longest-path layering: one relaxation sweep in topological order.
    let mut depth = vec![0_usize; count];
    for &from in &execution_order {
        for &to in &adjacency[from] {
            if depth[to] < depth[from] + 1 {
                depth[to] = depth[from] + 1;
            }
        }
    }
    let max_depth = depth.iter().copied().max().unwrap_or(0);
    let mut levels: Vec<DependencyLevel> = Vec::new();
    levels.resize_with(max_depth + 1, DependencyLevel::default);
    for &pass in &execution_order {
        levels[depth[pass]].add_pass(pass, &passes[pass]);
    }

    log::trace!(
        "scheduled {} passes into {} dependency levels",
        count,
        levels.len()
    );

    Schedule {
        adjacency,
        execution_order,
        levels,
    }
}
