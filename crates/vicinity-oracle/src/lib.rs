//! In-process approximate-neighbor oracle: a small HNSW graph over the full
//! unfiltered dataset.
//!
//! Build is strictly sequential (`add_point` takes `&mut self`); after that
//! the graph is read-only and queries share it freely. Recall is approximate
//! by construction — callers that need guaranteed results must compensate
//! downstream.

use rand::Rng;
use std::cmp::Ordering as CmpOrdering;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;

use vicinity_core::{squared_euclidean, GlobalConfig, NeighborOracle, RecordId};

const MAX_LAYERS: usize = 16;

/// Graph node: neighbor lists by layer. `layers[0]` is the dense base layer.
#[derive(Debug, Default)]
struct Node {
    layers: Vec<Vec<u32>>,
}

/// Nearest-neighbor candidate, ordered so that `BinaryHeap<Candidate>` pops
/// the smallest distance first (reversed comparison: BinaryHeap is a
/// max-heap). Wrap in `Reverse` to evict the farthest instead.
#[derive(Debug, Copy, Clone, PartialEq)]
struct Candidate {
    slot: u32,
    distance: f32,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .distance
            .partial_cmp(&self.distance)
            .unwrap_or(CmpOrdering::Equal)
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

/// HNSW graph with inline vector storage.
///
/// Slots are insertion positions; the id registered with each point is
/// carried alongside and returned in results.
#[derive(Debug)]
pub struct HnswOracle {
    nodes: Vec<Node>,
    vectors: Vec<Vec<f32>>,
    ids: Vec<RecordId>,
    entry_point: u32,
    max_layer: usize,
    dim: usize,
    config: Arc<GlobalConfig>,
}

impl HnswOracle {
    pub fn new(dim: usize, config: Arc<GlobalConfig>) -> Self {
        Self {
            nodes: Vec::new(),
            vectors: Vec::new(),
            ids: Vec::new(),
            entry_point: 0,
            max_layer: 0,
            dim,
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    fn dist(&self, slot: u32, query: &[f32]) -> f32 {
        squared_euclidean(&self.vectors[slot as usize], query)
    }

    fn random_level(&self) -> usize {
        let mut rng = rand::thread_rng();
        let mut level = 0;
        while rng.gen::<f64>() < 0.5 && level < MAX_LAYERS - 1 {
            level += 1;
        }
        level
    }

    /// Greedy hill-climb from `from_layer` down to `down_to` inclusive,
    /// returning the closest node reached.
    fn greedy_descend(&self, query: &[f32], mut curr: u32, from_layer: usize, down_to: usize) -> u32 {
        let mut curr_dist = self.dist(curr, query);
        for level in (down_to..=from_layer).rev() {
            let mut changed = true;
            while changed {
                changed = false;
                let node = &self.nodes[curr as usize];
                if node.layers.len() <= level {
                    break;
                }
                for &neighbor in &node.layers[level] {
                    let d = self.dist(neighbor, query);
                    if d < curr_dist {
                        curr_dist = d;
                        curr = neighbor;
                        changed = true;
                    }
                }
            }
        }
        curr
    }

    /// Beam search on one layer: expands the closest unexpanded candidate
    /// while it can still improve the worst of the `ef` best found so far.
    /// Returns candidates sorted ascending by distance.
    fn search_layer(&self, query: &[f32], entry: u32, level: usize, ef: usize) -> Vec<Candidate> {
        let mut visited = vec![false; self.nodes.len()];
        let mut candidates: BinaryHeap<Candidate> = BinaryHeap::new();
        let mut results: BinaryHeap<Reverse<Candidate>> = BinaryHeap::new();

        let first = Candidate {
            slot: entry,
            distance: self.dist(entry, query),
        };
        candidates.push(first);
        results.push(Reverse(first));
        visited[entry as usize] = true;

        while let Some(cand) = candidates.pop() {
            if let Some(Reverse(worst)) = results.peek() {
                if results.len() >= ef && cand.distance > worst.distance {
                    break;
                }
            }

            let node = &self.nodes[cand.slot as usize];
            if node.layers.len() <= level {
                continue;
            }

            for &neighbor in &node.layers[level] {
                if visited[neighbor as usize] {
                    continue;
                }
                visited[neighbor as usize] = true;

                let distance = self.dist(neighbor, query);
                let beats_worst = match results.peek() {
                    Some(Reverse(worst)) => distance < worst.distance,
                    None => true,
                };
                if results.len() < ef || beats_worst {
                    let c = Candidate {
                        slot: neighbor,
                        distance,
                    };
                    candidates.push(c);
                    results.push(Reverse(c));
                    if results.len() > ef {
                        results.pop();
                    }
                }
            }
        }

        let mut out: Vec<Candidate> = results.into_iter().map(|Reverse(c)| c).collect();
        out.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(CmpOrdering::Equal)
        });
        out
    }

    /// Neighbor selection heuristic: walk candidates nearest-first, keep one
    /// only if no already-kept neighbor occludes it (is closer to it than
    /// the candidate is to the query). Keeps links spread out instead of
    /// clustered on one side.
    fn select_neighbors(&self, candidates: &[Candidate], m: usize) -> Vec<u32> {
        let mut selected: Vec<u32> = Vec::with_capacity(m);
        for cand in candidates {
            if selected.len() >= m {
                break;
            }
            let cand_vec = &self.vectors[cand.slot as usize];
            let occluded = selected.iter().any(|&kept| {
                squared_euclidean(cand_vec, &self.vectors[kept as usize]) < cand.distance
            });
            if !occluded {
                selected.push(cand.slot);
            }
        }
        selected
    }

    fn add_link(&mut self, src: u32, dst: u32, level: usize) {
        let links = &mut self.nodes[src as usize].layers[level];
        if !links.contains(&dst) {
            links.push(dst);
        }
    }

    /// Re-selects a node's links on one layer after it grew past `max_links`.
    fn prune_links(&mut self, slot: u32, level: usize, max_links: usize) {
        let node_vec = &self.vectors[slot as usize];
        let mut ranked: Vec<Candidate> = self.nodes[slot as usize].layers[level]
            .iter()
            .map(|&n| Candidate {
                slot: n,
                distance: squared_euclidean(node_vec, &self.vectors[n as usize]),
            })
            .collect();
        ranked.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(CmpOrdering::Equal)
        });
        let keep = self.select_neighbors(&ranked, max_links);
        self.nodes[slot as usize].layers[level] = keep;
    }
}

impl NeighborOracle for HnswOracle {
    fn add_point(&mut self, embedding: &[f32], id: RecordId) {
        debug_assert_eq!(embedding.len(), self.dim, "oracle dimension mismatch");

        let slot = self.nodes.len() as u32;
        self.vectors.push(embedding.to_vec());
        self.ids.push(id);

        let new_level = self.random_level();
        let mut layers = Vec::with_capacity(new_level + 1);
        for _ in 0..=new_level {
            layers.push(Vec::new());
        }
        self.nodes.push(Node { layers });

        if slot == 0 {
            self.entry_point = 0;
            self.max_layer = new_level;
            return;
        }

        let m = self.config.get_m();
        let ef_construction = self.config.get_ef_construction();
        let query = self.vectors[slot as usize].clone();

        // Zoom in from the top of the graph to just above the new node's level.
        let mut curr = self.entry_point;
        if self.max_layer > new_level {
            curr = self.greedy_descend(&query, curr, self.max_layer, new_level + 1);
        }

        // Link downward, layer by layer.
        for level in (0..=new_level.min(self.max_layer)).rev() {
            // Base layer is kept twice as dense for recall.
            let m_max = if level == 0 { m * 2 } else { m };

            let found = self.search_layer(&query, curr, level, ef_construction);
            let selected = self.select_neighbors(&found, m_max);

            for &neighbor in &selected {
                self.add_link(slot, neighbor, level);
                self.add_link(neighbor, slot, level);

                if self.nodes[neighbor as usize].layers[level].len() > m_max {
                    self.prune_links(neighbor, level, m_max);
                }
            }

            if let Some(&closest) = selected.first() {
                curr = closest;
            }
        }

        if new_level > self.max_layer {
            self.max_layer = new_level;
            self.entry_point = slot;
        }
    }

    fn search_approx(&self, query: &[f32], m: usize) -> Vec<(RecordId, f32)> {
        if self.nodes.is_empty() || m == 0 {
            return Vec::new();
        }
        debug_assert_eq!(query.len(), self.dim, "oracle dimension mismatch");

        let ef = self.config.get_ef_search().max(m);
        let mut curr = self.entry_point;
        if self.max_layer > 0 {
            curr = self.greedy_descend(query, curr, self.max_layer, 1);
        }

        self.search_layer(query, curr, 0, ef)
            .into_iter()
            .take(m)
            .map(|c| (self.ids[c.slot as usize], c.distance))
            .collect()
    }
}
