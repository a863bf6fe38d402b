/*
 * Copyright (C) 2022 Open Source Robotics Foundation
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 *
*/

use std::{cmp::Ordering, collections::HashMap, hash::Hash};

/// A stable reference to a node that was pushed into an [`OpenSet`]. A handle
/// keeps referring to the same node no matter how the heap gets rearranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(usize);

impl Handle {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchNode<State, Cost> {
    pub state: State,
    /// g + h, the primary key of the open set
    pub f_score: Cost,
    /// Best known cost from the start
    pub g_score: Cost,
    pub handle: Handle,
}

impl<State, Cost: Ord> SearchNode<State, Cost> {
    /// Compare the expansion priority of two nodes. A node that should be
    /// expanded first compares as [`Ordering::Less`]. Lower f-scores come
    /// first, and among equal f-scores the node with the higher g-score wins.
    pub fn priority(&self, other: &Self) -> Ordering {
        self.f_score
            .cmp(&other.f_score)
            .then_with(|| other.g_score.cmp(&self.g_score))
    }
}

#[derive(Debug, Clone)]
struct Slot<State, Cost> {
    node: SearchNode<State, Cost>,
    /// Position of the node inside the heap, or None once it has been removed
    position: Option<usize>,
}

/// A binary min-heap of [`SearchNode`]s that supports decreasing the key of
/// any live node and removing any live node, both in O(log n).
///
/// Node data lives in an arena that is indexed by [`Handle`] while the heap
/// itself only shuffles handles around. The open set also carries the
/// discovery index: a map from each open state to its handle. A state is
/// dropped from the discovery index as soon as its node leaves the heap.
#[derive(Debug, Clone)]
pub struct OpenSet<State, Cost> {
    arena: Vec<Slot<State, Cost>>,
    heap: Vec<Handle>,
    discovered: HashMap<State, Handle>,
}

impl<State, Cost> Default for OpenSet<State, Cost> {
    fn default() -> Self {
        Self {
            arena: Vec::new(),
            heap: Vec::new(),
            discovered: HashMap::new(),
        }
    }
}

impl<State, Cost> OpenSet<State, Cost>
where
    State: Clone + Hash + Eq,
    Cost: Ord + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// How many nodes are currently open
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Insert a newly discovered state. The state must not already be open.
    pub fn push(&mut self, state: State, f_score: Cost, g_score: Cost) -> Handle {
        debug_assert!(!self.discovered.contains_key(&state));
        let handle = Handle(self.arena.len());
        let position = self.heap.len();
        self.discovered.insert(state.clone(), handle);
        self.arena.push(Slot {
            node: SearchNode {
                state,
                f_score,
                g_score,
                handle,
            },
            position: Some(position),
        });
        self.heap.push(handle);
        self.sift_up(position);
        handle
    }

    /// Look up the handle of a state if the state is currently open.
    pub fn find(&self, state: &State) -> Option<Handle> {
        self.discovered.get(state).copied()
    }

    /// Get the node of a handle if that node is still open.
    pub fn get(&self, handle: Handle) -> Option<&SearchNode<State, Cost>> {
        let slot = self.arena.get(handle.0)?;
        slot.position.map(|_| &slot.node)
    }

    /// Peek at the node with the highest expansion priority.
    pub fn top(&self) -> Option<&SearchNode<State, Cost>> {
        self.heap.first().map(|handle| &self.arena[handle.0].node)
    }

    /// Give an open node new scores. The new scores are expected to improve
    /// the node's priority, but the heap order is restored either way.
    ///
    /// Returns None if the handle does not refer to an open node.
    pub fn decrease_key(
        &mut self,
        handle: Handle,
        f_score: Cost,
        g_score: Cost,
    ) -> Option<&SearchNode<State, Cost>> {
        let slot = self.arena.get_mut(handle.0)?;
        let position = slot.position?;
        slot.node.f_score = f_score;
        slot.node.g_score = g_score;
        self.restore(position);
        Some(&self.arena[handle.0].node)
    }

    /// Remove and return the node with the highest expansion priority.
    pub fn pop_min(&mut self) -> Option<SearchNode<State, Cost>> {
        let top = *self.heap.first()?;
        self.remove(top)
    }

    /// Remove any open node. Every other handle stays valid.
    pub fn remove(&mut self, handle: Handle) -> Option<SearchNode<State, Cost>> {
        let position = self.arena.get_mut(handle.0)?.position.take()?;
        self.heap.swap_remove(position);
        if let Some(moved) = self.heap.get(position).copied() {
            self.arena[moved.0].position = Some(position);
            self.restore(position);
        }

        let node = self.arena[handle.0].node.clone();
        self.discovered.remove(&node.state);
        Some(node)
    }

    fn precedes(&self, lhs: usize, rhs: usize) -> bool {
        let lhs = &self.arena[self.heap[lhs].0].node;
        let rhs = &self.arena[self.heap[rhs].0].node;
        lhs.priority(rhs) == Ordering::Less
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.arena[self.heap[a].0].position = Some(a);
        self.arena[self.heap[b].0].position = Some(b);
    }

    fn restore(&mut self, position: usize) {
        let position = self.sift_up(position);
        self.sift_down(position);
    }

    fn sift_up(&mut self, mut position: usize) -> usize {
        while position > 0 {
            let parent = (position - 1) / 2;
            if !self.precedes(position, parent) {
                break;
            }
            self.swap(position, parent);
            position = parent;
        }
        position
    }

    fn sift_down(&mut self, mut position: usize) {
        loop {
            let left = 2 * position + 1;
            let right = left + 1;
            let mut best = position;
            if left < self.heap.len() && self.precedes(left, best) {
                best = left;
            }
            if right < self.heap.len() && self.precedes(right, best) {
                best = right;
            }
            if best == position {
                return;
            }
            self.swap(position, best);
            position = best;
        }
    }
}
