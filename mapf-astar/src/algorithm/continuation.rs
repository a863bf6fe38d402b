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

use crate::{
    algorithm::{Handle, OpenSet, PredecessorMap, SearchNode},
    domain::{Configurable, Environment},
};
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// A tie-break strategy gets to look at the node at the top of the open set
/// right before it is expanded and may nominate a different open node with
/// the same priority key to be expanded in its place. A strategy never
/// reorders or removes anything itself.
pub trait Tiebreak<E: Environment> {
    fn alternative(
        &self,
        environment: &E,
        start: &E::State,
        current: &SearchNode<E::State, E::Cost>,
        predecessors: &PredecessorMap<E::State, E::Action, E::Cost>,
        open_set: &OpenSet<E::State, E::Cost>,
    ) -> Option<Handle>;
}

/// Always expand the top of the open set.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTiebreak;

impl<E: Environment> Tiebreak<E> for NoTiebreak {
    fn alternative(
        &self,
        _: &E,
        _: &E::State,
        _: &SearchNode<E::State, E::Cost>,
        _: &PredecessorMap<E::State, E::Action, E::Cost>,
        _: &OpenSet<E::State, E::Cost>,
    ) -> Option<Handle> {
        None
    }
}

/// States of a time-expanded planar space.
pub trait TimeExpanded: Sized {
    /// The state one time step later, displaced by `(dx, dy)`.
    fn advanced(&self, dx: i64, dy: i64) -> Self;

    /// Planar coordinates of the state, ignoring time.
    fn position(&self) -> (i64, i64);
}

/// Actions that displace an agent within a plane. Waiting is a zero
/// displacement.
pub trait PlanarMove {
    fn displacement(&self) -> (i64, i64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuationConfig {
    pub enabled: bool,
}

impl Default for ContinuationConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Prefer to keep doing the same thing. When the node about to be expanded
/// was reached by switching actions, and repeating the previous action from
/// the same predecessor leads to a state that is open with exactly the same
/// f-score, that state is expanded instead.
///
/// Only the choice between equal f-scores is affected, so the cost of the
/// final plan does not change. Plans in time-expanded grids end up with fewer
/// spurious turns, which keeps conflicts between agents easier to resolve.
#[derive(Debug, Clone, Copy)]
pub struct ContinueAction {
    pub enabled: bool,
}

impl ContinueAction {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Default for ContinueAction {
    fn default() -> Self {
        Self::new(true)
    }
}

impl<E> Tiebreak<E> for ContinueAction
where
    E: Environment,
    E::State: TimeExpanded + Clone + Hash + Eq,
    E::Action: PlanarMove + Clone + PartialEq,
    E::Cost: Ord + Clone,
{
    fn alternative(
        &self,
        environment: &E,
        start: &E::State,
        current: &SearchNode<E::State, E::Cost>,
        predecessors: &PredecessorMap<E::State, E::Action, E::Cost>,
        open_set: &OpenSet<E::State, E::Cost>,
    ) -> Option<Handle> {
        if !self.enabled {
            return None;
        }

        // A parent that only waited at the start cell has no real previous
        // action to continue.
        let parent = predecessors.get(&current.state)?;
        if parent.state.position() == start.position() {
            return None;
        }

        let previous_action = predecessors.action_into(&parent.state)?;
        if *previous_action == parent.action {
            return None;
        }

        let (dx, dy) = previous_action.displacement();
        let continued = parent.state.advanced(dx, dy);
        if !environment.state_valid(&continued) {
            return None;
        }

        let handle = open_set.find(&continued)?;
        let candidate = open_set.get(handle)?;
        (candidate.f_score == current.f_score).then_some(handle)
    }
}

impl Configurable for ContinueAction {
    type Configuration = ContinuationConfig;
    fn configure<F>(self, f: F) -> Result<Self, anyhow::Error>
    where
        F: FnOnce(Self::Configuration) -> Result<Self::Configuration, anyhow::Error>,
    {
        let config = f(ContinuationConfig { enabled: self.enabled })?;
        Ok(Self::new(config.enabled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algorithm::Predecessor,
        premade::{GridAction, GridEnvironment, GridMap, GridState},
    };

    type Frontier = (
        OpenSet<GridState, i64>,
        PredecessorMap<GridState, GridAction, i64>,
    );

    fn environment(obstacles: Vec<[i64; 2]>) -> GridEnvironment {
        GridEnvironment::new(&GridMap { dimensions: [4, 4], obstacles }, [3, 3])
    }

    /// start -Right-> parent, then parent -Up-> turned and parent -Right-> straight
    fn frontier(straight_f: i64) -> (GridState, Handle, Handle, Frontier) {
        let start = GridState::new(0, 0, 0);
        let parent = GridState::new(1, 1, 0);
        let turned = GridState::new(2, 1, 1);
        let straight = GridState::new(2, 2, 0);

        let mut predecessors = PredecessorMap::new();
        predecessors.record(
            parent,
            Predecessor {
                state: start,
                action: GridAction::Right,
                action_cost: 1,
                cost: 1,
            },
        );
        predecessors.record(
            turned,
            Predecessor {
                state: parent,
                action: GridAction::Up,
                action_cost: 1,
                cost: 2,
            },
        );
        predecessors.record(
            straight,
            Predecessor {
                state: parent,
                action: GridAction::Right,
                action_cost: 1,
                cost: 2,
            },
        );

        let mut open_set = OpenSet::new();
        let turned_handle = open_set.push(turned, 6, 2);
        let straight_handle = open_set.push(straight, straight_f, 2);
        (start, turned_handle, straight_handle, (open_set, predecessors))
    }

    #[test]
    fn prefers_continuing_the_previous_action() {
        let (start, turned, straight, (open_set, predecessors)) = frontier(6);
        // Both nodes have identical keys, so the first one pushed stays on top
        let current = open_set.top().unwrap().clone();
        assert_eq!(current.handle, turned);

        let env = environment(Vec::new());
        let choice = ContinueAction::default().alternative(
            &env,
            &start,
            &current,
            &predecessors,
            &open_set,
        );
        assert_eq!(choice, Some(straight));

        let choice = NoTiebreak.alternative(&env, &start, &current, &predecessors, &open_set);
        assert_eq!(choice, None);

        let choice = ContinueAction::new(false).alternative(
            &env,
            &start,
            &current,
            &predecessors,
            &open_set,
        );
        assert_eq!(choice, None);
    }

    #[test]
    fn requires_an_exactly_equal_f_score() {
        let (start, _, _, (open_set, predecessors)) = frontier(7);
        let current = open_set.top().unwrap().clone();
        let choice = ContinueAction::default().alternative(
            &environment(Vec::new()),
            &start,
            &current,
            &predecessors,
            &open_set,
        );
        assert_eq!(choice, None);
    }

    #[test]
    fn ignores_nodes_whose_parent_is_the_start() {
        let start = GridState::new(0, 0, 0);
        let child = GridState::new(1, 0, 1);
        let mut predecessors = PredecessorMap::new();
        predecessors.record(
            child,
            Predecessor {
                state: start,
                action: GridAction::Up,
                action_cost: 1,
                cost: 1,
            },
        );
        let mut open_set = OpenSet::new();
        open_set.push(child, 6, 1);
        open_set.push(GridState::new(1, 1, 0), 6, 1);

        let current = open_set.top().unwrap().clone();
        let choice = ContinueAction::default().alternative(
            &environment(Vec::new()),
            &start,
            &current,
            &predecessors,
            &open_set,
        );
        assert_eq!(choice, None);
    }

    #[test]
    fn ignores_nodes_whose_parent_waited_at_the_start() {
        // start -Wait-> waited, then waited -Up-> moved and waited -Wait-> idle
        let start = GridState::new(0, 0, 0);
        let waited = GridState::new(1, 0, 0);
        let moved = GridState::new(2, 0, 1);
        let idle = GridState::new(2, 0, 0);

        let mut predecessors = PredecessorMap::new();
        predecessors.record(
            waited,
            Predecessor {
                state: start,
                action: GridAction::Wait,
                action_cost: 1,
                cost: 1,
            },
        );
        for (state, action) in [(moved, GridAction::Up), (idle, GridAction::Wait)] {
            predecessors.record(
                state,
                Predecessor {
                    state: waited,
                    action,
                    action_cost: 1,
                    cost: 2,
                },
            );
        }

        let mut open_set = OpenSet::new();
        let moved_handle = open_set.push(moved, 7, 2);
        open_set.push(idle, 7, 2);

        let current = open_set.top().unwrap().clone();
        assert_eq!(current.handle, moved_handle);
        let choice = ContinueAction::default().alternative(
            &environment(Vec::new()),
            &start,
            &current,
            &predecessors,
            &open_set,
        );
        assert_eq!(choice, None);
    }

    #[test]
    fn rejects_invalid_continuations() {
        // Continuing to the right from (1, 0) runs into the obstacle at (2, 0)
        let start = GridState::new(0, 0, 0);
        let parent = GridState::new(1, 1, 0);
        let turned = GridState::new(2, 1, 1);
        let blocked = GridState::new(2, 2, 0);

        let mut predecessors = PredecessorMap::new();
        predecessors.record(
            parent,
            Predecessor {
                state: start,
                action: GridAction::Right,
                action_cost: 1,
                cost: 1,
            },
        );
        predecessors.record(
            turned,
            Predecessor {
                state: parent,
                action: GridAction::Up,
                action_cost: 1,
                cost: 2,
            },
        );

        let mut open_set = OpenSet::new();
        open_set.push(turned, 6, 2);
        open_set.push(blocked, 6, 2);

        let current = open_set.top().unwrap().clone();
        let choice = ContinueAction::default().alternative(
            &environment(vec![[2,
            0]]),
            &start,
            &current,
            &predecessors,
            &open_set,
        );
        assert_eq!(choice, None);
    }

    #[test]
    fn configure_toggles_the_strategy() {
        let strategy = ContinueAction::default()
            .configure(|mut config| {
                config.enabled = false;
                Ok(config)
            })
            .unwrap();
        assert!(!strategy.enabled);
    }
}
