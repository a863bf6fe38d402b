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

/// One outgoing edge of a state, as reported by [`Environment::get_neighbors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Neighbor<State, Action, Cost> {
    /// The state that this edge leads to
    pub state: State,
    /// The action that was taken to arrive at the state
    pub action: Action,
    /// The cost of taking the action
    pub cost: Cost,
}

impl<State, Action, Cost> Neighbor<State, Action, Cost> {
    pub fn new(state: State, action: Action, cost: Cost) -> Self {
        Self { state, action, cost }
    }
}

/// The Environment describes the state space that a search is performed in.
/// It supplies the heuristic, the goal predicate, and the graph edges, and it
/// receives notifications about the progress of the search.
///
/// The environment is handed to each search call by the caller. A search only
/// ever mutates it through [`Environment::on_expand_node`] and
/// [`Environment::on_discover`].
pub trait Environment {
    /// How a location in the space is represented.
    type State;

    /// The kind of action that moves between states.
    type Action;

    /// How cost is represented. E.g. u32, i64, or Cost<f64>
    type Cost;

    /// A lower bound on the cost of reaching any goal from `state`. Returning
    /// zero is always valid and turns the search into a uniform-cost search.
    fn admissible_heuristic(&self, state: &Self::State) -> Self::Cost;

    /// Check whether `state` satisfies the goal.
    fn is_solution(&self, state: &Self::State) -> bool;

    /// Push every edge leaving `state` into `neighbors`. The buffer is cleared
    /// by the caller before this is invoked. When costs and heuristics tie,
    /// the order of the edges decides which state gets preferred.
    fn get_neighbors(
        &self,
        state: &Self::State,
        neighbors: &mut Vec<Neighbor<Self::State, Self::Action, Self::Cost>>,
    );

    /// Called each time a node is chosen for expansion.
    fn on_expand_node(
        &mut self,
        _state: &Self::State,
        _f_score: &Self::Cost,
        _g_score: &Self::Cost,
    ) {
    }

    /// Called each time a node is discovered or its scores are improved.
    fn on_discover(
        &mut self,
        _state: &Self::State,
        _f_score: &Self::Cost,
        _g_score: &Self::Cost,
    ) {
    }

    /// Check whether a state is admissible in the space. This is only used by
    /// tie-break strategies that synthesize states of their own.
    fn state_valid(&self, _state: &Self::State) -> bool {
        true
    }
}

impl<E: Environment + ?Sized> Environment for &mut E {
    type State = E::State;
    type Action = E::Action;
    type Cost = E::Cost;

    fn admissible_heuristic(&self, state: &Self::State) -> Self::Cost {
        (**self).admissible_heuristic(state)
    }

    fn is_solution(&self, state: &Self::State) -> bool {
        (**self).is_solution(state)
    }

    fn get_neighbors(
        &self,
        state: &Self::State,
        neighbors: &mut Vec<Neighbor<Self::State, Self::Action, Self::Cost>>,
    ) {
        (**self).get_neighbors(state, neighbors)
    }

    fn on_expand_node(&mut self, state: &Self::State, f_score: &Self::Cost, g_score: &Self::Cost) {
        (**self).on_expand_node(state, f_score, g_score)
    }

    fn on_discover(&mut self, state: &Self::State, f_score: &Self::Cost, g_score: &Self::Cost) {
        (**self).on_discover(state, f_score, g_score)
    }

    fn state_valid(&self, state: &Self::State) -> bool {
        (**self).state_valid(state)
    }
}
