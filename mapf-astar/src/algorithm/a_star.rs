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
    algorithm::{
        Algorithm, ClosedSet, Coherent, Handle, Measure, MinimumCostBound, NoTiebreak, OpenSet,
        PlanResult, Predecessor, PredecessorMap, RetraceError, SearchNode, SearchStatus, Solvable,
        Tiebreak,
    },
    domain::{Configurable, Environment, Neighbor, SearchCost},
};
use std::{convert::Infallible, fmt::Debug, hash::Hash};
use tracing::{debug, error, trace};

/// The AStar algorithm searches any [`Environment`] whose cost type satisfies
/// [`SearchCost`]. The wrapped value is the [`Tiebreak`] strategy that gets
/// consulted before each expansion; use [`NoTiebreak`] for plain A*.
///
/// States are expanded at most once. That keeps the search optimal as long as
/// the heuristic is consistent. An inconsistent heuristic yields a valid but
/// possibly suboptimal plan.
#[derive(Default, Debug, Clone)]
pub struct AStar<T = NoTiebreak>(pub T);

/// Where a search begins and how much cost has already been spent to get there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Start<State, Cost> {
    pub state: State,
    pub initial_cost: Cost,
}

impl<State, Cost> Start<State, Cost> {
    pub fn new(state: State, initial_cost: Cost) -> Self {
        Self { state, initial_cost }
    }
}

impl<State, Cost: num::Zero> Start<State, Cost> {
    pub fn at(state: State) -> Self {
        Self::new(state, Cost::zero())
    }
}

#[derive(Debug)]
pub struct Memory<State, Action, Cost> {
    pub start: State,
    pub initial_cost: Cost,
    pub open_set: OpenSet<State, Cost>,
    pub closed_set: ClosedSet<State>,
    pub predecessors: PredecessorMap<State, Action, Cost>,
    neighbors: Vec<Neighbor<State, Action, Cost>>,
}

impl<State, Action, Cost> Memory<State, Action, Cost>
where
    State: Clone + Hash + Eq,
    Action: Clone,
    Cost: SearchCost,
{
    fn new(start: State, initial_cost: Cost) -> Self {
        Self {
            start,
            initial_cost,
            open_set: OpenSet::new(),
            closed_set: ClosedSet::new(),
            predecessors: PredecessorMap::new(),
            neighbors: Vec::with_capacity(10),
        }
    }

    fn plan_to(
        &self,
        goal: &SearchNode<State, Cost>,
    ) -> Result<PlanResult<State, Action, Cost>, RetraceError> {
        let (states, actions) = self.predecessors.retrace(&goal.state)?;
        let mut plan = PlanResult::new(self.start.clone(), self.initial_cost);
        plan.states.extend(states);
        plan.actions = actions;
        plan.cost = goal.g_score;
        plan.fmin = goal.f_score;
        Ok(plan)
    }
}

impl<State, Action, Cost> Measure for Memory<State, Action, Cost>
where
    State: Clone + Hash + Eq,
    Cost: Ord + Clone,
{
    fn size(&self) -> usize {
        self.open_set.len()
    }
}

impl<State, Action, Cost> MinimumCostBound for Memory<State, Action, Cost>
where
    State: Clone + Hash + Eq,
    Cost: Ord + Clone,
{
    type Cost = Cost;
    fn minimum_cost_bound(&self) -> Option<Self::Cost> {
        self.open_set.top().map(|node| node.f_score.clone())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AStarSearchError {
    #[error(
        "An open set handle [{0:?}] no longer refers to an open node. \
    This is a critical implementation error, please report this to the mapf-astar developers."
    )]
    BrokenHandle(Handle),
    #[error("Unable to reconstruct the plan:\n{0}")]
    Retrace(#[from] RetraceError),
}

impl<T> AStar<T> {
    pub fn new(tiebreak: T) -> Self {
        AStar(tiebreak)
    }

    /// Search from `start` with an initial cost of zero. See
    /// [`AStar::search_with_cost`].
    pub fn search<E>(
        &self,
        environment: &mut E,
        start: E::State,
        solution: &mut PlanResult<E::State, E::Action, E::Cost>,
    ) -> bool
    where
        E: Environment,
        E::State: Clone + Hash + Eq + Debug,
        E::Action: Clone,
        E::Cost: SearchCost,
        T: Tiebreak<E>,
    {
        self.search_with_cost(environment, start, solution, num::Zero::zero())
    }

    /// Run a search to completion. Returns true if a goal was reached, in which
    /// case `solution` holds the plan to it. Otherwise `solution` is left
    /// holding only the start state.
    pub fn search_with_cost<E>(
        &self,
        environment: &mut E,
        start: E::State,
        solution: &mut PlanResult<E::State, E::Action, E::Cost>,
        initial_cost: E::Cost,
    ) -> bool
    where
        E: Environment,
        E::State: Clone + Hash + Eq + Debug,
        E::Action: Clone,
        E::Cost: SearchCost,
        T: Tiebreak<E>,
    {
        solution.reset(start.clone(), initial_cost);
        let mut memory = match self.initialize(Start::new(start, initial_cost), &*environment) {
            Ok(memory) => memory,
            Err(err) => match err {},
        };

        loop {
            match self.step(&mut memory, environment) {
                Ok(SearchStatus::Incomplete) => continue,
                Ok(SearchStatus::Impossible) => return false,
                Ok(SearchStatus::Solved(plan)) => {
                    *solution = plan;
                    return true;
                }
                Err(err) => {
                    error!("A* search aborted: {err}");
                    return false;
                }
            }
        }
    }

    /// Relax every neighbor of `current` into the open set.
    #[inline]
    fn expand<E>(
        memory: &mut Memory<E::State, E::Action, E::Cost>,
        environment: &mut E,
        current: &SearchNode<E::State, E::Cost>,
    ) -> Result<(), AStarSearchError>
    where
        E: Environment,
        E::State: Clone + Hash + Eq + Debug,
        E::Action: Clone,
        E::Cost: SearchCost,
    {
        let Memory {
            open_set,
            closed_set,
            predecessors,
            neighbors,
            ..
        } = memory;

        neighbors.clear();
        environment.get_neighbors(&current.state, neighbors);
        for Neighbor { state, action, cost } in neighbors.drain(..) {
            if closed_set.is_closed(&state) {
                continue;
            }

            let tentative_g = current.g_score + cost;
            match open_set.find(&state) {
                None => {
                    let f_score = tentative_g + environment.admissible_heuristic(&state);
                    trace!(?state, ?f_score, g_score = ?tentative_g, "discovered");
                    open_set.push(state.clone(), f_score, tentative_g);
                    environment.on_discover(&state, &f_score, &tentative_g);
                }
                Some(handle) => {
                    let (prior_f, prior_g) = open_set
                        .get(handle)
                        .map(|node| (node.f_score, node.g_score))
                        .ok_or(AStarSearchError::BrokenHandle(handle))?;
                    if tentative_g >= prior_g {
                        // The state was already reached through an equal or
                        // better path.
                        continue;
                    }

                    let f_score = prior_f - (prior_g - tentative_g);
                    trace!(?state, ?f_score, g_score = ?tentative_g, "improved");
                    let node = open_set
                        .decrease_key(handle, f_score, tentative_g)
                        .ok_or(AStarSearchError::BrokenHandle(handle))?;
                    environment.on_discover(&node.state, &node.f_score, &node.g_score);
                }
            }

            predecessors.record(
                state,
                Predecessor {
                    state: current.state.clone(),
                    action,
                    action_cost: cost,
                    cost: tentative_g,
                },
            );
        }

        Ok(())
    }
}

impl<E, T> Algorithm<E> for AStar<T>
where
    E: Environment,
{
    type Memory = Memory<E::State, E::Action, E::Cost>;
}

impl<E, T> Coherent<Start<E::State, E::Cost>, E> for AStar<T>
where
    E: Environment,
    E::State: Clone + Hash + Eq,
    E::Action: Clone,
    E::Cost: SearchCost,
{
    type InitError = Infallible;

    fn initialize(
        &self,
        start: Start<E::State, E::Cost>,
        environment: &E,
    ) -> Result<Self::Memory, Self::InitError> {
        let mut memory = Memory::new(start.state.clone(), start.initial_cost);
        let f_score = start.initial_cost + environment.admissible_heuristic(&start.state);
        memory.open_set.push(start.state, f_score, start.initial_cost);
        Ok(memory)
    }
}

impl<E, T> Solvable<E> for AStar<T>
where
    E: Environment,
    E::State: Clone + Hash + Eq + Debug,
    E::Action: Clone,
    E::Cost: SearchCost,
    T: Tiebreak<E>,
{
    type Solution = PlanResult<E::State, E::Action, E::Cost>;
    type StepError = AStarSearchError;

    fn step(
        &self,
        memory: &mut Self::Memory,
        environment: &mut E,
    ) -> Result<SearchStatus<Self::Solution>, Self::StepError> {
        let top = match memory.open_set.top() {
            Some(top) => top,
            None => {
                debug!(
                    closed = memory.closed_set.len(),
                    "open set exhausted without reaching a goal"
                );
                return Ok(SearchStatus::Impossible);
            }
        };

        let chosen = match self.0.alternative(
            &*environment,
            &memory.start,
            top,
            &memory.predecessors,
            &memory.open_set,
        ) {
            Some(alternative) => {
                debug!(
                    top = ?top.state,
                    alternative = ?memory.open_set.get(alternative).map(|n| &n.state),
                    "expanding an equal-cost alternative to the top of the open set"
                );
                alternative
            }
            None => top.handle,
        };

        let current = memory
            .open_set
            .get(chosen)
            .cloned()
            .ok_or(AStarSearchError::BrokenHandle(chosen))?;

        trace!(
            state = ?current.state,
            f_score = ?current.f_score,
            g_score = ?current.g_score,
            "expanding"
        );
        environment.on_expand_node(&current.state, &current.f_score, &current.g_score);

        if environment.is_solution(&current.state) {
            let plan = memory.plan_to(&current)?;
            debug!(
                goal = ?current.state,
                cost = ?plan.cost,
                closed = memory.closed_set.len(),
                "goal reached"
            );
            return Ok(SearchStatus::Solved(plan));
        }

        memory
            .open_set
            .remove(chosen)
            .ok_or(AStarSearchError::BrokenHandle(chosen))?;
        memory.closed_set.close(current.state.clone());

        Self::expand(memory, environment, &current)?;
        Ok(SearchStatus::Incomplete)
    }
}

impl<T: Configurable> Configurable for AStar<T> {
    type Configuration = T::Configuration;
    fn configure<F>(self, f: F) -> Result<Self, anyhow::Error>
    where
        F: FnOnce(Self::Configuration) -> Result<Self::Configuration, anyhow::Error>,
    {
        Ok(AStar(self.0.configure(f)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A small directed graph whose states are vertex indices
    struct Graph {
        edges: Vec<Vec<(usize, u32)>>,
        goal: usize,
        heuristic: Vec<u32>,
        discoveries: Vec<(usize, u32, u32)>,
    }

    impl Graph {
        fn new(edges: Vec<Vec<(usize, u32)>>, goal: usize) -> Self {
            let heuristic = vec![0; edges.len()];
            Self {
                edges,
                goal,
                heuristic,
                discoveries: Vec::new(),
            }
        }
    }

    impl Environment for Graph {
        type State = usize;
        type Action = (usize, usize);
        type Cost = u32;

        fn admissible_heuristic(&self, state: &usize) -> u32 {
            self.heuristic[*state]
        }

        fn is_solution(&self, state: &usize) -> bool {
            *state == self.goal
        }

        fn get_neighbors(&self, state: &usize, neighbors: &mut Vec<Neighbor<usize, (usize, usize), u32>>) {
            for (to, cost) in &self.edges[*state] {
                neighbors.push(Neighbor::new(*to, (*state, *to), *cost));
            }
        }

        fn on_discover(&mut self, state: &usize, f_score: &u32, g_score: &u32) {
            self.discoveries.push((*state, *f_score, *g_score));
        }
    }

    #[test]
    fn step_by_step_reaches_goal() {
        // 0 --1--> 1 --1--> 2
        let mut graph = Graph::new(vec![vec![(1, 1)], vec![(2, 1)], vec![]], 2);
        let astar = AStar(NoTiebreak);
        let mut memory = astar.initialize(Start::at(0), &graph).unwrap();
        assert_eq!(memory.size(), 1);
        assert_eq!(memory.minimum_cost_bound(), Some(0));

        assert!(astar.step(&mut memory, &mut graph).unwrap().incomplete());
        assert!(memory.closed_set.is_closed(&0));
        assert!(astar.step(&mut memory, &mut graph).unwrap().incomplete());
        let plan = astar.step(&mut memory, &mut graph).unwrap().solution().unwrap();
        assert_eq!(plan.states, vec![(0, 0), (1, 1), (2, 2)]);
        assert_eq!(plan.actions, vec![((0, 1), 1), ((1, 2), 1)]);
        assert_eq!(plan.cost, 2);
        assert_eq!(plan.fmin, 2);
    }

    #[test]
    fn cheaper_path_replaces_first_discovery() {
        // 0 -> 1 (5), 0 -> 2 (1), 2 -> 1 (1), 1 -> 3 (1)
        let mut graph = Graph::new(
            vec![vec![(1, 5), (2, 1)], vec![(3, 1)], vec![(1, 1)], vec![]],
            1,
        );
        let mut plan = PlanResult::default();
        assert!(AStar(NoTiebreak).search(&mut graph, 0, &mut plan));
        assert_eq!(plan.states, vec![(0, 0), (2, 1), (1, 2)]);
        assert_eq!(plan.cost, 2);
        assert_eq!(graph.discoveries, vec![(1, 5, 5), (2, 1, 1), (1, 2, 2)]);
    }

    #[test]
    fn key_decrease_keeps_heuristic_offset() {
        let mut graph = Graph::new(
            vec![vec![(1, 5), (2, 1)], vec![], vec![(1, 1)]],
            1,
        );
        graph.heuristic = vec![2, 0, 1];
        let mut plan = PlanResult::default();
        assert!(AStar(NoTiebreak).search(&mut graph, 0, &mut plan));
        // First reached with g = 5, then improved to g = 2 through vertex 2
        assert_eq!(graph.discoveries.last(), Some(&(1, 2, 2)));
        assert_eq!(plan.cost, 2);
        assert_eq!(plan.fmin, 2);
    }

    #[test]
    fn initial_cost_carries_through() {
        let mut graph = Graph::new(vec![vec![(1, 3)], vec![]], 1);
        let mut plan = PlanResult::default();
        assert!(AStar(NoTiebreak).search_with_cost(&mut graph, 0, &mut plan, 10));
        assert_eq!(plan.states, vec![(0, 10), (1, 13)]);
        assert_eq!(plan.cost, 13);
    }

    #[test]
    fn start_that_is_a_goal_yields_trivial_plan() {
        let mut graph = Graph::new(vec![vec![(1, 3)], vec![]], 0);
        let mut plan = PlanResult::default();
        assert!(AStar(NoTiebreak).search_with_cost(&mut graph, 0, &mut plan, 4));
        assert_eq!(plan.states, vec![(0, 4)]);
        assert!(plan.actions.is_empty());
        assert_eq!(plan.cost, 4);
    }

    #[test]
    fn exhausted_search_leaves_only_start() {
        let mut graph = Graph::new(vec![vec![(1, 1)], vec![(0, 1)], vec![]], 2);
        let mut plan = PlanResult::new(1, 99);
        plan.actions.push(((7, 7), 7));
        assert!(!AStar(NoTiebreak).search_with_cost(&mut graph, 0, &mut plan, 3));
        assert_eq!(plan.states, vec![(0, 3)]);
        assert!(plan.actions.is_empty());
        assert_eq!(plan.cost, 3);
    }
}
