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

use crate::algorithm::PlanarMove;
use num::traits::Zero;

/// The outcome of a search.
///
/// `states` runs from the start to the goal inclusive, each paired with its
/// accumulated cost. `actions` has one entry fewer: the action leading into
/// each state after the start, paired with the cost of that action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanResult<State, Action, Cost> {
    pub states: Vec<(State, Cost)>,
    pub actions: Vec<(Action, Cost)>,
    /// Total cost of the plan
    pub cost: Cost,
    /// f-score of the goal node at the moment the search ended. When the
    /// heuristic is admissible this is a lower bound on the optimal cost.
    pub fmin: Cost,
}

impl<State, Action, Cost: Zero> Default for PlanResult<State, Action, Cost> {
    fn default() -> Self {
        Self {
            states: Vec::new(),
            actions: Vec::new(),
            cost: Cost::zero(),
            fmin: Cost::zero(),
        }
    }
}

impl<State, Action, Cost: Clone> PlanResult<State, Action, Cost> {
    /// A plan that stays at `start` without taking any action.
    pub fn new(start: State, initial_cost: Cost) -> Self {
        Self {
            states: vec![(start, initial_cost.clone())],
            actions: Vec::new(),
            cost: initial_cost.clone(),
            fmin: initial_cost,
        }
    }

    pub fn reset(&mut self, start: State, initial_cost: Cost) {
        self.states.clear();
        self.actions.clear();
        self.states.push((start, initial_cost.clone()));
        self.cost = initial_cost.clone();
        self.fmin = initial_cost;
    }

    pub fn start(&self) -> Option<&State> {
        self.states.first().map(|(s, _)| s)
    }

    pub fn goal(&self) -> Option<&State> {
        self.states.last().map(|(s, _)| s)
    }

    /// Iterate over each action together with the state it arrives at.
    pub fn steps(&self) -> impl Iterator<Item = (&Action, &State)> {
        self.actions
            .iter()
            .zip(self.states.iter().skip(1))
            .map(|((a, _), (s, _))| (a, s))
    }
}

impl<State, Action: PlanarMove, Cost> PlanResult<State, Action, Cost> {
    /// Count how often the agent stops moving in the direction it was
    /// moving. Switching to another direction and stopping to wait both count
    /// as a turn. Starting to move after a wait does not.
    pub fn turns(&self) -> usize {
        self.actions
            .windows(2)
            .filter(|pair| {
                let previous = pair[0].0.displacement();
                previous != (0, 0) && previous != pair[1].0.displacement()
            })
            .count()
    }
}
