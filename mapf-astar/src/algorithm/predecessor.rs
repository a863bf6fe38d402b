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

use thiserror::Error as ThisError;
use std::{collections::HashMap, hash::Hash};

/// How the best currently known path arrives at a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predecessor<State, Action, Cost> {
    /// The state that the path passes through right before
    pub state: State,
    /// The action taken from the predecessor state
    pub action: Action,
    /// The cost of that action alone
    pub action_cost: Cost,
    /// The accumulated cost from the start, including the action
    pub cost: Cost,
}

/// Maps each relaxed state to its [`Predecessor`]. A record gets replaced in
/// full whenever a strictly better path to its state is found. Records outlive
/// the open and closed status of their states.
#[derive(Debug, Clone)]
pub struct PredecessorMap<State, Action, Cost> {
    container: HashMap<State, Predecessor<State, Action, Cost>>,
}

impl<State, Action, Cost> Default for PredecessorMap<State, Action, Cost> {
    fn default() -> Self {
        Self {
            container: HashMap::new(),
        }
    }
}

/// The sequence of states and actions of a path, ordered from the start to the
/// goal. The start itself is not included.
pub type Retrace<State, Action, Cost> = (Vec<(State, Cost)>, Vec<(Action, Cost)>);

impl<State, Action, Cost> PredecessorMap<State, Action, Cost>
where
    State: Clone + Hash + Eq,
    Action: Clone,
    Cost: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the best path to `state`, returning the record it replaces.
    pub fn record(
        &mut self,
        state: State,
        predecessor: Predecessor<State, Action, Cost>,
    ) -> Option<Predecessor<State, Action, Cost>> {
        self.container.insert(state, predecessor)
    }

    pub fn get(&self, state: &State) -> Option<&Predecessor<State, Action, Cost>> {
        self.container.get(state)
    }

    /// The action that the best known path used to arrive at `state`.
    pub fn action_into(&self, state: &State) -> Option<&Action> {
        self.container.get(state).map(|p| &p.action)
    }

    pub fn len(&self) -> usize {
        self.container.len()
    }

    pub fn is_empty(&self) -> bool {
        self.container.is_empty()
    }

    /// Walk backwards from `goal` until reaching a state without a record,
    /// which is the start of the search.
    pub fn retrace(&self, goal: &State) -> Result<Retrace<State, Action, Cost>, RetraceError> {
        let mut states = Vec::new();
        let mut actions = Vec::new();
        let mut next = goal;
        while let Some(predecessor) = self.container.get(next) {
            if states.len() >= self.container.len() {
                return Err(RetraceError::Cycle(states.len()));
            }

            states.push((next.clone(), predecessor.cost.clone()));
            actions.push((predecessor.action.clone(), predecessor.action_cost.clone()));
            next = &predecessor.state;
        }

        states.reverse();
        actions.reverse();
        Ok((states, actions))
    }
}

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum RetraceError {
    #[error(
        "The predecessor chain of the goal loops back on itself after {0} steps. \
    This can only happen if the environment produced negative edge costs."
    )]
    Cycle(usize),
}
