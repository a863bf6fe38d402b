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

use std::{collections::HashSet, hash::Hash};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseResult {
    /// The state was successfully closed. This state was never previously
    /// closed.
    Accepted,

    /// The state was already closed. Closing is permanent, so nothing changed.
    Rejected,
}

impl CloseResult {
    pub fn accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    pub fn rejected(&self) -> bool {
        matches!(self, Self::Rejected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedStatus {
    /// The state has never been expanded.
    Open,

    /// The state has been expanded and may not be expanded again.
    Closed,
}

impl ClosedStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    pub fn is_closed(&self) -> bool {
        !self.is_open()
    }
}

/// The set of states that have been expanded. A closed state is never opened
/// again, which is only sound for consistent heuristics.
#[derive(Debug, Clone)]
pub struct ClosedSet<State> {
    container: HashSet<State>,
}

impl<State> Default for ClosedSet<State> {
    fn default() -> Self {
        Self {
            container: HashSet::new(),
        }
    }
}

impl<State: Hash + Eq> ClosedSet<State> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn close(&mut self, state: State) -> CloseResult {
        if self.container.insert(state) {
            CloseResult::Accepted
        } else {
            CloseResult::Rejected
        }
    }

    pub fn status(&self, state: &State) -> ClosedStatus {
        if self.container.contains(state) {
            ClosedStatus::Closed
        } else {
            ClosedStatus::Open
        }
    }

    pub fn is_closed(&self, state: &State) -> bool {
        self.status(state).is_closed()
    }

    pub fn len(&self) -> usize {
        self.container.len()
    }

    pub fn is_empty(&self) -> bool {
        self.container.is_empty()
    }
}
