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
    algorithm::{Algorithm, SearchStatus, Solvable},
    planner::halt::Halt,
};
use std::sync::Arc;

/// Search manages the progress of one planning effort inside one environment.
pub struct Search<Algo: Algorithm<Env>, Env, Halting> {
    /// Storage container for the progress of the search algorithm
    memory: Algo::Memory,

    /// The object which determines the search pattern
    algorithm: Arc<Algo>,

    /// The space being searched
    environment: Env,

    /// The options that moderate the progress of the solving
    halting: Halting,
}

impl<Algo: Algorithm<Env>, Env, Halting> Search<Algo, Env, Halting> {
    pub fn new(
        memory: Algo::Memory,
        algorithm: Arc<Algo>,
        environment: Env,
        halting: Halting,
    ) -> Self {
        Self {
            memory,
            algorithm,
            environment,
            halting,
        }
    }

    /// Tell the planner to attempt to solve the problem. This will run the
    /// step() function until a solution is found, the progress gets
    /// interrupted, or the algorithm determines that the problem is impossible
    /// to solve.
    pub fn solve(&mut self) -> Result<SearchStatus<Algo::Solution>, Algo::StepError>
    where
        Algo: Solvable<Env>,
        Halting: Halt<Algo::Memory>,
    {
        loop {
            if self.halting.halt(&self.memory) {
                return Ok(SearchStatus::Incomplete);
            }

            let result = self.step()?;
            if let SearchStatus::Incomplete = result {
                continue;
            }

            return Ok(result);
        }
    }

    pub fn step(&mut self) -> Result<SearchStatus<Algo::Solution>, Algo::StepError>
    where
        Algo: Solvable<Env>,
    {
        self.algorithm.step(&mut self.memory, &mut self.environment)
    }

    pub fn memory(&self) -> &Algo::Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Algo::Memory {
        &mut self.memory
    }

    pub fn environment(&self) -> &Env {
        &self.environment
    }

    /// Give the environment back, ending the search.
    pub fn into_environment(self) -> Env {
        self.environment
    }

    pub fn halting(&self) -> &Halting {
        &self.halting
    }

    pub fn halting_mut(&mut self) -> &mut Halting {
        &mut self.halting
    }

    /// Change the halting behavior for this progress.
    pub fn with_halting<NewHalt>(self, halting: NewHalt) -> Search<Algo, Env, NewHalt> {
        Search {
            memory: self.memory,
            algorithm: self.algorithm,
            environment: self.environment,
            halting,
        }
    }
}
