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

pub mod search;
pub use search::Search;

pub mod halt;
pub use halt::{Halt, HaltingConfig};

use crate::algorithm::Coherent;
use std::sync::Arc;

/// The Planner class spawns Search instances to find plans using its provided
/// algorithm.
///
/// The Planner::plan(start, environment) function will create a Search object
/// which manages the planning progress and allows you to tweak halting
/// settings during runtime as needed.
///
/// The Planner can also be given default halting behavior which will be passed
/// along to the Search when `plan(start, environment)` is used. The Halting
/// generic must implement the [`Halt`] trait for the algorithm's memory.
#[derive(Debug, Clone)]
pub struct Planner<Algo, Halting = ()> {
    /// The object which determines the search pattern
    algorithm: Arc<Algo>,

    /// The halting behavior given to each new search
    default_halting: Halting,
}

impl<Algo> Planner<Algo, ()> {
    /// Construct a new planner that has no halting behavior.
    pub fn new(algorithm: Algo) -> Self {
        Self {
            algorithm: Arc::new(algorithm),
            default_halting: (),
        }
    }
}

impl<Algo, Halting> Planner<Algo, Halting> {
    pub fn new_haltable(algorithm: Algo, halting: Halting) -> Self {
        Self {
            algorithm: Arc::new(algorithm),
            default_halting: halting,
        }
    }

    /// Consume this Planner and create a new Planner with a different default
    /// Halting value.
    pub fn with_halting<NewHalting>(self, halting: NewHalting) -> Planner<Algo, NewHalting> {
        Planner {
            algorithm: self.algorithm,
            default_halting: halting,
        }
    }

    pub fn algorithm(&self) -> &Algo {
        &self.algorithm
    }

    /// Begin planning from the start conditions inside the environment. The
    /// environment may be given by value or as `&mut` so the caller keeps
    /// ownership of it.
    pub fn plan<Start, Env>(
        &self,
        start: Start,
        environment: Env,
    ) -> Result<Search<Algo, Env, Halting>, Algo::InitError>
    where
        Algo: Coherent<Start, Env>,
        Halting: Halt<Algo::Memory> + Clone,
    {
        self.plan_with_halting(start, environment, self.default_halting.clone())
    }

    /// Begin planning from the start conditions using a custom halting
    /// behavior.
    pub fn plan_with_halting<Start, Env, WithHalt: Halt<Algo::Memory>>(
        &self,
        start: Start,
        environment: Env,
        halting: WithHalt,
    ) -> Result<Search<Algo, Env, WithHalt>, Algo::InitError>
    where
        Algo: Coherent<Start, Env>,
    {
        let memory = self.algorithm.initialize(start, &environment)?;
        Ok(Search::new(
            memory,
            self.algorithm.clone(),
            environment,
            halting,
        ))
    }
}
