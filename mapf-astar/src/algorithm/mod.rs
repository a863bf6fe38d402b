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

pub mod a_star;
pub use a_star::{AStar, AStarSearchError, Memory, Start};

pub mod closed_set;
pub use closed_set::{ClosedSet, ClosedStatus, CloseResult};

pub mod continuation;
pub use continuation::{
    ContinuationConfig, ContinueAction, NoTiebreak, PlanarMove, Tiebreak, TimeExpanded,
};

pub mod open_set;
pub use open_set::{Handle, OpenSet, SearchNode};

pub mod plan;
pub use plan::PlanResult;

pub mod predecessor;
pub use predecessor::{Predecessor, PredecessorMap, RetraceError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus<Solution> {
    Incomplete,
    Impossible,
    Solved(Solution),
}

impl<S> SearchStatus<S> {
    pub fn incomplete(&self) -> bool {
        matches!(self, SearchStatus::Incomplete)
    }

    pub fn impossible(&self) -> bool {
        matches!(self, SearchStatus::Impossible)
    }

    pub fn solved(&self) -> bool {
        matches!(self, SearchStatus::Solved(_))
    }

    pub fn solution(self) -> Option<S> {
        match self {
            Self::Solved(solution) => Some(solution),
            _ => None,
        }
    }

    /// If the status contains a solution, apply a function to that solution.
    pub fn map<U, F: FnOnce(S) -> U>(self, op: F) -> SearchStatus<U> {
        match self {
            SearchStatus::Solved(solution) => SearchStatus::Solved(op(solution)),
            SearchStatus::Incomplete => SearchStatus::Incomplete,
            SearchStatus::Impossible => SearchStatus::Impossible,
        }
    }
}

impl<S> From<S> for SearchStatus<S> {
    fn from(value: S) -> Self {
        SearchStatus::Solved(value)
    }
}

/// An algorithm searches through an environment. The environment is kept
/// outside of the algorithm and handed to it for every call, so one algorithm
/// instance can serve any number of environments.
pub trait Algorithm<Env> {
    /// The `Memory` type tracks the progress of each search.
    type Memory;
}

/// The `Coherent` trait determines which start conditions an algorithm is
/// able to begin a search from.
pub trait Coherent<Start, Env>: Algorithm<Env> {
    type InitError;

    fn initialize(&self, start: Start, environment: &Env) -> Result<Self::Memory, Self::InitError>;
}

/// The `Solvable` trait defines how an algorithm makes progress on a search.
pub trait Solvable<Env>: Algorithm<Env> + Sized {
    /// The `Solution` type is what the Algorithm will return once it has found
    /// a valid solution.
    type Solution;

    /// A `StepError` will be returned when an issue is encountered during a
    /// step of the algorithm.
    type StepError;

    /// Take a step in the search algorithm. The same memory instance will be
    /// passed in with each iteration.
    fn step(
        &self,
        memory: &mut Self::Memory,
        environment: &mut Env,
    ) -> Result<SearchStatus<Self::Solution>, Self::StepError>;
}

// Implement the Algorithm traits for Arc<Algo> so that planners can always
// have a way to cheaply copy the algorithm.
use std::sync::Arc;

impl<Env, Algo: Algorithm<Env>> Algorithm<Env> for Arc<Algo> {
    type Memory = Algo::Memory;
}

impl<Start, Env, Algo: Coherent<Start, Env>> Coherent<Start, Env> for Arc<Algo> {
    type InitError = Algo::InitError;

    fn initialize(&self, start: Start, environment: &Env) -> Result<Self::Memory, Self::InitError> {
        self.as_ref().initialize(start, environment)
    }
}

impl<Env, Algo: Solvable<Env>> Solvable<Env> for Arc<Algo> {
    type Solution = Algo::Solution;
    type StepError = Algo::StepError;
    fn step(
        &self,
        memory: &mut Self::Memory,
        environment: &mut Env,
    ) -> Result<SearchStatus<Self::Solution>, Self::StepError> {
        self.as_ref().step(memory, environment)
    }
}

/// The `Measure` trait can be implemented by `Algorithm::Memory` types to
/// provide an indication of how large their current level of effort or memory
/// footprint is. This may be used to halt search efforts that have grown
/// excessively large.
pub trait Measure {
    /// How "big" is the current memory footprint or level of effort. The exact
    /// meaning of this value may vary between algorithms.
    fn size(&self) -> usize;
}

/// The `MinimumCostBound` trait can be implemented by `Algorithm::Memory` types
/// to report a minimum bound for the cost of any possible solution to a problem
/// if a solution exists. This can be used to halt search efforts if the cost
/// exceeds a certain bound.
///
/// Returning None implies that the minimum cost is unbounded (i.e. it could be
/// infinite or there might not be any solution at all). The [`CostLimit`](crate::planner::halt::CostLimit)
/// halting type will cause the Search to halt if the minimum cost bound is None
/// while the cost limit is Some.
pub trait MinimumCostBound {
    type Cost;
    fn minimum_cost_bound(&self) -> Option<Self::Cost>;
}
