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

//! A best-first A* search core meant to sit underneath multi-agent planners
//! such as conflict-based search. The search is generic over the state space,
//! which is supplied through the [`Environment`] trait.
//!
//! ```
//! use mapf_astar::prelude::*;
//!
//! let map = GridMap { dimensions: [4, 4], obstacles: vec![[1, 1]] };
//! let mut environment = GridEnvironment::new(&map, [3, 3]);
//! let mut plan = PlanResult::default();
//! let astar = AStar(ContinueAction::default());
//! assert!(astar.search(&mut environment, GridState::new(0, 0, 0), &mut plan));
//! assert_eq!(plan.cost, 6);
//! ```

pub mod domain;
pub use domain::Environment;

pub mod algorithm;
pub use algorithm::AStar;

pub mod planner;
pub use planner::Planner;

pub mod premade;

pub mod prelude {
    pub use super::algorithm::{
        AStar, ContinueAction, NoTiebreak, PlanResult, SearchStatus, Solvable, Coherent, Start,
    };
    pub use super::domain::*;
    pub use super::planner::{halt::*, Planner, Search};
    pub use super::premade::*;
}
