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
    algorithm::{PlanarMove, TimeExpanded},
    domain::{Environment, Neighbor},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error as ThisError;

/// An agent occupying a grid cell at a discrete time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridState {
    pub time: i64,
    pub x: i64,
    pub y: i64,
}

impl GridState {
    pub fn new(time: i64, x: i64, y: i64) -> Self {
        Self { time, x, y }
    }

    pub fn cell(&self) -> [i64; 2] {
        [self.x, self.y]
    }
}

impl TimeExpanded for GridState {
    fn advanced(&self, dx: i64, dy: i64) -> Self {
        Self::new(self.time + 1, self.x + dx, self.y + dy)
    }

    fn position(&self) -> (i64, i64) {
        (self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridAction {
    Up,
    Down,
    Left,
    Right,
    Wait,
}

impl GridAction {
    /// Every action in the order that neighbors are generated
    pub const ALL: [GridAction; 5] = [
        GridAction::Wait,
        GridAction::Up,
        GridAction::Down,
        GridAction::Left,
        GridAction::Right,
    ];
}

impl PlanarMove for GridAction {
    fn displacement(&self) -> (i64, i64) {
        match self {
            GridAction::Up => (0, 1),
            GridAction::Down => (0, -1),
            GridAction::Left => (-1, 0),
            GridAction::Right => (1, 0),
            GridAction::Wait => (0, 0),
        }
    }
}

/// Forbids an agent from occupying a cell at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexConstraint {
    pub time: i64,
    pub x: i64,
    pub y: i64,
}

/// Forbids an agent from moving from `(x1, y1)` at `time` to `(x2, y2)` at
/// `time + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeConstraint {
    pub time: i64,
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

/// The constraints that a conflict resolver places on a single agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    pub vertex: HashSet<VertexConstraint>,
    pub edge: HashSet<EdgeConstraint>,
}

/// The map section of a task file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridMap {
    /// Width and height of the grid
    pub dimensions: [i64; 2],
    #[serde(default)]
    pub obstacles: Vec<[i64; 2]>,
}

impl GridMap {
    pub fn contains(&self, cell: [i64; 2]) -> bool {
        (0..self.dimensions[0]).contains(&cell[0]) && (0..self.dimensions[1]).contains(&cell[1])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTask {
    pub name: String,
    pub start: [i64; 2],
    pub goal: [i64; 2],
}

/// A task file: a map and the agents that need to cross it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridTask {
    pub map: GridMap,
    #[serde(default)]
    pub agents: Vec<AgentTask>,
}

#[derive(ThisError, Debug)]
pub enum GridMapError {
    #[error("Unable to parse the task:\n{0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("The map dimensions must be positive but were {0:?}")]
    InvalidDimensions([i64; 2]),
    #[error("The {endpoint} of agent [{agent}] at {cell:?} is outside of the map")]
    OutOfBounds {
        agent: String,
        endpoint: &'static str,
        cell: [i64; 2],
    },
    #[error("The {endpoint} of agent [{agent}] at {cell:?} is on an obstacle")]
    Blocked {
        agent: String,
        endpoint: &'static str,
        cell: [i64; 2],
    },
}

impl GridTask {
    pub fn from_yaml_str(text: &str) -> Result<Self, GridMapError> {
        let task: GridTask = serde_yaml::from_str(text)?;
        task.validate()?;
        Ok(task)
    }

    pub fn validate(&self) -> Result<(), GridMapError> {
        if self.map.dimensions.iter().any(|d| *d <= 0) {
            return Err(GridMapError::InvalidDimensions(self.map.dimensions));
        }

        for agent in &self.agents {
            for (endpoint, cell) in [("start", agent.start), ("goal", agent.goal)] {
                if !self.map.contains(cell) {
                    return Err(GridMapError::OutOfBounds {
                        agent: agent.name.clone(),
                        endpoint,
                        cell,
                    });
                }

                if self.map.obstacles.contains(&cell) {
                    return Err(GridMapError::Blocked {
                        agent: agent.name.clone(),
                        endpoint,
                        cell,
                    });
                }
            }
        }

        Ok(())
    }
}

/// A 4-connected grid expanded over time, as seen by one agent. Every action,
/// waiting included, costs one unit and the heuristic is the Manhattan
/// distance to the goal.
#[derive(Debug, Clone)]
pub struct GridEnvironment {
    dimensions: [i64; 2],
    obstacles: HashSet<[i64; 2]>,
    goal: [i64; 2],
    constraints: Constraints,
    /// The agent may only finish after the last time its goal is constrained
    last_goal_constraint: Option<i64>,
    horizon: Option<i64>,
    expanded: usize,
    discovered: usize,
}

impl GridEnvironment {
    pub fn new(map: &GridMap, goal: [i64; 2]) -> Self {
        Self {
            dimensions: map.dimensions,
            obstacles: map.obstacles.iter().copied().collect(),
            goal,
            constraints: Constraints::default(),
            last_goal_constraint: None,
            horizon: None,
            expanded: 0,
            discovered: 0,
        }
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.last_goal_constraint = constraints
            .vertex
            .iter()
            .filter(|c| [c.x, c.y] == self.goal)
            .map(|c| c.time)
            .max();
        self.constraints = constraints;
        self
    }

    /// States later than `horizon` are treated as invalid. This bounds the
    /// otherwise infinite time-expanded space so an unreachable goal ends the
    /// search instead of running forever.
    pub fn with_horizon(mut self, horizon: i64) -> Self {
        self.horizon = Some(horizon);
        self
    }

    pub fn goal(&self) -> [i64; 2] {
        self.goal
    }

    /// How many nodes have been chosen for expansion so far
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    /// How many times a node was discovered or improved so far
    pub fn discovered(&self) -> usize {
        self.discovered
    }

    pub fn reset_statistics(&mut self) {
        self.expanded = 0;
        self.discovered = 0;
    }

    fn transition_valid(&self, from: &GridState, to: &GridState) -> bool {
        !self.constraints.edge.contains(&EdgeConstraint {
            time: from.time,
            x1: from.x,
            y1: from.y,
            x2: to.x,
            y2: to.y,
        })
    }
}

impl Environment for GridEnvironment {
    type State = GridState;
    type Action = GridAction;
    type Cost = i64;

    fn admissible_heuristic(&self, state: &GridState) -> i64 {
        (state.x - self.goal[0]).abs() + (state.y - self.goal[1]).abs()
    }

    fn is_solution(&self, state: &GridState) -> bool {
        state.cell() == self.goal
            && self.last_goal_constraint.map_or(true, |t| state.time > t)
    }

    fn get_neighbors(
        &self,
        state: &GridState,
        neighbors: &mut Vec<Neighbor<GridState, GridAction, i64>>,
    ) {
        for action in GridAction::ALL {
            let (dx, dy) = action.displacement();
            let next = state.advanced(dx, dy);
            if self.state_valid(&next) && self.transition_valid(state, &next) {
                neighbors.push(Neighbor::new(next, action, 1));
            }
        }
    }

    fn on_expand_node(&mut self, _: &GridState, _: &i64, _: &i64) {
        self.expanded += 1;
    }

    fn on_discover(&mut self, _: &GridState, _: &i64, _: &i64) {
        self.discovered += 1;
    }

    fn state_valid(&self, state: &GridState) -> bool {
        (0..self.dimensions[0]).contains(&state.x)
            && (0..self.dimensions[1]).contains(&state.y)
            && !self.obstacles.contains(&state.cell())
            && self.horizon.map_or(true, |h| state.time <= h)
            && !self.constraints.vertex.contains(&VertexConstraint {
                time: state.time,
                x: state.x,
                y: state.y,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{AStar, ContinueAction, PlanResult};

    const TASK: &str = "
map:
  dimensions: [4, 3]
  obstacles:
    - [1, 1]
    - [2, 1]
agents:
  - name: agent0
    start: [0, 0]
    goal: [3, 2]
";

    fn corridor(length: i64) -> GridEnvironment {
        GridEnvironment::new(
            &GridMap { dimensions: [length, 1], obstacles: Vec::new() },
            [length - 1, 0],
        )
    }

    fn solve(environment: &mut GridEnvironment) -> PlanResult<GridState, GridAction, i64> {
        let mut plan = PlanResult::default();
        assert!(AStar(ContinueAction::default()).search(
            environment,
            GridState::new(0, 0, 0),
            &mut plan,
        ));
        plan
    }

    #[test]
    fn task_loads_from_yaml() {
        let task = GridTask::from_yaml_str(TASK).unwrap();
        assert_eq!(task.map.dimensions, [4, 3]);
        assert_eq!(task.map.obstacles, vec![[1, 1], [2, 1]]);
        assert_eq!(task.agents[0].goal, [3, 2]);

        let mut environment = GridEnvironment::new(&task.map, task.agents[0].goal);
        let plan = solve(&mut environment);
        assert_eq!(plan.cost, 5);
        assert!(plan.states.iter().all(|(s, _)| environment.state_valid(s)));
    }

    #[test]
    fn task_validation_catches_bad_agents() {
        let outside = TASK.replace("goal: [3, 2]", "goal: [4, 2]");
        assert!(matches!(
            GridTask::from_yaml_str(&outside),
            Err(GridMapError::OutOfBounds { endpoint: "goal", .. })
        ));

        let blocked = TASK.replace("start: [0, 0]", "start: [2, 1]");
        assert!(matches!(
            GridTask::from_yaml_str(&blocked),
            Err(GridMapError::Blocked { endpoint: "start", .. })
        ));

        let flat = TASK.replace("[4, 3]", "[4, 0]");
        assert!(matches!(
            GridTask::from_yaml_str(&flat),
            Err(GridMapError::InvalidDimensions([4, 0]))
        ));

        assert!(matches!(
            GridTask::from_yaml_str("map: [oops"),
            Err(GridMapError::Yaml(_))
        ));
    }

    #[test]
    fn neighbors_respect_bounds_and_obstacles() {
        let task = GridTask::from_yaml_str(TASK).unwrap();
        let environment = GridEnvironment::new(&task.map, [3, 2]);
        let mut neighbors = Vec::new();
        environment.get_neighbors(&GridState::new(0, 1, 0), &mut neighbors);
        let actions: Vec<_> = neighbors.iter().map(|n| n.action).collect();
        assert_eq!(actions, vec![GridAction::Wait, GridAction::Left, GridAction::Right]);
        assert!(neighbors.iter().all(|n| n.state.time == 1 && n.cost == 1));
        assert_eq!(environment.admissible_heuristic(&GridState::new(0, 1, 0)), 4);
    }

    #[test]
    fn vertex_constraint_forces_a_wait() {
        let mut constraints = Constraints::default();
        constraints.vertex.insert(VertexConstraint { time: 1, x: 1, y: 0 });
        let mut environment = corridor(3).with_constraints(constraints);
        let plan = solve(&mut environment);
        assert_eq!(plan.cost, 3);
        assert_eq!(plan.actions[0].0, GridAction::Wait);
        assert_eq!(plan.goal(), Some(&GridState::new(3, 2, 0)));
    }

    #[test]
    fn goal_constraint_delays_arrival() {
        let mut constraints = Constraints::default();
        constraints.vertex.insert(VertexConstraint { time: 4, x: 2, y: 0 });
        let mut environment = corridor(3).with_constraints(constraints);
        let plan = solve(&mut environment);
        assert_eq!(plan.cost, 5);
        assert_eq!(plan.goal(), Some(&GridState::new(5, 2, 0)));
    }

    #[test]
    fn edge_constraint_blocks_a_move() {
        let mut constraints = Constraints::default();
        constraints.edge.insert(EdgeConstraint { time: 0, x1: 0, y1: 0, x2: 1, y2: 0 });
        let mut environment = corridor(2).with_constraints(constraints);
        let plan = solve(&mut environment);
        assert_eq!(plan.cost, 2);
        assert_eq!(
            plan.actions.iter().map(|(a, _)| *a).collect::<Vec<_>>(),
            vec![GridAction::Wait, GridAction::Right]
        );
    }

    #[test]
    fn hooks_count_statistics() {
        let mut environment = corridor(4);
        solve(&mut environment);
        assert_eq!(environment.expanded(), 4);
        assert!(environment.discovered() >= 3);
        environment.reset_statistics();
        assert_eq!(environment.expanded(), 0);
    }
}
