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

use anyhow::{bail, Context};
use clap::Parser;
use mapf_astar::{
    algorithm::{AStar, ContinueAction, SearchStatus, Start},
    planner::{HaltingConfig, Planner},
    premade::{GridEnvironment, GridState, GridTask},
};
use serde::Serialize;
use std::{collections::BTreeMap, path::PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Plan one agent of a grid task file with A*
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Task file with the map and the agents
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the schedule
    #[arg(short, long)]
    output: PathBuf,

    /// Index of the agent to plan for
    #[arg(short, long, default_value_t = 0)]
    agent: usize,

    /// Expand the top of the open set even when an equal-cost node would
    /// continue the previous action
    #[arg(long)]
    no_continuation: bool,

    /// Give up after this many expansions
    #[arg(long)]
    step_limit: Option<usize>,

    /// Latest time step that a plan may use
    #[arg(long)]
    horizon: Option<i64>,
}

#[derive(Serialize)]
struct Statistics {
    cost: i64,
    fmin: i64,
    turns: usize,
    expanded: usize,
    discovered: usize,
}

#[derive(Serialize)]
struct Waypoint {
    x: i64,
    y: i64,
    t: i64,
}

#[derive(Serialize)]
struct Output {
    statistics: Statistics,
    schedule: BTreeMap<String, Vec<Waypoint>>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Unable to read task file {:?}", args.input))?;
    let task = GridTask::from_yaml_str(&text)?;
    let agent = task
        .agents
        .get(args.agent)
        .with_context(|| format!("The task has no agent with index {}", args.agent))?;

    let mut environment = GridEnvironment::new(&task.map, agent.goal);
    if let Some(horizon) = args.horizon {
        environment = environment.with_horizon(horizon);
    }

    let halting = HaltingConfig::<i64> {
        step_limit: args.step_limit,
        ..Default::default()
    }
    .into_halting();
    let planner = Planner::new_haltable(
        AStar(ContinueAction::new(!args.no_continuation)),
        halting,
    );

    let start = GridState::new(0, agent.start[0], agent.start[1]);
    let mut search = planner.plan(Start::new(start, 0), &mut environment)?;
    let status = search.solve()?;
    drop(search);

    let plan = match status {
        SearchStatus::Solved(plan) => plan,
        SearchStatus::Impossible => bail!("No plan exists for agent [{}]", agent.name),
        SearchStatus::Incomplete => bail!(
            "The search for agent [{}] was halted before finding a plan",
            agent.name
        ),
    };

    info!(
        agent = %agent.name,
        cost = plan.cost,
        turns = plan.turns(),
        expanded = environment.expanded(),
        "plan found"
    );

    let waypoints = plan
        .states
        .iter()
        .map(|(s, _)| Waypoint {
            x: s.x,
            y: s.y,
            t: s.time,
        })
        .collect();
    let output = Output {
        statistics: Statistics {
            cost: plan.cost,
            fmin: plan.fmin,
            turns: plan.turns(),
            expanded: environment.expanded(),
            discovered: environment.discovered(),
        },
        schedule: BTreeMap::from([(agent.name.clone(), waypoints)]),
    };

    let file = std::fs::File::create(&args.output)
        .with_context(|| format!("Unable to create output file {:?}", args.output))?;
    serde_yaml::to_writer(file, &output)?;
    Ok(())
}
