/*
 * Copyright (C) 2023 Open Source Robotics Foundation
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

use crate::algorithm::{Measure, MinimumCostBound};
use serde::{Deserialize, Serialize};
use std::{ops::Fn, sync::Arc};

/// A trait to define conditions in which a search should be halted. The
/// settings can be changed in between calls to Search::solve().
pub trait Halt<Mem>: Clone {
    /// Check whether the current search should be interrupted.
    fn halt(&mut self, memory: &Mem) -> bool;
}

/// If an empty tuple is given for the options then we treat that as an
/// indication that we should let the solver continue without halting for any
/// reason.
impl<Mem> Halt<Mem> for () {
    fn halt(&mut self, _: &Mem) -> bool {
        false
    }
}

/// Tell the planner to interrupt its attempt to solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Interruption {
    Continue,
    Stop,
}

/// Signature for an object that can interrupt the planner.
pub type Interrupter = Arc<dyn Fn() -> Interruption + Send + Sync>;

/// This option allows the user to specify a callback to indicate whether the
/// progress should continue. A deadline check belongs here.
#[derive(Clone)]
pub struct Interruptible(pub Option<Interrupter>);

impl Interruptible {
    pub fn new<F: Fn() -> Interruption + Send + Sync + 'static>(f: F) -> Self {
        Self(Some(Arc::new(f)))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl<Mem> Halt<Mem> for Interruptible {
    fn halt(&mut self, _: &Mem) -> bool {
        match &self.0 {
            Some(interrupter) => Interruption::Stop == interrupter(),
            None => false,
        }
    }
}

/// This option sets a maximum number of steps that can be taken before the
/// planner is told to halt.
#[derive(Debug, Clone)]
pub struct StepLimit {
    steps: usize,
    pub limit: Option<usize>,
}

impl StepLimit {
    pub fn new(limit: Option<usize>) -> Self {
        Self { steps: 0, limit }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn reset(&mut self) {
        self.steps = 0;
    }
}

impl<Mem> Halt<Mem> for StepLimit {
    fn halt(&mut self, _: &Mem) -> bool {
        self.steps += 1;
        if let Some(limit) = self.limit {
            return self.steps > limit;
        }

        false
    }
}

/// The maximum size that the Memory's Measure can reach before the
/// solve attempt quits. For A* this is a limit on the size of the open set.
#[derive(Debug, Default, Clone)]
pub struct MeasureLimit(pub Option<usize>);

impl<Mem: Measure> Halt<Mem> for MeasureLimit {
    fn halt(&mut self, memory: &Mem) -> bool {
        if let Some(limit) = self.0 {
            return memory.size() > limit;
        }

        false
    }
}

/// If the lower cost bound of the search exceeds this cost limit then the
/// search will halt.
#[derive(Debug, Default, Clone)]
pub struct CostLimit<C>(pub Option<C>);

impl<Mem: MinimumCostBound> Halt<Mem> for CostLimit<Mem::Cost>
where
    Mem::Cost: Clone + PartialOrd,
{
    fn halt(&mut self, memory: &Mem) -> bool {
        if let Some(limit) = &self.0 {
            match memory.minimum_cost_bound() {
                Some(bound) => return bound > *limit,
                None => return true,
            }
        }

        false
    }
}

/// Tuples of Halt<M> will also implement Halt<M>. The search halts as soon as
/// any element of the tuple says so. We currently limit the tuple size to 8
/// elements, but that limit can be overcome using nested tuples.
macro_rules! or_tuple_halt {
    ( $( $name:ident )+ ) => {
        paste::item! {
            impl<Mem, $($name: Halt<Mem>),+> Halt<Mem> for ($($name,)+) {
                fn halt(
                    &mut self,
                    memory: &Mem,
                ) -> bool {
                    let ($([<$name:lower>],)+) = self;
                    false $(|| [<$name:lower>].halt(memory))+
                }
            }
        }
    };
}

or_tuple_halt! { A }
or_tuple_halt! { A B }
or_tuple_halt! { A B C }
or_tuple_halt! { A B C D }
or_tuple_halt! { A B C D E }
or_tuple_halt! { A B C D E F }
or_tuple_halt! { A B C D E F G }
or_tuple_halt! { A B C D E F G H }

/// Serializable description of the limits to put on a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HaltingConfig<C> {
    pub step_limit: Option<usize>,
    pub measure_limit: Option<usize>,
    pub cost_limit: Option<C>,
}

impl<C> Default for HaltingConfig<C> {
    fn default() -> Self {
        Self {
            step_limit: None,
            measure_limit: None,
            cost_limit: None,
        }
    }
}

impl<C> HaltingConfig<C> {
    pub fn into_halting(self) -> (StepLimit, MeasureLimit, CostLimit<C>) {
        (
            StepLimit::new(self.step_limit),
            MeasureLimit(self.measure_limit),
            CostLimit(self.cost_limit),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeMem {
        size: usize,
        bound: Option<u32>,
    }

    impl Measure for FakeMem {
        fn size(&self) -> usize {
            self.size
        }
    }

    impl MinimumCostBound for FakeMem {
        type Cost = u32;
        fn minimum_cost_bound(&self) -> Option<u32> {
            self.bound
        }
    }

    const MEM: FakeMem = FakeMem { size: 0, bound: Some(0) };

    #[test]
    fn test_tuple_options() {
        let mut halting = (
            Interruptible::new(|| Interruption::Continue),
            StepLimit::new(Some(10)),
        );

        assert!(!halting.halt(&MEM));

        let mut halting = (
            Interruptible::new(|| Interruption::Continue),
            StepLimit::new(Some(5)),
            MeasureLimit(Some(100)),
        );

        for _ in 0..5 {
            assert!(!halting.halt(&MEM));
        }
        assert!(halting.halt(&MEM));
    }

    #[test]
    fn measure_and_cost_limits() {
        let mut measure = MeasureLimit(Some(3));
        assert!(!measure.halt(&FakeMem { size: 3, bound: None }));
        assert!(measure.halt(&FakeMem { size: 4, bound: None }));

        let mut cost = CostLimit(Some(10u32));
        assert!(!cost.halt(&FakeMem { size: 0, bound: Some(10) }));
        assert!(cost.halt(&FakeMem { size: 0, bound: Some(11) }));
        assert!(cost.halt(&FakeMem { size: 0, bound: None }));
        assert!(!CostLimit::<u32>(None).halt(&FakeMem { size: 0, bound: None }));
    }

    #[test]
    fn halting_config_from_yaml() {
        let config: HaltingConfig<u32> =
            serde_yaml::from_str("step_limit: 40\ncost_limit: 12\n").unwrap();
        assert_eq!(
            config,
            HaltingConfig { step_limit: Some(40), measure_limit: None, cost_limit: Some(12) }
        );

        let (mut steps, mut measure, mut cost) = config.into_halting();
        assert_eq!(steps.limit, Some(40));
        assert!(!measure.halt(&FakeMem { size: usize::MAX, bound: None }));
        assert!(cost.halt(&FakeMem { size: 0, bound: Some(13) }));
        steps.reset();
        assert_eq!(steps.steps(), 0);
    }
}
