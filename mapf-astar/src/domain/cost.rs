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

use float_ord::FloatOrd;
use num::traits::Zero;
use std::{
    cmp::Ordering,
    fmt::Debug,
    hash::{Hash, Hasher},
    ops::{Add, AddAssign, Sub, SubAssign},
};

/// The bound that the search core places on its cost type. Costs are added
/// along edges and subtracted when an open node's key is decreased, so any
/// totally ordered copyable number fits. Integers satisfy this directly. For
/// floating point values use [`Cost`].
pub trait SearchCost:
    Copy + Ord + Add<Output = Self> + Sub<Output = Self> + Zero + Debug
{
}

impl<T> SearchCost for T where
    T: Copy + Ord + Add<Output = T> + Sub<Output = T> + Zero + Debug
{
}

/// Use Cost(f64) or Cost(f32) to use floating point values as search costs,
/// giving them the traits of total ordering, full equivalence, and hashability.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cost<Num>(pub Num);

macro_rules! cost_impl {
    ($f:ident) => {
        impl Cost<$f> {
            fn ordered(self) -> FloatOrd<$f> {
                FloatOrd(self.0)
            }
        }

        impl From<$f> for Cost<$f> {
            fn from(value: $f) -> Self {
                Cost(value)
            }
        }

        impl PartialEq for Cost<$f> {
            fn eq(&self, other: &Self) -> bool {
                self.ordered() == other.ordered()
            }
        }
        impl Eq for Cost<$f> {}
        impl PartialOrd for Cost<$f> {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }
        impl Ord for Cost<$f> {
            fn cmp(&self, other: &Self) -> Ordering {
                self.ordered().cmp(&other.ordered())
            }
        }
        impl Hash for Cost<$f> {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.ordered().hash(state);
            }
        }
        impl Add for Cost<$f> {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Cost(self.0 + rhs.0)
            }
        }
        impl AddAssign for Cost<$f> {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }
        impl Sub for Cost<$f> {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Cost(self.0 - rhs.0)
            }
        }
        impl SubAssign for Cost<$f> {
            fn sub_assign(&mut self, rhs: Self) {
                self.0 -= rhs.0;
            }
        }
        impl Zero for Cost<$f> {
            fn zero() -> Self {
                Cost(0.0)
            }
            fn is_zero(&self) -> bool {
                self.0 == 0.0
            }
        }
    };
}

cost_impl!(f32);
cost_impl!(f64);
