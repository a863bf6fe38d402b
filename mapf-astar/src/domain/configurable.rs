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

use serde::de::DeserializeOwned;

/// Algorithms and search strategies whose parameters can be adjusted after
/// construction. The callback receives the current configuration and returns
/// the one to apply.
pub trait Configurable: Sized {
    type Configuration;

    fn configure<F>(self, f: F) -> Result<Self, anyhow::Error>
    where
        F: FnOnce(Self::Configuration) -> Result<Self::Configuration, anyhow::Error>;

    /// Replace the configuration with one parsed from YAML.
    fn configure_from_yaml(self, text: &str) -> Result<Self, anyhow::Error>
    where
        Self::Configuration: DeserializeOwned,
    {
        let config: Self::Configuration = serde_yaml::from_str(text)?;
        self.configure(|_| Ok(config))
    }
}
