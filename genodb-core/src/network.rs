// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Network Identities
//!
//! Static description of the cluster: named groups of storage nodes. The
//! description is loaded once at startup and never changes afterwards.
//!
//! ```json
//! {
//!   "groups": [
//!     { "name": "rack-a", "nodes": [ { "hostname": "a1", "port": 7400 } ] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{GenoDbError, Result};

/// A storage node's network identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeInfo {
    pub hostname: String,
    pub port: u16,
}

impl NodeInfo {
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            port,
        }
    }
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hostname, self.port)
    }
}

/// A named group of storage nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<NodeInfo>,
}

impl GroupInfo {
    pub fn new(name: impl Into<String>, nodes: Vec<NodeInfo>) -> Self {
        Self {
            name: name.into(),
            nodes,
        }
    }
}

impl fmt::Display for GroupInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} nodes)", self.name, self.nodes.len())
    }
}

/// The full cluster description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub groups: Vec<GroupInfo>,
}

impl NetworkConfig {
    pub fn new(groups: Vec<GroupInfo>) -> Self {
        Self { groups }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: NetworkConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Total number of nodes across all groups
    pub fn node_count(&self) -> usize {
        self.groups.iter().map(|g| g.nodes.len()).sum()
    }

    /// Group names must be unique
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for group in &self.groups {
            if !seen.insert(group.name.as_str()) {
                return Err(GenoDbError::Config(format!(
                    "duplicate group name '{}'",
                    group.name
                )));
            }
        }
        Ok(())
    }

    /// Find the group that lists `node`
    pub fn group_of(&self, node: &NodeInfo) -> Option<&GroupInfo> {
        self.groups.iter().find(|g| g.nodes.contains(node))
    }
}
