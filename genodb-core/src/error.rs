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

//! Error types for GenoDB core

use std::io;
use thiserror::Error;

use crate::metric::MetricViolation;

#[derive(Error, Debug)]
pub enum GenoDbError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Metric space violation: {0}")]
    MetricViolation(MetricViolation),
}

impl From<serde_json::Error> for GenoDbError {
    fn from(err: serde_json::Error) -> Self {
        GenoDbError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GenoDbError>;
