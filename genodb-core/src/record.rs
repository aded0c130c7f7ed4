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

//! Metadata records: a named sequence fragment and its point

use std::io::{Read, Write};

use crate::codec::{Decode, Encode};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRecord<P> {
    /// Fragment name (source sequence identifier)
    pub name: String,
    /// The indexed point
    pub point: P,
}

impl<P> MetadataRecord<P> {
    pub fn new(name: impl Into<String>, point: P) -> Self {
        Self {
            name: name.into(),
            point,
        }
    }
}

impl<P: Encode> Encode for MetadataRecord<P> {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.name.encode(writer)?;
        self.point.encode(writer)
    }
}

impl<P: Decode> Decode for MetadataRecord<P> {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        let name = String::decode(reader)?;
        let point = P::decode(reader)?;
        Ok(Self { name, point })
    }
}
