// Copyright 2026 Tablefunc Contributors
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

//! Virtual parameters: registry, descriptors, specifications, binding

pub mod convert;
pub mod descriptor;
pub mod query_parameters;
pub mod registry;
pub mod specification;

pub use convert::ToParam;
pub use descriptor::{ParameterDescriptor, ParameterMetadata};
pub use query_parameters::QueryParameters;
pub use registry::{VirtualParameter, VirtualParameterRegistry};
pub use specification::{
    AsyncCommand, Command, ParameterSpecification, VirtualParameterSpecification,
};
