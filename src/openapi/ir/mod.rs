//! Intermediate representation for OpenAPI to TypeScript code generation.
//!
//! The IR is built in layers, leaves first:
//! 1. `resolver`: schema node to a `TypeDescriptor` (no recursion into refs)
//! 2. `models`: named schema to a full `Model`, hoisting anonymous objects
//! 3. `operations` / `services`: path + method to an `Operation`, grouped by tag
//! 4. `parse`: everything above assembled into a `Client`
//! 5. `post_process`: final names, reference rewrite and sorting
//!
//! Nothing in this module performs I/O. The emission pipeline in
//! `crate::writer` consumes the post-processed `Client`.
//!
//! ## Module Structure
//!
//! - `types`: Client, Model, Service, Operation and friends
//! - `utils`: identifier sanitizing and casing shared across modules

pub mod models;
pub mod operations;
pub mod parse;
pub mod post_process;
pub mod resolver;
pub mod services;
pub mod types;
pub mod utils;

pub use models::{get_models, synthesized_name};
pub use parse::parse;
pub use post_process::post_process_client;
pub use types::{
    Client, Model, ModelKind, ModelOrigin, Operation, OperationParameter, OperationResponse,
    ParameterIn, Service, StatusCode,
};
