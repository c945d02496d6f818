#![deny(missing_docs)]
#![doc = "Explicit-table graphical models implementing the `pbo-core` energy model contract."]

mod generators;
mod model;
mod serialization;

pub use generators::gen_random_binary;
pub use model::{TableFactor, TableModel};
pub use serialization::{model_from_json, model_to_json};
