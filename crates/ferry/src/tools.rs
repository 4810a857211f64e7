mod builtin;
mod registry;
mod schema;
mod wiki;

pub use builtin::{FunFact, RandomColor, Weather};
pub use registry::{parse_arguments, ToolHandler, ToolRegistry};
pub use schema::validate_arguments;
pub use wiki::{WikiSearch, WIKIPEDIA_HOST};
