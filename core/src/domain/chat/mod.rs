pub mod assembler;
pub mod decoder;
pub mod entities;
pub mod errors;
pub mod orchestrator;
pub mod ports;
pub mod prompt;
pub mod services;
pub mod sse;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use ports::*;
pub use value_objects::*;
