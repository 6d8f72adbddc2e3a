pub mod console;
pub mod environment;
pub mod error;
pub mod functions;
pub mod interpreter;
pub mod operators;
pub mod value;

pub use interpreter::{ExecStatus, Interpreter};
