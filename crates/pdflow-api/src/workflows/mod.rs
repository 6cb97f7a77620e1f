// Workflow automation resources.
//
// Only integration connections are bound so far.

pub mod connections;
pub mod types;
