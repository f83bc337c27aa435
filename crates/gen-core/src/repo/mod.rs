mod memory;
pub mod types;
pub use memory::InMemoryWorkflowStore;
pub use types::{merge_projection, DeduplicationStore, Projection, StatusProjector, WorkflowStore};
