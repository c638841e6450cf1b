pub mod dynamo;
pub mod memory;

pub use dynamo::DynamoDbStore;
pub use memory::MemoryStore;
