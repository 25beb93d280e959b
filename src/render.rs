pub mod composite;
pub mod pipeline;
