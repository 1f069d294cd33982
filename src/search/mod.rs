pub mod pipeline;

pub use pipeline::SearchPipeline;
