/// Bundled demo tools
///
/// State transformers shipped with the server so it has something to run out
/// of the box. Hosts embedding the engine register their own tools instead.

pub mod code_review;

pub use code_review::{code_review_graph, register_code_review, CODE_REVIEW_GRAPH_ID};
