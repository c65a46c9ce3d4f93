pub mod corpus;
pub mod errors;
pub mod evaluator;
pub mod extractor;
pub mod feature;
pub mod model;
pub mod perceptron;
pub mod segmenter;
pub mod trainer;
pub mod vocabulary;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn get_version() -> &'static str {
    VERSION
}
