pub mod config;
pub mod engine;
pub mod response;
pub mod validation;

pub use config::*;
pub use engine::{Assessment, CategoryScores, LowerFactorScore, TypeResult};
pub use response::{RawScore, ResponseError, ResponseSet, Score};
pub use validation::validate_scoring;
