pub mod data_export;
pub mod gradient_boosting;

pub use data_export::write_labeled_csv;
pub use gradient_boosting::{BoosterError, BoosterParams, GradientBoostedClassifier};
