pub mod feature_registry;

pub use feature_registry::{
    DAYS_REST_COLUMN, HOME_COLUMN, MINUTES_COLUMN, TRACKED_STATS, model_feature_names,
    rolling_column_name,
};
