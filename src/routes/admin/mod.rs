mod handler;
mod model;

pub use handler::analytics;
pub use model::AnalyticsQuery;
