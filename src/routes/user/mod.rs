mod handler;
mod model;

pub use handler::{searches, subscription};
pub use model::SubscriptionResponse;
