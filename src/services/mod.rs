//! 业务流程: 网站分析与管理后台统计
pub mod analytics;
pub mod analyze;

pub use analytics::{AnalyticsReport, TimeRange};
pub use analyze::{AnalyzeOutcome, analyze_website};
