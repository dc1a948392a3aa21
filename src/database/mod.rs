// 数据库模块
// 仓储接口, 以及 Postgres 和内存两种实现

pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

// 重新导出常用类型
pub use memory::MemoryRepository;
pub use models::{
    AnalyticsSnapshot, DailyActivity, DomainActivity, FlagCounts, Plan, PlanCounts,
    ScoreBuckets, SearchHistoryItem, Subscription, WebsiteRecord,
};
pub use postgres::PgRepository;
pub use repository::{RepoResult, Repository};
