//! 域名处理
//!
//! 把用户输入的 URL 规范化为主机名, 再把同一家公司的多个域名
//! (区域站点、子品牌) 折叠成同一个缓存键。

mod family;
mod normalize;

pub use family::{COMPANY_FAMILIES, family_for_domain, resolve_family};
pub use normalize::extract_domain;
