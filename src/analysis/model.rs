use serde::{Deserialize, Serialize};

/// 数值或文本; 模型对金额、年份常给出 "Active, $ unknown" 之类的文字
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Figure {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalLocation {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// 联系方式及其核实状态 (verified / unverified / PO Box)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactField {
    pub value: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataBreach {
    pub date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsItem {
    pub title: Option<String>,
    pub date: Option<String>,
    pub summary: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lawsuit {
    pub case_name: Option<String>,
    pub date: Option<String>,
    pub summary: Option<String>,
    pub court: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegulatoryViolation {
    pub agency: Option<String>,
    pub violation: Option<String>,
    pub date: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRecall {
    pub product: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Controversy {
    pub topic: Option<String>,
    pub date: Option<String>,
    pub summary: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LobbyingActivity {
    pub status: bool,
    pub expenditures: Option<Figure>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoliticalDonation {
    pub recipient: Option<String>,
    pub amount: Option<Figure>,
    pub year: Option<Figure>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacContribution {
    pub pac_name: Option<String>,
    pub amount: Option<Figure>,
    pub year: Option<Figure>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentalIssue {
    pub issue: Option<String>,
    pub date: Option<String>,
    pub summary: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxControversy {
    pub issue: Option<String>,
    pub year: Option<Figure>,
    pub summary: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonopolyIncident {
    pub incident: Option<String>,
    pub year: Option<Figure>,
    pub summary: Option<String>,
    pub url: Option<String>,
}

/// 一个网站背后公司的透明度报告
///
/// 字段名与模型输出的 JSON 一致; 缺失的数组按空数组处理。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebsiteAnalysis {
    // 公司身份
    pub company_name: String,
    pub company_type: Option<String>,
    pub physical_location: PhysicalLocation,
    pub years_in_operation: Option<f64>,
    pub domain_age_years: Option<f64>,
    pub parent_company: Option<String>,
    pub ownership_structure: Option<String>,

    // 口碑
    pub average_review_rating: Option<f64>,
    pub review_count: Option<f64>,
    pub complaint_flags: Vec<String>,

    // 安全
    pub ssl_certificate: bool,
    pub secure_payment_methods: Vec<String>,
    pub privacy_policy_present: bool,
    pub data_breach_history: Vec<DataBreach>,

    // 联系方式核实
    pub phone_number: ContactField,
    pub email_address: ContactField,
    pub physical_address: ContactField,

    // 新闻与争议
    pub recent_news_mentions: Vec<NewsItem>,
    pub lawsuits: Vec<Lawsuit>,
    pub regulatory_violations: Vec<RegulatoryViolation>,
    pub product_recalls: Vec<ProductRecall>,
    pub major_controversies: Vec<Controversy>,

    // 政治与资金影响
    pub lobbying_activity: LobbyingActivity,
    pub political_donations: Vec<PoliticalDonation>,
    pub pac_contributions: Vec<PacContribution>,
    pub trade_association_memberships: Vec<String>,
    pub industry_lobbying_positions: Vec<String>,

    // 企业行为
    pub labor_practices_news: Vec<NewsItem>,
    pub environmental_record: Vec<EnvironmentalIssue>,
    pub tax_practices_controversies: Vec<TaxControversy>,
    pub monopolistic_behavior: Vec<MonopolyIncident>,
    pub exec_vs_worker_pay_ratio: Option<f64>,

    // 危险信号
    pub domain_age_under_6_months: bool,
    pub whois_privacy_enabled: bool,
    pub scam_database_matches: Vec<String>,
    pub excessive_discount_claims: bool,
    pub missing_contact_info: bool,
    pub recent_negative_press: Vec<NewsItem>,

    // 信任指标
    #[serde(default = "unverified")]
    pub bbb_accreditation_status: String,
    pub bbb_rating: Option<String>,
    pub industry_certifications: Vec<String>,
    pub social_media_presence_verified: bool,
    pub return_policy_clearly_stated: bool,
    pub business_registration_verified: bool,
    pub charitable_giving_or_bcorp_status: Option<String>,

    pub domain: String,
    #[serde(rename = "trustScore")]
    pub trust_score: i32,
}

fn unverified() -> String {
    "unverified".to_string()
}

impl WebsiteAnalysis {
    /// 低于该分数的网站计为"被标记"
    pub const FLAG_THRESHOLD: i32 = 70;

    pub fn is_flagged(&self) -> bool {
        self.trust_score < Self::FLAG_THRESHOLD
    }

    pub fn has_privacy_concerns(&self) -> bool {
        !self.privacy_policy_present || !self.data_breach_history.is_empty()
    }

    pub fn has_political_activity(&self) -> bool {
        !self.political_donations.is_empty() || !self.pac_contributions.is_empty()
    }

    pub fn has_legal_issues(&self) -> bool {
        !self.lawsuits.is_empty() || !self.regulatory_violations.is_empty()
    }

    pub fn has_environmental_issues(&self) -> bool {
        !self.environmental_record.is_empty()
    }

    pub fn has_labor_issues(&self) -> bool {
        !self.labor_practices_news.is_empty()
    }
}
