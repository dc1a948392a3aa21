use super::model::WebsiteAnalysis;

/// 分析服务不可用时的中性报告, 分数固定为 50
pub fn fallback_analysis(domain: &str) -> WebsiteAnalysis {
    WebsiteAnalysis {
        company_name: capitalize(domain),
        ssl_certificate: true,
        missing_contact_info: true,
        bbb_accreditation_status: "unverified".to_string(),
        domain: domain.to_string(),
        trust_score: 50,
        ..WebsiteAnalysis::default()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
