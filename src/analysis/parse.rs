use serde_json::{Map, Value};

use super::AnalysisError;
use super::model::WebsiteAnalysis;

/// 这些字段必须是数组, 模型给出其他值时按空数组处理
const ARRAY_FIELDS: &[&str] = &[
    "complaint_flags",
    "secure_payment_methods",
    "data_breach_history",
    "recent_news_mentions",
    "lawsuits",
    "regulatory_violations",
    "product_recalls",
    "major_controversies",
    "political_donations",
    "pac_contributions",
    "trade_association_memberships",
    "industry_lobbying_positions",
    "labor_practices_news",
    "environmental_record",
    "tax_practices_controversies",
    "monopolistic_behavior",
    "scam_database_matches",
    "recent_negative_press",
    "industry_certifications",
];

/// 去掉模型偶尔包在外面的 Markdown 代码块标记
pub fn clean_response(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// 解析并校验模型返回的报告
///
/// 要求 `company_name` 非空、`trustScore` 为数字; 分数取整并限制在 0..=100,
/// 缺少 `domain` 时使用请求的域名。
pub fn parse_analysis(raw: &str, domain: &str) -> Result<WebsiteAnalysis, AnalysisError> {
    let cleaned = clean_response(raw);
    let mut value: Value = serde_json::from_str(&cleaned)?;

    let fields = value
        .as_object_mut()
        .ok_or(AnalysisError::InvalidStructure("response is not a JSON object"))?;

    let has_name = fields
        .get("company_name")
        .and_then(Value::as_str)
        .is_some_and(|name| !name.trim().is_empty());
    if !has_name {
        return Err(AnalysisError::InvalidStructure("missing company_name"));
    }

    let score = fields
        .get("trustScore")
        .and_then(Value::as_f64)
        .ok_or(AnalysisError::InvalidStructure("trustScore is not a number"))?;
    fields.insert(
        "trustScore".to_string(),
        Value::from(score.round().clamp(0.0, 100.0) as i64),
    );

    strip_nulls(fields);

    for field in ARRAY_FIELDS {
        if fields.get(*field).is_some_and(|v| !v.is_array()) {
            fields.insert(field.to_string(), Value::Array(Vec::new()));
        }
    }

    let has_domain = fields
        .get("domain")
        .and_then(Value::as_str)
        .is_some_and(|d| !d.is_empty());
    if !has_domain {
        fields.insert("domain".to_string(), Value::String(domain.to_string()));
    }

    Ok(serde_json::from_value(value)?)
}

/// 删除所有值为 null 的键, 让缺省值生效
fn strip_nulls(fields: &mut Map<String, Value>) {
    fields.retain(|_, v| !v.is_null());
    for value in fields.values_mut() {
        match value {
            Value::Object(nested) => strip_nulls(nested),
            Value::Array(items) => {
                for item in items.iter_mut() {
                    if let Value::Object(nested) = item {
                        strip_nulls(nested);
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::model::Figure;

    #[test]
    fn accepts_fenced_json() {
        let raw = "```json\n{\"company_name\": \"Amazon\", \"trustScore\": 61, \"domain\": \"amazon.com\"}\n```";
        let analysis = parse_analysis(raw, "amazon.com").unwrap();
        assert_eq!(analysis.company_name, "Amazon");
        assert_eq!(analysis.trust_score, 61);
        assert!(analysis.lawsuits.is_empty());
        assert_eq!(analysis.bbb_accreditation_status, "unverified");
    }

    #[test]
    fn rejects_missing_name_or_score() {
        assert!(matches!(
            parse_analysis(r#"{"trustScore": 50}"#, "x.com"),
            Err(AnalysisError::InvalidStructure(_))
        ));
        assert!(matches!(
            parse_analysis(r#"{"company_name": "X", "trustScore": "high"}"#, "x.com"),
            Err(AnalysisError::InvalidStructure(_))
        ));
        assert!(matches!(
            parse_analysis("I could not find anything.", "x.com"),
            Err(AnalysisError::InvalidJson(_))
        ));
    }

    #[test]
    fn repairs_nulls_and_non_array_fields() {
        let raw = r#"{
            "company_name": "Acme",
            "trustScore": 72.6,
            "lawsuits": "none found",
            "political_donations": [{"recipient": "PAC", "amount": "Active, $ unknown", "year": 2023}],
            "lobbying_activity": {"status": null, "expenditures": 120000, "details": null},
            "ssl_certificate": null,
            "domain": null
        }"#;
        let analysis = parse_analysis(raw, "acme.io").unwrap();

        assert_eq!(analysis.trust_score, 73);
        assert!(analysis.lawsuits.is_empty());
        assert_eq!(analysis.domain, "acme.io");
        assert!(!analysis.ssl_certificate);
        assert_eq!(
            analysis.political_donations[0].amount,
            Some(Figure::Text("Active, $ unknown".to_string()))
        );
        assert_eq!(
            analysis.lobbying_activity.expenditures,
            Some(Figure::Number(120000.0))
        );
    }

    #[test]
    fn clamps_out_of_range_scores() {
        let analysis = parse_analysis(r#"{"company_name": "A", "trustScore": 140}"#, "a.com").unwrap();
        assert_eq!(analysis.trust_score, 100);
    }
}
