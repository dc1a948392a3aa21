/// 系统提示词
pub const SYSTEM_PROMPT: &str = "You are a business intelligence analyst with web search access. \
Research the company behind the given website thoroughly, then answer with a single valid JSON \
object containing every requested field and nothing else.";

/// 要求模型返回的 JSON 结构
const RESPONSE_SHAPE: &str = r#"{
  "company_name": "string",
  "company_type": "string or null",
  "physical_location": {"city": "string or null", "state": "string or null", "country": "string or null"},
  "years_in_operation": "number or null",
  "domain_age_years": "number or null",
  "parent_company": "string or null",
  "ownership_structure": "string or null",
  "average_review_rating": "number or null",
  "review_count": "number or null",
  "complaint_flags": ["string"],
  "ssl_certificate": "boolean",
  "secure_payment_methods": ["string"],
  "privacy_policy_present": "boolean",
  "data_breach_history": [{"date": "string", "description": "string"}],
  "phone_number": {"value": "string or null", "status": "verified | unverified | null"},
  "email_address": {"value": "string or null", "status": "verified | unverified | null"},
  "physical_address": {"value": "string or null", "status": "verified | unverified | PO Box | null"},
  "recent_news_mentions": [{"title": "string", "date": "string", "summary": "string", "url": "string"}],
  "lawsuits": [{"case_name": "string", "date": "string", "summary": "string", "court": "string", "url": "string"}],
  "regulatory_violations": [{"agency": "string", "violation": "string", "date": "string", "url": "string"}],
  "product_recalls": [{"product": "string", "date": "string", "description": "string", "url": "string"}],
  "major_controversies": [{"topic": "string", "date": "string", "summary": "string", "url": "string"}],
  "lobbying_activity": {"status": "boolean", "expenditures": "number or null", "details": "string or null"},
  "political_donations": [{"recipient": "string", "amount": "number", "year": "number"}],
  "pac_contributions": [{"pac_name": "string", "amount": "number", "year": "number"}],
  "trade_association_memberships": ["string"],
  "industry_lobbying_positions": ["string"],
  "labor_practices_news": [{"title": "string", "date": "string", "summary": "string", "url": "string"}],
  "environmental_record": [{"issue": "string", "date": "string", "summary": "string", "url": "string"}],
  "tax_practices_controversies": [{"issue": "string", "year": "number", "summary": "string", "url": "string"}],
  "monopolistic_behavior": [{"incident": "string", "year": "number", "summary": "string", "url": "string"}],
  "exec_vs_worker_pay_ratio": "number or null",
  "domain_age_under_6_months": "boolean",
  "whois_privacy_enabled": "boolean",
  "scam_database_matches": ["string"],
  "excessive_discount_claims": "boolean",
  "missing_contact_info": "boolean",
  "recent_negative_press": [{"title": "string", "date": "string", "summary": "string", "url": "string"}],
  "bbb_accreditation_status": "accredited | not accredited | unverified",
  "bbb_rating": "string or null",
  "industry_certifications": ["string"],
  "social_media_presence_verified": "boolean",
  "return_policy_clearly_stated": "boolean",
  "business_registration_verified": "boolean",
  "charitable_giving_or_bcorp_status": "string or null",
  "domain": "{domain}",
  "trustScore": "number 1-100"
}"#;

/// 构造分析提示词
pub fn build_prompt(url: &str, domain: &str) -> String {
    format!(
        "Analyze the company operating the website at {url}.\n\n\
This report powers a transparency tool that helps people decide which companies to support. \
Surface controversial, hidden or concerning information a customer would want to know, \
weighting the last five years most heavily but including major issues from the last decade.\n\n\
Cover:\n\
1. Political activity: donations, lobbying spend, PAC contributions, named recipients and amounts \
(write \"Active, $ unknown\" when the amount is not public).\n\
2. Controversial business practices and partnerships.\n\
3. Financial transparency: executive pay ratio, tax strategy, offshore operations, major investors.\n\
4. Corporate behavior: labor disputes, discrimination suits, worker treatment.\n\
5. Ownership and control: parent companies, board ties, major shareholders.\n\
6. Legal history: lawsuits, regulatory fines, settlements, consent decrees.\n\
7. Environmental and safety record.\n\
8. Historical scandals.\n\n\
Include concrete dates, dollar amounts and sources.\n\n\
Return a JSON object with exactly these fields, using null or empty arrays when nothing is found:\n\n\
{shape}\n\n\
Return ONLY the JSON object. No explanations, no markdown, no code blocks.",
        url = url,
        shape = RESPONSE_SHAPE.replace("{domain}", domain),
    )
}
