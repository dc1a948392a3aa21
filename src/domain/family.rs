use super::normalize::extract_domain;

/// 公司域名族: 公司标识 -> 该公司拥有的域名
///
/// 同一个域名只能出现在一个族里。
pub const COMPANY_FAMILIES: &[(&str, &[&str])] = &[
    // 电商
    (
        "amazon",
        &[
            "amazon.com",
            "amazon.ca",
            "amazon.co.uk",
            "amazon.de",
            "amazon.fr",
            "amazon.it",
            "amazon.es",
            "amazon.com.au",
            "amazon.in",
            "amazon.co.jp",
            "amazon.com.br",
            "amazon.com.mx",
        ],
    ),
    (
        "ebay",
        &[
            "ebay.com",
            "ebay.ca",
            "ebay.co.uk",
            "ebay.de",
            "ebay.fr",
            "ebay.it",
            "ebay.es",
            "ebay.com.au",
        ],
    ),
    ("aliexpress", &["aliexpress.com", "aliexpress.us", "aliexpress.ru"]),
    // 科技公司
    (
        "google",
        &[
            "google.com",
            "google.ca",
            "google.co.uk",
            "google.de",
            "google.fr",
            "google.it",
            "google.es",
            "google.com.au",
            "google.co.in",
            "google.co.jp",
            "youtube.com",
            "gmail.com",
            "googlepay.com",
            "googleads.com",
        ],
    ),
    (
        "microsoft",
        &[
            "microsoft.com",
            "outlook.com",
            "hotmail.com",
            "live.com",
            "xbox.com",
            "office.com",
            "onedrive.com",
            "skype.com",
            "linkedin.com",
        ],
    ),
    (
        "meta",
        &[
            "facebook.com",
            "instagram.com",
            "whatsapp.com",
            "messenger.com",
            "oculus.com",
        ],
    ),
    ("apple", &["apple.com", "icloud.com", "itunes.com", "appstore.com"]),
    // 金融
    ("jpmorgan", &["chase.com", "jpmorganchase.com", "jpmorgan.com"]),
    (
        "bankofamerica",
        &["bankofamerica.com", "bofa.com", "merrilledge.com"],
    ),
    ("citigroup", &["citibank.com", "citi.com", "citicards.com"]),
    ("wellsfargo", &["wellsfargo.com", "wf.com"]),
    (
        "paypal",
        &["paypal.com", "paypal.ca", "paypal.co.uk", "venmo.com"],
    ),
    // 零售
    ("walmart", &["walmart.com", "walmart.ca", "samsclub.com"]),
    ("target", &["target.com", "target.ca"]),
    ("homedepot", &["homedepot.com", "homedepot.ca"]),
    ("lowes", &["lowes.com", "lowes.ca"]),
    // 媒体娱乐
    (
        "disney",
        &[
            "disney.com",
            "disneyplus.com",
            "espn.com",
            "abc.com",
            "marvel.com",
            "starwars.com",
        ],
    ),
    ("netflix", &["netflix.com", "netflix.ca", "netflix.co.uk"]),
    ("spotify", &["spotify.com", "spotify.ca", "spotify.co.uk"]),
    // 旅行
    (
        "booking",
        &["booking.com", "priceline.com", "kayak.com", "agoda.com"],
    ),
    (
        "expedia",
        &[
            "expedia.com",
            "expedia.ca",
            "hotels.com",
            "trivago.com",
            "vrbo.com",
        ],
    ),
    ("airbnb", &["airbnb.com", "airbnb.ca", "airbnb.co.uk"]),
    // 新闻与社交
    ("twitter", &["twitter.com", "x.com"]),
    ("reddit", &["reddit.com", "redd.it"]),
    ("cnn", &["cnn.com", "cnn.co.uk"]),
    ("bbc", &["bbc.com", "bbc.co.uk"]),
    ("nytimes", &["nytimes.com", "nyt.com"]),
];

/// 不属于任何域名族时尝试剥离的后缀
///
/// 只剥离一次, 从最靠左的点开始匹配, 所以 `co.uk` 优先于 `uk`。
const FALLBACK_SUFFIXES: &[&str] = &[
    "com", "co.uk", "com.au", "co.jp", "com.br", "com.mx", "co.in", "ca", "uk", "de", "fr", "it",
    "es", "au", "in", "jp", "br", "mx",
];

/// 查找域名所属的公司族
pub fn family_for_domain(domain: &str) -> Option<&'static str> {
    COMPANY_FAMILIES
        .iter()
        .find(|(_, domains)| domains.contains(&domain))
        .map(|(company, _)| *company)
}

/// 把域名解析为缓存用的公司键
///
/// 族表命中时返回公司标识, 否则剥离一个已知后缀后返回剩余部分。
/// 剥离规则是近似的: `brand.de` 与 `brand.com` 会折叠成同一个键,
/// 表外后缀 (如 `.io`) 保持原样。
pub fn resolve_family(domain: &str) -> Option<String> {
    let domain = extract_domain(domain)?;

    if let Some(company) = family_for_domain(&domain) {
        return Some(company.to_string());
    }

    Some(strip_known_suffix(&domain).to_string())
}

fn strip_known_suffix(domain: &str) -> &str {
    for (idx, _) in domain.match_indices('.') {
        if FALLBACK_SUFFIXES.contains(&&domain[idx + 1..]) {
            return &domain[..idx];
        }
    }
    domain
}
