//! Prompt construction for keyword generation.

use regex::Regex;
use std::fmt::Write;
use std::sync::OnceLock;

use crate::clients::CrawlResult;
use crate::models::Facility;

pub const SYSTEM_PROMPT: &str =
    "あなたはSEO/MEOキーワード生成の専門家です。施設情報に基づいて、最適なキーワードを提案してください。";

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>|<[^>]*>")
            .expect("Invalid regex")
    })
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex"))
}

/// Crawl output for both enrichment sources. Either side may be absent.
#[derive(Debug, Clone, Default)]
pub struct CrawlContext {
    pub business_profile: Option<CrawlResult>,
    pub website: Option<CrawlResult>,
}

impl CrawlContext {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.business_profile.is_none() && self.website.is_none()
    }
}

/// Strips markup, decodes entities, collapses whitespace and truncates to
/// `max_chars` characters.
#[must_use]
pub fn clean_crawl_text(raw: &str, max_chars: usize) -> String {
    let without_tags = tag_regex().replace_all(raw, " ");
    let decoded = html_escape::decode_html_entities(&without_tags);
    let collapsed = whitespace_regex().replace_all(&decoded, " ");
    collapsed.trim().chars().take(max_chars).collect()
}

fn push_crawl_section(prompt: &mut String, label: &str, crawl: &CrawlResult, max_chars: usize) {
    let title = clean_crawl_text(&crawl.title, max_chars);
    let description = clean_crawl_text(&crawl.description, max_chars);
    let content = clean_crawl_text(&crawl.content, max_chars);

    if !title.is_empty() {
        let _ = writeln!(prompt, "{label}タイトル: {title}");
    }
    if !description.is_empty() {
        let _ = writeln!(prompt, "{label}説明: {description}");
    }
    if !content.is_empty() {
        let _ = writeln!(prompt, "{label}コンテンツ: {content}");
    }
}

/// Builds the user prompt for `facility`, embedding any crawl text.
#[must_use]
pub fn build_keyword_prompt(
    facility: &Facility,
    crawl: &CrawlContext,
    per_category: (usize, usize),
    max_crawl_chars: usize,
) -> String {
    let (min, max) = per_category;
    let mut prompt = String::with_capacity(2048);

    prompt.push_str("以下の施設情報に基づいて、SEO/MEOに効果的なキーワードを生成してください。\n");
    prompt.push_str("結果はJSON形式で、以下の3つのカテゴリに分けて返してください:\n");
    let _ = writeln!(prompt, "1. menu_service: メニュー・サービス関連のキーワード（{min}-{max}個）");
    let _ = writeln!(prompt, "2. environment_facility: 環境・設備関連のキーワード（{min}-{max}個）");
    let _ = writeln!(prompt, "3. recommended_scene: おすすめの利用シーン関連のキーワード（{min}-{max}個）");

    prompt.push_str("\n【施設情報】\n");
    let fields = [
        ("施設名", Some(facility.facility_name.as_str())),
        ("業種", facility.business_type.as_deref()),
        ("住所", facility.address.as_deref()),
        ("電話番号", facility.phone.as_deref()),
        ("営業時間", facility.business_hours.as_deref()),
        ("定休日", facility.closed_days.as_deref()),
        ("公式サイトURL", facility.official_site_url.as_deref()),
        ("Google Business ProfileのURL", facility.gbp_url.as_deref()),
        ("追加情報", facility.additional_info.as_deref()),
    ];
    for (label, value) in fields {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            let _ = writeln!(prompt, "{label}: {value}");
        }
    }

    if !crawl.is_empty() {
        prompt.push_str("\n【クロールデータ】\n");
        if let Some(site) = &crawl.website {
            push_crawl_section(&mut prompt, "公式サイト", site, max_crawl_chars);
        }
        if let Some(gbp) = &crawl.business_profile {
            push_crawl_section(&mut prompt, "GBP", gbp, max_crawl_chars);
        }
    }

    prompt.push_str(
        r#"
【出力形式】
{
  "menu_service": ["キーワード1", "キーワード2", ...],
  "environment_facility": ["キーワード1", "キーワード2", ...],
  "recommended_scene": ["キーワード1", "キーワード2", ...]
}

【注意事項】
- 各キーワードは具体的で、検索ユーザーが使いそうな自然な表現にしてください
- 施設の特徴や強みを活かしたキーワードを含めてください
- 地域性を考慮したキーワードを含めてください
- 競合との差別化ポイントになるキーワードを含めてください
- 必ず上記のJSON形式のみで出力してください
"#,
    );

    prompt
}
