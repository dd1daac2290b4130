//! Static keyword table used when AI generation is unavailable or fails.

use crate::models::{Facility, KeywordSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessKind {
    Restaurant,
    Beauty,
    Lodging,
    Generic,
}

struct Template {
    menu_service: &'static [&'static str],
    environment_facility: &'static [&'static str],
    recommended_scene: &'static [&'static str],
}

const RESTAURANT_TOKENS: &[&str] = &[
    "飲食", "レストラン", "カフェ", "居酒屋", "食堂", "restaurant", "cafe", "diner", "bistro",
    "izakaya",
];

const BEAUTY_TOKENS: &[&str] = &[
    "美容", "サロン", "ヘア", "ネイル", "エステ", "salon", "beauty", "spa", "hair",
];

const LODGING_TOKENS: &[&str] = &["ホテル", "旅館", "宿", "hotel", "hostel", "ryokan"];

const RESTAURANT: Template = Template {
    menu_service: &[
        "ランチメニュー",
        "ディナーコース",
        "テイクアウト",
        "宴会プラン",
        "飲み放題",
        "食べ放題",
        "季節限定メニュー",
    ],
    environment_facility: &[
        "個室あり",
        "座敷あり",
        "テラス席",
        "禁煙",
        "駐車場完備",
        "Wi-Fi完備",
        "バリアフリー",
    ],
    recommended_scene: &[
        "家族での食事",
        "デート",
        "接待",
        "女子会",
        "宴会",
        "記念日",
        "誕生日",
    ],
};

const BEAUTY: Template = Template {
    menu_service: &[
        "カット",
        "カラー",
        "パーマ",
        "トリートメント",
        "ヘッドスパ",
        "マツエク",
        "ネイル",
    ],
    environment_facility: &[
        "完全個室",
        "駐車場あり",
        "予約制",
        "キッズスペース",
        "バリアフリー",
        "Wi-Fi完備",
    ],
    recommended_scene: &[
        "結婚式前",
        "デート前",
        "就職活動",
        "記念日",
        "イメージチェンジ",
        "リフレッシュ",
    ],
};

const LODGING: Template = Template {
    menu_service: &[
        "朝食付き",
        "夕食付き",
        "温泉",
        "マッサージ",
        "ルームサービス",
        "送迎サービス",
        "観光案内",
    ],
    environment_facility: &[
        "大浴場",
        "露天風呂",
        "Wi-Fi完備",
        "駐車場無料",
        "バリアフリー",
        "禁煙ルーム",
    ],
    recommended_scene: &[
        "家族旅行",
        "カップル旅行",
        "一人旅",
        "ビジネス出張",
        "記念日",
        "女子旅",
        "グループ旅行",
    ],
};

const GENERIC: Template = Template {
    menu_service: &[
        "サービスメニュー",
        "料金プラン",
        "初回割引",
        "定期コース",
        "会員特典",
        "期間限定",
    ],
    environment_facility: &[
        "駐車場あり",
        "アクセス便利",
        "バリアフリー",
        "Wi-Fi完備",
        "予約可能",
        "完全個室",
    ],
    recommended_scene: &[
        "家族で利用",
        "友人と一緒に",
        "デート",
        "記念日",
        "リラックスタイム",
        "日常使い",
    ],
};

impl BusinessKind {
    /// Matches the business type by case-insensitive substring.
    #[must_use]
    pub fn detect(business_type: Option<&str>) -> Self {
        let Some(kind) = business_type.map(str::to_lowercase) else {
            return Self::Generic;
        };
        let has_any = |tokens: &[&str]| tokens.iter().any(|t| kind.contains(t));

        if has_any(RESTAURANT_TOKENS) {
            Self::Restaurant
        } else if has_any(BEAUTY_TOKENS) {
            Self::Beauty
        } else if has_any(LODGING_TOKENS) {
            Self::Lodging
        } else {
            Self::Generic
        }
    }

    const fn template(self) -> &'static Template {
        match self {
            Self::Restaurant => &RESTAURANT,
            Self::Beauty => &BEAUTY,
            Self::Lodging => &LODGING,
            Self::Generic => &GENERIC,
        }
    }
}

/// Leading place name of a Japanese address: the text before the first
/// prefecture/city/ward/town/village marker.
fn area_prefix(address: &str) -> Option<&str> {
    const MARKERS: [char; 8] = ['都', '道', '府', '県', '市', '区', '町', '村'];
    let end = address.find(|c: char| MARKERS.contains(&c))?;
    let area = address[..end].trim();
    (!area.is_empty()).then_some(area)
}

/// Deterministic keyword set for `facility`.
#[must_use]
pub fn fallback_keywords(facility: &Facility) -> KeywordSet {
    let template = BusinessKind::detect(facility.business_type.as_deref()).template();
    let to_vec = |words: &[&str]| words.iter().map(ToString::to_string).collect::<Vec<_>>();

    let mut set = KeywordSet {
        menu_service: to_vec(template.menu_service),
        environment_facility: to_vec(template.environment_facility),
        recommended_scene: to_vec(template.recommended_scene),
    };

    if let Some(area) = facility.address.as_deref().and_then(area_prefix) {
        let business = facility
            .business_type
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or("店舗");
        set.menu_service.push(format!("{area}の{business}"));
        set.menu_service.push(format!("{area}エリア"));
        set.menu_service.push(format!("{area}周辺"));
    }

    let name = facility.facility_name.trim();
    if !name.is_empty() {
        set.menu_service.push(format!("{name}のおすすめメニュー"));
        set.environment_facility.push(format!("{name}の設備"));
        set.recommended_scene.push(format!("{name}でのひととき"));
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FacilityId;

    fn facility(name: &str, business_type: Option<&str>, address: Option<&str>) -> Facility {
        Facility {
            id: FacilityId::new(1),
            facility_name: name.to_string(),
            business_type: business_type.map(ToString::to_string),
            address: address.map(ToString::to_string),
            phone: None,
            business_hours: None,
            closed_days: None,
            official_site_url: None,
            gbp_url: None,
            additional_info: None,
            created_by: None,
            updated_by: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_detect_kind() {
        assert_eq!(BusinessKind::detect(Some("Restaurant")), BusinessKind::Restaurant);
        assert_eq!(BusinessKind::detect(Some("和風カフェ")), BusinessKind::Restaurant);
        assert_eq!(BusinessKind::detect(Some("ヘアサロン")), BusinessKind::Beauty);
        assert_eq!(BusinessKind::detect(Some("ビジネスホテル")), BusinessKind::Lodging);
        assert_eq!(BusinessKind::detect(Some("dentist")), BusinessKind::Generic);
        assert_eq!(BusinessKind::detect(None), BusinessKind::Generic);
    }

    #[test]
    fn test_sample_diner() {
        let set = fallback_keywords(&facility("Sample Diner", Some("restaurant"), None));
        assert!(!set.menu_service.is_empty());
        assert!(!set.environment_facility.is_empty());
        assert!(!set.recommended_scene.is_empty());
        assert!(set.iter().any(|(_, k)| k.contains("Sample Diner")));
        assert!(set.menu_service.contains(&"ランチメニュー".to_string()));
    }

    #[test]
    fn test_deterministic() {
        let f = facility("Sample Diner", Some("restaurant"), Some("東京都渋谷区1-2-3"));
        let a = serde_json::to_vec(&fallback_keywords(&f)).unwrap();
        let b = serde_json::to_vec(&fallback_keywords(&f)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_location_keywords() {
        let set = fallback_keywords(&facility("湯の宿", Some("旅館"), Some("静岡県伊東市")));
        assert!(set.menu_service.contains(&"静岡の旅館".to_string()));
        assert!(set.menu_service.contains(&"静岡エリア".to_string()));

        let set = fallback_keywords(&facility("Shop", None, Some("札幌市中央区")));
        assert!(set.menu_service.contains(&"札幌の店舗".to_string()));

        let set = fallback_keywords(&facility("Shop", None, Some("1-2-3 Main St")));
        assert!(!set.menu_service.iter().any(|k| k.ends_with("エリア")));
    }

    #[test]
    fn test_missing_name_and_type() {
        let set = fallback_keywords(&facility("", None, None));
        assert_eq!(set.menu_service.len(), GENERIC.menu_service.len());
        assert_eq!(set.recommended_scene.len(), GENERIC.recommended_scene.len());
    }
}
