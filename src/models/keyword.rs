use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three fixed keyword categories a facility carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordCategory {
    MenuService,
    EnvironmentFacility,
    RecommendedScene,
}

impl KeywordCategory {
    pub const ALL: [Self; 3] = [
        Self::MenuService,
        Self::EnvironmentFacility,
        Self::RecommendedScene,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MenuService => "menu_service",
            Self::EnvironmentFacility => "environment_facility",
            Self::RecommendedScene => "recommended_scene",
        }
    }

    /// Label used in exported files.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::MenuService => "メニュー・サービス",
            Self::EnvironmentFacility => "環境・設備",
            Self::RecommendedScene => "おすすめの利用シーン",
        }
    }
}

impl fmt::Display for KeywordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeywordCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown keyword category: {s}"))
    }
}

/// Keywords for one facility, partitioned into the three categories.
///
/// Omitted keys deserialize as empty lists; all three keys are always serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordSet {
    pub menu_service: Vec<String>,
    pub environment_facility: Vec<String>,
    pub recommended_scene: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Keyword in {category} exceeds {max} characters: {keyword}")]
pub struct KeywordTooLong {
    pub category: KeywordCategory,
    pub keyword: String,
    pub max: usize,
}

impl KeywordSet {
    #[must_use]
    pub const fn get(&self, category: KeywordCategory) -> &Vec<String> {
        match category {
            KeywordCategory::MenuService => &self.menu_service,
            KeywordCategory::EnvironmentFacility => &self.environment_facility,
            KeywordCategory::RecommendedScene => &self.recommended_scene,
        }
    }

    pub const fn get_mut(&mut self, category: KeywordCategory) -> &mut Vec<String> {
        match category {
            KeywordCategory::MenuService => &mut self.menu_service,
            KeywordCategory::EnvironmentFacility => &mut self.environment_facility,
            KeywordCategory::RecommendedScene => &mut self.recommended_scene,
        }
    }

    /// Iterates `(category, keyword)` pairs in category order.
    pub fn iter(&self) -> impl Iterator<Item = (KeywordCategory, &str)> + '_ {
        KeywordCategory::ALL
            .into_iter()
            .flat_map(move |c| self.get(c).iter().map(move |k| (c, k.as_str())))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.menu_service.len() + self.environment_facility.len() + self.recommended_scene.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Trims every entry and drops blanks. Rejects the set if any entry is
    /// longer than `max_len` characters.
    pub fn sanitized(self, max_len: usize) -> Result<Self, KeywordTooLong> {
        let mut out = Self::default();
        for category in KeywordCategory::ALL {
            for keyword in self.get(category) {
                let trimmed = keyword.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed.chars().count() > max_len {
                    return Err(KeywordTooLong {
                        category,
                        keyword: trimmed.to_string(),
                        max: max_len,
                    });
                }
                out.get_mut(category).push(trimmed.to_string());
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub menu_service: u64,
    pub environment_facility: u64,
    pub recommended_scene: u64,
}

impl CategoryCounts {
    pub const fn add(&mut self, category: KeywordCategory, n: u64) {
        match category {
            KeywordCategory::MenuService => self.menu_service += n,
            KeywordCategory::EnvironmentFacility => self.environment_facility += n,
            KeywordCategory::RecommendedScene => self.recommended_scene += n,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordStats {
    pub total_keywords: u64,
    pub facilities_with_keywords: u64,
    pub category_counts: CategoryCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_default_to_empty() {
        let set: KeywordSet = serde_json::from_str(r#"{"menu_service":["ランチ"]}"#).unwrap();
        assert_eq!(set.menu_service, vec!["ランチ"]);
        assert!(set.environment_facility.is_empty());

        let json = serde_json::to_value(&set).unwrap();
        assert!(json.get("recommended_scene").unwrap().is_array());
        assert!(json.get("environment_facility").unwrap().is_array());
    }

    #[test]
    fn test_sanitized_trims_and_drops_blanks() {
        let set = KeywordSet {
            menu_service: vec!["  ランチ ".into(), "   ".into(), "ランチ".into()],
            ..KeywordSet::default()
        };
        let clean = set.sanitized(100).unwrap();
        assert_eq!(clean.menu_service, vec!["ランチ", "ランチ"]);
    }

    #[test]
    fn test_sanitized_rejects_long_keyword() {
        let set = KeywordSet {
            recommended_scene: vec!["あ".repeat(101)],
            ..KeywordSet::default()
        };
        let err = set.sanitized(100).unwrap_err();
        assert_eq!(err.category, KeywordCategory::RecommendedScene);
        assert!(
            KeywordSet {
                recommended_scene: vec!["あ".repeat(100)],
                ..KeywordSet::default()
            }
            .sanitized(100)
            .is_ok()
        );
    }

    #[test]
    fn test_iter_follows_category_order() {
        let set = KeywordSet {
            menu_service: vec!["a".into()],
            environment_facility: vec!["b".into(), "c".into()],
            recommended_scene: vec!["d".into()],
        };
        let pairs: Vec<_> = set.iter().collect();
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[0], (KeywordCategory::MenuService, "a"));
        assert_eq!(pairs[3], (KeywordCategory::RecommendedScene, "d"));
    }

    #[test]
    fn test_category_round_trip_str() {
        for c in KeywordCategory::ALL {
            assert_eq!(c.as_str().parse::<KeywordCategory>(), Ok(c));
        }
        assert!("other".parse::<KeywordCategory>().is_err());
    }
}
