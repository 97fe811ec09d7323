use serde::{Deserialize, Serialize};

static TIER_GROUPS: [&'static str; 6] = ["Bronze", "Silver", "Gold", "Platinum", "Diamond", "Ruby"];
static TIER_STEPS: [&'static str; 5] = ["V", "IV", "III", "II", "I"];
const MAX_CLASS: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassDecoration {
    Silver,
    Gold,
    #[default]
    #[serde(other)]
    None,
}

/// Profile as returned by the `user/show` endpoint. Only the fields the card
/// needs are kept; everything else in the payload is ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub handle: String,
    #[serde(default)]
    pub tier: u8,
    pub solved_count: Option<u64>,
    pub rank: Option<u64>,
    pub class: Option<u8>,
    // The API sends null for users without a decoration.
    #[serde(default, deserialize_with = "nullable_decoration")]
    pub class_decoration: ClassDecoration,
    pub profile_image_url: Option<String>,
    pub background_id: Option<String>,
    pub badge_id: Option<String>,
    pub max_streak: Option<u64>,
}

fn nullable_decoration<'de, D>(deserializer: D) -> Result<ClassDecoration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<ClassDecoration>::deserialize(deserializer)?.unwrap_or_default())
}

impl ClassDecoration {
    /// Suffix used by the static CDN class icons, `c5s.svg`, `c5g.svg`.
    pub fn icon_suffix(&self) -> &'static str {
        match self {
            ClassDecoration::None => "",
            ClassDecoration::Silver => "s",
            ClassDecoration::Gold => "g",
        }
    }

    pub fn label_suffix(&self) -> &'static str {
        match self {
            ClassDecoration::None => "",
            ClassDecoration::Silver => "+",
            ClassDecoration::Gold => "++",
        }
    }
}

impl UserRecord {
    /// solved.ac tiers go 1 (Bronze V) to 30 (Ruby I), then 31 (Master).
    pub fn tier_name(&self) -> String {
        match self.tier {
            1..=30 => {
                let idx = usize::from(self.tier - 1);
                format!("{} {}", TIER_GROUPS[idx / 5], TIER_STEPS[idx % 5])
            }
            31 => "Master".to_string(),
            _ => "Unrated".to_string(),
        }
    }

    /// Class between 1 and 10, if the user has earned one.
    pub fn earned_class(&self) -> Option<u8> {
        self.class.filter(|c| (1..=MAX_CLASS).contains(c))
    }

    pub fn class_label(&self) -> Option<String> {
        self.earned_class()
            .map(|c| format!("{}{}", c, self.class_decoration.label_suffix()))
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.profile_image_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }

    pub fn background_id(&self) -> Option<&str> {
        self.background_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn badge_id(&self) -> Option<&str> {
        self.badge_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_user_show_payload() {
        let payload = r#"{
            "handle": "koosaga",
            "bio": "ignored",
            "badgeId": "ps_master",
            "backgroundId": "event_2023",
            "profileImageUrl": null,
            "solvedCount": 5123,
            "class": 10,
            "classDecoration": "gold",
            "tier": 31,
            "rank": 3,
            "maxStreak": 400
        }"#;

        let user: UserRecord = serde_json::from_str(payload).unwrap();
        assert_eq!(user.handle, "koosaga");
        assert_eq!(user.tier, 31);
        assert_eq!(user.solved_count, Some(5123));
        assert_eq!(user.class_decoration, ClassDecoration::Gold);
        assert_eq!(user.avatar_url(), None);
        assert_eq!(user.badge_id(), Some("ps_master"));
        assert_eq!(user.class_label().as_deref(), Some("10++"));
    }

    #[test]
    fn missing_optional_fields_default() {
        let user: UserRecord = serde_json::from_str(r#"{"handle": "newbie"}"#).unwrap();
        assert_eq!(user.tier, 0);
        assert_eq!(user.rank, None);
        assert_eq!(user.class_decoration, ClassDecoration::None);
        assert_eq!(user.class_label(), None);
        assert_eq!(user.background_id(), None);
    }

    #[test]
    fn unknown_or_null_decoration_is_none() {
        let user: UserRecord =
            serde_json::from_str(r#"{"handle": "a", "classDecoration": "rainbow"}"#).unwrap();
        assert_eq!(user.class_decoration, ClassDecoration::None);
        let user: UserRecord =
            serde_json::from_str(r#"{"handle": "a", "classDecoration": null}"#).unwrap();
        assert_eq!(user.class_decoration, ClassDecoration::None);
    }

    #[test]
    fn tier_names() {
        let name = |tier| UserRecord { tier, ..Default::default() }.tier_name();
        assert_eq!(name(0), "Unrated");
        assert_eq!(name(1), "Bronze V");
        assert_eq!(name(5), "Bronze I");
        assert_eq!(name(13), "Gold III");
        assert_eq!(name(30), "Ruby I");
        assert_eq!(name(31), "Master");
        assert_eq!(name(99), "Unrated");
    }

    #[test]
    fn class_outside_range_is_not_earned() {
        let user = UserRecord {
            class: Some(0),
            ..Default::default()
        };
        assert_eq!(user.earned_class(), None);
        let user = UserRecord {
            class: Some(11),
            ..Default::default()
        };
        assert_eq!(user.earned_class(), None);
    }
}
