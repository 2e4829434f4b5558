use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpTiming {
    NoHistory,
    TooSoon,
    OptimalWindow,
    AtRisk,
    GoneCold,
}

impl FollowUpTiming {
    /// Buckets days since the last contact. Boundaries belong to the later bracket.
    pub fn classify(days_since_last: i64) -> Self {
        match days_since_last {
            days if days < 3 => Self::TooSoon,
            3..=6 => Self::OptimalWindow,
            7..=13 => Self::AtRisk,
            _ => Self::GoneCold,
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            Self::NoHistory => "No previous interactions - initiate contact",
            Self::TooSoon => "Wait 2 more days before following up",
            Self::OptimalWindow => "Follow up now - optimal timing",
            Self::AtRisk => "Follow up urgently - at risk of going cold",
            Self::GoneCold => "Re-engage with new value proposition",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactMethod {
    #[serde(rename = "Email")]
    Email,
    #[serde(rename = "Phone call")]
    PhoneCall,
    #[serde(rename = "Email with proposal")]
    EmailWithProposal,
    #[serde(rename = "In-person meeting")]
    InPersonMeeting,
    #[serde(rename = "Personalized check-in")]
    PersonalizedCheckIn,
}

impl ContactMethod {
    /// Next outreach step for a customer with `interaction_count` prior touchpoints.
    pub fn for_interaction_count(interaction_count: usize) -> Self {
        match interaction_count {
            0 => Self::Email,
            1 => Self::PhoneCall,
            2 => Self::EmailWithProposal,
            3 => Self::InPersonMeeting,
            _ => Self::PersonalizedCheckIn,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::PhoneCall => "Phone call",
            Self::EmailWithProposal => "Email with proposal",
            Self::InPersonMeeting => "In-person meeting",
            Self::PersonalizedCheckIn => "Personalized check-in",
        }
    }

    pub fn message_theme(&self) -> &'static str {
        match self {
            Self::Email => "Introduction and value proposition",
            Self::PhoneCall => "Discuss specific needs and requirements",
            Self::EmailWithProposal => "Share tailored solution based on previous discussions",
            Self::InPersonMeeting => "Presentation and closing",
            Self::PersonalizedCheckIn => "Relationship maintenance and upsell opportunities",
        }
    }
}

impl std::fmt::Display for ContactMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "flag", rename_all = "snake_case")]
pub enum DataQualityFlag {
    UnparsableTimestamp { raw: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpPlan {
    pub timing: FollowUpTiming,
    pub timing_guidance: String,
    pub recommended_method: ContactMethod,
    pub suggested_message: String,
    pub interaction_count: usize,
    pub days_since_last_contact: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_quality: Option<DataQualityFlag>,
}

impl FollowUpPlan {
    pub fn no_history() -> Self {
        Self::build(FollowUpTiming::NoHistory, 0, None, None)
    }

    pub(crate) fn with_history(
        interaction_count: usize,
        days_since_last_contact: i64,
        data_quality: Option<DataQualityFlag>,
    ) -> Self {
        Self::build(
            FollowUpTiming::classify(days_since_last_contact),
            interaction_count,
            Some(days_since_last_contact),
            data_quality,
        )
    }

    fn build(
        timing: FollowUpTiming,
        interaction_count: usize,
        days_since_last_contact: Option<i64>,
        data_quality: Option<DataQualityFlag>,
    ) -> Self {
        let method = ContactMethod::for_interaction_count(interaction_count);
        Self {
            timing,
            timing_guidance: timing.guidance().to_string(),
            recommended_method: method,
            suggested_message: method.message_theme().to_string(),
            interaction_count,
            days_since_last_contact,
            data_quality,
        }
    }
}
