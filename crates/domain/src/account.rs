use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Record identity
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Opaque record id assigned by the store on creation.  Never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Status vocabulary
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub const STATUS_DRAFT: &str = "Draft";
pub const STATUS_NEW: &str = "New";
pub const STATUS_ACTIVE: &str = "Active";
pub const STATUS_DISABLED: &str = "Disabled";
pub const STATUS_DELETED: &str = "Deleted";

/// Allowed values when a user modifies the Status field, in match
/// priority order (the normalizer falls back to the first element).
pub const MODIFY_STATUSES: [&str; 3] = [STATUS_ACTIVE, STATUS_DISABLED, STATUS_NEW];

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Creation stages
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Stage marker for the progressive creation flow.  Persisted in the
/// session entry as its ordinal; `None` means no flow is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum CreationStage {
    Links,
    Description,
    TalkingPoints,
}

impl CreationStage {
    pub fn ordinal(self) -> u8 {
        match self {
            CreationStage::Links => 0,
            CreationStage::Description => 1,
            CreationStage::TalkingPoints => 2,
        }
    }

    /// The next stage, or `None` when the flow is complete.
    pub fn next(self) -> Option<CreationStage> {
        match self {
            CreationStage::Links => Some(CreationStage::Description),
            CreationStage::Description => Some(CreationStage::TalkingPoints),
            CreationStage::TalkingPoints => None,
        }
    }
}

impl From<CreationStage> for u8 {
    fn from(stage: CreationStage) -> u8 {
        stage.ordinal()
    }
}

impl TryFrom<u8> for CreationStage {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(CreationStage::Links),
            1 => Ok(CreationStage::Description),
            2 => Ok(CreationStage::TalkingPoints),
            other => Err(format!("invalid creation stage: {other}")),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Account fields
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The account field set.  Every field is optional text; wire names are
/// the record store's exact column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountFields {
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "Client Company Name", default, skip_serializing_if = "Option::is_none")]
    pub client_company_name: Option<String>,

    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The company website ("Client URL" column).
    #[serde(rename = "Client URL", default, skip_serializing_if = "Option::is_none")]
    pub client_url: Option<String>,

    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(rename = "Industry", default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    #[serde(rename = "Primary Contact Person", default, skip_serializing_if = "Option::is_none")]
    pub primary_contact_person: Option<String>,

    #[serde(rename = "About the Client", default, skip_serializing_if = "Option::is_none")]
    pub about_the_client: Option<String>,

    #[serde(rename = "Primary Objective", default, skip_serializing_if = "Option::is_none")]
    pub primary_objective: Option<String>,

    #[serde(rename = "Talking Points", default, skip_serializing_if = "Option::is_none")]
    pub talking_points: Option<String>,

    #[serde(rename = "Contact Information", default, skip_serializing_if = "Option::is_none")]
    pub contact_information: Option<String>,

    #[serde(rename = "Priority Image", default, skip_serializing_if = "Option::is_none")]
    pub priority_image: Option<String>,

    #[serde(rename = "Instagram", default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,

    #[serde(rename = "Facebook", default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,

    #[serde(rename = "Blog", default, skip_serializing_if = "Option::is_none")]
    pub blog: Option<String>,

    #[serde(rename = "Other Social Accounts", default, skip_serializing_if = "Option::is_none")]
    pub other_social_accounts: Option<String>,
}

impl AccountFields {
    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.to_field_map().is_empty()
    }

    /// The candidate account name: `Name`, falling back to
    /// `Client Company Name`.
    pub fn candidate_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                self.client_company_name
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
            })
    }

    /// Name and company name default each other when only one is set.
    pub fn sync_name_aliases(&mut self) {
        match (&self.name, &self.client_company_name) {
            (Some(n), None) => self.client_company_name = Some(n.clone()),
            (None, Some(c)) => self.name = Some(c.clone()),
            _ => {}
        }
    }

    /// Non-empty fields of `other` overwrite the corresponding fields
    /// of `self`.
    pub fn merge(&mut self, other: &AccountFields) {
        let mut merged = self.to_field_map();
        for (k, v) in other.to_field_map() {
            merged.insert(k, v);
        }
        *self = Self::from_field_map(&merged);
    }

    /// True when at least one link field (website, Instagram, Facebook,
    /// blog) is set.
    pub fn has_any_link(&self) -> bool {
        [&self.client_url, &self.instagram, &self.facebook, &self.blog]
            .iter()
            .any(|f| f.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }

    /// Serialize into a store-ready field map (wire column names, empty
    /// and missing values omitted).
    pub fn to_field_map(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map
                .into_iter()
                .filter(|(_, v)| match v {
                    serde_json::Value::String(s) => !s.trim().is_empty(),
                    serde_json::Value::Null => false,
                    _ => true,
                })
                .collect(),
            _ => serde_json::Map::new(),
        }
    }

    /// Read fields out of a store record's field map.  Unknown columns
    /// and non-string values are ignored.
    pub fn from_field_map(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        serde_json::from_value(serde_json::Value::Object(map.clone())).unwrap_or_default()
    }
}
