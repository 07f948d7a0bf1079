//! Lead record and patch types shared by the store, the sync client, and
//! the flow controller.
//!
//! A lead is an open map from field name to JSON value so a deployment can
//! add survey keys through its flow plan without touching this crate. The
//! same flat object shape is written to disk and posted to the save
//! endpoint, which lets a stored session be resubmitted as-is.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Field keys the flow reads or writes directly.
pub const KEY_NAME: &str = "name";
pub const KEY_PHONE: &str = "phone";
pub const KEY_EMAIL: &str = "email";
pub const KEY_ROLE: &str = "role";
pub const KEY_LEAD_ID: &str = "lead_id";
pub const KEY_COMPLETED: &str = "completed";

/// Visitor segment picked on the role step.
///
/// The wire labels are what the save endpoint and any stored sessions carry,
/// so they stay spelled exactly like the marketing site sent them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Role {
    #[serde(rename = "Business Owner")]
    BusinessOwner,
    Investor,
    Exploring,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::BusinessOwner => "Business Owner",
            Role::Investor => "Investor",
            Role::Exploring => "Exploring",
        }
    }

    /// Parse a stored wire label. Unknown labels read as `None` so stale or
    /// hand-edited session data degrades to the role prompt, not a crash.
    pub fn parse(label: &str) -> Option<Role> {
        match label.trim() {
            "Business Owner" => Some(Role::BusinessOwner),
            "Investor" => Some(Role::Investor),
            "Exploring" => Some(Role::Exploring),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated answers for one enquiry session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadRecord {
    fields: BTreeMap<String, Value>,
}

impl LeadRecord {
    pub fn new() -> LeadRecord {
        LeadRecord::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// String view of a field; non-string values read as absent.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.text(KEY_NAME)
    }

    pub fn phone(&self) -> Option<&str> {
        self.text(KEY_PHONE)
    }

    pub fn email(&self) -> Option<&str> {
        self.text(KEY_EMAIL)
    }

    pub fn lead_id(&self) -> Option<&str> {
        self.text(KEY_LEAD_ID)
    }

    pub fn role(&self) -> Option<Role> {
        self.text(KEY_ROLE).and_then(Role::parse)
    }

    pub fn completed(&self) -> bool {
        self.get(KEY_COMPLETED)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// First word of the captured name, for greeting copy.
    pub fn first_name(&self) -> &str {
        self.name()
            .and_then(|name| name.split_whitespace().next())
            .unwrap_or("there")
    }

    /// Shallow union with `patch`; patch entries win per key.
    ///
    /// Explicit JSON nulls in the patch are skipped, so an acknowledged
    /// `lead_id` can never be erased by a later merge.
    pub fn merged(&self, patch: &LeadPatch) -> LeadRecord {
        let mut fields = self.fields.clone();
        for (key, value) in &patch.0 {
            if value.is_null() {
                continue;
            }
            fields.insert(key.clone(), value.clone());
        }
        LeadRecord { fields }
    }

    pub(crate) fn set_text(&mut self, key: &str, value: String) {
        self.fields.insert(key.to_string(), Value::String(value));
    }

    /// Keys currently present, for status output.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Partial update produced by one wizard action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadPatch(BTreeMap<String, Value>);

impl LeadPatch {
    pub fn new() -> LeadPatch {
        LeadPatch::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn set(mut self, key: &str, value: impl Into<Value>) -> LeadPatch {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Union of two patches; `other` wins per key.
    pub fn merged(&self, other: &LeadPatch) -> LeadPatch {
        let mut fields = self.0.clone();
        for (key, value) in &other.0 {
            fields.insert(key.clone(), value.clone());
        }
        LeadPatch(fields)
    }
}
