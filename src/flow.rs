//! Declarative step table for the wizard.
//!
//! A flow plan is an ordered list of step definitions. Branch steps hold one
//! question per role; which question shows is decided at display time from
//! the stored record, so re-picking a role after navigating back retargets
//! every later branch step without touching stored answers.

use crate::record::Role;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const FLOW_SCHEMA_VERSION: u32 = 1;

/// Full-screen intro with a single call to action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandingDef {
    pub title: String,
    pub blurb: String,
    pub cta: String,
}

/// Which validator gates a contact field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Name,
    Phone,
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactField {
    pub key: String,
    pub label: String,
    pub hint: String,
    pub kind: FieldKind,
}

/// Free-text capture step; advances only when every field validates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDef {
    pub title: String,
    pub fields: Vec<ContactField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleOption {
    pub role: Role,
    pub label: String,
}

/// Single-select that decides which branch the later steps take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSelectDef {
    pub title: String,
    pub options: Vec<RoleOption>,
}

/// One single-select question inside a branch step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDef {
    pub patch_key: String,
    pub title: String,
    pub options: Vec<String>,
}

/// Role-dependent step: exactly one question per covered role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchDef {
    pub questions: BTreeMap<Role, QuestionDef>,
}

/// Terminal screen with brochure and WhatsApp handoffs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThankYouDef {
    pub title: String,
    pub blurb: String,
    pub tagline: String,
    pub complete_on_handoff: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepDef {
    Landing(LandingDef),
    Contact(ContactDef),
    RoleSelect(RoleSelectDef),
    Branch(BranchDef),
    ThankYou(ThankYouDef),
}

impl StepDef {
    pub fn label(&self) -> &'static str {
        match self {
            StepDef::Landing(_) => "landing",
            StepDef::Contact(_) => "contact",
            StepDef::RoleSelect(_) => "role_select",
            StepDef::Branch(_) => "branch",
            StepDef::ThankYou(_) => "thank_you",
        }
    }
}

/// Concrete screen a session renders once branches are resolved.
#[derive(Debug, Clone, Copy)]
pub enum Screen<'a> {
    Landing(&'a LandingDef),
    Contact(&'a ContactDef),
    RoleSelect(&'a RoleSelectDef),
    Question(&'a QuestionDef),
    ThankYou(&'a ThankYouDef),
}

impl Screen<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            Screen::Landing(_) => "landing",
            Screen::Contact(_) => "contact",
            Screen::RoleSelect(_) => "role_select",
            Screen::Question(_) => "question",
            Screen::ThankYou(_) => "thank_you",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowPlan {
    pub schema_version: u32,
    pub steps: Vec<StepDef>,
}

impl FlowPlan {
    pub fn step(&self, index: u32) -> Option<&StepDef> {
        self.steps.get(index as usize)
    }

    /// Index of the final step.
    pub fn last_step(&self) -> u32 {
        (self.steps.len().saturating_sub(1)) as u32
    }

    pub fn total_steps(&self) -> u32 {
        self.steps.len() as u32
    }

    /// Stored step markers may exceed the table after a plan change; clamp
    /// for display without rewriting the marker.
    pub fn clamp_step(&self, step: u32) -> u32 {
        step.min(self.last_step())
    }

    /// Resolve a stored step marker to the screen it can actually render.
    ///
    /// A branch step needs a stored role it covers; otherwise the session
    /// falls back to the nearest earlier renderable step, usually the role
    /// prompt. The marker itself is rewritten only by the next transition,
    /// never by resolution.
    pub fn resolve(&self, role: Option<Role>, step: u32) -> (u32, Screen<'_>) {
        let mut index = self.clamp_step(step);
        loop {
            match &self.steps[index as usize] {
                StepDef::Landing(def) => return (index, Screen::Landing(def)),
                StepDef::Contact(def) => return (index, Screen::Contact(def)),
                StepDef::RoleSelect(def) => return (index, Screen::RoleSelect(def)),
                StepDef::ThankYou(def) => return (index, Screen::ThankYou(def)),
                StepDef::Branch(def) => {
                    match role.and_then(|role| def.questions.get(&role)) {
                        Some(question) => return (index, Screen::Question(question)),
                        // validate() puts a renderable step below every branch
                        None => index -= 1,
                    }
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != FLOW_SCHEMA_VERSION {
            bail!(
                "unsupported flow schema_version {} (expected {})",
                self.schema_version,
                FLOW_SCHEMA_VERSION
            );
        }
        if self.steps.is_empty() {
            bail!("flow plan has no steps");
        }
        let mut role_select_seen = false;
        for (index, step) in self.steps.iter().enumerate() {
            match step {
                StepDef::Landing(_) | StepDef::ThankYou(_) => {}
                StepDef::Contact(def) => {
                    if def.fields.is_empty() {
                        bail!("contact step {index} has no fields");
                    }
                    for field in &def.fields {
                        if field.key.trim().is_empty() {
                            bail!("contact step {index} has a field with an empty key");
                        }
                    }
                }
                StepDef::RoleSelect(def) => {
                    if def.options.is_empty() {
                        bail!("role select step {index} has no options");
                    }
                    role_select_seen = true;
                }
                StepDef::Branch(def) => {
                    if !role_select_seen {
                        bail!("branch step {index} appears before any role select step");
                    }
                    if def.questions.is_empty() {
                        bail!("branch step {index} covers no roles");
                    }
                    for (role, question) in &def.questions {
                        if question.patch_key.trim().is_empty() {
                            bail!("branch step {index} ({role}) has an empty patch key");
                        }
                        if question.options.is_empty() {
                            bail!("branch step {index} ({role}) has no options");
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Load a custom plan from disk.
    pub fn load(path: &Path) -> Result<FlowPlan> {
        let raw = fs::read(path)
            .with_context(|| format!("reading flow plan {}", path.display()))?;
        let plan: FlowPlan = serde_json::from_slice(&raw)
            .with_context(|| format!("parsing flow plan {}", path.display()))?;
        plan.validate()
            .with_context(|| format!("validating flow plan {}", path.display()))?;
        Ok(plan)
    }

    /// The built-in franchise enquiry flow.
    pub fn standard() -> FlowPlan {
        let budget_options = || {
            vec![
                "₹18 L – ₹25 L".to_string(),
                "₹26 L – ₹35 L".to_string(),
                "Above ₹35 L".to_string(),
            ]
        };
        let contact_windows = || {
            vec![
                "Morning (10 AM – 12 PM)".to_string(),
                "Afternoon (12 PM – 4 PM)".to_string(),
                "Evening (4 PM – 7 PM)".to_string(),
            ]
        };
        FlowPlan {
            schema_version: FLOW_SCHEMA_VERSION,
            steps: vec![
                StepDef::Landing(LandingDef {
                    title: "Own a Premium Bakery Franchise".to_string(),
                    blurb: "Be part of a fast-growing bakery brand from The FreshlyMade, \
                            trusted for over 13 years."
                        .to_string(),
                    cta: "Continue".to_string(),
                }),
                StepDef::Contact(ContactDef {
                    title: "Tell us about yourself".to_string(),
                    fields: vec![
                        ContactField {
                            key: "name".to_string(),
                            label: "Name".to_string(),
                            hint: "We’d love to know who we’re speaking with.".to_string(),
                            kind: FieldKind::Name,
                        },
                        ContactField {
                            key: "phone".to_string(),
                            label: "Phone Number".to_string(),
                            hint: "Our franchise team will call or WhatsApp you within 24 hours."
                                .to_string(),
                            kind: FieldKind::Phone,
                        },
                        ContactField {
                            key: "email".to_string(),
                            label: "Email".to_string(),
                            hint: "We’ll send your Cake Stories franchise brochure and setup \
                                   details."
                                .to_string(),
                            kind: FieldKind::Email,
                        },
                    ],
                }),
                StepDef::RoleSelect(RoleSelectDef {
                    title: "which best describes you?".to_string(),
                    options: vec![
                        RoleOption {
                            role: Role::BusinessOwner,
                            label: "I’m a Business Owner".to_string(),
                        },
                        RoleOption {
                            role: Role::Investor,
                            label: "I’m an Investor".to_string(),
                        },
                        RoleOption {
                            role: Role::Exploring,
                            label: "I’m Exploring new franchise opportunities".to_string(),
                        },
                    ],
                }),
                StepDef::Branch(BranchDef {
                    questions: BTreeMap::from([
                        (
                            Role::BusinessOwner,
                            QuestionDef {
                                patch_key: "business_type".to_string(),
                                title: "What kind of business do you currently operate?"
                                    .to_string(),
                                options: vec![
                                    "Café or Restaurant".to_string(),
                                    "Bakery or Cloud Kitchen".to_string(),
                                    "Retail or FMCG Outlet".to_string(),
                                    "Other".to_string(),
                                ],
                            },
                        ),
                        (
                            Role::Investor,
                            QuestionDef {
                                patch_key: "investor_interest".to_string(),
                                title: "What type of franchise are you most interested in?"
                                    .to_string(),
                                options: vec![
                                    "Food & Beverage Franchise".to_string(),
                                    "Café or Dessert Concept".to_string(),
                                    "Premium Bakery Brand".to_string(),
                                    "Open to explore options".to_string(),
                                ],
                            },
                        ),
                        (
                            Role::Exploring,
                            QuestionDef {
                                patch_key: "exploring_kind".to_string(),
                                title: "What kind of business are you most excited to start?"
                                    .to_string(),
                                options: vec![
                                    "Food & Beverage or Café Concept".to_string(),
                                    "Bakery or Dessert Brand".to_string(),
                                    "Quick-Service Restaurant (QSR)".to_string(),
                                    "Still deciding".to_string(),
                                ],
                            },
                        ),
                    ]),
                }),
                StepDef::Branch(BranchDef {
                    questions: BTreeMap::from([
                        (
                            Role::BusinessOwner,
                            QuestionDef {
                                patch_key: "investment_range".to_string(),
                                title: "What’s your available investment range for expansion?"
                                    .to_string(),
                                options: budget_options(),
                            },
                        ),
                        (
                            Role::Investor,
                            QuestionDef {
                                patch_key: "investor_budget".to_string(),
                                title: "What’s your investment budget?".to_string(),
                                options: budget_options(),
                            },
                        ),
                        (
                            Role::Exploring,
                            QuestionDef {
                                patch_key: "exploring_budget".to_string(),
                                title: "What’s your estimated investment capacity?".to_string(),
                                options: budget_options(),
                            },
                        ),
                    ]),
                }),
                StepDef::Branch(BranchDef {
                    questions: BTreeMap::from([
                        (
                            Role::BusinessOwner,
                            QuestionDef {
                                patch_key: "contact_time".to_string(),
                                title: "When is the best time for our team to reach you?"
                                    .to_string(),
                                options: contact_windows(),
                            },
                        ),
                        (
                            Role::Investor,
                            QuestionDef {
                                patch_key: "investor_contact_time".to_string(),
                                title: "When is a good time for us to contact you?".to_string(),
                                options: contact_windows(),
                            },
                        ),
                        (
                            Role::Exploring,
                            QuestionDef {
                                patch_key: "exploring_timeline".to_string(),
                                title: "When are you planning to start your business?".to_string(),
                                options: vec![
                                    "Within 1 month".to_string(),
                                    "1–3 months".to_string(),
                                    "3–6 months".to_string(),
                                    "Not sure yet".to_string(),
                                ],
                            },
                        ),
                    ]),
                }),
                StepDef::ThankYou(ThankYouDef {
                    title: "Thank you".to_string(),
                    blurb: "Our franchise team will connect with you soon to discuss your \
                            preferred city and model options."
                        .to_string(),
                    tagline: "Get ready to start your sweet success story!".to_string(),
                    complete_on_handoff: true,
                }),
            ],
        }
    }
}
