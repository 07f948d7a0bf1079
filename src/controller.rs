//! Step flow controller.
//!
//! One reducer owns the session: it resolves the stored step marker to a
//! screen, checks an intent against that screen, performs at most one
//! submission, and only then persists the merged record and new marker.
//! Failed submissions leave both exactly as they were, so repeating the
//! same action is a retry. Navigating back never submits.

use crate::flow::{ContactDef, FieldKind, FlowPlan, Screen};
use crate::record::{LeadPatch, LeadRecord, KEY_COMPLETED, KEY_LEAD_ID, KEY_ROLE};
use crate::store::SessionStore;
use crate::sync::{LeadGateway, SyncError};
use crate::validate::{valid_email, valid_name, valid_phone};
use anyhow::{Context, Result};
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Shown when the contact step is confirmed with any invalid field.
pub const CONTACT_GUARD_MESSAGE: &str = "Please fill all fields correctly.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// Input rejected before any network round trip.
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Sync(#[from] SyncError),
    /// Intent does not apply to the current screen.
    #[error("{0}")]
    Unsupported(String),
}

/// What the user did, independent of how the frontend captured it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Edit { key: String, value: String },
    Continue,
    Pick { value: String },
    Back,
    DownloadBrochure,
    WhatsAppHandoff,
    Restart,
}

impl Intent {
    fn label(&self) -> &'static str {
        match self {
            Intent::Edit { .. } => "edit",
            Intent::Continue => "continue",
            Intent::Pick { .. } => "pick",
            Intent::Back => "back",
            Intent::DownloadBrochure => "download brochure",
            Intent::WhatsAppHandoff => "whatsapp handoff",
            Intent::Restart => "restart",
        }
    }
}

/// Side effect for the presentation layer to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SaveBrochure { source: PathBuf, filename: String },
    OpenUrl { url: String },
}

/// Deployment-specific handoff targets from the config layer.
#[derive(Debug, Clone)]
pub struct HandoffParams {
    pub brand: String,
    pub whatsapp_number: String,
    pub brochure_source: PathBuf,
    pub brochure_filename: String,
}

/// Owned outcome of intent resolution, applied after all borrows end.
enum Action {
    Edit { key: String, value: String },
    Jump { target: u32 },
    Advance { patch: LeadPatch, target: u32 },
    Handoff { complete: bool },
    Brochure,
}

pub struct FlowController<S, G> {
    plan: FlowPlan,
    handoff: HandoffParams,
    store: S,
    gateway: G,
    record: LeadRecord,
    step: u32,
}

impl<S: SessionStore, G: LeadGateway> FlowController<S, G> {
    /// Rebuild the session from whatever the store holds. Unreadable state
    /// loads as a fresh session; an invalid plan is refused outright.
    pub fn restore(
        plan: FlowPlan,
        handoff: HandoffParams,
        store: S,
        gateway: G,
    ) -> Result<FlowController<S, G>> {
        plan.validate().context("flow plan failed validation")?;
        let record = store.load_record();
        let step = store.load_step().unwrap_or(0);
        Ok(FlowController {
            plan,
            handoff,
            store,
            gateway,
            record,
            step,
        })
    }

    pub fn record(&self) -> &LeadRecord {
        &self.record
    }

    pub fn plan(&self) -> &FlowPlan {
        &self.plan
    }

    /// Raw stored marker; may point past the plan or at an unrenderable
    /// branch. `display_step` is the resolved position.
    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn display_step(&self) -> u32 {
        self.resolve().0
    }

    pub fn screen(&self) -> Screen<'_> {
        self.resolve().1
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn resolve(&self) -> (u32, Screen<'_>) {
        self.plan.resolve(self.record.role(), self.step)
    }

    fn contact_ready(&self, def: &ContactDef) -> bool {
        def.fields.iter().all(|field| {
            let value = self.record.text(&field.key).unwrap_or("");
            match field.kind {
                FieldKind::Name => valid_name(value),
                FieldKind::Phone => valid_phone(value),
                FieldKind::Email => valid_email(value),
            }
        })
    }

    /// Whether applying this intent from the current screen would reach the
    /// gateway. Intents the reducer rejects locally never submit, so a
    /// frontend can show its saving notice only when a round trip is coming.
    pub fn will_submit(&self, intent: &Intent) -> bool {
        match (self.screen(), intent) {
            (Screen::Contact(def), Intent::Continue) => self.contact_ready(def),
            (Screen::RoleSelect(def), Intent::Pick { value }) => def
                .options
                .iter()
                .any(|option| option.role.as_str() == value.as_str()),
            (Screen::Question(question), Intent::Pick { value }) => {
                question.options.iter().any(|option| option == value)
            }
            (Screen::ThankYou(def), Intent::WhatsAppHandoff) => {
                def.complete_on_handoff && !self.record.completed()
            }
            _ => false,
        }
    }

    /// Apply one intent to the current screen.
    ///
    /// Edits stay local. Confirming the contact step, picking a role, and
    /// answering a branch question each submit the merged record once and
    /// move forward only on acknowledgement. The WhatsApp handoff marks the
    /// lead completed (and submits that) the first time it runs.
    pub fn apply(&mut self, intent: Intent) -> Result<Vec<Effect>, FlowError> {
        let (step, screen) = self.resolve();
        let action = match (screen, intent) {
            (_, Intent::Back) => Action::Jump {
                target: step.saturating_sub(1),
            },
            (_, Intent::Restart) => Action::Jump { target: 0 },
            (Screen::Landing(_), Intent::Continue) => Action::Jump { target: step + 1 },
            (Screen::Contact(def), Intent::Edit { key, value }) => {
                if !def.fields.iter().any(|field| field.key == key) {
                    return Err(FlowError::Unsupported(format!(
                        "no editable field `{key}` on this screen"
                    )));
                }
                Action::Edit { key, value }
            }
            (Screen::Contact(def), Intent::Continue) => {
                if !self.contact_ready(def) {
                    return Err(FlowError::Validation(CONTACT_GUARD_MESSAGE.to_string()));
                }
                Action::Advance {
                    patch: LeadPatch::new(),
                    target: step + 1,
                }
            }
            (Screen::RoleSelect(def), Intent::Pick { value }) => {
                if !def.options.iter().any(|option| option.role.as_str() == value) {
                    return Err(FlowError::Validation(
                        "pick one of the listed options".to_string(),
                    ));
                }
                Action::Advance {
                    patch: LeadPatch::new().set(KEY_ROLE, value),
                    target: step + 1,
                }
            }
            (Screen::Question(question), Intent::Pick { value }) => {
                if !question.options.iter().any(|option| option == &value) {
                    return Err(FlowError::Validation(
                        "pick one of the listed options".to_string(),
                    ));
                }
                Action::Advance {
                    patch: LeadPatch::new().set(&question.patch_key, value),
                    target: step + 1,
                }
            }
            (Screen::ThankYou(_), Intent::DownloadBrochure) => Action::Brochure,
            (Screen::ThankYou(def), Intent::WhatsAppHandoff) => Action::Handoff {
                complete: def.complete_on_handoff,
            },
            (screen, intent) => {
                return Err(FlowError::Unsupported(format!(
                    "`{}` is not available on the {} screen",
                    intent.label(),
                    screen.label()
                )));
            }
        };

        match action {
            Action::Edit { key, value } => {
                self.record.set_text(&key, value);
                self.store.save_record(&self.record);
                Ok(Vec::new())
            }
            Action::Jump { target } => {
                self.step = target;
                self.store.save_step(target);
                Ok(Vec::new())
            }
            Action::Advance { patch, target } => {
                self.advance_with(&patch, Some(target))?;
                Ok(Vec::new())
            }
            Action::Brochure => Ok(vec![Effect::SaveBrochure {
                source: self.handoff.brochure_source.clone(),
                filename: self.handoff.brochure_filename.clone(),
            }]),
            Action::Handoff { complete } => {
                if complete && !self.record.completed() {
                    let patch = LeadPatch::new().set(KEY_COMPLETED, true);
                    self.advance_with(&patch, None)?;
                }
                Ok(vec![Effect::OpenUrl {
                    url: self.whatsapp_url(),
                }])
            }
        }
    }

    /// Submit the merged record; persist and move only on acknowledgement.
    ///
    /// A fresh `lead_id` from the ack is adopted, while an ack without one
    /// keeps the id already on file. Later submissions therefore update the
    /// same server-side lead instead of creating duplicates.
    fn advance_with(&mut self, patch: &LeadPatch, target: Option<u32>) -> Result<(), FlowError> {
        let merged = self.record.merged(patch);
        let ack = self.gateway.submit(&merged)?;
        let lead_id = ack
            .lead_id
            .or_else(|| merged.lead_id().map(str::to_owned));
        self.record = merged;
        if let Some(lead_id) = lead_id {
            self.record.set_text(KEY_LEAD_ID, lead_id);
        }
        self.store.save_record(&self.record);
        if let Some(target) = target {
            self.step = target;
            self.store.save_step(target);
        }
        tracing::info!(
            step = self.step,
            lead_id = self.record.lead_id().unwrap_or("-"),
            "lead state saved"
        );
        Ok(())
    }

    /// wa.me deep link with the prefilled introduction message.
    fn whatsapp_url(&self) -> String {
        let message = format!(
            "Hi, I'm {}. I just submitted the {} franchise form. \
             Please share the brochure and next steps.",
            self.record.first_name(),
            self.handoff.brand
        );
        let base = format!("https://wa.me/{}", self.handoff.whatsapp_number);
        match Url::parse_with_params(&base, [("text", message.as_str())]) {
            Ok(url) => String::from(url),
            Err(_) => base,
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
