//! Session status summary.
//!
//! Computes a deterministic snapshot of the stored session for `status`,
//! printable as plain lines or as JSON for scripts.

use crate::flow::FlowPlan;
use crate::store::SessionStore;
use serde::Serialize;

pub const SUMMARY_SCHEMA_VERSION: u32 = 1;

/// Snapshot of one stored session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub schema_version: u32,
    /// Raw stored marker.
    pub step: u32,
    /// Marker resolved to the screen the session actually renders.
    pub display_step: u32,
    pub total_steps: u32,
    pub screen: String,
    pub lead_id: Option<String>,
    pub role: Option<String>,
    pub completed: bool,
    pub captured: Vec<String>,
}

pub fn build_summary<S: SessionStore>(plan: &FlowPlan, store: &S) -> SessionSummary {
    let record = store.load_record();
    let step = store.load_step().unwrap_or(0);
    let (display_step, screen) = plan.resolve(record.role(), step);
    SessionSummary {
        schema_version: SUMMARY_SCHEMA_VERSION,
        step,
        display_step,
        total_steps: plan.total_steps(),
        screen: screen.label().to_string(),
        lead_id: record.lead_id().map(str::to_owned),
        role: record.role().map(|role| role.to_string()),
        completed: record.completed(),
        captured: record.keys().map(str::to_owned).collect(),
    }
}

/// Print a human-readable summary to stdout.
pub fn print_summary(summary: &SessionSummary) {
    println!(
        "step: {} of {}",
        summary.display_step,
        summary.total_steps.saturating_sub(1)
    );
    println!("screen: {}", summary.screen);
    if let Some(lead_id) = summary.lead_id.as_ref() {
        println!("lead: {lead_id}");
    }
    if let Some(role) = summary.role.as_ref() {
        println!("role: {role}");
    }
    println!("completed: {}", summary.completed);
    if !summary.captured.is_empty() {
        println!("captured: {}", summary.captured.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn empty_store_summarizes_as_fresh_session() {
        let plan = FlowPlan::standard();
        let summary = build_summary(&plan, &MemoryStore::new());
        assert_eq!(summary.step, 0);
        assert_eq!(summary.display_step, 0);
        assert_eq!(summary.screen, "landing");
        assert_eq!(summary.lead_id, None);
        assert!(!summary.completed);
        assert!(summary.captured.is_empty());
    }

    #[test]
    fn seeded_store_summarizes_position_and_lead() {
        let store = MemoryStore::with_raw(
            Some(r#"{"name":"Asha Rao","role":"Investor","lead_id":"CS0001"}"#),
            Some("4"),
        );
        let plan = FlowPlan::standard();
        let summary = build_summary(&plan, &store);
        assert_eq!(summary.step, 4);
        assert_eq!(summary.display_step, 4);
        assert_eq!(summary.screen, "question");
        assert_eq!(summary.lead_id.as_deref(), Some("CS0001"));
        assert_eq!(summary.role.as_deref(), Some("Investor"));
        assert_eq!(summary.captured, vec!["lead_id", "name", "role"]);
    }

    #[test]
    fn stored_role_without_coverage_reports_fallback_screen() {
        let store = MemoryStore::with_raw(Some(r#"{"role":"Unknown"}"#), Some("4"));
        let plan = FlowPlan::standard();
        let summary = build_summary(&plan, &store);
        assert_eq!(summary.step, 4);
        assert_eq!(summary.display_step, 2);
        assert_eq!(summary.screen, "role_select");
        assert_eq!(summary.role, None);
    }

    #[test]
    fn summary_serializes_for_scripts() {
        let plan = FlowPlan::standard();
        let value =
            serde_json::to_value(build_summary(&plan, &MemoryStore::new())).expect("json");
        assert_eq!(value["screen"], "landing");
        assert_eq!(value["step"], 0);
    }
}
