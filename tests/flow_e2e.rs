use std::collections::VecDeque;

use lead_wizard::config;
use lead_wizard::controller::{Effect, FlowController, Intent};
use lead_wizard::flow::{FlowPlan, Screen};
use lead_wizard::record::{LeadRecord, Role, KEY_EMAIL, KEY_NAME, KEY_PHONE};
use lead_wizard::status::build_summary;
use lead_wizard::store::MemoryStore;
use lead_wizard::sync::{LeadGateway, LoopbackGateway, SyncAck, SyncError};

struct ScriptedGateway {
    replies: VecDeque<Result<SyncAck, SyncError>>,
    submitted: Vec<serde_json::Value>,
}

impl ScriptedGateway {
    fn new() -> ScriptedGateway {
        ScriptedGateway::scripted(Vec::new())
    }

    fn scripted(replies: Vec<Result<SyncAck, SyncError>>) -> ScriptedGateway {
        ScriptedGateway {
            replies: replies.into(),
            submitted: Vec::new(),
        }
    }
}

impl LeadGateway for ScriptedGateway {
    fn submit(&mut self, record: &LeadRecord) -> Result<SyncAck, SyncError> {
        self.submitted
            .push(serde_json::to_value(record).expect("serialize record"));
        self.replies.pop_front().unwrap_or_else(|| {
            Ok(SyncAck {
                lead_id: Some("CS0001".to_string()),
            })
        })
    }
}

fn controller(gateway: ScriptedGateway) -> FlowController<MemoryStore, ScriptedGateway> {
    FlowController::restore(
        FlowPlan::standard(),
        config::handoff_params(&config::default_config()),
        MemoryStore::new(),
        gateway,
    )
    .expect("restore controller")
}

fn edit(key: &str, value: &str) -> Intent {
    Intent::Edit {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn pick(value: &str) -> Intent {
    Intent::Pick {
        value: value.to_string(),
    }
}

fn fill_contact<G: LeadGateway>(wizard: &mut FlowController<MemoryStore, G>) {
    wizard.apply(edit(KEY_NAME, "Asha Rao")).expect("edit name");
    wizard
        .apply(edit(KEY_PHONE, "+919876543210"))
        .expect("edit phone");
    wizard
        .apply(edit(KEY_EMAIL, "asha@example.com"))
        .expect("edit email");
}

fn first_option<G: LeadGateway>(wizard: &FlowController<MemoryStore, G>) -> String {
    match wizard.screen() {
        Screen::Question(question) => question.options[0].clone(),
        other => panic!("expected a question screen, got {}", other.label()),
    }
}

#[test]
fn investor_walkthrough_submits_at_each_confirmation() {
    let mut wizard = controller(ScriptedGateway::scripted(vec![
        Ok(SyncAck {
            lead_id: Some("CS0001".to_string()),
        }),
        Ok(SyncAck { lead_id: None }),
    ]));

    assert!(matches!(wizard.screen(), Screen::Landing(_)));
    wizard.apply(Intent::Continue).expect("leave landing");

    fill_contact(&mut wizard);
    wizard.apply(Intent::Continue).expect("confirm contact");
    assert_eq!(wizard.record().lead_id(), Some("CS0001"));

    wizard
        .apply(pick(Role::Investor.as_str()))
        .expect("pick role");
    // the ack without an id kept the id already on file
    assert_eq!(wizard.record().lead_id(), Some("CS0001"));

    for _ in 0..3 {
        let choice = first_option(&wizard);
        wizard.apply(pick(&choice)).expect("answer question");
    }

    assert!(matches!(wizard.screen(), Screen::ThankYou(_)));
    assert_eq!(wizard.display_step(), wizard.plan().last_step());
    assert_eq!(wizard.record().first_name(), "Asha");

    let effects = wizard.apply(Intent::WhatsAppHandoff).expect("handoff");
    match effects.as_slice() {
        [Effect::OpenUrl { url }] => {
            assert!(url.contains("wa.me/919962522374"), "url: {url}");
            assert!(url.contains("Asha"), "url: {url}");
        }
        other => panic!("expected one open-url effect, got {other:?}"),
    }
    assert!(wizard.record().completed());

    let submitted = &wizard.gateway().submitted;
    assert_eq!(submitted.len(), 6);
    let last = submitted.last().expect("final submission");
    assert_eq!(last.get("completed"), Some(&serde_json::Value::Bool(true)));
    assert_eq!(
        last.get("role").and_then(|value| value.as_str()),
        Some("Investor")
    );

    // a repeat handoff reopens the link without submitting again
    let effects = wizard
        .apply(Intent::WhatsAppHandoff)
        .expect("repeat handoff");
    assert!(matches!(effects.as_slice(), [Effect::OpenUrl { .. }]));
    assert_eq!(wizard.gateway().submitted.len(), 6);
}

#[test]
fn rejected_submission_is_retryable_in_place() {
    let mut wizard = controller(ScriptedGateway::scripted(vec![Err(
        SyncError::Rejected {
            message: "duplicate phone".to_string(),
        },
    )]));

    wizard.apply(Intent::Continue).expect("leave landing");
    fill_contact(&mut wizard);

    let err = wizard
        .apply(Intent::Continue)
        .expect_err("rejected submit");
    assert_eq!(err.to_string(), "duplicate phone");
    assert!(matches!(wizard.screen(), Screen::Contact(_)));
    assert_eq!(wizard.record().lead_id(), None);
    assert_eq!(wizard.record().name(), Some("Asha Rao"));

    wizard.apply(Intent::Continue).expect("retry succeeds");
    assert_eq!(wizard.record().lead_id(), Some("CS0001"));
    assert!(matches!(wizard.screen(), Screen::RoleSelect(_)));
}

#[test]
fn status_summary_tracks_the_stored_session() {
    let mut wizard = controller(ScriptedGateway::new());
    wizard.apply(Intent::Continue).expect("leave landing");
    fill_contact(&mut wizard);
    wizard.apply(Intent::Continue).expect("confirm contact");

    let summary = build_summary(wizard.plan(), wizard.store());
    assert_eq!(summary.step, 2);
    assert_eq!(summary.display_step, 2);
    assert_eq!(summary.screen, "role_select");
    assert_eq!(summary.lead_id.as_deref(), Some("CS0001"));
    assert!(!summary.completed);
    assert!(summary.captured.iter().any(|key| key == "name"));
    assert!(summary.captured.iter().any(|key| key == "lead_id"));
}

#[test]
fn loopback_gateway_assigns_one_local_id_per_session() {
    let mut wizard = FlowController::restore(
        FlowPlan::standard(),
        config::handoff_params(&config::default_config()),
        MemoryStore::new(),
        LoopbackGateway::new(),
    )
    .expect("restore controller");

    wizard.apply(Intent::Continue).expect("leave landing");
    fill_contact(&mut wizard);
    wizard.apply(Intent::Continue).expect("confirm contact");
    assert_eq!(wizard.record().lead_id(), Some("LOCAL0001"));

    wizard
        .apply(pick(Role::BusinessOwner.as_str()))
        .expect("pick role");
    assert_eq!(wizard.record().lead_id(), Some("LOCAL0001"));
}
