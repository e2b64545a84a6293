//! End-to-end workflows through the public `KeelService` API, each over a
//! database file shared by two organizations.

use keel_core::entities::{
    AnswerInput, EsatSubmission, NewDocument, NewEsatQuestion, NewEsatSurvey, NewLead,
    NewProject,
};
use keel_core::enums::{AuditAction, EntityType, EsatSurveyStatus, LeadStage};
use keel_core::identity::Tenant;
use keel_db::repos::AuditFilter;
use keel_db::service::KeelService;
use keel_db::updates::DocumentUpdateBuilder;
use tempfile::TempDir;

async fn tenants() -> (TempDir, KeelService, KeelService) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keel.db");
    let path = path.to_str().unwrap();
    let acme = KeelService::new_local(path, Tenant::new("org_acme", "usr_ana"))
        .await
        .unwrap();
    let globex = KeelService::new_local(path, Tenant::new("org_globex", "usr_hank"))
        .await
        .unwrap();
    (dir, acme, globex)
}

// ---------------------------------------------------------------------------
// ESAT
// ---------------------------------------------------------------------------

#[tokio::test]
async fn public_survey_round() {
    let (_dir, acme, globex) = tenants().await;

    let survey = acme
        .create_survey(&NewEsatSurvey {
            title: "Q3 pulse".into(),
            description: None,
        })
        .await
        .unwrap();
    let workload = acme
        .add_question(
            &survey.id,
            &NewEsatQuestion {
                category: "Workload".into(),
                prompt: "My workload is sustainable".into(),
                required: true,
                position: None,
            },
        )
        .await
        .unwrap();
    acme.transition_survey(&survey.id, EsatSurveyStatus::Open)
        .await
        .unwrap();

    // The public link works without the owning tenant's identity.
    globex
        .submit_public_response(
            &survey.public_token,
            &EsatSubmission {
                respondent: None,
                answers: vec![AnswerInput {
                    question_id: workload.id.clone(),
                    value: 4,
                }],
            },
        )
        .await
        .unwrap();

    let report = acme.esat_report(&survey.id).await.unwrap();
    assert_eq!(report.response_count, 1);
    assert_eq!(report.overall_average, Some(4.0));
    assert_eq!(report.categories[0].category, "workload");

    // The submission is audited under the survey's organization.
    let audit = acme
        .query_audit(&AuditFilter {
            action: Some(AuditAction::Submitted),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].actor, "public");
    assert!(
        globex
            .query_audit(&AuditFilter {
                action: Some(AuditAction::Submitted),
                ..Default::default()
            })
            .await
            .unwrap()
            .is_empty()
    );

    // Closed surveys refuse further answers.
    acme.transition_survey(&survey.id, EsatSurveyStatus::Closed)
        .await
        .unwrap();
    let err = globex
        .submit_public_response(
            &survey.public_token,
            &EsatSubmission {
                respondent: None,
                answers: vec![AnswerInput {
                    question_id: workload.id,
                    value: 2,
                }],
            },
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not accepting responses"));
}

// ---------------------------------------------------------------------------
// Isolation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn records_never_cross_tenants() {
    let (_dir, acme, globex) = tenants().await;

    let project = acme.create_project(&NewProject::named("Apollo")).await.unwrap();
    let lead = acme
        .create_lead(&NewLead {
            company: "Initech".into(),
            value: 5_000.0,
            ..NewLead::default()
        })
        .await
        .unwrap();
    acme.create_document(&NewDocument {
        title: "Runbook".into(),
        body: "restart the workers".into(),
        ..NewDocument::default()
    })
    .await
    .unwrap();

    assert!(globex.get_project(&project.id).await.unwrap_err().is_not_found());
    assert!(
        globex
            .transition_lead(&lead.id, LeadStage::Won, None)
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(globex.list_projects(None, 50).await.unwrap().is_empty());
    assert!(globex.search_leads("initech", 10).await.unwrap().is_empty());
    assert!(globex.search_documents("workers", 10).await.unwrap().is_empty());
    assert!(globex.get_document("runbook").await.unwrap_err().is_not_found());

    // Same slug in another organization is fine.
    globex
        .create_document(&NewDocument {
            title: "Runbook".into(),
            ..NewDocument::default()
        })
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Audit trail
// ---------------------------------------------------------------------------

#[tokio::test]
async fn document_history_is_audited() {
    let (_dir, acme, _globex) = tenants().await;
    let doc = acme
        .create_document(&NewDocument {
            title: "Runbook".into(),
            body: "v1".into(),
            ..NewDocument::default()
        })
        .await
        .unwrap();
    acme.update_document(&doc.id, &DocumentUpdateBuilder::new().body("v2").build())
        .await
        .unwrap();
    acme.restore_document_version(&doc.id, 1).await.unwrap();

    let trail = acme
        .query_audit(&AuditFilter {
            entity_type: Some(EntityType::Document),
            entity_id: Some(doc.id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    let actions: Vec<AuditAction> = trail.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![AuditAction::Restored, AuditAction::Updated, AuditAction::Created]
    );
    assert!(trail.iter().all(|e| e.actor == "usr_ana"));
}
