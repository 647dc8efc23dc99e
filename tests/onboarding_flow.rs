//! End-to-end onboarding flows through the service facade.

use std::sync::Arc;

use chrono::NaiveDate;
use ob_onboarding::{InMemoryStore, OnboardingConfig, OnboardingService, ServiceError};
use ob_onboarding_flow::forms::investor_profile::account::PrimaryType;
use ob_onboarding_flow::options::OptionKey;
use ob_onboarding_flow::FlowError;
use ob_onboarding_types::{
    ClientOnboarding, DerivedView, FormRecord, FormType, OnboardingStatus, StepRecord,
    StepResponse, WriteRequest,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use uuid::Uuid;

fn config() -> OnboardingConfig {
    OnboardingConfig {
        today: NaiveDate::from_ymd_opt(2026, 3, 1),
        ..OnboardingConfig::default()
    }
}

fn service_with(store: InMemoryStore) -> OnboardingService {
    OnboardingService::new(Arc::new(store), config())
}

async fn answer(
    service: &OnboardingService,
    client_id: Uuid,
    form: FormType,
    step: u8,
    question: &str,
    value: Value,
) -> StepResponse {
    match service
        .write_step(client_id, form, step, WriteRequest::new(question, value))
        .await
    {
        Ok(response) => response,
        Err(e) => panic!("{form} {question}: {e} {:?}", e.validation_failure()),
    }
}

async fn fill_registration(service: &OnboardingService, client_id: Uuid, form: FormType) {
    for (field, value) in [
        ("rrName", json!("Pat Advisor")),
        ("rrNo", json!("R-100")),
        ("customerNames", json!("Jane Client")),
        ("accountNo", json!("ACC-1")),
        ("jointAccount", json!({"no": true})),
    ] {
        let question = format!("step1.accountRegistration.{field}");
        answer(service, client_id, form, 1, &question, value).await;
    }
}

async fn sign(service: &OnboardingService, client_id: Uuid, form: FormType) -> StepResponse {
    let step = form.gating_step();
    let mut last = None;
    for signer in ["accountOwner", "financialProfessional"] {
        let question = format!("step{step}.signatures.{signer}");
        let block = json!({"typedSignature": "J. Client", "printedName": "Jane Client", "date": "2026-02-27"});
        last = Some(answer(service, client_id, form, step, &question, block).await);
    }
    last.unwrap()
}

#[tokio::test]
async fn test_sfc_then_baiodf_to_workspace() {
    let service = service_with(InMemoryStore::new());
    let client = service
        .create_client(vec![FormType::Baiodf, FormType::Sfc])
        .await
        .unwrap();
    let id = client.client_id;

    assert!(service
        .next_route(id)
        .await
        .unwrap()
        .ends_with("/onboarding/statement-of-financial-condition/step-1"));

    // SFC
    fill_registration(&service, id, FormType::Sfc).await;
    let response = answer(
        &service,
        id,
        FormType::Sfc,
        1,
        "step1.liquidNonQualifiedAssets",
        json!({"cashMoneyMarketsCds": 1000000}),
    )
    .await;
    match response.step.derived {
        Some(DerivedView::Totals(totals)) => {
            assert_eq!(totals.total_net_worth, Decimal::from(1_000_000))
        }
        other => panic!("expected totals, got {other:?}"),
    }

    let response = sign(&service, id, FormType::Sfc).await;
    assert_eq!(response.status, OnboardingStatus::Completed);
    assert_eq!(
        response.step.next_route_after_completion,
        Some(format!("/clients/{id}/onboarding/baiodf/step-1"))
    );

    // BAIODF step 1
    fill_registration(&service, id, FormType::Baiodf).await;
    for (question, value) in [
        ("custodian", json!({"pershing": true})),
        ("nameOfProduct", json!("Alt Income Fund IV")),
        ("sponsorIssuer", json!("Sponsor LLC")),
        ("proposedPrincipalAmount", json!(80000)),
        ("solicitedTrade", json!({"no": true})),
        ("qualifiedAccount", json!({"no": true})),
        ("taxAdvantagePurchase", json!({"no": true})),
        ("dateOfPpm", json!("2026-01-10")),
        ("datePpmSent", json!("2026-01-12")),
    ] {
        let question = format!("step1.orderBasics.{question}");
        answer(&service, id, FormType::Baiodf, 1, &question, value).await;
    }

    // BAIODF step 2: net worth flows in from the completed SFC
    let read = service.read_step(id, FormType::Baiodf, 2).await.unwrap();
    assert_eq!(read.step.fields["totalNetWorth"], 1000000.0);

    for (question, value) in [
        ("totalNetWorth", json!(1000000)),
        ("existingIlliquidAltPositions", json!(100000)),
        ("existingSemiLiquidAltPositions", json!(50000)),
        ("existingTaxAdvantageAltPositions", json!(20000)),
    ] {
        answer(&service, id, FormType::Baiodf, 2, &format!("step2.{question}"), value).await;
    }
    let response = answer(
        &service,
        id,
        FormType::Baiodf,
        2,
        "step2.hasOtherInvestments",
        json!({"no": true}),
    )
    .await;
    match &response.step.derived {
        Some(DerivedView::Concentrations(c)) => {
            assert_eq!(c.total_concentration_percent, Decimal::from(17));
            assert_eq!(c.proposed_purchase_concentration_percent, Decimal::from(8));
            assert_eq!(c.projected_concentration_percent, Decimal::from(25));
        }
        other => panic!("expected concentrations, got {other:?}"),
    }
    let wire = serde_json::to_value(&response.step).unwrap();
    assert_eq!(wire["concentrations"]["totalConcentrationPercent"], 17.0);

    // BAIODF step 3
    let response = sign(&service, id, FormType::Baiodf).await;
    assert_eq!(response.status, OnboardingStatus::Completed);
    assert_eq!(
        response.step.next_route_after_completion,
        Some(format!("/clients/{id}/workspace"))
    );
    assert_eq!(
        service.next_route(id).await.unwrap(),
        format!("/clients/{id}/workspace")
    );
}

#[tokio::test]
async fn test_completed_investor_profile_prefills_registration() {
    let id = Uuid::new_v4();
    let mut client = ClientOnboarding::new(id, [FormType::InvestorProfile, FormType::Sfc]);
    let mut profile = FormRecord::new(FormType::InvestorProfile);
    profile.status = OnboardingStatus::Completed;
    profile.steps.insert(
        1,
        StepRecord {
            fields: json!({
                "rrName": "Pat Advisor",
                "rrNo": "R-100",
                "customerNames": "Jane & John Client",
                "accountNo": "ACC-9",
                "typeOfAccount": {"primaryType": PrimaryType::JointTenant.selected_map()}
            }),
            current_question_id: None,
        },
    );
    client.put(profile);
    let service = service_with(InMemoryStore::with_clients([client]));

    let read = service.read_step(id, FormType::Sfc, 1).await.unwrap();
    let registration = &read.step.fields["accountRegistration"];
    assert_eq!(registration["customerNames"], "Jane & John Client");
    assert_eq!(registration["jointAccount"]["yes"], true);
    assert_eq!(read.status, OnboardingStatus::NotStarted);

    // The first write persists the prefilled block, which turns on the
    // joint-owner signature at the gating step.
    answer(&service, id, FormType::Sfc, 1, "step1.notes", json!("joint household")).await;
    let signatures = service.read_step(id, FormType::Sfc, 2).await.unwrap();
    assert_eq!(signatures.step.requires_joint_owner_signature, Some(true));
    assert!(signatures
        .step
        .visible_question_ids
        .iter()
        .any(|q| q.as_str() == "step2.signatures.jointAccountOwner"));

    // A user edit is never overwritten by prefill.
    answer(
        &service,
        id,
        FormType::Sfc,
        1,
        "step1.accountRegistration.customerNames",
        json!("Jane Client"),
    )
    .await;
    let read = service.read_step(id, FormType::Sfc, 1).await.unwrap();
    assert_eq!(read.step.fields["accountRegistration"]["customerNames"], "Jane Client");

    // Without the joint owner's signature the form stays in progress.
    let response = sign(&service, id, FormType::Sfc).await;
    assert_eq!(response.status, OnboardingStatus::InProgress);
}

#[tokio::test]
async fn test_baiv_accreditation_by_net_worth() {
    let service = service_with(InMemoryStore::new());
    let id = service
        .create_client(vec![FormType::Baiv506c])
        .await
        .unwrap()
        .client_id;

    answer(&service, id, FormType::Baiv506c, 1, "step1.investorType", json!({"naturalPerson": true})).await;
    let err = service
        .write_step(
            id,
            FormType::Baiv506c,
            1,
            WriteRequest::new("step1.accreditationBasis", json!({"entityAssets": true})),
        )
        .await
        .unwrap_err();
    assert!(err
        .validation_failure()
        .unwrap()
        .field_errors
        .message("step1.accreditationBasis")
        .unwrap()
        .contains("does not apply"));

    answer(&service, id, FormType::Baiv506c, 1, "step1.accreditationBasis", json!({"netWorth": true})).await;
    let response = answer(
        &service,
        id,
        FormType::Baiv506c,
        1,
        "step1.netWorthVerification",
        json!({"totalNetWorth": 1500000, "excludesPrimaryResidence": {"yes": true}}),
    )
    .await;
    match response.step.derived {
        Some(DerivedView::Accreditation(a)) => {
            assert!(a.meets_net_worth_test);
            assert!(!a.meets_income_test);
            assert!(a.is_accredited);
        }
        other => panic!("expected accreditation, got {other:?}"),
    }
    assert!(!response
        .step
        .visible_question_ids
        .iter()
        .any(|q| q.as_str() == "step1.incomeVerification"));
}

#[tokio::test]
async fn test_stale_client_cannot_write_hidden_branch() {
    let service = service_with(InMemoryStore::new());
    let id = service
        .create_client(vec![FormType::InvestorProfile])
        .await
        .unwrap()
        .client_id;
    let ip = FormType::InvestorProfile;

    answer(&service, id, ip, 1, "step1.typeOfAccount.primaryType", PrimaryType::Corporation.selected_map()).await;
    answer(&service, id, ip, 1, "step1.typeOfAccount.corporationDesignation", json!({"sCorp": true})).await;
    answer(&service, id, ip, 1, "step1.typeOfAccount.primaryType", PrimaryType::Individual.selected_map()).await;

    let err = service
        .write_step(
            id,
            ip,
            1,
            WriteRequest::new("step1.typeOfAccount.corporationDesignation", json!({"cCorp": true})),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Flow(FlowError::InactiveQuestion { .. })
    ));
    let failure = err.validation_failure().unwrap();
    assert!(failure
        .field_errors
        .message("step1.typeOfAccount.corporationDesignation")
        .unwrap()
        .contains("not active"));

    // The hidden answer is retained, not cleared.
    let read = service.read_step(id, ip, 1).await.unwrap();
    assert_eq!(read.step.fields["typeOfAccount"]["corporationDesignation"]["sCorp"], true);
    assert_eq!(read.step.requires_step4, Some(false));
}
