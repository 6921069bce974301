// system-tests/tests/suites/registration.rs
// ============================================================================
// Module: Registration Tests
// Description: Constraint-violation scenarios for identity establishment.
// Purpose: Verify duplicates and weak secrets reject, failed switches keep state.
// Dependencies: system-tests helpers, scenario-probe-client, scenario-probe-core
// ============================================================================

//! ## Overview
//! Registration scenarios: a unique identifier registers once with a
//! well-formed session payload and rejects the second time; policy-violating
//! credentials reject; and a failed identity switch leaves the previously
//! active identity attached to the context.

use std::error::Error;

use scenario_probe_client::Scenario;
use scenario_probe_client::expect_rejection;
use serde_json::json;

use crate::helpers;
use helpers::asserts::ensure;
use helpers::harness::start_service;
use helpers::scenarios;

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_identifier_is_rejected() -> Result<(), Box<dyn Error>> {
    let (_service, context) = start_service().await?;
    let mut scenario = Scenario::new(context);

    let actor = scenarios::generate_actor("buyer")?;
    let session =
        scenario.act_as(scenarios::REGISTER_ROUTE, &actor.registration_payload()).await?;
    scenarios::auth_shape().validate(&session)?;

    let context = scenario.context_mut();
    expect_rejection(
        "duplicate registration",
        context.post(scenarios::REGISTER_ROUTE, &actor.registration_payload()),
    )
    .await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn weak_secret_is_rejected() -> Result<(), Box<dyn Error>> {
    let (_service, mut context) = start_service().await?;

    let payload = json!({
        "identifier": scenario_probe_core::fixture::email(),
        "secret": "short",
        "role": "buyer",
    });
    expect_rejection("weak secret", context.post(scenarios::REGISTER_ROUTE, &payload)).await?;
    ensure(!context.has_identity(), "failed registration leaves the context anonymous")?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_switch_leaves_identity_active() -> Result<(), Box<dyn Error>> {
    let (_service, context) = start_service().await?;
    let mut scenario = Scenario::new(context);

    let actor = scenarios::generate_actor("seller")?;
    scenario.act_as(scenarios::REGISTER_ROUTE, &actor.registration_payload()).await?;
    let created = scenario
        .create(
            "created",
            scenarios::RECORDS_ROUTE,
            &scenarios::record_payload("published", "still mine"),
            &scenarios::record_shape(),
        )
        .await?;
    let id = created["id"].as_str().unwrap_or_default().to_string();

    // A rejected login must not clear or replace the active token.
    let mut wrong = actor.login_payload();
    wrong["secret"] = json!("definitely-wrong");
    let context = scenario.context_mut();
    expect_rejection("wrong secret login", context.act_as(scenarios::LOGIN_ROUTE, &wrong))
        .await?;
    ensure(context.has_identity(), "failed switch keeps the previous identity")?;

    scenario.read("fetched", &scenarios::record_route(&id), &scenarios::record_shape()).await?;
    Ok(())
}
