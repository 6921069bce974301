// system-tests/tests/suites/soft_delete.rs
// ============================================================================
// Module: Soft-Delete Tests
// Description: Deletion scenarios over the record resource.
// Purpose: Verify deletes complete and deleted records leave default listings.
// Dependencies: system-tests helpers, scenario-probe-client, scenario-probe-core
// ============================================================================

//! ## Overview
//! Soft-delete scenarios: deleting a record completes without raising, the
//! deleted identifier stops resolving, and default listings exclude the
//! deleted record while keeping the rest.

use std::error::Error;

use scenario_probe_client::ListQuery;
use scenario_probe_client::Scenario;
use scenario_probe_client::expect_rejection;

use crate::helpers;
use helpers::artifacts::TestArtifacts;
use helpers::asserts::ensure;
use helpers::harness::start_service;
use helpers::scenarios;

#[tokio::test(flavor = "multi_thread")]
async fn deleted_records_leave_default_listings() -> Result<(), Box<dyn Error>> {
    let mut artifacts = TestArtifacts::new("deleted_records_leave_default_listings")?;
    let (_service, context) = start_service().await?;
    let mut scenario = Scenario::new(context);

    let actor = scenarios::generate_actor("author")?;
    scenario.act_as(scenarios::REGISTER_ROUTE, &actor.registration_payload()).await?;

    scenario
        .create(
            "keeper",
            scenarios::RECORDS_ROUTE,
            &scenarios::record_payload("published", "keeper entry"),
            &scenarios::record_shape(),
        )
        .await?;
    scenario
        .create(
            "victim",
            scenarios::RECORDS_ROUTE,
            &scenarios::record_payload("published", "victim entry"),
            &scenarios::record_shape(),
        )
        .await?;
    let keeper_id = scenario.text_field("keeper", "/id")?.to_string();
    let victim_id = scenario.text_field("victim", "/id")?.to_string();

    scenario.delete(&scenarios::record_route(&victim_id)).await?;

    // The deleted identifier must stop resolving.
    let context = scenario.context_mut();
    expect_rejection(
        "read of deleted record",
        context.get(&scenarios::record_route(&victim_id)),
    )
    .await?;

    let listing = scenario
        .list(scenarios::RECORDS_ROUTE, &ListQuery::new(), &scenarios::record_shape())
        .await?;
    ensure(listing.items.len() == 1, "default listing holds only the surviving record")?;
    ensure(listing.page_info.records == 1, "totals exclude the deleted record")?;
    let listed_id = listing.items[0]["id"].as_str().unwrap_or_default();
    ensure(listed_id == keeper_id, "the surviving record is the one not deleted")?;

    artifacts.note(format!("record {victim_id} soft-deleted"));
    artifacts.finish("passed")?;
    Ok(())
}
