//! Integration tests for workout plan CRUD operations.

use serde_json::json;

use neuraladapt_db::models::{DEFAULT_USER_ID, NewWorkoutPlan};
use neuraladapt_db::queries::workout_plans;
use neuraladapt_test_utils::{create_test_db, sample_request_json, sample_response_json};

fn new_plan<'a>(
    name: &'a str,
    request: &'a serde_json::Value,
    response: Option<&'a serde_json::Value>,
) -> NewWorkoutPlan<'a> {
    NewWorkoutPlan {
        user_id: DEFAULT_USER_ID,
        program_name: name,
        request_payload: request,
        response_payload: response,
        artifact_path: None,
    }
}

#[tokio::test]
async fn insert_and_get_plan() {
    let pool = create_test_db().await;
    let request = sample_request_json("Spring Peak");
    let response = sample_response_json("Spring Peak");

    let plan = workout_plans::insert_workout_plan(&pool, &new_plan("Spring Peak", &request, Some(&response)))
        .await
        .expect("insert should succeed");

    assert!(plan.id.starts_with("plan-"));
    assert_eq!(plan.user_id, DEFAULT_USER_ID);
    assert_eq!(plan.program_name, "Spring Peak");
    assert_eq!(plan.created_at, plan.updated_at);

    let fetched = workout_plans::get_workout_plan(&pool, DEFAULT_USER_ID, &plan.id)
        .await
        .expect("get should succeed")
        .expect("plan should exist");

    assert_eq!(fetched.request_payload, request);
    assert_eq!(fetched.response_payload, Some(response));
    assert_eq!(fetched, plan);

    pool.close().await;
}

#[tokio::test]
async fn request_only_plan_has_no_response() {
    let pool = create_test_db().await;
    let request = sample_request_json("Base Block");

    let plan = workout_plans::insert_workout_plan(&pool, &new_plan("Base Block", &request, None))
        .await
        .unwrap();

    let fetched = workout_plans::get_workout_plan(&pool, DEFAULT_USER_ID, &plan.id)
        .await
        .unwrap()
        .unwrap();
    assert!(fetched.response_payload.is_none());
    assert!(fetched.artifact_path.is_none());

    pool.close().await;
}

#[tokio::test]
async fn get_plan_returns_none_for_missing_id() {
    let pool = create_test_db().await;

    let result = workout_plans::get_workout_plan(&pool, DEFAULT_USER_ID, "plan-0-missing")
        .await
        .expect("get should not error");
    assert!(result.is_none());

    pool.close().await;
}

#[tokio::test]
async fn get_plan_is_scoped_to_owner() {
    let pool = create_test_db().await;
    let request = sample_request_json("Private");

    let plan = workout_plans::insert_workout_plan(&pool, &new_plan("Private", &request, None))
        .await
        .unwrap();

    let other = workout_plans::get_workout_plan(&pool, "someone-else", &plan.id)
        .await
        .unwrap();
    assert!(other.is_none());

    pool.close().await;
}

#[tokio::test]
async fn list_plans_newest_first() {
    let pool = create_test_db().await;
    let request = sample_request_json("x");

    let first = workout_plans::insert_workout_plan(&pool, &new_plan("first", &request, None))
        .await
        .unwrap();
    let second = workout_plans::insert_workout_plan(&pool, &new_plan("second", &request, None))
        .await
        .unwrap();
    let third = workout_plans::insert_workout_plan(&pool, &new_plan("third", &request, None))
        .await
        .unwrap();

    let all = workout_plans::list_workout_plans(&pool, DEFAULT_USER_ID)
        .await
        .unwrap();
    let ids: Vec<&str> = all.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec![third.id.as_str(), second.id.as_str(), first.id.as_str()]);

    let foreign = workout_plans::list_workout_plans(&pool, "someone-else")
        .await
        .unwrap();
    assert!(foreign.is_empty());

    pool.close().await;
}

#[tokio::test]
async fn delete_removes_plan_from_list_and_get() {
    let pool = create_test_db().await;
    let request = sample_request_json("Doomed");

    let plan = workout_plans::insert_workout_plan(&pool, &new_plan("Doomed", &request, None))
        .await
        .unwrap();

    let removed = workout_plans::delete_workout_plan(&pool, DEFAULT_USER_ID, &plan.id)
        .await
        .unwrap();
    assert!(removed);

    assert!(
        workout_plans::get_workout_plan(&pool, DEFAULT_USER_ID, &plan.id)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        workout_plans::list_workout_plans(&pool, DEFAULT_USER_ID)
            .await
            .unwrap()
            .is_empty()
    );

    pool.close().await;
}

#[tokio::test]
async fn delete_missing_or_foreign_plan_is_noop() {
    let pool = create_test_db().await;
    let request = sample_request_json("Kept");

    let plan = workout_plans::insert_workout_plan(&pool, &new_plan("Kept", &request, None))
        .await
        .unwrap();

    let missing = workout_plans::delete_workout_plan(&pool, DEFAULT_USER_ID, "plan-0-nothing")
        .await
        .expect("deleting a missing plan should not error");
    assert!(!missing);

    let foreign = workout_plans::delete_workout_plan(&pool, "someone-else", &plan.id)
        .await
        .expect("deleting a foreign plan should not error");
    assert!(!foreign);

    assert!(
        workout_plans::get_workout_plan(&pool, DEFAULT_USER_ID, &plan.id)
            .await
            .unwrap()
            .is_some(),
        "plan owned by the default user should survive"
    );

    pool.close().await;
}

#[tokio::test]
async fn attach_response_sets_payload_and_advances_updated_at() {
    let pool = create_test_db().await;
    let request = sample_request_json("Pending");

    let plan = workout_plans::insert_workout_plan(&pool, &new_plan("Pending", &request, None))
        .await
        .unwrap();

    let response = json!({ "programName": "Pending", "weeks": [] });
    let updated = workout_plans::attach_response(
        &pool,
        DEFAULT_USER_ID,
        &plan.id,
        &response,
        Some("/tmp/artifacts/pending.xlsx"),
    )
    .await
    .unwrap()
    .expect("plan should exist");

    assert_eq!(updated.response_payload, Some(response));
    assert_eq!(updated.artifact_path.as_deref(), Some("/tmp/artifacts/pending.xlsx"));
    assert_eq!(updated.request_payload, request);
    assert_eq!(updated.created_at, plan.created_at);
    assert!(updated.updated_at > plan.updated_at);

    pool.close().await;
}

#[tokio::test]
async fn attach_response_to_missing_plan_returns_none() {
    let pool = create_test_db().await;

    let result = workout_plans::attach_response(
        &pool,
        DEFAULT_USER_ID,
        "plan-0-missing",
        &json!({}),
        None,
    )
    .await
    .unwrap();
    assert!(result.is_none());

    pool.close().await;
}

#[tokio::test]
async fn attach_response_without_artifact_clears_old_path() {
    let pool = create_test_db().await;
    let request = sample_request_json("Old");
    let mut record = new_plan("Old", &request, None);
    record.artifact_path = Some("/artifacts/old-plan.xlsx");
    let plan = workout_plans::insert_workout_plan(&pool, &record)
        .await
        .unwrap();

    let updated = workout_plans::attach_response(
        &pool,
        DEFAULT_USER_ID,
        &plan.id,
        &json!({ "programName": "New", "weeks": [] }),
        None,
    )
    .await
    .unwrap()
    .expect("plan should exist");

    assert!(updated.artifact_path.is_none());

    pool.close().await;
}

#[tokio::test]
async fn set_artifact_path_records_workbook() {
    let pool = create_test_db().await;
    let request = sample_request_json("Export");
    let plan = workout_plans::insert_workout_plan(&pool, &new_plan("Export", &request, None))
        .await
        .unwrap();

    let updated =
        workout_plans::set_artifact_path(&pool, DEFAULT_USER_ID, &plan.id, "/artifacts/export.xlsx")
            .await
            .unwrap()
            .expect("plan should exist");
    assert_eq!(updated.artifact_path.as_deref(), Some("/artifacts/export.xlsx"));
    assert!(updated.updated_at > plan.updated_at);

    let missing =
        workout_plans::set_artifact_path(&pool, DEFAULT_USER_ID, "plan-0-missing", "/x.xlsx")
            .await
            .unwrap();
    assert!(missing.is_none());

    pool.close().await;
}
