//! Connectivity checks against closed local ports; no servers required.

use std::time::Duration;

use hostkit::{
    kv,
    postgres::{PgAdmin, SUCCESS_CODE, UNKNOWN_CODE},
};

const CLOSED_PG: &str = "postgres://hostkit@127.0.0.1:1/postgres";

fn admin() -> PgAdmin {
    PgAdmin::with_timeout(Some(Duration::from_secs(5)))
}

#[tokio::test]
async fn unreachable_server_is_a_failure_code() {
    let response = admin().test_url(CLOSED_PG).await;
    assert_ne!(response.code, SUCCESS_CODE);
    assert!(!response.message.is_empty());
}

#[tokio::test]
async fn malformed_url_is_a_failure_code() {
    let response = admin().test_url("definitely not a connection string").await;
    assert_eq!(response.code, UNKNOWN_CODE);
    assert!(!response.message.is_empty());
}

#[tokio::test]
async fn admin_statements_report_connection_failures() {
    let created = admin().create_database(CLOSED_PG, "scratch").await;
    assert!(!created.is_success());
    assert!(!created.message.is_empty());

    let renamed = admin().rename_database(CLOSED_PG, "scratch", "scratch_old").await;
    assert!(!renamed.is_success());
    assert!(!renamed.message.is_empty());
}

#[tokio::test]
async fn redis_failure_is_a_status_string() {
    let status = kv::test_redis_parameters_with_timeout(
        "127.0.0.1:1",
        None,
        Some("secret"),
        Some(Duration::from_secs(5)),
    )
    .await;
    assert!(kv::is_error(&status), "{status}");
}
