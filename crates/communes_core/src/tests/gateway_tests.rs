use super::*;
use axum::{extract::Path, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use tokio::net::TcpListener;

async fn handle_communes(Path(code): Path<String>) -> axum::response::Response {
    match code.as_str() {
        "78" => Json(json!([
            {"nom": "Versailles", "code": "78646", "population": 83583},
            {"nom": "Rambouillet", "code": "78517", "population": 25000},
            {"nom": "Lieu-dit", "code": "78999"}
        ]))
        .into_response(),
        "2A" => Json(json!({"error": "not an array"})).into_response(),
        "2B" => Json(json!([{"code": "2B001", "population": 12}])).into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!([])).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_provider() -> anyhow::Result<String> {
    let app = Router::new().route("/departements/:code/communes", get(handle_communes));
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

fn gateway(base_url: &str) -> HttpCommunesGateway {
    HttpCommunesGateway::new(base_url, Duration::from_secs(5)).expect("gateway")
}

#[test]
fn builds_department_scoped_url() {
    let gateway = gateway("https://geo.api.gouv.fr/");
    assert_eq!(
        gateway.communes_url("78").expect("url").as_str(),
        "https://geo.api.gouv.fr/departements/78/communes"
    );
}

#[test]
fn escapes_department_code_in_path() {
    let gateway = gateway("http://localhost:8080/api");
    assert_eq!(
        gateway.communes_url("9/7").expect("url").as_str(),
        "http://localhost:8080/api/departements/9%2F7/communes"
    );
}

#[test]
fn rejects_unusable_base_url() {
    assert!(HttpCommunesGateway::new("not a url", Duration::from_secs(1)).is_err());
    assert!(HttpCommunesGateway::new("mailto:someone@example.org", Duration::from_secs(1)).is_err());
}

#[tokio::test]
async fn fetches_and_maps_communes() {
    let base_url = spawn_provider().await.expect("provider");
    let records = gateway(&base_url)
        .fetch_communes(&DepartmentRef::new("78", "Yvelines"))
        .await
        .expect("fetch");

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].name, "Versailles");
    assert_eq!(records[1].population, Some(25000));
    assert_eq!(records[2].population, None);
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let base_url = spawn_provider().await.expect("provider");
    let err = gateway(&base_url)
        .fetch_communes(&DepartmentRef::from_code("00"))
        .await
        .expect_err("404");

    assert_eq!(err, FetchError::Status { status: 404 });
}

#[tokio::test]
async fn non_array_payload_is_a_parse_error() {
    let base_url = spawn_provider().await.expect("provider");
    let err = gateway(&base_url)
        .fetch_communes(&DepartmentRef::from_code("2A"))
        .await
        .expect_err("object body");

    assert!(err.is_parse(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn entries_without_name_are_a_parse_error() {
    let base_url = spawn_provider().await.expect("provider");
    let err = gateway(&base_url)
        .fetch_communes(&DepartmentRef::from_code("2B"))
        .await
        .expect_err("missing nom");

    assert!(err.is_parse(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn slow_provider_times_out() {
    let base_url = spawn_provider().await.expect("provider");
    let gateway =
        HttpCommunesGateway::new(&base_url, Duration::from_millis(100)).expect("gateway");
    let err = gateway
        .fetch_communes(&DepartmentRef::from_code("slow"))
        .await
        .expect_err("timeout");

    assert_eq!(err, FetchError::Timeout);
}

#[tokio::test]
async fn unreachable_provider_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = gateway(&format!("http://{addr}"))
        .fetch_communes(&DepartmentRef::from_code("78"))
        .await
        .expect_err("connection refused");

    assert_eq!(err.kind(), shared::error::FetchErrorKind::Transport);
}
