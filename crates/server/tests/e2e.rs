use std::net::SocketAddr;

use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use service::collections::FileSnapshotStore;
use service::storage::Layout;
use tokio::net::TcpListener;

use server::startup::build_app;

struct TestApp {
    base_url: String,
    path: std::path::PathBuf,
}

async fn start_server(doc: &str, layout: Layout) -> anyhow::Result<TestApp> {
    let path = std::env::temp_dir().join(format!("e2e_{}.json", uuid::Uuid::new_v4()));
    tokio::fs::write(&path, doc).await?;
    let store = FileSnapshotStore::open(&path, layout).await?;

    let app = build_app(store);
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, path })
}

#[tokio::test]
async fn e2e_crud_round_trip_over_http() -> anyhow::Result<()> {
    let app = start_server(
        r#"{"person":[{"id":1,"name":"Fitz","age":21},{"id":2,"name":"Batman","age":25}]}"#,
        Layout::Compact,
    )
    .await?;
    let c = reqwest::Client::new();

    let res = c.get(format!("{}/person?page=0&page_size=1", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(
        res.headers().get("content-type").and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
    assert_eq!(res.json::<Value>().await?, json!({"person": [{"id": 1, "name": "Fitz", "age": 21}]}));

    let res = c.put(format!("{}/person/1", app.base_url))
        .body(r#"{"name":"FitzBoy"}"#)
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);

    let res = c.get(format!("{}/person/1", app.base_url)).send().await?;
    assert_eq!(res.json::<Value>().await?, json!({"id": 1, "name": "FitzBoy", "age": null}));

    let res = c.post(format!("{}/person", app.base_url))
        .json(&json!({"id": 3, "name": "Joao", "age": 32}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);

    let res = c.delete(format!("{}/person/2", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);

    // compact layout on disk, same content as served
    let on_disk = tokio::fs::read_to_string(&app.path).await?;
    assert!(!on_disk.contains('\n'));
    assert_eq!(
        serde_json::from_str::<Value>(&on_disk)?,
        json!({"person": [
            {"id": 1, "name": "FitzBoy", "age": null},
            {"id": 3, "name": "Joao", "age": 32}
        ]})
    );

    let res = c.get(format!("{}/nothing-here", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?, json!({"message": "endpoint not found"}));

    let _ = tokio::fs::remove_file(&app.path).await;
    Ok(())
}

#[tokio::test]
async fn e2e_concurrent_updates_and_creates_are_serialized() -> anyhow::Result<()> {
    let app = start_server(r#"{"counter":[{"id":1,"n":0}],"log":[]}"#, Layout::Pretty).await?;
    let c = reqwest::Client::new();

    let mut handles = Vec::new();
    for i in 0..25 {
        let c = c.clone();
        let base = app.base_url.clone();
        handles.push(tokio::spawn(async move {
            let created = c.post(format!("{base}/log")).json(&json!({"id": i})).send().await?;
            let updated = c.put(format!("{base}/counter/1")).json(&json!({"n": i})).send().await?;
            Ok::<_, reqwest::Error>((created.status(), updated.status()))
        }));
    }
    for h in handles {
        let (created, updated) = h.await??;
        assert_eq!(created, HttpStatusCode::CREATED);
        assert_eq!(updated, HttpStatusCode::NO_CONTENT);
    }

    let served = c.get(format!("{}/log", app.base_url)).send().await?.json::<Value>().await?;
    assert_eq!(served["log"].as_array().map(Vec::len), Some(25));

    let on_disk: Value = serde_json::from_str(&tokio::fs::read_to_string(&app.path).await?)?;
    assert_eq!(on_disk["log"], served["log"]);

    let _ = tokio::fs::remove_file(&app.path).await;
    Ok(())
}
