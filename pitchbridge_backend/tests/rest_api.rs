use pitchbridge_backend::api;
use pitchbridge_backend::bootstrap;
use pitchbridge_backend::config::{PitchbridgeConfig, PitchbridgePaths};
use serde_json::json;
use tempfile::tempdir;
use tokio::time::{sleep, Duration};

fn next_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .expect("bind ephemeral port")
        .local_addr()
        .unwrap()
        .port()
}

async fn wait_for_health(base_url: &str) {
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if let Ok(resp) = client.get(format!("{base_url}/health")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        sleep(Duration::from_millis(100)).await;
    }
    panic!("server did not become healthy in time");
}

async fn register(client: &reqwest::Client, base_url: &str, name: &str, role: &str) -> String {
    let resp: serde_json::Value = client
        .post(format!("{base_url}/profiles"))
        .json(&json!({ "name": name, "role": role }))
        .send()
        .await
        .expect("register response")
        .json()
        .await
        .expect("profile json");
    resp.get("id")
        .and_then(|id| id.as_str())
        .expect("profile id")
        .to_string()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires local networking"]
async fn rest_roundtrip_marketplace() {
    let temp = tempdir().expect("tempdir");
    let port = next_port();
    let config = PitchbridgeConfig::new(
        port,
        PitchbridgePaths::from_base_dir(temp.path()).expect("paths"),
    );

    let resources = bootstrap::initialize(&config).expect("bootstrap");
    let database = resources.database.clone();

    let server_config = config.clone();
    let server = tokio::spawn(async move {
        let _ = api::serve_http(server_config, database).await;
    });

    let base_url = format!("http://127.0.0.1:{port}");
    wait_for_health(&base_url).await;

    let client = reqwest::Client::new();
    let founder_id = register(&client, &base_url, "Founder", "founder").await;
    let investor_id = register(&client, &base_url, "Investor", "investor").await;

    // Create a pitch; the submitted profit must be recomputed server-side.
    let pitch_resp: serde_json::Value = client
        .post(format!("{base_url}/pitches"))
        .json(&json!({
            "founder_id": founder_id,
            "title": "Acme Robotics",
            "tagline": "robots for everyone",
            "funding_goal": 250000.0,
            "equity_offered": 12.5,
            "tags": "robotics, hardware, , AI ",
            "financial_projections": [
                { "year": 2024, "revenue": 50000.0, "expenses": 20000.0, "profit": 999999.0 }
            ]
        }))
        .send()
        .await
        .expect("create pitch response")
        .json()
        .await
        .expect("pitch json");

    let pitch_id = pitch_resp
        .get("id")
        .and_then(|id| id.as_str())
        .expect("pitch id")
        .to_string();
    assert_eq!(
        pitch_resp["financial_projections"][0]["profit"].as_f64(),
        Some(30_000.0)
    );
    assert_eq!(
        pitch_resp["tags"],
        json!(["robotics", "hardware", "AI"])
    );

    // Interest lifecycle: express, duplicate conflict, founder accepts,
    // withdraw after acceptance conflicts.
    let express = client
        .post(format!("{base_url}/pitches/{pitch_id}/interests"))
        .json(&json!({ "investor_id": investor_id }))
        .send()
        .await
        .expect("express interest");
    assert_eq!(express.status(), reqwest::StatusCode::CREATED);

    let duplicate = client
        .post(format!("{base_url}/pitches/{pitch_id}/interests"))
        .json(&json!({ "investor_id": investor_id }))
        .send()
        .await
        .expect("duplicate interest");
    assert_eq!(duplicate.status(), reqwest::StatusCode::CONFLICT);

    let accept: serde_json::Value = client
        .post(format!(
            "{base_url}/pitches/{pitch_id}/interests/{investor_id}/status"
        ))
        .json(&json!({ "founder_id": founder_id, "status": "accepted" }))
        .send()
        .await
        .expect("accept interest")
        .json()
        .await
        .expect("interest json");
    assert_eq!(accept["status"], "accepted");

    let withdraw = client
        .post(format!("{base_url}/pitches/{pitch_id}/interests/withdraw"))
        .json(&json!({ "investor_id": investor_id }))
        .send()
        .await
        .expect("withdraw interest");
    assert_eq!(withdraw.status(), reqwest::StatusCode::CONFLICT);

    // Messaging between the two participants.
    let sent = client
        .post(format!("{base_url}/pitches/{pitch_id}/messages"))
        .json(&json!({
            "sender_id": investor_id,
            "receiver_id": founder_id,
            "content": "Interested in your seed round"
        }))
        .send()
        .await
        .expect("send message");
    assert_eq!(sent.status(), reqwest::StatusCode::CREATED);

    let history: serde_json::Value = client
        .get(format!(
            "{base_url}/pitches/{pitch_id}/messages?participant_id={founder_id}"
        ))
        .send()
        .await
        .expect("history response")
        .json()
        .await
        .expect("history json");
    let messages = history.as_array().expect("history array");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], "Interested in your seed round");

    // Pitch deck uploads must be PDF; a text file is refused.
    let bad_form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(b"plain text".to_vec())
            .file_name("deck.txt")
            .mime_str("text/plain")
            .unwrap(),
    );
    let bad_upload = client
        .post(format!("{base_url}/uploads/pitch-decks"))
        .multipart(bad_form)
        .send()
        .await
        .expect("bad upload");
    assert_eq!(bad_upload.status(), reqwest::StatusCode::BAD_REQUEST);

    let pdf_bytes = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\ntrailer\n<<>>\n%%EOF\n".to_vec();
    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(pdf_bytes.clone())
            .file_name("deck.pdf")
            .mime_str("application/pdf")
            .unwrap(),
    );
    let upload_resp: serde_json::Value = client
        .post(format!("{base_url}/uploads/pitch-decks"))
        .multipart(form)
        .send()
        .await
        .expect("upload response")
        .json()
        .await
        .expect("upload json");
    let upload_id = upload_resp
        .get("id")
        .and_then(|id| id.as_str())
        .expect("upload id");

    let downloaded = client
        .get(format!("{base_url}/uploads/{upload_id}"))
        .send()
        .await
        .expect("download")
        .bytes()
        .await
        .expect("download bytes");
    assert_eq!(downloaded.as_ref(), pdf_bytes.as_slice());

    // Deleting the pitch cascades to its interests and messages.
    let delete = client
        .delete(format!(
            "{base_url}/pitches/{pitch_id}?founder_id={founder_id}"
        ))
        .send()
        .await
        .expect("delete pitch");
    assert_eq!(delete.status(), reqwest::StatusCode::NO_CONTENT);

    let gone = client
        .get(format!("{base_url}/pitches/{pitch_id}"))
        .send()
        .await
        .expect("get deleted pitch");
    assert_eq!(gone.status(), reqwest::StatusCode::NOT_FOUND);

    let history_after: serde_json::Value = client
        .get(format!(
            "{base_url}/pitches/{pitch_id}/messages?participant_id={founder_id}"
        ))
        .send()
        .await
        .expect("history after delete")
        .json()
        .await
        .expect("history json");
    assert_eq!(history_after, json!([]));

    let events = client
        .get(format!("{base_url}/pitches/{pitch_id}/messages/events"))
        .send()
        .await
        .expect("events for deleted pitch");
    assert_eq!(events.status(), reqwest::StatusCode::NOT_FOUND);

    server.abort();
    let _ = server.await;
}
