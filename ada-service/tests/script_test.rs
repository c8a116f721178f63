mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn script_crud() {
    let app = TestApp::spawn();
    let token = app.login_as("dm").await;

    let (status, script) = app
        .post(
            "/api/scripts",
            &token,
            json!({ "title": "The Sunless Citadel", "body": "A ravine swallows the old fortress." }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = script["id"].as_str().unwrap();

    let (status, updated) = app
        .put(
            &format!("/api/scripts/{}", id),
            &token,
            json!({ "body": "Goblins and kobolds feud below." }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "The Sunless Citadel");
    assert_eq!(updated["body"], "Goblins and kobolds feud below.");

    let (_, listed) = app.get("/api/scripts", &token).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = app.delete(&format!("/api/scripts/{}", id), &token).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("/api/scripts/{}", id), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn scripts_belong_to_campaign_owners() {
    let app = TestApp::spawn();
    let dm = app.login_as("dm").await;
    let player = app.login_as("player").await;
    let campaign = app.create_campaign(&dm, "Citadel", "ai_dm").await;

    let (status, _) = app
        .post(
            "/api/scripts",
            &player,
            json!({ "title": "Hijack", "campaign_id": campaign }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, foreign) = app
        .post("/api/scripts", &player, json!({ "title": "Mine" }))
        .await;
    let (status, _) = app
        .put(
            &format!("/api/campaigns/{}/script", campaign),
            &dm,
            json!({ "script_id": foreign["id"] }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, own) = app
        .post("/api/scripts", &dm, json!({ "title": "The Sunless Citadel" }))
        .await;
    let (status, attached) = app
        .put(
            &format!("/api/campaigns/{}/script", campaign),
            &dm,
            json!({ "script_id": own["id"] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(attached["script_id"], own["id"]);

    let (status, _) = app
        .get(&format!("/api/scripts/{}", own["id"].as_str().unwrap()), &player)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deleting_an_attached_script_detaches_it() {
    let app = TestApp::spawn();
    let dm = app.login_as("dm").await;
    let campaign = app.create_campaign(&dm, "Citadel", "ai_dm").await;

    let (_, script) = app
        .post("/api/scripts", &dm, json!({ "title": "The Sunless Citadel" }))
        .await;
    let script_id = script["id"].as_str().unwrap();
    app.put(
        &format!("/api/campaigns/{}/script", campaign),
        &dm,
        json!({ "script_id": script_id }),
    )
    .await;

    let (_, attached) = app.get(&format!("/api/scripts/{}", script_id), &dm).await;
    assert_eq!(attached["campaign_id"], campaign.as_str());

    let (status, _) = app.delete(&format!("/api/scripts/{}", script_id), &dm).await;
    assert_eq!(status, StatusCode::OK);

    let (_, detail) = app.get(&format!("/api/campaigns/{}", campaign), &dm).await;
    assert!(detail.get("script_id").map_or(true, |v| v.is_null()));
}

#[tokio::test]
async fn reattaching_moves_both_links() {
    let app = TestApp::spawn();
    let dm = app.login_as("dm").await;
    let first = app.create_campaign(&dm, "First", "ai_dm").await;
    let second = app.create_campaign(&dm, "Second", "ai_dm").await;

    let (_, citadel) = app
        .post("/api/scripts", &dm, json!({ "title": "The Sunless Citadel" }))
        .await;
    let (_, tomb) = app
        .post("/api/scripts", &dm, json!({ "title": "Tomb of Horrors" }))
        .await;
    let citadel_id = citadel["id"].as_str().unwrap();
    let tomb_id = tomb["id"].as_str().unwrap();

    let attach = |campaign: &str, script_id: &str| {
        (
            format!("/api/campaigns/{}/script", campaign),
            json!({ "script_id": script_id }),
        )
    };

    let (uri, body) = attach(&first, citadel_id);
    app.put(&uri, &dm, body).await;

    // Swap the first campaign's script: the old one is released
    let (uri, body) = attach(&first, tomb_id);
    let (status, campaign) = app.put(&uri, &dm, body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(campaign["script_id"], tomb_id);
    let (_, released) = app.get(&format!("/api/scripts/{}", citadel_id), &dm).await;
    assert!(released.get("campaign_id").map_or(true, |v| v.is_null()));

    // Move the tomb to the second campaign: the first loses it
    let (uri, body) = attach(&second, tomb_id);
    app.put(&uri, &dm, body).await;
    let (_, first_detail) = app.get(&format!("/api/campaigns/{}", first), &dm).await;
    assert!(first_detail.get("script_id").map_or(true, |v| v.is_null()));
    let (_, moved) = app.get(&format!("/api/scripts/{}", tomb_id), &dm).await;
    assert_eq!(moved["campaign_id"], second.as_str());
}
