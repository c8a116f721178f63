mod common;

use ada_service::config::AdaConfig;
use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn turns_append_player_and_dm_entries() {
    let app = TestApp::spawn();
    let dm = app.login_as("dm").await;
    let campaign = app.create_campaign(&dm, "Lost Mine", "ai_dm").await;

    let (status, turn) = app
        .post(
            "/api/ai-dm/turn",
            &dm,
            json!({ "campaign_id": campaign, "action": "I search the cave mouth" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(turn["turn"], 1);
    assert_eq!(turn["player"]["role"], "player");
    assert_eq!(turn["player"]["content"], "I search the cave mouth");
    assert_eq!(turn["dm"]["role"], "dm");
    let narration = turn["narration"].as_str().unwrap();
    assert!(narration.starts_with("A new chapter opens in Lost Mine."));
    assert!(narration.ends_with("What do you do next?"));

    let (_, turn) = app
        .post(
            "/api/ai-dm/turn",
            &dm,
            json!({ "campaign_id": campaign, "action": "attack the wolf" }),
        )
        .await;
    assert_eq!(turn["turn"], 2);
    assert!(turn["narration"]
        .as_str()
        .unwrap()
        .starts_with("Still echoing: \"A new chapter opens in Lost Mine.\""));

    let (status, history) = app
        .get(&format!("/api/ai-dm/{}/history", campaign), &dm)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["turn"], 2);
    assert_eq!(history["total"], 4);
    assert_eq!(history["entries"].as_array().unwrap().len(), 4);

    let (_, limited) = app
        .get(&format!("/api/ai-dm/{}/history?limit=1", campaign), &dm)
        .await;
    let entries = limited["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["role"], "dm");
}

#[tokio::test]
async fn turn_preconditions() {
    let mut config = AdaConfig::local();
    config.ai_dm.max_action_length = 10;
    let app = TestApp::with_config(config);
    let dm = app.login_as("dm").await;
    let outsider = app.login_as("lurker").await;
    let human = app.create_campaign(&dm, "Human Table", "human").await;
    let ai = app.create_campaign(&dm, "Machine Table", "ai_dm").await;

    let (status, body) = app
        .post(
            "/api/ai-dm/turn",
            &dm,
            json!({ "campaign_id": human, "action": "look" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Campaign is not in AI-DM mode");

    let (status, _) = app
        .post("/api/ai-dm/turn", &dm, json!({ "campaign_id": ai, "action": "  " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/ai-dm/turn",
            &dm,
            json!({ "campaign_id": ai, "action": "a very long action indeed" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .post(
            "/api/ai-dm/turn",
            &outsider,
            json!({ "campaign_id": ai, "action": "look" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post(
            "/api/ai-dm/turn",
            &dm,
            json!({ "campaign_id": "missing", "action": "look" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn character_must_be_linked_to_play() {
    let app = TestApp::spawn();
    let dm = app.login_as("dm").await;
    let campaign = app.create_campaign(&dm, "Citadel", "ai_dm").await;
    let character = app.forge(&dm, "a dragonborn paladin named Kriv").await;
    let character_id = character["id"].as_str().unwrap();

    let (status, _) = app
        .post(
            "/api/ai-dm/turn",
            &dm,
            json!({ "campaign_id": campaign, "action": "pray", "character_id": character_id }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.post(
        &format!("/api/campaigns/{}/characters", campaign),
        &dm,
        json!({ "character_id": character_id }),
    )
    .await;

    let (status, turn) = app
        .post(
            "/api/ai-dm/turn",
            &dm,
            json!({ "campaign_id": campaign, "action": "pray", "character_id": character_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(turn["player"]["speaker"], "Kriv");
    assert_eq!(turn["player"]["character_id"], character_id);
}

#[tokio::test]
async fn checkpoint_and_rewind() {
    let app = TestApp::spawn();
    let dm = app.login_as("dm").await;
    let player = app.login_as("player").await;
    let campaign = app.create_campaign(&dm, "Rewind Test", "ai_dm").await;

    app.post(
        "/api/ai-dm/turn",
        &dm,
        json!({ "campaign_id": campaign, "action": "open the door" }),
    )
    .await;

    let (status, checkpoint) = app
        .post(&format!("/api/ai-dm/{}/checkpoint", campaign), &dm, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(checkpoint["checkpoint"], 2);
    assert_eq!(checkpoint["turn"], 1);

    for action in ["step inside", "light a torch"] {
        app.post(
            "/api/ai-dm/turn",
            &dm,
            json!({ "campaign_id": campaign, "action": action }),
        )
        .await;
    }

    // Only the owner may rewind
    let (status, _) = app
        .post(&format!("/api/ai-dm/{}/rewind", campaign), &player, json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, rewound) = app
        .post(&format!("/api/ai-dm/{}/rewind", campaign), &dm, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rewound["removed"], 4);
    assert_eq!(rewound["turn"], 1);

    let (_, history) = app
        .get(&format!("/api/ai-dm/{}/history?limit=50", campaign), &dm)
        .await;
    assert_eq!(history["total"], 2);
    assert_eq!(history["entries"][0]["content"], "open the door");

    // Play resumes from the restored turn
    let (_, turn) = app
        .post(
            "/api/ai-dm/turn",
            &dm,
            json!({ "campaign_id": campaign, "action": "close the door" }),
        )
        .await;
    assert_eq!(turn["turn"], 2);
}

#[tokio::test]
async fn attached_script_sets_the_opening_scene() {
    let app = TestApp::spawn();
    let dm = app.login_as("dm").await;
    let campaign = app.create_campaign(&dm, "Citadel Run", "ai_dm").await;

    let (_, script) = app
        .post(
            "/api/scripts",
            &dm,
            json!({ "title": "The Sunless Citadel", "campaign_id": campaign }),
        )
        .await;
    let (status, _) = app
        .put(
            &format!("/api/campaigns/{}/script", campaign),
            &dm,
            json!({ "script_id": script["id"] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, turn) = app
        .post(
            "/api/ai-dm/turn",
            &dm,
            json!({ "campaign_id": campaign, "action": "look around the ravine" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let narration = turn["narration"].as_str().unwrap();
    assert!(narration.starts_with("The tale of The Sunless Citadel begins."));
    assert!(narration.contains("dm presses onward through The Sunless Citadel"));
}

#[tokio::test]
async fn malformed_history_query_is_json_error() {
    let app = TestApp::spawn();
    let dm = app.login_as("dm").await;
    let campaign = app.create_campaign(&dm, "Query Test", "ai_dm").await;

    let (status, body) = app
        .get(&format!("/api/ai-dm/{}/history?limit=abc", campaign), &dm)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid query string");

    let (status, _) = app
        .get(&format!("/api/ai-dm/{}/history?limit=0", campaign), &dm)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
