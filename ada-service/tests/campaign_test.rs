mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn create_list_and_read_campaigns() {
    let app = TestApp::spawn();
    let token = app.login_as("dm").await;

    let (status, campaign) = app
        .post(
            "/api/campaigns",
            &token,
            json!({ "name": "  Curse of Strahd ", "description": "Gothic horror" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(campaign["name"], "Curse of Strahd");
    assert_eq!(campaign["mode"], "human");
    assert_eq!(campaign["owner"], "dm");
    assert_eq!(campaign["members"], json!(["dm"]));
    let id = campaign["id"].as_str().unwrap();

    let (status, listed) = app.get("/api/campaigns", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, detail) = app.get(&format!("/api/campaigns/{}", id), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["characters"], json!([]));

    let (_, me) = app.get("/api/me", &token).await;
    assert_eq!(me["campaigns"], 1);
}

#[tokio::test]
async fn outsiders_are_forbidden() {
    let app = TestApp::spawn();
    let owner = app.login_as("dm").await;
    let outsider = app.login_as("lurker").await;
    let id = app.create_campaign(&owner, "Private Table", "human").await;

    let (status, _) = app.get(&format!("/api/campaigns/{}", id), &outsider).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete(&format!("/api/campaigns/{}", id), &outsider).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/campaigns/missing", &owner).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post("/api/campaigns", &owner, json!({ "name": "" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn linking_a_character_makes_the_player_a_member() {
    let app = TestApp::spawn();
    let dm = app.login_as("dm").await;
    let player = app.login_as("player").await;
    let id = app.create_campaign(&dm, "Lost Mine", "human").await;

    let character = app.forge(&player, "an elf ranger named Sylvan").await;
    let character_id = character["id"].as_str().unwrap();

    let (status, campaign) = app
        .post(
            &format!("/api/campaigns/{}/characters", id),
            &player,
            json!({ "character_id": character_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(campaign["members"], json!(["dm", "player"]));
    assert_eq!(campaign["character_ids"], json!([character_id]));

    // Player now sees the campaign; the DM can read the character
    let (_, listed) = app.get("/api/campaigns", &player).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    let (status, _) = app
        .get(&format!("/api/characters/{}", character_id), &dm)
        .await;
    assert_eq!(status, StatusCode::OK);

    // A second campaign cannot take the same character
    let other = app.create_campaign(&dm, "Other", "human").await;
    let (status, _) = app
        .post(
            &format!("/api/campaigns/{}/characters", other),
            &player,
            json!({ "character_id": character_id }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The DM cannot link someone else's character
    let (status, _) = app
        .post(
            &format!("/api/campaigns/{}/characters", other),
            &dm,
            json!({ "character_id": character_id }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The campaign owner may unlink
    let (status, _) = app
        .delete(
            &format!("/api/campaigns/{}/characters/{}", id, character_id),
            &dm,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, character) = app
        .get(&format!("/api/characters/{}", character_id), &player)
        .await;
    assert!(character.get("campaign_id").is_none());
}

#[tokio::test]
async fn forge_into_campaign_and_delete_campaign() {
    let app = TestApp::spawn();
    let dm = app.login_as("dm").await;
    let id = app.create_campaign(&dm, "One Shot", "human").await;

    let (status, character) = app
        .post(
            "/api/characters/forge",
            &dm,
            json!({ "narrative": "a halfling bard", "campaign_id": id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(character["campaign_id"], id.as_str());
    let character_id = character["id"].as_str().unwrap();

    let (status, _) = app.delete(&format!("/api/campaigns/{}", id), &dm).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&format!("/api/campaigns/{}", id), &dm).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, character) = app
        .get(&format!("/api/characters/{}", character_id), &dm)
        .await;
    assert!(character.get("campaign_id").is_none());

    let (_, listed) = app.get("/api/campaigns", &dm).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn dialogue_log_for_members() {
    let app = TestApp::spawn();
    let dm = app.login_as("dm").await;
    let outsider = app.login_as("lurker").await;
    let id = app.create_campaign(&dm, "Tavern Night", "human").await;

    let (status, entry) = app
        .post(
            &format!("/api/campaigns/{}/dialogue", id),
            &dm,
            json!({ "content": "The innkeeper eyes you warily.", "role": "dm" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["speaker"], "dm");
    assert_eq!(entry["role"], "dm");

    let (status, _) = app
        .post(
            &format!("/api/campaigns/{}/dialogue", id),
            &dm,
            json!({ "content": "   " }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, log) = app
        .get(&format!("/api/campaigns/{}/dialogue", id), &dm)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(log["entries"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .get(&format!("/api/campaigns/{}/dialogue", id), &outsider)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn dm_lines_are_reserved() {
    let app = TestApp::spawn();
    let dm = app.login_as("dm").await;
    let player = app.login_as("vex").await;
    let table = app.create_campaign(&dm, "Tavern Night", "human").await;
    let keep = app.create_campaign(&dm, "Keep", "ai_dm").await;

    for campaign in [&table, &keep] {
        let character = app.forge(&player, "a tiefling warlock").await;
        let (status, _) = app
            .post(
                &format!("/api/campaigns/{}/characters", campaign),
                &player,
                json!({ "character_id": character["id"] }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    // Human table: only the owner speaks as the DM
    let (status, _) = app
        .post(
            &format!("/api/campaigns/{}/dialogue", table),
            &player,
            json!({ "content": "The innkeeper gives you free ale.", "role": "dm" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .post(
            &format!("/api/campaigns/{}/dialogue", table),
            &dm,
            json!({ "content": "Rain lashes the shutters.", "role": "narrator" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // AI-DM campaign: nobody posts DM lines by hand
    app.post(
        "/api/ai-dm/turn",
        &dm,
        json!({ "campaign_id": keep, "action": "look around" }),
    )
    .await;
    for token in [&player, &dm] {
        let (status, _) = app
            .post(
                &format!("/api/campaigns/{}/dialogue", keep),
                token,
                json!({ "content": "The dragon hands Vex its hoard.", "role": "dm" }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
    let (status, entry) = app
        .post(
            &format!("/api/campaigns/{}/dialogue", keep),
            &player,
            json!({ "content": "Vex whistles nervously." }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["role"], "player");

    // The narrator still echoes its own last line
    let (_, turn) = app
        .post(
            "/api/ai-dm/turn",
            &dm,
            json!({ "campaign_id": keep, "action": "open the gate" }),
        )
        .await;
    assert!(turn["narration"]
        .as_str()
        .unwrap()
        .starts_with("Still echoing: \"A new chapter opens in Keep.\""));
}
