use std::sync::Arc;

use axum::{
    Json, Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode},
    routing::post,
};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

use herspace_api::auth::{AppStateInner, JwtConfig};
use herspace_api::chat::{ChatClient, ChatConfig};
use herspace_api::reading::COMPANION_FALLBACK;
use herspace_db::Database;

fn app() -> Router {
    // No API key: every chat call takes the fallback path
    app_with_chat(ChatConfig::default())
}

fn app_with_chat(chat: ChatConfig) -> Router {
    let db = Database::open_in_memory().unwrap();
    herspace_db::seed::seed_static_content(&db, Utc::now()).unwrap();
    let state = Arc::new(AppStateInner {
        db,
        jwt: JwtConfig {
            secret: "integration-secret".into(),
            access_ttl: Duration::minutes(60),
            refresh_ttl: Duration::days(7),
        },
        chat: ChatClient::new(chat).unwrap(),
    });
    herspace_api::router(state)
}

/// Chat endpoint answering every completion with `status` and `body`.
async fn chat_stub(status: StatusCode, body: Value) -> ChatConfig {
    let stub = Router::new().route(
        "/chat/completions",
        post(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, stub).await.unwrap() });
    ChatConfig {
        api_key: Some("sk-test".into()),
        base_url: format!("http://{addr}"),
        ..ChatConfig::default()
    }
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Reply {
    call_with(app, method, uri, token, &[], body).await
}

async fn call_with(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    extra: &[(&str, &str)],
    body: Option<Value>,
) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    for (name, value) in extra {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    Reply { status, headers, body }
}

async fn register(app: &Router, username: &str) -> String {
    let reply = call(
        app,
        Method::POST,
        "/api/users/auth/register/",
        None,
        Some(json!({"username": username, "password": "moonlight-42", "email": format!("{username}@example.com")})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    reply.body["access"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_login_refresh_and_me() {
    let app = app();
    register(&app, "luna").await;

    let dup = call(
        &app,
        Method::POST,
        "/api/users/auth/register/",
        None,
        Some(json!({"username": "luna", "password": "moonlight-42"})),
    )
    .await;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);
    assert!(dup.body["errors"]["username"].is_array());

    let numeric = call(
        &app,
        Method::POST,
        "/api/users/auth/register/",
        None,
        Some(json!({"username": "nova", "password": "12345678"})),
    )
    .await;
    assert_eq!(numeric.status, StatusCode::BAD_REQUEST);
    assert!(numeric.body["errors"]["password"].is_array());

    let bad = call(
        &app,
        Method::POST,
        "/api/token/",
        None,
        Some(json!({"username": "luna", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(bad.status, StatusCode::UNAUTHORIZED);

    let login = call(
        &app,
        Method::POST,
        "/api/token/",
        None,
        Some(json!({"username": "luna", "password": "moonlight-42"})),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
    let access = login.body["access"].as_str().unwrap().to_string();
    let refresh = login.body["refresh"].as_str().unwrap().to_string();

    // a refresh token is not an access token
    let me = call(&app, Method::GET, "/api/users/me/", Some(&refresh), None).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);

    let renewed = call(&app, Method::POST, "/api/token/refresh/", None, Some(json!({"refresh": refresh}))).await;
    assert_eq!(renewed.status, StatusCode::OK);
    assert!(renewed.body["access"].is_string());

    let me = call(&app, Method::GET, "/api/users/me/", Some(&access), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["username"], "luna");
    assert_eq!(me.body["email"], "luna@example.com");
}

#[tokio::test]
async fn protected_routes_need_a_token() {
    let app = app();
    let none = call(&app, Method::GET, "/api/journal/journal-entries/", None, None).await;
    assert_eq!(none.status, StatusCode::UNAUTHORIZED);
    let bogus = call(&app, Method::GET, "/api/journal/journal-entries/", Some("not.a.jwt"), None).await;
    assert_eq!(bogus.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn journal_entries_are_private() {
    let app = app();
    let ana = register(&app, "ana").await;
    let bea = register(&app, "bea").await;

    let created = call(
        &app,
        Method::POST,
        "/api/journal/journal-entries/",
        Some(&ana),
        Some(json!({"title": "Morning", "content": "Slept well."})),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let uri = format!("/api/journal/journal-entries/{}/", created.body["id"].as_str().unwrap());

    let foreign = call(&app, Method::GET, &uri, Some(&bea), None).await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let patched = call(&app, Method::PATCH, &uri, Some(&ana), Some(json!({"title": "Dawn"}))).await;
    assert_eq!(patched.status, StatusCode::OK);
    assert_eq!(patched.body["title"], "Dawn");
    assert_eq!(patched.body["content"], "Slept well.");

    let blank = call(&app, Method::PUT, &uri, Some(&ana), Some(json!({"content": "  "}))).await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);

    let deleted = call(&app, Method::DELETE, &uri, Some(&ana), None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    let list = call(&app, Method::GET, "/api/journal/journal-entries/", Some(&ana), None).await;
    assert_eq!(list.body, json!([]));
}

#[tokio::test]
async fn one_mood_checkin_and_task_set_per_day() {
    let app = app();
    let token = register(&app, "cleo").await;

    let first = call(&app, Method::POST, "/api/journal/mood-checkins/", Some(&token), Some(json!({"mood": "calm"}))).await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["date"], Utc::now().date_naive().to_string());

    let second = call(&app, Method::POST, "/api/journal/mood-checkins/", Some(&token), Some(json!({"mood": "sad"}))).await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert!(second.body["errors"]["date"].is_array());

    let unknown = call(&app, Method::POST, "/api/journal/mood-checkins/", Some(&token), Some(json!({"mood": "ecstatic"}))).await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);

    let tasks = json!({"body_task": "walk", "work_task": "inbox", "soul_task": "read"});
    let first = call(&app, Method::POST, "/api/journal/daily-tasks/", Some(&token), Some(tasks.clone())).await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["completed"], false);
    let second = call(&app, Method::POST, "/api/journal/daily-tasks/", Some(&token), Some(tasks)).await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert!(second.body["errors"]["date"].is_array());
}

#[tokio::test]
async fn tarot_reading_uses_card_meanings_offline() {
    let app = app();
    let token = register(&app, "dara").await;

    let cards = call(&app, Method::GET, "/api/journal/tarot/cards/?suit=wands", Some(&token), None).await;
    assert_eq!(cards.body.as_array().unwrap().len(), 2);

    let reading = call(
        &app,
        Method::POST,
        "/api/journal/tarot/readings/",
        Some(&token),
        Some(json!({"question": "What should I focus on?"})),
    )
    .await;
    assert_eq!(reading.status, StatusCode::CREATED);
    assert_eq!(reading.body["reading_type"], "three_card");
    let drawn = reading.body["cards"].as_array().unwrap();
    assert_eq!(drawn.len(), 3);
    assert_eq!(drawn[2]["position"], 2);
    let interpretation = reading.body["interpretation"].as_str().unwrap();
    assert!(interpretation.contains("Past:"));

    let uri = format!("/api/journal/tarot/readings/{}/", reading.body["id"].as_str().unwrap());
    let renamed = call(&app, Method::PATCH, &uri, Some(&token), Some(json!({"question": "Where next?"}))).await;
    assert_eq!(renamed.body["question"], "Where next?");
    assert_eq!(renamed.body["cards"], reading.body["cards"]);

    let big = call(
        &app,
        Method::POST,
        "/api/journal/tarot/readings/",
        Some(&token),
        Some(json!({"question": "Everything", "card_count": 40})),
    )
    .await;
    assert_eq!(big.body["reading_type"], "celtic_cross");
    assert_eq!(big.body["cards"].as_array().unwrap().len(), 10);

    let single = call(
        &app,
        Method::POST,
        "/api/journal/tarot/readings/",
        Some(&token),
        Some(json!({"question": "Today?", "card_count": 1})),
    )
    .await;
    assert_eq!(single.status, StatusCode::CREATED);
    assert_eq!(single.body["reading_type"], "single");
    let drawn = single.body["cards"].as_array().unwrap();
    assert_eq!(drawn.len(), 1);
    assert_eq!(drawn[0]["position"], 0);
}

#[tokio::test]
async fn failing_chat_endpoint_falls_back() {
    let app = app_with_chat(chat_stub(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "overloaded"})).await);
    let token = register(&app, "faye").await;

    let reading = call(
        &app,
        Method::POST,
        "/api/journal/tarot/readings/",
        Some(&token),
        Some(json!({"question": "What is next?"})),
    )
    .await;
    assert_eq!(reading.status, StatusCode::CREATED);
    let interpretation = reading.body["interpretation"].as_str().unwrap();
    assert!(!interpretation.is_empty());
    assert!(interpretation.contains("Past:"));

    let general = call(
        &app,
        Method::POST,
        "/api/journal/dagi-ai/",
        Some(&token),
        Some(json!({"message": "I have been doing cardio and feel drained"})),
    )
    .await;
    assert_eq!(general.status, StatusCode::OK);
    assert_eq!(general.body["conversation_type"], "general");
    assert_eq!(general.body["response"], COMPANION_FALLBACK);
}

#[tokio::test]
async fn empty_chat_reply_falls_back() {
    let app = app_with_chat(chat_stub(StatusCode::OK, json!({"choices": []})).await);
    let token = register(&app, "gala").await;

    let tarot = call(
        &app,
        Method::POST,
        "/api/journal/dagi-ai/",
        Some(&token),
        Some(json!({"message": "Draw two tarot cards"})),
    )
    .await;
    assert_eq!(tarot.body["conversation_type"], "tarot");
    assert_eq!(tarot.body["reading"]["cards"].as_array().unwrap().len(), 2);
    assert!(tarot.body["response"].as_str().unwrap().contains("speaks of"));

    let general = call(&app, Method::POST, "/api/journal/dagi-ai/", Some(&token), Some(json!({"message": "hello"}))).await;
    assert_eq!(general.body["response"], COMPANION_FALLBACK);
}

#[tokio::test]
async fn chat_reply_is_used_when_available() {
    let reply = json!({"choices": [{"message": {"role": "assistant", "content": "Trust the slow unfolding."}}]});
    let app = app_with_chat(chat_stub(StatusCode::OK, reply).await);
    let token = register(&app, "hana").await;

    let reading = call(
        &app,
        Method::POST,
        "/api/journal/tarot/readings/",
        Some(&token),
        Some(json!({"question": "Where am I going?"})),
    )
    .await;
    assert_eq!(reading.status, StatusCode::CREATED);
    assert_eq!(reading.body["interpretation"], "Trust the slow unfolding.");

    let general = call(&app, Method::POST, "/api/journal/dagi-ai/", Some(&token), Some(json!({"message": "hello"}))).await;
    assert_eq!(general.body["response"], "Trust the slow unfolding.");

    let history = call(&app, Method::GET, "/api/journal/ai/conversations/", Some(&token), None).await;
    assert_eq!(history.body[0]["response"], "Trust the slow unfolding.");
}

#[tokio::test]
async fn dagi_routes_tarot_and_general_messages() {
    let app = app();
    let token = register(&app, "eira").await;

    let tarot = call(
        &app,
        Method::POST,
        "/api/journal/dagi-ai/",
        Some(&token),
        Some(json!({"message": "Can you pull a single card for me?"})),
    )
    .await;
    assert_eq!(tarot.status, StatusCode::OK);
    assert_eq!(tarot.body["conversation_type"], "tarot");
    assert_eq!(tarot.body["reading"]["cards"].as_array().unwrap().len(), 1);

    let general = call(
        &app,
        Method::POST,
        "/api/journal/dagi-ai/",
        Some(&token),
        Some(json!({"message": "I feel tired today"})),
    )
    .await;
    assert_eq!(general.body["conversation_type"], "general");
    assert_eq!(general.body["response"], COMPANION_FALLBACK);
    assert!(general.body.get("reading").is_none());

    let history = call(&app, Method::GET, "/api/journal/ai/conversations/", Some(&token), None).await;
    assert_eq!(history.body.as_array().unwrap().len(), 2);
    let readings = call(&app, Method::GET, "/api/journal/tarot/readings/", Some(&token), None).await;
    assert_eq!(readings.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn anonymous_reactions_toggle_by_session() {
    let app = app();

    let post = call(
        &app,
        Method::POST,
        "/api/community/posts/",
        None,
        Some(json!({"post_type": "gratitude", "title": "Small wins", "content": "Baby slept 5 hours!"})),
    )
    .await;
    assert_eq!(post.status, StatusCode::CREATED);
    let id = post.body["id"].as_str().unwrap().to_string();
    let reactions = format!("/api/community/posts/{id}/reactions/");

    let added = call(&app, Method::POST, &reactions, None, Some(json!({"reaction_type": "heart"}))).await;
    assert_eq!(added.status, StatusCode::CREATED);
    assert_eq!(added.body["action"], "added");
    let session = added.headers["x-session-id"].to_str().unwrap().to_string();
    assert_eq!(added.body["session_id"], session.as_str());

    let headers = [("x-session-id", session.as_str())];
    let changed = call_with(&app, Method::POST, &reactions, None, &headers, Some(json!({"reaction_type": "hug"}))).await;
    assert_eq!(changed.status, StatusCode::OK);
    assert_eq!(changed.body["action"], "changed");
    assert_eq!(changed.body["reaction_type"], "hug");

    let detail = call_with(&app, Method::GET, &format!("/api/community/posts/{id}/"), None, &headers, None).await;
    assert_eq!(detail.body["reaction_count"], 1);
    assert_eq!(detail.body["user_reactions"], json!(["hug"]));

    let removed = call_with(&app, Method::POST, &reactions, None, &headers, Some(json!({"reaction_type": "hug"}))).await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["action"], "removed");

    let listed = call(&app, Method::GET, &format!("{reactions}list/"), None, None).await;
    assert_eq!(listed.body, json!([]));

    let missing = call(
        &app,
        Method::POST,
        "/api/community/posts/00000000-0000-0000-0000-000000000000/comments/",
        None,
        Some(json!({"content": "hello"})),
    )
    .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn signed_in_reactions_do_not_issue_sessions() {
    let app = app();
    let token = register(&app, "fern").await;
    let post = call(
        &app,
        Method::POST,
        "/api/community/posts/",
        Some(&token),
        Some(json!({"post_type": "support", "title": "Hard week", "content": "Any tips?", "is_anonymous": false})),
    )
    .await;
    let id = post.body["id"].as_str().unwrap();

    let comment = call(
        &app,
        Method::POST,
        &format!("/api/community/posts/{id}/comments/"),
        Some(&token),
        Some(json!({"content": "You've got this"})),
    )
    .await;
    assert_eq!(comment.status, StatusCode::CREATED);

    let added = call(
        &app,
        Method::POST,
        &format!("/api/community/posts/{id}/reactions/"),
        Some(&token),
        Some(json!({"reaction_type": "support"})),
    )
    .await;
    assert_eq!(added.status, StatusCode::CREATED);
    assert!(added.headers.get("x-session-id").is_none());
    assert!(added.body.get("session_id").is_none());

    let listed = call(&app, Method::GET, "/api/community/posts/?post_type=support", None, None).await;
    let posts = listed.body.as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["comment_count"], 1);
}

#[tokio::test]
async fn notifications_stats_and_preferences() {
    let app = app();
    let token = register(&app, "gia").await;

    let mut ids = Vec::new();
    for priority in ["high", "low"] {
        let created = call(
            &app,
            Method::POST,
            "/api/notifications/create/",
            Some(&token),
            Some(json!({"title": "Check in", "message": "How are you?", "priority": priority})),
        )
        .await;
        assert_eq!(created.status, StatusCode::CREATED);
        ids.push(created.body["id"].clone());
    }

    let marked = call(
        &app,
        Method::PATCH,
        "/api/notifications/mark-read/",
        Some(&token),
        Some(json!({"notification_ids": [ids[0]]})),
    )
    .await;
    assert_eq!(marked.body["updated"], 1);

    let stats = call(&app, Method::GET, "/api/notifications/stats/", Some(&token), None).await;
    assert_eq!(stats.body["total_notifications"], 2);
    assert_eq!(stats.body["unread_count"], 1);
    assert_eq!(stats.body["high_priority_count"], 1);
    assert_eq!(stats.body["today_notifications"], 2);

    let unread = call(&app, Method::GET, "/api/notifications/?is_read=false", Some(&token), None).await;
    assert_eq!(unread.body.as_array().unwrap().len(), 1);

    let prefs = call(&app, Method::GET, "/api/notifications/preferences/", Some(&token), None).await;
    assert_eq!(prefs.body["mood_reminder_time"], "09:00:00");
    assert_eq!(prefs.body["email_notifications_enabled"], false);

    let updated = call(
        &app,
        Method::PATCH,
        "/api/notifications/preferences/",
        Some(&token),
        Some(json!({"email_notifications_enabled": true})),
    )
    .await;
    assert_eq!(updated.body["email_notifications_enabled"], true);
    assert_eq!(updated.body["task_reminder_time"], "08:00:00");

    let templates = call(&app, Method::GET, "/api/notifications/templates/", Some(&token), None).await;
    assert_eq!(templates.body.as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn wellness_profile_drives_rituals() {
    let app = app();
    let token = register(&app, "hana").await;

    let welcome = call(&app, Method::GET, "/api/wellness/rituals/", Some(&token), None).await;
    assert_eq!(welcome.status, StatusCode::OK);
    assert!(welcome.body.get("user_context").is_none());
    assert!(!welcome.body["rituals"].as_array().unwrap().is_empty());

    let onboarded = call(
        &app,
        Method::POST,
        "/api/wellness/onboarding/",
        Some(&token),
        Some(json!({"current_mood_context": "motherhood", "preferred_support_style": "gentle"})),
    )
    .await;
    assert_eq!(onboarded.body["profile"]["current_mood_context"], "motherhood");

    let wisdom = call(&app, Method::GET, "/api/wellness/wisdom/", Some(&token), None).await;
    assert_eq!(wisdom.status, StatusCode::OK);
    assert_eq!(wisdom.body["for_mood_context"], "any");

    let ritual = welcome.body["rituals"][0]["id"].clone();
    let tracked = call(
        &app,
        Method::POST,
        "/api/wellness/rituals/track/",
        Some(&token),
        Some(json!({"ritual": ritual, "effectiveness_rating": 5, "was_helpful": true})),
    )
    .await;
    assert_eq!(tracked.status, StatusCode::OK);

    let out_of_range = call(
        &app,
        Method::POST,
        "/api/wellness/rituals/track/",
        Some(&token),
        Some(json!({"ritual": ritual, "effectiveness_rating": 9})),
    )
    .await;
    assert_eq!(out_of_range.status, StatusCode::BAD_REQUEST);

    let history = call(&app, Method::GET, "/api/wellness/rituals/history/", Some(&token), None).await;
    assert_eq!(history.body["stats"]["total_rituals_used"], 1);
    assert_eq!(history.body["stats"]["average_rating"], 5.0);

    let mindfulness = call(&app, Method::GET, "/api/wellness/mindfulness/?lang=ka", Some(&token), None).await;
    let activity = &mindfulness.body.as_array().unwrap()[0];
    let session = call(
        &app,
        Method::POST,
        &format!("/api/wellness/mindfulness/{}/sessions/", activity["id"].as_str().unwrap()),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(session.status, StatusCode::CREATED);
    let sessions = call(&app, Method::GET, "/api/wellness/mindfulness/sessions/", Some(&token), None).await;
    assert_eq!(sessions.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn analytics_store_insights() {
    let app = app();
    let token = register(&app, "iris").await;

    call(&app, Method::POST, "/api/journal/mood-checkins/", Some(&token), Some(json!({"mood": "happy"}))).await;
    call(
        &app,
        Method::POST,
        "/api/journal/journal-entries/",
        Some(&token),
        Some(json!({"content": "Grateful for coffee."})),
    )
    .await;

    let mood = call(&app, Method::GET, "/api/analytics/mood/?days=7", Some(&token), None).await;
    assert_eq!(mood.status, StatusCode::OK);
    assert_eq!(mood.body["most_common_mood"], "happy");
    assert_eq!(mood.body["average_mood_score"], 4.0);

    let journal = call(&app, Method::GET, "/api/analytics/journal/", Some(&token), None).await;
    assert_eq!(journal.body["journaling_streak"], 1);

    let tasks = call(&app, Method::GET, "/api/analytics/tasks/", Some(&token), None).await;
    assert_eq!(tasks.body["task_completion_trend"].as_array().unwrap().len(), 7);

    let bad = call(&app, Method::GET, "/api/analytics/mood/?days=lots", Some(&token), None).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);

    let insights = call(&app, Method::GET, "/api/analytics/insights/", Some(&token), None).await;
    assert_eq!(insights.body.as_array().unwrap().len(), 3);

    let stats = call(&app, Method::GET, "/api/users/stats/", Some(&token), None).await;
    assert_eq!(stats.body["mood_checkins"], 1);
    assert_eq!(stats.body["journal_entries"], 1);
}
