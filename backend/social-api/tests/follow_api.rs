mod common;

use actix_web::test;
use common::TestContext;
use serde_json::Value;

#[actix_web::test]
async fn follow_then_unfollow_updates_lists() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);
    let (_alice, alice_token) = ctx.user("alice").await;
    let (bob, _) = ctx.user("bob").await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/follow/{}", bob.id))
        .insert_header(("Authorization", alice_token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "You are now following bob");

    let req = test::TestRequest::get()
        .uri("/api/v1/following")
        .insert_header(("Authorization", alice_token.clone()))
        .to_request();
    let following: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(following.len(), 1);
    assert_eq!(following[0]["username"], "bob");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/unfollow/{}", bob.id))
        .insert_header(("Authorization", alice_token.clone()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "You have unfollowed bob");

    let req = test::TestRequest::get()
        .uri("/api/v1/following")
        .insert_header(("Authorization", alice_token))
        .to_request();
    let following: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert!(following.is_empty());
}

#[actix_web::test]
async fn followers_list_shows_follower() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);
    let (_alice, alice_token) = ctx.user("alice").await;
    let (bob, bob_token) = ctx.user("bob").await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/follow/{}", bob.id))
        .insert_header(("Authorization", alice_token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let req = test::TestRequest::get()
        .uri("/api/v1/followers")
        .insert_header(("Authorization", bob_token))
        .to_request();
    let followers: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0]["username"], "alice");
}

#[actix_web::test]
async fn self_follow_is_bad_request() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);
    let (alice, token) = ctx.user("alice").await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/follow/{}", alice.id))
        .insert_header(("Authorization", token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "You cannot follow yourself");
}

#[actix_web::test]
async fn duplicate_follow_and_missing_unfollow_are_bad_requests() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);
    let (_alice, token) = ctx.user("alice").await;
    let (bob, _) = ctx.user("bob").await;

    let follow = || {
        test::TestRequest::post()
            .uri(&format!("/api/v1/follow/{}", bob.id))
            .insert_header(("Authorization", token.clone()))
            .to_request()
    };
    assert_eq!(test::call_service(&app, follow()).await.status(), 200);

    let resp = test::call_service(&app, follow()).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "You are already following this user");

    let (carol, _) = ctx.user("carol").await;
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/unfollow/{}", carol.id))
        .insert_header(("Authorization", token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "You are not following this user");
}

#[actix_web::test]
async fn follow_unknown_user_is_not_found() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);
    let (_alice, token) = ctx.user("alice").await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/follow/{}", uuid::Uuid::new_v4()))
        .insert_header(("Authorization", token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_web::test]
async fn follow_requires_authentication() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);
    let (bob, _) = ctx.user("bob").await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/follow/{}", bob.id))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);
}
