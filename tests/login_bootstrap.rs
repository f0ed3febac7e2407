//! Login bootstrap against stub stands.

use std::collections::BTreeMap;

use reqwest::StatusCode;
use stand_proxy::auth::{log_in, log_in_all, LoginError};
use stand_proxy::config::LoginConfig;
use stand_proxy::routing::StandDirectory;

mod common;

use common::{StubReply, start_stub_stand};

fn login(url: &str, form: &[(&str, &str)]) -> LoginConfig {
    LoginConfig {
        url: url.to_string(),
        form: form
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}

#[tokio::test]
async fn test_login_seeds_cookie_map() {
    let mut stub = start_stub_stand(
        StubReply::new(200, "welcome").with_header("Set-Cookie", "SID=abc; Path=/"),
    )
    .await;

    let config = common::single_stand_config(
        "alpha",
        stub.addr.port(),
        &[("SID", "stale"), ("lang", "en")],
        &[],
        Some(login("/login", &[("user", "alice"), ("password", "secret")])),
    );
    let mut directory = StandDirectory::from_config(&config).unwrap();
    log_in_all(&mut directory).await.unwrap();

    let stand = directory.lookup("alpha").unwrap();
    assert_eq!(stand.cookies().get("SID").map(String::as_str), Some("abc"));
    assert_eq!(stand.cookies().get("lang").map(String::as_str), Some("en"));

    let captured = stub.drain();
    assert_eq!(captured.len(), 1);
    let request = &captured[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.target, "/login");
    assert!(request
        .header("content-type")
        .unwrap()
        .starts_with("application/x-www-form-urlencoded"));
    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("user=alice"));
    assert!(body.contains("password=secret"));
}

#[tokio::test]
async fn test_login_without_cookies_keeps_defaults() {
    let stub = start_stub_stand(StubReply::new(500, "boom")).await;

    let config = common::single_stand_config(
        "beta",
        stub.addr.port(),
        &[("SID", "static")],
        &[],
        Some(login("/auth", &[("user", "bob")])),
    );
    let mut directory = StandDirectory::from_config(&config).unwrap();
    let stand = directory.stands_mut().next().unwrap();

    let outcome = log_in(stand).await.unwrap().unwrap();
    assert_eq!(outcome.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(outcome.cookies, 0);

    let stand = directory.lookup("beta").unwrap();
    assert_eq!(stand.cookies().get("SID").map(String::as_str), Some("static"));
    assert_eq!(stand.cookies().len(), 1);
}

#[tokio::test]
async fn test_stand_without_login_is_skipped() {
    let config = common::single_stand_config("gamma", 1, &[("k", "v")], &[], None);
    let mut directory = StandDirectory::from_config(&config).unwrap();
    let stand = directory.stands_mut().next().unwrap();

    assert!(log_in(stand).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unreachable_stand_fails_bootstrap() {
    let port = common::closed_port().await;
    let config = common::single_stand_config(
        "delta",
        port,
        &[],
        &[],
        Some(login("/login", &[("user", "carol")])),
    );
    let mut directory = StandDirectory::from_config(&config).unwrap();

    let err = log_in_all(&mut directory).await.unwrap_err();
    match err {
        LoginError::Request { stand, .. } => assert_eq!(stand, "delta"),
        other => panic!("unexpected error: {other}"),
    }
}
