//! login, logout and token commands

use crate::context::Context;
use anyhow::Result;
use serde_json::json;
use vitaltrack_api_client::TokenState;
use vitaltrack_cli::{print_json, Status};
use vitaltrack_telemetry::Timer;

pub async fn login(ctx: &Context, email: &str, password: &str) -> Result<()> {
    let client = ctx.client()?;
    let timer = Timer::start("login");
    let session = client.auth().sign_in(email, password).await?;
    timer.stop();

    let expires_at = client
        .tokens()
        .claims()
        .and_then(|claims| claims.expires_at());

    if ctx.format.is_json() {
        print_json(&json!({
            "signedIn": true,
            "user": session.user,
            "expiresAt": expires_at,
        }))?;
        return Ok(());
    }

    let name = session
        .user
        .as_ref()
        .map_or(email, |user| user.name.as_str());
    Status::success(&format!("Signed in as {name}"));
    if let Some(expires_at) = expires_at {
        Status::field("Expires", &expires_at.to_rfc3339());
    }
    Ok(())
}

pub fn logout(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let had_token = client.get_auth_token().is_some();
    client.auth().logout();

    if ctx.format.is_json() {
        print_json(&json!({ "signedOut": had_token }))?;
    } else if had_token {
        Status::success("Signed out");
    } else {
        Status::info("No session to sign out of");
    }
    Ok(())
}

pub fn token(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let tokens = client.tokens();
    let state = tokens.state();
    let claims = tokens.claims();

    if ctx.format.is_json() {
        print_json(&json!({
            "state": state,
            "expiresAt": claims.as_ref().and_then(|c| c.expires_at()),
            "subject": claims.as_ref().and_then(|c| c.subject()),
        }))?;
        return Ok(());
    }

    match state {
        TokenState::Absent => Status::info("No token stored"),
        TokenState::PresentUnvalidated => {
            Status::warning("Stored token is malformed; it will be removed on the next request");
        }
        TokenState::PresentExpired => {
            Status::warning("Stored token has expired; run `vitaltrack login` again");
        }
        TokenState::PresentValid => Status::success("Token is valid"),
    }

    if let Some(claims) = claims {
        if let Some(subject) = claims.subject() {
            Status::field("Subject", &subject);
        }
        if let Some(expires_at) = claims.expires_at() {
            Status::field("Expires", &expires_at.to_rfc3339());
        }
    }
    Ok(())
}
