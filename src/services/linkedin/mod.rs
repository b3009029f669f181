// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! LinkedIn API client.
//!
//! Handles:
//! - OAuth authorization URL and code exchange
//! - Profile fetching (four sub-requests merged into one record)
//! - Posts and articles (not available without Marketing API access)

pub mod payload;

use crate::error::AppError;
use crate::models::{Post, Profile};
use payload::{
    normalize_profile, BasicProfile, EmailResponse, FullProfile, PictureResponse, ProfileParts,
};
use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;

/// Upper bound for any single LinkedIn request, including the body.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(20);

const EMAIL_PATH: &str = "/emailAddress?q=members&projection=(elements*(handle~))";
const PICTURE_PATH: &str = "/me?projection=(profilePicture(displayImage~:playableStreams))";
const FULL_PROFILE_PATH: &str = "/me?projection=(id,localizedFirstName,localizedLastName,headline,location,industry,summary,positions,educations,skills,websites)";

/// LinkedIn API client.
#[derive(Clone)]
pub struct LinkedInClient {
    http: reqwest::Client,
    api_base_url: String,
    oauth_base_url: String,
}

impl LinkedInClient {
    pub fn new(
        api_base_url: impl Into<String>,
        oauth_base_url: impl Into<String>,
    ) -> anyhow::Result<Self> {
        Self::with_timeout(api_base_url, oauth_base_url, DEFAULT_HTTP_TIMEOUT)
    }

    pub fn with_timeout(
        api_base_url: impl Into<String>,
        oauth_base_url: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed building LinkedIn HTTP client")?;

        Ok(Self {
            http,
            api_base_url: trim_base(api_base_url.into()),
            oauth_base_url: trim_base(oauth_base_url.into()),
        })
    }

    /// URL the user is redirected to in order to grant access.
    pub fn authorization_url(
        &self,
        client_id: &str,
        redirect_uri: &str,
        scopes: &[String],
        state: &str,
    ) -> String {
        format!(
            "{}/authorization?\
             response_type=code&\
             client_id={}&\
             redirect_uri={}&\
             scope={}&\
             state={}",
            self.oauth_base_url,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scopes.join(" ")),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AccessTokenResponse, AppError> {
        let response = self
            .http
            .post(format!("{}/accessToken", self.oauth_base_url))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .await
            .map_err(|e| AppError::LinkedInApi(format!("Token exchange failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "LinkedIn token exchange failed");
            return Err(AppError::LinkedInApi(format!(
                "Token exchange failed with status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::LinkedInApi(format!("Failed to parse token response: {}", e)))
    }

    /// Fetch and merge the member's profile.
    ///
    /// The four sub-requests run concurrently; if any of them fails the whole
    /// fetch fails, so a partial profile is never returned.
    pub async fn get_profile(&self, access_token: &str) -> Result<Profile, AppError> {
        let (basic, email, picture, full) = tokio::try_join!(
            self.get_json::<BasicProfile>("/me", access_token, "profile"),
            self.get_json::<EmailResponse>(EMAIL_PATH, access_token, "email"),
            self.get_json::<PictureResponse>(PICTURE_PATH, access_token, "profile picture"),
            self.get_json::<FullProfile>(FULL_PROFILE_PATH, access_token, "full profile"),
        )?;

        Ok(normalize_profile(ProfileParts {
            basic,
            email,
            picture,
            full,
        }))
    }

    /// Member posts.
    ///
    /// Not implemented: reading posts needs Marketing Developer Platform
    /// permissions this app is not assumed to have. Always empty.
    pub async fn get_posts(&self, _access_token: &str) -> Result<Vec<Post>, AppError> {
        tracing::debug!("Post retrieval not available with current API permissions");
        Ok(Vec::new())
    }

    /// Member articles. Not implemented for the same reason as [`get_posts`](Self::get_posts).
    pub async fn get_articles(&self, _access_token: &str) -> Result<Vec<Post>, AppError> {
        tracing::debug!("Article retrieval not available with current API permissions");
        Ok(Vec::new())
    }

    /// Authenticated GET returning JSON; any non-2xx status is an error.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        access_token: &str,
        what: &'static str,
    ) -> Result<T, AppError> {
        let url = format!("{}{}", self.api_base_url, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .header("X-Restli-Protocol-Version", "2.0.0")
            .send()
            .await
            .map_err(|e| AppError::LinkedInApi(format!("Failed to fetch {}: {}", what, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = %status,
                resource = what,
                body = %body,
                "LinkedIn request failed"
            );
            return Err(AppError::LinkedInApi(format!(
                "Failed to fetch {}: HTTP {}",
                what, status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::LinkedInApi(format!("Failed to parse {}: {}", what, e)))
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Token response from LinkedIn OAuth.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_encodes_parameters() {
        let client = LinkedInClient::new(
            "https://api.linkedin.com/v2/",
            "https://www.linkedin.com/oauth/v2",
        )
        .unwrap();
        let url = client.authorization_url(
            "my client",
            "http://localhost:8000/api/auth/callback",
            &["r_liteprofile".to_string(), "r_emailaddress".to_string()],
            "abc",
        );

        assert!(url.starts_with("https://www.linkedin.com/oauth/v2/authorization?response_type=code&"));
        assert!(url.contains("client_id=my%20client"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8000%2Fapi%2Fauth%2Fcallback"));
        assert!(url.contains("scope=r_liteprofile%20r_emailaddress"));
        assert!(url.ends_with("state=abc"));
    }

    #[tokio::test]
    async fn test_posts_and_articles_are_empty() {
        let client = LinkedInClient::new("http://127.0.0.1:9", "http://127.0.0.1:9").unwrap();
        assert!(client.get_posts("token").await.unwrap().is_empty());
        assert!(client.get_articles("token").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hung_upstream_times_out() {
        // Accepts connections but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client =
            LinkedInClient::with_timeout(&base, &base, Duration::from_millis(200)).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(10), client.get_profile("token"))
            .await
            .expect("request should give up on its own");

        assert!(matches!(result, Err(AppError::LinkedInApi(_))));
    }
}
