use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::PublicProfile;
use crate::services::cache::{CacheKey, CacheManager};

/// Errors that can occur when talking to the user directory
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// The external user directory: profile reads plus the per-user match and
/// exclusion sets the engines maintain as side effects.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve a user's public profile. `None` when the user is unknown.
    async fn find_profile(&self, user_id: &str) -> Result<Option<PublicProfile>, DirectoryError>;

    /// Add `other_id` to `user_id`'s exclusion set. Idempotent.
    async fn add_exclusion(&self, user_id: &str, other_id: &str) -> Result<(), DirectoryError>;

    /// Add `other_id` to `user_id`'s matches list. Idempotent.
    async fn add_match(&self, user_id: &str, other_id: &str) -> Result<(), DirectoryError>;

    /// Whether `other_id` is in `user_id`'s exclusion set.
    async fn is_excluded(&self, user_id: &str, other_id: &str) -> Result<bool, DirectoryError>;
}

/// HTTP client for the main backend's internal user API.
///
/// Profile reads go through the two-tier cache when one is configured;
/// exclusion and match writes always hit the backend directly.
pub struct HttpUserDirectory {
    base_url: String,
    api_key: String,
    client: Client,
    cache: Option<Arc<CacheManager>>,
}

impl HttpUserDirectory {
    pub fn new(base_url: String, api_key: String, cache: Option<Arc<CacheManager>>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
            cache,
        }
    }

    fn user_url(&self, user_id: &str, suffix: &str) -> String {
        format!(
            "{}/internal/users/{}{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(user_id),
            suffix
        )
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn find_profile(&self, user_id: &str) -> Result<Option<PublicProfile>, DirectoryError> {
        let cache_key = CacheKey::profile(user_id);
        if let Some(cache) = &self.cache {
            if let Ok(profile) = cache.get::<PublicProfile>(&cache_key).await {
                return Ok(Some(profile));
            }
        }

        let url = self.user_url(user_id, "/profile");
        tracing::debug!("Fetching profile for user: {}", user_id);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(DirectoryError::ApiError(format!(
                "Failed to fetch profile: {}",
                response.status()
            )));
        }

        let profile: PublicProfile = response
            .json()
            .await
            .map_err(|e| DirectoryError::InvalidResponse(format!("Failed to parse profile: {}", e)))?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&cache_key, &profile).await {
                tracing::warn!("Failed to cache profile {}: {}", user_id, e);
            }
        }

        Ok(Some(profile))
    }

    async fn add_exclusion(&self, user_id: &str, other_id: &str) -> Result<(), DirectoryError> {
        let url = self.user_url(user_id, "/exclusions");

        let response = self
            .client
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .json(&serde_json::json!({ "otherUserId": other_id }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DirectoryError::ApiError(format!(
                "Failed to add exclusion: {}",
                response.status()
            )));
        }

        tracing::debug!("Added exclusion: {} -> {}", user_id, other_id);
        Ok(())
    }

    async fn add_match(&self, user_id: &str, other_id: &str) -> Result<(), DirectoryError> {
        let url = self.user_url(user_id, "/matches");

        let response = self
            .client
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .json(&serde_json::json!({ "otherUserId": other_id }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DirectoryError::ApiError(format!(
                "Failed to add match: {}",
                response.status()
            )));
        }

        tracing::debug!("Added match: {} -> {}", user_id, other_id);
        Ok(())
    }

    async fn is_excluded(&self, user_id: &str, other_id: &str) -> Result<bool, DirectoryError> {
        let url = self.user_url(
            user_id,
            &format!("/exclusions/{}", urlencoding::encode(other_id)),
        );

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DirectoryError::ApiError(format!(
                "Failed to check exclusion: {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response.json().await?;
        json.get("excluded")
            .and_then(|v| v.as_bool())
            .ok_or_else(|| DirectoryError::InvalidResponse("Missing excluded flag".into()))
    }
}

#[derive(Debug, Default)]
struct MemoryUserRecord {
    profile: PublicProfile,
    exclusions: HashSet<String>,
    matches: HashSet<String>,
}

/// In-memory directory for tests and embedded deployments.
#[derive(Default)]
pub struct MemoryUserDirectory {
    users: Mutex<HashMap<String, MemoryUserRecord>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_profile(&self, profile: PublicProfile) {
        let mut users = self.users.lock().await;
        users.insert(
            profile.user_id.clone(),
            MemoryUserRecord {
                profile,
                ..Default::default()
            },
        );
    }

    pub async fn matches_of(&self, user_id: &str) -> HashSet<String> {
        self.users
            .lock()
            .await
            .get(user_id)
            .map(|u| u.matches.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_profile(&self, user_id: &str) -> Result<Option<PublicProfile>, DirectoryError> {
        Ok(self
            .users
            .lock()
            .await
            .get(user_id)
            .map(|u| u.profile.clone()))
    }

    async fn add_exclusion(&self, user_id: &str, other_id: &str) -> Result<(), DirectoryError> {
        let mut users = self.users.lock().await;
        let record = users
            .get_mut(user_id)
            .ok_or_else(|| DirectoryError::ApiError(format!("unknown user {}", user_id)))?;
        record.exclusions.insert(other_id.to_string());
        Ok(())
    }

    async fn add_match(&self, user_id: &str, other_id: &str) -> Result<(), DirectoryError> {
        let mut users = self.users.lock().await;
        let record = users
            .get_mut(user_id)
            .ok_or_else(|| DirectoryError::ApiError(format!("unknown user {}", user_id)))?;
        record.matches.insert(other_id.to_string());
        Ok(())
    }

    async fn is_excluded(&self, user_id: &str, other_id: &str) -> Result<bool, DirectoryError> {
        Ok(self
            .users
            .lock()
            .await
            .get(user_id)
            .map(|u| u.exclusions.contains(other_id))
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str) -> PublicProfile {
        PublicProfile {
            user_id: id.to_string(),
            name: format!("User {}", id),
            age: 27,
            is_verified: true,
            image_file_ids: vec!["img_1".to_string()],
            description: None,
        }
    }

    #[tokio::test]
    async fn test_http_find_profile_parses_response() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "userId": "42",
            "name": "User 42",
            "age": 27,
            "isVerified": true,
            "imageFileIds": ["img_1"],
        });
        let mock = server
            .mock("GET", "/internal/users/42/profile")
            .match_header("x-api-key", "test_key")
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let directory = HttpUserDirectory::new(server.url(), "test_key".to_string(), None);
        let fetched = directory.find_profile("42").await.unwrap().unwrap();

        assert_eq!(fetched.user_id, "42");
        assert_eq!(fetched.age, 27);
        assert!(fetched.is_verified);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_find_profile_unknown_user_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/internal/users/ghost/profile")
            .with_status(404)
            .create_async()
            .await;

        let directory = HttpUserDirectory::new(server.url(), "test_key".to_string(), None);
        assert!(directory.find_profile("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_http_add_exclusion_posts_other_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/internal/users/1/exclusions")
            .match_body(mockito::Matcher::Json(
                serde_json::json!({ "otherUserId": "2" }),
            ))
            .with_status(204)
            .create_async()
            .await;

        let directory = HttpUserDirectory::new(server.url(), "test_key".to_string(), None);
        directory.add_exclusion("1", "2").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_memory_directory_round_trip() {
        let directory = MemoryUserDirectory::new();
        directory.insert_profile(profile("1")).await;

        assert!(directory.find_profile("1").await.unwrap().is_some());
        assert!(directory.find_profile("2").await.unwrap().is_none());

        directory.add_exclusion("1", "2").await.unwrap();
        assert!(directory.is_excluded("1", "2").await.unwrap());
        assert!(!directory.is_excluded("2", "1").await.unwrap());
    }
}
