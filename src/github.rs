//! # Repository Directory Client
//!
//! Queries the hosting platform's REST API for repository metadata and fork
//! listings.
//!
//! ## Design
//!
//! The HTTP transport sits behind the [`RepoApi`] trait, so the caching and
//! pagination policy in [`DirectoryClient`] can be exercised against a fake in
//! tests. [`HttpRepoApi`] is the production transport, a blocking `reqwest`
//! client against the GitHub v3 API.
//!
//! ## Failure policy
//!
//! Listings feed an interactive picker, where partial data is still usable, so
//! [`DirectoryClient::list_forks`] never fails: a rate-limit signal or any other
//! page failure ends pagination and returns what has accumulated so far.
//! [`DirectoryClient::get_repo_info`] validates one concrete repository and
//! propagates failures to its caller.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::cache::{Clock, ListingCache, SystemClock};
use crate::defaults::{CACHE_TTL, FORKS_PER_PAGE};
use crate::error::{Error, Result};
use crate::repo_id::RepoId;

/// Metadata for one repository as reported by the directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    /// `owner/repo`
    pub full_name: String,
    pub description: String,
    pub star_count: u64,
    pub updated_at: DateTime<Utc>,
}

/// Repository payload returned by the REST API
#[derive(Debug, Deserialize)]
struct ApiRepository {
    full_name: String,
    description: Option<String>,
    stargazers_count: Option<u64>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<ApiRepository> for RepositoryDescriptor {
    fn from(repo: ApiRepository) -> Self {
        Self {
            full_name: repo.full_name,
            description: repo.description.unwrap_or_default(),
            star_count: repo.stargazers_count.unwrap_or(0),
            updated_at: repo.updated_at.unwrap_or_else(Utc::now),
        }
    }
}

/// Error payload returned by the REST API
#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

/// Transport for directory requests - allows faking in tests
pub trait RepoApi: Send + Sync {
    /// Fetch metadata for a single repository.
    fn get_repo(&self, repo: &RepoId) -> Result<RepositoryDescriptor>;

    /// Fetch one page of a repository's forks. Pages are numbered from 1.
    fn list_forks_page(
        &self,
        repo: &RepoId,
        per_page: usize,
        page: usize,
    ) -> Result<Vec<RepositoryDescriptor>>;
}

/// Whether an HTTP status and message are the platform's rate-limit signal.
pub fn is_rate_limit_response(status: u16, message: &str) -> bool {
    (status == 403 && message.contains("API rate limit exceeded")) || status == 429
}

/// [`RepoApi`] over HTTP using a blocking `reqwest` client.
pub struct HttpRepoApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRepoApi {
    /// Creates a transport rooted at `base_url` (e.g. `https://api.github.com`).
    ///
    /// When `token` is set, requests are authenticated with it, which raises
    /// the platform's rate limit.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("cursor-rules-deploy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network {
                url: base_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let network = |e: reqwest::Error| Error::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(network)?;
        let status = response.status();
        if status.is_success() {
            return response.json::<T>().map_err(network);
        }

        let body = response.text().unwrap_or_default();
        let message = serde_json::from_str::<ApiMessage>(&body)
            .map(|m| m.message)
            .unwrap_or(body);

        if is_rate_limit_response(status.as_u16(), &message) {
            Err(Error::RateLimited {
                url: url.to_string(),
            })
        } else {
            Err(Error::Api {
                url: url.to_string(),
                status: status.as_u16(),
                message,
            })
        }
    }
}

impl RepoApi for HttpRepoApi {
    fn get_repo(&self, repo: &RepoId) -> Result<RepositoryDescriptor> {
        let url = format!("{}/repos/{}/{}", self.base_url, repo.owner, repo.name);
        let payload: ApiRepository = self.get_json(&url)?;
        Ok(payload.into())
    }

    fn list_forks_page(
        &self,
        repo: &RepoId,
        per_page: usize,
        page: usize,
    ) -> Result<Vec<RepositoryDescriptor>> {
        let url = format!(
            "{}/repos/{}/{}/forks?per_page={}&page={}",
            self.base_url, repo.owner, repo.name, per_page, page
        );
        let payload: Vec<ApiRepository> = self.get_json(&url)?;
        Ok(payload.into_iter().map(Into::into).collect())
    }
}

/// Case-insensitive substring filter over name and description.
pub fn filter_descriptors(
    descriptors: &[RepositoryDescriptor],
    term: &str,
) -> Vec<RepositoryDescriptor> {
    let needle = term.to_lowercase();
    descriptors
        .iter()
        .filter(|d| {
            d.full_name.to_lowercase().contains(&needle)
                || d.description.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Cached, paginating client over a [`RepoApi`]
///
/// One client is constructed per run and shared by every discovery call, so
/// all of them see the same cache.
pub struct DirectoryClient {
    api: Box<dyn RepoApi>,
    cache: ListingCache,
    per_page: usize,
}

impl DirectoryClient {
    /// Creates a client with the default TTL and the system clock.
    pub fn new(api: Box<dyn RepoApi>) -> Self {
        Self::with_clock(api, Arc::new(SystemClock))
    }

    /// Creates a client whose cache reads time from `clock`.
    pub fn with_clock(api: Box<dyn RepoApi>, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            cache: ListingCache::new(CACHE_TTL, clock),
            per_page: FORKS_PER_PAGE,
        }
    }

    /// The listing cache backing this client.
    pub fn cache(&self) -> &ListingCache {
        &self.cache
    }

    /// Lists every fork of `repo`, served from cache while fresh.
    ///
    /// Pages are requested until one comes back shorter than the page size.
    /// A failed page ends the listing early. The forks gathered before it are
    /// returned and kept as a partial entry for searching, but the next call
    /// to this method fetches again.
    pub fn list_forks(&self, repo: &RepoId) -> Vec<RepositoryDescriptor> {
        let key = repo.full_name();
        match self.cache.get_fresh(&key) {
            Ok(Some(forks)) => {
                debug!("Using cached fork data for {}", key);
                return forks;
            }
            Ok(None) => {}
            Err(e) => debug!("Ignoring unreadable fork cache: {}", e),
        }

        debug!("Fetching forks of {} from the repository directory", key);
        let mut forks = Vec::new();
        let mut page = 1;
        let complete = loop {
            match self.api.list_forks_page(repo, self.per_page, page) {
                Ok(batch) => {
                    let full_page = batch.len() == self.per_page;
                    forks.extend(batch);
                    if !full_page {
                        break true;
                    }
                    page += 1;
                }
                Err(e) if e.is_rate_limit() => {
                    warn!(
                        "GitHub API rate limit exceeded, showing {} forks fetched so far",
                        forks.len()
                    );
                    break false;
                }
                Err(e) => {
                    error!("Failed to fetch forks page {}: {}", page, e);
                    break false;
                }
            }
        };

        let stored = if complete {
            self.cache.insert(&key, forks.clone())
        } else if !forks.is_empty() {
            self.cache.insert_partial(&key, forks.clone())
        } else {
            Ok(())
        };
        if let Err(e) = stored {
            debug!("Could not cache fork listing for {}: {}", key, e);
        }
        forks
    }

    /// Forks of `repo` whose name or description contains `term`.
    ///
    /// Searches whatever listing this TTL window already produced, a partial
    /// one included, and only fetches when there is none.
    pub fn search_forks(&self, repo: &RepoId, term: &str) -> Vec<RepositoryDescriptor> {
        let forks = match self.cache.get_usable(&repo.full_name()) {
            Ok(Some(forks)) => forks,
            _ => self.list_forks(repo),
        };
        filter_descriptors(&forks, term)
    }

    /// Metadata for `repo`. Not cached; failures propagate.
    pub fn get_repo_info(&self, repo: &RepoId) -> Result<RepositoryDescriptor> {
        self.api.get_repo(repo)
    }
}
