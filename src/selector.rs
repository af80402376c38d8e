//! # Repository Selector
//!
//! Resolves which repository the template is fetched from. The canonical
//! repository is combined with its forks into one candidate list, which an
//! interactive [`SelectionPrompt`] narrows down by search term.
//!
//! Discovery is a convenience: any failure along the way (directory lookup,
//! prompt failure or cancellation, an unparsable choice) falls back to the
//! canonical repository with a warning.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::github::{DirectoryClient, RepositoryDescriptor};
use crate::repo_id::RepoId;

/// One entry of the selection list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCandidate {
    /// Text shown to the user
    pub label: String,
    /// `owner/repo` returned when chosen
    pub value: String,
    pub description: String,
}

impl RepoCandidate {
    pub fn canonical(descriptor: &RepositoryDescriptor) -> Self {
        Self {
            label: format!(
                "{} (Original) (⭐ {})",
                descriptor.full_name, descriptor.star_count
            ),
            value: descriptor.full_name.clone(),
            description: descriptor.description.clone(),
        }
    }

    pub fn fork(descriptor: &RepositoryDescriptor) -> Self {
        Self {
            label: format!("{} (⭐ {})", descriptor.full_name, descriptor.star_count),
            value: descriptor.full_name.clone(),
            description: descriptor.description.clone(),
        }
    }
}

/// Candidate list with the canonical entry first, followed by `forks` in order.
pub fn build_candidates(
    canonical: &RepoCandidate,
    forks: &[RepositoryDescriptor],
) -> Vec<RepoCandidate> {
    std::iter::once(canonical.clone())
        .chain(forks.iter().map(RepoCandidate::fork))
        .collect()
}

/// Interactive layer that picks one candidate.
///
/// `initial` is the unfiltered list. `query` maps a search term to the
/// candidates to show for it and may be called any number of times.
pub trait SelectionPrompt {
    fn select(
        &self,
        initial: &[RepoCandidate],
        query: &dyn Fn(&str) -> Vec<RepoCandidate>,
    ) -> Result<String>;
}

const SEARCH_ENTRY: &str = "🔍 Search forks...";

/// [`SelectionPrompt`] on the terminal, built on `dialoguer`.
pub struct TerminalPrompt {
    theme: ColorfulTheme,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionPrompt for TerminalPrompt {
    fn select(
        &self,
        initial: &[RepoCandidate],
        query: &dyn Fn(&str) -> Vec<RepoCandidate>,
    ) -> Result<String> {
        let mut candidates = initial.to_vec();
        loop {
            let mut items: Vec<&str> = candidates.iter().map(|c| c.label.as_str()).collect();
            items.push(SEARCH_ENTRY);

            let chosen = Select::with_theme(&self.theme)
                .with_prompt("Select a repository to clone from")
                .items(&items)
                .default(0)
                .interact_opt()?;

            match chosen {
                Some(index) if index < candidates.len() => {
                    return Ok(candidates[index].value.clone());
                }
                Some(_) => {
                    let term: String = Input::with_theme(&self.theme)
                        .with_prompt("Filter by name or description (empty shows all)")
                        .allow_empty(true)
                        .interact_text()?;
                    candidates = query(term.trim());
                }
                None => {
                    return Err(Error::Prompt {
                        message: "selection cancelled".to_string(),
                    })
                }
            }
        }
    }
}

/// Resolves the source repository for one run.
pub struct RepositorySelector<'a> {
    client: &'a DirectoryClient,
    prompt: &'a dyn SelectionPrompt,
    canonical: RepoId,
    show_progress: bool,
}

impl<'a> RepositorySelector<'a> {
    pub fn new(
        client: &'a DirectoryClient,
        prompt: &'a dyn SelectionPrompt,
        canonical: RepoId,
    ) -> Self {
        Self {
            client,
            prompt,
            canonical,
            show_progress: false,
        }
    }

    /// Show a spinner on stderr while discovery runs.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// The repository to fetch. Never fails; see the module docs.
    pub fn select_source_repo(&self) -> RepoId {
        match self.try_select() {
            Ok(repo) => repo,
            Err(e) => {
                warn!("Failed to fetch repositories, using default repository");
                debug!("Error details: {}", e);
                self.canonical.clone()
            }
        }
    }

    /// Fetches the canonical repository and its forks concurrently.
    pub fn discover(&self) -> Result<(RepoCandidate, Vec<RepositoryDescriptor>)> {
        let spinner = self.spinner("Fetching available repositories");
        let (client, canonical) = (self.client, &self.canonical);
        let (info, forks) = rayon::join(
            || client.get_repo_info(canonical),
            || client.list_forks(canonical),
        );
        spinner.finish_and_clear();

        Ok((RepoCandidate::canonical(&info?), forks))
    }

    fn try_select(&self) -> Result<RepoId> {
        let (canonical, forks) = self.discover()?;
        let initial = build_candidates(&canonical, &forks);

        let query = |term: &str| -> Vec<RepoCandidate> {
            if term.is_empty() {
                return initial.clone();
            }
            build_candidates(&canonical, &self.client.search_forks(&self.canonical, term))
        };

        let chosen = self.prompt.select(&initial, &query)?;
        chosen.parse()
    }

    fn spinner(&self, message: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }
}
