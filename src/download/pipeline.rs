//! Main download pipeline orchestration
//!
//! validate -> resolve paths -> detect conflicts -> resolve conflicts ->
//! download -> organize -> summarize, one target at a time in input order.

use super::config::RunConfig;
use crate::console;
use crate::error::FetchError;
use crate::input::{parse_song_url, ListEntries};
use crate::model::{
    ConflictAction, ConflictDecision, DownloadTarget, Outcome, RunSummary, SongReference,
};
use crate::organize::{scan_saved_pages, InstrumentOrganizer};
use crate::render::PdfRenderer;
use crate::resolve::{
    apply_decision, build_targets, detect_conflicts, resolve_batch, resolve_single,
    DecisionProvider, RenamingAllocator, Resolution,
};
use crate::source::PageSource;
use anyhow::{bail, Context, Result};
use std::fs;

/// Invalid list entries listed before the rest are summarized
const MAX_LISTED_INVALID: usize = 10;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every target was processed (skips and errors included)
    Completed,

    /// The user chose Quit at a conflict prompt
    Aborted,

    /// No input survived validation
    Rejected,
}

/// What to do with a target once all conflicts are decided
#[derive(Debug)]
enum Plan {
    Download(Outcome),
    Skip,
    Fail(FetchError),
}

/// Main download pipeline
pub struct DownloadPipeline<S: PageSource, R: PdfRenderer, P: DecisionProvider> {
    config: RunConfig,
    source: S,
    organizer: InstrumentOrganizer<R>,
    decisions: P,
    allocator: RenamingAllocator,
}

impl<S: PageSource, R: PdfRenderer, P: DecisionProvider> DownloadPipeline<S, R, P> {
    /// Create a new download pipeline
    pub fn new(config: RunConfig, source: S, renderer: R, decisions: P) -> Self {
        Self {
            config,
            source,
            organizer: InstrumentOrganizer::new(renderer),
            decisions,
            allocator: RenamingAllocator::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn decisions(&self) -> &P {
        &self.decisions
    }

    pub fn renderer(&self) -> &R {
        self.organizer.renderer()
    }

    /// Process one URL given on the command line (single-target mode)
    pub fn run_single(&mut self, raw_url: &str, summary: &mut RunSummary) -> Result<RunStatus> {
        let reference = match parse_song_url(raw_url).and_then(|reference| self.verify(reference)) {
            Ok(reference) => reference,
            Err(e) => {
                console::error(&e.to_string());
                return Ok(RunStatus::Rejected);
            }
        };

        self.ensure_output_root()?;

        let mut targets = build_targets(vec![reference], &self.config.output_root);
        self.allocator.reserve(&targets);
        detect_conflicts(&mut targets);

        let mut plans = Vec::with_capacity(1);
        for target in targets {
            if !target.is_conflicted() {
                plans.push((target, Plan::Download(Outcome::New)));
                continue;
            }

            match resolve_single(target, &mut self.decisions) {
                Resolution::Quit => {
                    console::warning("Operation cancelled.");
                    return Ok(RunStatus::Aborted);
                }
                Resolution::Decided(decisions) => {
                    for mut decision in decisions {
                        let plan = self.plan_decision(&mut decision);
                        plans.push((decision.target, plan));
                    }
                }
            }
        }

        self.execute(plans, summary);
        Ok(RunStatus::Completed)
    }

    /// Process a parsed list file (batch mode)
    ///
    /// Rejected entries count as skipped. All conflicts are collected before
    /// the first prompt so the two selection passes see the full set.
    pub fn run_batch(&mut self, entries: ListEntries, summary: &mut RunSummary) -> Result<RunStatus> {
        let mut invalid: Vec<String> = entries
            .rejected
            .iter()
            .map(|entry| entry.text.clone())
            .collect();

        let mut references = Vec::new();
        for reference in entries.references {
            match self.verify(reference) {
                Ok(reference) => references.push(reference),
                Err(e) => {
                    log::warn!("{}", e);
                    invalid.push(url_of(&e));
                }
            }
        }

        if !invalid.is_empty() {
            console::warning("Some entries are not valid PraiseCharts song URLs and will be skipped:");
            for bad in invalid.iter().take(MAX_LISTED_INVALID) {
                console::item('-', bad);
            }
            if invalid.len() > MAX_LISTED_INVALID {
                console::info(&format!("... and {} more", invalid.len() - MAX_LISTED_INVALID));
            }
            summary.record_skipped(invalid.len());
        }

        if references.is_empty() {
            console::warning("No valid URLs to process.");
            return Ok(if invalid.is_empty() {
                RunStatus::Completed
            } else {
                RunStatus::Rejected
            });
        }

        self.ensure_output_root()?;

        let mut targets = build_targets(references, &self.config.output_root);
        self.allocator.reserve(&targets);
        detect_conflicts(&mut targets);

        let conflicts: Vec<DownloadTarget> = targets
            .iter()
            .filter(|target| target.is_conflicted())
            .cloned()
            .collect();

        let mut decided = Vec::new();
        if !conflicts.is_empty() {
            console::header("Conflict Resolution");
            match resolve_batch(conflicts, &mut self.decisions) {
                Resolution::Quit => {
                    console::warning("Operation cancelled.");
                    return Ok(RunStatus::Aborted);
                }
                Resolution::Decided(decisions) => decided = decisions,
            }
        }

        // Numbering happens in conflict order so allocations are reproducible
        let mut decided_plans = Vec::with_capacity(decided.len());
        for mut decision in decided {
            let plan = self.plan_decision(&mut decision);
            decided_plans.push((decision.target, plan));
        }

        let mut decided_plans = decided_plans.into_iter();
        let plans: Vec<(DownloadTarget, Plan)> = targets
            .into_iter()
            .map(|target| {
                if target.is_conflicted() {
                    decided_plans
                        .next()
                        .unwrap_or((target, Plan::Skip))
                } else {
                    (target, Plan::Download(Outcome::New))
                }
            })
            .collect();

        self.execute(plans, summary);
        Ok(RunStatus::Completed)
    }

    /// Reject references whose page no longer exists
    fn verify(&self, reference: SongReference) -> Result<SongReference, FetchError> {
        if self.source.leads_to_site_root(&reference) {
            return Err(FetchError::invalid_song_url(
                reference.source_url(),
                "redirects to the domain root",
            ));
        }
        Ok(reference)
    }

    fn ensure_output_root(&self) -> Result<()> {
        let root = &self.config.output_root;
        fs::create_dir_all(root)
            .with_context(|| format!("Output directory {:?} cannot be created", root))?;

        let metadata = fs::metadata(root)
            .with_context(|| format!("Output directory {:?} is not accessible", root))?;
        if !metadata.is_dir() {
            bail!("Output path {:?} is not a directory", root);
        }
        if metadata.permissions().readonly() {
            bail!("Output directory {:?} is not writable", root);
        }
        Ok(())
    }

    fn plan_decision(&mut self, decision: &mut ConflictDecision) -> Plan {
        if let Err(e) = apply_decision(decision, &mut self.allocator) {
            return Plan::Fail(e);
        }

        match decision.action {
            ConflictAction::Overwrite => Plan::Download(Outcome::Overwritten),
            ConflictAction::Number => Plan::Download(Outcome::Renamed),
            ConflictAction::Skip | ConflictAction::Quit => Plan::Skip,
        }
    }

    fn execute(&mut self, plans: Vec<(DownloadTarget, Plan)>, summary: &mut RunSummary) {
        let queued = plans
            .iter()
            .filter(|(_, plan)| matches!(plan, Plan::Download(_)))
            .count();

        console::header("Processing Queue");
        let mut position = 0;

        for (target, plan) in plans {
            match plan {
                Plan::Skip => {
                    console::info(&format!("Skipping {}", target.base_path().display()));
                    summary.record(Outcome::Skipped);
                }
                Plan::Fail(e) => {
                    console::error(&e.to_string());
                    summary.record(Outcome::Error);
                }
                Plan::Download(outcome) => {
                    position += 1;
                    console::info(&format!(
                        "[{}/{}] Queued: {} -> {}",
                        position,
                        queued,
                        target.reference().song_slug(),
                        target.resolved_path().display()
                    ));

                    match self.process_target(&target, outcome) {
                        Ok(group_failures) => {
                            summary.record(outcome);
                            for _ in 0..group_failures {
                                summary.record_error();
                            }
                        }
                        Err(e) => {
                            console::error(&format!("Failed to process {}: {}", target.reference().source_url(), e));
                            summary.record(Outcome::Error);
                        }
                    }
                }
            }
        }
    }

    /// Download one target and build its PDFs
    ///
    /// Returns the number of instrument groups that failed to render.
    fn process_target(&self, target: &DownloadTarget, outcome: Outcome) -> Result<usize, FetchError> {
        let destination = target.resolved_path();

        if outcome == Outcome::Overwritten && destination.exists() {
            console::warning(&format!("Overwriting directory: {}", destination.display()));
            fs::remove_dir_all(destination)
                .map_err(|e| FetchError::filesystem(destination, e))?;
        }
        fs::create_dir_all(destination).map_err(|e| FetchError::filesystem(destination, e))?;

        let pages = self.source.discover_pages(target.reference())?;

        let mut saved = 0;
        for page in &pages {
            let path = destination.join(&page.instrument).join(&page.file_name);
            match self.source.fetch(page, &path) {
                Ok(()) => saved += 1,
                Err(e) => console::error(&e.to_string()),
            }
        }
        log::info!("{}: saved {}/{} page(s)", target.reference(), saved, pages.len());

        if saved == 0 {
            return Err(FetchError::download(
                target.reference().to_string(),
                "none of the preview pages could be downloaded",
            ));
        }

        console::header(&format!("Creating PDFs for {}", destination.display()));
        let report = self.organizer.organize(destination, scan_saved_pages(destination)?);
        for path in &report.rendered {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            console::success(&format!("Created {}", name));
        }
        for failure in &report.failures {
            console::error(&format!("Failed to create PDF for {}: {:#}", failure.instrument, failure.error));
        }

        Ok(report.failures.len())
    }
}

fn url_of(error: &FetchError) -> String {
    match error {
        FetchError::InvalidSongUrl { url, .. } => url.clone(),
        other => other.to_string(),
    }
}
