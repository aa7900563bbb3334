//! Instrument grouping, page ordering and PDF assembly

use super::filename::{is_page_image, page_number};
use crate::error::FetchError;
use crate::render::PdfRenderer;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One saved preview page, as reported after download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPage {
    pub instrument: String,
    pub path: PathBuf,
}

impl SavedPage {
    pub fn new(instrument: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            instrument: instrument.into(),
            path: path.into(),
        }
    }
}

/// A page within an instrument group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFile {
    /// `None` when the filename has no numeric suffix
    pub page_number: Option<u32>,
    pub path: PathBuf,
}

/// All pages of one instrument part
#[derive(Debug, Clone)]
pub struct InstrumentGroup {
    pub instrument_name: String,
    pub page_files: Vec<PageFile>,
}

impl InstrumentGroup {
    fn new(instrument_name: String) -> Self {
        Self {
            instrument_name,
            page_files: Vec::new(),
        }
    }

    fn push(&mut self, path: PathBuf) {
        let page_number = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(page_number);
        self.page_files.push(PageFile { page_number, path });
    }

    /// Sort pages by page number
    ///
    /// Unnumbered pages go last, ordered by path. Two pages with the same
    /// number are a `DuplicatePageNumber` error.
    pub fn sort_pages(&mut self) -> Result<(), FetchError> {
        self.page_files.sort_by(|a, b| {
            (a.page_number.is_none(), a.page_number, &a.path)
                .cmp(&(b.page_number.is_none(), b.page_number, &b.path))
        });

        for pair in self.page_files.windows(2) {
            if let (Some(first), Some(second)) = (pair[0].page_number, pair[1].page_number) {
                if first == second {
                    return Err(FetchError::DuplicatePageNumber {
                        instrument: self.instrument_name.clone(),
                        page: first,
                        first: pair[0].path.clone(),
                        second: pair[1].path.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.page_files.iter().map(|page| page.path.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.page_files.is_empty()
    }
}

/// Group pages by instrument, keeping first-seen instrument order
pub fn group_pages(pages: Vec<SavedPage>) -> Vec<InstrumentGroup> {
    let mut groups: Vec<InstrumentGroup> = Vec::new();

    for page in pages {
        match groups
            .iter_mut()
            .find(|group| group.instrument_name == page.instrument)
        {
            Some(group) => group.push(page.path),
            None => {
                let mut group = InstrumentGroup::new(page.instrument);
                group.push(page.path);
                groups.push(group);
            }
        }
    }

    groups
}

/// Collect saved pages below an arrangement directory
///
/// Expects the `<arrangement>/<instrument>/<page>.png` layout; the
/// instrument comes from the subdirectory name.
pub fn scan_saved_pages(arrangement_dir: &Path) -> Result<Vec<SavedPage>, FetchError> {
    let mut pages = Vec::new();

    for entry in WalkDir::new(arrangement_dir)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(arrangement_dir).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory loop"));
            FetchError::filesystem(path, source)
        })?;

        if !entry.file_type().is_file() || !is_page_image(entry.path()) {
            continue;
        }

        let instrument = entry
            .path()
            .parent()
            .and_then(|dir| dir.file_name())
            .map(|name| name.to_string_lossy().into_owned());

        if let Some(instrument) = instrument {
            pages.push(SavedPage::new(instrument, entry.path()));
        }
    }

    Ok(pages)
}

/// Where the PDF for an instrument goes: next to its image folder
pub fn pdf_path(arrangement_dir: &Path, instrument: &str) -> PathBuf {
    arrangement_dir.join(format!("{}.pdf", instrument))
}

/// Failure confined to one instrument group
#[derive(Debug)]
pub struct GroupFailure {
    pub instrument: String,
    pub error: anyhow::Error,
}

/// What one organizer pass did
#[derive(Debug, Default)]
pub struct OrganizeReport {
    /// PDFs written in this pass
    pub rendered: Vec<PathBuf>,

    /// PDFs that already existed and were left alone
    pub already_present: Vec<PathBuf>,

    pub failures: Vec<GroupFailure>,
}

impl OrganizeReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Turns saved pages into one PDF per instrument
pub struct InstrumentOrganizer<R: PdfRenderer> {
    renderer: R,
}

impl<R: PdfRenderer> InstrumentOrganizer<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Render a PDF for every non-empty instrument group
    ///
    /// An existing PDF is never rebuilt, so running this twice over the
    /// same download writes nothing the second time. A failing group does
    /// not stop the others.
    pub fn organize(&self, arrangement_dir: &Path, pages: Vec<SavedPage>) -> OrganizeReport {
        let mut report = OrganizeReport::default();

        for mut group in group_pages(pages) {
            if group.is_empty() {
                continue;
            }

            let output = pdf_path(arrangement_dir, &group.instrument_name);
            if output.exists() {
                log::debug!("PDF already present: {:?}", output);
                report.already_present.push(output);
                continue;
            }

            if let Err(e) = group.sort_pages() {
                log::error!("{}", e);
                report.failures.push(GroupFailure {
                    instrument: group.instrument_name,
                    error: e.into(),
                });
                continue;
            }

            log::info!(
                "Rendering {} page(s) for {} -> {:?}",
                group.page_files.len(),
                group.instrument_name,
                output
            );
            match self.renderer.render(&group.paths(), &output) {
                Ok(()) => report.rendered.push(output),
                Err(e) => {
                    log::error!("Failed to create PDF for {}: {:#}", group.instrument_name, e);
                    report.failures.push(GroupFailure {
                        instrument: group.instrument_name,
                        error: e,
                    });
                }
            }
        }

        report
    }
}
