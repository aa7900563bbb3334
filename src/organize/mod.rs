//! Post-download organization
//!
//! Groups saved preview pages by instrument, orders them by the page number
//! in their filename and assembles one PDF per instrument.

pub mod filename;
mod organizer;

pub use organizer::{
    group_pages, pdf_path, scan_saved_pages, GroupFailure, InstrumentGroup, InstrumentOrganizer,
    OrganizeReport, PageFile, SavedPage,
};
