//! Document pipeline
//!
//! `Loaded -> Validated -> Transformed -> ReValidated -> Written`, with every
//! document ending in a [`DocumentStatus`] and every batch in a
//! [`BatchReport`].
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

pub mod document;
pub mod interrupt;
pub mod report;
pub mod shape;
pub mod stage;
pub mod writer;

pub use document::{
    relative_name, DocumentJob, DocumentPipeline, PipelineObserver, PipelineOptions, Silent,
};
pub use interrupt::Interrupt;
pub use report::{BatchReport, BatchSummary, DocumentReport, DocumentStatus};
pub use shape::ShapeExpectation;
pub use stage::Stage;
pub use writer::{
    backup_path, partial_path, revalidate, to_pretty_json, write_atomic, write_backup,
    BACKUP_SUFFIX, PARTIAL_SUFFIX,
};
