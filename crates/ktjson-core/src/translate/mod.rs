//! Translation of collected units: batching and the provider-driving
//! [`Translator`]
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

pub mod batch;
pub mod translator;

pub use batch::{estimated_size, plan_batches, split_response, Batch, BATCH_SEPARATOR};
pub use translator::{TranslationMode, TranslationOutcome, TranslationProgress, Translator};
