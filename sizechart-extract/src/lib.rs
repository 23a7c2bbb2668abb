//! # Size Chart Extraction Client
//!
//! Talks to the OCR/vision service and turns its answers into
//! [`sizechart_core::ExtractionResult`]s.
//!
//! ## Flow
//!
//! ```text
//! ImagePayload ──▶ /ocr/understand (AI, 30s) ──ok──▶ parse JSON / text
//!                        │ fail
//!                        ▼
//!                  /ocr/extract (basic OCR, once) ──▶ parse OCR text
//! ```
//!
//! Failures surface as [`ExtractError`] inside this crate and as the core
//! [`sizechart_core::ExtractionError`] at the [`sizechart_core::Extractor`]
//! boundary.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod parse;

pub use client::{build_extractor, BasicOcrExtractor, OcrClient, UnderstandExtractor};
pub use config::{ExtractorConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{ExtractError, ExtractResult};
pub use parse::{placeholder_result, ChartTextParser};
