//! Core library for extracting layout annotations from spreadsheets.
//!
//! Sheets are read by the IO adapters under [`tabula::layout::io`], run
//! through the analysis stages by the orchestrator in
//! [`tabula::layout::pipeline`], and turned into YAML annotations by
//! [`tabula::layout::annotate`]. The per-file batch loop lives in
//! [`tabula::layout::driver`]; stage implementations are plugged in through
//! the traits in [`tabula::layout::stages`] and named in configuration via
//! [`tabula::layout::registry`].

pub mod tabula;

pub use tabula::layout::{
    LayoutError, Result, annotate, config, driver, error, io, model, pipeline, registry, stages,
    telemetry,
};
