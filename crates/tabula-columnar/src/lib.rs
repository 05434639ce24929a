//! Immutable in-memory columnar frames.
//!
//! This crate focuses on:
//! - Kind-tagged column storage (`Bool`/`Int32`/`Float64`/`Text`/`Date`/`Mixed`) with validity bitmaps.
//! - A single selection kernel ([`Frame::select_rows`]) that every filter, indexer and sampler
//!   reduces to, so filtering never degrades a packed column into a boxed one.
//! - Positional (`iloc`/`at`) and label (`loc`) indexing, `head`/`tail`.
//! - Uniform and stratified sampling with reproducible seeds.
//! - Group-by partitioning with built-in and caller-supplied aggregators.
//!
//! Every operation takes `&Frame` and returns a new owned [`Frame`]; frames are `Send + Sync`
//! and can be shared freely between readers.

#![forbid(unsafe_code)]

mod bitmap;
mod column;
mod error;
mod frame;
mod group;
mod index;
mod row;
mod sample;
mod select;
mod types;

pub use crate::bitmap::BitVec;
pub use crate::column::Column;
pub use crate::error::{FrameError, FrameResult};
pub use crate::frame::Frame;
pub use crate::group::{AggSpec, Aggregator, GroupBy, Record};
pub use crate::index::{LocCols, LocRows, PosSelector, Selection};
pub use crate::row::{Row, Rows, Schema};
pub use crate::sample::{SampleOptions, SampleSize, StratifiedOptions};
pub use crate::select::WhereOp;
pub use crate::types::{compare_values, ColumnKind, Value};
