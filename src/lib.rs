#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::doc_markdown,
    clippy::float_cmp,
    clippy::items_after_statements,
    clippy::manual_let_else,
    clippy::map_unwrap_or,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::return_self_not_must_use,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::struct_field_names,
    clippy::too_many_lines,
    clippy::uninlined_format_args,
    clippy::unnecessary_wraps,
    clippy::unused_self,
    clippy::cast_precision_loss
)]

//! CareConnect backend library.
//!
//! A thin HTTP gateway over a set of managed services: Bedrock model
//! inference and knowledge retrieval, SMS messaging, Zoom meetings, a
//! Firestore report store, and local report-PDF rendering. The one piece of
//! decision logic owned by this crate is [`routing`], which classifies a
//! prompt as a knowledge or general query before dispatch.

pub mod config;
pub mod gateway;
pub mod health;
pub mod meetings;
pub mod messaging;
pub mod providers;
pub mod render;
pub mod routing;
pub mod store;
pub mod vitals;

pub use config::Config;
