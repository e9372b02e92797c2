use thiserror::Error;

use crate::template::SchemaVersion;

/// Conditions that abort a run outright. Everything else is recorded in
/// the [`ErrorSummary`](crate::ErrorSummary) and scanning continues.
#[derive(Error, Debug)]
pub enum ParseError {
    /// A jam-number cell held something other than an integer, `SP`, or
    /// `SP*`. No safe jam index can be derived past this point.
    #[error("invalid jam number in {sheet}!{cell}: {token:?}")]
    InvalidJamNumber {
        sheet: String,
        cell: String,
        token: String,
    },

    /// A star-pass line with no jam above it to attach to.
    #[error("SP or SP* cannot appear on the first line of a block ({sheet}!{cell})")]
    StarPassOnFirstRow { sheet: String, cell: String },

    /// The document declares a statsbook year no template exists for.
    #[error("unrecognized statsbook version {version:?}")]
    UnknownVersion { version: String },

    /// The embedded coordinate template for this version failed to
    /// resolve. No reader may proceed with a partial template.
    #[error("template for the {version} statsbook failed to load: {source}")]
    Template {
        version: SchemaVersion,
        source: serde_json::Error,
    },
}
