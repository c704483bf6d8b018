//! Best-effort mirroring of the local inventory ledger into a Google
//! Sheets spreadsheet: one master snapshot sheet (`Master_Items`) plus one
//! append-only history sheet per item code (`{code}_Stock`).
//!
//! The remote store has no transactions, no unique-row lookup and no schema
//! enforcement, so everything here is built from three primitives: listing
//! sheet metadata, overwriting a cell range, and appending after the last
//! populated row. Rows are located by linearly scanning column A.

pub mod config;
pub mod error;
pub mod gateway;
pub mod history;
pub mod master;
pub mod memory;
pub mod mirror;
pub mod provision;
pub mod token;

pub use config::SheetsConfig;
pub use error::{SheetsError, SheetsResult};
pub use gateway::{
    HttpSheetsApi, Row, SheetProperties, SheetsApi, SheetsGateway, SpreadsheetMeta,
};
pub use memory::InMemorySheets;
pub use mirror::SheetsMirror;
pub use token::{OAuthTokenProvider, StaticTokenProvider, TokenProvider};
