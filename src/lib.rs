//! JSON file backed storage for per-user expense records.
//!
//! Every operation re-reads the whole backing file, applies one change in
//! memory and writes the whole file back.
#[macro_use]
extern crate log;

mod features;

pub use features::{
    BackingFile, Expense, ExpenseId, ExpenseStore, ExpenseStoreError, FileError, Ledger,
    LookupError, DEFAULT_BACKING_FILE,
};
