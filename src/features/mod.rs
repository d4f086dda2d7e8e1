mod backing_file;
mod expense;
mod expense_store;
mod ledger;

pub use self::{
    backing_file::{BackingFile, FileError},
    expense::{Expense, ExpenseId},
    expense_store::{ExpenseStore, ExpenseStoreError, DEFAULT_BACKING_FILE},
    ledger::{Ledger, LookupError},
};
