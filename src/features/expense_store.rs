use std::path::{Path, PathBuf};

use thiserror::Error;

use super::{
    backing_file::{BackingFile, FileError},
    expense::Expense,
    ledger::LookupError,
};

/// Where expenses are kept unless another file is configured
pub const DEFAULT_BACKING_FILE: &str = "./datos.json";

#[derive(Error, Debug)]
pub enum ExpenseStoreError {
    #[error("Lookup failed - {0}")]
    Lookup(#[from] LookupError),

    #[error("Storage failed - {0}")]
    File(#[from] FileError),
}

impl ExpenseStoreError {
    /// True when the user or the expense did not exist, as opposed to an I/O or format problem.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ExpenseStoreError::Lookup(_))
    }
}

type StoreResult<T> = Result<T, ExpenseStoreError>;

/// Reads and writes users' expenses in a single JSON file.
///
/// Nothing is cached: each call loads the whole file, and each mutation
/// writes the whole file back. Calls against the same file, from this or any
/// other store in the process, run one at a time.
#[derive(Debug, Clone)]
pub struct ExpenseStore {
    file: BackingFile,
}

impl Default for ExpenseStore {
    fn default() -> Self {
        Self::new(DEFAULT_BACKING_FILE)
    }
}

impl ExpenseStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: BackingFile::new(path),
        }
    }

    pub fn backing_file(&self) -> &Path {
        self.file.path()
    }

    /// Points every later call at `path`. Operations already running keep their file.
    pub fn set_backing_file(&mut self, path: impl Into<PathBuf>) {
        self.file = BackingFile::new(path);
        debug!("expense store now uses {}", self.file.path().display());
    }

    /// All expenses of `user`, oldest first. Unknown users have none.
    pub async fn list(&self, user: &str) -> StoreResult<Vec<Expense>> {
        let _guard = self.file.lock().await;
        let ledger = self.file.load().await?;
        Ok(ledger.expenses_of(user).to_vec())
    }

    pub async fn add(&self, user: &str, expense: Expense) -> StoreResult<()> {
        let _guard = self.file.lock().await;
        let mut ledger = self.file.load().await?;

        let expense_id = expense.id();
        ledger.append(user, expense);
        self.file.save(&ledger).await?;

        match expense_id {
            Some(id) => info!("added expense {id} for user {user}"),
            None => info!("added expense without id for user {user}"),
        }
        Ok(())
    }

    /// Replaces the first expense of `user` matching `expense_id`.
    ///
    /// The new version is stored last in the user's expenses, not at the old
    /// position.
    pub async fn update(
        &self,
        user: &str,
        expense_id: &str,
        new_expense: Expense,
    ) -> StoreResult<()> {
        let _guard = self.file.lock().await;
        let mut ledger = self.file.load().await?;

        ledger
            .replace(user, expense_id, new_expense)
            .map_err(Self::rejected)?;
        self.file.save(&ledger).await?;

        info!("updated expense {expense_id} of user {user}");
        Ok(())
    }

    pub async fn remove(&self, user: &str, expense_id: &str) -> StoreResult<()> {
        let _guard = self.file.lock().await;
        let mut ledger = self.file.load().await?;

        ledger.remove(user, expense_id).map_err(Self::rejected)?;
        self.file.save(&ledger).await?;

        info!("removed expense {expense_id} of user {user}");
        Ok(())
    }

    fn rejected(e: LookupError) -> ExpenseStoreError {
        warn!("{e}");
        e.into()
    }
}
