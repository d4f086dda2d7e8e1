use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::expense::Expense;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("user {user} does not exist")]
    UserNotFound { user: String },

    #[error("expense with id {expense_id} of user {user} does not exist")]
    ExpenseNotFound { user: String, expense_id: String },
}

type LookupResult<T> = Result<T, LookupError>;

/// This keeps every user's expenses, in the order they were recorded
///
/// A missing user and a user with no expenses read the same way.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Ledger {
    pub(crate) expenses: BTreeMap<String, Vec<Expense>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expenses_of(&self, user: &str) -> &[Expense] {
        self.expenses.get(user).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn append(&mut self, user: &str, expense: Expense) {
        self.expenses.entry(user.to_owned()).or_default().push(expense);
    }

    /// Drops the first expense matching `expense_id` and pushes `new_expense`
    /// at the end of the user's expenses.
    pub fn replace(
        &mut self,
        user: &str,
        expense_id: &str,
        new_expense: Expense,
    ) -> LookupResult<Expense> {
        let expenses = self.find_user_mut(user)?;
        let index = Self::position(expenses, user, expense_id)?;
        let previous = expenses.remove(index);
        expenses.push(new_expense);
        Ok(previous)
    }

    pub fn remove(&mut self, user: &str, expense_id: &str) -> LookupResult<Expense> {
        let expenses = self.find_user_mut(user)?;
        let index = Self::position(expenses, user, expense_id)?;
        Ok(expenses.remove(index))
    }

    fn find_user_mut(&mut self, user: &str) -> LookupResult<&mut Vec<Expense>> {
        self.expenses
            .get_mut(user)
            .ok_or_else(|| LookupError::UserNotFound {
                user: user.to_owned(),
            })
    }

    // First match wins, ids are not guaranteed unique
    fn position(expenses: &[Expense], user: &str, expense_id: &str) -> LookupResult<usize> {
        expenses
            .iter()
            .position(|expense| expense.matches(expense_id))
            .ok_or_else(|| LookupError::ExpenseNotFound {
                user: user.to_owned(),
                expense_id: expense_id.to_owned(),
            })
    }
}
