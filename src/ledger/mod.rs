// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Group ledger core: balances, settlement and expense fan-out.
//!
//! Everything here talks to storage through the source traits below, so
//! the same logic runs against [`crate::store::SqliteStore`] or any other
//! key-filtered record store.

pub mod balance;
pub mod expense;
pub mod settlement;
pub mod split;

pub use balance::{MemberFailurePolicy, group_balances};
pub use expense::{ExpenseReceipt, FanoutPolicy, fan_out};
pub use settlement::settle;
pub use split::split_evenly;

use crate::error::LedgerResult;
use crate::models::{Expense, GroupMember, GroupMessage, NewExpense, NewMessage, Split};
use rust_decimal::Decimal;

pub trait MembershipSource {
    /// Members of a group in their stored order. Unknown groups have none.
    fn members(&self, group_id: i64) -> LedgerResult<Vec<GroupMember>>;
}

pub trait ExpenseSource {
    fn group_expense_ids(&self, group_id: i64) -> LedgerResult<Vec<i64>>;
    fn expenses_paid_by(&self, group_id: i64, user_id: i64) -> LedgerResult<Vec<Expense>>;
    fn create_expense(&self, new: &NewExpense) -> LedgerResult<Expense>;
}

pub trait SplitSource {
    /// Splits owed by `user_id`, restricted to `expense_ids`.
    fn splits_owed_by(&self, user_id: i64, expense_ids: &[i64]) -> LedgerResult<Vec<Split>>;
    fn splits_for_expenses(&self, expense_ids: &[i64]) -> LedgerResult<Vec<Split>>;
    fn create_split(&self, expense_id: i64, user_id: i64, amount: Decimal)
    -> LedgerResult<Split>;
    /// Marks a split settled. Fails with `NotFound` for an unknown id.
    fn settle_split(&self, split_id: i64) -> LedgerResult<Split>;
}

/// Where expense notices go once an expense is recorded.
pub trait NoticeSink {
    fn post_notice(&self, msg: &NewMessage) -> LedgerResult<GroupMessage>;
}
