// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::split::{split_evenly, to_cents};
use super::{ExpenseSource, MembershipSource, NoticeSink, SplitSource};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Expense, MessageKind, NewExpense, NewMessage, Split};
use crate::utils::fmt_money;
use rust_decimal::Decimal;
use serde::Serialize;

/// How to treat a split insert that fails after the expense row exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FanoutPolicy {
    /// Any split failure fails the call. Callers run the fan-out inside a
    /// storage transaction so nothing is left behind.
    Atomic,
    /// Keep the expense and report the participants whose split is missing.
    BestEffort,
}

impl FanoutPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FanoutPolicy::Atomic => "atomic",
            FanoutPolicy::BestEffort => "best-effort",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "atomic" => Some(FanoutPolicy::Atomic),
            "best-effort" | "best_effort" | "besteffort" => Some(FanoutPolicy::BestEffort),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpenseReceipt {
    pub expense: Expense,
    pub splits: Vec<Split>,
    /// Participants whose split could not be written (best-effort only).
    pub missing: Vec<i64>,
}

impl ExpenseReceipt {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Checks a request and returns it normalised: trimmed title and category,
/// amount in cents, participants de-duplicated in first-seen order.
pub fn validate<M: MembershipSource + ?Sized>(
    members: &M,
    req: &NewExpense,
) -> LedgerResult<(NewExpense, String)> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(LedgerError::invalid("Expense title cannot be empty"));
    }
    let amount = to_cents(req.amount);
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid("Amount must be greater than 0"));
    }
    let mut participants: Vec<i64> = Vec::with_capacity(req.split_with.len());
    for id in &req.split_with {
        if !participants.contains(id) {
            participants.push(*id);
        }
    }
    if participants.is_empty() {
        return Err(LedgerError::invalid(
            "Select at least one person to split with",
        ));
    }

    let roster = members.members(req.group_id)?;
    let payer = roster
        .iter()
        .find(|m| m.user_id == req.paid_by)
        .ok_or_else(|| {
            LedgerError::invalid(format!(
                "Payer {} is not a member of group {}",
                req.paid_by, req.group_id
            ))
        })?;
    if let Some(outsider) = participants
        .iter()
        .find(|id| !roster.iter().any(|m| m.user_id == **id))
    {
        return Err(LedgerError::invalid(format!(
            "User {} is not a member of group {}",
            outsider, req.group_id
        )));
    }

    let category = match req.category.trim() {
        "" => "general".to_string(),
        c => c.to_string(),
    };
    let normalised = NewExpense {
        group_id: req.group_id,
        paid_by: req.paid_by,
        title: title.to_string(),
        description: req
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        amount,
        category,
        date: req.date,
        split_with: participants,
    };
    Ok((normalised, payer.display_name.clone()))
}

/// Records an expense and one split per participant, then posts an
/// expense notice (amount shown in `currency`) to the group chat.
///
/// Under [`FanoutPolicy::Atomic`] the first failing split aborts with an
/// error; the caller owns the transaction that undoes the expense row.
/// A notice that cannot be posted is logged and ignored under both
/// policies.
pub fn fan_out<L>(
    store: &L,
    req: &NewExpense,
    policy: FanoutPolicy,
    currency: &str,
) -> LedgerResult<ExpenseReceipt>
where
    L: MembershipSource + ExpenseSource + SplitSource + NoticeSink + ?Sized,
{
    let (req, payer_name) = validate(store, req)?;
    let expense = store.create_expense(&req)?;
    tracing::debug!(expense_id = expense.id, title = %expense.title, "expense created");

    let shares = split_evenly(expense.amount, req.split_with.len());
    let mut splits = Vec::with_capacity(shares.len());
    let mut missing = Vec::new();
    for (user_id, share) in req.split_with.iter().zip(shares) {
        match store.create_split(expense.id, *user_id, share) {
            Ok(split) => splits.push(split),
            Err(err) => match policy {
                FanoutPolicy::Atomic => {
                    tracing::warn!(
                        expense_id = expense.id,
                        user_id = *user_id,
                        "split insert failed, abandoning expense: {}",
                        err
                    );
                    return Err(err);
                }
                FanoutPolicy::BestEffort => {
                    tracing::warn!(
                        expense_id = expense.id,
                        user_id = *user_id,
                        "split insert failed, expense kept without it: {}",
                        err
                    );
                    missing.push(*user_id);
                }
            },
        }
    }

    let notice = NewMessage {
        group_id: expense.group_id,
        sender_id: expense.paid_by,
        message: format!(
            "{} added expense: {} ({})",
            payer_name,
            expense.title,
            fmt_money(&expense.amount, currency)
        ),
        kind: MessageKind::Expense,
        expense_id: Some(expense.id),
    };
    if let Err(err) = store.post_notice(&notice) {
        tracing::warn!(expense_id = expense.id, "could not post expense notice: {}", err);
    }

    Ok(ExpenseReceipt {
        expense,
        splits,
        missing,
    })
}
