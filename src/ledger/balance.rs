// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{ExpenseSource, MembershipSource, SplitSource};
use crate::error::LedgerResult;
use crate::models::{Balance, GroupMember};
use rust_decimal::Decimal;
use serde::Serialize;

/// What to do when one member's figures cannot be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MemberFailurePolicy {
    /// Log and leave the member out of the result.
    Skip,
    /// Fail the whole computation.
    Strict,
}

impl MemberFailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberFailurePolicy::Skip => "skip",
            MemberFailurePolicy::Strict => "strict",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Some(MemberFailurePolicy::Skip),
            "strict" => Some(MemberFailurePolicy::Strict),
            _ => None,
        }
    }
}

/// Computes one balance per member of `group_id`, in member-list order.
///
/// Membership and the group's expense ids are fetched once; a failure there
/// fails the call. Per-member failures follow `policy`.
pub fn group_balances<M, E, S>(
    members: &M,
    expenses: &E,
    splits: &S,
    group_id: i64,
    policy: MemberFailurePolicy,
) -> LedgerResult<Vec<Balance>>
where
    M: MembershipSource + ?Sized,
    E: ExpenseSource + ?Sized,
    S: SplitSource + ?Sized,
{
    let roster = members.members(group_id)?;
    if roster.is_empty() {
        tracing::debug!(group_id, "no members, nothing to balance");
        return Ok(Vec::new());
    }
    let expense_ids = expenses.group_expense_ids(group_id)?;

    let mut out = Vec::with_capacity(roster.len());
    for member in &roster {
        match member_balance(expenses, splits, group_id, member, &expense_ids) {
            Ok(b) => out.push(b),
            Err(err) => match policy {
                MemberFailurePolicy::Skip => {
                    tracing::warn!(
                        group_id,
                        user_id = member.user_id,
                        "skipping member in balance computation: {}",
                        err
                    );
                }
                MemberFailurePolicy::Strict => return Err(err),
            },
        }
    }
    tracing::debug!(group_id, computed = out.len(), of = roster.len(), "balances computed");
    Ok(out)
}

fn member_balance<E, S>(
    expenses: &E,
    splits: &S,
    group_id: i64,
    member: &GroupMember,
    group_expense_ids: &[i64],
) -> LedgerResult<Balance>
where
    E: ExpenseSource + ?Sized,
    S: SplitSource + ?Sized,
{
    let paid = expenses.expenses_paid_by(group_id, member.user_id)?;
    let total_paid: Decimal = paid.iter().map(|e| e.amount).sum();

    let total_owed: Decimal = splits
        .splits_owed_by(member.user_id, group_expense_ids)?
        .iter()
        .filter(|s| !s.is_settled)
        .map(|s| s.amount)
        .sum();

    let paid_ids: Vec<i64> = paid.iter().map(|e| e.id).collect();
    let total_received: Decimal = if paid_ids.is_empty() {
        Decimal::ZERO
    } else {
        splits
            .splits_for_expenses(&paid_ids)?
            .iter()
            .filter(|s| s.is_settled)
            .map(|s| s.amount)
            .sum()
    };

    Ok(Balance {
        user_id: member.user_id,
        display_name: member.display_name.clone(),
        total_paid,
        total_owed,
        total_received,
        net: total_owed - total_paid + total_received,
    })
}
