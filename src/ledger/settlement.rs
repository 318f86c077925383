// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::SplitSource;
use crate::error::LedgerResult;
use crate::models::Split;

/// Marks a split as settled and returns it.
///
/// Settling an already settled split is accepted; the stored settlement
/// time stays the one from the first call.
pub fn settle<S: SplitSource + ?Sized>(splits: &S, split_id: i64) -> LedgerResult<Split> {
    match splits.settle_split(split_id) {
        Ok(split) => {
            tracing::info!(
                split_id,
                user_id = split.user_id,
                amount = %split.amount,
                "split settled"
            );
            Ok(split)
        }
        Err(err) => {
            tracing::warn!(split_id, "failed to settle split: {}", err);
            Err(err)
        }
    }
}
