// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a money amount to cents, half away from zero.
pub fn to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Divides `amount` into `count` shares of whole cents.
///
/// Leftover cents go one each to the first shares, so the result always
/// sums to the (cent-rounded) amount. Returns an empty vector for a zero
/// count.
pub fn split_evenly(amount: Decimal, count: usize) -> Vec<Decimal> {
    if count == 0 {
        return Vec::new();
    }
    let amount = to_cents(amount);
    let n = Decimal::from(count as u64);
    let base = (amount / n).round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let cent = Decimal::new(1, 2);
    let mut left = amount - base * n;

    let mut shares = Vec::with_capacity(count);
    for _ in 0..count {
        if left >= cent {
            shares.push(base + cent);
            left -= cent;
        } else if left <= -cent {
            shares.push(base - cent);
            left += cent;
        } else {
            shares.push(base);
        }
    }
    shares
}
