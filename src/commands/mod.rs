// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod users;
pub mod groups;
pub mod friends;
pub mod expenses;
pub mod balances;
pub mod chat;
pub mod transactions;
pub mod invite;
pub mod exporter;
pub mod settings;
pub mod doctor;
