// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Role;
use crate::store::SqliteStore;
use crate::utils::{clean_phone, id_for_group, id_for_user};
use anyhow::{anyhow, Result};
use rusqlite::Connection;
use serde::Serialize;

const DOWNLOAD_URL: &str = "https://play.google.com/store/apps/details?id=com.Aman.myapplication";

/// What inviting the contact did to the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InviteOutcome {
    /// Known user, now a member.
    Added,
    /// Known user who was already in the group.
    AlreadyMember,
    /// Not a user yet; only the download message applies.
    MessageOnly,
}

/// Invitation text ready to hand to whatever channel delivers it.
#[derive(Debug, Clone, Serialize)]
pub struct Invitation {
    pub contact_name: String,
    pub phone: Option<String>,
    pub group_name: String,
    pub inviter_name: String,
    pub is_app_user: bool,
    pub outcome: InviteOutcome,
    pub message: String,
}

pub fn invitation_message(contact: &str, inviter: &str, group: &str, is_app_user: bool) -> String {
    if is_app_user {
        format!(
            "Hi {contact}!\n\n{inviter} has invited you to join \"{group}\" on Splitclip.\n\n\
             Open the app to accept the invitation and start splitting expenses together!"
        )
    } else {
        format!(
            "Hi {contact}!\n\n{inviter} has invited you to join \"{group}\" on Splitclip.\n\n\
             Download the app to split expenses easily:\n{DOWNLOAD_URL}\n\n\
             Join us and make expense sharing simple!"
        )
    }
}

/// Builds an invitation. A contact counts as an app user when a user with
/// the same phone or email is already known; such a contact is added to
/// the group straight away.
pub fn build_invitation(
    conn: &Connection,
    group_id: i64,
    inviter_id: i64,
    contact_name: &str,
    phone: Option<&str>,
    email: Option<&str>,
) -> Result<Invitation> {
    let contact_name = contact_name.trim();
    if contact_name.is_empty() {
        return Err(anyhow!("Contact name cannot be empty"));
    }
    let store = SqliteStore::new(conn);
    let group = store.group_by_id(group_id)?;
    let inviter = store.user_by_id(inviter_id)?;

    let phone = phone.map(clean_phone).filter(|p| !p.is_empty());
    let by_phone = match phone.as_deref() {
        Some(p) => store.user_by_phone(p)?,
        None => None,
    };
    let by_email = match email.map(str::trim).filter(|e| !e.is_empty()) {
        Some(e) => store.user_by_email(e)?,
        None => None,
    };
    let outcome = match by_phone.or(by_email) {
        Some(user) if store.is_member(group_id, user.id)? => InviteOutcome::AlreadyMember,
        Some(user) => {
            store.add_member(group_id, user.id, Role::Member)?;
            InviteOutcome::Added
        }
        None => InviteOutcome::MessageOnly,
    };
    let is_app_user = outcome != InviteOutcome::MessageOnly;

    Ok(Invitation {
        message: invitation_message(contact_name, inviter.display_name(), &group.name, is_app_user),
        contact_name: contact_name.to_string(),
        phone,
        group_name: group.name,
        inviter_name: inviter.display_name().to_string(),
        is_app_user,
        outcome,
    })
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let group_id = id_for_group(conn, sub.get_one::<String>("group").unwrap())?;
    let inviter_id = id_for_user(conn, sub.get_one::<String>("inviter").unwrap())?;
    let inv = build_invitation(
        conn,
        group_id,
        inviter_id,
        sub.get_one::<String>("name").unwrap(),
        sub.get_one::<String>("phone").map(|s| s.as_str()),
        sub.get_one::<String>("email").map(|s| s.as_str()),
    )?;
    if let Some(ref p) = inv.phone {
        println!("To: {} ({})", inv.contact_name, p);
    } else {
        println!("To: {}", inv.contact_name);
    }
    println!("{}", inv.message);
    match inv.outcome {
        InviteOutcome::Added => println!("{} added to '{}'", inv.contact_name, inv.group_name),
        InviteOutcome::AlreadyMember => {
            println!("{} is already in '{}'", inv.contact_name, inv.group_name)
        }
        InviteOutcome::MessageOnly => {}
    }
    Ok(())
}
