// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use splitclip::error::LedgerError;
use splitclip::commands::invite::InviteOutcome;
use splitclip::models::{FriendStatus, MessageKind, Role};
use splitclip::store::SqliteStore;
use splitclip::{cli, commands::friends, commands::groups, commands::invite, db};

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

#[test]
fn users_are_normalised_and_unique() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let u = store
        .add_user("  Priya@Example.COM ", Some(" Priya Shah "), Some("+91 98765-43210"))
        .unwrap();
    assert_eq!(u.email, "priya@example.com");
    assert_eq!(u.full_name.as_deref(), Some("Priya Shah"));
    assert_eq!(u.phone.as_deref(), Some("+919876543210"));
    assert_eq!(u.display_name(), "Priya Shah");

    let err = store.add_user("priya@example.com", None, None).unwrap_err();
    assert!(matches!(err, LedgerError::Invalid(_)));
    assert!(store.add_user("not-an-email", None, None).is_err());

    let nameless = store.add_user("raj@example.com", Some("  "), None).unwrap();
    assert_eq!(nameless.display_name(), "raj@example.com");
}

#[test]
fn search_matches_name_or_email_case_insensitively() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    store.add_user("priya@example.com", Some("Priya Shah"), None).unwrap();
    store.add_user("raj@example.com", Some("Raj Kumar"), None).unwrap();
    store.add_user("shahid@example.com", None, None).unwrap();

    let hits: Vec<String> = store
        .search_users("SHAH")
        .unwrap()
        .into_iter()
        .map(|u| u.email)
        .collect();
    assert_eq!(hits, vec!["priya@example.com", "shahid@example.com"]);
    assert!(store.search_users("   ").unwrap().is_empty());
}

#[test]
fn creator_becomes_admin_and_members_keep_join_order() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let a = store.add_user("a@example.com", Some("Ana"), None).unwrap().id;
    let b = store.add_user("b@example.com", Some("Ben"), None).unwrap().id;

    let g = store.create_group(" Flat 4B ", Some("rent and bills"), a, &[]).unwrap();
    assert_eq!(g.name, "Flat 4B");
    assert_eq!(g.member_count, 1);

    store.add_member(g.id, b, Role::Member).unwrap();
    let members = store.group_members(g.id).unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].user_id, a);
    assert_eq!(members[0].role, Role::Admin);
    assert_eq!(members[1].display_name, "Ben");
    assert_eq!(members[1].role, Role::Member);

    assert!(store.add_member(g.id, b, Role::Admin).is_err());
    assert!(store.create_group("Flat 4B", None, b, &[]).is_err());
    assert!(store.create_group("  ", None, b, &[]).is_err());
    assert!(store.create_group("Ghost", None, 999, &[]).is_err());
}

#[test]
fn remove_member_and_update_group() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let a = store.add_user("a@example.com", None, None).unwrap().id;
    let b = store.add_user("b@example.com", None, None).unwrap().id;
    let g = store.create_group("Trip", Some("Goa"), a, &[]).unwrap();
    store.add_member(g.id, b, Role::Member).unwrap();

    store.remove_member(g.id, b).unwrap();
    assert!(!store.is_member(g.id, b).unwrap());
    let err = store.remove_member(g.id, b).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { what: "member", .. }));

    let renamed = store.update_group(g.id, Some("Trip 2025"), None).unwrap();
    assert_eq!(renamed.name, "Trip 2025");
    assert_eq!(renamed.description.as_deref(), Some("Goa"));
    assert!(renamed.updated_at.is_some());

    let cleared = store.update_group(g.id, None, Some("")).unwrap();
    assert_eq!(cleared.description, None);
    assert!(store.update_group(g.id, Some(" "), None).is_err());

    let other = store.create_group("Flat", None, a, &[]).unwrap();
    let err = store.update_group(other.id, Some(" Trip 2025 "), None).unwrap_err();
    assert!(matches!(err, LedgerError::Invalid(ref msg) if msg == "Group 'Trip 2025' already exists"));
    let same = store.update_group(g.id, Some("Trip 2025"), Some("beach")).unwrap();
    assert_eq!(same.description.as_deref(), Some("beach"));
}

#[test]
fn user_groups_lists_only_memberships() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let a = store.add_user("a@example.com", None, None).unwrap().id;
    let b = store.add_user("b@example.com", None, None).unwrap().id;
    let g1 = store.create_group("One", None, a, &[]).unwrap().id;
    store.create_group("Two", None, b, &[]).unwrap();

    let mine: Vec<i64> = store.user_groups(a).unwrap().into_iter().map(|g| g.id).collect();
    assert_eq!(mine, vec![g1]);
    assert_eq!(store.all_groups().unwrap().len(), 2);
}

#[test]
fn add_member_command_parses_role() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let a = store.add_user("a@example.com", None, None).unwrap().id;
    let b = store.add_user("b@example.com", None, None).unwrap().id;
    let g = store.create_group("Trip", None, a, &[]).unwrap().id;

    let matches = cli::build_cli().get_matches_from([
        "splitclip", "group", "add-member", "--group", "Trip", "--user", "b@example.com",
        "--role", "admin",
    ]);
    let Some(("group", sub)) = matches.subcommand() else {
        panic!("no group subcommand");
    };
    groups::handle(&conn, sub).unwrap();
    let member = store
        .group_members(g)
        .unwrap()
        .into_iter()
        .find(|m| m.user_id == b)
        .unwrap();
    assert_eq!(member.role, Role::Admin);
}

#[test]
fn chat_requires_membership_and_text() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let a = store.add_user("a@example.com", Some("Ana"), None).unwrap().id;
    let b = store.add_user("b@example.com", None, None).unwrap().id;
    let g = store.create_group("Trip", None, a, &[]).unwrap().id;

    let sent = store.send_message(g, a, "  see you at 8 ").unwrap();
    assert_eq!(sent.message, "see you at 8");
    assert_eq!(sent.kind, MessageKind::Text);
    assert_eq!(sent.sender_name.as_deref(), Some("Ana"));

    assert!(store.send_message(g, a, "   ").is_err());
    assert!(store.send_message(g, b, "hi").is_err());

    store.send_message(g, a, "second").unwrap();
    let texts: Vec<String> = store
        .group_messages(g)
        .unwrap()
        .into_iter()
        .map(|m| m.message)
        .collect();
    assert_eq!(texts, vec!["see you at 8", "second"]);
}

#[test]
fn invitation_differs_for_known_and_unknown_contacts() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let a = store.add_user("a@example.com", Some("Ana"), None).unwrap().id;
    store
        .add_user("k@example.com", Some("Kiran"), Some("+91 90000 11111"))
        .unwrap();
    let g = store.create_group("Trip", None, a, &[]).unwrap().id;

    let kiran = store.user_by_email("k@example.com").unwrap().unwrap().id;
    assert!(!store.is_member(g, kiran).unwrap());

    let known = invite::build_invitation(&conn, g, a, "Kiran", Some("+91-90000-11111"), None).unwrap();
    assert!(known.is_app_user);
    assert_eq!(known.outcome, InviteOutcome::Added);
    assert!(store.is_member(g, kiran).unwrap());
    let joined = store
        .group_members(g)
        .unwrap()
        .into_iter()
        .find(|m| m.user_id == kiran)
        .unwrap();
    assert_eq!(joined.role, Role::Member);
    assert_eq!(known.phone.as_deref(), Some("+919000011111"));
    assert!(known.message.contains("Ana has invited you to join \"Trip\""));
    assert!(known.message.contains("Open the app"));

    let by_email = invite::build_invitation(&conn, g, a, "Kiran", None, Some("K@example.com")).unwrap();
    assert!(by_email.is_app_user);
    assert_eq!(by_email.outcome, InviteOutcome::AlreadyMember);
    assert_eq!(store.group_members(g).unwrap().len(), 2);

    let stranger = invite::build_invitation(&conn, g, a, "Sam", Some("(022) 555 0101"), None).unwrap();
    assert!(!stranger.is_app_user);
    assert_eq!(stranger.outcome, InviteOutcome::MessageOnly);
    assert_eq!(store.group_by_id(g).unwrap().member_count, 2);
    assert_eq!(stranger.phone.as_deref(), Some("0225550101"));
    assert!(stranger.message.starts_with("Hi Sam!"));
    assert!(stranger.message.contains("play.google.com"));

    assert!(invite::build_invitation(&conn, g, a, " ", None, None).is_err());
}

#[test]
fn friend_requests_need_acceptance() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let a = store.add_user("a@example.com", Some("Ana"), None).unwrap().id;
    let b = store.add_user("b@example.com", Some("Ben"), None).unwrap().id;
    let c = store.add_user("c@example.com", None, None).unwrap().id;

    let req = store.send_friend_request(a, " B@Example.com ").unwrap();
    assert_eq!(req.status, FriendStatus::Pending);
    assert_eq!((req.user_id, req.friend_id), (a, b));
    assert_eq!(req.name, "Ben");
    assert!(store.user_friends(a).unwrap().is_empty());
    assert!(store.user_friends(b).unwrap().is_empty());

    let incoming = store.friend_requests(b).unwrap();
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].name, "Ana");
    assert_eq!(incoming[0].email, "a@example.com");
    assert!(store.friend_requests(a).unwrap().is_empty());

    let err = store.send_friend_request(a, "b@example.com").unwrap_err();
    assert!(matches!(err, LedgerError::Invalid(ref m) if m.contains("already pending")));
    let err = store.send_friend_request(b, "a@example.com").unwrap_err();
    assert!(matches!(err, LedgerError::Invalid(ref m) if m.contains("already pending")));

    // Only the recipient can accept.
    let err = store.accept_friend(a, b).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { what: "friend request", .. }));

    let accepted = store.accept_friend(b, a).unwrap();
    assert_eq!(accepted.status, FriendStatus::Accepted);
    assert_eq!((accepted.user_id, accepted.friend_id), (b, a));
    assert_eq!(accepted.name, "Ana");
    assert!(store.friend_requests(b).unwrap().is_empty());

    let of_a: Vec<i64> = store.user_friends(a).unwrap().into_iter().map(|f| f.friend_id).collect();
    let of_b: Vec<i64> = store.user_friends(b).unwrap().into_iter().map(|f| f.friend_id).collect();
    assert_eq!(of_a, vec![b]);
    assert_eq!(of_b, vec![a]);
    assert!(store.user_friends(c).unwrap().is_empty());

    let err = store.send_friend_request(b, "a@example.com").unwrap_err();
    assert!(matches!(err, LedgerError::Invalid(ref m) if m == "Already friends with a@example.com"));
    assert!(store.accept_friend(b, a).is_err());
}

#[test]
fn friend_request_rejects_self_and_unknown_emails() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let a = store.add_user("a@example.com", None, None).unwrap().id;

    let err = store.send_friend_request(a, "A@example.com").unwrap_err();
    assert!(matches!(err, LedgerError::Invalid(ref m) if m == "You cannot add yourself as a friend"));
    let err = store.send_friend_request(a, "nobody@example.com").unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { what: "user", ref id } if id == "nobody@example.com"));
    assert!(store.send_friend_request(999, "a@example.com").is_err());
    assert!(store.friend_requests(a).unwrap().is_empty());
}

#[test]
fn create_group_adds_initial_members_in_one_go() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let a = store.add_user("a@example.com", Some("Ana"), None).unwrap().id;
    let b = store.add_user("b@example.com", Some("Ben"), None).unwrap().id;
    let c = store.add_user("c@example.com", Some("Cal"), None).unwrap().id;

    let g = store.create_group("Trip", None, a, &[b, a, c, b, 999]).unwrap();
    assert_eq!(g.member_count, 3);
    let members = store.group_members(g.id).unwrap();
    let ids: Vec<i64> = members.iter().map(|m| m.user_id).collect();
    assert_eq!(ids, vec![a, b, c]);
    assert_eq!(members[0].role, Role::Admin);
    assert!(members[1..].iter().all(|m| m.role == Role::Member));

    // A failed create leaves no members behind.
    assert!(store.create_group("Trip", None, b, &[c]).is_err());
    assert_eq!(store.user_groups(c).unwrap().len(), 1);
}

#[test]
fn group_create_command_takes_member_emails() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let a = store.add_user("a@example.com", None, None).unwrap().id;
    let b = store.add_user("b@example.com", None, None).unwrap().id;

    let matches = cli::build_cli().get_matches_from([
        "splitclip", "group", "create", "--name", "Flat", "--creator", "a@example.com",
        "--members", "B@example.com, a@example.com,ghost@example.com,b@example.com",
    ]);
    let Some(("group", sub)) = matches.subcommand() else {
        panic!("no group subcommand");
    };
    groups::handle(&conn, sub).unwrap();

    let g = store.group_by_name("Flat").unwrap().unwrap();
    assert_eq!(g.member_count, 2);
    assert!(store.is_member(g.id, a).unwrap());
    assert!(store.is_member(g.id, b).unwrap());
}

#[test]
fn friend_commands_send_and_accept() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let a = store.add_user("a@example.com", None, None).unwrap().id;
    let b = store.add_user("b@example.com", None, None).unwrap().id;

    let run = |args: &[&str]| {
        let mut argv = vec!["splitclip", "friend"];
        argv.extend_from_slice(args);
        let matches = cli::build_cli().get_matches_from(argv);
        let Some(("friend", sub)) = matches.subcommand() else {
            panic!("no friend subcommand");
        };
        friends::handle(&conn, sub)
    };

    run(&["add", "--user", "a@example.com", "--friend", "b@example.com"]).unwrap();
    run(&["list", "--user", "b@example.com", "--pending", "--json"]).unwrap();
    assert_eq!(store.friend_requests(b).unwrap().len(), 1);

    run(&["accept", "--user", "b@example.com", "--from", "a@example.com"]).unwrap();
    run(&["list", "--user", "a@example.com"]).unwrap();
    assert_eq!(store.user_friends(a).unwrap()[0].friend_id, b);

    assert!(run(&["accept", "--user", "b@example.com", "--from", "a@example.com"]).is_err());
    assert!(run(&["add", "--user", "a@example.com", "--friend", "ghost@example.com"]).is_err());
}
