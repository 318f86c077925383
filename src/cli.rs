// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn group_arg() -> Arg {
    Arg::new("group")
        .long("group")
        .required(true)
        .help("Group name")
}

pub fn build_cli() -> Command {
    Command::new("splitclip")
        .version(clap::crate_version!())
        .about("Shared group expenses, split settlement, and a personal ledger")
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("user")
                .about("Manage users")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("email").long("email").required(true))
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("phone").long("phone")),
                )
                .subcommand(Command::new("list"))
                .subcommand(
                    Command::new("search").arg(Arg::new("query").long("query").required(true)),
                ),
        )
        .subcommand(
            Command::new("group")
                .about("Manage groups and members")
                .subcommand(
                    Command::new("create")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("description").long("description"))
                        .arg(
                            Arg::new("creator")
                                .long("creator")
                                .required(true)
                                .help("Creator email; becomes admin"),
                        )
                        .arg(
                            Arg::new("members")
                                .long("members")
                                .help("Comma separated emails added as initial members"),
                        ),
                )
                .subcommand(
                    Command::new("list")
                        .arg(Arg::new("user").long("user").help("Only groups of this email")),
                )
                .subcommand(Command::new("members").arg(group_arg()))
                .subcommand(
                    Command::new("add-member")
                        .arg(group_arg())
                        .arg(Arg::new("user").long("user").required(true))
                        .arg(
                            Arg::new("role")
                                .long("role")
                                .default_value("member")
                                .value_parser(["admin", "member"]),
                        ),
                )
                .subcommand(
                    Command::new("rm-member")
                        .arg(group_arg())
                        .arg(Arg::new("user").long("user").required(true)),
                )
                .subcommand(
                    Command::new("update")
                        .arg(group_arg())
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("description").long("description")),
                ),
        )
        .subcommand(
            Command::new("friend")
                .about("Friend requests and friend lists")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("user").long("user").required(true))
                        .arg(Arg::new("friend").long("friend").required(true)),
                )
                .subcommand(
                    Command::new("accept")
                        .arg(Arg::new("user").long("user").required(true))
                        .arg(
                            Arg::new("from")
                                .long("from")
                                .required(true)
                                .help("Email of the user who sent the request"),
                        ),
                )
                .subcommand(json_args(
                    Command::new("list")
                        .arg(Arg::new("user").long("user").required(true))
                        .arg(
                            Arg::new("pending")
                                .long("pending")
                                .action(ArgAction::SetTrue)
                                .help("Show requests waiting for this user instead"),
                        ),
                )),
        )
        .subcommand(
            Command::new("expense")
                .about("Shared expenses")
                .subcommand(
                    Command::new("add")
                        .arg(group_arg())
                        .arg(Arg::new("payer").long("payer").required(true))
                        .arg(Arg::new("title").long("title").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("split_with")
                                .long("split-with")
                                .required(true)
                                .help("Comma separated emails receiving a share"),
                        )
                        .arg(Arg::new("category").long("category").default_value("general"))
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD, default today"))
                        .arg(
                            Arg::new("best_effort")
                                .long("best-effort")
                                .action(ArgAction::SetTrue)
                                .help("Keep the expense even if some splits fail"),
                        ),
                )
                .subcommand(json_args(Command::new("list").arg(group_arg())))
                .subcommand(json_args(Command::new("splits").arg(group_arg()))),
        )
        .subcommand(json_args(
            Command::new("balance")
                .about("Net balance per group member")
                .arg(group_arg())
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .action(ArgAction::SetTrue)
                        .help("Fail instead of skipping members whose data cannot be read"),
                ),
        ))
        .subcommand(
            Command::new("settle").about("Mark a split as settled").arg(
                Arg::new("split")
                    .long("split")
                    .required(true)
                    .value_parser(value_parser!(i64)),
            ),
        )
        .subcommand(
            Command::new("chat")
                .about("Group chat")
                .subcommand(
                    Command::new("send")
                        .arg(group_arg())
                        .arg(Arg::new("sender").long("sender").required(true))
                        .arg(Arg::new("message").long("message").required(true)),
                )
                .subcommand(json_args(Command::new("list").arg(group_arg()))),
        )
        .subcommand(
            Command::new("tx")
                .about("Personal income and expenses")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("title").long("title").required(true))
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .required(true)
                                .allow_hyphen_values(true),
                        )
                        .arg(Arg::new("income").long("income").action(ArgAction::SetTrue))
                        .arg(Arg::new("date").long("date")),
                )
                .subcommand(json_args(
                    Command::new("list")
                        .arg(Arg::new("from").long("from"))
                        .arg(Arg::new("to").long("to"))
                        .arg(Arg::new("search").long("search"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .long("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                )
                .subcommand(json_args(
                    Command::new("stats")
                        .arg(Arg::new("from").long("from"))
                        .arg(Arg::new("to").long("to")),
                )),
        )
        .subcommand(
            Command::new("invite")
                .about("Compose an invitation to a group")
                .arg(group_arg())
                .arg(Arg::new("inviter").long("inviter").required(true))
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("phone").long("phone"))
                .arg(Arg::new("email").long("email")),
        )
        .subcommand(
            Command::new("export").about("Export ledger data").subcommand(
                Command::new("expenses")
                    .arg(group_arg())
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("csv")
                            .value_parser(["csv", "json"]),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(
            Command::new("settings")
                .about("Show or change settings")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").long("key").required(true))
                        .arg(Arg::new("value").long("value").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check ledger consistency"))
}
