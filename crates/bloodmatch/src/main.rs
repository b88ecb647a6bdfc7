//! `bloodmatch` - CLI for the donor matcher
//!
//! This binary registers donors and blood requests and prints ranked donor
//! matches.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use bloodmatch::cli::{
    AddRequestArgs, Cli, Command, ConfigCommand, DonorCommand, MatchCommand, OutputFormat,
    RequestCommand,
};
use bloodmatch::records::{NewBloodRequest, NewDonor, RequestStatus, Urgency};
use bloodmatch::storage::RequestFilter;
use bloodmatch::{init_logging, match_donors, BloodRequest, Config, MatchOptions, MatchOutcome, Storage};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Match(cmd) => handle_match(&config, &cmd),
        Command::Donor(cmd) => handle_donor(&config, cmd),
        Command::Request(cmd) => handle_request(&config, cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_storage(config: &Config) -> anyhow::Result<Storage> {
    let path = config.database_path();
    Storage::open(&path).with_context(|| format!("opening database {}", path.display()))
}

fn handle_match(config: &Config, cmd: &MatchCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let mut options = MatchOptions::from(&config.matching);
    options.strict_urgency |= cmd.strict;

    let outcome = match_donors(&storage, cmd.id, options)?;
    print_outcome(&outcome, cmd.format)
}

fn print_outcome(outcome: &MatchOutcome, format: OutputFormat) -> anyhow::Result<()> {
    let request = &outcome.request;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(outcome)?);
        }
        OutputFormat::Plain => {
            println!(
                "Request {}: {} needed in {} ({} urgency)",
                request.id, request.blood_group, request.location, request.urgency_level
            );
            println!("Rule: {}", outcome.rule_fired);
            for (rank, m) in outcome.matches.iter().enumerate() {
                println!(
                    "{}. {} ({}) in {} - score {}",
                    rank + 1,
                    m.donor.name,
                    m.donor.blood_group.as_deref().unwrap_or("-"),
                    m.donor.location.as_deref().unwrap_or("-"),
                    m.score
                );
            }
        }
        OutputFormat::Table => {
            println!(
                "Request #{}  {}  {}  {}",
                request.id, request.blood_group, request.location, request.urgency_level
            );
            println!("Rule fired: {}", outcome.rule_fired);
            println!();
            if outcome.matches.is_empty() {
                println!("No matching donors.");
                return Ok(());
            }
            println!(
                "{:<4} {:<6} {:<24} {:<6} {:<16} {:<16} {:>5}",
                "#", "ID", "NAME", "GROUP", "LOCATION", "PHONE", "SCORE"
            );
            for (rank, m) in outcome.matches.iter().enumerate() {
                println!(
                    "{:<4} {:<6} {:<24} {:<6} {:<16} {:<16} {:>5}",
                    rank + 1,
                    m.donor.id,
                    m.donor.name,
                    m.donor.blood_group.as_deref().unwrap_or("-"),
                    m.donor.location.as_deref().unwrap_or("-"),
                    m.donor.phone.as_deref().unwrap_or("-"),
                    m.score
                );
            }
        }
    }
    Ok(())
}

fn handle_donor(config: &Config, cmd: DonorCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    match cmd {
        DonorCommand::Add {
            name,
            blood_group,
            location,
            phone,
            email,
            dob,
            gender,
        } => {
            let id = storage.insert_donor(&NewDonor {
                name,
                phone: Some(phone),
                blood_group: Some(blood_group.to_string()),
                location: Some(location),
                email,
                dob,
                gender,
            })?;
            println!("Registered donor {id}");
        }
        DonorCommand::Show { id } => match storage.get_donor(id)? {
            Some(donor) => println!("{}", serde_json::to_string_pretty(&donor)?),
            None => anyhow::bail!("donor {id} not found"),
        },
    }
    Ok(())
}

fn handle_request(config: &Config, cmd: RequestCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    match cmd {
        RequestCommand::Add(args) => {
            let id = storage.insert_request(&new_request(args))?;
            println!("Filed blood request {id}");
        }
        RequestCommand::List {
            status,
            blood_group,
            location,
            limit,
            format,
        } => {
            let filter = RequestFilter {
                status: status.into(),
                blood_group: blood_group.map(|g| g.to_string()),
                location,
            };
            let limit = limit.unwrap_or(config.matching.default_list_limit);
            let requests = storage.list_requests(&filter, limit)?;
            print_requests(&requests, format)?;
        }
        RequestCommand::Status { id, status } => {
            let status = RequestStatus::from(status);
            if !storage.update_request_status(id, status)? {
                anyhow::bail!("blood request {id} not found");
            }
            println!("Blood request {id} marked {status}");
        }
    }
    Ok(())
}

fn new_request(args: AddRequestArgs) -> NewBloodRequest {
    NewBloodRequest {
        requester_id: args.requester,
        name: args.name,
        blood_group: args.blood_group.to_string(),
        location: args.location,
        address: args.address,
        phone: args.phone,
        note: args.note,
        urgency_level: Urgency::from(args.urgency).to_string(),
    }
}

fn print_requests(requests: &[BloodRequest], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(requests)?),
        OutputFormat::Plain => {
            for r in requests {
                println!(
                    "{}: {} in {} ({}), {}",
                    r.id, r.blood_group, r.location, r.urgency_level, r.request_status
                );
            }
        }
        OutputFormat::Table => {
            println!(
                "{:<6} {:<6} {:<16} {:<8} {:<10} {:<25}",
                "ID", "GROUP", "LOCATION", "URGENCY", "STATUS", "CREATED"
            );
            for r in requests {
                println!(
                    "{:<6} {:<6} {:<16} {:<8} {:<10} {:<25}",
                    r.id,
                    r.blood_group,
                    r.location,
                    r.urgency_level,
                    r.request_status,
                    r.created_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
        }
    }
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let stats = storage.stats()?;

    if json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "total_users": stats.total_users,
            "total_requests": stats.total_requests,
            "pending_requests": stats.pending_requests,
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("bloodmatch status");
        println!("-----------------");
        println!("Database:         {}", storage.path().display());
        println!("Donors:           {}", stats.total_users);
        println!("Requests:         {}", stats.total_requests);
        println!("Pending requests: {}", stats.pending_requests);
        println!("Size (bytes):     {}", stats.db_size_bytes);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Matching]");
                println!("  Strict urgency:     {}", config.matching.strict_urgency);
                println!(
                    "  Default list limit: {}",
                    config.matching.default_list_limit
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
