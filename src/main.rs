use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{error, info};

use folder_notify::credentials::{
    credential_command, CredentialAction, CredentialProvider, KeyringSecretStore,
    PersistenceScope, TerminalPrompter,
};
use folder_notify::email::{LettreTransport, TransportSecurity};
use folder_notify::utils::logging::initialize_logging;
use folder_notify::utils::time::format_duration;
use folder_notify::watcher::{
    install_interrupt_handler, CancellationToken, ConfigLayer, FolderWatcher, NotifyEventSource,
    DEFAULT_CREDENTIAL_IDENTIFIER,
};
use folder_notify::{Result, WatchError, KEYRING_SERVICE};

fn identifier_arg() -> Arg {
    Arg::new("identifier")
        .help("Name the credential is stored under")
        .default_value(DEFAULT_CREDENTIAL_IDENTIFIER)
}

fn build_cli() -> Command {
    Command::new("folder-notify")
        .about("Email a notification for every file created under a folder")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log debug output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Append log output to this file instead of stderr")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .subcommand(
            Command::new("watch")
                .about("Watch a folder until interrupted")
                .arg(
                    Arg::new("path")
                        .help("Folder to watch recursively")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .help("JSON file with watch settings; flags override it")
                        .value_name("FILE")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Sender address")
                        .value_name("ADDRESS"),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Recipient address (defaults to the SMTP username)")
                        .value_name("ADDRESS"),
                )
                .arg(
                    Arg::new("smtp-host")
                        .long("smtp-host")
                        .help("SMTP server hostname")
                        .value_name("HOST"),
                )
                .arg(
                    Arg::new("smtp-port")
                        .long("smtp-port")
                        .help("SMTP server port")
                        .value_name("PORT")
                        .value_parser(value_parser!(u16)),
                )
                .arg(
                    Arg::new("security")
                        .long("security")
                        .help("Connection security")
                        .value_parser(["starttls", "tls", "none"]),
                )
                .arg(
                    Arg::new("credential")
                        .long("credential")
                        .help("Name of the stored SMTP credential")
                        .value_name("IDENTIFIER"),
                )
                .arg(
                    Arg::new("poll-interval-ms")
                        .long("poll-interval-ms")
                        .help("How often to check for shutdown, in milliseconds")
                        .value_name("MS")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("persist")
                        .long("persist")
                        .help("Where to save a newly entered credential")
                        .value_parser(["session", "local-machine"]),
                ),
        )
        .subcommand(
            Command::new("credential")
                .about("Manage the stored SMTP credential")
                .subcommand_required(true)
                .subcommand(
                    Command::new("set")
                        .about("Enter a credential and save it to the keyring")
                        .arg(identifier_arg()),
                )
                .subcommand(
                    Command::new("show")
                        .about("Show whether a credential is stored")
                        .arg(identifier_arg()),
                )
                .subcommand(
                    Command::new("forget")
                        .about("Delete a stored credential")
                        .arg(identifier_arg()),
                ),
        )
}

/// Settings given on the command line, as a config layer
fn command_line_layer(matches: &ArgMatches) -> ConfigLayer {
    ConfigLayer {
        root: matches.get_one::<PathBuf>("path").cloned(),
        email_from: matches.get_one::<String>("from").cloned(),
        email_to: matches.get_one::<String>("to").cloned(),
        smtp_host: matches.get_one::<String>("smtp-host").cloned(),
        smtp_port: matches.get_one::<u16>("smtp-port").copied(),
        security: matches
            .get_one::<String>("security")
            .and_then(|value| TransportSecurity::parse(value)),
        credential: matches.get_one::<String>("credential").cloned(),
        poll_interval_ms: matches.get_one::<u64>("poll-interval-ms").copied(),
        persist: matches
            .get_one::<String>("persist")
            .and_then(|value| PersistenceScope::parse(value)),
    }
}

fn run_watch(matches: &ArgMatches) -> Result<()> {
    let file_layer = match matches.get_one::<PathBuf>("config") {
        Some(path) => ConfigLayer::from_file(path)?,
        None => ConfigLayer::default(),
    };
    let config = file_layer.overlay(command_line_layer(matches)).build()?;

    let cancel = CancellationToken::new();
    install_interrupt_handler(&cancel);

    let mut provider = CredentialProvider::connect(
        KeyringSecretStore::open(KEYRING_SERVICE),
        TerminalPrompter,
        config.persistence_scope,
    );
    let mut watcher = FolderWatcher::new(NotifyEventSource, Arc::new(LettreTransport));

    println!(
        "Watching {} for new files. Press Ctrl+C to stop.",
        config.root.display()
    );
    let summary = watcher.run(&config, &mut provider, &cancel)?;

    info!(
        "Watcher stopped after {}: {} notifications delivered, {} failed",
        format_duration(summary.uptime.as_secs()),
        summary.delivered,
        summary.failed
    );
    Ok(())
}

fn run_credential(matches: &ArgMatches) -> Result<()> {
    let (action, sub_matches) = matches
        .subcommand()
        .ok_or_else(|| WatchError::Config("missing credential action".to_string()))?;
    let identifier = sub_matches
        .get_one::<String>("identifier")
        .map(String::as_str)
        .unwrap_or(DEFAULT_CREDENTIAL_IDENTIFIER);

    let action = CredentialAction::parse(action)
        .ok_or_else(|| WatchError::Config(format!("unknown credential action '{}'", action)))?;

    let store = KeyringSecretStore::open(KEYRING_SERVICE)?;
    let message = credential_command(action, identifier, &store, &mut TerminalPrompter)?;
    println!("{}", message);
    Ok(())
}

fn main() -> ExitCode {
    let matches = build_cli().get_matches();

    let log_file = matches.get_one::<PathBuf>("log-file");
    let verbose = matches.get_flag("verbose");
    if let Err(e) = initialize_logging(log_file.map(PathBuf::as_path), verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let result = match matches.subcommand() {
        Some(("watch", sub_matches)) => run_watch(sub_matches),
        Some(("credential", sub_matches)) => run_credential(sub_matches),
        _ => Err(WatchError::Config("no command given".to_string())),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_watch_flags_become_a_layer() {
        let matches = build_cli()
            .try_get_matches_from([
                "folder-notify",
                "watch",
                "/inbox",
                "--to",
                "ops@example.com",
                "--smtp-port",
                "465",
                "--security",
                "tls",
                "--persist",
                "session",
            ])
            .unwrap();
        let (_, watch) = matches.subcommand().unwrap();
        let layer = command_line_layer(watch);

        assert_eq!(layer.root, Some(PathBuf::from("/inbox")));
        assert_eq!(layer.email_to.as_deref(), Some("ops@example.com"));
        assert_eq!(layer.smtp_port, Some(465));
        assert_eq!(layer.security, Some(TransportSecurity::Tls));
        assert_eq!(layer.persist, Some(PersistenceScope::Session));
        assert!(layer.email_from.is_none());
        assert!(layer.smtp_host.is_none());
    }

    #[test]
    fn test_unknown_security_mode_is_rejected() {
        let result = build_cli().try_get_matches_from([
            "folder-notify",
            "watch",
            "/inbox",
            "--security",
            "true",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_credential_subcommands_map_to_actions() {
        for name in ["set", "show", "forget"] {
            let matches = build_cli()
                .try_get_matches_from(["folder-notify", "credential", name, "scanner-smtp"])
                .unwrap();
            let (_, credential) = matches.subcommand().unwrap();
            let (action, sub_matches) = credential.subcommand().unwrap();

            assert!(CredentialAction::parse(action).is_some());
            assert_eq!(
                sub_matches.get_one::<String>("identifier").map(String::as_str),
                Some("scanner-smtp")
            );
        }
    }

    #[test]
    fn test_credential_identifier_defaults() {
        let matches = build_cli()
            .try_get_matches_from(["folder-notify", "credential", "show"])
            .unwrap();
        let (_, credential) = matches.subcommand().unwrap();
        let (action, show) = credential.subcommand().unwrap();

        assert_eq!(action, "show");
        assert_eq!(
            show.get_one::<String>("identifier").map(String::as_str),
            Some(DEFAULT_CREDENTIAL_IDENTIFIER)
        );
    }
}
