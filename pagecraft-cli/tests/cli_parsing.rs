//! Command-line parsing

use clap::Parser;
use pagecraft_cli::commands::{PagesCommand, PermissionsCommand, TemplatesCommand};
use pagecraft_cli::{Cli, Commands};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("pagecraft").chain(args.iter().copied())).unwrap()
}

/// Test that the session subcommands parse without arguments
#[test]
fn test_session_subcommands() {
    assert!(matches!(parse(&["logout"]).command, Commands::Logout));
    assert!(matches!(parse(&["whoami"]).command, Commands::Whoami));
    assert!(matches!(parse(&["health"]).command, Commands::Health));

    match parse(&["login", "--username", "alice", "--password", "pw"]).command {
        Commands::Login { username, password } => {
            assert_eq!(username.as_deref(), Some("alice"));
            assert_eq!(password.as_deref(), Some("pw"));
        }
        other => panic!("expected login, got {other:?}"),
    }
}

/// Test that global flags are accepted after the subcommand
#[test]
fn test_global_flags() {
    let cli = parse(&["whoami", "-v", "--api-url", "http://api.test/api"]);
    assert!(cli.verbose);
    assert_eq!(cli.api_url.as_deref(), Some("http://api.test/api"));
}

/// Test that serve overrides are optional
#[test]
fn test_serve_overrides() {
    match parse(&["serve", "--host", "0.0.0.0", "-p", "8080"]).command {
        Commands::Serve(command) => {
            assert_eq!(command.host.as_deref(), Some("0.0.0.0"));
            assert_eq!(command.port, Some(8080));
        }
        other => panic!("expected serve, got {other:?}"),
    }

    match parse(&["serve"]).command {
        Commands::Serve(command) => {
            assert!(command.host.is_none());
            assert!(command.port.is_none());
        }
        other => panic!("expected serve, got {other:?}"),
    }
}

/// Test that template creation applies defaults
#[test]
fn test_templates_create_defaults() {
    match parse(&["templates", "create", "--name", "Certificate"]).command {
        Commands::Templates {
            command:
                TemplatesCommand::Create {
                    name,
                    version,
                    template_type,
                    description,
                },
        } => {
            assert_eq!(name, "Certificate");
            assert_eq!(version, "1.0");
            assert_eq!(template_type, "official");
            assert!(description.is_none());
        }
        other => panic!("expected templates create, got {other:?}"),
    }

    assert!(matches!(
        parse(&["templates", "list"]).command,
        Commands::Templates { command: TemplatesCommand::List }
    ));
    assert!(matches!(
        parse(&["templates", "delete", "4", "--force"]).command,
        Commands::Templates { command: TemplatesCommand::Delete { force: true, .. } }
    ));
}

/// Test that repeated fields are parsed into rows
#[test]
fn test_pages_create_fields() {
    let cli = parse(&[
        "pages",
        "create",
        "1",
        "--name",
        "front",
        "--field",
        "full_name:Full name:required",
        "-f",
        "notes:Notes",
    ]);
    match cli.command {
        Commands::Pages {
            command: PagesCommand::Create {
                template,
                name,
                units,
                fields,
                ..
            },
        } => {
            assert_eq!(template, "1");
            assert_eq!(name, "front");
            assert_eq!(units, "mm");
            assert_eq!(fields.len(), 2);
            assert_eq!(fields[0].name, "full_name");
            assert!(fields[0].required);
            assert_eq!(fields[1].label, "Notes");
            assert!(!fields[1].required);
        }
        other => panic!("expected pages create, got {other:?}"),
    }
}

/// Test that a malformed field is rejected by the parser
#[test]
fn test_pages_create_rejects_bad_field() {
    let err = Cli::try_parse_from(["pagecraft", "pages", "create", "1", "-n", "front", "-f", "notes"])
        .unwrap_err();
    assert!(err.to_string().contains("name:Label"));
}

/// Test that a grant names either a user or a group
#[test]
fn test_permissions_add_target_conflict() {
    match parse(&["permissions", "add", "1", "--user", "7", "--type", "edit"]).command {
        Commands::Permissions {
            command:
                PermissionsCommand::Add {
                    permission_type,
                    user,
                    group,
                    ..
                },
        } => {
            assert_eq!(permission_type, "edit");
            assert_eq!(user.as_deref(), Some("7"));
            assert!(group.is_none());
        }
        other => panic!("expected permissions add, got {other:?}"),
    }

    assert!(Cli::try_parse_from(["pagecraft", "permissions", "add", "1", "-u", "7", "-g", "2"]).is_err());
}

/// Test that assets upload takes a path
#[test]
fn test_assets_upload() {
    let cli = parse(&["assets", "upload", "1", "front", "./logo.png"]);
    assert!(matches!(cli.command, Commands::Assets { .. }));
}

/// Test that generate collects `--set` assignments in order
#[test]
fn test_generate_assignments() {
    match parse(&["generate", "1", "--set", "full_name=Ada Lovelace", "-s", "note=a=b"]).command {
        Commands::Generate(command) => {
            assert_eq!(command.template, "1");
            assert!(!command.interactive);
            assert_eq!(
                command.values,
                vec![
                    ("full_name".to_string(), "Ada Lovelace".to_string()),
                    ("note".to_string(), "a=b".to_string()),
                ]
            );
        }
        other => panic!("expected generate, got {other:?}"),
    }
}

/// Test that an assignment without `=` or a name is refused
#[test]
fn test_generate_rejects_bad_assignment() {
    let err = Cli::try_parse_from(["pagecraft", "generate", "1", "--set", "title"]).unwrap_err();
    assert!(err.to_string().contains("name=value"));
    assert!(Cli::try_parse_from(["pagecraft", "generate", "1", "--set", "=x"]).is_err());
}

/// Test that a subcommand is required
#[test]
fn test_subcommand_required() {
    assert!(Cli::try_parse_from(["pagecraft"]).is_err());
    assert!(Cli::try_parse_from(["pagecraft", "frobnicate"]).is_err());
}
