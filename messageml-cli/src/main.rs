// Command-line interface for MessageML
//
// Converts messages between the authoring dialect and the artifacts derived
// from it, validates them, and reports their usage telemetry.
//
// Usage:
//  messageml <input> --to <format> [--from <format>] [--entity-json FILE] [-o FILE]
//  messageml convert <input> --to <format> ...      - Same as above (explicit)
//  messageml validate <input> [--from <format>] [--entity-json FILE]
//  messageml telemetry <input> [--from <format>] [--entity-json FILE]
//  messageml --list-formats
//
// The source format is detected from the file extension (.mml, .pml, .md)
// unless --from is given. Mentions resolve against the users listed in the
// JSON file passed with --users.

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use flexi_logger::{Logger, LoggerHandle};
use log::debug;
use messageml_config::{Loader, MessageMLConfig};
use messageml_utils::formats::{EntityJsonFormat, LegacyEntitiesFormat, PresentationMlFormat};
use messageml_utils::{
    DefaultIdAllocator, EntitySchemas, FormatRegistry, InputFormat, MessageMLContext, ParseContext,
    ParseOptions, StaticUserDirectory, UserPresentation,
};
use serde_json::{Map, Value};
use std::fs;

const SUBCOMMANDS: &[&str] = &["convert", "validate", "telemetry", "help"];
const INPUT_FORMATS: &[&str] = &["messageml", "presentationml", "markdown"];
const OUTPUT_FORMATS: &[&str] = &["presentationml", "markdown", "entityjson", "entities"];

fn input_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("input")
                .help("Input file path")
                .required(true)
                .index(1)
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .help("Source format (auto-detected from file extension if not specified)")
                .value_parser(clap::builder::PossibleValuesParser::new(INPUT_FORMATS))
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("entity-json")
                .long("entity-json")
                .value_name("FILE")
                .help("Entity JSON the message's entity references resolve against")
                .value_hint(ValueHint::FilePath),
        )
}

fn build_cli() -> Command {
    Command::new("messageml")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert and validate MessageML messages")
        .long_about(
            "messageml parses a MessageML, PresentationML or Markdown message and\n\
            renders the artifacts derived from it.\n\n\
            Commands:\n  \
            - convert:   Render PresentationML, Markdown, entity JSON or legacy entities\n  \
            - validate:  Check a message and print OK or the first violation\n  \
            - telemetry: Print the usage telemetry collected for a message\n\n\
            Examples:\n  \
            messageml hello.mml --to presentationml      # 'convert' is optional\n  \
            messageml hello.mml --to entityjson -o e.json\n  \
            messageml validate message.pml --entity-json entities.json",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a messageml.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("users")
                .long("users")
                .value_name("FILE")
                .help("JSON array of users that mentions resolve against")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase log output on stderr (repeatable)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            input_args(Command::new("convert").about("Convert a message (default command)"))
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true)
                        .value_parser(clap::builder::PossibleValuesParser::new(OUTPUT_FORMATS))
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(input_args(Command::new("validate").about("Validate a message")))
        .subcommand(input_args(
            Command::new("telemetry").about("Print the telemetry collected for a message"),
        ))
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&args) {
        Ok(m) => m,
        Err(e) => {
            // A bare file argument means the default `convert` command.
            if args.len() > 1 && !args[1].starts_with('-') && !SUBCOMMANDS.contains(&args[1].as_str()) {
                let mut new_args = vec![args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&args[1..]);
                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    let _logger = init_logging(matches.get_count("verbose"));

    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return;
    }

    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    let users = load_users(matches.get_one::<String>("users").map(|s| s.as_str()));

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = Input::from_matches(sub_matches);
            let to = sub_matches
                .get_one::<String>("to")
                .expect("to is required");
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(&input, to, output, &config, &users);
        }
        Some(("validate", sub_matches)) => {
            handle_validate_command(&Input::from_matches(sub_matches), &config, &users);
        }
        Some(("telemetry", sub_matches)) => {
            handle_telemetry_command(&Input::from_matches(sub_matches), &config, users);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

/// Warnings by default; each `-v` raises the level. `RUST_LOG` wins when set.
fn init_logging(verbosity: u8) -> Option<LoggerHandle> {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    match Logger::try_with_env_or_str(level).and_then(|logger| logger.log_to_stderr().start()) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("Failed to start logger: {err}");
            None
        }
    }
}

/// The message positional plus the options every command shares
struct Input {
    path: String,
    from: String,
    entity_json: Option<String>,
}

impl Input {
    fn from_matches(matches: &ArgMatches) -> Self {
        let path = matches
            .get_one::<String>("input")
            .expect("input is required")
            .to_string();
        let from = match matches.get_one::<String>("from") {
            Some(from) => from.to_string(),
            None => {
                let registry = FormatRegistry::default();
                match registry.detect_format_from_filename(&path) {
                    Some(detected) => detected,
                    None => {
                        eprintln!("Error: Could not detect format from filename '{path}'");
                        eprintln!("Please specify --from explicitly");
                        std::process::exit(1);
                    }
                }
            }
        };
        Input {
            path,
            from,
            entity_json: matches.get_one::<String>("entity-json").cloned(),
        }
    }

    fn source(&self) -> String {
        read_file(&self.path)
    }

    fn entity_json_source(&self) -> Option<String> {
        self.entity_json.as_deref().map(read_file)
    }

    fn entity_json(&self) -> Map<String, Value> {
        let Some(raw) = self.entity_json_source() else {
            return Map::new();
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => fail("the entity JSON must be a JSON object"),
            Err(e) => fail(&format!("Error parsing EntityJSON: {e}")),
        }
    }

    fn parse_options(&self, config: &MessageMLConfig) -> ParseOptions {
        let mut options = config.parse_options();
        if let Some(format) = InputFormat::from_name(&self.from) {
            options.input_format = format;
        }
        options
    }
}

fn handle_convert_command(
    input: &Input,
    to: &str,
    output: Option<&str>,
    config: &MessageMLConfig,
    users: &StaticUserDirectory,
) {
    let registry = registry_from_config(config);
    if let Err(e) = registry.get(to) {
        fail(&e.to_string());
    }

    let options = input.parse_options(config);
    let tree = parse_input(&registry, input, &options, users);
    let result = registry.serialize(&tree, to).unwrap_or_else(|e| fail(&e.to_string()));

    match output {
        Some(path) => {
            fs::write(path, result).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
        }
        None => print!("{result}"),
    }
}

fn handle_validate_command(input: &Input, config: &MessageMLConfig, users: &StaticUserDirectory) {
    let registry = registry_from_config(config);
    let options = input.parse_options(config);
    parse_input(&registry, input, &options, users);
    println!("OK");
}

fn handle_telemetry_command(input: &Input, config: &MessageMLConfig, users: StaticUserDirectory) {
    let source = input.source();
    let entity_json = input.entity_json_source();
    let mut ctx = MessageMLContext::new(input.parse_options(config)).with_users(users);
    ctx.parse_messageml(&source, entity_json.as_deref())
        .unwrap_or_else(|e| fail(&e.to_string()));
    let items = serde_json::to_string_pretty(ctx.telemetry().items())
        .unwrap_or_else(|e| fail(&e.to_string()));
    println!("{items}");
}

fn handle_list_formats_command() {
    let registry = FormatRegistry::default();
    println!("Available formats:\n");
    for name in registry.list_formats() {
        if let Ok(format) = registry.get(&name) {
            let direction = match (format.supports_parsing(), format.supports_serialization()) {
                (true, true) => "in/out",
                (true, false) => "in",
                _ => "out",
            };
            println!("  {name:<16}{direction:<8}{}", format.description());
        }
    }
}

fn parse_input(
    registry: &FormatRegistry,
    input: &Input,
    options: &ParseOptions,
    users: &StaticUserDirectory,
) -> messageml_utils::Tree {
    let source = input.source();
    let entity_json = input.entity_json();
    let schemas = EntitySchemas::new();
    let mut allocator = DefaultIdAllocator::new();
    let mut ctx = ParseContext {
        options,
        entity_json: &entity_json,
        allocator: &mut allocator,
        users,
        schemas: &schemas,
    };
    debug!("parsing '{}' as {}", input.path, input.from);
    registry
        .parse(&source, &input.from, &mut ctx)
        .unwrap_or_else(|e| fail(&e.to_string()))
}

fn registry_from_config(config: &MessageMLConfig) -> FormatRegistry {
    let pretty = config.output.pretty_json;
    let mut registry = FormatRegistry::default();
    registry.register(PresentationMlFormat::new(
        config.parser.presentationml_version.clone(),
    ));
    registry.register(EntityJsonFormat { pretty });
    registry.register(LegacyEntitiesFormat { pretty });
    registry
}

fn load_cli_config(explicit_path: Option<&str>) -> MessageMLConfig {
    let loader = Loader::new().with_optional_file("messageml.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

fn load_users(path: Option<&str>) -> StaticUserDirectory {
    let mut directory = StaticUserDirectory::new();
    let Some(path) = path else {
        return directory;
    };
    let users: Vec<UserPresentation> = serde_json::from_str(&read_file(path))
        .unwrap_or_else(|e| fail(&format!("Error parsing users file '{path}': {e}")));
    for user in users {
        directory.insert(user);
    }
    directory
}

fn read_file(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    })
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}
