use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the registry's format names; build scripts can't reach the library.
const OUTPUT_FORMATS: &[&str] = &["presentationml", "markdown", "entityjson", "entities"];
const INPUT_FORMATS: &[&str] = &["messageml", "presentationml", "markdown"];

fn input_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("input")
                .required(true)
                .index(1)
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .value_parser(clap::builder::PossibleValuesParser::new(INPUT_FORMATS)),
        )
        .arg(
            Arg::new("entity-json")
                .long("entity-json")
                .value_hint(ValueHint::FilePath),
        )
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("messageml")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert and validate MessageML messages")
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("users")
                .long("users")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            input_args(Command::new("convert"))
                .arg(
                    Arg::new("to")
                        .long("to")
                        .required(true)
                        .value_parser(clap::builder::PossibleValuesParser::new(OUTPUT_FORMATS)),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(input_args(Command::new("validate")))
        .subcommand(input_args(Command::new("telemetry")));

    generate_to(Bash, &mut cmd, "messageml", &outdir)?;
    generate_to(Zsh, &mut cmd, "messageml", &outdir)?;
    generate_to(Fish, &mut cmd, "messageml", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
