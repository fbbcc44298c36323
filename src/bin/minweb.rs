//! Command-line interface for minweb
//!
//! Usage:
//!   minweb tangle `<path>` [-o `<file>`] [-r `<root>`]      - Expand a macro into source code
//!   minweb list-files `<path>`                            - List the FILE macros
//!   minweb list-sections `<path>`                         - List the SECTION macros
//!   minweb extract `<path>` -S `<section>` [-o `<file>`]    - Write a section's assignments
//!   minweb trace `<path>`                                 - Print the event trace
//!   minweb tokens `<path>` [--format json|simple]         - Dump the token stream
//!
//! Every subcommand accepts `-I <dir>` (repeatable) to add include directories and
//! `--config <file>` to layer a configuration file over the defaults. Data goes to stdout;
//! progress and errors go to stderr.

use clap::{Arg, ArgAction, ArgMatches, Command};
use config::ConfigError;
use minweb::minweb::config::{Loader, MinwebConfig};
use minweb::minweb::includes::IncludePolicy;
use minweb::minweb::lexing::Token;
use minweb::minweb::loader::DocumentLoader;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

fn path_arg() -> Arg {
    Arg::new("path")
        .help("Path to the minweb document")
        .required(true)
        .index(1)
}

fn output_arg() -> Arg {
    Arg::new("output")
        .long("output")
        .short('o')
        .help("Output file, '-' for stdout")
}

fn cli() -> Command {
    Command::new("minweb")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A literate-programming macro processor")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("include")
                .long("include")
                .short('I')
                .help("Directory searched for included documents (repeatable)")
                .action(ArgAction::Append)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Configuration file layered over the defaults")
                .global(true),
        )
        .arg(
            Arg::new("policy")
                .long("policy")
                .help("Include policy")
                .value_parser(["first-match", "every-match"])
                .global(true),
        )
        .subcommand(
            Command::new("tangle")
                .about("Expand a root macro into its source code")
                .arg(path_arg())
                .arg(output_arg())
                .arg(
                    Arg::new("root")
                        .long("root")
                        .short('r')
                        .help("Macro to expand; also names the output file when -o is absent"),
                ),
        )
        .subcommand(
            Command::new("list-files")
                .about("List the FILE macros of a document")
                .arg(path_arg()),
        )
        .subcommand(
            Command::new("list-sections")
                .about("List the SECTION macros of a document")
                .arg(path_arg()),
        )
        .subcommand(
            Command::new("extract")
                .about("Write the key=value assignments of a section")
                .arg(path_arg())
                .arg(
                    Arg::new("section")
                        .long("section")
                        .short('S')
                        .help("Name of the section to extract")
                        .required(true),
                )
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("trace")
                .about("Print every processor event")
                .arg(path_arg()),
        )
        .subcommand(
            Command::new("tokens")
                .about("Dump the token stream of a document")
                .arg(path_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Token dump format")
                        .value_parser(["json", "simple"])
                        .default_value("simple"),
                ),
        )
}

fn main() {
    let matches = cli().get_matches();
    let Some((name, sub_matches)) = matches.subcommand() else {
        unreachable!("a subcommand is required");
    };

    let config = load_config(sub_matches).unwrap_or_else(|e| fail(e));
    let loader = document_loader(sub_matches, &config);

    match name {
        "tangle" => handle_tangle_command(sub_matches, &loader),
        "list-files" => handle_list_command(loader.list_files()),
        "list-sections" => handle_list_command(loader.list_sections()),
        "extract" => handle_extract_command(sub_matches, &loader, &config),
        "trace" => print!("{}", loader.trace().unwrap_or_else(|e| fail(e))),
        "tokens" => handle_tokens_command(sub_matches, &loader),
        _ => unreachable!(),
    }
}

fn fail(error: impl Display) -> ! {
    eprintln!("Error: {}", error);
    std::process::exit(1);
}

fn string_arg<'a>(matches: &'a ArgMatches, id: &str) -> Option<&'a str> {
    matches.get_one::<String>(id).map(String::as_str)
}

/// Defaults, then `--config` or a local `minweb.toml`, then flags.
fn load_config(matches: &ArgMatches) -> Result<MinwebConfig, ConfigError> {
    let mut loader = match string_arg(matches, "config") {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new().discover_in("."),
    };
    if let Some(policy) = string_arg(matches, "policy").and_then(IncludePolicy::from_name) {
        loader = loader.with_policy(policy);
    }
    loader.build()
}

fn document_loader(matches: &ArgMatches, config: &MinwebConfig) -> DocumentLoader {
    let path = string_arg(matches, "path").unwrap_or_default();
    let mut loader = DocumentLoader::from_path(path);
    for dir in matches.get_many::<String>("include").into_iter().flatten() {
        loader = loader.with_search_path(dir);
    }
    loader.with_config(config)
}

/// Write `contents` to `output`, or to stdout for `-`.
fn write_output(output: &Path, contents: &str) {
    if output == Path::new("-") {
        print!("{}", contents);
        return;
    }
    eprintln!("Writing to output '{}'", output.display());
    if let Err(e) = fs::write(output, contents) {
        fail(format!(
            "file '{}' could not be opened: {}",
            output.display(),
            e
        ));
    }
}

fn handle_tangle_command(matches: &ArgMatches, loader: &DocumentLoader) {
    let root = string_arg(matches, "root");
    let code = loader.tangle(root).unwrap_or_else(|e| fail(e));
    match (string_arg(matches, "output"), root) {
        (Some(output), _) => write_output(Path::new(output), &code),
        (None, Some(root)) => write_output(Path::new(root), &code),
        (None, None) => print!("{}", code),
    }
}

fn handle_list_command<E: Display>(names: Result<Vec<String>, E>) {
    for name in names.unwrap_or_else(|e| fail(e)) {
        println!("{}", name);
    }
}

fn handle_extract_command(matches: &ArgMatches, loader: &DocumentLoader, config: &MinwebConfig) {
    let section = string_arg(matches, "section").unwrap_or_default();
    let assignments = loader.extract(section).unwrap_or_else(|e| fail(e));
    let output = match string_arg(matches, "output") {
        Some(output) => PathBuf::from(output),
        None => config.extract.default_output(section),
    };
    write_output(&output, &assignments);
}

fn handle_tokens_command(matches: &ArgMatches, loader: &DocumentLoader) {
    let tokens = loader.tokens().unwrap_or_else(|e| fail(e));
    match string_arg(matches, "format") {
        Some("json") => {
            let json = serde_json::to_string_pretty(&tokens).unwrap_or_else(|e| fail(e));
            println!("{}", json);
        }
        _ => {
            for token in &tokens {
                println!("{}", simple_token(token));
            }
        }
    }
}

fn simple_token(token: &Token) -> String {
    format!("{} {} {:?}", token.position, token.kind, token.text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn test_global_include_args_reach_subcommands() {
        let matches = cli()
            .try_get_matches_from(["minweb", "list-files", "-I", "a", "doc.mw", "-I", "b"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        let dirs: Vec<&String> = sub.get_many::<String>("include").unwrap().collect();
        assert_eq!(dirs, vec!["a", "b"]);
    }

    #[test]
    fn test_extract_requires_section() {
        assert!(cli()
            .try_get_matches_from(["minweb", "extract", "doc.mw"])
            .is_err());
    }
}
