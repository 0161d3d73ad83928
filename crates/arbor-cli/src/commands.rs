//! Command definitions and dispatch

use anyhow::{bail, Context, Result};
use arbor_collection::Value;
use arbor_path::{ParsedIndex, DEFAULT_KEY_SEPARATOR};
use arbor_persist::{PersistConfig, PersistentStore, DEFAULT_EXTENSIONS};
use arbor_store::PathStore;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

pub(crate) fn cli() -> Command {
    Command::new("arbor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Read and write path-addressed settings files")
        .subcommand_required(true)
        .arg(
            Arg::new("store")
                .long("store")
                .short('s')
                .global(true)
                .default_value("./")
                .value_parser(value_parser!(PathBuf))
                .help("Store directory (trailing '/') or file stem"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity"),
        )
        .subcommand(
            Command::new("get")
                .about("Print the value at an address as JSON")
                .arg(Arg::new("address").required(true).help("Address, e.g. app:server.port")),
        )
        .subcommand(
            Command::new("set")
                .about("Assign a value and save its namespace")
                .arg(Arg::new("address").required(true))
                .arg(
                    Arg::new("value")
                        .required(true)
                        .help("JSON value; anything unparsable is stored as text"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .value_parser(DEFAULT_EXTENSIONS)
                        .help("Format to save in (defaults to the current one)"),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Rewrite a namespace in another format")
                .arg(Arg::new("namespace").required(true))
                .arg(
                    Arg::new("format")
                        .required(true)
                        .value_parser(DEFAULT_EXTENSIONS),
                ),
        )
        .subcommand(
            Command::new("remove")
                .about("Delete a namespace file")
                .arg(Arg::new("namespace").required(true)),
        )
}

fn open(matches: &ArgMatches) -> Result<PersistentStore> {
    let path = matches
        .get_one::<PathBuf>("store")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("./"));
    PersistentStore::new(PersistConfig::new(&path))
        .with_context(|| format!("cannot open store at {}", path.display()))
}

/// Namespace argument as seen by load/save (single-file stores ignore it)
fn file_namespace<'a>(store: &PersistentStore, namespace: &'a str) -> Option<&'a str> {
    store.is_directory_store().then_some(namespace)
}

fn checked(store: &PersistentStore, ok: bool, action: &str) -> Result<()> {
    if ok {
        return Ok(());
    }
    match store.last_error() {
        Some(error) => bail!("{action} failed: {error}"),
        None => bail!("{action} failed"),
    }
}

fn get(store: &mut PersistentStore, args: &ArgMatches) -> Result<String> {
    let address = required(args, "address")?;
    let value = store.get(address);
    if let Some(error) = store.last_error() {
        bail!("load failed: {error}");
    }
    let value = value.with_context(|| format!("no value at {address}"))?;
    Ok(serde_json::to_string_pretty(&value.to_json())?)
}

fn set(store: &mut PersistentStore, args: &ArgMatches) -> Result<String> {
    let address = required(args, "address")?;
    let raw = required(args, "value")?;
    let value = serde_json::from_str::<serde_json::Value>(raw)
        .map_or_else(|_| Value::from(raw), Value::from);

    let index = ParsedIndex::parse(address, None, DEFAULT_KEY_SEPARATOR);
    let namespace = index.namespace.clone().unwrap_or_default();
    if store.is_directory_store() && namespace.is_empty() {
        bail!("address {address:?} needs a namespace in a directory store");
    }

    store.set(address, value);
    let format = args.get_one::<String>("format").map(String::as_str);
    let ok = store.save(file_namespace(store, &namespace), format);
    checked(store, ok, "save")?;
    Ok(format!("saved {address}"))
}

fn convert(store: &mut PersistentStore, args: &ArgMatches) -> Result<String> {
    let namespace = required(args, "namespace")?;
    let format = required(args, "format")?;
    let target = file_namespace(store, namespace);

    let ok = store.load(target);
    checked(store, ok, "load")?;
    if store.search_file(target).is_none() {
        bail!("nothing stored for {namespace}");
    }
    let ok = store.save(target, Some(format));
    checked(store, ok, "save")?;
    tracing::info!(namespace, format, "namespace converted");
    Ok(format!("converted {namespace} to {format}"))
}

fn remove(store: &mut PersistentStore, args: &ArgMatches) -> Result<String> {
    let namespace = required(args, "namespace")?;
    let target = file_namespace(store, namespace);
    let ok = store.remove(target);
    checked(store, ok, "remove")?;
    Ok(format!("removed {namespace}"))
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing argument {name}"))
}

/// Run the selected subcommand, returning what to print
pub(crate) fn run(matches: &ArgMatches) -> Result<String> {
    let mut store = open(matches)?;
    let Some((command, args)) = matches.subcommand() else {
        bail!("unknown command");
    };
    tracing::debug!(
        command,
        directory = %store.directory().display(),
        "dispatching command"
    );
    match command {
        "get" => get(&mut store, args),
        "set" => set(&mut store, args),
        "convert" => convert(&mut store, args),
        "remove" => remove(&mut store, args),
        _ => bail!("unknown command {command}"),
    }
}
