//! `arbor` command line tool
//!
//! ```text
//! arbor --store config/ set app:server.port 8080 --format xml
//! arbor --store config/ get app:server
//! arbor --store config/ convert app yaml
//! arbor --store config/ remove app
//! ```

mod commands;

use tracing_subscriber::EnvFilter;

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let matches = commands::cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    match commands::run(&matches) {
        Ok(output) => println!("{output}"),
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(1);
        }
    }
}
