//! Command-line marker editor.
//!
//! # Responsibility
//! - Drive the marker store end-to-end against a SQLite slot database.
//! - Play both editor roles: map-style `add` and list-style browse/edit.
//!
//! Usage: `geonote [--log-dir <abs-dir>] <db-path> <command> [args...]`

use geonote_core::{
    core_version, init_logging, Coordinate, LogConfig, Marker, MarkerId, MarkerStore,
    SqliteKeyValueStore, StoreError,
};
use std::process::ExitCode;

const USAGE: &str = "usage: geonote [--log-dir <abs-dir>] <db-path> <command>

commands:
  list
  add <latitude> <longitude> <title> <description>
  show <id>
  edit <id> <title> <description>
  remove <id>
  clear
  version";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &[String]) -> Result<(), String> {
    let args = match args {
        [flag, dir, rest @ ..] if flag == "--log-dir" => {
            init_logging(&LogConfig::new(dir)).map_err(|err| err.to_string())?;
            rest
        }
        _ => args,
    };

    if let [command] = args {
        if command == "version" {
            println!("geonote_core version={}", core_version());
            return Ok(());
        }
    }

    let [db_path, command, params @ ..] = args else {
        return Err(USAGE.to_string());
    };

    let storage = SqliteKeyValueStore::open(db_path).map_err(|err| err.to_string())?;
    let store = MarkerStore::new(storage);
    match store.load().await {
        Ok(_) => {}
        Err(err) if err.is_malformed_payload() => {
            eprintln!("warning: {err}; starting with an empty marker list");
        }
        Err(err) => return Err(err.to_string()),
    }

    match (command.as_str(), params) {
        ("list", []) => {
            for marker in store.markers().await {
                print_marker(&marker);
            }
        }
        ("add", [latitude, longitude, title, description]) => {
            let coordinate = Coordinate::new(parse_float(latitude)?, parse_float(longitude)?);
            let marker = store
                .create(coordinate, title, description)
                .await
                .map_err(describe)?;
            print_marker(&marker);
        }
        ("show", [id]) => {
            let id = parse_id(id)?;
            let marker = store
                .find(id)
                .await
                .ok_or_else(|| describe(StoreError::NotFound(id)))?;
            print_marker(&marker);
        }
        ("edit", [id, title, description]) => {
            let marker = store
                .update(parse_id(id)?, title, description)
                .await
                .map_err(describe)?;
            print_marker(&marker);
        }
        ("remove", [id]) => {
            let remaining = store.delete(parse_id(id)?).await.map_err(describe)?;
            println!("{} marker(s) left", remaining.len());
        }
        ("clear", []) => {
            store.clear().await.map_err(describe)?;
            println!("all markers removed");
        }
        _ => return Err(USAGE.to_string()),
    }

    Ok(())
}

fn print_marker(marker: &Marker) {
    println!(
        "{}\t{:.6},{:.6}\t{}\t{}",
        marker.id,
        marker.coordinate.latitude,
        marker.coordinate.longitude,
        marker.title,
        marker.description
    );
}

fn describe(err: StoreError) -> String {
    match err {
        StoreError::Validation(reason) => reason.to_string(),
        StoreError::NotFound(id) => format!("no marker with id {id}; run `list` to refresh"),
        other => format!("error: {other}"),
    }
}

fn parse_id(value: &str) -> Result<MarkerId, String> {
    value
        .parse()
        .map_err(|_| format!("invalid marker id `{value}`"))
}

fn parse_float(value: &str) -> Result<f64, String> {
    value
        .parse()
        .map_err(|_| format!("invalid coordinate component `{value}`"))
}
