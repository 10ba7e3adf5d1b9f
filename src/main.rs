//! Punto de entrada ("driver").
//!
//! Este módulo expone una CLI sobre [`triangle::driver`], el cual
//! orquesta las diferentes fases del proceso de compilación.

use anyhow::{self, Context};
use clap::{self, crate_version, Arg, Command};
use triangle::driver::{self, Options};

use std::path::Path;

fn main() -> anyhow::Result<()> {
    // Parsing de CLI
    let args = Command::new("Triangle compiler")
        .version(crate_version!())
        .arg(
            Arg::new("source")
                .value_name("SOURCE")
                .required(true)
                .help("Source program"),
        )
        .arg(
            Arg::new("objectName")
                .short('o')
                .long("objectName")
                .value_name("FILE")
                .takes_value(true)
                .default_value("obj.tam")
                .help("The filename for the object program"),
        )
        .arg(
            Arg::new("showTree")
                .long("showTree")
                .help("Show the AST after contextual analysis"),
        )
        .arg(
            Arg::new("folding")
                .long("folding")
                .help("Enable constant folding optimisation"),
        )
        .arg(
            Arg::new("showTreeAfter")
                .long("showTreeAfter")
                .help("Show the AST after folding is complete"),
        )
        .arg(
            Arg::new("showStats")
                .long("showStats")
                .help("Show summary statistics of the program"),
        )
        .arg(
            Arg::new("failFast")
                .long("failFast")
                .help("Stop reporting after the first error"),
        )
        .get_matches();

    let source = args.value_of("source").context("No source file given")?;
    let object = args.value_of("objectName").unwrap_or("obj.tam");

    let flags = [
        ("folding", Options::FOLD),
        ("showTree", Options::SHOW_TREE),
        ("showTreeAfter", Options::SHOW_TREE_AFTER),
        ("showStats", Options::SHOW_STATS),
        ("failFast", Options::FAIL_FAST),
    ];

    let mut options = Options::empty();
    for (name, flag) in flags {
        if args.is_present(name) {
            options |= flag;
        }
    }

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    let successful = driver::run(Path::new(source), Path::new(object), options, &mut stdout)?;

    // Mostrar árboles es uso interactivo, el código de salida no importa
    let interactive = options.intersects(Options::SHOW_TREE | Options::SHOW_TREE_AFTER);
    if !successful && !interactive {
        std::process::exit(1);
    }

    Ok(())
}
