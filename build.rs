// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn root_arg() -> Arg {
    Arg::new("root")
        .short('r')
        .long("root")
        .value_name("PATH")
        .env("DEBINDEX_ROOT")
        .help("Repository root (default: current directory)")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print machine-readable JSON instead of text")
}

fn build_cli() -> Command {
    Command::new("debindex")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Debindex Contributors")
        .about("Regenerate Packages and refresh Release hashes for flat Debian repositories")
        .subcommand_required(false)
        .subcommand(
            Command::new("update")
                .about("Regenerate Packages, its compressed forms, and Release checksums")
                .arg(root_arg())
                .arg(json_arg())
                .arg(
                    Arg::new("debs_dir")
                        .short('d')
                        .long("debs-dir")
                        .value_name("DIR")
                        .env("DEBINDEX_DEBS_DIR")
                        .default_value("debs")
                        .help("Directory holding the .deb archives, relative to the root"),
                )
                .arg(
                    Arg::new("compress")
                        .short('c')
                        .long("compress")
                        .value_delimiter(',')
                        .help("Extra compressed forms of Packages to write next to Packages.bz2 (gzip, xz, zstd)"),
                )
                .arg(
                    Arg::new("sha256")
                        .long("sha256")
                        .action(ArgAction::SetTrue)
                        .help("Also write SHA256 fields and a Release SHA256 section"),
                )
                .arg(
                    Arg::new("touch_date")
                        .long("touch-date")
                        .action(ArgAction::SetTrue)
                        .help("Set the Release Date field to the current time"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Verify Packages and Release against the files on disk")
                .arg(root_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "elvish", "fish", "powershell", "zsh"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory
    let out_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();
    man.render(&mut buffer).expect("Failed to render man page");

    let man_path = man_dir.join("debindex.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");
}
