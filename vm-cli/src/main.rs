#[macro_use]
extern crate clap;

use clap::Arg;
use std::path::PathBuf;
use std::process;

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the source file to run")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("memory")
                .short("m")
                .long("memory")
                .takes_value(true)
                .value_name("BYTES")
                .default_value("2097152")
                .required(false)
                .help("Sets the size of linear memory, in bytes"),
        )
        .get_matches();

    let input = PathBuf::from(matches.value_of("INPUT").unwrap());
    let memory_size = match value_t!(matches.value_of("memory"), u32) {
        Ok(size) => size,
        Err(err) => err.exit(),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Err(err) = vm_cli::run(&input, memory_size, &mut out) {
        eprintln!("{}", err);
        process::exit(err.exit_code());
    }
}
