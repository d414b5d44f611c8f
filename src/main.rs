use std::env;
use huffman::Config;
use huffman::run;

fn main() {
    env_logger::init();

    let config = Config::build(env::args())
        .unwrap_or_else(|err| {
            eprintln!("Problem parsing arguments: {}", err);
            eprintln!("Usage: huffman <huff|puff> <input-path> <output-path>");
            std::process::exit(1);
        });

    if let Err(err) = run(config) {
        eprintln!("Application error: {}", err);
        std::process::exit(1);
    }
}
