// Copies a stream of JSON documents from stdin to stdout without whitespace,
// one document per line.
//
//     echo '{"a": [1, 2]} [true]' | cargo run --example compact

use std::io::{self, Write};

use jsonscan::{Config, IoReader, Scanner, Writer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let config = Config {
        multiple_documents: true,
        ..Config::default()
    };
    let mut scanner = Scanner::with_config(IoReader::new(stdin.lock()), config);
    let mut writer = Writer::new(io::stdout().lock());

    while scanner.scan() {
        writer.write_token(&mut scanner)?;
        if writer.depth() == 0 {
            let mut out = writer.into_inner();
            out.write_all(b"\n")?;
            writer = Writer::new(out);
        }
    }

    match scanner.into_error() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
