// Example walking every token of a document fed in small chunks

use jsonscan::{ChunkReader, Config, Kind, ParseError, Scanner};

fn main() -> Result<(), ParseError<core::convert::Infallible>> {
    println!("🚀 Scanner Demo with ChunkReader");
    println!("================================");

    let json = br#"{"name": "hello\nworld", "items": [1, 2.5, true, null], "count": 42}"#;
    println!("📄 Input JSON: {}", String::from_utf8_lossy(json));
    println!("📏 Total size: {} bytes", json.len());
    println!();

    // 8 bytes per read simulates small network packets
    let reader = ChunkReader::new(json, 8);
    let config = Config {
        initial_capacity: 16,
        min_read: 8,
        multiple_documents: false,
    };
    let mut scanner = Scanner::with_config(reader, config);

    let mut token_count = 0;
    while scanner.scan() {
        token_count += 1;
        let indent = "  ".repeat(scanner.nesting_level());
        if let Some(name) = scanner.name_str() {
            println!("{}🔑 {}:", indent, name);
        }
        match scanner.kind() {
            Some(Kind::ObjectStart) => println!("{}🏁 ObjectStart", indent),
            Some(Kind::ArrayStart) => println!("{}📋 ArrayStart", indent),
            Some(Kind::End) => println!("{}🔚 End", indent),
            Some(Kind::String) => println!("{}📝 String: {:?}", indent, scanner.value_str()),
            Some(Kind::Number) => {
                let number = scanner.number();
                println!(
                    "{}🔢 Number: {:?} (int: {:?}, float: {:?})",
                    indent,
                    number.map(|n| n.as_str()),
                    number.and_then(|n| n.as_i64()),
                    number.and_then(|n| n.as_f64())
                );
            }
            Some(Kind::Bool) => println!("{}✅ Bool: {}", indent, scanner.bool_value()),
            Some(Kind::Null) => println!("{}⭕ Null", indent),
            None => {}
        }
    }

    if let Some(err) = scanner.into_error() {
        println!("❌ {}", err);
        return Err(err);
    }
    println!();
    println!("✅ Scanned {} tokens", token_count);
    Ok(())
}
