use std::env;
use std::fs::File;

use yaml_stream::{
    decoder::{DecodingTrap, YamlDecoder},
    merge::MergingParser,
    schema::{CoreSchema, SchemaDecorator},
    Emitter, EmitterSettings, Event, Parser,
};

#[derive(Default)]
struct Options {
    canonical: bool,
    comments: bool,
    merge: bool,
    resolve: bool,
    lossy: bool,
    path: Option<String>,
}

const USAGE: &str =
    "usage: reemit [--canonical] [--comments] [--merge] [--resolve] [--lossy] <file>";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut options = Options::default();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--canonical" => options.canonical = true,
            "--comments" => options.comments = true,
            "--merge" => options.merge = true,
            "--resolve" => options.resolve = true,
            "--lossy" => options.lossy = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(());
            }
            _ => options.path = Some(arg),
        }
    }
    let path = options.path.as_deref().ok_or(USAGE)?;

    let mut decoder = YamlDecoder::read(File::open(path)?);
    if options.lossy {
        decoder.encoding_trap(DecodingTrap::Replace);
    }
    let source = decoder.decode()?;

    let parser = Parser::new_from_str(&source).retain_comments(options.comments);
    let events: Vec<Event> = if options.merge {
        MergingParser::new(parser).collect::<Result<_, _>>()?
    } else {
        parser.collect::<Result<_, _>>()?
    };

    let mut out = String::new();
    {
        let mut emitter = Emitter::with_settings(
            &mut out,
            EmitterSettings::default().with_canonical(options.canonical),
        )?;
        emitter.emit_comments(options.comments);
        if options.resolve {
            emitter.set_decorator(SchemaDecorator::new(CoreSchema));
        }
        for event in events {
            emitter.emit(event)?;
        }
    }
    print!("{out}");
    Ok(())
}
