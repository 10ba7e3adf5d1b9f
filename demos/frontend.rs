use std::io::Read;

use triangle::{error::Reporter, lex::Scanner, parse, semantic, source::Source, tree};

fn main() -> std::io::Result<()> {
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;

    let source = Source::new("<stdin>", text);
    let mut reporter = Reporter::default();

    println!("Tokens:");
    for token in Scanner::new(source.cursor(), &mut reporter) {
        println!("  {:<24} {}", token.location().to_string(), token.val());
    }

    println!();

    // El escaneo se repite dentro del parser, con un reporter limpio
    let mut reporter = Reporter::default();
    let program = parse::parse(&source, &mut reporter);

    let annotations = if reporter.errors() == 0 {
        Some(semantic::check(&program, &mut reporter))
    } else {
        None
    };

    print!("{}", tree::render(&program, annotations.as_ref()));
    eprint!("{}", reporter);

    Ok(())
}
