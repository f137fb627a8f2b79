use std::path::Path;

use textpool::{PositionedChar, textpool_parse};

use crate::cli::{OutputFormat, PageArgs};
use crate::shared::{csv_escape, geometry, load_fonts, load_options, read_content, rotation_str};

/// Glyphs as positioned by the interpreter, before word building.
fn extract_chars(file: &Path, args: &PageArgs) -> Result<Vec<PositionedChar>, i32> {
    let options = load_options(args)?;
    let fonts = load_fonts(args)?;
    let geometry = geometry(args)?;
    let ops = textpool::tokenize(&read_content(file)?).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;

    let mut handler = textpool::CollectingHandler::new();
    textpool_parse::interpret(&ops, &fonts, &geometry, options.unicode_norm, &mut handler);
    for warning in &handler.warnings {
        tracing::info!(code = %warning.code, "{warning}");
    }
    Ok(handler.chars)
}

pub fn run(file: &Path, format: &OutputFormat, args: &PageArgs) -> Result<(), i32> {
    let chars = extract_chars(file, args)?;

    match format {
        OutputFormat::Text => {
            println!("char\tx\ty\tdx\tdy\tsize\trotation\tfont");
            for c in &chars {
                println!(
                    "{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{}\t{}",
                    c.unicode,
                    c.x,
                    c.y,
                    c.dx,
                    c.dy,
                    c.font_size,
                    rotation_str(c.rotation),
                    c.font_name,
                );
            }
        }
        OutputFormat::Json => {
            let out = serde_json::to_string_pretty(&chars).map_err(|e| {
                eprintln!("Error: failed to serialize chars: {e}");
                1
            })?;
            println!("{out}");
        }
        OutputFormat::Csv => {
            println!("char,x,y,dx,dy,size,rotation,font");
            for c in &chars {
                println!(
                    "{},{:.2},{:.2},{:.2},{:.2},{:.2},{},{}",
                    csv_escape(&c.unicode.to_string()),
                    c.x,
                    c.y,
                    c.dx,
                    c.dy,
                    c.font_size,
                    rotation_str(c.rotation),
                    csv_escape(&c.font_name),
                );
            }
        }
    }
    Ok(())
}
