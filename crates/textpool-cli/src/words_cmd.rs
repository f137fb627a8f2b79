use std::path::Path;

use textpool::Word;

use crate::cli::{OutputFormat, PageArgs};
use crate::shared::{csv_escape, extract_page, rotation_str};

pub fn run(file: &Path, format: &OutputFormat, args: &PageArgs) -> Result<(), i32> {
    let page = extract_page(file, args)?;
    let words = page.words();

    match format {
        OutputFormat::Text => {
            println!("text\tx0\ty0\tx1\ty1\tsize\trotation");
            for w in &words {
                println!(
                    "{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{}",
                    w.text,
                    w.bbox.x0,
                    w.bbox.y0,
                    w.bbox.x1,
                    w.bbox.y1,
                    w.font_size,
                    rotation_str(w.rotation),
                );
            }
        }
        OutputFormat::Json => write_json(&words)?,
        OutputFormat::Csv => {
            println!("text,x0,y0,x1,y1,size,rotation");
            for w in &words {
                println!(
                    "{},{:.2},{:.2},{:.2},{:.2},{:.2},{}",
                    csv_escape(&w.text),
                    w.bbox.x0,
                    w.bbox.y0,
                    w.bbox.x1,
                    w.bbox.y1,
                    w.font_size,
                    rotation_str(w.rotation),
                );
            }
        }
    }
    Ok(())
}

fn write_json(words: &[Word]) -> Result<(), i32> {
    let rows: Vec<serde_json::Value> = words
        .iter()
        .map(|w| {
            serde_json::json!({
                "text": w.text,
                "x0": w.bbox.x0,
                "y0": w.bbox.y0,
                "x1": w.bbox.x1,
                "y1": w.bbox.y1,
                "base": w.base,
                "size": w.font_size,
                "rotation": rotation_str(w.rotation),
                "writing_mode": w.writing_mode,
            })
        })
        .collect();
    let out = serde_json::to_string_pretty(&rows).map_err(|e| {
        eprintln!("Error: failed to serialize words: {e}");
        1
    })?;
    println!("{out}");
    Ok(())
}
