use std::path::Path;

use textpool::SearchOptions;

use crate::cli::{OutputFormat, PageArgs};
use crate::shared::{csv_escape, extract_page};

pub fn run(
    file: &Path,
    pattern: &str,
    literal: bool,
    ignore_case: bool,
    format: &OutputFormat,
    args: &PageArgs,
) -> Result<(), i32> {
    let page = extract_page(file, args)?;
    let opts = SearchOptions {
        regex: !literal,
        case_sensitive: !ignore_case,
    };
    let matches = page.search(pattern, &opts).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;

    match format {
        OutputFormat::Text => {
            println!("text\tx0\ty0\tx1\ty1");
            for m in &matches {
                println!(
                    "{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}",
                    m.text, m.bbox.x0, m.bbox.y0, m.bbox.x1, m.bbox.y1,
                );
            }
        }
        OutputFormat::Json => {
            let out = serde_json::to_string_pretty(&matches).map_err(|e| {
                eprintln!("Error: failed to serialize matches: {e}");
                1
            })?;
            println!("{out}");
        }
        OutputFormat::Csv => {
            println!("text,x0,y0,x1,y1");
            for m in &matches {
                println!(
                    "{},{:.2},{:.2},{:.2},{:.2}",
                    csv_escape(&m.text),
                    m.bbox.x0,
                    m.bbox.y0,
                    m.bbox.x1,
                    m.bbox.y1,
                );
            }
        }
    }
    Ok(())
}
