use std::path::Path;

use textpool::PageText;

use crate::cli::{PageArgs, TextFormat, TextMode};
use crate::shared::extract_page;

pub fn render(page: &PageText, mode: TextMode) -> String {
    match mode {
        TextMode::Plain => page.plain_text(),
        TextMode::Layout => page.layout_text(),
        TextMode::Columns => page.column_text(),
    }
}

fn mode_str(mode: TextMode) -> &'static str {
    match mode {
        TextMode::Plain => "plain",
        TextMode::Layout => "layout",
        TextMode::Columns => "columns",
    }
}

pub fn run(file: &Path, mode: TextMode, format: &TextFormat, args: &PageArgs) -> Result<(), i32> {
    let page = extract_page(file, args)?;
    let text = render(&page, mode);

    match format {
        TextFormat::Text => println!("{text}"),
        TextFormat::Json => {
            let mut obj = serde_json::json!({
                "mode": mode_str(mode),
                "text": text,
                "stats": page.stats(),
                "warnings": page.warnings(),
            });
            if mode == TextMode::Columns {
                obj["columns"] = serde_json::to_value(page.columns()).map_err(|e| {
                    eprintln!("Error: failed to serialize columns: {e}");
                    1
                })?;
            }
            let out = serde_json::to_string_pretty(&obj).map_err(|e| {
                eprintln!("Error: failed to serialize output: {e}");
                1
            })?;
            println!("{out}");
        }
    }
    Ok(())
}
