use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use textpool::{ExtractOptions, FontMap, PageGeometry, PageText, Rotation, SimpleFont};

use crate::cli::PageArgs;

/// Read a content stream from a file, or from stdin for `-`.
pub fn read_content(file: &Path) -> Result<Vec<u8>, i32> {
    if file.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf).map_err(|e| {
            eprintln!("Error: failed to read stdin: {e}");
            1
        })?;
        return Ok(buf);
    }
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }
    std::fs::read(file).map_err(|e| {
        eprintln!("Error: failed to read {}: {e}", file.display());
        1
    })
}

/// Load extraction options from an optional JSON file and apply CLI overrides.
pub fn load_options(args: &PageArgs) -> Result<ExtractOptions, i32> {
    let mut options = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                eprintln!("Error: failed to read config {}: {e}", path.display());
                1
            })?;
            serde_json::from_str::<ExtractOptions>(&text).map_err(|e| {
                eprintln!("Error: invalid config {}: {e}", path.display());
                1
            })?
        }
        None => ExtractOptions::default(),
    };
    if args.raw_order {
        options.raw_order = true;
    }
    if let Some(norm) = &args.unicode_norm {
        options.unicode_norm = norm.to_unicode_norm();
    }
    options.validate().map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;
    Ok(options)
}

/// One font entry of a `--fonts` file.
///
/// ```json
/// { "F1": { "base_font": "Helvetica", "first_char": 32, "widths": [278, 278] } }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FontSpec {
    /// Font name reported on glyphs; defaults to the resource name.
    pub base_font: Option<String>,
    pub first_char: u32,
    /// Glyph widths in 1/1000 em starting at `first_char`.
    pub widths: Vec<f64>,
    pub missing_width: Option<f64>,
    /// Character code to Unicode text.
    pub to_unicode: BTreeMap<u32, String>,
    /// Two-byte codes (Identity-H / Identity-V).
    pub identity: bool,
    pub vertical: bool,
}

impl FontSpec {
    pub fn into_font(self, resource: &str) -> SimpleFont {
        let mut font = SimpleFont::new(self.base_font.as_deref().unwrap_or(resource))
            .with_widths(self.first_char, self.widths);
        if let Some(w) = self.missing_width {
            font = font.with_missing_width(w);
        }
        for (code, text) in self.to_unicode {
            font = font.with_to_unicode(code, text);
        }
        if self.identity {
            font = font.with_identity_encoding();
        }
        if self.vertical {
            font = font.with_vertical_writing();
        }
        font
    }
}

/// Parse a `--fonts` document into a font map.
pub fn parse_fonts(json: &str) -> Result<FontMap, serde_json::Error> {
    let specs: BTreeMap<String, FontSpec> = serde_json::from_str(json)?;
    let mut fonts = FontMap::new();
    for (name, spec) in specs {
        let font = spec.into_font(&name);
        fonts.insert(name, font);
    }
    Ok(fonts)
}

/// Load the font map; without `--fonts` every font falls back to estimated widths.
pub fn load_fonts(args: &PageArgs) -> Result<FontMap, i32> {
    let Some(path) = &args.fonts else {
        return Ok(FontMap::new());
    };
    let text = std::fs::read_to_string(path).map_err(|e| {
        eprintln!("Error: failed to read fonts {}: {e}", path.display());
        1
    })?;
    parse_fonts(&text).map_err(|e| {
        eprintln!("Error: invalid fonts file {}: {e}", path.display());
        1
    })
}

pub fn geometry(args: &PageArgs) -> Result<PageGeometry, i32> {
    if !(args.width.is_finite() && args.width > 0.0 && args.height.is_finite() && args.height > 0.0)
    {
        eprintln!(
            "Error: page size must be positive, got {} x {}",
            args.width, args.height
        );
        return Err(1);
    }
    if args.rotate % 90 != 0 {
        eprintln!("Error: --rotate must be a multiple of 90, got {}", args.rotate);
        return Err(1);
    }
    Ok(PageGeometry::new(args.width, args.height).with_rotation(args.rotate))
}

/// Read, tokenize and extract one page.
pub fn extract_page(file: &Path, args: &PageArgs) -> Result<PageText, i32> {
    let options = load_options(args)?;
    let fonts = load_fonts(args)?;
    let geometry = geometry(args)?;
    let content = read_content(file)?;

    let page = PageText::from_bytes(&content, &fonts, &geometry, &options).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;
    for warning in page.warnings() {
        tracing::info!(code = %warning.code, "{warning}");
    }
    Ok(page)
}

pub fn rotation_str(rotation: Rotation) -> &'static str {
    match rotation {
        Rotation::Deg0 => "0",
        Rotation::Deg90 => "90",
        Rotation::Deg180 => "180",
        Rotation::Deg270 => "270",
    }
}

/// Escape a string for CSV output.
///
/// If the text contains commas, double quotes, or newlines, wraps it in
/// double quotes and escapes any internal double quotes by doubling them.
pub fn csv_escape(text: &str) -> String {
    if text.contains(',') || text.contains('"') || text.contains('\n') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}
