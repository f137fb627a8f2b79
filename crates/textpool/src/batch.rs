//! Multi-page extraction.

use textpool_core::{ExtractOptions, PageGeometry, TextError};
use textpool_parse::FontMap;

use crate::page::PageText;

/// Decoded content stream of one page and its geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContent {
    pub content: Vec<u8>,
    pub geometry: PageGeometry,
}

impl PageContent {
    pub fn new(content: impl Into<Vec<u8>>, geometry: PageGeometry) -> Self {
        Self {
            content: content.into(),
            geometry,
        }
    }

    fn extract(&self, fonts: &FontMap, options: &ExtractOptions) -> Result<PageText, TextError> {
        PageText::from_bytes(&self.content, fonts, &self.geometry, options)
    }
}

/// Extract every page in order. A failing page does not stop the others.
pub fn extract_pages(
    pages: &[PageContent],
    fonts: &FontMap,
    options: &ExtractOptions,
) -> Vec<Result<PageText, TextError>> {
    pages.iter().map(|p| p.extract(fonts, options)).collect()
}

/// Extract pages in parallel using rayon. Results keep page order.
#[cfg(feature = "parallel")]
pub fn extract_pages_parallel(
    pages: &[PageContent],
    fonts: &FontMap,
    options: &ExtractOptions,
) -> Vec<Result<PageText, TextError>> {
    use rayon::prelude::*;

    pages.par_iter().map(|p| p.extract(fonts, options)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use textpool_parse::SimpleFont;

    fn fonts() -> FontMap {
        FontMap::new().with_font("F1", SimpleFont::new("Helvetica").with_missing_width(500.0))
    }

    fn pages() -> Vec<PageContent> {
        vec![
            PageContent::new(&b"BT /F1 10 Tf 72 700 Td (one) Tj ET"[..], PageGeometry::default()),
            PageContent::new(&b"BT (broken"[..], PageGeometry::default()),
            PageContent::new(
                &b"BT /F1 10 Tf 72 500 Td (three) Tj ET"[..],
                PageGeometry::default().with_rotation(90),
            ),
        ]
    }

    #[test]
    fn pages_are_independent() {
        let results = extract_pages(&pages(), &fonts(), &ExtractOptions::default());
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().plain_text(), "one");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().plain_text(), "three");
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_matches_sequential() {
        let opts = ExtractOptions::default();
        let seq = extract_pages(&pages(), &fonts(), &opts);
        let par = extract_pages_parallel(&pages(), &fonts(), &opts);
        let text = |r: &Result<PageText, TextError>| r.as_ref().map(PageText::plain_text).ok();
        assert_eq!(
            seq.iter().map(text).collect::<Vec<_>>(),
            par.iter().map(text).collect::<Vec<_>>()
        );
    }
}
