//! Per-page extraction result.

use std::borrow::Cow;

use textpool_core::{
    BBox, ColumnDetector, ColumnLayout, ExtractOptions, ExtractWarning, ExtractWarningCode,
    LineOptions, PageGeometry, PagePools, PositionedChar, Rotation, SearchMatch, SearchOptions,
    TextError, TextSerializer, Word, WordBuilder, WordBuilderStats, search_words,
};
use textpool_parse::{ContentHandler, FontMap, Operator, interpret, tokenize};

/// Feeds interpreter events into a [`WordBuilder`] and gathers warnings.
struct PageCollector {
    builder: WordBuilder,
    warnings: Vec<ExtractWarning>,
    collect_warnings: bool,
    max_tiny_chars: usize,
    tiny_warned: bool,
}

impl PageCollector {
    fn new(bounds: BBox, options: &ExtractOptions) -> Self {
        Self {
            builder: WordBuilder::new(bounds, options),
            warnings: Vec::new(),
            collect_warnings: options.collect_warnings,
            max_tiny_chars: options.max_tiny_chars,
            tiny_warned: false,
        }
    }

    fn push_warning(&mut self, warning: ExtractWarning) {
        if self.collect_warnings {
            self.warnings.push(warning);
        }
    }
}

impl ContentHandler for PageCollector {
    fn on_char(&mut self, ch: PositionedChar) {
        self.builder.add_char(ch);
        if !self.tiny_warned && self.builder.tiny_limit_reached() {
            self.tiny_warned = true;
            tracing::warn!(
                limit = self.max_tiny_chars,
                "tiny glyph limit reached, dropping further tiny glyphs"
            );
            self.push_warning(ExtractWarning::with_code(
                ExtractWarningCode::ResourceLimitReached,
                format!(
                    "more than {} tiny glyphs on page; further tiny glyphs dropped",
                    self.max_tiny_chars
                ),
            ));
        }
    }

    fn on_text_end(&mut self) {
        self.builder.end_word();
    }

    fn on_warning(&mut self, warning: ExtractWarning) {
        self.push_warning(warning);
    }
}

/// Words of one page together with everything needed to render them.
///
/// Built once by [`PageText::extract`]; every text mode is derived from the
/// same words, so rendering is repeatable and never re-runs the content
/// stream.
#[derive(Debug, Clone)]
pub struct PageText {
    geometry: PageGeometry,
    bounds: BBox,
    options: ExtractOptions,
    pools: PagePools,
    raw: Vec<Word>,
    stats: WordBuilderStats,
    warnings: Vec<ExtractWarning>,
}

impl PageText {
    /// Interpret `ops` and build the page's words.
    pub fn extract(
        ops: &[Operator],
        fonts: &FontMap,
        geometry: &PageGeometry,
        options: &ExtractOptions,
    ) -> Self {
        let bounds = geometry.device_bounds();
        let mut collector = PageCollector::new(bounds, options);
        interpret(ops, fonts, geometry, options.unicode_norm, &mut collector);

        let PageCollector {
            builder, warnings, ..
        } = collector;
        let built = builder.finish();
        tracing::debug!(
            operators = ops.len(),
            chars = built.stats.chars_seen,
            accepted = built.stats.chars_accepted,
            words = built.stats.words,
            off_page = built.stats.dropped_off_page,
            tiny_dropped = built.stats.dropped_tiny,
            warnings = warnings.len(),
            "page extracted"
        );

        Self {
            geometry: *geometry,
            bounds,
            options: options.clone(),
            pools: built.pools,
            raw: built.raw,
            stats: built.stats,
            warnings,
        }
    }

    /// Tokenize a decoded content stream, then [`extract`](Self::extract).
    ///
    /// Fails on invalid options or an unreadable content stream.
    pub fn from_bytes(
        content: &[u8],
        fonts: &FontMap,
        geometry: &PageGeometry,
        options: &ExtractOptions,
    ) -> Result<Self, TextError> {
        options.validate()?;
        let ops = tokenize(content)?;
        Ok(Self::extract(&ops, fonts, geometry, options))
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Device-space page bounds (rotation applied).
    pub fn bounds(&self) -> &BBox {
        &self.bounds
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    pub fn stats(&self) -> &WordBuilderStats {
        &self.stats
    }

    pub fn warnings(&self) -> &[ExtractWarning] {
        &self.warnings
    }

    /// Line pools of the page. In stream-order mode the words are pooled on demand.
    pub fn pools(&self) -> Cow<'_, PagePools> {
        if self.options.raw_order {
            Cow::Owned(PagePools::from_words(
                self.raw.iter().cloned(),
                self.options.pool_quantum,
            ))
        } else {
            Cow::Borrowed(&self.pools)
        }
    }

    /// Words in reading order, or in stream order when `raw_order` is set.
    pub fn words(&self) -> Vec<Word> {
        if self.options.raw_order {
            self.raw.clone()
        } else {
            self.pools.reading_order(&LineOptions::from(&self.options))
        }
    }

    /// Plain text: lines in reading order, words separated by inferred spaces.
    pub fn plain_text(&self) -> String {
        let serializer = TextSerializer::new(&self.options);
        if self.options.raw_order {
            serializer.raw(&self.raw)
        } else {
            serializer.plain(&self.pools)
        }
    }

    /// Text placed on a character grid that mirrors the page layout.
    pub fn layout_text(&self) -> String {
        TextSerializer::new(&self.options).layout(&self.pools(), &self.bounds)
    }

    /// Plain text column by column.
    pub fn column_text(&self) -> String {
        TextSerializer::new(&self.options).columns(&self.pools(), &self.bounds)
    }

    /// Columns detected among the upright lines.
    pub fn columns(&self) -> ColumnLayout {
        let lines = self
            .pools()
            .pool(Rotation::Deg0)
            .lines(&LineOptions::from(&self.options));
        ColumnDetector::new(self.options.columns.clone()).detect(lines, self.bounds.width())
    }

    /// Find `pattern` in the page's words (reading order).
    pub fn search(
        &self,
        pattern: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchMatch>, TextError> {
        search_words(&self.words(), pattern, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use textpool_parse::SimpleFont;

    fn fonts() -> FontMap {
        FontMap::new().with_font("F1", SimpleFont::new("Helvetica").with_missing_width(500.0))
    }

    fn page(content: &str, options: &ExtractOptions) -> PageText {
        PageText::from_bytes(
            content.as_bytes(),
            &fonts(),
            &PageGeometry::default(),
            options,
        )
        .unwrap()
    }

    // --- Extraction ---

    #[test]
    fn hello_world_words() {
        let p = page(
            "BT /F1 12 Tf 72 700 Td (Hello World) Tj ET",
            &ExtractOptions::default(),
        );
        let texts: Vec<String> = p.words().into_iter().map(|w| w.text).collect();
        assert_eq!(texts, vec!["Hello", "World"]);
        assert_eq!(p.plain_text(), "Hello World");
        assert_eq!(p.stats().words, 2);
        assert_eq!(p.stats().whitespace, 1);
        assert!(p.warnings().is_empty());
    }

    #[test]
    fn text_end_closes_word() {
        let p = page(
            "BT /F1 10 Tf 0 700 Td (ab) Tj ET BT /F1 10 Tf 10 700 Td (cd) Tj ET",
            &ExtractOptions::default(),
        );
        let texts: Vec<String> = p.words().into_iter().map(|w| w.text).collect();
        assert_eq!(texts, vec!["ab", "cd"]);
    }

    #[test]
    fn warnings_can_be_disabled() {
        let content = "Q BT /F9 10 Tf 0 700 Td (x) Tj ET";
        let p = page(content, &ExtractOptions::default());
        assert_eq!(p.warnings().len(), 2);

        let quiet = ExtractOptions {
            collect_warnings: false,
            ..ExtractOptions::default()
        };
        let p = page(content, &quiet);
        assert!(p.warnings().is_empty());
        assert_eq!(p.plain_text(), "x");
    }

    #[test]
    fn tiny_cap_warns_once() {
        let options = ExtractOptions {
            max_tiny_chars: 2,
            ..ExtractOptions::default()
        };
        // 1-unit font: every glyph advances half a unit.
        let p = page("BT /F1 1 Tf 100 700 Td (abcdef) Tj ET", &options);
        assert_eq!(p.stats().tiny_chars, 6);
        assert_eq!(p.stats().dropped_tiny, 4);
        let limits: Vec<_> = p
            .warnings()
            .iter()
            .filter(|w| w.code == ExtractWarningCode::ResourceLimitReached)
            .collect();
        assert_eq!(limits.len(), 1);
    }

    #[test]
    fn invalid_options_rejected() {
        let options = ExtractOptions {
            pool_quantum: 0.0,
            ..ExtractOptions::default()
        };
        let err = PageText::from_bytes(b"", &fonts(), &PageGeometry::default(), &options)
            .unwrap_err();
        assert!(matches!(err, TextError::ConfigError(_)));
    }

    #[test]
    fn unreadable_content_is_an_error() {
        let err = PageText::from_bytes(
            b"BT (unterminated",
            &fonts(),
            &PageGeometry::default(),
            &ExtractOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TextError::ParseError(_)));
    }

    // --- Rendering modes ---

    #[test]
    fn raw_order_keeps_stream_order() {
        let content = "BT /F1 10 Tf 0 686 Td (second) Tj 0 14 Td (first) Tj ET";
        let pooled = page(content, &ExtractOptions::default());
        assert_eq!(pooled.plain_text(), "first\nsecond");

        let options = ExtractOptions {
            raw_order: true,
            ..ExtractOptions::default()
        };
        let raw = page(content, &options);
        assert_eq!(raw.plain_text(), "second\nfirst");
        let texts: Vec<String> = raw.words().into_iter().map(|w| w.text).collect();
        assert_eq!(texts, vec!["second", "first"]);
        assert!(matches!(raw.pools(), Cow::Owned(_)));
        assert_eq!(raw.pools().len(), 2);
        assert_eq!(raw.layout_text(), pooled.layout_text());
    }

    #[test]
    fn two_columns() {
        let content = "BT /F1 10 Tf \
            50 700 Td (left one) Tj 0 -14 Td (left two) Tj \
            ET BT /F1 10 Tf \
            350 700 Td (right one) Tj 0 -14 Td (right two) Tj ET";
        let p = page(content, &ExtractOptions::default());
        let layout = p.columns();
        assert_eq!(layout.columns.len(), 2);
        assert_eq!(layout.columns[0].lines.len(), 2);
        assert_eq!(
            p.column_text(),
            "[column 1]\nleft one\nleft two\n\n[column 2]\nright one\nright two"
        );
    }

    #[test]
    fn search_finds_phrase() {
        let p = page(
            "BT /F1 10 Tf 72 700 Td (Hello World) Tj ET",
            &ExtractOptions::default(),
        );
        let found = p
            .search("hello world", &SearchOptions { regex: false, case_sensitive: false })
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].word_indices, vec![0, 1]);
        assert_eq!(found[0].bbox.x0, 72.0);
    }
}
