//! Content stream tokenizer.
//!
//! Turns decoded content stream bytes into a sequence of [`Operator`]s,
//! each carrying the [`Operand`]s that preceded it. Comments are stripped
//! and inline image data (`BI ... ID ... EI`) is skipped without being
//! interpreted.

use crate::error::BackendError;

/// A content stream operand value.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Integer number (e.g., `42`, `-7`).
    Integer(i64),
    /// Real number (e.g., `3.14`, `.5`).
    Real(f64),
    /// Name object, stored without the leading `/`.
    Name(String),
    /// Literal string `( ... )`, stored as raw bytes.
    LiteralString(Vec<u8>),
    /// Hexadecimal string `< ... >`, stored as decoded bytes.
    HexString(Vec<u8>),
    /// Array of operands.
    Array(Vec<Operand>),
    Boolean(bool),
    Null,
    /// Dictionary `<< /Key value ... >>` as ordered entries.
    Dictionary(Vec<(String, Operand)>),
}

impl Operand {
    /// Numeric value of an integer or real operand.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Operand::Integer(i) => Some(*i as f64),
            Operand::Real(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Operand::Name(n) => Some(n),
            _ => None,
        }
    }

    /// Bytes of a literal or hex string operand.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Operand::LiteralString(s) | Operand::HexString(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Operand]> {
        match self {
            Operand::Array(a) => Some(a),
            _ => None,
        }
    }
}

/// A content stream operator with its preceding operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    /// Operator name (e.g., `"BT"`, `"Tf"`, `"Tj"`).
    pub name: String,
    /// Operands in stream order.
    pub operands: Vec<Operand>,
}

impl Operator {
    pub fn new(name: impl Into<String>, operands: Vec<Operand>) -> Self {
        Self {
            name: name.into(),
            operands,
        }
    }
}

/// Parse content stream bytes into a sequence of operators.
///
/// # Errors
///
/// Returns [`BackendError::Parse`] for unterminated strings, arrays or
/// dictionaries, invalid numbers and stray closing delimiters.
pub fn tokenize(input: &[u8]) -> Result<Vec<Operator>, BackendError> {
    let mut lexer = Lexer::new(input);
    let mut ops = Vec::new();
    let mut operands: Vec<Operand> = Vec::new();

    while let Some(token) = lexer.next_token()? {
        match token {
            Token::Operand(operand) => operands.push(operand),
            Token::Keyword(word) => match word.as_str() {
                "true" => operands.push(Operand::Boolean(true)),
                "false" => operands.push(Operand::Boolean(false)),
                "null" => operands.push(Operand::Null),
                "BI" => {
                    lexer.skip_inline_image()?;
                    operands.clear();
                }
                _ => ops.push(Operator {
                    name: word,
                    operands: std::mem::take(&mut operands),
                }),
            },
            Token::ArrayEnd => {
                return Err(lexer.error("unexpected ']' outside array"));
            }
            Token::DictEnd => {
                return Err(lexer.error("unexpected '>>' outside dictionary"));
            }
        }
    }

    Ok(ops)
}

enum Token {
    Operand(Operand),
    Keyword(String),
    ArrayEnd,
    DictEnd,
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn is_regular(b: u8) -> bool {
    !is_whitespace(b) && !is_delimiter(b)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Byte cursor over a content stream.
struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn error(&self, msg: &str) -> BackendError {
        BackendError::Parse(format!("{msg} at byte {}", self.pos))
    }

    fn skip_trivia(&mut self) {
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                self.pos += 1;
            } else if b == b'%' {
                while self.peek().is_some_and(|b| b != b'\n' && b != b'\r') {
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, BackendError> {
        loop {
            self.skip_trivia();
            let Some(b) = self.peek() else {
                return Ok(None);
            };
            let token = match b {
                b'(' => Token::Operand(Operand::LiteralString(self.literal_string()?)),
                b'<' if self.peek_at(1) == Some(b'<') => {
                    self.pos += 2;
                    Token::Operand(Operand::Dictionary(self.dictionary()?))
                }
                b'<' => Token::Operand(Operand::HexString(self.hex_string()?)),
                b'>' if self.peek_at(1) == Some(b'>') => {
                    self.pos += 2;
                    Token::DictEnd
                }
                b'[' => {
                    self.pos += 1;
                    Token::Operand(Operand::Array(self.array()?))
                }
                b']' => {
                    self.pos += 1;
                    Token::ArrayEnd
                }
                b'/' => Token::Operand(Operand::Name(self.name())),
                b'0'..=b'9' | b'+' | b'-' | b'.' => Token::Operand(self.number()?),
                b if b.is_ascii_alphabetic() || matches!(b, b'*' | b'\'' | b'"') => {
                    Token::Keyword(self.keyword())
                }
                _ => {
                    // Stray delimiter or binary garbage.
                    self.pos += 1;
                    continue;
                }
            };
            return Ok(Some(token));
        }
    }

    /// Value inside an array or dictionary; bare keywords become names.
    fn value(&self, token: Token) -> Result<Operand, BackendError> {
        match token {
            Token::Operand(o) => Ok(o),
            Token::Keyword(word) => Ok(match word.as_str() {
                "true" => Operand::Boolean(true),
                "false" => Operand::Boolean(false),
                "null" => Operand::Null,
                _ => Operand::Name(word),
            }),
            Token::ArrayEnd => Err(self.error("unexpected ']'")),
            Token::DictEnd => Err(self.error("unexpected '>>'")),
        }
    }

    /// Elements up to the closing `]`; the opening `[` is already consumed.
    fn array(&mut self) -> Result<Vec<Operand>, BackendError> {
        let mut elements = Vec::new();
        loop {
            match self.next_token()? {
                None => return Err(self.error("unterminated array")),
                Some(Token::ArrayEnd) => return Ok(elements),
                Some(token) => elements.push(self.value(token)?),
            }
        }
    }

    /// Entries up to the closing `>>`; the opening `<<` is already consumed.
    fn dictionary(&mut self) -> Result<Vec<(String, Operand)>, BackendError> {
        let mut entries = Vec::new();
        loop {
            let key = match self.next_token()? {
                None => return Err(self.error("unterminated dictionary")),
                Some(Token::DictEnd) => return Ok(entries),
                Some(Token::Operand(Operand::Name(key))) => key,
                Some(_) => return Err(self.error("expected name key in dictionary")),
            };
            let value = match self.next_token()? {
                None => return Err(self.error("unterminated dictionary value")),
                Some(token) => self.value(token)?,
            };
            entries.push((key, value));
        }
    }

    fn literal_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut out = Vec::new();
        let mut depth = 1u32;

        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'(' => {
                    depth += 1;
                    out.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(out);
                    }
                    out.push(b);
                }
                b'\\' => self.escape(&mut out)?,
                _ => out.push(b),
            }
        }
        Err(self.error("unterminated literal string"))
    }

    /// Escape sequence after a backslash inside a literal string.
    fn escape(&mut self, out: &mut Vec<u8>) -> Result<(), BackendError> {
        let Some(b) = self.peek() else {
            return Err(self.error("unterminated escape in literal string"));
        };
        self.pos += 1;
        match b {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'\r' => {
                // Line continuation, CR or CRLF.
                if self.peek() == Some(b'\n') {
                    self.pos += 1;
                }
            }
            b'\n' => {}
            b'0'..=b'7' => {
                let mut value = u32::from(b - b'0');
                for _ in 0..2 {
                    match self.peek() {
                        Some(d @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(d - b'0');
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                // High-order overflow is ignored.
                out.push((value & 0xFF) as u8);
            }
            // `\(`, `\)`, `\\` and unknown escapes all yield the byte itself.
            other => out.push(other),
        }
        Ok(())
    }

    fn hex_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut out = Vec::new();
        let mut high: Option<u8> = None;
        loop {
            let Some(b) = self.peek() else {
                return Err(self.error("unterminated hex string"));
            };
            self.pos += 1;
            if b == b'>' {
                break;
            }
            if is_whitespace(b) {
                continue;
            }
            let Some(v) = hex_value(b) else {
                return Err(self.error(&format!("invalid hex digit {:?}", b as char)));
            };
            match high.take() {
                Some(h) => out.push((h << 4) | v),
                None => high = Some(v),
            }
        }
        // An odd trailing digit is padded with zero.
        if let Some(h) = high {
            out.push(h << 4);
        }
        Ok(out)
    }

    fn name(&mut self) -> String {
        self.pos += 1;
        let start = self.pos;
        while self.peek().is_some_and(is_regular) {
            self.pos += 1;
        }
        let raw = &self.input[start..self.pos];
        let mut name = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            if raw[i] == b'#' && i + 2 < raw.len() {
                if let (Some(h), Some(l)) = (hex_value(raw[i + 1]), hex_value(raw[i + 2])) {
                    name.push((h << 4) | l);
                    i += 3;
                    continue;
                }
            }
            name.push(raw[i]);
            i += 1;
        }
        String::from_utf8_lossy(&name).into_owned()
    }

    fn number(&mut self) -> Result<Operand, BackendError> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let mut real = false;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => self.pos += 1,
                b'.' if !real => {
                    real = true;
                    self.pos += 1;
                }
                _ => break,
            }
        }
        let text = String::from_utf8_lossy(&self.input[start..self.pos]);
        if real {
            // `-.` and `.` parse as zero, as most readers do.
            let digits = text.trim_start_matches(['+', '-']).trim_matches('.');
            if digits.is_empty() {
                return Ok(Operand::Real(0.0));
            }
            text.parse()
                .map(Operand::Real)
                .map_err(|_| self.error(&format!("invalid real number {text:?}")))
        } else {
            text.parse()
                .map(Operand::Integer)
                .map_err(|_| self.error(&format!("invalid integer {text:?}")))
        }
    }

    fn keyword(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_regular) {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    /// Skip an inline image after `BI`: its dictionary, `ID`, the data and `EI`.
    fn skip_inline_image(&mut self) -> Result<(), BackendError> {
        loop {
            match self.next_token()? {
                None => return Err(self.error("unterminated inline image (missing ID)")),
                Some(Token::Keyword(k)) if k == "ID" => break,
                Some(_) => {}
            }
        }
        // One whitespace byte separates ID from the data.
        if self.peek().is_some_and(is_whitespace) {
            self.pos += 1;
        }
        while self.pos < self.input.len() {
            let at_ei = self.input[self.pos..].starts_with(b"EI")
                && (self.pos == 0 || is_whitespace(self.input[self.pos - 1]))
                && self.peek_at(2).is_none_or(|b| is_whitespace(b) || is_delimiter(b));
            if at_ei {
                self.pos += 2;
                return Ok(());
            }
            self.pos += 1;
        }
        Ok(())
    }
}
