//! Operators decoded once into a closed set.
//!
//! The interpreter never matches on operator names; [`Op::decode`] does
//! that once per operator and extracts typed operands. Operands are taken
//! from the end of the operand list, so stray leading operands are
//! tolerated. An operator whose required operands are missing or of the
//! wrong type decodes to [`Op::Malformed`] and is skipped as a whole.

use textpool_core::Transform;

use crate::tokenizer::{Operand, Operator};

/// One element of a `TJ` array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextArrayItem<'a> {
    /// A string to show.
    Text(&'a [u8]),
    /// A position adjustment in thousandths of text space.
    Adjust(f64),
}

/// A decoded content stream operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Op<'a> {
    /// `q`
    Save,
    /// `Q`
    Restore,
    /// `cm`
    Concat(Transform),
    /// `BT`
    BeginText,
    /// `ET`
    EndText,
    /// `Tf`
    SetFont { name: &'a str, size: f64 },
    /// `Tc`
    SetCharSpacing(f64),
    /// `Tw`
    SetWordSpacing(f64),
    /// `Tz`, in percent.
    SetHorizontalScale(f64),
    /// `TL`
    SetLeading(f64),
    /// `Ts`
    SetRise(f64),
    /// `Tr`
    SetRenderMode(i64),
    /// `Td`
    MoveText { tx: f64, ty: f64 },
    /// `TD`
    MoveTextSetLeading { tx: f64, ty: f64 },
    /// `Tm`
    SetTextMatrix(Transform),
    /// `T*`
    NextLine,
    /// `Tj`
    ShowText(&'a [u8]),
    /// `TJ`
    ShowTextArray(Vec<TextArrayItem<'a>>),
    /// `'`
    NextLineShowText(&'a [u8]),
    /// `"`
    NextLineShowSpaced {
        word_spacing: f64,
        char_spacing: f64,
        text: &'a [u8],
    },
    /// Any operator that does not affect text positioning.
    Other(&'a str),
    /// A text or transform operator without usable operands.
    Malformed {
        name: &'a str,
        expected: &'static str,
        found: usize,
    },
}

impl<'a> Op<'a> {
    /// Decode an operator and its operands.
    pub fn decode(op: &'a Operator) -> Op<'a> {
        let name = op.name.as_str();
        let operands = op.operands.as_slice();
        let decoded = match name {
            "q" => Some(Op::Save),
            "Q" => Some(Op::Restore),
            "BT" => Some(Op::BeginText),
            "ET" => Some(Op::EndText),
            "T*" => Some(Op::NextLine),
            "cm" => numbers::<6>(operands).map(|m| Op::Concat(Transform::from_array(m))),
            "Tm" => numbers::<6>(operands).map(|m| Op::SetTextMatrix(Transform::from_array(m))),
            "Tc" => numbers::<1>(operands).map(|[v]| Op::SetCharSpacing(v)),
            "Tw" => numbers::<1>(operands).map(|[v]| Op::SetWordSpacing(v)),
            "Tz" => numbers::<1>(operands).map(|[v]| Op::SetHorizontalScale(v)),
            "TL" => numbers::<1>(operands).map(|[v]| Op::SetLeading(v)),
            "Ts" => numbers::<1>(operands).map(|[v]| Op::SetRise(v)),
            "Tr" => numbers::<1>(operands).map(|[v]| Op::SetRenderMode(v as i64)),
            "Td" => numbers::<2>(operands).map(|[tx, ty]| Op::MoveText { tx, ty }),
            "TD" => numbers::<2>(operands).map(|[tx, ty]| Op::MoveTextSetLeading { tx, ty }),
            "Tf" => match tail::<2>(operands) {
                Some([font, size]) => font
                    .as_name()
                    .zip(size.as_f64())
                    .map(|(name, size)| Op::SetFont { name, size }),
                None => None,
            },
            "Tj" => last_bytes(operands).map(Op::ShowText),
            "'" => last_bytes(operands).map(Op::NextLineShowText),
            "\"" => match tail::<3>(operands) {
                Some([aw, ac, text]) => match (aw.as_f64(), ac.as_f64(), text.as_bytes()) {
                    (Some(word_spacing), Some(char_spacing), Some(text)) => {
                        Some(Op::NextLineShowSpaced {
                            word_spacing,
                            char_spacing,
                            text,
                        })
                    }
                    _ => None,
                },
                None => None,
            },
            "TJ" => operands
                .last()
                .and_then(Operand::as_array)
                .map(|items| Op::ShowTextArray(text_array(items))),
            _ => return Op::Other(name),
        };
        decoded.unwrap_or(Op::Malformed {
            name,
            expected: expected_operands(name),
            found: operands.len(),
        })
    }

    /// Whether the operator shows text.
    pub fn shows_text(&self) -> bool {
        matches!(
            self,
            Op::ShowText(_)
                | Op::ShowTextArray(_)
                | Op::NextLineShowText(_)
                | Op::NextLineShowSpaced { .. }
        )
    }
}

/// The last `N` operands.
fn tail<const N: usize>(operands: &[Operand]) -> Option<&[Operand; N]> {
    let start = operands.len().checked_sub(N)?;
    operands[start..].try_into().ok()
}

/// The last `N` operands as numbers.
fn numbers<const N: usize>(operands: &[Operand]) -> Option<[f64; N]> {
    let tail = tail::<N>(operands)?;
    let mut out = [0.0; N];
    for (slot, operand) in out.iter_mut().zip(tail) {
        *slot = operand.as_f64()?;
    }
    Some(out)
}

fn last_bytes(operands: &[Operand]) -> Option<&[u8]> {
    operands.last().and_then(Operand::as_bytes)
}

/// Strings and numbers of a `TJ` array; other element types are ignored.
fn text_array(items: &[Operand]) -> Vec<TextArrayItem<'_>> {
    items
        .iter()
        .filter_map(|item| match item {
            Operand::LiteralString(s) | Operand::HexString(s) => Some(TextArrayItem::Text(s)),
            other => other.as_f64().map(TextArrayItem::Adjust),
        })
        .collect()
}

fn expected_operands(name: &str) -> &'static str {
    match name {
        "cm" | "Tm" => "6 numbers",
        "Td" | "TD" => "2 numbers",
        "Tf" => "a font name and a size",
        "Tj" | "'" => "a string",
        "\"" => "2 numbers and a string",
        "TJ" => "an array",
        _ => "a number",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(name: &str, operands: Vec<Operand>) -> Operator {
        Operator::new(name, operands)
    }

    fn num(v: f64) -> Operand {
        Operand::Real(v)
    }

    fn s(text: &str) -> Operand {
        Operand::LiteralString(text.as_bytes().to_vec())
    }

    // --- Well-formed operators ---

    #[test]
    fn no_operand_operators() {
        for (name, expected) in [
            ("q", Op::Save),
            ("Q", Op::Restore),
            ("BT", Op::BeginText),
            ("ET", Op::EndText),
            ("T*", Op::NextLine),
        ] {
            let o = op(name, vec![]);
            assert_eq!(Op::decode(&o), expected);
        }
    }

    #[test]
    fn matrices() {
        let o = op("cm", (1..=6).map(|v| num(v as f64)).collect());
        assert_eq!(
            Op::decode(&o),
            Op::Concat(Transform::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0))
        );
        let o = op(
            "Tm",
            vec![num(12.0), num(0.0), num(0.0), num(12.0), num(72.0), Operand::Integer(700)],
        );
        assert_eq!(
            Op::decode(&o),
            Op::SetTextMatrix(Transform::new(12.0, 0.0, 0.0, 12.0, 72.0, 700.0))
        );
    }

    #[test]
    fn scalar_setters() {
        assert_eq!(Op::decode(&op("Tc", vec![num(0.5)])), Op::SetCharSpacing(0.5));
        assert_eq!(Op::decode(&op("Tw", vec![num(2.0)])), Op::SetWordSpacing(2.0));
        assert_eq!(Op::decode(&op("Tz", vec![num(80.0)])), Op::SetHorizontalScale(80.0));
        assert_eq!(Op::decode(&op("TL", vec![num(14.0)])), Op::SetLeading(14.0));
        assert_eq!(Op::decode(&op("Ts", vec![num(3.0)])), Op::SetRise(3.0));
        assert_eq!(Op::decode(&op("Tr", vec![Operand::Integer(3)])), Op::SetRenderMode(3));
    }

    #[test]
    fn font_selection() {
        let o = op("Tf", vec![Operand::Name("F1".into()), Operand::Integer(12)]);
        assert_eq!(Op::decode(&o), Op::SetFont { name: "F1", size: 12.0 });
    }

    #[test]
    fn operands_taken_from_the_end() {
        let o = op("Td", vec![num(9.0), num(10.0), num(20.0)]);
        assert_eq!(Op::decode(&o), Op::MoveText { tx: 10.0, ty: 20.0 });
    }

    #[test]
    fn show_text_variants() {
        let o = op("Tj", vec![s("Hi")]);
        assert_eq!(Op::decode(&o), Op::ShowText(b"Hi"));
        let o = op("'", vec![s("Hi")]);
        assert_eq!(Op::decode(&o), Op::NextLineShowText(b"Hi"));
        let o = op("\"", vec![num(1.0), num(2.0), s("Hi")]);
        assert_eq!(
            Op::decode(&o),
            Op::NextLineShowSpaced {
                word_spacing: 1.0,
                char_spacing: 2.0,
                text: b"Hi"
            }
        );
        assert!(Op::decode(&o).shows_text());
    }

    #[test]
    fn text_array_keeps_strings_and_numbers() {
        let o = op(
            "TJ",
            vec![Operand::Array(vec![
                s("A"),
                Operand::Integer(-120),
                Operand::Name("junk".into()),
                Operand::HexString(vec![0x42]),
            ])],
        );
        assert_eq!(
            Op::decode(&o),
            Op::ShowTextArray(vec![
                TextArrayItem::Text(b"A"),
                TextArrayItem::Adjust(-120.0),
                TextArrayItem::Text(b"B"),
            ])
        );
    }

    #[test]
    fn unknown_operators_are_other() {
        assert_eq!(Op::decode(&op("re", vec![num(0.0); 4])), Op::Other("re"));
        assert_eq!(Op::decode(&op("BDC", vec![])), Op::Other("BDC"));
        assert!(!Op::decode(&op("re", vec![])).shows_text());
    }

    // --- Malformed operators ---

    #[test]
    fn too_few_operands() {
        let o = op("cm", vec![num(1.0), num(0.0)]);
        assert_eq!(
            Op::decode(&o),
            Op::Malformed {
                name: "cm",
                expected: "6 numbers",
                found: 2
            }
        );
    }

    #[test]
    fn wrong_operand_types() {
        let o = op("Tf", vec![Operand::Integer(12), Operand::Name("F1".into())]);
        assert!(matches!(Op::decode(&o), Op::Malformed { name: "Tf", .. }));
        let o = op("Tj", vec![num(1.0)]);
        assert!(matches!(Op::decode(&o), Op::Malformed { name: "Tj", .. }));
        let o = op("TJ", vec![s("x")]);
        assert!(matches!(Op::decode(&o), Op::Malformed { name: "TJ", .. }));
    }

    #[test]
    fn missing_scalar() {
        assert!(matches!(
            Op::decode(&op("Tz", vec![])),
            Op::Malformed {
                expected: "a number",
                found: 0,
                ..
            }
        ));
    }
}
