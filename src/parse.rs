//! JavaScript parsing via SWC, with span-to-offset translation.

use std::ops::Range;

use swc_core::{
    common::{sync::Lrc, BytePos, FileName, SourceMap, Span, Spanned, GLOBALS},
    ecma::{
        ast::{EsVersion, Program},
        parser::{
            error::Error as SwcParseError, lexer::Lexer, EsSyntax, Parser, StringInput, Syntax,
        },
    },
};

use crate::error::TransformError;

const BOM: char = '\u{feff}';

/// A parsed script together with the text it came from.
///
/// SWC spans are positions inside a `SourceMap`; the file does not start at
/// zero, so every span is rebased on `start_pos` before it is used as an
/// offset into `source`. A leading byte order mark is not part of the parsed
/// file and is added back onto every offset.
pub struct ParsedScript<'s> {
    pub source: &'s str,
    pub program: Program,
    start_pos: BytePos,
    bom_len: usize,
}

impl<'s> ParsedScript<'s> {
    /// Byte range of `span` inside `source`.
    pub fn range(&self, span: Span) -> Range<usize> {
        self.offset(span.lo)..self.offset(span.hi)
    }

    pub fn offset(&self, pos: BytePos) -> usize {
        rebase(pos, self.start_pos, self.bom_len)
    }
}

fn rebase(pos: BytePos, start_pos: BytePos, bom_len: usize) -> usize {
    pos.0.saturating_sub(start_pos.0) as usize + bom_len
}

/// Parse `source` as a script or module, whichever it turns out to be.
///
/// Recoverable parser errors are treated as fatal too: a file is either
/// patched completely or not at all.
pub fn parse_script(source: &str) -> Result<ParsedScript<'_>, TransformError> {
    let bom_len = if source.starts_with(BOM) {
        BOM.len_utf8()
    } else {
        0
    };

    GLOBALS.set(&Default::default(), || {
        let cm: Lrc<SourceMap> = Default::default();
        let fm = cm.new_source_file(Lrc::new(FileName::Anon), source[bom_len..].to_string());

        let lexer = Lexer::new(
            Syntax::Es(EsSyntax::default()),
            EsVersion::EsNext,
            StringInput::from(&*fm),
            None,
        );
        let mut parser = Parser::new_from(lexer);

        let program = parser
            .parse_program()
            .map_err(|e| to_parse_error(source, fm.start_pos, bom_len, e))?;

        if let Some(err) = parser.take_errors().into_iter().next() {
            return Err(to_parse_error(source, fm.start_pos, bom_len, err));
        }

        Ok(ParsedScript {
            source,
            program,
            start_pos: fm.start_pos,
            bom_len,
        })
    })
}

fn to_parse_error(
    source: &str,
    start_pos: BytePos,
    bom_len: usize,
    err: SwcParseError,
) -> TransformError {
    let offset = rebase(err.span().lo, start_pos, bom_len).min(source.len());
    let (line, column) = line_col(source, offset);
    TransformError::Parse {
        line,
        column,
        message: err.kind().msg().to_string(),
    }
}

/// 1-based line and column (in chars) of a byte offset.
fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut line_start = 0;
    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            line_start = i + 1;
        }
    }
    let column = source
        .get(line_start..offset)
        .map(|s| s.chars().count())
        .unwrap_or(0);
    (line, column + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_are_zero_based() {
        let src = "define(function () {});";
        let parsed = parse_script(src).unwrap();
        let Program::Script(script) = &parsed.program else {
            panic!("expected a script");
        };
        assert_eq!(parsed.range(script.body[0].span()), 0..src.len());
    }

    #[test]
    fn test_ranges_skip_byte_order_mark() {
        let src = "\u{feff}define(function () {});";
        let parsed = parse_script(src).unwrap();
        let Program::Script(script) = &parsed.program else {
            panic!("expected a script");
        };
        let range = parsed.range(script.body[0].span());
        assert_eq!(range, 3..src.len());
        assert_eq!(&src[range], "define(function () {});");
    }

    #[test]
    fn test_parse_error_after_byte_order_mark() {
        let err = parse_script("\u{feff}var a = 1;\ndefine(function () {").err().unwrap();
        assert!(matches!(err, TransformError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_parse_error_reports_position() {
        let err = parse_script("var a = 1;\ndefine(function () {").err().unwrap();
        match err {
            TransformError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_line_col_counts_chars() {
        assert_eq!(line_col("ab\ncd", 4), (2, 2));
        assert_eq!(line_col("é=1", 2), (1, 2));
    }
}
