use formula_model::{column_index_to_label, column_label_to_index};
use formula_parse::{tokenize, TokenKind};
use proptest::prelude::*;

proptest! {
    // The lexer never fails: any input yields a stream that ends with exactly
    // one Eof and whose spans are in-bounds and strictly ordered.
    #[test]
    fn lexing_is_total(input in ".*") {
        let tokens = tokenize(&input);
        prop_assert!(!tokens.is_empty());
        let eofs = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
        prop_assert_eq!(eofs, 1);
        prop_assert_eq!(&tokens.last().unwrap().kind, &TokenKind::Eof);

        let mut prev_end = 0usize;
        for t in &tokens {
            prop_assert!(t.span.start >= prev_end);
            prop_assert!(t.span.end <= input.len());
            if t.kind == TokenKind::Eof {
                prop_assert_eq!(t.span.start, t.span.end);
            } else {
                prop_assert!(t.span.start < t.span.end);
                prop_assert_eq!(&input[t.span.start..t.span.end], t.text.as_str());
            }
            prev_end = t.span.end;
        }
    }

    // Decimal literals round-trip through their shortest display form.
    #[test]
    fn decimal_literals_round_trip(n in 0.0f64..1e12) {
        let source = n.to_string();
        let tokens = tokenize(&source);
        prop_assert_eq!(&tokens[0].kind, &TokenKind::Number(n));
        prop_assert_eq!(&tokens[1].kind, &TokenKind::Eof);
    }

    // Scientific notation parses to the same value `str::parse` produces.
    #[test]
    fn scientific_literals_round_trip(mantissa in 0u64..1_000_000, exp in -12i32..12) {
        let source = format!("{mantissa}e{exp}");
        let expected: f64 = source.parse().unwrap();
        let tokens = tokenize(&source);
        prop_assert_eq!(&tokens[0].kind, &TokenKind::Number(expected));
        prop_assert_eq!(&tokens[1].kind, &TokenKind::Eof);
    }

    // Column labels and 0-based indices are inverse of each other.
    #[test]
    fn column_labels_round_trip(col in 0i64..=2_000_000) {
        let label = column_index_to_label(col);
        prop_assert_eq!(column_label_to_index(&label).unwrap(), col);
    }
}
