use rstest::rstest;

use crate::{ParseError, parse_matrix, parse_strings, parse_vector};

#[rstest]
#[case::spaces("0 1\n1 0\n", vec![vec![0.0, 1.0], vec![1.0, 0.0]])]
#[case::tabs_and_runs("0\t\t1\n  1   0  \n", vec![vec![0.0, 1.0], vec![1.0, 0.0]])]
#[case::blank_lines("\n0 1\n\n1 0\n\n", vec![vec![0.0, 1.0], vec![1.0, 0.0]])]
#[case::crlf("0 1\r\n1 0\r\n", vec![vec![0.0, 1.0], vec![1.0, 0.0]])]
#[case::ragged("0 1 2\n1\n", vec![vec![0.0, 1.0, 2.0], vec![1.0]])]
#[case::empty("", vec![])]
fn parse_matrix_reads_rows(#[case] text: &str, #[case] expected: Vec<Vec<f64>>) {
    assert_eq!(parse_matrix(text).expect("text is numeric"), expected);
}

#[test]
fn parse_matrix_accepts_nan_sentinels() {
    let rows = parse_matrix("0 NaN\nnan 0\n").expect("NaN is a number");
    assert!(rows[0][1].is_nan());
    assert!(rows[1][0].is_nan());
}

#[rstest]
#[case::first_token("x 1\n", 1, 1, "x")]
#[case::later_line("0 1\n1 0.5.2\n", 2, 2, "0.5.2")]
#[case::after_blank("\n\n1 2 three\n", 3, 3, "three")]
fn parse_matrix_reports_token_position(
    #[case] text: &str,
    #[case] line: usize,
    #[case] column: usize,
    #[case] token: &str,
) {
    let err = parse_matrix(text).expect_err("token is not numeric");
    assert_eq!(
        err,
        ParseError::InvalidNumber {
            line,
            column,
            token: token.to_owned(),
        }
    );
}

#[rstest]
#[case::column("1\n2\n3\n")]
#[case::row("1 2 3\n")]
#[case::mixed("1 2\n3\n")]
fn parse_vector_flattens_layouts(#[case] text: &str) {
    assert_eq!(parse_vector(text).expect("numeric"), vec![1.0, 2.0, 3.0]);
}

#[test]
fn parse_strings_keeps_tokens_verbatim() {
    assert_eq!(parse_strings("L-PCC\n R.ACC \n\n3\n"), vec!["L-PCC", "R.ACC", "3"]);
}
