//! Functions for reading/writing curves in CSV format.
//!
//! Curves are stored as headerless `x,y` rows, lines starting with `#` are
//! comments.
use crate::curve::Coord;
pub use csv::Error;
use csv::{ReaderBuilder, Writer};
use serde::{de::DeserializeOwned, Serialize};

/// Parse CSV from string.
pub fn parse_csv<D>(s: &str) -> Result<Vec<D>, Error>
where
    D: DeserializeOwned,
{
    ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(s.as_bytes())
        .deserialize()
        .collect()
}

/// Parse a curve from string.
///
/// ```
/// use four_bar_fit::csv::parse_curve;
///
/// let curve = parse_curve("# traced\n0,0\n1.5, 2\n").unwrap();
/// assert_eq!(curve, [[0., 0.], [1.5, 2.]]);
/// ```
pub fn parse_curve(s: &str) -> Result<Vec<Coord>, Error> {
    parse_csv(s)
}

/// Dump CSV to string.
pub fn dump_csv<S>(rows: &[S]) -> Result<String, Box<dyn std::error::Error + Send + Sync>>
where
    S: Serialize,
{
    let mut w = Writer::from_writer(Vec::new());
    rows.iter().try_for_each(|row| w.serialize(row))?;
    Ok(String::from_utf8(w.into_inner()?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_dump_and_parse() {
        let curve = [[0., 0.5], [-1.25, 3.]];
        let s = dump_csv(&curve).unwrap();
        assert_eq!(s, "0.0,0.5\n-1.25,3.0\n");
        assert_eq!(parse_curve(&s).unwrap(), curve);
    }

    #[test]
    fn bad_row() {
        assert!(parse_curve("0,0\n1,a\n").is_err());
        assert!(parse_curve("0,0\n1\n").is_err());
    }
}
