//! Header line parsing, delimiter sniffing and header keys.

/// Delimiters seen in spreadsheet exports, in tie-break order.
const CANDIDATE_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// Picks the delimiter that splits the header line into the most fields.
///
/// Only characters outside quotes are counted. Falls back to `,`.
pub fn sniff_delimiter(header_line: &str) -> u8 {
    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut in_quotes = false;

    for byte in header_line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(idx) = CANDIDATE_DELIMITERS.iter().position(|d| *d == byte) {
            counts[idx] += 1;
        }
    }

    let mut best = 0;
    for idx in 1..counts.len() {
        if counts[idx] > counts[best] {
            best = idx;
        }
    }
    CANDIDATE_DELIMITERS[best]
}

/// Parses one CSV line into trimmed fields, handling quoted values.
pub fn parse_header_line(line: &str, delimiter: u8) -> Vec<String> {
    let delimiter = char::from(delimiter);
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if !in_quotes => {
                in_quotes = true;
            }
            '"' if in_quotes => {
                // Escaped quote ("")
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            c if c == delimiter && !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => {
                current.push(c);
            }
        }
    }

    fields.push(current.trim().to_string());
    fields
}

/// Deterministic key used to match a source header to a declared column.
///
/// Lowercases, turns underscores and brackets into spaces, drops punctuation
/// at either end and collapses runs of whitespace. `Container No.`,
/// `container  no` and `CONTAINER_NO` all share the key `container no`.
pub fn header_key(header: &str) -> String {
    let spaced: String = header
        .chars()
        .map(|ch| match ch {
            '_' | '(' | ')' | '[' | ']' => ' ',
            other => other,
        })
        .collect::<String>()
        .to_lowercase();

    let trimmed = spaced.trim_matches(|ch: char| !ch.is_alphanumeric());
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("A,B,C"), b',');
        assert_eq!(sniff_delimiter("A;B;C"), b';');
        assert_eq!(sniff_delimiter("A\tB\tC"), b'\t');
        assert_eq!(sniff_delimiter("\"A;1\",B,C"), b',');
        assert_eq!(sniff_delimiter("single"), b',');
    }

    #[test]
    fn test_parse_header_line_quoted() {
        let fields = parse_header_line("\"Release Number\";\"Qty \"\"PC\"\"\"; Piece ", b';');
        assert_eq!(fields, vec!["Release Number", "Qty \"PC\"", "Piece"]);
    }

    #[test]
    fn test_header_key_variants_collide() {
        assert_eq!(header_key("Container No."), "container no");
        assert_eq!(header_key(" container  no "), "container no");
        assert_eq!(header_key("CONTAINER_NO"), "container no");
        assert_eq!(header_key("Qty(PC)"), header_key("Qty (PC)"));
        assert_eq!(header_key("Outbound Date"), header_key("Outbound date"));
    }
}
