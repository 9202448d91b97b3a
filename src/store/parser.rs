//! Line-oriented dataset parsing.
//!
//! # Responsibilities
//! - Split raw text into trimmed lines
//! - Skip blank lines and `#` comments
//! - Split each line into fields by the format's delimiter
//! - Report lines with the wrong field count without aborting
//!
//! # Design Decisions
//! - Pure function: no I/O, no logging; the loader decides what to log
//! - Empty fields are dropped before counting, so `user=` is one field
//! - Positional lines keep interior empty fields but drop trailing ones,
//!   so `user::false` has three fields and `user:abc:` has two
//! - Multi-valued fields collapse duplicates but keep first-seen order

/// How a dataset file lays out its lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFormat {
    /// One key per line, no delimiter (fixed whitelist).
    List,
    /// `key<delimiter>v1,v2,...` (group mapping, variable whitelist).
    KeyValues { delimiter: char },
    /// Exactly `count` fields separated by `delimiter` (password file).
    Fields { delimiter: char, count: usize },
}

/// One successfully parsed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based line number in the source.
    pub line_no: usize,
    pub key: String,
    /// For `KeyValues`: the deduplicated value list.
    /// For `Fields`: every field after the key, in order.
    /// For `List`: empty.
    pub values: Vec<String>,
}

/// A line that did not match the expected layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLine {
    pub line_no: usize,
    pub line: String,
    /// Number of fields actually found.
    pub fields: usize,
}

/// Result of parsing one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parsed {
    pub records: Vec<Record>,
    pub invalid: Vec<InvalidLine>,
}

/// Parse `input` according to `format`.
pub fn parse(input: &str, format: LineFormat) -> Parsed {
    let mut parsed = Parsed::default();

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match parse_line(line, line_no, format) {
            Ok(record) => parsed.records.push(record),
            Err(fields) => parsed.invalid.push(InvalidLine {
                line_no,
                line: line.to_string(),
                fields,
            }),
        }
    }

    parsed
}

fn parse_line(line: &str, line_no: usize, format: LineFormat) -> Result<Record, usize> {
    match format {
        LineFormat::List => Ok(Record {
            line_no,
            key: line.to_string(),
            values: Vec::new(),
        }),
        LineFormat::KeyValues { delimiter } => {
            let fields = tokens(line, delimiter);
            if fields.len() != 2 {
                return Err(fields.len());
            }
            let values = split_values(fields[1]);
            if values.is_empty() {
                return Err(1);
            }
            Ok(Record {
                line_no,
                key: fields[0].to_string(),
                values,
            })
        }
        LineFormat::Fields { delimiter, count } => {
            // Positional format: interior empty fields are significant,
            // trailing ones are dropped so a truncated line is short.
            let mut fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();
            while fields.last().is_some_and(|f| f.is_empty()) {
                fields.pop();
            }
            if fields.len() != count || fields[0].is_empty() {
                return Err(fields.len());
            }
            Ok(Record {
                line_no,
                key: fields[0].to_string(),
                values: fields[1..].iter().map(|f| f.to_string()).collect(),
            })
        }
    }
}

fn tokens(line: &str, delimiter: char) -> Vec<&str> {
    line.split(delimiter)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Split a comma separated value list, dropping empties and duplicates.
pub fn split_values(field: &str) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for value in tokens(field, ',') {
        if !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUPS: LineFormat = LineFormat::KeyValues { delimiter: '=' };

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let input = "# header\n\n   \n  # indented comment\nalice=admins\n";
        let parsed = parse(input, GROUPS);

        assert_eq!(parsed.records.len(), 1);
        assert!(parsed.invalid.is_empty());
        assert_eq!(parsed.records[0].key, "alice");
        assert_eq!(parsed.records[0].line_no, 5);
    }

    #[test]
    fn test_key_values_dedup_and_trim() {
        let parsed = parse("  bob = g1, g2 ,g1,,g3  ", GROUPS);
        assert_eq!(parsed.records[0].key, "bob");
        assert_eq!(parsed.records[0].values, vec!["g1", "g2", "g3"]);
    }

    #[test]
    fn test_wrong_field_count_is_reported() {
        let input = "a=b=c\nlonely\nuser=\nok=g";
        let parsed = parse(input, GROUPS);

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].key, "ok");

        let counts: Vec<(usize, usize)> = parsed
            .invalid
            .iter()
            .map(|i| (i.line_no, i.fields))
            .collect();
        assert_eq!(counts, vec![(1, 3), (2, 1), (3, 1)]);
    }

    #[test]
    fn test_one_bad_line_among_ten() {
        let mut input = String::new();
        for i in 0..10 {
            input.push_str(&format!("10.0.0.{}:user{}\n", i, i));
            if i == 4 {
                input.push_str("garbage line without delimiter\n");
            }
        }
        let parsed = parse(&input, LineFormat::KeyValues { delimiter: ':' });

        assert_eq!(parsed.records.len(), 10);
        assert_eq!(parsed.invalid.len(), 1);
        assert_eq!(parsed.invalid[0].line_no, 6);
    }

    #[test]
    fn test_list_format() {
        let parsed = parse("192.168.1.1\n# 192.168.1.100\n 192.168.1.5 \n", LineFormat::List);
        let keys: Vec<&str> = parsed.records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["192.168.1.1", "192.168.1.5"]);
    }

    #[test]
    fn test_positional_fields() {
        let format = LineFormat::Fields { delimiter: ':', count: 3 };
        let parsed = parse("user4:null:true\nuser2:abc\nuser3:a:b:c\nuser9::false", format);

        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].values, vec!["null", "true"]);
        assert_eq!(parsed.records[1].key, "user9");
        assert_eq!(parsed.records[1].values, vec!["", "false"]);
        assert_eq!(parsed.invalid.len(), 2);
    }

    #[test]
    fn test_positional_trailing_empties_are_dropped() {
        let format = LineFormat::Fields { delimiter: ':', count: 3 };
        let parsed = parse("user5:abc:\nuser6::\nuser7: abc : \nuser8::true", format);

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].key, "user8");
        let counts: Vec<(usize, usize)> = parsed
            .invalid
            .iter()
            .map(|i| (i.line_no, i.fields))
            .collect();
        assert_eq!(counts, vec![(1, 2), (2, 1), (3, 2)]);
    }
}
