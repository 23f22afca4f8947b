// Delimited-text header and row-count extraction

use std::io::Read;
use std::path::Path;

/// Header cells and data-row count of a delimited file.
pub fn summarize(path: &Path) -> Result<(Vec<String>, usize), String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    summarize_str(&content, delimiter)
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(10)
        .collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: (number of lines with same field count as line 1) * field_count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

/// First record is the header. Data records that are entirely empty are not
/// counted; a record wider than the header is a parse error.
pub fn summarize_str(content: &str, delimiter: u8) -> Result<(Vec<String>, usize), String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header: Vec<String> = match records.next() {
        Some(record) => record
            .map_err(|e| format!("cannot parse CSV: {e}"))?
            .iter()
            .map(str::to_string)
            .collect(),
        None => return Ok((Vec::new(), 0)),
    };

    let mut rows = 0usize;
    for result in records {
        let record = result.map_err(|e| format!("cannot parse CSV: {e}"))?;
        if record.len() > header.len() {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(format!(
                "cannot parse CSV: line {line}: expected {} fields, saw {}",
                header.len(),
                record.len()
            ));
        }
        if record.iter().any(|field| !field.is_empty()) {
            rows += 1;
        }
    }

    Ok((header, rows))
}
