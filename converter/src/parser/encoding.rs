//! Encoding detection and decoding for raw CSV bytes.
//!
//! Spreadsheet exports are frequently Latin-1 or Windows-1252 rather than
//! UTF-8; the conversion core only ever sees the decoded `String`.

const UTF8_BOM: char = '\u{feff}';

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let (charset, _confidence, _language) = chardet::detect(bytes);

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        "" => "utf-8".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to a string using the given encoding.
///
/// Unknown encodings fall back to lossy UTF-8. A leading byte order mark is
/// removed so it never ends up inside the first header name.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    match decoded.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_string(),
        None => decoded,
    }
}

/// Detect then decode.
pub fn decode_auto(bytes: &[u8]) -> (String, String) {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    (content, encoding)
}
