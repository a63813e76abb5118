use std::cell::OnceCell;

/// An atom: text with lazily probed numeric and boolean readings.
///
/// A word built from a number keeps the exact double, so probing it returns
/// the same bits. A word built from text is parsed on first probe; the
/// result (including failure) is cached.
pub struct Word {
    text: OnceCell<String>,
    number: OnceCell<Option<f64>>,
    boolean: OnceCell<Option<bool>>,
    key: OnceCell<String>,
}

impl Word {
    pub fn from_text(text: &str) -> Self {
        Word {
            text: OnceCell::from(text.to_string()),
            number: OnceCell::new(),
            boolean: OnceCell::new(),
            key: OnceCell::new(),
        }
    }

    pub fn from_number(value: f64) -> Self {
        Word {
            text: OnceCell::new(),
            number: OnceCell::from(Some(value)),
            boolean: OnceCell::from(None),
            key: OnceCell::new(),
        }
    }

    pub fn from_bool(value: bool) -> Self {
        Word {
            text: OnceCell::from(if value { "true" } else { "false" }.to_string()),
            number: OnceCell::from(None),
            boolean: OnceCell::from(Some(value)),
            key: OnceCell::new(),
        }
    }

    pub fn text(&self) -> &str {
        self.text.get_or_init(|| {
            let n = self.number.get().copied().flatten().unwrap_or(0.0);
            format_number(n)
        })
    }

    /// Numeric reading, `None` if the text is not a number.
    pub fn number(&self) -> Option<f64> {
        *self.number.get_or_init(|| parse_number(self.text()))
    }

    /// Boolean reading: `true` or `false`, any case.
    pub fn boolean(&self) -> Option<bool> {
        *self.boolean.get_or_init(|| {
            let text = self.text();
            if text.eq_ignore_ascii_case("true") {
                Some(true)
            } else if text.eq_ignore_ascii_case("false") {
                Some(false)
            } else {
                None
            }
        })
    }

    /// Uppercase form used for names, tags and labels.
    pub fn key(&self) -> &str {
        self.key.get_or_init(|| self.text().to_uppercase())
    }

    pub fn is_empty(&self) -> bool {
        self.text().is_empty()
    }
}

/// Render a number the way words print it: integral values have no
/// fractional part, everything else uses the shortest round-trip digits.
/// Magnitudes outside `1e-6 ..< 1e21` switch to exponent form, `1e+300`.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Avoid "-0".
        return "0".to_string();
    }
    if !n.is_finite() {
        return format!("{}", n);
    }
    let scientific = format!("{:e}", n);
    let Some((mantissa, exp)) = scientific.split_once('e') else {
        return format!("{}", n);
    };
    let exp: i32 = match exp.parse() {
        Ok(exp) => exp,
        Err(_) => return format!("{}", n),
    };
    if (-6..21).contains(&exp) {
        return format!("{}", n);
    }
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{}e{}{:02}", mantissa, sign, exp.abs())
}

/// Logo number syntax: optional sign, digits with at most one point,
/// optional exponent. Spellings like `inf` and `nan` are words.
pub fn parse_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'-' || bytes[i] == b'+') {
        i += 1;
    }
    let mut digits = 0;
    let mut seen_point = false;
    while i < bytes.len() {
        match bytes[i] {
            b'0'..=b'9' => digits += 1,
            b'.' if !seen_point => seen_point = true,
            _ => break,
        }
        i += 1;
    }
    if digits == 0 {
        return None;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'-' || bytes[i] == b'+') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return None;
        }
    }
    if i != bytes.len() {
        return None;
    }
    text.parse::<f64>().ok()
}
