use thiserror::Error;

/// Bytes inspected when guessing the encoding of a large payload.
pub const PROBE_LEN: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    /// Fallback: every byte maps to one character, so it always decodes.
    Latin1,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextDecodeError {
    #[error("invalid {encoding:?} sequence at byte {offset}")]
    Invalid {
        encoding: TextEncoding,
        offset: usize,
    },

    #[error("{encoding:?} payload ends inside a character")]
    Truncated { encoding: TextEncoding },
}

/// Result of decoding one character at the head of a byte slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Char(char, usize),
    /// The slice ends before the character does.
    Incomplete,
    Invalid,
}

impl TextEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Utf16Le => "UTF-16LE",
            TextEncoding::Utf16Be => "UTF-16BE",
            TextEncoding::Latin1 => "ISO-8859-1",
        }
    }

    /// Widest encoded character. Sizes the decode window so it always holds
    /// the requested number of whole characters.
    pub fn max_bytes_per_char(&self) -> usize {
        match self {
            TextEncoding::Utf8 => 4,
            TextEncoding::Utf16Le | TextEncoding::Utf16Be => 4,
            TextEncoding::Latin1 => 1,
        }
    }

    /// Width of every character, for encodings where it is constant.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            TextEncoding::Latin1 => Some(1),
            _ => None,
        }
    }

    pub(crate) fn step(&self, bytes: &[u8]) -> Step {
        match self {
            TextEncoding::Utf8 => step_utf8(bytes),
            TextEncoding::Utf16Le => step_utf16(bytes, u16::from_le_bytes),
            TextEncoding::Utf16Be => step_utf16(bytes, u16::from_be_bytes),
            TextEncoding::Latin1 => match bytes.first() {
                Some(&b) => Step::Char(b as char, 1),
                None => Step::Incomplete,
            },
        }
    }
}

fn step_utf8(bytes: &[u8]) -> Step {
    let Some(&lead) = bytes.first() else {
        return Step::Incomplete;
    };
    let width = match lead {
        0x00..=0x7F => return Step::Char(lead as char, 1),
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return Step::Invalid,
    };

    if bytes.len() < width {
        return if bytes[1..].iter().all(|b| b & 0xC0 == 0x80) {
            Step::Incomplete
        } else {
            Step::Invalid
        };
    }

    match std::str::from_utf8(&bytes[..width]) {
        Ok(s) => match s.chars().next() {
            Some(c) => Step::Char(c, width),
            None => Step::Invalid,
        },
        Err(_) => Step::Invalid,
    }
}

fn step_utf16(bytes: &[u8], read: fn([u8; 2]) -> u16) -> Step {
    if bytes.len() < 2 {
        return Step::Incomplete;
    }
    let unit = read([bytes[0], bytes[1]]);
    match unit {
        0xD800..=0xDBFF => {
            if bytes.len() < 4 {
                return Step::Incomplete;
            }
            let low = read([bytes[2], bytes[3]]);
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Step::Invalid;
            }
            let scalar = 0x1_0000 + (((unit as u32) - 0xD800) << 10) + ((low as u32) - 0xDC00);
            match char::from_u32(scalar) {
                Some(c) => Step::Char(c, 4),
                None => Step::Invalid,
            }
        }
        0xDC00..=0xDFFF => Step::Invalid,
        _ => match char::from_u32(unit as u32) {
            Some(c) => Step::Char(c, 2),
            None => Step::Invalid,
        },
    }
}

/// Characters visited and bytes consumed by [`walk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Walked {
    pub chars: usize,
    pub consumed: usize,
}

/// Visit up to `max_chars` characters at the head of `bytes`.
///
/// `at_end` tells whether `bytes` ends where the payload ends. If it does not,
/// a character cut by the end of the slice stops the walk; if it does, that
/// cut is an error.
pub(crate) fn walk(
    encoding: TextEncoding,
    bytes: &[u8],
    max_chars: usize,
    at_end: bool,
    mut visit: impl FnMut(char),
) -> Result<Walked, TextDecodeError> {
    let mut walked = Walked {
        chars: 0,
        consumed: 0,
    };

    while walked.chars < max_chars && walked.consumed < bytes.len() {
        match encoding.step(&bytes[walked.consumed..]) {
            Step::Char(c, width) => {
                visit(c);
                walked.chars += 1;
                walked.consumed += width;
            }
            Step::Incomplete if at_end => return Err(TextDecodeError::Truncated { encoding }),
            Step::Incomplete => break,
            Step::Invalid => {
                return Err(TextDecodeError::Invalid {
                    encoding,
                    offset: walked.consumed,
                })
            }
        }
    }

    Ok(walked)
}

/// Decode up to `max_chars` characters; see [`walk`] for `at_end`.
pub(crate) fn decode_prefix(
    encoding: TextEncoding,
    bytes: &[u8],
    max_chars: usize,
    at_end: bool,
) -> Result<(String, Walked), TextDecodeError> {
    let mut text = String::with_capacity(bytes.len().min(max_chars.saturating_mul(4)));
    let walked = walk(encoding, bytes, max_chars, at_end, |c| text.push(c))?;
    Ok((text, walked))
}

/// Outcome of probing a payload prefix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub encoding: TextEncoding,
    /// Length of the byte-order mark to skip.
    pub bom_len: usize,
    /// Bytes per character observed in the probe.
    pub bytes_per_char: f64,
}

/// Guess the encoding of `bytes` from its first [`PROBE_LEN`] bytes.
///
/// Order: byte-order mark, UTF-16 zero-byte pattern, UTF-8, then Latin-1.
pub fn detect(bytes: &[u8]) -> Detection {
    let probe = &bytes[..bytes.len().min(PROBE_LEN)];
    let probe_is_whole = probe.len() == bytes.len();

    let (encoding, bom_len) = if probe.starts_with(&[0xEF, 0xBB, 0xBF]) {
        (TextEncoding::Utf8, 3)
    } else if probe.starts_with(&[0xFF, 0xFE]) {
        (TextEncoding::Utf16Le, 2)
    } else if probe.starts_with(&[0xFE, 0xFF]) {
        (TextEncoding::Utf16Be, 2)
    } else {
        let guess = utf16_pattern(probe)
            .filter(|enc| validates(*enc, probe, probe_is_whole))
            .or_else(|| {
                validates(TextEncoding::Utf8, probe, probe_is_whole).then_some(TextEncoding::Utf8)
            })
            .unwrap_or(TextEncoding::Latin1);
        (guess, 0)
    };

    let bytes_per_char = sample_ratio(encoding, &probe[bom_len.min(probe.len())..]);

    Detection {
        encoding,
        bom_len,
        bytes_per_char,
    }
}

fn validates(encoding: TextEncoding, probe: &[u8], at_end: bool) -> bool {
    walk(encoding, probe, usize::MAX, at_end, |_| {}).is_ok()
}

/// Text in the Basic Latin range encoded as UTF-16 has a zero in every other byte.
fn utf16_pattern(probe: &[u8]) -> Option<TextEncoding> {
    let pairs = probe.len() / 2;
    if pairs < 2 {
        return None;
    }
    let zeros_at = |parity: usize| {
        probe
            .iter()
            .skip(parity)
            .step_by(2)
            .take(pairs)
            .filter(|b| **b == 0)
            .count()
    };
    let even = zeros_at(0);
    let odd = zeros_at(1);

    if odd * 10 >= pairs * 3 && even * 10 < pairs {
        Some(TextEncoding::Utf16Le)
    } else if even * 10 >= pairs * 3 && odd * 10 < pairs {
        Some(TextEncoding::Utf16Be)
    } else {
        None
    }
}

fn sample_ratio(encoding: TextEncoding, sample: &[u8]) -> f64 {
    match walk(encoding, sample, usize::MAX, false, |_| {}) {
        Ok(walked) if walked.chars > 0 => walked.consumed as f64 / walked.chars as f64,
        _ => encoding.fixed_width().unwrap_or(1) as f64,
    }
}
