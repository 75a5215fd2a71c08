use super::{LineEnding, NmeaError};

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// `*hh`
const CHECKSUM_FIELD_LEN: usize = 3;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Checksummed {
    pub checksum: u8,
    /// Total length of the sentence after the checksum and line ending.
    pub len: usize,
}

/// XOR of every byte in `body`, ignoring a leading `$`.
pub fn checksum(body: &[u8]) -> u8 {
    let body = body.strip_prefix(b"$").unwrap_or(body);
    body.iter().fold(0, |acc, b| acc ^ b)
}

/// Appends `*hh` and the line ending after the first `body_len` bytes of
/// `buf`.
///
/// The body must not already contain a `*`; running this twice over the
/// same sentence is rejected rather than producing a double checksum.
pub fn append_checksum(
    buf: &mut [u8],
    body_len: usize,
    ending: LineEnding,
) -> Result<Checksummed, NmeaError> {
    let needed = body_len + CHECKSUM_FIELD_LEN + ending.len();
    if buf.len() < needed {
        return Err(NmeaError::InsufficientBuffer {
            needed,
            available: buf.len(),
        });
    }

    let (body, tail) = buf.split_at_mut(body_len);
    if body.contains(&b'*') {
        return Err(NmeaError::InvalidInput);
    }
    let sum = checksum(body);

    tail[0] = b'*';
    tail[1] = HEX_DIGITS[usize::from(sum >> 4)];
    tail[2] = HEX_DIGITS[usize::from(sum & 0x0f)];
    tail[CHECKSUM_FIELD_LEN..CHECKSUM_FIELD_LEN + ending.len()].copy_from_slice(ending.as_bytes());

    Ok(Checksummed {
        checksum: sum,
        len: needed,
    })
}

/// Checks the `*hh` suffix of a complete sentence. Trailing CR/LF is
/// ignored and either hex case is accepted.
pub fn verify(sentence: &[u8]) -> bool {
    let sentence = trim_line_ending(sentence);
    let Some(star) = sentence.iter().rposition(|&b| b == b'*') else {
        return false;
    };
    let (body, digits) = (&sentence[..star], &sentence[star + 1..]);
    if !body.starts_with(b"$") || digits.len() != 2 {
        return false;
    }

    match (hex_value(digits[0]), hex_value(digits[1])) {
        (Some(hi), Some(lo)) => checksum(body) == (hi << 4 | lo),
        _ => false,
    }
}

fn trim_line_ending(mut s: &[u8]) -> &[u8] {
    while let [rest @ .., b'\r' | b'\n'] = s {
        s = rest;
    }
    s
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLL: &[u8] = b"$GPGLL,5300.97914,N,00259.98174,E,125926,A";
    const GGA: &[u8] = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,";

    #[test]
    fn known_sentences() {
        assert_eq!(checksum(GLL), 0x28);
        assert_eq!(checksum(GGA), 0x47);
    }

    #[test]
    fn leading_dollar_is_optional() {
        assert_eq!(checksum(&GGA[1..]), checksum(GGA));
    }

    #[test]
    fn appends_checksum_and_line_ending() {
        let mut buf = [0u8; 96];
        buf[..GGA.len()].copy_from_slice(GGA);

        let out = append_checksum(&mut buf, GGA.len(), LineEnding::CrLf).unwrap();
        assert_eq!(out.checksum, 0x47);
        assert_eq!(out.len, GGA.len() + 5);
        assert_eq!(&buf[GGA.len()..out.len], b"*47\r\n");
        assert!(verify(&buf[..out.len]));
    }

    #[test]
    fn hex_digits_are_zero_padded() {
        // 0x41 ^ 0x42
        let mut buf = [0u8; 8];
        buf[..3].copy_from_slice(b"$AB");
        let out = append_checksum(&mut buf, 3, LineEnding::None).unwrap();
        assert_eq!(&buf[..out.len], b"$AB*03");
    }

    #[test]
    fn refuses_short_buffer() {
        let mut buf = [0u8; 8];
        buf[..6].copy_from_slice(b"$GPXYZ");
        assert_eq!(
            append_checksum(&mut buf, 6, LineEnding::None),
            Err(NmeaError::InsufficientBuffer {
                needed: 9,
                available: 8
            })
        );
        // untouched past the body
        assert_eq!(&buf[6..], &[0, 0]);

        let mut buf = [0u8; 10];
        buf[..6].copy_from_slice(b"$GPXYZ");
        assert!(append_checksum(&mut buf, 6, LineEnding::Lf).is_ok());
        assert!(matches!(
            append_checksum(&mut buf[..9], 6, LineEnding::Lf),
            Err(NmeaError::InsufficientBuffer { needed: 10, .. })
        ));
    }

    #[test]
    fn second_append_is_rejected() {
        let mut buf = [0u8; 32];
        buf[..6].copy_from_slice(b"$GPXYZ");
        let first = append_checksum(&mut buf, 6, LineEnding::None).unwrap();
        assert_eq!(
            append_checksum(&mut buf, first.len, LineEnding::None),
            Err(NmeaError::InvalidInput)
        );
    }

    #[test]
    fn verify_accepts_lowercase_and_line_endings() {
        assert!(verify(b"$GPGLL,5300.97914,N,00259.98174,E,125926,A*28\r\n"));
        assert!(verify(b"$GPAAM,A,A,0.10,N,WPTNME*32"));
        assert!(verify(b"$GPAAM,A,A,0.10,N,WPTNME*32\n"));
        assert!(verify(b"$GPXYZ*4c"));
    }

    #[test]
    fn verify_rejects_bad_sentences() {
        assert!(!verify(b"$GPGLL,5300.97914,N,00259.98174,E,125926,A*29"));
        assert!(!verify(b"$GPGLL,5300.97914,N,00259.98174,E,125926,A"));
        assert!(!verify(b"GPGLL,5300.97914,N,00259.98174,E,125926,A*28"));
        assert!(!verify(b"$GPXYZ*0"));
        assert!(!verify(b"$GPXYZ*0G"));
    }
}
