//! RouterOS API length prefix and sentence framing.
//!
//! # Wire format
//!
//! ```text
//! LENGTH PREFIX:
//!   len < 0x80            [1 byte : len]
//!   len < 0x4000          [2 bytes BE: len | 0x8000]
//!   len < 0x200000        [3 bytes BE: len | 0xC00000]
//!   anything larger       rejected (the 4/5-byte forms are not used here)
//!
//! WORD:      [length prefix][len bytes UTF-8]
//! SENTENCE:  WORD* [1 byte: 0x00]
//! ```

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::MAX_WORD_LEN;
use crate::error::WireError;

/// Encodes a word length into its 1–3 byte prefix.
pub fn encode_length(length: i64) -> Result<Vec<u8>, WireError> {
    if length < 0 {
        return Err(WireError::NegativeLength(length));
    }
    if length >= MAX_WORD_LEN as i64 {
        return Err(WireError::WordTooLong(length));
    }

    let len = length as u32;
    if len < 0x80 {
        return Ok(vec![len as u8]);
    }
    if len < 0x4000 {
        let value = len | 0x8000;
        return Ok(vec![(value >> 8) as u8, value as u8]);
    }
    let value = len | 0xC0_0000;
    Ok(vec![(value >> 16) as u8, (value >> 8) as u8, value as u8])
}

/// Number of bytes a prefix occupies, judged by its first byte.
fn prefix_width(first: u8) -> Result<usize, WireError> {
    if first & 0x80 == 0 {
        Ok(1)
    } else if first & 0xC0 == 0x80 {
        Ok(2)
    } else if first & 0xE0 == 0xC0 {
        Ok(3)
    } else {
        Err(WireError::UnsupportedPrefix(first))
    }
}

/// Decodes a length prefix at the start of `buf`.
///
/// Returns `(length, bytes_consumed)`.
pub fn decode_length(buf: &[u8]) -> Result<(usize, usize), WireError> {
    let first = *buf.first().ok_or(WireError::Truncated)?;
    let width = prefix_width(first)?;
    if buf.len() < width {
        return Err(WireError::Truncated);
    }

    let length = match width {
        1 => first as usize,
        2 => ((first as usize & 0x3F) << 8) | buf[1] as usize,
        _ => ((first as usize & 0x1F) << 16) | ((buf[1] as usize) << 8) | buf[2] as usize,
    };
    Ok((length, width))
}

/// Encodes a full sentence: every word with its prefix, then the
/// zero-length terminator.
///
/// Empty words are rejected because they would terminate the sentence early.
pub fn encode_sentence<S: AsRef<str>>(words: &[S]) -> Result<Vec<u8>, WireError> {
    let mut payload = Vec::new();
    for word in words {
        let bytes = word.as_ref().as_bytes();
        if bytes.is_empty() {
            return Err(WireError::Protocol(
                "empty word inside a sentence".into(),
            ));
        }
        let len = i64::try_from(bytes.len()).map_err(|_| WireError::WordTooLong(i64::MAX))?;
        payload.extend_from_slice(&encode_length(len)?);
        payload.extend_from_slice(bytes);
    }
    payload.push(0);
    Ok(payload)
}

/// Decodes one sentence from the start of `buf`.
///
/// Returns the words and the number of bytes consumed, terminator included.
pub fn decode_sentence(buf: &[u8]) -> Result<(Vec<String>, usize), WireError> {
    let mut words = Vec::new();
    let mut pos = 0;

    loop {
        let (len, width) = decode_length(&buf[pos..])?;
        pos += width;
        if len == 0 {
            return Ok((words, pos));
        }
        let end = pos.checked_add(len).ok_or(WireError::Truncated)?;
        if buf.len() < end {
            return Err(WireError::Truncated);
        }
        words.push(utf8_word(buf[pos..end].to_vec())?);
        pos = end;
    }
}

fn utf8_word(bytes: Vec<u8>) -> Result<String, WireError> {
    String::from_utf8(bytes).map_err(|e| WireError::Protocol(format!("invalid UTF-8 word: {e}")))
}

/// Writes a sentence in a single `write_all`, then flushes.
pub async fn write_sentence<W, S>(writer: &mut W, words: &[S]) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
    S: AsRef<str>,
{
    let payload = encode_sentence(words)?;
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one sentence from the stream.
pub async fn read_sentence<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<String>, WireError> {
    let mut words = Vec::new();
    loop {
        let len = read_length(reader).await?;
        if len == 0 {
            return Ok(words);
        }
        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf).await?;
        words.push(utf8_word(buf)?);
    }
}

async fn read_length<R: AsyncRead + Unpin>(reader: &mut R) -> Result<usize, WireError> {
    let mut prefix = [0u8; 3];
    prefix[0] = reader.read_u8().await?;
    let width = prefix_width(prefix[0])?;
    if width > 1 {
        reader.read_exact(&mut prefix[1..width]).await?;
    }
    decode_length(&prefix[..width]).map(|(len, _)| len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_byte_lengths_are_verbatim() {
        for len in 0..0x80i64 {
            assert_eq!(encode_length(len).unwrap(), vec![len as u8]);
        }
    }

    #[test]
    fn two_byte_lengths_carry_10_tag() {
        for len in 0x80..0x4000i64 {
            let bytes = encode_length(len).unwrap();
            assert_eq!(bytes.len(), 2, "len {len:#x}");
            assert_eq!(bytes[0] >> 6, 0b10, "len {len:#x}");
        }
    }

    #[test]
    fn three_byte_lengths_carry_11_tag() {
        for len in (0x4000..0x20_0000i64).step_by(97).chain([0x4000, 0x1F_FFFF]) {
            let bytes = encode_length(len).unwrap();
            assert_eq!(bytes.len(), 3, "len {len:#x}");
            assert_eq!(bytes[0] >> 6, 0b11, "len {len:#x}");
        }
    }

    #[test]
    fn boundary_encodings() {
        assert_eq!(encode_length(0x7F).unwrap(), [0x7F]);
        assert_eq!(encode_length(0x80).unwrap(), [0x80, 0x80]);
        assert_eq!(encode_length(0x3FFF).unwrap(), [0xBF, 0xFF]);
        assert_eq!(encode_length(0x4000).unwrap(), [0xC0, 0x40, 0x00]);
        assert_eq!(encode_length(0x1F_FFFF).unwrap(), [0xDF, 0xFF, 0xFF]);
    }

    #[test]
    fn out_of_range_lengths_fail() {
        assert!(matches!(encode_length(-1), Err(WireError::NegativeLength(-1))));
        assert!(matches!(
            encode_length(0x20_0000),
            Err(WireError::WordTooLong(0x20_0000))
        ));
        assert!(encode_length(i64::MAX).is_err());
    }

    #[test]
    fn decode_length_inverts_encode_at_boundaries() {
        for len in [0usize, 1, 0x7F, 0x80, 0x3FFF, 0x4000, 0x1F_FFFF] {
            let bytes = encode_length(len as i64).unwrap();
            assert_eq!(decode_length(&bytes).unwrap(), (len, bytes.len()));
        }
    }

    #[test]
    fn decode_length_rejects_four_byte_form() {
        assert!(matches!(
            decode_length(&[0xE0, 0x20, 0x00, 0x00]),
            Err(WireError::UnsupportedPrefix(0xE0))
        ));
        assert!(matches!(decode_length(&[0x81]), Err(WireError::Truncated)));
        assert!(matches!(decode_length(&[]), Err(WireError::Truncated)));
    }

    #[test]
    fn login_sentence_layout() {
        let words = ["!login", "=name=admin", "=password=x"];
        let encoded = encode_sentence(&words).unwrap();

        let mut expected = Vec::new();
        for w in words {
            expected.push(w.len() as u8);
            expected.extend_from_slice(w.as_bytes());
        }
        expected.push(0);
        assert_eq!(encoded, expected);

        let (decoded, consumed) = decode_sentence(&encoded).unwrap();
        assert_eq!(decoded, words);
        assert_eq!(consumed, encoded.len());
    }

    #[test]
    fn long_word_uses_two_byte_prefix() {
        let word = "x".repeat(200);
        let encoded = encode_sentence(&[word.as_str()]).unwrap();
        assert_eq!(&encoded[..2], &[0x80, 0xC8]);
        assert_eq!(encoded.len(), 2 + 200 + 1);
        assert_eq!(*encoded.last().unwrap(), 0);
    }

    #[test]
    fn empty_sentence_is_just_terminator() {
        let words: [&str; 0] = [];
        assert_eq!(encode_sentence(&words).unwrap(), vec![0]);
    }

    #[test]
    fn empty_word_rejected() {
        assert!(matches!(
            encode_sentence(&["!exec", ""]),
            Err(WireError::Protocol(_))
        ));
    }

    #[test]
    fn decode_sentence_detects_truncation() {
        let encoded = encode_sentence(&["!done", "=ret=abc"]).unwrap();
        let cut = &encoded[..encoded.len() - 3];
        assert!(matches!(decode_sentence(cut), Err(WireError::Truncated)));
    }

    #[test]
    fn decode_sentence_stops_at_first_terminator() {
        let mut buf = encode_sentence(&["!done"]).unwrap();
        let first_len = buf.len();
        buf.extend(encode_sentence(&["!trap", "=message=nope"]).unwrap());

        let (words, consumed) = decode_sentence(&buf).unwrap();
        assert_eq!(words, ["!done"]);
        assert_eq!(consumed, first_len);

        let (second, _) = decode_sentence(&buf[consumed..]).unwrap();
        assert_eq!(second, ["!trap", "=message=nope"]);
    }

    #[test]
    fn decode_sentence_rejects_bad_utf8() {
        let buf = [0x02, 0xFF, 0xFE, 0x00];
        assert!(matches!(decode_sentence(&buf), Err(WireError::Protocol(_))));
    }

    #[tokio::test]
    async fn stream_helpers_agree_with_pure_codec() {
        let big = "y".repeat(0x4001);
        let words = vec!["!exec".to_string(), format!("=command={big}")];

        let mut buf = Vec::new();
        write_sentence(&mut buf, &words).await.unwrap();
        assert_eq!(buf, encode_sentence(&words).unwrap());

        let mut cursor = &buf[..];
        let read = read_sentence(&mut cursor).await.unwrap();
        assert_eq!(read, words);
        assert!(cursor.is_empty());
    }

    #[tokio::test]
    async fn read_sentence_eof_is_io_error() {
        let buf = [0x05, b'!', b'd'];
        let mut cursor = &buf[..];
        assert!(matches!(
            read_sentence(&mut cursor).await,
            Err(WireError::Io(_))
        ));
    }
}
