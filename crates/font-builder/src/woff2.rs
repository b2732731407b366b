//! WOFF2 encoding of an sfnt binary.

use log::debug;
use read_fonts::FontRef;
use ttf2woff2::{BrotliQuality, encode};

use crate::error::{Error, Result};

/// Encode a TrueType binary as WOFF2 at the default Brotli quality.
pub fn compress(sfnt: &[u8]) -> Result<Vec<u8>> {
    FontRef::new(sfnt)?;
    let woff2 = encode(sfnt, BrotliQuality::default()).map_err(|e| Error::Woff2(e.to_string()))?;
    debug!("WOFF2: {} -> {} bytes", sfnt.len(), woff2.len());
    Ok(woff2)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::IconFontBuilder;

    #[test]
    fn test_signature_and_length() {
        let mut builder = IconFontBuilder::new("woff2-test");
        builder
            .add_glyph(
                "square",
                '\u{EA01}',
                r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path d="M2 2h20v20H2z"/></svg>"#,
            )
            .unwrap();
        let ttf = builder.build().unwrap();

        let woff2 = compress(&ttf).unwrap();
        assert_eq!(&woff2[0..4], b"wOF2");
        let length = u32::from_be_bytes(woff2[8..12].try_into().unwrap());
        assert_eq!(length as usize, woff2.len());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(compress(b"not a font"), Err(Error::ReadError(_))));
    }
}
