//! Header extensions used for demuxing
//!
//! Identifies the SDES header extensions (RFC 8843 MID, RFC 8852 RtpStreamId and
//! RepairedRtpStreamId) and the rules for legal values.

/// Maximum value size of an SDES header extension in bytes
///
/// Values are carried in one-byte header extension elements, which cap the
/// data length at 16 bytes.
pub const MAX_VALUE_SIZE_BYTES: usize = 16;

/// SDES header extension kinds relevant for demuxing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdesExtension {
    /// Media identification (BUNDLE)
    Mid,
    /// RTP stream identifier
    RtpStreamId,
    /// Repaired RTP stream identifier
    RepairedRtpStreamId,
}

impl SdesExtension {
    /// Extension URI as negotiated in SDP `a=extmap`
    pub fn uri(&self) -> &'static str {
        match self {
            SdesExtension::Mid => "urn:ietf:params:rtp-hdrext:sdes:mid",
            SdesExtension::RtpStreamId => "urn:ietf:params:rtp-hdrext:sdes:rtp-stream-id",
            SdesExtension::RepairedRtpStreamId => {
                "urn:ietf:params:rtp-hdrext:sdes:repaired-rtp-stream-id"
            }
        }
    }

    /// Look up an extension by its URI
    pub fn from_uri(uri: &str) -> Option<Self> {
        [
            SdesExtension::Mid,
            SdesExtension::RtpStreamId,
            SdesExtension::RepairedRtpStreamId,
        ]
        .into_iter()
        .find(|ext| ext.uri() == uri)
    }

    /// Whether `value` may be carried by this extension
    pub fn is_legal_value(&self, value: &str) -> bool {
        match self {
            SdesExtension::Mid => is_legal_mid_name(value),
            SdesExtension::RtpStreamId | SdesExtension::RepairedRtpStreamId => {
                is_legal_rsid_name(value)
            }
        }
    }
}

/// RFC 4566 `token-char`
fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '^' | '_' | '`' | '{'
                | '|' | '}' | '~'
        )
}

/// Check that `mid` is a non-empty token that fits in a header extension
pub fn is_legal_mid_name(mid: &str) -> bool {
    !mid.is_empty() && mid.len() <= MAX_VALUE_SIZE_BYTES && mid.chars().all(is_token_char)
}

/// Check that `rsid` is a non-empty alphanumeric string that fits in a header extension
pub fn is_legal_rsid_name(rsid: &str) -> bool {
    !rsid.is_empty()
        && rsid.len() <= MAX_VALUE_SIZE_BYTES
        && rsid.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsid_legality() {
        assert!(is_legal_rsid_name("a"));
        assert!(is_legal_rsid_name("Layer0"));
        assert!(is_legal_rsid_name("abcdefghijklmnop"));

        assert!(!is_legal_rsid_name(""));
        assert!(!is_legal_rsid_name("abcdefghijklmnopq"));
        assert!(!is_legal_rsid_name("a-b"));
        assert!(!is_legal_rsid_name("a b"));
        assert!(!is_legal_rsid_name("ñ"));
    }

    #[test]
    fn test_mid_legality() {
        assert!(is_legal_mid_name("0"));
        assert!(is_legal_mid_name("audio"));
        assert!(is_legal_mid_name("video-1.hd"));
        assert!(is_legal_mid_name("a_b~c"));

        assert!(!is_legal_mid_name(""));
        assert!(!is_legal_mid_name("mid with space"));
        assert!(!is_legal_mid_name("a:b"));
        assert!(!is_legal_mid_name("0123456789abcdefX"));
    }

    #[test]
    fn test_uri_lookup() {
        for ext in [
            SdesExtension::Mid,
            SdesExtension::RtpStreamId,
            SdesExtension::RepairedRtpStreamId,
        ] {
            assert_eq!(SdesExtension::from_uri(ext.uri()), Some(ext));
        }
        assert_eq!(SdesExtension::from_uri("urn:ietf:params:rtp-hdrext:toffset"), None);
    }

    #[test]
    fn test_is_legal_value_per_kind() {
        assert!(SdesExtension::Mid.is_legal_value("a.b"));
        assert!(!SdesExtension::RtpStreamId.is_legal_value("a.b"));
        assert!(SdesExtension::RepairedRtpStreamId.is_legal_value("r1"));
    }
}
