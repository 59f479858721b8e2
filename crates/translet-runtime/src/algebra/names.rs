//! Lexical checks for names built at run time (`xsl:element`, `xsl:attribute`).
use crate::error::{Error, ErrorCode};

/// Resolves a namespace prefix against the in-scope declarations of some node.
pub trait NamespaceResolver {
    fn resolve_prefix(&self, prefix: &str) -> Option<String>;
}

/// No declarations in scope; only the `xml` prefix resolves.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNamespaces;

impl NamespaceResolver for NoNamespaces {
    fn resolve_prefix(&self, prefix: &str) -> Option<String> {
        (prefix == "xml").then(|| crate::consts::XML_URI.to_string())
    }
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c, '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

pub fn is_ncname(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if is_name_start_char(c) => chars.all(is_name_char),
        _ => false,
    }
}

/// `prefix:local` with both parts NCNames, or a bare NCName.
pub fn is_qname(s: &str) -> bool {
    match s.split_once(':') {
        Some((prefix, local)) => is_ncname(prefix) && is_ncname(local),
        None => is_ncname(s),
    }
}

/// Split a lexical QName into `(prefix, local)`; the prefix is empty when absent.
pub fn split_qname(s: &str) -> (&str, &str) {
    s.split_once(':').unwrap_or(("", s))
}

pub fn check_ncname(name: &str) -> Result<(), Error> {
    if is_ncname(name) { Ok(()) } else { Err(Error::from_code(ErrorCode::INVALID_NCNAME_ERR, [name])) }
}

pub fn check_qname(name: &str) -> Result<(), Error> {
    if is_qname(name) { Ok(()) } else { Err(Error::from_code(ErrorCode::INVALID_QNAME_ERR, [name])) }
}

/// Attribute names are QNames that must not be `xmlns` itself.
pub fn check_attribute_qname(name: &str) -> Result<(), Error> {
    let first = name.find(':');
    let last = name.rfind(':');
    let local = last.map_or(name, |i| &name[i + 1..]);
    if let (Some(first), Some(last)) = (first, last) {
        let prefix = &name[..first];
        if first != last {
            let inner = &name[first + 1..last];
            if !is_ncname(inner) {
                return Err(Error::from_code(ErrorCode::INVALID_QNAME_ERR, [format!("{inner}:{local}")]));
            }
        }
        if !is_ncname(prefix) {
            return Err(Error::from_code(ErrorCode::INVALID_QNAME_ERR, [format!("{prefix}:{local}")]));
        }
    }
    if !is_ncname(local) || local == "xmlns" {
        return Err(Error::from_code(ErrorCode::INVALID_QNAME_ERR, [local]));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a", true)]
    #[case("_x-1.b", true)]
    #[case("élan", true)]
    #[case("1abc", false)]
    #[case("-a", false)]
    #[case("a:b", false)]
    #[case("", false)]
    #[case("a b", false)]
    fn ncname_rules(#[case] s: &str, #[case] ok: bool) {
        assert_eq!(is_ncname(s), ok);
        assert_eq!(check_ncname(s).is_ok(), ok);
    }

    #[rstest]
    #[case("p:local", true)]
    #[case("local", true)]
    #[case(":local", false)]
    #[case("p:", false)]
    #[case("a:b:c", false)]
    fn qname_rules(#[case] s: &str, #[case] ok: bool) {
        assert_eq!(check_qname(s).is_ok(), ok);
    }

    #[test]
    fn attribute_names_reject_xmlns() {
        assert!(check_attribute_qname("xmlns").is_err());
        assert!(check_attribute_qname("p:xmlns").is_err());
        assert!(check_attribute_qname("xmlns:p").is_ok());
        assert!(check_attribute_qname("a:b:c").is_ok());
        let err = check_attribute_qname("1p:local").unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_QNAME_ERR);
        assert_eq!(err.args, vec!["1p:local".to_string()]);
    }

    #[test]
    fn split_keeps_local_when_unprefixed() {
        assert_eq!(split_qname("p:a"), ("p", "a"));
        assert_eq!(split_qname("a"), ("", "a"));
    }
}
