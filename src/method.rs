use crate::error::*;
use http::Method;

const METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
];

/// Uppercase `method` and check it against the supported method set.
pub fn canonical_method(method: &str) -> Result<Method> {
    let upper = method.to_ascii_uppercase();
    METHODS
        .into_iter()
        .find(|m| m.as_str() == upper)
        .ok_or_else(|| InvalidMethodSnafu { method }.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn canonical_method_should_uppercase() -> Result<()> {
        assert_eq!(canonical_method("get")?, Method::GET);
        assert_eq!(canonical_method("Post")?, Method::POST);
        assert_eq!(canonical_method("pAtCh")?, Method::PATCH);
        assert_eq!(canonical_method("OPTIONS")?.as_str(), "OPTIONS");
        Ok(())
    }

    #[test]
    fn canonical_method_should_reject_unknown() {
        for method in ["TRACE", "CONNECT", "FETCH", "", "GET "] {
            let err = canonical_method(method).unwrap_err();
            assert!(matches!(&err, Error::InvalidMethod { method: m } if m == method));
        }
    }
}
