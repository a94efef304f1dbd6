use {
    crate::UnsupportedMethodError,
    std::{
        fmt::{Display, Formatter, Result as FmtResult},
        str::FromStr,
    },
};

/// The HTTP methods the platform client can issue.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HttpMethod {
    /// `GET`
    Get,

    /// `POST`
    Post,

    /// `PUT`
    Put,

    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// The uppercase method name, as it appears in the string to sign.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// The corresponding [`http::Method`].
    pub fn to_http(self) -> http::Method {
        match self {
            Self::Get => http::Method::GET,
            Self::Post => http::Method::POST,
            Self::Put => http::Method::PUT,
            Self::Delete => http::Method::DELETE,
        }
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = UnsupportedMethodError;

    /// Parse a method name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, UnsupportedMethodError> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            _ => Err(UnsupportedMethodError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::{HttpMethod, UnsupportedMethodError},
        std::str::FromStr,
    };

    #[test_log::test]
    fn test_parse() {
        assert_eq!(HttpMethod::from_str("GET"), Ok(HttpMethod::Get));
        assert_eq!(HttpMethod::from_str("post"), Ok(HttpMethod::Post));
        assert_eq!(HttpMethod::from_str("Put"), Ok(HttpMethod::Put));
        assert_eq!(HttpMethod::from_str("DELETE"), Ok(HttpMethod::Delete));

        for bad in ["PATCH", "HEAD", "OPTIONS", "", "GET "] {
            assert_eq!(HttpMethod::from_str(bad), Err(UnsupportedMethodError(bad.to_string())));
        }
    }

    #[test_log::test]
    fn test_to_http() {
        for method in [HttpMethod::Get, HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete] {
            assert_eq!(method.to_http().as_str(), method.as_str());
            assert_eq!(method.to_string(), method.as_str());
        }
    }
}
