use std::error::Error;
use std::fmt;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

/// Error type used across all sortexec crates.
///
/// Boxed internally to keep `Result<T>` small on the happy path.
#[derive(Debug)]
pub struct DbError {
    inner: Box<DbErrorInner>,
}

#[derive(Debug)]
struct DbErrorInner {
    /// Message for the error.
    msg: String,
    /// Source of the error, if any.
    source: Option<Box<dyn Error + Send + Sync>>,
    /// Extra structured fields to include when displaying the error.
    fields: Vec<ErrorField>,
}

#[derive(Debug)]
struct ErrorField {
    key: &'static str,
    value: String,
}

impl DbError {
    pub fn new(msg: impl Into<String>) -> Self {
        DbError {
            inner: Box::new(DbErrorInner {
                msg: msg.into(),
                source: None,
                fields: Vec::new(),
            }),
        }
    }

    pub fn with_source(msg: impl Into<String>, source: Box<dyn Error + Send + Sync>) -> Self {
        DbError {
            inner: Box::new(DbErrorInner {
                msg: msg.into(),
                source: Some(source),
                fields: Vec::new(),
            }),
        }
    }

    /// Attach a key/value field to the error.
    pub fn with_field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.inner.fields.push(ErrorField {
            key,
            value: value.to_string(),
        });
        self
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.msg)?;

        for field in &self.inner.fields {
            write!(f, "\n  {}: {}", field.key, field.value)?;
        }

        if let Some(source) = &self.inner.source {
            write!(f, "\nError source: {source}")?;
        }

        Ok(())
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source.as_ref().map(|e| e.as_ref() as _)
    }
}

/// Extension trait for wrapping arbitrary errors with a message.
pub trait ResultExt<T, E> {
    /// Wrap an error with a static context string.
    fn context(self, msg: &'static str) -> Result<T>;

    /// Wrap an error with a lazily computed context string.
    fn context_fn<F>(self, f: F) -> Result<T>
    where
        F: Fn() -> String;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    fn context(self, msg: &'static str) -> Result<T> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(DbError::with_source(msg, Box::new(e))),
        }
    }

    fn context_fn<F>(self, f: F) -> Result<T>
    where
        F: Fn() -> String,
    {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(DbError::with_source(f(), Box::new(e))),
        }
    }
}

pub trait OptionExt<T> {
    /// Return an error if the option is None.
    fn required(self, msg: &'static str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn required(self, msg: &'static str) -> Result<T> {
        match self {
            Some(v) => Ok(v),
            None => Err(DbError::new(format!("Missing required value: {msg}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_fields_and_source() {
        let err = "abc"
            .parse::<i64>()
            .context("Failed to parse sort key")
            .unwrap_err()
            .with_field("column", 3);

        let s = err.to_string();
        assert!(s.starts_with("Failed to parse sort key"));
        assert!(s.contains("column: 3"));
        assert!(s.contains("Error source:"));
        assert!(err.source().is_some());
    }

    #[test]
    fn required_none() {
        let v: Option<usize> = None;
        let err = v.required("batch size").unwrap_err();
        assert_eq!("Missing required value: batch size", err.to_string());
    }
}
