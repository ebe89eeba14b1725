//! Type-erased response payloads.
//!
//! Success results and error-matcher outputs have unrelated types; the
//! pipeline carries both to the response writer as a [`Payload`].

use std::any::Any;
use std::fmt;

use serde::Serialize;

trait ErasedPayload: Send {
    fn to_json_vec(&self) -> serde_json::Result<Vec<u8>>;
    fn to_value(&self) -> serde_json::Result<serde_json::Value>;
    fn as_any(&self) -> &dyn Any;
}

impl<T> ErasedPayload for T
where
    T: Serialize + Send + 'static,
{
    fn to_json_vec(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A serializable response payload of any type, or nothing.
///
/// # Example
///
/// ```
/// use hermes_core::Payload;
///
/// let payload = Payload::new("success");
/// assert_eq!(payload.to_json_vec().unwrap(), br#""success""#);
/// assert_eq!(payload.downcast_ref::<&str>(), Some(&"success"));
///
/// assert!(Payload::empty().is_empty());
/// ```
#[derive(Default)]
pub struct Payload(Option<Box<dyn ErasedPayload>>);

impl Payload {
    /// Wraps a serializable value.
    pub fn new<T: Serialize + Send + 'static>(value: T) -> Self {
        Self(Some(Box::new(value)))
    }

    /// A payload with no content.
    #[must_use]
    pub fn empty() -> Self {
        Self(None)
    }

    /// Returns `true` if there is no value at all.
    ///
    /// A value that serializes to `null` is not empty; writers decide how to
    /// render it.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Serializes the value as JSON. An empty payload yields no bytes.
    pub fn to_json_vec(&self) -> serde_json::Result<Vec<u8>> {
        self.0
            .as_ref()
            .map_or_else(|| Ok(Vec::new()), |value| value.to_json_vec())
    }

    /// Converts the value into a JSON tree. An empty payload is `null`.
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        self.0
            .as_ref()
            .map_or(Ok(serde_json::Value::Null), |value| value.to_value())
    }

    /// Returns the value if it has type `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0
            .as_ref()
            .and_then(|value| value.as_any().downcast_ref::<T>())
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(_) => f.write_str("Payload(..)"),
            None => f.write_str("Payload(empty)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;

    #[derive(Debug, PartialEq, Serialize)]
    struct Problem {
        detail: String,
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cannot serialize"))
        }
    }

    #[test]
    fn test_struct_payload() {
        let payload = Payload::new(Problem {
            detail: "oops".to_string(),
        });

        assert!(!payload.is_empty());
        assert_eq!(payload.to_json_vec().unwrap(), br#"{"detail":"oops"}"#);
        assert_eq!(payload.to_value().unwrap()["detail"], "oops");
        assert_eq!(
            payload.downcast_ref::<Problem>().map(|p| p.detail.as_str()),
            Some("oops")
        );
        assert!(payload.downcast_ref::<String>().is_none());
    }

    #[test]
    fn test_empty_payload() {
        let payload = Payload::empty();

        assert!(payload.is_empty());
        assert!(payload.to_json_vec().unwrap().is_empty());
        assert!(payload.to_value().unwrap().is_null());
        assert!(payload.downcast_ref::<()>().is_none());
    }

    #[test]
    fn test_unit_is_not_empty() {
        let payload = Payload::new(());
        assert!(!payload.is_empty());
        assert_eq!(payload.to_json_vec().unwrap(), b"null");
    }

    #[test]
    fn test_serialization_failure_is_reported() {
        let payload = Payload::new(Unserializable);
        assert!(payload.to_json_vec().is_err());
        assert!(payload.to_value().is_err());
    }

    #[test]
    fn test_debug() {
        assert_eq!(format!("{:?}", Payload::new(1)), "Payload(..)");
        assert_eq!(format!("{:?}", Payload::empty()), "Payload(empty)");
    }
}
