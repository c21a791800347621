//! Personal-data marker for automatic redaction
//!
//! Requester emails and phone numbers pass through logs as `Sensitive<T>`
//! so they are never written out in full.

use std::fmt;

/// Wrapper for personal data that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use tracer_core_types::Sensitive;
///
/// let email = Sensitive::new("budi@students.itb.ac.id");
/// assert_eq!(format!("{:?}", email), "***REDACTED***");
/// assert_eq!(format!("{}", email), "***REDACTED***");
/// assert_eq!(email.expose(), &"budi@students.itb.ac.id");
/// ```
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying value
    ///
    /// Only for the places that really need it, such as addressing a
    /// notification.
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: AsRef<str>> Sensitive<T> {
    /// Short hint safe for logs: first character followed by a mask
    ///
    /// ```
    /// use tracer_core_types::Sensitive;
    ///
    /// assert_eq!(Sensitive::new("budi@itb.ac.id").hint(), "b***");
    /// assert_eq!(Sensitive::new("").hint(), "***");
    /// ```
    pub fn hint(&self) -> String {
        match self.0.as_ref().chars().next() {
            Some(first) => format!("{}***", first),
            None => "***".to_string(),
        }
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
