//! Case-insensitive, order-preserving collection of multi-valued headers.
//!
//! Headers are kept in an ordered map keyed by the lowercase form of their
//! name, so lookups ignore case while iteration follows the order in which
//! headers first went in.  Each entry remembers the casing of its name for
//! output.

use super::{
    validate_header_name,
    validate_header_value,
    Error,
    HeaderName,
};
use indexmap::{map::Entry, IndexMap};

/// Conversion of the different forms in which header values may be given,
/// either a single value or a sequence of them, into a list of values.
pub trait IntoHeaderValues {
    fn into_header_values(self) -> Vec<String>;
}

impl IntoHeaderValues for &str {
    fn into_header_values(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoHeaderValues for String {
    fn into_header_values(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoHeaderValues for &String {
    fn into_header_values(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl<T> IntoHeaderValues for Vec<T>
    where T: Into<String>
{
    fn into_header_values(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T> IntoHeaderValues for &[T]
    where T: AsRef<str>
{
    fn into_header_values(self) -> Vec<String> {
        self.iter().map(|value| value.as_ref().to_string()).collect()
    }
}

impl<T, const N: usize> IntoHeaderValues for [T; N]
    where T: Into<String>
{
    fn into_header_values(self) -> Vec<String> {
        IntoIterator::into_iter(self).map(Into::into).collect()
    }
}

#[derive(Clone, Debug)]
struct Field {
    name: HeaderName,
    values: Vec<String>,
}

/// Headers of a message, looked up without regard to case, each holding one
/// or more values in the order they were given.
#[derive(Clone, Debug, Default)]
pub struct HeaderBag {
    entries: IndexMap<String, Field>,
}

// Two bags are equal only if they list the same headers in the same order,
// with the same name casing and the same values.
impl PartialEq for HeaderBag {
    fn eq(&self, rhs: &Self) -> bool {
        self.len() == rhs.len()
            && self.iter().zip(rhs.iter()).all(|(lhs, rhs)| {
                lhs.0.as_str() == rhs.0.as_str()
                && lhs.1 == rhs.1
            })
    }
}

impl Eq for HeaderBag {}

impl HeaderBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn validate<N, V>(
        name: N,
        values: V,
    ) -> Result<(HeaderName, Vec<String>), Error>
        where N: AsRef<str>,
            V: IntoHeaderValues
    {
        let name = name.as_ref();
        if let Err(error) = validate_header_name(name) {
            log::debug!("rejected header name {:?}", name);
            return Err(error);
        }
        let name = HeaderName::from(name);
        let values = values.into_header_values();
        if values.is_empty() {
            log::debug!("rejected header {} with no values", name);
            return Err(Error::InvalidHeaderValue{
                name,
                value: String::new(),
            });
        }
        for value in &values {
            if let Err(error) = validate_header_value(&name, value) {
                log::debug!("rejected value {:?} for header {}", value, name);
                return Err(error);
            }
        }
        Ok((name, values))
    }

    /// Replace all values of the header with the given name by the given
    /// values, adopting the casing of the given name.  A header not yet
    /// present is added after all others.
    pub fn set<N, V>(
        &mut self,
        name: N,
        values: V,
    ) -> Result<(), Error>
        where N: AsRef<str>,
            V: IntoHeaderValues
    {
        let (name, values) = Self::validate(name, values)?;
        log::trace!("setting header {} to {:?}", name, values);
        self.entries.insert(name.canonical(), Field{name, values});
        Ok(())
    }

    /// Append the given values to those of the header with the given name,
    /// keeping the casing and position the header already has.  A header
    /// not yet present is added after all others.
    pub fn add<N, V>(
        &mut self,
        name: N,
        values: V,
    ) -> Result<(), Error>
        where N: AsRef<str>,
            V: IntoHeaderValues
    {
        let (name, mut values) = Self::validate(name, values)?;
        log::trace!("adding {:?} to header {}", values, name);
        match self.entries.entry(name.canonical()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().values.append(&mut values);
            },
            Entry::Vacant(entry) => {
                entry.insert(Field{name, values});
            },
        }
        Ok(())
    }

    /// Remove the header with the given name, if present.
    pub fn remove<N>(&mut self, name: N)
        where N: AsRef<str>
    {
        let name = name.as_ref();
        if self.entries.shift_remove(&name.to_ascii_lowercase()).is_some() {
            log::trace!("removed header {}", name);
        }
    }

    /// Return the values of the header with the given name, or an empty
    /// slice if the header is not present.
    #[must_use]
    pub fn get<N>(&self, name: N) -> &[String]
        where N: AsRef<str>
    {
        self.entries.get(&name.as_ref().to_ascii_lowercase())
            .map_or(&[][..], |field| field.values.as_slice())
    }

    #[must_use]
    pub fn has<N>(&self, name: N) -> bool
        where N: AsRef<str>
    {
        self.entries.contains_key(&name.as_ref().to_ascii_lowercase())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the headers in the order in which they were first added,
    /// each name in the casing it was given in.
    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &[String])> {
        self.entries.values()
            .map(|field| (&field.name, field.values.as_slice()))
    }

    /// Copy the headers out into an ordered map from name, in the casing it
    /// was given in, to values.
    #[must_use]
    pub fn to_ordered_map(&self) -> IndexMap<String, Vec<String>> {
        self.iter()
            .map(|(name, values)| (name.to_string(), values.to_vec()))
            .collect()
    }
}
