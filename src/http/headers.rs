//! Header fields for routed requests and responses.
//!
//! The routing layer touches headers in exactly two places: dispatch stamps
//! `Allow` and `Content-Type` onto its `404`/`405` fallbacks, and middleware
//! decorates responses on the way out. Field names are folded to lowercase
//! when stored, so lookups never juggle case and handlers can probe with
//! whatever spelling they like. Wire-level concerns (validation, folding,
//! serialization) belong to the host server.

/// An ordered collection of HTTP header fields.
///
/// Values are grouped under their field name in first-insertion order;
/// appending the same name again accumulates instead of overwriting, which is
/// what response decoration needs. Names are stored lowercase and looked up
/// ignoring ASCII case.
///
/// # Examples
///
/// ```
/// use nestmux::http::Headers;
///
/// let mut headers = Headers::new();
/// headers.append("Allow", "GET");
/// headers.append("Allow", "POST");
///
/// assert_eq!(headers.get("allow"), Some("GET"));
/// assert_eq!(headers.get_all("ALLOW").collect::<Vec<_>>(), ["GET", "POST"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Headers {
    fields: Vec<Field>,
}

#[derive(Debug, Clone)]
struct Field {
    name: String,
    values: Vec<String>,
}

impl Headers {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value under `name`, folding the name to lowercase.
    /// Repeated names accumulate values rather than overwriting.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => field.values.push(value),
            None => self.fields.push(Field {
                name,
                values: vec![value],
            }),
        }
    }

    /// Returns the first value stored under `name`, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.field(name)
            .and_then(|field| field.values.first())
            .map(String::as_str)
    }

    /// Returns every value stored under `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> impl Iterator<Item = &str> {
        self.field(name)
            .map(|field| field.values.as_slice())
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
    }

    /// Returns `true` when at least one value is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Returns the number of stored values across all field names.
    pub fn len(&self) -> usize {
        self.fields.iter().map(|field| field.values.len()).sum()
    }

    /// Returns `true` when nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates `(name, value)` pairs, grouped by field name in
    /// first-insertion order. Names come back in their stored lowercase form.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().flat_map(|field| {
            field
                .values
                .iter()
                .map(move |value| (field.name.as_str(), value.as_str()))
        })
    }

    fn field(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
    }
}
