//! Form-encoded request bodies.
//!
//! The API takes `application/x-www-form-urlencoded` POST bodies. Nested,
//! repeated objects (group members, expense shares) are flattened into
//! `group__index__field` keys via [`ArrayWriter`].

/// The common field-setting capability shared by [`FormBody`] and
/// [`ArrayWriter`].
///
/// Payload strategies write themselves through this trait so the same code
/// can contribute fields at the top level of a body or inside one element of
/// an array group.
pub trait FieldWriter {
    /// Sets a string field.
    fn set_str(&mut self, key: &str, value: &str);

    /// Sets an integer field, serialized as base-10 text.
    fn set_int(&mut self, key: &str, value: i64);
}

/// An ordered, write-only accumulator for a form-encoded request body.
///
/// Keys are unique per logical field; setting an existing key replaces its
/// value. Accumulation cannot fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    pairs: Vec<(String, String)>,
}

impl FormBody {
    /// Creates an empty body.
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&mut self, key: &str, value: String) {
        if let Some(pair) = self.pairs.iter_mut().find(|(k, _)| k == key) {
            pair.1 = value;
        } else {
            self.pairs.push((key.to_string(), value));
        }
    }

    /// Sets a boolean field, serialized as the literal `"true"` or `"false"`.
    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set(key, value.to_string());
    }

    /// Begins an array group keyed `group`, returning a writer that
    /// namespaces every field as `group__index__field`.
    pub fn array<'a>(&'a mut self, group: &str) -> ArrayWriter<'a> {
        ArrayWriter {
            form: self,
            group: group.to_string(),
            index: 0,
        }
    }

    /// The accumulated key/value pairs in insertion order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Looks up the current value of a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if no fields have been set.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Percent-encodes the body as `application/x-www-form-urlencoded`.
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl FieldWriter for FormBody {
    fn set_str(&mut self, key: &str, value: &str) {
        self.set(key, value.to_string());
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.set(key, value.to_string());
    }
}

/// Writer for one `group__index__field` array block of a [`FormBody`].
///
/// Writes start at index 0; [`ArrayWriter::advance`] moves to the next
/// element. All fields of element *i* must be written before advancing:
/// there is no way to revisit an earlier index, and the wire format cannot
/// detect out-of-order writes.
#[derive(Debug)]
pub struct ArrayWriter<'a> {
    form: &'a mut FormBody,
    group: String,
    index: usize,
}

impl ArrayWriter<'_> {
    /// Finishes the current element and moves to the next index.
    pub fn advance(&mut self) {
        self.index += 1;
    }

    fn key(&self, field: &str) -> String {
        format!("{}__{}__{}", self.group, self.index, field)
    }
}

impl FieldWriter for ArrayWriter<'_> {
    fn set_str(&mut self, key: &str, value: &str) {
        let key = self.key(key);
        self.form.set(&key, value.to_string());
    }

    fn set_int(&mut self, key: &str, value: i64) {
        let key = self.key(key);
        self.form.set(&key, value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_fields_keep_insertion_order() {
        let mut form = FormBody::new();
        form.set_str("cost", "20.00");
        form.set_int("category_id", 15);
        form.set_bool("payment", false);

        assert_eq!(
            form.pairs(),
            &[
                ("cost".to_string(), "20.00".to_string()),
                ("category_id".to_string(), "15".to_string()),
                ("payment".to_string(), "false".to_string()),
            ]
        );
    }

    #[test]
    fn setting_an_existing_key_replaces_the_value() {
        let mut form = FormBody::new();
        form.set_str("name", "first");
        form.set_str("name", "second");

        assert_eq!(form.get("name"), Some("second"));
        assert_eq!(form.pairs().len(), 1);
    }

    #[test]
    fn bool_serializes_as_literal_true_false() {
        let mut form = FormBody::new();
        form.set_bool("a", true);
        form.set_bool("b", false);

        assert_eq!(form.get("a"), Some("true"));
        assert_eq!(form.get("b"), Some("false"));
    }

    #[test]
    fn array_writer_namespaces_keys_with_zero_based_index() {
        let mut form = FormBody::new();
        let mut arr = form.array("users");
        arr.set_int("user_id", 1);
        arr.advance();
        arr.set_int("user_id", 2);
        arr.advance();
        arr.set_int("user_id", 3);

        assert_eq!(form.get("users__0__user_id"), Some("1"));
        assert_eq!(form.get("users__1__user_id"), Some("2"));
        assert_eq!(form.get("users__2__user_id"), Some("3"));
        assert_eq!(form.pairs().len(), 3);
    }

    #[test]
    fn array_writer_writes_at_index_zero_before_any_advance() {
        let mut form = FormBody::new();
        let mut arr = form.array("friends");
        arr.set_str("user_email", "ada@example.com");

        assert_eq!(form.get("friends__0__user_email"), Some("ada@example.com"));
    }

    #[test]
    fn array_elements_are_contiguous_with_no_gaps() {
        let mut form = FormBody::new();
        let mut arr = form.array("users");
        for i in 0..4 {
            arr.set_int("user_id", i);
            arr.set_str("owed_share", "5.00");
            arr.advance();
        }

        for i in 0..4 {
            assert!(form.get(&format!("users__{i}__user_id")).is_some());
            assert!(form.get(&format!("users__{i}__owed_share")).is_some());
        }
        assert_eq!(form.pairs().len(), 8);
    }

    #[test]
    fn empty_array_group_writes_nothing() {
        let mut form = FormBody::new();
        let _ = form.array("users");
        assert!(form.is_empty());
    }

    #[test]
    fn encode_percent_encodes_keys_and_values() {
        let mut form = FormBody::new();
        form.set_str("description", "coffee & cake");
        form.set_str("name", "a=b");

        assert_eq!(form.encode(), "description=coffee%20%26%20cake&name=a%3Db");
    }

    #[test]
    fn encode_empty_body_is_empty_string() {
        assert_eq!(FormBody::new().encode(), "");
    }
}
