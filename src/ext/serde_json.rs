// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Dotted-path lookups on serde_json::Value plus lenient decoding of paged `content[]` arrays
// role: extension/serde_json
// outputs: JsonFetch trait, JsonFetched wrapper, DecodedItems for per-element decoding
// invariants: No panics; missing paths yield None; a bad array element is skipped, never fatal
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::de::DeserializeOwned;

/// Elements of a JSON array that decoded as `T`, and how many did not.
#[derive(Debug)]
pub struct DecodedItems<T> {
  pub items: Vec<T>,
  pub skipped: usize,
}

impl<T> Default for DecodedItems<T> {
  fn default() -> Self {
    Self { items: Vec::new(), skipped: 0 }
  }
}

/// A location inside a JSON document, resolved by [`JsonFetch::fetch`].
pub struct JsonFetched<'a> {
  inner: Option<&'a serde_json::Value>,
}

impl<'a> JsonFetched<'a> {
  pub fn to<T>(&self) -> Option<T>
  where
    T: DeserializeOwned,
  {
    self.inner.and_then(|v| T::deserialize(v).ok())
  }

  /// Decode every element of an array independently.
  ///
  /// A missing location or a non-array value yields no items.
  pub fn items<T>(&self) -> DecodedItems<T>
  where
    T: DeserializeOwned,
  {
    let Some(arr) = self.inner.and_then(|v| v.as_array()) else {
      return DecodedItems::default();
    };

    let mut out = DecodedItems { items: Vec::with_capacity(arr.len()), skipped: 0 };

    for element in arr {
      match T::deserialize(element) {
        Ok(item) => out.items.push(item),
        Err(_) => out.skipped += 1,
      }
    }

    out
  }
}

/// Fetch nested values via dotted paths like "statistics.executions.total".
pub trait JsonFetch {
  fn fetch(&self, path: &str) -> JsonFetched<'_>;
}

impl JsonFetch for serde_json::Value {
  fn fetch(&self, path: &str) -> JsonFetched<'_> {
    if path.is_empty() {
      return JsonFetched { inner: Some(self) };
    }

    let mut cur = self;

    for key in path.split('.') {
      match cur.get(key) {
        Some(next) => cur = next,
        None => return JsonFetched { inner: None },
      }
    }

    JsonFetched { inner: Some(cur) }
  }
}
