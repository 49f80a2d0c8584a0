//! Reading a stream of whitespace-separated (or outright concatenated) JSON
//! values off a byte source, the way the test harnesses and the remote
//! protocol both need to.

use std::io::Read;

use serde::de::DeserializeOwned;
use serde_json::{Deserializer, Value};

/// Pulls successive top-level JSON values out of `reader` one at a time.
/// `serde_json`'s `StreamDeserializer` already tolerates missing
/// separators between values (it stops as soon as one value parses), which
/// is exactly what a stream of `[method, [args]]` messages needs.
pub struct JsonStream<R: Read> {
    inner: serde_json::StreamDeserializer<'static, serde_json::de::IoRead<R>, Value>,
}

impl<R: Read> JsonStream<R> {
    pub fn new(reader: R) -> JsonStream<R> {
        JsonStream {
            inner: Deserializer::from_reader(reader).into_iter::<Value>(),
        }
    }

    pub fn next_value(&mut self) -> Option<Result<Value, serde_json::Error>> {
        self.inner.next()
    }

    pub fn next_as<T: DeserializeOwned>(&mut self) -> Option<Result<T, serde_json::Error>> {
        self.next_value().map(|r| r.and_then(|v| serde_json::from_value(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_concatenated_values_without_separators() {
        let input = b"[\"a\",[1]][\"b\",[2]]".as_slice();
        let mut stream = JsonStream::new(input);
        let first = stream.next_value().unwrap().unwrap();
        assert_eq!(first, serde_json::json!(["a", [1]]));
        let second = stream.next_value().unwrap().unwrap();
        assert_eq!(second, serde_json::json!(["b", [2]]));
        assert!(stream.next_value().is_none());
    }

    #[test]
    fn next_as_deserializes_into_a_concrete_type() {
        let input = b"[1,2,3]".as_slice();
        let mut stream = JsonStream::new(input);
        let values: Vec<i64> = stream.next_as().unwrap().unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }
}
