//! Immutable byte snapshots handed out and accepted by the primitive

use bytes::Bytes;

/// An immutable snapshot of file content.
///
/// Reading a file yields a `Blob` of its content at the time of the call;
/// writers accept a `Blob` as their unit of work. Slicing is cheap and never
/// copies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blob {
    data: Bytes,
}

impl Blob {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Slice `[start, end)`, clamping both ends to the blob size.
    pub fn slice(&self, start: u64, end: u64) -> Blob {
        let len = self.data.len();
        let start = usize::try_from(start).unwrap_or(len).min(len);
        let end = usize::try_from(end).unwrap_or(len).clamp(start, len);
        Blob {
            data: self.data.slice(start..end),
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

impl From<Bytes> for Blob {
    fn from(data: Bytes) -> Self {
        Self { data }
    }
}

impl From<Vec<u8>> for Blob {
    fn from(data: Vec<u8>) -> Self {
        Self { data: data.into() }
    }
}

impl From<&'static [u8]> for Blob {
    fn from(data: &'static [u8]) -> Self {
        Self {
            data: Bytes::from_static(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_clamps_to_size() {
        let blob = Blob::from(&b"hello"[..]);
        assert_eq!(blob.slice(1, 3).bytes().as_ref(), b"el");
        assert_eq!(blob.slice(3, 100).bytes().as_ref(), b"lo");
        assert!(blob.slice(10, 20).is_empty());
        assert!(blob.slice(4, 2).is_empty());
    }
}
