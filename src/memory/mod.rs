pub mod chunker;
pub mod hybrid;
pub mod index;
pub mod lexical;
pub mod stats;
pub mod types;
pub mod vector;

/// Convert an f32 embedding slice to raw bytes for storage and sqlite-vec.
pub fn embedding_to_bytes(embedding: &[f32]) -> &[u8] {
    // SAFETY: f32 has no padding or invalid bit patterns, u8 has alignment 1,
    // and the byte length covers exactly the same allocation.
    unsafe {
        std::slice::from_raw_parts(
            embedding.as_ptr() as *const u8,
            std::mem::size_of_val(embedding),
        )
    }
}

/// Inverse of [`embedding_to_bytes`]. Trailing bytes that do not form a whole
/// f32 are ignored.
pub fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(std::mem::size_of::<f32>())
        .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

/// Current time as an RFC 3339 string, the timestamp format of every table.
pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
