//! Input provenance hashing.
//!
//! Every completed generation records a hash over the inputs that
//! produced it, so identical reruns are detectable and history is
//! auditable without storing the full composition state twice.

use sha2::{Digest, Sha256};

use crate::types::DbId;

/// Hash the inputs of one generation into a stable hex digest.
///
/// Field order is fixed; fields are length-delimited so adjacent
/// values cannot collide by concatenation.
pub fn inputs_hash(
    user_prompt: &str,
    model_slug: &str,
    reference_id: Option<DbId>,
    final_prompt: &str,
) -> String {
    let mut hasher = Sha256::new();
    for field in [
        user_prompt,
        model_slug,
        &reference_id.map(|id| id.to_string()).unwrap_or_default(),
        final_prompt,
    ] {
        hasher.update((field.len() as u64).to_be_bytes());
        hasher.update(field.as_bytes());
    }
    hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
