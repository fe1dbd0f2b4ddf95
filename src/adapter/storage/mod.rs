pub mod local;
pub mod s3;

/// Picks a file extension for a stored blob, preferring the uploaded name
/// and falling back to the declared content type.
pub fn blob_extension(suggested_name: &str, content_type: &str) -> String {
    let from_name = suggested_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    if let Some(ext) = from_name {
        return ext;
    }

    match content_type {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/avif" => "avif",
        _ => "bin",
    }
    .to_string()
}
