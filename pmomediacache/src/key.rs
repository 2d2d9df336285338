//! Dérivation des clés de cache à partir des URIs sources

use sha2::{Digest, Sha256};

/// Suffixes vidéo reconnus dans une URI
const VIDEO_MARKERS: &[&str] = &[".mp4", ".webm", ".avi"];

/// Génère la clé de cache d'une URI source
///
/// Utilise SHA256 pour hasher l'URI complète et retourne les 16 premiers
/// octets en hexadécimal (32 caractères). Une même URI produit toujours la
/// même clé, et la clé ne contient que des caractères sûrs pour un nom de
/// fichier.
///
/// # Exemple
///
/// ```
/// use pmomediacache::cache_key;
///
/// let key = cache_key("https://example.com/spot.mp4");
/// assert_eq!(key.len(), 32);  // 16 octets = 32 caractères hex
/// ```
pub fn cache_key(uri: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(uri.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..16])
}

/// Extension de fichier associée à une URI
///
/// `.mp4` si l'URI contient un suffixe vidéo reconnu (`.mp4`, `.webm`,
/// `.avi`), `.jpg` sinon.
fn media_extension(uri: &str) -> &'static str {
    if VIDEO_MARKERS.iter().any(|marker| uri.contains(marker)) {
        ".mp4"
    } else {
        ".jpg"
    }
}

/// Nom de fichier complet dans le cache : `{clé}{extension}`
pub fn cache_filename(uri: &str) -> String {
    format!("{}{}", cache_key(uri), media_extension(uri))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_stable() {
        let uri = "https://example.com/a.jpg";
        assert_eq!(cache_key(uri), cache_key(uri));
    }

    #[test]
    fn test_key_differs_per_uri() {
        assert_ne!(
            cache_key("https://example.com/a.jpg"),
            cache_key("https://example.com/b.jpg")
        );
    }

    #[test]
    fn test_key_is_filesystem_safe() {
        let key = cache_key("https://example.com/é?x=1&y=2");
        assert_eq!(key.len(), 32);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_video_extensions() {
        assert_eq!(media_extension("https://example.com/clip.mp4"), ".mp4");
        assert_eq!(media_extension("https://example.com/clip.webm"), ".mp4");
        assert_eq!(media_extension("https://example.com/clip.avi"), ".mp4");
        assert_eq!(media_extension("https://example.com/clip.mp4?q=1"), ".mp4");
    }

    #[test]
    fn test_image_extension_by_default() {
        assert_eq!(media_extension("https://example.com/photo.jpg"), ".jpg");
        assert_eq!(media_extension("https://example.com/photo.png"), ".jpg");
        assert_eq!(media_extension("https://picsum.photos/1920/1080"), ".jpg");
    }

    #[test]
    fn test_filename_combines_key_and_extension() {
        let uri = "https://example.com/clip.webm";
        let filename = cache_filename(uri);
        assert!(filename.starts_with(&cache_key(uri)));
        assert!(filename.ends_with(".mp4"));
    }
}
