use unicode_normalization::UnicodeNormalization;

/// Lowercase + NFC. Диакритику не срезаем: «ё» и «е» остаются разными буквами.
pub fn normalize(s: &str) -> String {
    s.to_lowercase().nfc().collect()
}
