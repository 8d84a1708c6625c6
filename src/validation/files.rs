use crate::config::SecurityPolicy;
use crate::validation::auth::ValidationReport;

/// Validates an upload candidate against the security policy.
///
/// The extension must be on the policy's allow list and the size under the
/// policy cap. When the first bytes of the file are supplied, the detected
/// content type must agree with the declared extension; a `.pdf` that
/// sniffs as an executable fails.
///
/// # Arguments
///
/// * `policy` - The effective security policy.
/// * `file_name` - The declared file name.
/// * `size_bytes` - The file size.
/// * `head` - Optionally, the first bytes of the file for sniffing.
///
/// # Returns
///
/// A `ValidationReport` listing every failed rule.
pub fn validate_file(
    policy: &SecurityPolicy,
    file_name: &str,
    size_bytes: u64,
    head: Option<&[u8]>,
) -> ValidationReport {
    let mut errors = Vec::new();

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    if extension.is_empty() || !policy.allowed_file_types.contains(&extension) {
        errors.push(format!(
            "File type '{}' is not allowed (allowed: {})",
            extension,
            policy.allowed_file_types.join(", ")
        ));
    }

    if size_bytes > policy.max_file_size_bytes {
        errors.push(format!(
            "File exceeds the maximum size of {} bytes",
            policy.max_file_size_bytes
        ));
    }

    if let Some(head) = head {
        if let Some(kind) = infer::get(head) {
            if kind.extension() != extension
                && !(kind.extension() == "jpg" && extension == "jpeg")
            {
                errors.push(format!(
                    "File content looks like '{}' but is named '.{}'",
                    kind.extension(),
                    extension
                ));
            }
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}
