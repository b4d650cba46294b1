//! JavaScript evaluated in the live page for delivery
//!
//! Arguments are spliced in as JSON literals, never as raw strings.

/// Trigger a download through a detached anchor
///
/// The anchor is never attached to the document and carries no `target`, so
/// no new browsing context is opened. Placeholders: `__URI__`, `__NAME__`.
pub const ANCHOR_DOWNLOAD_SCRIPT: &str = r#"
    ((uri, name) => {
        const anchor = document.createElement('a');
        anchor.href = uri;
        anchor.setAttribute('download', name);
        anchor.dispatchEvent(new MouseEvent('click', { bubbles: false, cancelable: true }));
        return true;
    })(__URI__, __NAME__)
"#;

/// Write a multi-representation clipboard item
///
/// Placeholder `__ENTRIES__` is an object of MIME type → base64 payload. The
/// promise is awaited inside the same evaluation so the write stays inside the
/// gesture's permission window.
pub const CLIPBOARD_WRITE_SCRIPT: &str = r#"
    (async (entries) => {
        const items = {};
        for (const [mime, encoded] of Object.entries(entries)) {
            const binary = atob(encoded);
            const buffer = new Uint8Array(binary.length);
            for (let i = 0; i < binary.length; i++) {
                buffer[i] = binary.charCodeAt(i);
            }
            items[mime] = new Blob([buffer], { type: mime });
        }
        await navigator.clipboard.write([new ClipboardItem(items)]);
        return Object.keys(items).length;
    })(__ENTRIES__)
"#;

/// Fill `ANCHOR_DOWNLOAD_SCRIPT` placeholders
#[must_use]
pub fn anchor_download_script(uri: &str, name: &str) -> String {
    ANCHOR_DOWNLOAD_SCRIPT
        .replace("__URI__", &json_string(uri))
        .replace("__NAME__", &json_string(name))
}

/// Fill `CLIPBOARD_WRITE_SCRIPT` with pre-encoded entries
#[must_use]
pub fn clipboard_write_script(entries: &serde_json::Map<String, serde_json::Value>) -> String {
    CLIPBOARD_WRITE_SCRIPT.replace(
        "__ENTRIES__",
        &serde_json::Value::Object(entries.clone()).to_string(),
    )
}

fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
